//! Engine context for dependency injection

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pkengine_config::Config;
use pkengine_errors::{Error, OpsError};
use pkengine_events::EventSender;
use pkengine_repository::RepoRegistry;
use pkengine_store::{
    ArtifactWriter, FixedLocale, FsArtifactWriter, LocaleProvider, NetworkProbe,
    ResolvableStore, StaticNetwork,
};
use pkengine_trust::TrustGate;
use pkengine_types::{Filter, Group};
use tokio::task::JoinHandle;

use crate::transaction::{Transaction, TransactionHandle, TransactionOutcome};
use crate::Operation;

/// Collaborators shared by every transaction of one engine
#[derive(Debug)]
pub(crate) struct EngineShared {
    pub store: Arc<dyn ResolvableStore>,
    pub network: Arc<dyn NetworkProbe>,
    pub locale: Arc<dyn LocaleProvider>,
    pub writer: Arc<dyn ArtifactWriter>,
    pub trust: TrustGate,
    pub repositories: RepoRegistry,
    pub config: Config,
    pub events: EventSender,
    active: Mutex<Option<String>>,
}

impl EngineShared {
    fn active(&self) -> MutexGuard<'_, Option<String>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Entry point for running transactions
///
/// Clones share collaborators and the single active-transaction slot.
#[derive(Debug, Clone)]
pub struct Engine {
    shared: Arc<EngineShared>,
}

impl Engine {
    #[cfg(test)]
    pub(crate) fn shared(&self) -> &EngineShared {
        &self.shared
    }

    /// Prepare a transaction for `operation` without starting it.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::TransactionInProgress`] while another transaction
    /// of this engine has not reached a terminal state.
    pub fn transaction(
        &self,
        operation: Operation,
    ) -> Result<(Transaction, TransactionHandle), Error> {
        let id = uuid::Uuid::new_v4().to_string();
        {
            let mut active = self.shared.active();
            if let Some(running) = active.as_ref() {
                return Err(OpsError::TransactionInProgress {
                    active: running.clone(),
                }
                .into());
            }
            *active = Some(id.clone());
        }

        let guard = ActiveGuard {
            shared: Arc::clone(&self.shared),
        };
        Ok(Transaction::new(
            Arc::clone(&self.shared),
            guard,
            id,
            operation,
        ))
    }

    /// Start `operation` on the tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be created.
    pub fn start(
        &self,
        operation: Operation,
    ) -> Result<(TransactionHandle, JoinHandle<TransactionOutcome>), Error> {
        let (transaction, handle) = self.transaction(operation)?;
        let join = tokio::spawn(transaction.run());
        Ok((handle, join))
    }

    /// Id of the transaction currently holding the engine, if any
    #[must_use]
    pub fn active_transaction(&self) -> Option<String> {
        self.shared.active().clone()
    }

    /// Package groups the store can search by
    #[must_use]
    pub fn groups(&self) -> Vec<Group> {
        self.shared.store.groups()
    }

    /// Filter facets the engine understands
    #[must_use]
    pub fn filters(&self) -> Vec<Filter> {
        vec![Filter::Gui, Filter::Installed, Filter::Development]
    }

    #[must_use]
    pub fn trust(&self) -> &TrustGate {
        &self.shared.trust
    }

    #[must_use]
    pub fn repositories(&self) -> &RepoRegistry {
        &self.shared.repositories
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn ResolvableStore> {
        &self.shared.store
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }
}

/// Releases the engine's active slot when the transaction is dropped
#[derive(Debug)]
pub(crate) struct ActiveGuard {
    shared: Arc<EngineShared>,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        let released = self.shared.active().take();
        tracing::trace!(transaction = ?released, "engine slot released");
    }
}

/// Builder for [`Engine`]
///
/// A store, a configuration and an event sender are required. The other
/// collaborators default to implementations derived from the
/// configuration.
#[derive(Debug, Default)]
pub struct EngineBuilder {
    store: Option<Arc<dyn ResolvableStore>>,
    network: Option<Arc<dyn NetworkProbe>>,
    locale: Option<Arc<dyn LocaleProvider>>,
    writer: Option<Arc<dyn ArtifactWriter>>,
    trust: Option<TrustGate>,
    repositories: Option<RepoRegistry>,
    config: Option<Config>,
    events: Option<EventSender>,
}

impl EngineBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ResolvableStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn with_network(mut self, network: Arc<dyn NetworkProbe>) -> Self {
        self.network = Some(network);
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: Arc<dyn LocaleProvider>) -> Self {
        self.locale = Some(locale);
        self
    }

    #[must_use]
    pub fn with_writer(mut self, writer: Arc<dyn ArtifactWriter>) -> Self {
        self.writer = Some(writer);
        self
    }

    #[must_use]
    pub fn with_trust_gate(mut self, trust: TrustGate) -> Self {
        self.trust = Some(trust);
        self
    }

    #[must_use]
    pub fn with_repositories(mut self, repositories: RepoRegistry) -> Self {
        self.repositories = Some(repositories);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// # Errors
    ///
    /// Returns [`OpsError::MissingComponent`] if a required component was
    /// not provided, or an error if the configured repositories are invalid.
    pub fn build(self) -> Result<Engine, Error> {
        let store = self.store.ok_or_else(|| missing("store"))?;
        let config = self.config.ok_or_else(|| missing("config"))?;
        let events = self.events.ok_or_else(|| missing("event sender"))?;

        let repositories = match self.repositories {
            Some(repositories) => repositories,
            None => RepoRegistry::from_descriptors(config.repository_descriptors())?,
        };
        let network = self
            .network
            .unwrap_or_else(|| Arc::new(StaticNetwork::new(config.general.network_online)));
        let locale = self
            .locale
            .unwrap_or_else(|| Arc::new(FixedLocale::new(config.general.locale.clone())));
        let writer = self
            .writer
            .unwrap_or_else(|| Arc::new(FsArtifactWriter::new()));

        Ok(Engine {
            shared: Arc::new(EngineShared {
                store,
                network,
                locale,
                writer,
                trust: self.trust.unwrap_or_default(),
                repositories,
                config,
                events,
                active: Mutex::new(None),
            }),
        })
    }
}

fn missing(component: &str) -> Error {
    OpsError::MissingComponent {
        component: component.to_string(),
    }
    .into()
}
