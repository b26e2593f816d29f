//! Event emission
//!
//! [`EventEmitter`] is the single API used to push events to a caller.
//! [`TransactionEmitter`] is the per-transaction implementation that keeps
//! the stream well-formed: at most one `finished`, no duplicate package
//! lines, and a monotonic overall percentage.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, PoisonError};

use pkengine_errors::ErrorCode;
use pkengine_types::{
    DistroUpgrade, EulaRequirement, InfoKind, PackageDetails, PackageId, PackageResult,
    Percentage, RepositoryDescriptor, RestartKind, SignatureRequirement, StatusKind,
    UpdateDetail,
};

use crate::progress::{ProgressState, ProgressUpdate};
use crate::{EventMessage, EventMeta, EventSender, ExitKind, TransactionEvent};

/// The unified trait for emitting transaction events
///
/// Implementors only provide the sender; every helper funnels into
/// [`EventEmitter::emit`], which may be overridden to filter the stream.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: TransactionEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(EventMessage::new(event));
        }
    }

    fn emit_status(&self, status: StatusKind) {
        self.emit(TransactionEvent::Status { status });
    }

    fn emit_percentage(&self, percentage: impl Into<Percentage>) {
        self.emit(TransactionEvent::Percentage {
            percentage: percentage.into(),
        });
    }

    fn emit_sub_percentage(&self, percentage: impl Into<Percentage>) {
        self.emit(TransactionEvent::SubPercentage {
            percentage: percentage.into(),
        });
    }

    fn emit_allow_cancel(&self, allowed: bool) {
        self.emit(TransactionEvent::AllowCancel { allowed });
    }

    /// Emit a package line
    fn emit_package(&self, id: PackageId, info: InfoKind, summary: impl Into<String>) {
        self.emit(TransactionEvent::Package(PackageResult::new(id, info, summary)));
    }

    fn emit_details(&self, details: PackageDetails) {
        self.emit(TransactionEvent::Details(details));
    }

    fn emit_files(&self, package_id: Option<PackageId>, files: Vec<String>) {
        self.emit(TransactionEvent::Files { package_id, files });
    }

    fn emit_update_detail(&self, detail: UpdateDetail) {
        self.emit(TransactionEvent::UpdateDetail(detail));
    }

    fn emit_distro_upgrade(&self, upgrade: DistroUpgrade) {
        self.emit(TransactionEvent::DistroUpgrade(upgrade));
    }

    fn emit_repo_detail(&self, repo: RepositoryDescriptor) {
        self.emit(TransactionEvent::RepoDetail(repo));
    }

    fn emit_repo_signature_required(&self, requirement: SignatureRequirement) {
        self.emit(TransactionEvent::RepoSignatureRequired(requirement));
    }

    fn emit_eula_required(&self, requirement: EulaRequirement) {
        self.emit(TransactionEvent::EulaRequired(requirement));
    }

    fn emit_require_restart(&self, restart: RestartKind, package_id: Option<PackageId>) {
        self.emit(TransactionEvent::RequireRestart {
            restart,
            package_id,
        });
    }

    /// Emit a non-fatal notice
    fn emit_message(&self, message: impl Into<String>) {
        self.emit(TransactionEvent::Message {
            message: message.into(),
        });
    }

    fn emit_error_code(&self, code: ErrorCode, message: impl Into<String>) {
        self.emit(TransactionEvent::ErrorCode {
            code,
            message: message.into(),
        });
    }

    fn emit_finished(&self, exit: ExitKind) {
        self.emit(TransactionEvent::Finished { exit });
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

#[derive(Debug, Default)]
struct EmitterState {
    sequence: u64,
    finished: bool,
    seen: HashSet<(PackageId, InfoKind)>,
    progress: ProgressState,
    error: Option<ErrorCode>,
}

/// Emitter bound to one transaction
#[derive(Debug)]
pub struct TransactionEmitter {
    sender: EventSender,
    transaction_id: String,
    /// Copied onto the metadata of every event
    labels: BTreeMap<String, String>,
    state: Mutex<EmitterState>,
}

impl TransactionEmitter {
    #[must_use]
    pub fn new(sender: EventSender, transaction_id: impl Into<String>) -> Self {
        Self {
            sender,
            transaction_id: transaction_id.into(),
            labels: BTreeMap::new(),
            state: Mutex::new(EmitterState::default()),
        }
    }

    /// Label every event this emitter sends
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// Progress values as last accepted by this emitter
    #[must_use]
    pub fn progress(&self) -> ProgressState {
        self.lock().progress
    }

    /// First error code emitted, if any
    #[must_use]
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.lock().error
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.lock().finished
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EmitterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn send(&self, state: &mut EmitterState, event: TransactionEvent) {
        let meta = self.labels.iter().fold(
            EventMeta::new(event.log_level(), event.event_source())
                .with_correlation_id(self.transaction_id.clone())
                .with_sequence(state.sequence),
            |meta, (key, value)| meta.with_label(key.clone(), value.clone()),
        );
        state.sequence += 1;
        let _ = self.sender.send(EventMessage::with_meta(meta, event));
    }
}

impl EventEmitter for TransactionEmitter {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.sender)
    }

    fn emit(&self, event: TransactionEvent) {
        let mut state = self.lock();

        if state.finished {
            tracing::error!(
                transaction = %self.transaction_id,
                ?event,
                "event emitted after finished, dropping"
            );
            return;
        }

        match &event {
            TransactionEvent::Package(result) => {
                if !state.seen.insert(result.dedup_key()) {
                    tracing::debug!(
                        transaction = %self.transaction_id,
                        package = %result.id,
                        info = %result.info,
                        "duplicate package event suppressed"
                    );
                    return;
                }
            }
            TransactionEvent::ErrorCode { code, .. } => {
                state.error.get_or_insert(*code);
            }
            TransactionEvent::Finished { exit } => {
                if *exit == ExitKind::Success
                    && state.error.is_none()
                    && state.progress.is_incomplete()
                {
                    let complete = TransactionEvent::Percentage {
                        percentage: Percentage::COMPLETE,
                    };
                    state.progress.apply(&complete);
                    self.send(&mut state, complete);
                }
                state.finished = true;
            }
            _ => {}
        }

        if let ProgressUpdate::Regressed { current } = state.progress.apply(&event) {
            tracing::warn!(
                transaction = %self.transaction_id,
                current,
                ?event,
                "percentage regression dropped"
            );
            return;
        }

        self.send(&mut state, event);
    }
}
