//! Transaction lifecycle
//!
//! A transaction moves `Idle -> Validating -> Gating -> Executing ->
//! Terminal`. Gating is skipped by operations that install nothing.
//! Whatever happens, the stream of a transaction that left `Idle` ends
//! with exactly one `finished` event, preceded by an error code when the
//! transaction was cancelled or failed.
//!
//! Cancellation is cooperative. A request made while cancellation is
//! allowed is honoured at the next tick boundary, even if the step running
//! at the time withdraws permission. A request made while it
//! is disallowed is queued until a boundary where it is allowed again,
//! and then acknowledged after the configured grace delay. A queued
//! request still pending when the transaction completes is dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use pkengine_errors::{Error, ErrorCode, OpsError, UserFacingError};
use pkengine_events::{EventEmitter, ExitKind, TransactionEmitter};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tracing::Instrument;

use crate::context::{ActiveGuard, EngineShared};
use crate::phase::{Phase, PhaseCx, Step};
use crate::plan;
use crate::Operation;

/// How a transaction ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalState {
    Finished,
    Cancelled,
    Errored,
}

/// Lifecycle position of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    Idle,
    Validating,
    Gating,
    Executing,
    Terminal(TerminalState),
}

impl TransactionState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal(_))
    }
}

/// Summary returned when a transaction has run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutcome {
    pub transaction_id: String,
    pub terminal: TerminalState,
    pub error: Option<ErrorCode>,
}

impl TransactionOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.terminal == TerminalState::Finished
    }
}

/// Answer to a cancellation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CancelRequest {
    /// Honoured at the next tick boundary
    Accepted,
    /// Held until cancellation is allowed again
    Queued,
    /// The transaction already reached a terminal state
    AlreadyFinished,
}

#[derive(Debug)]
struct ControlState {
    state: TransactionState,
    allowed: bool,
    requested: bool,
    queued: bool,
}

/// State shared between a running transaction and its handles
#[derive(Debug)]
pub(crate) struct Control {
    inner: Mutex<ControlState>,
    wake: Notify,
}

impl Control {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(ControlState {
                state: TransactionState::Idle,
                allowed: false,
                requested: false,
                queued: false,
            }),
            wake: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> TransactionState {
        self.lock().state
    }

    fn advance(&self, next: TransactionState) {
        let mut inner = self.lock();
        if inner.state.is_terminal() {
            tracing::error!(from = ?inner.state, to = ?next, "transition out of terminal state ignored");
            return;
        }
        tracing::debug!(from = ?inner.state, to = ?next, "transaction state");
        inner.state = next;
    }

    fn request_cancel(&self) -> CancelRequest {
        let mut inner = self.lock();
        if inner.state.is_terminal() {
            return CancelRequest::AlreadyFinished;
        }
        if inner.requested {
            return if inner.queued {
                CancelRequest::Queued
            } else {
                CancelRequest::Accepted
            };
        }

        inner.requested = true;
        if inner.allowed {
            drop(inner);
            self.wake.notify_one();
            CancelRequest::Accepted
        } else {
            inner.queued = true;
            tracing::warn!("cancel requested while not allowed, queued");
            CancelRequest::Queued
        }
    }

    pub(crate) fn set_allowed(&self, allowed: bool) {
        let mut inner = self.lock();
        inner.allowed = allowed;
        if allowed && inner.requested {
            drop(inner);
            self.wake.notify_one();
        }
    }

    fn is_allowed(&self) -> bool {
        self.lock().allowed
    }

    /// `Some(queued)` when a cancellation must be honoured now.
    ///
    /// An accepted request stays honourable after cancellation is withdrawn;
    /// only a queued one waits for it to be allowed again.
    fn pending(&self) -> Option<bool> {
        let inner = self.lock();
        (inner.requested && (inner.allowed || !inner.queued)).then_some(inner.queued)
    }

    /// Wait out one tick, waking early for an honourable cancellation
    async fn wait(&self, delay: Duration) {
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = self.wake.notified() => {}
        }
    }

    /// Enter the terminal state; returns whether a request was left unhonoured
    fn close(&self, terminal: TerminalState) -> bool {
        let mut inner = self.lock();
        inner.state = TransactionState::Terminal(terminal);
        inner.allowed = false;
        inner.requested && terminal != TerminalState::Cancelled
    }
}

/// Caller side of a transaction
#[derive(Debug, Clone)]
pub struct TransactionHandle {
    id: String,
    control: Arc<Control>,
}

impl TransactionHandle {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.control.state()
    }

    #[must_use]
    pub fn is_cancel_allowed(&self) -> bool {
        self.control.is_allowed()
    }

    /// Ask the transaction to stop.
    pub fn cancel(&self) -> CancelRequest {
        let answer = self.control.request_cancel();
        tracing::info!(transaction = %self.id, ?answer, "cancel requested");
        answer
    }
}

enum Conclusion {
    Completed,
    Cancelled,
    Failed(Error),
}

/// A transaction ready to run
pub struct Transaction {
    shared: Arc<EngineShared>,
    guard: ActiveGuard,
    operation: Operation,
    emitter: TransactionEmitter,
    control: Arc<Control>,
}

impl Transaction {
    pub(crate) fn new(
        shared: Arc<EngineShared>,
        guard: ActiveGuard,
        id: String,
        operation: Operation,
    ) -> (Self, TransactionHandle) {
        let control = Arc::new(Control::new());
        let emitter = TransactionEmitter::new(shared.events.clone(), id.clone())
            .with_label("role", operation.role());
        let handle = TransactionHandle {
            id,
            control: Arc::clone(&control),
        };
        (
            Self {
                shared,
                guard,
                operation,
                emitter,
                control,
            },
            handle,
        )
    }

    #[must_use]
    pub fn id(&self) -> &str {
        self.emitter.transaction_id()
    }

    #[must_use]
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Run the transaction to its terminal state.
    pub async fn run(self) -> TransactionOutcome {
        let span = tracing::info_span!(
            "transaction",
            id = %self.id(),
            role = self.operation.role()
        );
        self.drive().instrument(span).await
    }

    async fn drive(self) -> TransactionOutcome {
        let Self {
            shared,
            guard,
            operation,
            emitter,
            control,
        } = self;
        tracing::info!(mutating = operation.is_mutating(), "transaction started");

        let locale = shared.locale.locale();
        let cx = PhaseCx {
            shared: &shared,
            emitter: &emitter,
            control: &control,
            locale: &locale,
        };

        let conclusion = run_states(&cx, operation).await;
        let outcome = conclude(&cx, conclusion);
        drop(guard);
        outcome
    }
}

async fn run_states(cx: &PhaseCx<'_>, operation: Operation) -> Conclusion {
    cx.control.advance(TransactionState::Validating);
    let plan = match plan::prepare(cx, operation) {
        Ok(plan) => plan,
        Err(err) => return Conclusion::Failed(err),
    };

    if !plan.gate.is_empty() {
        cx.control.advance(TransactionState::Gating);
        if let Err(err) = crate::install::gate(cx, &plan.gate) {
            return Conclusion::Failed(err);
        }
    }

    cx.control.advance(TransactionState::Executing);
    execute(cx, plan.phases).await
}

async fn execute(cx: &PhaseCx<'_>, phases: Vec<Box<dyn Phase>>) -> Conclusion {
    for mut phase in phases {
        tracing::debug!(phase = phase.name(), "phase started");
        loop {
            match phase.step(cx).await {
                Ok(Step::Tick(delay)) => {
                    cx.control.wait(delay).await;
                    if observe_cancel(cx).await {
                        return Conclusion::Cancelled;
                    }
                }
                Ok(Step::Done) => break,
                Err(err) => return Conclusion::Failed(err),
            }
        }
        if observe_cancel(cx).await {
            return Conclusion::Cancelled;
        }
    }
    Conclusion::Completed
}

/// Honour a pending cancellation, waiting out the grace delay for queued ones
async fn observe_cancel(cx: &PhaseCx<'_>) -> bool {
    let Some(queued) = cx.control.pending() else {
        return false;
    };
    if queued {
        let grace = cx.timing().cancel_grace();
        tracing::debug!(?grace, "honouring queued cancellation");
        tokio::time::sleep(grace).await;
    }
    true
}

fn conclude(cx: &PhaseCx<'_>, conclusion: Conclusion) -> TransactionOutcome {
    let (terminal, exit) = match &conclusion {
        Conclusion::Completed => (TerminalState::Finished, ExitKind::Success),
        Conclusion::Cancelled => (TerminalState::Cancelled, ExitKind::Cancelled),
        Conclusion::Failed(_) => (TerminalState::Errored, ExitKind::Failed),
    };

    match conclusion {
        Conclusion::Completed => {}
        Conclusion::Cancelled => {
            let cancelled = OpsError::TransactionCancelled;
            cx.emitter
                .emit_error_code(ErrorCode::TransactionCancelled, capitalise(&cancelled.to_string()));
        }
        Conclusion::Failed(err) => {
            tracing::warn!(error = %err, code = %err.code(), "transaction failed");
            cx.emitter.emit_error_code(err.code(), err.user_message());
        }
    }

    if cx.control.close(terminal) {
        tracing::debug!("queued cancellation dropped, transaction already complete");
    }
    cx.emitter.emit_finished(exit);
    tracing::info!(
        ?terminal,
        percentage = %cx.emitter.progress().percentage,
        "transaction finished"
    );

    TransactionOutcome {
        transaction_id: cx.emitter.transaction_id().to_string(),
        terminal,
        error: cx.emitter.error_code(),
    }
}

fn capitalise(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
