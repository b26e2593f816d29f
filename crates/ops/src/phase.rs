//! Execution phases
//!
//! A transaction executes a list of phases. Each call to [`Phase::step`]
//! does one tick's worth of work and either asks the scheduler to wait
//! before the next tick or reports that the phase is complete. Waiting
//! between ticks is the only point where cancellation is observed.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use pkengine_config::TimingConfig;
use pkengine_errors::{Error, StoreError};
use pkengine_events::{EventEmitter, TransactionEmitter};
use pkengine_store::{PackageRecord, ResolvableStore};
use pkengine_types::{FilterSet, InfoKind};

use crate::context::EngineShared;
use crate::schedule::{Action, Checkpoint, Schedule, Subject};
use crate::transaction::Control;

/// What the scheduler does after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Wait this long, then step again
    Tick(Duration),
    Done,
}

/// Everything a phase may touch while stepping
pub(crate) struct PhaseCx<'a> {
    pub shared: &'a EngineShared,
    pub emitter: &'a TransactionEmitter,
    pub control: &'a Control,
    pub locale: &'a str,
}

impl PhaseCx<'_> {
    pub fn store(&self) -> &dyn ResolvableStore {
        self.shared.store.as_ref()
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.shared.config.timing
    }

    pub fn is_online(&self) -> bool {
        self.shared.network.is_online()
    }

    /// Change whether the transaction may be cancelled and announce it
    pub fn allow_cancel(&self, allowed: bool) {
        self.control.set_allowed(allowed);
        self.emitter.emit_allow_cancel(allowed);
    }

    /// Emit a package line with the summary rendered for the caller locale
    pub fn package(&self, record: &PackageRecord, info: InfoKind) {
        self.emitter
            .emit_package(record.id.clone(), info, record.summary.render(self.locale));
    }

    /// Emit each record passing `filters` with its installed state
    pub fn packages(&self, records: impl IntoIterator<Item = PackageRecord>, filters: &FilterSet) {
        for record in records {
            if filters.matches(&record.facets) {
                self.package(&record, record.state());
            }
        }
    }

    /// Look a package up, logging ids the store does not know
    pub fn lookup(&self, id: &pkengine_types::PackageId) -> Option<PackageRecord> {
        let record = self.store().lookup(id);
        if record.is_none() {
            tracing::warn!(package = %id, "unknown package skipped");
        }
        record
    }
}

#[async_trait]
pub(crate) trait Phase: Send {
    fn name(&self) -> &'static str;

    async fn step(&mut self, cx: &PhaseCx<'_>) -> Result<Step, Error>;
}

impl fmt::Debug for dyn Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Phase").field(&self.name()).finish()
    }
}

pub(crate) type Work = Box<dyn FnOnce(&PhaseCx<'_>) -> Result<(), Error> + Send>;

/// Runs a piece of work once, optionally after one tick
pub(crate) struct Once {
    name: &'static str,
    delay: Option<Duration>,
    cancellable: bool,
    work: Option<Work>,
}

impl Once {
    pub fn new(
        name: &'static str,
        work: impl FnOnce(&PhaseCx<'_>) -> Result<(), Error> + Send + 'static,
    ) -> Self {
        Self {
            name,
            delay: None,
            cancellable: false,
            work: Some(Box::new(work)),
        }
    }

    /// Wait one tick of `delay` before doing the work
    #[must_use]
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Allow cancellation when the phase starts
    #[must_use]
    pub fn cancellable(mut self) -> Self {
        self.cancellable = true;
        self
    }
}

#[async_trait]
impl Phase for Once {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn step(&mut self, cx: &PhaseCx<'_>) -> Result<Step, Error> {
        if self.cancellable {
            self.cancellable = false;
            cx.allow_cancel(true);
        }
        if let Some(delay) = self.delay.take() {
            return Ok(Step::Tick(delay));
        }
        if let Some(work) = self.work.take() {
            work(cx)?;
        }
        Ok(Step::Done)
    }
}

/// Packages a ramp's checkpoints can name
#[derive(Debug, Default)]
pub(crate) struct Subjects {
    pub targets: Vec<PackageRecord>,
    pub derived: Vec<PackageRecord>,
    pub items: Vec<PackageRecord>,
}

impl Subjects {
    fn select(&self, subject: Subject) -> &[PackageRecord] {
        match subject {
            Subject::Targets => &self.targets,
            Subject::Derived => &self.derived,
            Subject::Item(index) => self
                .items
                .get(index)
                .map(std::slice::from_ref)
                .unwrap_or_default(),
        }
    }
}

/// Perform one table action
pub(crate) fn apply(cx: &PhaseCx<'_>, subjects: &Subjects, action: Action) {
    match action {
        Action::Status(status) => cx.emitter.emit_status(status),
        Action::AllowCancel(allowed) => cx.allow_cancel(allowed),
        Action::Percentage(percentage) => cx.emitter.emit_percentage(percentage),
        Action::Emit { subject, info } => {
            for record in subjects.select(subject) {
                cx.package(record, info);
            }
        }
        Action::MarkUpdated(index) => {
            if let Some(record) = subjects.items.get(index) {
                cx.store().mark_updated(&record.id);
            }
        }
        Action::ClearUpdated(index) => {
            if let Some(record) = subjects.items.get(index) {
                cx.store().clear_updated(&record.id);
            }
        }
    }
}

/// Percentage ramp driven by a checkpoint table
pub(crate) struct Ramp {
    name: &'static str,
    schedule: &'static Schedule,
    subjects: Subjects,
    tick: Duration,
    percentage: u8,
}

impl Ramp {
    pub fn new(
        name: &'static str,
        schedule: &'static Schedule,
        subjects: Subjects,
        tick: Duration,
    ) -> Self {
        Self {
            name,
            schedule,
            subjects,
            tick,
            percentage: 0,
        }
    }

    fn fire(&self, cx: &PhaseCx<'_>, checkpoint: &Checkpoint) {
        if let Some(index) = checkpoint.unless_updated {
            let pending = self
                .subjects
                .items
                .get(index)
                .is_some_and(|record| !cx.store().is_updated(&record.id));
            if !pending {
                tracing::trace!(at = checkpoint.at, index, "checkpoint skipped");
                return;
            }
        }
        for action in checkpoint.actions {
            apply(cx, &self.subjects, *action);
        }
    }
}

#[async_trait]
impl Phase for Ramp {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn step(&mut self, cx: &PhaseCx<'_>) -> Result<Step, Error> {
        if self.percentage >= 100 {
            return Ok(Step::Done);
        }

        for checkpoint in self.schedule.at(self.percentage) {
            self.fire(cx, checkpoint);
        }
        if let Some(sub) = self.schedule.sub_percentage(self.percentage) {
            cx.emitter.emit_sub_percentage(sub);
        }

        self.percentage = self.schedule.advance(self.percentage);
        cx.emitter.emit_percentage(self.percentage);
        Ok(Step::Tick(self.tick))
    }
}

/// Emits one package per tick, then runs closing actions
pub(crate) struct Sweep {
    name: &'static str,
    records: Vec<PackageRecord>,
    info: InfoKind,
    mark_updated: bool,
    closing: &'static [Action],
    tick: Duration,
    next: usize,
    waited: bool,
}

impl Sweep {
    pub fn new(
        name: &'static str,
        records: Vec<PackageRecord>,
        info: InfoKind,
        tick: Duration,
    ) -> Self {
        Self {
            name,
            records,
            info,
            mark_updated: false,
            closing: &[],
            tick,
            next: 0,
            waited: false,
        }
    }

    #[must_use]
    pub fn marking_updated(mut self) -> Self {
        self.mark_updated = true;
        self
    }

    #[must_use]
    pub fn closing(mut self, actions: &'static [Action]) -> Self {
        self.closing = actions;
        self
    }
}

#[async_trait]
impl Phase for Sweep {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn step(&mut self, cx: &PhaseCx<'_>) -> Result<Step, Error> {
        if !self.waited && !self.records.is_empty() {
            self.waited = true;
            return Ok(Step::Tick(self.tick));
        }

        if let Some(record) = self.records.get(self.next) {
            cx.package(record, self.info);
            if self.mark_updated {
                cx.store().mark_updated(&record.id);
            }
            self.next += 1;
            if self.next < self.records.len() {
                return Ok(Step::Tick(self.tick));
            }
        }

        let subjects = Subjects::default();
        for action in self.closing {
            apply(cx, &subjects, *action);
        }
        Ok(Step::Done)
    }
}

/// Writes each package's artifact into a directory
pub(crate) struct Download {
    records: Vec<PackageRecord>,
    directory: PathBuf,
}

impl Download {
    pub fn new(records: Vec<PackageRecord>, directory: PathBuf) -> Self {
        Self { records, directory }
    }
}

#[async_trait]
impl Phase for Download {
    fn name(&self) -> &'static str {
        "download"
    }

    async fn step(&mut self, cx: &PhaseCx<'_>) -> Result<Step, Error> {
        let mut written = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let artifact =
                cx.store()
                    .artifact(&record.id)
                    .ok_or_else(|| StoreError::ArtifactMissing {
                        package_id: record.id.to_string(),
                    })?;
            let path = cx.shared.writer.write(&self.directory, &artifact).await?;
            tracing::debug!(package = %record.id, path = %path.display(), "artifact written");
            cx.package(record, InfoKind::Downloading);
            written.push(path.display().to_string());
        }
        cx.emitter.emit_files(None, written);
        Ok(Step::Done)
    }
}
