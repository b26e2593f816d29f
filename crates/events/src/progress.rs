//! Progress bookkeeping for a single transaction
//!
//! The state here is folded from the event stream, either by the emitter
//! (to enforce monotonic percentages) or by a consumer rendering progress.

use pkengine_types::{Percentage, StatusKind};
use serde::{Deserialize, Serialize};

use crate::TransactionEvent;

/// Snapshot of the progress-related values last reported by a transaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    pub status: Option<StatusKind>,
    pub percentage: Percentage,
    pub sub_percentage: Percentage,
    pub allow_cancel: bool,
}

/// Outcome of folding one event into a [`ProgressState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressUpdate {
    /// Event accepted, state changed or the event carries no progress
    Applied,
    /// Percentage went backwards or regressed to unknown
    Regressed { current: u8 },
}

impl ProgressState {
    /// Fold an event into the snapshot.
    ///
    /// Once a known percentage has been reported the overall percentage never
    /// decreases and never returns to unknown. Sub-percentages are free to
    /// move in either direction.
    pub fn apply(&mut self, event: &TransactionEvent) -> ProgressUpdate {
        match event {
            TransactionEvent::Status { status } => self.status = Some(*status),
            TransactionEvent::Percentage { percentage } => {
                if let Some(current) = self.percentage.value() {
                    match percentage.value() {
                        Some(next) if next >= current => {}
                        _ => return ProgressUpdate::Regressed { current },
                    }
                }
                self.percentage = *percentage;
            }
            TransactionEvent::SubPercentage { percentage } => self.sub_percentage = *percentage,
            TransactionEvent::AllowCancel { allowed } => self.allow_cancel = *allowed,
            TransactionEvent::Finished { .. } => self.status = Some(StatusKind::Finished),
            _ => {}
        }
        ProgressUpdate::Applied
    }

    /// Whether the overall percentage is known but short of completion
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        matches!(self.percentage.value(), Some(value) if value < 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(value: u8) -> TransactionEvent {
        TransactionEvent::Percentage {
            percentage: Percentage::new(value),
        }
    }

    #[test]
    fn test_percentage_is_monotonic() {
        let mut state = ProgressState::default();
        assert_eq!(state.apply(&pct(10)), ProgressUpdate::Applied);
        assert_eq!(state.apply(&pct(40)), ProgressUpdate::Applied);
        assert_eq!(
            state.apply(&pct(20)),
            ProgressUpdate::Regressed { current: 40 }
        );
        assert_eq!(state.percentage, Percentage::new(40));
    }

    #[test]
    fn test_unknown_after_known_is_rejected() {
        let mut state = ProgressState::default();
        state.apply(&pct(30));
        let update = state.apply(&TransactionEvent::Percentage {
            percentage: Percentage::UNKNOWN,
        });
        assert_eq!(update, ProgressUpdate::Regressed { current: 30 });
    }

    #[test]
    fn test_unknown_before_known_is_accepted() {
        let mut state = ProgressState::default();
        let update = state.apply(&TransactionEvent::Percentage {
            percentage: Percentage::UNKNOWN,
        });
        assert_eq!(update, ProgressUpdate::Applied);
        assert!(!state.is_incomplete());
        state.apply(&pct(60));
        assert!(state.is_incomplete());
    }

    #[test]
    fn test_sub_percentage_may_reset() {
        let mut state = ProgressState::default();
        state.apply(&TransactionEvent::SubPercentage {
            percentage: Percentage::new(80),
        });
        let update = state.apply(&TransactionEvent::SubPercentage {
            percentage: Percentage::UNKNOWN,
        });
        assert_eq!(update, ProgressUpdate::Applied);
        assert_eq!(state.sub_percentage, Percentage::UNKNOWN);
    }
}
