//! Checkpoint tables for tick-driven operations
//!
//! A ramp operation advances its overall percentage by a fixed step on
//! every tick. The events it emits along the way are listed here as data:
//! each [`Checkpoint`] names the percentage it fires at and the actions it
//! performs. Every percentage is visited once per transaction, so each
//! checkpoint fires at most once.

use pkengine_types::{InfoKind, Percentage, StatusKind};

/// Which packages an [`Action::Emit`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Subject {
    /// Packages the caller asked for
    Targets,
    /// Packages pulled in by the targets
    Derived,
    /// One entry of the ordered update list
    Item(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Status(StatusKind),
    AllowCancel(bool),
    Percentage(u8),
    Emit { subject: Subject, info: InfoKind },
    MarkUpdated(usize),
    ClearUpdated(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Checkpoint {
    pub at: u8,
    /// Skip the checkpoint when this update item is already updated, or
    /// when there is no such item
    pub unless_updated: Option<usize>,
    pub actions: &'static [Action],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Schedule {
    pub step: u8,
    /// Percentage range over which a sub-percentage is reported
    pub sub_window: Option<(u8, u8)>,
    pub checkpoints: &'static [Checkpoint],
}

impl Schedule {
    /// Checkpoints firing at `percentage`, in table order
    pub fn at(&self, percentage: u8) -> impl Iterator<Item = &'static Checkpoint> {
        self.checkpoints.iter().filter(move |c| c.at == percentage)
    }

    /// Sub-percentage to report at `percentage`, if this schedule reports one
    pub fn sub_percentage(&self, percentage: u8) -> Option<Percentage> {
        let (low, high) = self.sub_window?;
        if percentage > low && percentage < high {
            let span = u16::from(high - low);
            let done = u16::from(percentage - low) * 100 / span;
            Some(Percentage::new(u8::try_from(done).unwrap_or(100)))
        } else {
            Some(Percentage::UNKNOWN)
        }
    }

    /// Percentage following `percentage`, capped at 100
    pub fn advance(&self, percentage: u8) -> u8 {
        percentage.saturating_add(self.step).min(100)
    }
}

pub(crate) const INSTALL: Schedule = Schedule {
    step: 1,
    sub_window: Some((30, 50)),
    checkpoints: &[
        Checkpoint {
            at: 0,
            unless_updated: None,
            actions: &[
                Action::AllowCancel(true),
                Action::Status(StatusKind::Download),
                Action::Emit {
                    subject: Subject::Targets,
                    info: InfoKind::Downloading,
                },
            ],
        },
        Checkpoint {
            at: 30,
            unless_updated: None,
            actions: &[
                Action::AllowCancel(false),
                Action::Emit {
                    subject: Subject::Targets,
                    info: InfoKind::Installing,
                },
                Action::Status(StatusKind::Install),
            ],
        },
        Checkpoint {
            at: 50,
            unless_updated: None,
            actions: &[
                Action::Emit {
                    subject: Subject::Derived,
                    info: InfoKind::Installing,
                },
                Action::Status(StatusKind::Install),
            ],
        },
    ],
};

pub(crate) const UPDATE_SYSTEM: Schedule = Schedule {
    step: 10,
    sub_window: None,
    checkpoints: &[
        Checkpoint {
            at: 0,
            unless_updated: None,
            actions: &[Action::AllowCancel(true)],
        },
        Checkpoint {
            at: 0,
            unless_updated: Some(0),
            actions: &[Action::Emit {
                subject: Subject::Item(0),
                info: InfoKind::Downloading,
            }],
        },
        Checkpoint {
            at: 20,
            unless_updated: Some(1),
            actions: &[Action::Emit {
                subject: Subject::Item(1),
                info: InfoKind::Downloading,
            }],
        },
        Checkpoint {
            at: 30,
            unless_updated: Some(2),
            actions: &[
                Action::Emit {
                    subject: Subject::Item(2),
                    info: InfoKind::Blocked,
                },
                Action::ClearUpdated(2),
            ],
        },
        Checkpoint {
            at: 40,
            unless_updated: Some(0),
            actions: &[
                Action::Status(StatusKind::Update),
                Action::AllowCancel(false),
                Action::Emit {
                    subject: Subject::Item(0),
                    info: InfoKind::Installing,
                },
                Action::MarkUpdated(0),
            ],
        },
        Checkpoint {
            at: 60,
            unless_updated: Some(1),
            actions: &[
                Action::Emit {
                    subject: Subject::Item(1),
                    info: InfoKind::Updating,
                },
                Action::MarkUpdated(1),
            ],
        },
        Checkpoint {
            at: 80,
            unless_updated: Some(1),
            actions: &[Action::Emit {
                subject: Subject::Item(1),
                info: InfoKind::Cleanup,
            }],
        },
    ],
};

pub(crate) const REFRESH_CACHE: Schedule = Schedule {
    step: 10,
    sub_window: None,
    checkpoints: &[],
};

pub(crate) const WHAT_PROVIDES: Schedule = Schedule {
    step: 10,
    sub_window: None,
    checkpoints: &[Checkpoint {
        at: 0,
        unless_updated: None,
        actions: &[Action::AllowCancel(true)],
    }],
};

/// Actions run after the download sweep of an update
pub(crate) const UPDATE_DOWNLOADED: &[Action] = &[
    Action::Status(StatusKind::Update),
    Action::Percentage(50),
];

/// Actions run after the update sweep
pub(crate) const UPDATE_APPLIED: &[Action] = &[Action::Percentage(100)];

#[cfg(test)]
mod tests {
    use super::*;

    fn percentages(schedule: &Schedule) -> Vec<u8> {
        let mut out = vec![0];
        let mut current = 0;
        while current < 100 {
            current = schedule.advance(current);
            out.push(current);
        }
        out
    }

    #[test]
    fn test_ramps_reach_complete() {
        assert_eq!(percentages(&INSTALL).len(), 101);
        assert_eq!(
            percentages(&UPDATE_SYSTEM),
            vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100]
        );
        assert_eq!(percentages(&REFRESH_CACHE).last(), Some(&100));
    }

    #[test]
    fn test_every_checkpoint_is_reachable() {
        for schedule in [INSTALL, UPDATE_SYSTEM, REFRESH_CACHE, WHAT_PROVIDES] {
            let visited = percentages(&schedule);
            for checkpoint in schedule.checkpoints {
                assert!(visited.contains(&checkpoint.at), "{checkpoint:?}");
            }
        }
    }

    #[test]
    fn test_install_sub_percentage_window() {
        assert_eq!(INSTALL.sub_percentage(30), Some(Percentage::UNKNOWN));
        assert_eq!(INSTALL.sub_percentage(31), Some(Percentage::new(5)));
        assert_eq!(INSTALL.sub_percentage(49), Some(Percentage::new(95)));
        assert_eq!(INSTALL.sub_percentage(50), Some(Percentage::UNKNOWN));
        assert_eq!(UPDATE_SYSTEM.sub_percentage(40), None);
    }

    #[test]
    fn test_install_disallows_cancel_before_installing() {
        let actions: Vec<Action> = INSTALL
            .at(30)
            .flat_map(|c| c.actions.iter().copied())
            .collect();
        assert_eq!(actions[0], Action::AllowCancel(false));
        assert!(actions.contains(&Action::Emit {
            subject: Subject::Targets,
            info: InfoKind::Installing,
        }));
    }

    #[test]
    fn test_update_system_marks_what_it_installs() {
        let at_40: Vec<&Checkpoint> = UPDATE_SYSTEM.at(40).collect();
        assert_eq!(at_40.len(), 1);
        assert_eq!(at_40[0].unless_updated, Some(0));
        assert!(at_40[0].actions.contains(&Action::MarkUpdated(0)));
        assert_eq!(UPDATE_SYSTEM.at(0).count(), 2);
    }
}
