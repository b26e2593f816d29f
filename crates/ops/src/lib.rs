#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Transaction scheduling for pkengine
//!
//! An [`Engine`] owns the collaborators every transaction needs and admits
//! one transaction at a time. A [`Transaction`] validates its
//! [`Operation`], gates install targets on signature and license
//! acceptance, then executes a list of tick-driven phases, reporting every
//! observable effect as an event. Ramp operations follow checkpoint tables
//! so their event schedules are plain data.

mod context;
mod install;
mod operation;
mod phase;
mod plan;
mod query;
mod repository;
mod schedule;
mod transaction;
mod uninstall;
mod update;

pub use context::{Engine, EngineBuilder};
pub use operation::Operation;
pub use transaction::{
    CancelRequest, TerminalState, Transaction, TransactionHandle, TransactionOutcome,
    TransactionState,
};
