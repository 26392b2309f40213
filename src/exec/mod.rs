// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] turns a raw command line into a [`CommandSpec`].
//! - [`process`] spawns one command in its own process group and kills the
//!   group on cancellation.
//! - [`commander`] runs the configured lines in order as one chain.
//! - [`backend`] provides the `ChainBackend` trait the orchestrator drives,
//!   so tests can swap in a fake chain.

pub mod backend;
pub mod command;
pub mod commander;
pub mod process;

pub use backend::{ChainBackend, ChainRun, RunOutcome};
pub use command::CommandSpec;
pub use commander::Commander;
