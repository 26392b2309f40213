// src/engine/mod.rs

//! Reload engine.
//!
//! - [`orchestrator`] is the control loop: change in, cancel, debounce,
//!   await, restart.
//! - [`observer`] holds the lifecycle hooks the loop and the chain report
//!   through.

pub mod observer;
pub mod orchestrator;

pub use observer::{NoopObserver, Observer, TracingObserver};
pub use orchestrator::{DEFAULT_DELAY, Orchestrator};
