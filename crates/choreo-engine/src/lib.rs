//! Choreo engine crate.
//!
//! Owns everything between a parsed description and the host: style
//! classes, the descriptor compiler, per-element job queues, job building,
//! frame scheduling and logging setup. The state machine lives one layer up
//! in `choreo-machine`.

pub mod compile;
pub mod config;
pub mod core;
pub mod host;
pub mod job;
pub mod logging;
pub mod queue;
pub mod style;
pub mod time;

pub use crate::core::Services;
