//! Shared collaborators handed to every element.
//!
//! Nothing in the engine reaches for a global: the host, the style engine,
//! the frame scheduler and the configuration travel together in
//! [`Services`], which is cheap to clone.

mod ctx;

pub use ctx::Services;
