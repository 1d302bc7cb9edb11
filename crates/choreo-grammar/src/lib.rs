//! Parsers for the two **choreo** description grammars.
//!
//! A *state description* lists the events an element reacts to while in a
//! state; each event carries effect clauses whose words follow the *motion
//! grammar*. Both parsers are tolerant: unknown words are skipped and
//! reported as [`Diagnostic`]s, never as errors.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`ast`] | `StateDescriptor`, `EventDescriptor`, `On`, `Effect`, `Trigger` |
//! | [`error`] | `Diagnostic` |
//! | [`lexer`] | `Lexer`, `Token` |
//! | [`motion`] | `MotionAttrs`, `parse_motion`, value types |
//! | [`parser`] | `parse_state` entry point |
//!
//! # Quick start
//!
//! ```rust
//! use choreo_grammar::{parse_state, On};
//!
//! let events = parse_state("on click enter left move 40px over 0.5s go shown");
//! assert_eq!(events[0].on, On::Autostart);
//! assert_eq!(events[1].on, On::Event("click".into()));
//! assert_eq!(events[1].goto.as_deref(), Some("shown"));
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod motion;
pub mod parser;

pub use ast::{
    parse_effect, ActionEncoding, Effect, EffectKind, EventDescriptor, On, StateDescriptor, Trigger,
    AUTOSTART, DEFAULT_STATE,
};
pub use error::Diagnostic;
pub use motion::{parse_motion, parse_motion_with_diagnostics, MotionAttrs};
pub use parser::{parse_state, parse_state_descriptor, parse_state_with_diagnostics};
