//! Structured diagnostics for the iceasc codec.
//!
//! Fatal problems travel as typed errors; everything the codec notices but can
//! continue past (ambiguous drivers, unrouted nets, stale annotations) is
//! reported as a [`Diagnostic`] into a caller-owned [`DiagnosticSink`].
//! [`TerminalRenderer`] formats them for humans.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod location;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use location::Location;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
