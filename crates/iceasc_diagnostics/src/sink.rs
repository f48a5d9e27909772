//! Thread-safe diagnostic accumulator.

use crate::diagnostic::Diagnostic;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Collects diagnostics emitted by the codec.
///
/// The sink is shared by reference; emitting only needs `&self`, so the same
/// sink can be handed to several loads running on different threads.
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        // a panic while pushing cannot leave the vector inconsistent
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a diagnostic.
    pub fn emit(&self, diag: Diagnostic) {
        self.lock().push(diag);
    }

    /// Returns a copy of the accumulated diagnostics, in emission order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}
