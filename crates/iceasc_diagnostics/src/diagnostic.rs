//! Structured diagnostic messages.

use crate::code::DiagnosticCode;
use crate::location::Location;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// One observation made while reading or writing a configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity of this diagnostic.
    pub severity: Severity,
    /// Code identifying the kind of observation.
    pub code: DiagnosticCode,
    /// Main message.
    pub message: String,
    /// Where the observation applies.
    pub location: Location,
    /// Explanatory footnotes.
    pub notes: Vec<String>,
    /// Suggestions for the user.
    pub help: Vec<String>,
}

impl Diagnostic {
    fn with_severity(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            location,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Creates an error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, location: Location) -> Self {
        Self::with_severity(Severity::Error, code, message, location)
    }

    /// Creates a warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, location: Location) -> Self {
        Self::with_severity(Severity::Warning, code, message, location)
    }

    /// Creates a note diagnostic.
    pub fn note(code: DiagnosticCode, message: impl Into<String>, location: Location) -> Self {
        Self::with_severity(Severity::Note, code, message, location)
    }

    /// Adds a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help line.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn builders() {
        let code = DiagnosticCode::new(Category::Netlist, 201);
        let diag = Diagnostic::warning(code, "net has two drivers", Location::Net("n1".into()))
            .with_note("first driver kept")
            .with_help("check the routing bits of the group");
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.notes, vec!["first driver kept".to_string()]);
        assert_eq!(diag.help.len(), 1);

        let note = Diagnostic::note(code, "n", Location::None);
        assert_eq!(note.severity, Severity::Note);
    }

    #[test]
    fn serde_roundtrip() {
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Format, 3),
            "bad row",
            Location::Line(4),
        );
        let json = serde_json::to_string(&diag).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back.location, Location::Line(4));
        assert_eq!(back.message, "bad row");
    }
}
