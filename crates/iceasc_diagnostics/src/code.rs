//! Diagnostic codes with category prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The area a diagnostic code belongs to, which fixes its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Problems in the text being read, prefixed with `E`.
    Format,
    /// Generic warnings, prefixed with `W`.
    Warning,
    /// Netlist structure observations, prefixed with `N`.
    Netlist,
    /// Device-specific observations, prefixed with `S`.
    Silicon,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Format => 'E',
            Category::Warning => 'W',
            Category::Netlist => 'N',
            Category::Silicon => 'S',
        }
    }
}

/// A category prefix plus a number, displayed as e.g. `S401`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// Category of this code.
    pub category: Category,
    /// Number within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(DiagnosticCode::new(Category::Silicon, 401).to_string(), "S401");
        assert_eq!(DiagnosticCode::new(Category::Warning, 7).to_string(), "W007");
        assert_eq!(DiagnosticCode::new(Category::Netlist, 12).to_string(), "N012");
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::new(Category::Format, 101);
        let json = serde_json::to_string(&code).unwrap();
        let back: DiagnosticCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}
