//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating an `iceasc.toml` file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The target names a chip or package the architecture does not know.
    #[error("unknown target device: {0}")]
    UnknownChip(#[from] iceasc_arch::ArchError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use iceasc_arch::ArchError;

    #[test]
    fn display_missing_field() {
        let err = ConfigError::MissingField("target.chip".to_string());
        assert_eq!(format!("{err}"), "missing required field: target.chip");
    }

    #[test]
    fn display_unknown_chip() {
        let err = ConfigError::from(ArchError::UnknownChip("xc7a35t".to_string()));
        assert_eq!(format!("{err}"), "unknown target device: unknown chip 'xc7a35t'");
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::IoError(io_err);
        assert!(format!("{err}").starts_with("failed to read configuration:"));
    }
}
