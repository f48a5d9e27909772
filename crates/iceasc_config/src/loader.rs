//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::IceascConfig;
use std::path::Path;

/// File name looked up inside a project directory.
pub const CONFIG_FILE_NAME: &str = "iceasc.toml";

/// Loads and validates `<dir>/iceasc.toml`.
pub fn load_config(dir: &Path) -> Result<IceascConfig, ConfigError> {
    let content = std::fs::read_to_string(dir.join(CONFIG_FILE_NAME))?;
    load_config_from_str(&content)
}

/// Parses and validates an `iceasc.toml` document held in memory.
pub fn load_config_from_str(content: &str) -> Result<IceascConfig, ConfigError> {
    let config: IceascConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &IceascConfig) -> Result<(), ConfigError> {
    if let Some(target) = &config.target {
        if target.chip.trim().is_empty() {
            return Err(ConfigError::MissingField("target.chip".to_string()));
        }
        if target.package.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "target.package must not be empty".to_string(),
            ));
        }
    }
    if let Some(comment) = &config.write.comment {
        if comment.contains('\n') {
            return Err(ConfigError::ValidationError(
                "write.comment must be a single line".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_full_config() {
        let toml = r#"
[target]
chip = "hx1k"
package = "tq144"

[write]
annotations = false
comment = "written by iceasc"

[read]
apply_net_names = false
"#;
        let config = load_config_from_str(toml).unwrap();
        let target = config.target.unwrap();
        assert_eq!(target.chip, "hx1k");
        assert_eq!(target.package.as_deref(), Some("tq144"));
        assert!(!config.write.annotations);
        assert_eq!(config.write.comment.as_deref(), Some("written by iceasc"));
        assert!(!config.read.apply_net_names);
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(load_config_from_str("").unwrap(), IceascConfig::default());
    }

    #[test]
    fn blank_chip_errors() {
        let err = load_config_from_str("[target]\nchip = \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn missing_chip_is_a_parse_error() {
        let err = load_config_from_str("[target]\npackage = \"tq144\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn multiline_comment_errors() {
        let err = load_config_from_str("[write]\ncomment = \"a\\nb\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        writeln!(file, "[target]\nchip = \"up5k\"").unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.target.unwrap().chip, "up5k");
    }

    #[test]
    fn io_error_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
