//! Configuration types deserialized from `iceasc.toml`.

use serde::{Deserialize, Serialize};

/// The top-level configuration parsed from `iceasc.toml`.
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IceascConfig {
    /// Default device used when a netlist has to be created from scratch.
    #[serde(default)]
    pub target: Option<TargetConfig>,
    /// Options applied when writing ASC text.
    #[serde(default)]
    pub write: WriteConfig,
    /// Options applied when reading ASC text.
    #[serde(default)]
    pub read: ReadConfig,
}

/// The `[target]` section: a chip variant and an optional package.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Chip name, e.g. `"hx1k"` or `"up5k"`.
    pub chip: String,
    /// Package name; the chip's first package when absent.
    #[serde(default)]
    pub package: Option<String>,
}

/// The `[write]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WriteConfig {
    /// Emit `.net`/`.wire` annotation records after the tile data.
    #[serde(default = "default_true")]
    pub annotations: bool,
    /// Text placed on the `.comment` line.
    #[serde(default)]
    pub comment: Option<String>,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            annotations: true,
            comment: None,
        }
    }
}

/// The `[read]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReadConfig {
    /// Rename reconstructed nets after matching `.net` annotations.
    #[serde(default = "default_true")]
    pub apply_net_names: bool,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            apply_net_names: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_annotations() {
        let config = IceascConfig::default();
        assert!(config.write.annotations);
        assert!(config.read.apply_net_names);
        assert!(config.target.is_none());
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let config: IceascConfig = toml::from_str("[write]\ncomment = \"x\"\n").unwrap();
        assert!(config.write.annotations);
        assert_eq!(config.write.comment.as_deref(), Some("x"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<IceascConfig, _> = toml::from_str("[write]\nannotate = false\n");
        assert!(result.is_err());
    }
}
