//! Options steering the reader and writer.

use iceasc_config::IceascConfig;

/// Knobs for [`crate::store_with`], [`crate::parse_with`] and
/// [`crate::load_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecOptions {
    /// Write `.net`/`.wire` annotations after the tile data.
    pub annotations: bool,
    /// Text for the `.comment` line.
    pub comment: Option<String>,
    /// Rename reconstructed nets after the annotations found in the text.
    pub apply_net_names: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            annotations: true,
            comment: None,
            apply_net_names: true,
        }
    }
}

impl From<&IceascConfig> for CodecOptions {
    fn from(config: &IceascConfig) -> Self {
        Self {
            annotations: config.write.annotations,
            comment: config.write.comment.clone(),
            apply_net_names: config.read.apply_net_names,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_empty_config() {
        let config = IceascConfig::default();
        assert_eq!(CodecOptions::from(&config), CodecOptions::default());
    }

    #[test]
    fn config_sections_carry_over() {
        let config = iceasc_config::load_config_from_str(
            "[write]\nannotations = false\ncomment = \"hello\"\n[read]\napply_net_names = false\n",
        )
        .unwrap();
        let options = CodecOptions::from(&config);
        assert!(!options.annotations);
        assert!(!options.apply_net_names);
        assert_eq!(options.comment.as_deref(), Some("hello"));
    }
}
