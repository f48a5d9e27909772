//! Target resolution: turning the `[target]` section into a device.

use crate::error::ConfigError;
use crate::types::IceascConfig;
use iceasc_arch::{ArchError, Chip, ChipArgs};

/// Resolves the configured target to a chip and package.
///
/// The package defaults to the chip's first listed package.
pub fn resolve_target(config: &IceascConfig) -> Result<ChipArgs, ConfigError> {
    let target = config
        .target
        .as_ref()
        .ok_or_else(|| ConfigError::MissingField("target".to_string()))?;
    let chip = Chip::from_name(target.chip.trim())
        .ok_or_else(|| ArchError::UnknownChip(target.chip.clone()))?;
    let package = target
        .package
        .as_deref()
        .map(str::trim)
        .unwrap_or_else(|| chip.default_package());
    Ok(ChipArgs::new(chip, package)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn resolve_explicit_package() {
        let config = load_config_from_str("[target]\nchip = \"HX8K\"\npackage = \"tq144\"\n").unwrap();
        let args = resolve_target(&config).unwrap();
        assert_eq!(args.chip, Chip::Hx8k);
        assert_eq!(args.package, "tq144");
    }

    #[test]
    fn resolve_default_package() {
        let config = load_config_from_str("[target]\nchip = \"up5k\"\n").unwrap();
        let args = resolve_target(&config).unwrap();
        assert_eq!(args.package, "sg48");
    }

    #[test]
    fn unknown_chip_errors() {
        let config = load_config_from_str("[target]\nchip = \"ecp5\"\n").unwrap();
        let err = resolve_target(&config).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownChip(ArchError::UnknownChip(_))));
    }

    #[test]
    fn package_must_belong_to_chip() {
        let config = load_config_from_str("[target]\nchip = \"hx1k\"\npackage = \"sg48\"\n").unwrap();
        let err = resolve_target(&config).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownChip(ArchError::UnknownPackage { .. })));
    }

    #[test]
    fn missing_target_errors() {
        let err = resolve_target(&IceascConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }
}
