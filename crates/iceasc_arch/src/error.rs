//! Error types for chip database lookups.

/// Errors raised when resolving names against the chip database.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArchError {
    /// A device token or token/package pair that names no chip.
    #[error("unknown device '{0}'")]
    UnknownDevice(String),

    /// A chip name that is not recognised.
    #[error("unknown chip '{0}'")]
    UnknownChip(String),

    /// A package the chip is not sold in.
    #[error("chip {chip} has no package '{package}'")]
    UnknownPackage {
        /// Chip name.
        chip: String,
        /// Requested package.
        package: String,
    },

    /// A wire name with no matching wire.
    #[error("unknown wire '{0}'")]
    UnknownWire(String),

    /// A pip name with no matching pip.
    #[error("unknown pip '{0}'")]
    UnknownPip(String),

    /// A bel name with no matching bel.
    #[error("unknown bel '{0}'")]
    UnknownBel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            ArchError::UnknownDevice("2k".into()).to_string(),
            "unknown device '2k'"
        );
        assert_eq!(
            ArchError::UnknownPackage {
                chip: "up5k".into(),
                package: "tq144".into()
            }
            .to_string(),
            "chip up5k has no package 'tq144'"
        );
    }
}
