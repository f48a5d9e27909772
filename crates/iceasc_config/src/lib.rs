//! Parsing and validation of `iceasc.toml` configuration files.
//!
//! The file selects the default target device and tunes how the codec reads
//! and writes ASC text. [`load_config`] produces a strongly-typed
//! [`IceascConfig`]; [`resolve_target`] turns its target section into
//! [`iceasc_arch::ChipArgs`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use resolve::resolve_target;
pub use types::*;
