//! Scene configuration: typed lookup of per-object values with total fallbacks.
//!
//! Values are addressed by object name, info tag, property kind and value type.
//! A miss is never an error: every supported value type has a documented default.
//!
//! # Invariants
//! - The store is read-only once loaded; runtime-mutable values (fog) are copied
//!   out into session state.
//! - Only matrices, colors, floats and booleans can be resolved.

mod file;
mod key;
mod settings;
mod station;
mod store;
mod value;

pub use file::{ConfigFile, ObjectEntry, RotationDegrees};
pub use key::{ConfigKey, PropertyKind, ValueType};
pub use settings::{CameraSettings, FogSettings};
pub use station::STATION_OBJECTS;
pub use store::{ConfigStore, ObjectConfig};
pub use value::{ConfigValue, ConfigValueType};

/// Errors from loading configuration files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub fn crate_info() -> &'static str {
    "station-config v0.1.0"
}
