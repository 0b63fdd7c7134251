use crate::ConfigError;
use crate::file::{ConfigFile, ObjectEntry};
use crate::key::{ConfigKey, PropertyKind};
use crate::settings::{CameraSettings, FogSettings};
use crate::station::station_entries;
use crate::value::{ConfigValue, ConfigValueType};
use glam::Mat4;
use serde::Serialize;
use station_common::{Color, Transform, rotation_from_degrees};
use std::collections::BTreeMap;
use std::path::Path;

/// Typed configuration table.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    values: BTreeMap<ConfigKey, ConfigValue>,
    camera: CameraSettings,
    fog: FogSettings,
}

impl ConfigStore {
    /// An empty store: every lookup falls back.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in station scene.
    pub fn station() -> Self {
        let mut store = Self::new();
        for entry in station_entries() {
            store.apply_entry(&entry);
        }
        store
    }

    /// Built-in station scene with a YAML document layered on top.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_yaml::from_str(yaml)?;
        let mut store = Self::station();
        store.apply_file(file);
        Ok(store)
    }

    /// Load a YAML config file over the built-in station scene.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let store = Self::from_yaml_str(&yaml)?;
        tracing::info!("loaded config overrides from {}", path.display());
        Ok(store)
    }

    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(camera) = file.camera {
            self.camera = camera;
        }
        if let Some(fog) = file.fog {
            self.fog = fog;
        }
        for entry in &file.objects {
            self.apply_entry(entry);
        }
    }

    /// Register every value present in `entry`.
    pub fn apply_entry(&mut self, entry: &ObjectEntry) {
        let (name, info) = (entry.name.as_str(), entry.info.as_str());
        if let Some(scale) = entry.scale {
            self.set(name, info, PropertyKind::Scale, Mat4::from_scale(scale));
        }
        if let Some(translation) = entry.translation {
            self.set(
                name,
                info,
                PropertyKind::Translation,
                Mat4::from_translation(translation),
            );
        }
        if let Some(r) = entry.rotation {
            self.set(
                name,
                info,
                PropertyKind::Rotation,
                rotation_from_degrees(r.yaw, r.pitch, r.roll),
            );
        }
        if let Some(color) = entry.color {
            self.set(name, info, PropertyKind::Color, color);
        }
        if let Some(size) = entry.size {
            self.set(name, info, PropertyKind::Size, size);
        }
        if let Some(resolution) = entry.texture_resolution {
            self.set(name, info, PropertyKind::TextureResolution, resolution);
        }
    }

    pub fn set<T: ConfigValueType>(&mut self, object: &str, info: &str, kind: PropertyKind, value: T) {
        let key = ConfigKey::new(object, info, kind, T::VALUE_TYPE);
        self.values.insert(key, value.into_value());
    }

    /// Look up a value, falling back to the type's default for `kind`.
    pub fn resolve<T: ConfigValueType>(&self, object: &str, info: &str, kind: PropertyKind) -> T {
        let key = ConfigKey::new(object, info, kind, T::VALUE_TYPE);
        match self.values.get(&key).and_then(T::from_value) {
            Some(value) => value,
            None => {
                tracing::trace!("config miss for {key}, using fallback");
                T::fallback(&key.kind)
            }
        }
    }

    pub fn contains(&self, key: &ConfigKey) -> bool {
        self.values.contains_key(key)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&ConfigKey, &ConfigValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn camera(&self) -> &CameraSettings {
        &self.camera
    }

    pub fn fog(&self) -> &FogSettings {
        &self.fog
    }
}

/// Everything an object reads from the store at build time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectConfig {
    pub name: String,
    pub info: String,
    pub transform: Transform,
    pub color: Color,
    pub size: f32,
    pub texture_resolution: f32,
}

impl ObjectConfig {
    pub fn resolve(store: &ConfigStore, name: &str, info: &str) -> Self {
        Self {
            name: name.to_string(),
            info: info.to_string(),
            transform: Transform {
                scale: store.resolve(name, info, PropertyKind::Scale),
                rotation: store.resolve(name, info, PropertyKind::Rotation),
                translation: store.resolve(name, info, PropertyKind::Translation),
            },
            color: store.resolve(name, info, PropertyKind::Color),
            size: store.resolve(name, info, PropertyKind::Size),
            texture_resolution: store.resolve(name, info, PropertyKind::TextureResolution),
        }
    }
}
