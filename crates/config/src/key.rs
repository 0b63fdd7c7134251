use std::fmt;

/// Which property of an object a value describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKind {
    Scale,
    Translation,
    Rotation,
    Color,
    Size,
    TextureResolution,
    /// Any other named property.
    Custom(String),
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyKind::Scale => "Scale",
            PropertyKind::Translation => "Translation",
            PropertyKind::Rotation => "Rotation",
            PropertyKind::Color => "Color",
            PropertyKind::Size => "Size",
            PropertyKind::TextureResolution => "TextureResolution",
            PropertyKind::Custom(name) => name,
        };
        f.write_str(name)
    }
}

/// Type tag of a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    Matrix,
    Color,
    Float,
    Bool,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::Matrix => "Matrix",
            ValueType::Color => "Color",
            ValueType::Float => "Float",
            ValueType::Bool => "Bool",
        })
    }
}

/// Identifies exactly one configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigKey {
    pub object: String,
    pub info: String,
    pub kind: PropertyKind,
    pub value_type: ValueType,
}

impl ConfigKey {
    pub fn new(object: &str, info: &str, kind: PropertyKind, value_type: ValueType) -> Self {
        Self {
            object: object.to_string(),
            info: info.to_string(),
            kind,
            value_type,
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}", self.object, self.info, self.kind, self.value_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_displays_as_concatenation() {
        let key = ConfigKey::new("Station", "Cube", PropertyKind::Size, ValueType::Float);
        assert_eq!(key.to_string(), "StationCubeSizeFloat");
    }

    #[test]
    fn custom_kind_uses_its_name() {
        let key = ConfigKey::new(
            "Screen",
            "Floor",
            PropertyKind::Custom("Shear".into()),
            ValueType::Matrix,
        );
        assert_eq!(key.to_string(), "ScreenFloorShearMatrix");
    }

    #[test]
    fn keys_differ_by_value_type() {
        let a = ConfigKey::new("Ground", "Floor", PropertyKind::Size, ValueType::Float);
        let b = ConfigKey::new("Ground", "Floor", PropertyKind::Size, ValueType::Bool);
        assert_ne!(a, b);
    }
}
