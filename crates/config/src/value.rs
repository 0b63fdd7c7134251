use crate::key::{PropertyKind, ValueType};
use glam::Mat4;
use station_common::Color;

/// A stored configuration value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigValue {
    Matrix(Mat4),
    Color(Color),
    Float(f32),
    Bool(bool),
}

impl ConfigValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            ConfigValue::Matrix(_) => ValueType::Matrix,
            ConfigValue::Color(_) => ValueType::Color,
            ConfigValue::Float(_) => ValueType::Float,
            ConfigValue::Bool(_) => ValueType::Bool,
        }
    }
}

/// A type that can be resolved from the store.
///
/// `fallback` is total: it is what a lookup yields when nothing is registered.
pub trait ConfigValueType: Sized + Copy {
    const VALUE_TYPE: ValueType;

    fn from_value(value: &ConfigValue) -> Option<Self>;

    fn into_value(self) -> ConfigValue;

    fn fallback(kind: &PropertyKind) -> Self;
}

impl ConfigValueType for Mat4 {
    const VALUE_TYPE: ValueType = ValueType::Matrix;

    fn from_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Matrix(m) => Some(*m),
            _ => None,
        }
    }

    fn into_value(self) -> ConfigValue {
        ConfigValue::Matrix(self)
    }

    /// Identity for the transform kinds, all zeros otherwise.
    fn fallback(kind: &PropertyKind) -> Self {
        match kind {
            PropertyKind::Scale | PropertyKind::Translation | PropertyKind::Rotation => {
                Mat4::IDENTITY
            }
            _ => Mat4::ZERO,
        }
    }
}

impl ConfigValueType for Color {
    const VALUE_TYPE: ValueType = ValueType::Color;

    fn from_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    fn into_value(self) -> ConfigValue {
        ConfigValue::Color(self)
    }

    fn fallback(_kind: &PropertyKind) -> Self {
        Color::AZURE
    }
}

impl ConfigValueType for f32 {
    const VALUE_TYPE: ValueType = ValueType::Float;

    fn from_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> ConfigValue {
        ConfigValue::Float(self)
    }

    fn fallback(_kind: &PropertyKind) -> Self {
        1.0
    }
}

impl ConfigValueType for bool {
    const VALUE_TYPE: ValueType = ValueType::Bool;

    fn from_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> ConfigValue {
        ConfigValue::Bool(self)
    }

    fn fallback(_kind: &PropertyKind) -> Self {
        true
    }
}
