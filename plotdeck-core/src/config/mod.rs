//! Typed configuration keys and values, and the sources that supply them.
//!
//! A [`ConfigMap`] is always gathered fresh: sources hand out new maps from
//! [`ConfigSource::config`] and consumers own what they receive.

pub mod auto;
pub mod palette;
pub mod source;
pub mod specifier;

pub use auto::{AutoConfig, AutoDefault, DatasetContext, FixedDefault, KeyDefault, RowScaled};
pub use palette::{Palette, COLOR_PALETTE, SHAPE_PALETTE};
pub use source::{ConfigSource, GroupedConfig, MultiConfigger, StaticConfig};
pub use specifier::Specifier;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Hash)]
#[error("{key}: {message}")]
pub struct ConfigValidationError {
    pub key: String,
    pub message: String,
}

impl ConfigValidationError {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Bool,
    Int,
    Float,
    Text,
    Color,
}

impl KeyKind {
    pub fn label(self) -> &'static str {
        match self {
            KeyKind::Bool => "boolean",
            KeyKind::Int => "integer",
            KeyKind::Float => "number",
            KeyKind::Text => "text",
            KeyKind::Color => "colour",
        }
    }
}

/// A configuration value. Floats compare and hash by bit pattern so that
/// anything built from values can be used as a map key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Integers widen to floats; nothing else converts.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(v) => Some(*v),
            ConfigValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn fits(&self, kind: KeyKind) -> bool {
        matches!(
            (self, kind),
            (ConfigValue::Bool(_), KeyKind::Bool)
                | (ConfigValue::Int(_), KeyKind::Int)
                | (ConfigValue::Int(_) | ConfigValue::Float(_), KeyKind::Float)
                | (ConfigValue::Text(_), KeyKind::Text | KeyKind::Color)
        )
    }
}

impl PartialEq for ConfigValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConfigValue::Bool(a), ConfigValue::Bool(b)) => a == b,
            (ConfigValue::Int(a), ConfigValue::Int(b)) => a == b,
            (ConfigValue::Float(a), ConfigValue::Float(b)) => a.to_bits() == b.to_bits(),
            (ConfigValue::Text(a), ConfigValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ConfigValue {}

impl Hash for ConfigValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ConfigValue::Bool(v) => v.hash(state),
            ConfigValue::Int(v) => v.hash(state),
            ConfigValue::Float(v) => v.to_bits().hash(state),
            ConfigValue::Text(v) => v.hash(state),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(v) => write!(f, "{v}"),
            ConfigValue::Int(v) => write!(f, "{v}"),
            ConfigValue::Float(v) => write!(f, "{v}"),
            ConfigValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Text(value.to_string())
    }
}

/// Declares a configuration item: its name, value kind, default and,
/// for numeric kinds, the permitted range.
///
/// Keys are identified by name alone.
#[derive(Debug, Clone)]
pub struct ConfigKey {
    name: String,
    kind: KeyKind,
    default: ConfigValue,
    range: Option<(f64, f64)>,
}

impl ConfigKey {
    pub fn new(name: impl Into<String>, kind: KeyKind, default: ConfigValue) -> Self {
        Self {
            name: name.into(),
            kind,
            default,
            range: None,
        }
    }

    pub fn boolean(name: impl Into<String>, default: bool) -> Self {
        Self::new(name, KeyKind::Bool, ConfigValue::Bool(default))
    }

    pub fn integer(name: impl Into<String>, default: i64) -> Self {
        Self::new(name, KeyKind::Int, ConfigValue::Int(default))
    }

    pub fn float(name: impl Into<String>, default: f64) -> Self {
        Self::new(name, KeyKind::Float, ConfigValue::Float(default))
    }

    pub fn text(name: impl Into<String>, default: &str) -> Self {
        Self::new(name, KeyKind::Text, ConfigValue::Text(default.to_string()))
    }

    pub fn color(name: impl Into<String>, default: &str) -> Self {
        Self::new(name, KeyKind::Color, ConfigValue::Text(default.to_string()))
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    pub fn default_value(&self) -> &ConfigValue {
        &self.default
    }

    pub fn range(&self) -> Option<(f64, f64)> {
        self.range
    }
}

impl PartialEq for ConfigKey {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ConfigKey {}

impl Hash for ConfigKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Insertion-ordered key/value map. Re-putting a key replaces its value but
/// keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigMap {
    entries: Vec<(ConfigKey, ConfigValue)>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key.name == name)
    }

    pub fn put(&mut self, key: &ConfigKey, value: ConfigValue) -> Option<ConfigValue> {
        match self.position(&key.name) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((key.clone(), value));
                None
            }
        }
    }

    /// Copies every entry of `other` into this map, `other` winning on conflict.
    pub fn put_all(&mut self, other: &ConfigMap) {
        for (key, value) in &other.entries {
            self.put(key, value.clone());
        }
    }

    pub fn get(&self, key: &ConfigKey) -> Option<&ConfigValue> {
        self.get_by_name(&key.name).map(|(_, value)| value)
    }

    pub fn get_by_name(&self, name: &str) -> Option<(&ConfigKey, &ConfigValue)> {
        self.position(name)
            .map(|idx| (&self.entries[idx].0, &self.entries[idx].1))
    }

    pub fn contains(&self, key: &ConfigKey) -> bool {
        self.position(&key.name).is_some()
    }

    pub fn remove(&mut self, key: &ConfigKey) -> Option<ConfigValue> {
        self.position(&key.name)
            .map(|idx| self.entries.remove(idx).1)
    }

    pub fn value_or_default(&self, key: &ConfigKey) -> ConfigValue {
        self.get(key)
            .cloned()
            .unwrap_or_else(|| key.default.clone())
    }

    pub fn keys(&self) -> impl Iterator<Item = &ConfigKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConfigKey, &ConfigValue)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn bool_value(&self, key: &ConfigKey) -> Result<bool, ConfigValidationError> {
        let value = self.value_or_default(key);
        value
            .as_bool()
            .ok_or_else(|| kind_mismatch(key, &value))
    }

    pub fn int_value(&self, key: &ConfigKey) -> Result<i64, ConfigValidationError> {
        let value = self.value_or_default(key);
        value.as_i64().ok_or_else(|| kind_mismatch(key, &value))
    }

    pub fn float_value(&self, key: &ConfigKey) -> Result<f64, ConfigValidationError> {
        let value = self.value_or_default(key);
        value.as_f64().ok_or_else(|| kind_mismatch(key, &value))
    }

    pub fn text_value(&self, key: &ConfigKey) -> Result<String, ConfigValidationError> {
        let value = self.value_or_default(key);
        match value {
            ConfigValue::Text(text) => Ok(text),
            other => Err(kind_mismatch(key, &other)),
        }
    }
}

fn kind_mismatch(key: &ConfigKey, value: &ConfigValue) -> ConfigValidationError {
    ConfigValidationError::new(
        key.name(),
        format!("expected {} value, got '{value}'", key.kind.label()),
    )
}
