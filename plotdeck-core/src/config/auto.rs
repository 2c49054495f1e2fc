//! Configuration whose individual keys can defer to a value computed from
//! the active dataset.

use super::{ConfigKey, ConfigMap, ConfigSource, ConfigValidationError, ConfigValue, KeyKind, Specifier};
use std::fmt;

/// What an automatic default may depend on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetContext {
    pub name: String,
    pub row_count: Option<u64>,
}

impl DatasetContext {
    pub fn new(name: impl Into<String>, row_count: Option<u64>) -> Self {
        Self {
            name: name.into(),
            row_count,
        }
    }
}

/// Strategy that picks a key's value when its literal value is disabled.
pub trait AutoDefault: fmt::Debug {
    fn auto_value(&self, key: &ConfigKey, data: &DatasetContext) -> ConfigValue;
}

/// Uses the key's own declared default.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDefault;

impl AutoDefault for KeyDefault {
    fn auto_value(&self, key: &ConfigKey, _data: &DatasetContext) -> ConfigValue {
        key.default_value().clone()
    }
}

#[derive(Debug, Clone)]
pub struct FixedDefault(pub ConfigValue);

impl AutoDefault for FixedDefault {
    fn auto_value(&self, _key: &ConfigKey, _data: &DatasetContext) -> ConfigValue {
        self.0.clone()
    }
}

/// Shrinks a numeric value by `per_decade` for every factor of ten rows,
/// clamped to `min..=max`. Unknown row counts get the key default.
#[derive(Debug, Clone, Copy)]
pub struct RowScaled {
    pub max: f64,
    pub min: f64,
    pub per_decade: f64,
}

impl AutoDefault for RowScaled {
    fn auto_value(&self, key: &ConfigKey, data: &DatasetContext) -> ConfigValue {
        let Some(rows) = data.row_count else {
            return key.default_value().clone();
        };
        let decades = (rows.max(1) as f64).log10();
        let value = (self.max - self.per_decade * decades).clamp(self.min, self.max);
        match key.kind() {
            KeyKind::Int => ConfigValue::Int(value.round() as i64),
            _ => ConfigValue::Float(value),
        }
    }
}

#[derive(Debug)]
struct AutoEntry {
    key: ConfigKey,
    literal: Option<ConfigValue>,
    enabled: bool,
    strategy: Box<dyn AutoDefault>,
}

/// Each key carries a toggle. When the toggle is enabled the literal value is
/// used; when disabled the key's strategy computes a value for the active
/// dataset instead.
#[derive(Debug, Default)]
pub struct AutoConfig {
    entries: Vec<AutoEntry>,
    dataset: DatasetContext,
}

impl AutoConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key that starts disabled, i.e. automatic.
    pub fn add_key(&mut self, key: ConfigKey, strategy: Box<dyn AutoDefault>) {
        self.entries.retain(|entry| entry.key != key);
        self.entries.push(AutoEntry {
            key,
            literal: None,
            enabled: false,
            strategy,
        });
    }

    pub fn set_dataset(&mut self, dataset: DatasetContext) {
        self.dataset = dataset;
    }

    pub fn dataset(&self) -> &DatasetContext {
        &self.dataset
    }

    fn entry_mut(&mut self, name: &str) -> Result<&mut AutoEntry, ConfigValidationError> {
        self.entries
            .iter_mut()
            .find(|entry| entry.key.name() == name)
            .ok_or_else(|| ConfigValidationError::new(name, "unknown configuration key"))
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), ConfigValidationError> {
        self.entry_mut(name)?.enabled = enabled;
        Ok(())
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.key.name() == name && entry.enabled)
    }

    /// Sets the literal value and enables it.
    pub fn set_literal(&mut self, name: &str, value: ConfigValue) -> Result<(), ConfigValidationError> {
        let entry = self.entry_mut(name)?;
        let value = Specifier::for_key(&entry.key).check(&entry.key, value)?;
        entry.literal = Some(value);
        entry.enabled = true;
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.key.name() == name)
    }
}

impl ConfigSource for AutoConfig {
    fn config(&self) -> ConfigMap {
        let mut config = ConfigMap::new();
        for entry in &self.entries {
            if entry.enabled {
                if let Some(literal) = &entry.literal {
                    config.put(&entry.key, literal.clone());
                }
            } else {
                let value = entry.strategy.auto_value(&entry.key, &self.dataset);
                config.put(&entry.key, value);
            }
        }
        config
    }

    fn keys(&self) -> Vec<ConfigKey> {
        self.entries.iter().map(|entry| entry.key.clone()).collect()
    }
}
