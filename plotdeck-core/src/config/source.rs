use super::{ConfigKey, ConfigMap, ConfigValidationError, ConfigValue, Specifier};

/// Anything that contributes configuration.
pub trait ConfigSource {
    /// Returns a freshly built map of the values this source specifies.
    fn config(&self) -> ConfigMap;

    /// Keys this source knows about, whether or not a value is set.
    fn keys(&self) -> Vec<ConfigKey>;
}

impl<T: ConfigSource + ?Sized> ConfigSource for &T {
    fn config(&self) -> ConfigMap {
        (**self).config()
    }

    fn keys(&self) -> Vec<ConfigKey> {
        (**self).keys()
    }
}

impl<T: ConfigSource + ?Sized> ConfigSource for Box<T> {
    fn config(&self) -> ConfigMap {
        (**self).config()
    }

    fn keys(&self) -> Vec<ConfigKey> {
        (**self).keys()
    }
}

impl ConfigSource for ConfigMap {
    fn config(&self) -> ConfigMap {
        self.clone()
    }

    fn keys(&self) -> Vec<ConfigKey> {
        ConfigMap::keys(self).cloned().collect()
    }
}

/// A fixed set of declared keys with explicitly specified values.
/// Only values that have been set appear in [`ConfigSource::config`].
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    keys: Vec<ConfigKey>,
    values: ConfigMap,
}

impl StaticConfig {
    pub fn new(keys: Vec<ConfigKey>) -> Self {
        Self {
            keys,
            values: ConfigMap::new(),
        }
    }

    pub fn key(&self, name: &str) -> Option<&ConfigKey> {
        self.keys.iter().find(|key| key.name() == name)
    }

    fn declared(&self, name: &str) -> Result<ConfigKey, ConfigValidationError> {
        self.key(name)
            .cloned()
            .ok_or_else(|| ConfigValidationError::new(name, "unknown configuration key"))
    }

    pub fn set(&mut self, name: &str, value: ConfigValue) -> Result<(), ConfigValidationError> {
        let key = self.declared(name)?;
        let value = Specifier::for_key(&key).check(&key, value)?;
        self.values.put(&key, value);
        Ok(())
    }

    pub fn set_text(&mut self, name: &str, text: &str) -> Result<(), ConfigValidationError> {
        let key = self.declared(name)?;
        let value = Specifier::for_key(&key).parse(&key, text)?;
        self.values.put(&key, value);
        Ok(())
    }

    pub fn set_json(
        &mut self,
        name: &str,
        json: &serde_json::Value,
    ) -> Result<(), ConfigValidationError> {
        let key = self.declared(name)?;
        let value = Specifier::for_key(&key).from_json(&key, json)?;
        self.values.put(&key, value);
        Ok(())
    }

    pub fn clear(&mut self, name: &str) -> Option<ConfigValue> {
        let key = self.key(name)?.clone();
        self.values.remove(&key)
    }

    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.values.get_by_name(name).map(|(_, value)| value)
    }
}

impl ConfigSource for StaticConfig {
    fn config(&self) -> ConfigMap {
        self.values.clone()
    }

    fn keys(&self) -> Vec<ConfigKey> {
        self.keys.clone()
    }
}

/// Keys partitioned into named groups for presentation. Merging is the same
/// as for the groups registered one after another.
#[derive(Debug, Clone, Default)]
pub struct GroupedConfig {
    groups: Vec<(String, StaticConfig)>,
}

impl GroupedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, name: impl Into<String>, config: StaticConfig) {
        self.groups.push((name.into(), config));
    }

    pub fn group(&self, name: &str) -> Option<&StaticConfig> {
        self.groups
            .iter()
            .find(|(group, _)| group == name)
            .map(|(_, config)| config)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut StaticConfig> {
        self.groups
            .iter_mut()
            .find(|(group, _)| group == name)
            .map(|(_, config)| config)
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    /// Sets a value in whichever group declares the key.
    pub fn set_json(
        &mut self,
        name: &str,
        json: &serde_json::Value,
    ) -> Result<(), ConfigValidationError> {
        let group = self
            .groups
            .iter_mut()
            .map(|(_, config)| config)
            .find(|config| config.key(name).is_some())
            .ok_or_else(|| ConfigValidationError::new(name, "unknown configuration key"))?;
        group.set_json(name, json)
    }
}

impl ConfigSource for GroupedConfig {
    fn config(&self) -> ConfigMap {
        let mut config = ConfigMap::new();
        for (_, group) in &self.groups {
            config.put_all(&group.config());
        }
        config
    }

    fn keys(&self) -> Vec<ConfigKey> {
        self.groups
            .iter()
            .flat_map(|(_, group)| group.keys())
            .collect()
    }
}

/// Merges several sources in registration order; later sources win on
/// conflicting keys, so register the most general source first.
#[derive(Default)]
pub struct MultiConfigger<'a> {
    sources: Vec<Box<dyn ConfigSource + 'a>>,
}

impl<'a> MultiConfigger<'a> {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn add_source(&mut self, source: impl ConfigSource + 'a) {
        self.sources.push(Box::new(source));
    }

    pub fn with_source(mut self, source: impl ConfigSource + 'a) -> Self {
        self.add_source(source);
        self
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl ConfigSource for MultiConfigger<'_> {
    fn config(&self) -> ConfigMap {
        let mut config = ConfigMap::new();
        for source in &self.sources {
            config.put_all(&source.config());
        }
        config
    }

    fn keys(&self) -> Vec<ConfigKey> {
        let mut keys: Vec<ConfigKey> = Vec::new();
        for key in self.sources.iter().flat_map(|source| source.keys()) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

impl std::fmt::Debug for MultiConfigger<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiConfigger")
            .field("sources", &self.sources.len())
            .finish()
    }
}
