use super::{ConfigKey, ConfigValidationError, ConfigValue, KeyKind};
use crate::validation::Validator;

/// Per-kind parser and validator for user-supplied values. Chosen from the
/// key's declared [`KeyKind`] with [`Specifier::for_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Specifier {
    Toggle,
    Integer,
    Decimal,
    Text,
    Color,
}

impl Specifier {
    pub fn for_kind(kind: KeyKind) -> Self {
        match kind {
            KeyKind::Bool => Specifier::Toggle,
            KeyKind::Int => Specifier::Integer,
            KeyKind::Float => Specifier::Decimal,
            KeyKind::Text => Specifier::Text,
            KeyKind::Color => Specifier::Color,
        }
    }

    pub fn for_key(key: &ConfigKey) -> Self {
        Self::for_kind(key.kind())
    }

    /// Parses text typed by a user into a value for `key`.
    pub fn parse(&self, key: &ConfigKey, text: &str) -> Result<ConfigValue, ConfigValidationError> {
        let trimmed = text.trim();
        let value = match self {
            Specifier::Toggle => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => ConfigValue::Bool(true),
                "false" | "no" | "off" | "0" => ConfigValue::Bool(false),
                _ => return Err(invalid(key, trimmed)),
            },
            Specifier::Integer => trimmed
                .parse::<i64>()
                .map(ConfigValue::Int)
                .map_err(|_| invalid(key, trimmed))?,
            Specifier::Decimal => trimmed
                .parse::<f64>()
                .map(ConfigValue::Float)
                .map_err(|_| invalid(key, trimmed))?,
            Specifier::Text => ConfigValue::Text(text.to_string()),
            Specifier::Color => ConfigValue::Text(trimmed.to_string()),
        };
        self.check(key, value)
    }

    /// Converts an untyped JSON value from a session file.
    pub fn from_json(
        &self,
        key: &ConfigKey,
        json: &serde_json::Value,
    ) -> Result<ConfigValue, ConfigValidationError> {
        let value = match (self, json) {
            (Specifier::Toggle, serde_json::Value::Bool(v)) => ConfigValue::Bool(*v),
            (Specifier::Integer, serde_json::Value::Number(n)) => {
                ConfigValue::Int(n.as_i64().ok_or_else(|| invalid(key, &n.to_string()))?)
            }
            (Specifier::Decimal, serde_json::Value::Number(n)) => {
                ConfigValue::Float(n.as_f64().ok_or_else(|| invalid(key, &n.to_string()))?)
            }
            (Specifier::Text | Specifier::Color, serde_json::Value::String(s)) => {
                ConfigValue::Text(s.clone())
            }
            (_, serde_json::Value::String(s)) => return self.parse(key, s),
            (_, other) => return Err(invalid(key, &other.to_string())),
        };
        self.check(key, value)
    }

    /// Validates an already-typed value, normalising colours to `#rrggbb` and
/// integers on float keys to floats.
    pub fn check(
        &self,
        key: &ConfigKey,
        value: ConfigValue,
    ) -> Result<ConfigValue, ConfigValidationError> {
        if !value.fits(key.kind()) {
            return Err(ConfigValidationError::new(
                key.name(),
                format!("expected {} value, got '{value}'", key.kind().label()),
            ));
        }
        match (self, value) {
            (Specifier::Color, ConfigValue::Text(text)) => {
                Validator::normalize_color(key, &text).map(ConfigValue::Text)
            }
            (Specifier::Integer, value) => {
                if let Some(number) = value.as_f64() {
                    Validator::check_range(key, number)?;
                }
                Ok(value)
            }
            (Specifier::Decimal, ConfigValue::Int(n)) => {
                let number = n as f64;
                Validator::check_range(key, number)?;
                Ok(ConfigValue::Float(number))
            }
            (Specifier::Decimal, value) => {
                if let Some(number) = value.as_f64() {
                    Validator::check_range(key, number)?;
                }
                Ok(value)
            }
            (_, value) => Ok(value),
        }
    }

    pub fn format(&self, value: &ConfigValue) -> String {
        value.to_string()
    }
}

fn invalid(key: &ConfigKey, text: &str) -> ConfigValidationError {
    ConfigValidationError::new(
        key.name(),
        format!("'{text}' is not a valid {} value", key.kind().label()),
    )
}
