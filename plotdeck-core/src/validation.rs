use crate::config::{ConfigKey, ConfigValidationError};

pub struct Validator;

const NAMED_COLORS: [(&str, [u8; 3]); 10] = [
    ("red", [0xff, 0x00, 0x00]),
    ("blue", [0x00, 0x00, 0xff]),
    ("green", [0x00, 0x80, 0x00]),
    ("grey", [0x80, 0x80, 0x80]),
    ("magenta", [0xff, 0x00, 0xff]),
    ("cyan", [0x00, 0xff, 0xff]),
    ("orange", [0xff, 0xa5, 0x00]),
    ("pink", [0xff, 0xc0, 0xcb]),
    ("yellow", [0xff, 0xff, 0x00]),
    ("black", [0x00, 0x00, 0x00]),
];

impl Validator {
    pub fn validate_choice(value: &str, choices: &[&str]) -> bool {
        choices.contains(&value)
    }

    /// Checks a numeric value against the key's declared range, if any.
    pub fn check_range(key: &ConfigKey, value: f64) -> Result<(), ConfigValidationError> {
        if !value.is_finite() {
            return Err(ConfigValidationError::new(
                key.name(),
                format!("value {value} is not a finite number"),
            ));
        }
        match key.range() {
            Some((min, max)) if value < min || value > max => Err(ConfigValidationError::new(
                key.name(),
                format!("value {value} outside range {min}..={max}"),
            )),
            _ => Ok(()),
        }
    }

    /// Accepts `#rrggbb` or one of a small set of colour names.
    pub fn parse_color(text: &str) -> Option<[u8; 3]> {
        let text = text.trim().to_ascii_lowercase();
        if let Some(hex) = text.strip_prefix('#') {
            if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return None;
            }
            let channel = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).ok();
            return Some([channel(0)?, channel(2)?, channel(4)?]);
        }
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == text)
            .map(|(_, rgb)| *rgb)
    }

    pub fn normalize_color(key: &ConfigKey, text: &str) -> Result<String, ConfigValidationError> {
        let [r, g, b] = Self::parse_color(text).ok_or_else(|| {
            ConfigValidationError::new(key.name(), format!("'{text}' is not a colour"))
        })?;
        Ok(format!("#{r:02x}{g:02x}{b:02x}"))
    }
}
