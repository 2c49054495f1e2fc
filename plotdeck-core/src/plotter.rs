use crate::config::{ConfigKey, ConfigMap, ConfigValidationError, ConfigValue, Specifier};
use crate::layer::{DataGeom, DataSpec, PlotLayer, Style};
use crate::validation::Validator;
use std::fmt;
use std::sync::Arc;

/// Plotting backend for one kind of layer.
pub trait Plotter: fmt::Debug {
    fn name(&self) -> &str;

    /// Style keys this plotter reads, in presentation order.
    fn style_keys(&self) -> Vec<ConfigKey>;

    /// Number of positional coordinates each row supplies.
    fn coord_count(&self) -> usize;

    /// Builds a style from configuration, rejecting invalid values.
    fn create_style(&self, config: &ConfigMap) -> Result<Style, ConfigValidationError>;

    fn create_layer(
        &self,
        geom: Option<DataGeom>,
        data_spec: Option<DataSpec>,
        style: Style,
    ) -> PlotLayer {
        PlotLayer::new(self.name(), data_spec, geom, style)
    }
}

pub mod style_keys {
    use crate::config::ConfigKey;

    pub fn shape() -> ConfigKey {
        ConfigKey::text("shape", "circle")
    }

    pub fn size() -> ConfigKey {
        ConfigKey::integer("size", 2).with_range(0.0, 20.0)
    }

    pub fn color() -> ConfigKey {
        ConfigKey::color("color", "#ff0000")
    }

    pub fn opacity() -> ConfigKey {
        ConfigKey::float("opacity", 1.0).with_range(0.0, 1.0)
    }

    pub fn thickness() -> ConfigKey {
        ConfigKey::integer("thickness", 1).with_range(1.0, 10.0)
    }

    pub fn antialias() -> ConfigKey {
        ConfigKey::boolean("antialias", false)
    }
}

pub const MARK_SHAPES: [&str; 4] = ["circle", "square", "cross", "dot"];

/// Reads every key through its specifier so defaults and set values get the
/// same checks.
fn checked_params(
    keys: &[ConfigKey],
    config: &ConfigMap,
) -> Result<Vec<(String, ConfigValue)>, ConfigValidationError> {
    keys.iter()
        .map(|key| {
            let value = Specifier::for_key(key).check(key, config.value_or_default(key))?;
            Ok((key.name().to_string(), value))
        })
        .collect()
}

/// Scatter plot markers.
#[derive(Debug, Default)]
pub struct MarkPlotter;

impl Plotter for MarkPlotter {
    fn name(&self) -> &str {
        "mark"
    }

    fn style_keys(&self) -> Vec<ConfigKey> {
        vec![
            style_keys::shape(),
            style_keys::size(),
            style_keys::color(),
            style_keys::opacity(),
        ]
    }

    fn coord_count(&self) -> usize {
        2
    }

    fn create_style(&self, config: &ConfigMap) -> Result<Style, ConfigValidationError> {
        let params = checked_params(&self.style_keys(), config)?;
        let shape = config.text_value(&style_keys::shape())?;
        if !Validator::validate_choice(&shape, &MARK_SHAPES) {
            return Err(ConfigValidationError::new(
                "shape",
                format!("unknown shape '{shape}', expected one of {}", MARK_SHAPES.join(", ")),
            ));
        }
        Ok(Style::new(self.name(), params))
    }
}

/// Point-to-point lines in row order.
#[derive(Debug, Default)]
pub struct LinePlotter;

impl Plotter for LinePlotter {
    fn name(&self) -> &str {
        "line"
    }

    fn style_keys(&self) -> Vec<ConfigKey> {
        vec![
            style_keys::color(),
            style_keys::thickness(),
            style_keys::antialias(),
        ]
    }

    fn coord_count(&self) -> usize {
        2
    }

    fn create_style(&self, config: &ConfigMap) -> Result<Style, ConfigValidationError> {
        let params = checked_params(&self.style_keys(), config)?;
        Ok(Style::new(self.name(), params))
    }
}

pub fn builtin_plotters() -> Vec<Arc<dyn Plotter>> {
    vec![Arc::new(MarkPlotter), Arc::new(LinePlotter)]
}

pub fn plotter_by_name(name: &str) -> Option<Arc<dyn Plotter>> {
    builtin_plotters()
        .into_iter()
        .find(|plotter| plotter.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_style_uses_defaults() {
        let style = MarkPlotter.create_style(&ConfigMap::new()).unwrap();
        assert_eq!(style.get("shape"), Some(&ConfigValue::Text("circle".to_string())));
        assert_eq!(style.get("size"), Some(&ConfigValue::Int(2)));
    }

    #[test]
    fn mark_rejects_unknown_shape() {
        let mut config = ConfigMap::new();
        config.put(&style_keys::shape(), ConfigValue::from("star"));
        let err = MarkPlotter.create_style(&config).unwrap_err();
        assert_eq!(err.key, "shape");
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(plotter_by_name("line").map(|p| p.name().to_string()), Some("line".to_string()));
        assert!(plotter_by_name("contour").is_none());
    }
}
