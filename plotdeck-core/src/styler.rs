//! Turns configuration into plot layers, reporting validation failures.

use crate::config::{ConfigMap, ConfigValidationError};
use crate::layer::{DataGeom, DataSpec, PlotLayer, Style};
use crate::plotter::Plotter;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Receives validation failures that should be shown to the user.
pub trait ErrorReporter {
    fn report_error(&mut self, error: &ConfigValidationError);
}

impl ErrorReporter for Vec<ConfigValidationError> {
    fn report_error(&mut self, error: &ConfigValidationError) {
        self.push(error.clone());
    }
}

/// Builds layers for one layer control.
///
/// A failure is passed to the reporter only if it differs from the last one
/// reported; any successful build clears that memory, so repeating a
/// previous mistake after a fix is reported again.
#[derive(Debug, Default)]
pub struct LayerStyler {
    last_reported: Option<ConfigValidationError>,
}

impl LayerStyler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_layer(
        &mut self,
        plotter: &dyn Plotter,
        geom: Option<DataGeom>,
        data_spec: Option<DataSpec>,
        config: &ConfigMap,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<PlotLayer, ConfigValidationError> {
        let style = self.create_style(plotter, config, reporter)?;
        Ok(plotter.create_layer(geom, data_spec, style))
    }

    pub fn create_style(
        &mut self,
        plotter: &dyn Plotter,
        config: &ConfigMap,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<Style, ConfigValidationError> {
        match plotter.create_style(config) {
            Ok(style) => {
                self.last_reported = None;
                check_repeatable(plotter, config, &style);
                Ok(style)
            }
            Err(err) => {
                if self.last_reported.as_ref() != Some(&err) {
                    log::debug!("style for '{}' rejected: {err}", plotter.name());
                    reporter.report_error(&err);
                    self.last_reported = Some(err.clone());
                }
                Err(err)
            }
        }
    }

    /// Forgets the last reported failure.
    pub fn reset(&mut self) {
        self.last_reported = None;
    }

    pub fn has_reported(&self) -> bool {
        self.last_reported.is_some()
    }
}

fn style_hash(style: &Style) -> u64 {
    let mut hasher = DefaultHasher::new();
    style.hash(&mut hasher);
    hasher.finish()
}

/// Styles are used as identity components, so two builds from one config
/// must agree.
fn check_repeatable(plotter: &dyn Plotter, config: &ConfigMap, style: &Style) {
    let repeat = match plotter.create_style(config) {
        Ok(repeat) => repeat,
        Err(err) => {
            log::warn!("plotter '{}' rejected a config it just accepted: {err}", plotter.name());
            debug_assert!(false, "style construction is not repeatable");
            return;
        }
    };
    if repeat != *style || style_hash(&repeat) != style_hash(style) {
        log::warn!("plotter '{}' built unequal styles from one config", plotter.name());
        debug_assert!(false, "style construction is not repeatable");
    }
}
