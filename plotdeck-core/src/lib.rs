pub mod config;
pub mod layer;
pub mod notifications;
pub mod plotter;
pub mod report;
pub mod styler;
pub mod validation;
pub mod zone;

pub use config::{
    ConfigKey, ConfigMap, ConfigSource, ConfigValidationError, ConfigValue, KeyKind,
    MultiConfigger,
};
pub use layer::{DataGeom, DataSpec, LayerCache, LayerId, PlotLayer, Style};
pub use notifications::Notifications;
pub use plotter::{builtin_plotters, plotter_by_name, Plotter};
pub use report::{ControlReports, ReportMap, ReportRouter};
pub use styler::{ErrorReporter, LayerStyler};
pub use zone::{GangLayout, ZoneFactory, ZoneId};
