//! Coordinator-side wiring of a plot: layer controls, zones, the styler,
//! report routing and the background plot job.

use crate::job::{JobResult, LayerSummary, LayerTask, PlotJob};
use crate::memory::table_from_definition;
use crate::progress::{ChannelProgress, ProgressEvent};
use crate::task::{Coordinator, TaskHandle, TaskOutcome};
use crate::tracking::{DataError, RowSource};
use plotdeck_core::config::{
    AutoConfig, AutoDefault, ConfigSource, DatasetContext, KeyDefault, MultiConfigger, Palette,
    RowScaled, Specifier, StaticConfig,
};
use plotdeck_core::zone::{
    Aspect, AxesController, AxisState, GangLayout, MatrixZoneFactory, MultiAxesController, Range,
    SingleAxesController, SingleZoneFactory, StackZoneFactory, ZoneController, ZoneError,
    ZoneFactory, ZoneId, ZoneSpecifier,
};
use plotdeck_core::{
    plotter_by_name, ConfigMap, ConfigValidationError, ControlReports, DataGeom, DataSpec,
    ErrorReporter, LayerCache, LayerId, LayerStyler, Notifications, Plotter, ReportMap,
    ReportRouter, Style,
};
use session::{
    normalize_session_settings, validate_session, LayerDefinition, LayoutKind, SessionDefinition,
    SessionRuleError, SessionSettings,
};
use std::collections::HashMap;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Rules(#[from] SessionRuleError),
    #[error("layer control '{control}' uses unknown plotter '{plotter}'")]
    UnknownPlotter { control: String, plotter: String },
    #[error("layer control '{control}' needs {expected} coordinates, got {found}")]
    CoordCount {
        control: String,
        expected: usize,
        found: usize,
    },
    #[error("layer control '{control}': {source}")]
    Data { control: String, source: DataError },
    #[error("layout size {0} does not fit a zone index")]
    LayoutSize(usize),
    #[error(transparent)]
    Zone(#[from] ZoneError),
}

/// One layer control: a plotter, the data it draws and the configuration
/// sources that style it, most general first.
pub struct LayerControl {
    name: String,
    plotter: Arc<dyn Plotter>,
    data_spec: Option<DataSpec>,
    source: Option<Arc<dyn RowSource>>,
    columns: Option<(usize, usize)>,
    zone: ZoneSpecifier,
    defaults: StaticConfig,
    auto: AutoConfig,
    config: StaticConfig,
    styler: LayerStyler,
}

impl LayerControl {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plotter(&self) -> &dyn Plotter {
        self.plotter.as_ref()
    }

    pub fn data_spec(&self) -> Option<&DataSpec> {
        self.data_spec.as_ref()
    }

    pub fn zone(&self) -> ZoneId {
        self.zone.selected()
    }

    /// Palette defaults, then automatic values, then explicit settings.
    pub fn config(&self) -> ConfigMap {
        MultiConfigger::new()
            .with_source(&self.defaults)
            .with_source(&self.auto)
            .with_source(&self.config)
            .config()
    }

    /// Sets an explicit value. Automatic keys switch to the literal value.
    pub fn set_value(
        &mut self,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), ConfigValidationError> {
        if let Some(auto_key) = self.auto.keys().into_iter().find(|k| k.name() == key) {
            let value = Specifier::for_key(&auto_key).from_json(&auto_key, value)?;
            return self.auto.set_literal(key, value);
        }
        self.config.set_json(key, value)
    }

    /// Lets `key` follow the dataset (`true`) or use its literal value.
    pub fn set_auto(&mut self, key: &str, auto: bool) -> Result<(), ConfigValidationError> {
        self.auto.set_enabled(key, !auto)
    }

    pub fn is_auto(&self, key: &str) -> bool {
        self.auto.contains(key) && !self.auto.is_enabled(key)
    }
}

impl std::fmt::Debug for LayerControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerControl")
            .field("name", &self.name)
            .field("plotter", &self.plotter.name())
            .field("data_spec", &self.data_spec)
            .field("zone", &self.zone.selected())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Idle,
    Running,
    Completed { layers: usize, computed: usize },
    Cancelled,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedrawStatus {
    /// A job was started for `computed` of `layers` layers.
    Submitted { layers: usize, computed: usize },
    /// Every layer was already summarised; applied without a job.
    Cached { layers: usize },
    /// The layers and their zones match the last completed redraw.
    Unchanged,
}

#[derive(Debug, Clone)]
struct Placement {
    id: LayerId,
    key: LayerId,
    zone: ZoneId,
    fixed: Option<Aspect>,
}

type Generation = Vec<(LayerId, ZoneId)>;

fn generation_of(placements: &[Placement]) -> Generation {
    placements.iter().map(|p| (p.id.clone(), p.zone)).collect()
}

/// State that job outcomes are delivered into.
pub struct PlotState {
    axes: Box<dyn AxesController>,
    router: ReportRouter,
    cache: LayerCache<LayerSummary>,
    current: Generation,
    completed: Option<Generation>,
    notifications: Notifications,
    status: JobStatus,
    discarded: usize,
}

impl PlotState {
    fn fixed_aspect(&self, zone: &ZoneId) -> Option<Aspect> {
        match self.axes.zone_controller(zone)?.state() {
            AxisState::RangeLocked { aspect, .. } => Some(*aspect),
            _ => None,
        }
    }

    fn cached(&self, key: &LayerId, fixed: &Option<Aspect>) -> Option<&LayerSummary> {
        self.cache.get(key).filter(|summary| summary.aspect == *fixed)
    }

    fn finish(&mut self, placements: &[Placement], outcome: TaskOutcome<JobResult>) {
        if generation_of(placements) != self.current {
            log::debug!("discarding the result of a superseded redraw");
            self.discarded += 1;
            return;
        }
        let result = match outcome {
            TaskOutcome::Success(result) => result,
            TaskOutcome::Cancelled => {
                self.status = JobStatus::Cancelled;
                return;
            }
            TaskOutcome::Failure(err) => {
                self.notifications.show_info("Plot failed", &err.to_string());
                self.status = JobStatus::Failed(err.to_string());
                return;
            }
        };

        let summaries: Vec<Option<LayerSummary>> = placements
            .iter()
            .map(|p| {
                result
                    .summaries
                    .iter()
                    .find(|(key, summary)| *key == p.key && summary.aspect == p.fixed)
                    .map(|(_, summary)| summary)
                    .or_else(|| self.cached(&p.key, &p.fixed))
                    .cloned()
            })
            .collect();

        let mut ranges: HashMap<ZoneId, (Range, Range)> = HashMap::new();
        let mut reports: HashMap<LayerId, ReportMap> = HashMap::new();
        for (placement, summary) in placements.iter().zip(&summaries) {
            let Some(summary) = summary else {
                continue;
            };
            let entry = ranges
                .entry(placement.zone)
                .or_insert_with(|| (Range::empty(), Range::empty()));
            entry.0 = entry.0.union(&summary.x);
            entry.1 = entry.1.union(&summary.y);
            reports.insert(placement.id.clone(), summary.report());
        }

        for (zone, (x, y)) in ranges {
            self.configure_zone(&zone, x, y);
        }
        self.router.submit_reports(&reports);

        let computed = result.summaries.len();
        for (key, summary) in result.summaries {
            self.cache.insert(key, summary);
        }
        let live: Vec<LayerId> = placements.iter().map(|p| p.key.clone()).collect();
        self.cache.retain_only(&live);
        self.completed = Some(generation_of(placements));
        self.status = JobStatus::Completed {
            layers: placements.len(),
            computed,
        };
    }

    fn configure_zone(&mut self, zone: &ZoneId, x: Range, y: Range) {
        let Some(config) = self.axes.effective_config(zone) else {
            log::debug!("zone {zone} left the layout before its data arrived");
            return;
        };
        let Some(controller) = self.axes.zone_controller_mut(zone) else {
            return;
        };
        if let Err(err) = controller.configure(&config, x, y) {
            log::warn!("zone {zone}: {err}");
            self.notifications.show_info(
                "Axis configuration error",
                &format!("zone {zone}: {err}"),
            );
        }
    }
}

/// A plot being edited: owns its layer controls and zones and runs redraw
/// jobs through a [`Coordinator`]. Everything here is used from one thread.
pub struct PlotSession {
    name: String,
    controls: Vec<LayerControl>,
    zones: Box<dyn ZoneFactory>,
    settings: SessionSettings,
    coordinator: Coordinator<PlotState>,
    state: PlotState,
    in_flight: Option<TaskHandle>,
    progress: Option<Sender<ProgressEvent>>,
}

impl PlotSession {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn controls(&self) -> &[LayerControl] {
        &self.controls
    }

    pub fn control_mut(&mut self, name: &str) -> Option<&mut LayerControl> {
        self.controls.iter_mut().find(|control| control.name == name)
    }

    /// Progress of subsequent jobs is sent to `sender`.
    pub fn set_progress_sender(&mut self, sender: Sender<ProgressEvent>) {
        self.progress = Some(sender);
    }

    pub fn set_value(
        &mut self,
        control: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), ConfigValidationError> {
        self.control_mut(control)
            .ok_or_else(|| ConfigValidationError::new(key, format!("no layer control '{control}'")))?
            .set_value(key, value)
    }

    /// Styles every layer without drawing and without touching the
    /// notification state.
    pub fn validate_layers(&self) -> Vec<(String, Result<Style, ConfigValidationError>)> {
        self.controls
            .iter()
            .map(|control| {
                (
                    control.name.clone(),
                    control.plotter.create_style(&control.config()),
                )
            })
            .collect()
    }

    /// Rebuilds every layer and, unless nothing changed, starts a job that
    /// summarises the layers not already cached.
    pub fn redraw(&mut self) -> Result<RedrawStatus, ZoneError> {
        let layout = self.zones.layout();
        self.state.axes.zone_controllers(&layout)?;
        self.state.router.begin_redraw();

        let mut placements = Vec::new();
        let mut tasks = Vec::new();
        for control in &mut self.controls {
            let config = control.config();
            self.state.notifications.set_active_control(Some(&control.name));
            let built = control.styler.create_layer(
                control.plotter.as_ref(),
                Some(DataGeom::plane()),
                control.data_spec.clone(),
                &config,
                &mut self.state.notifications,
            );
            self.state.notifications.set_active_control(None);
            let Ok(layer) = built else {
                continue;
            };
            self.state.router.register_layer(&control.name, &layer);

            let zone = if layout.contains(&control.zone.selected()) {
                control.zone.selected()
            } else {
                self.zones.default_zone()
            };
            let placement = Placement {
                id: LayerId::of(&layer),
                key: LayerId::without_style(&layer),
                zone,
                fixed: self.state.fixed_aspect(&zone),
            };
            if let (Some(source), Some(columns)) = (&control.source, control.columns) {
                let queued = tasks.iter().any(|task: &LayerTask| {
                    task.key == placement.key && task.fixed_aspect == placement.fixed
                });
                if !queued && self.state.cached(&placement.key, &placement.fixed).is_none() {
                    tasks.push(LayerTask {
                        key: placement.key.clone(),
                        source: Arc::clone(source),
                        columns,
                        fixed_aspect: placement.fixed,
                    });
                }
            }
            placements.push(placement);
        }

        let generation = generation_of(&placements);
        if self.state.completed.as_ref() == Some(&generation) {
            if self.state.current != generation {
                self.cancel();
                self.state.current = generation;
            }
            return Ok(RedrawStatus::Unchanged);
        }
        if self.settings.cancel_superseded {
            self.cancel();
        }
        self.state.current = generation;

        let layers = placements.len();
        if tasks.is_empty() {
            self.state
                .finish(&placements, TaskOutcome::Success(JobResult::default()));
            return Ok(RedrawStatus::Cached { layers });
        }

        let computed = tasks.len();
        let mut job = PlotJob::new(tasks, u64::from(self.settings.progress_steps));
        if let Some(sender) = &self.progress {
            job = job.with_listener(Box::new(ChannelProgress::new(sender.clone())));
        }
        let handle = self.coordinator.submit(
            move |cancel| job.run(cancel),
            move |state: &mut PlotState, outcome| state.finish(&placements, outcome),
        );
        log::debug!("submitted plot job {} for {computed} of {layers} layers", handle.id());
        self.in_flight = Some(handle);
        self.state.status = JobStatus::Running;
        Ok(RedrawStatus::Submitted { layers, computed })
    }

    /// Cancels the running job, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.cancel();
        }
    }

    fn settle(&mut self) {
        if let Some(handle) = &self.in_flight {
            if !self.coordinator.is_pending(handle) {
                self.in_flight = None;
            }
        }
    }

    /// Applies whatever job outcomes have arrived.
    pub fn pump(&mut self) -> usize {
        let delivered = self.coordinator.pump(&mut self.state);
        self.settle();
        delivered
    }

    /// Pumps until no job is outstanding. Returns false on timeout.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let done = self
            .coordinator
            .pump_until(&mut self.state, timeout, |_, coordinator| {
                coordinator.in_flight() == 0
            });
        self.settle();
        done
    }

    pub fn is_busy(&self) -> bool {
        self.coordinator.in_flight() > 0
    }

    pub fn status(&self) -> &JobStatus {
        &self.state.status
    }

    /// Results that arrived after a newer redraw replaced them.
    pub fn discarded_results(&self) -> usize {
        self.state.discarded
    }

    pub fn cached_layers(&self) -> usize {
        self.state.cache.len()
    }

    pub fn layout(&self) -> GangLayout {
        self.zones.layout()
    }

    pub fn is_single_zone(&self) -> bool {
        self.zones.is_single_zone()
    }

    pub fn resolve_zone(&self, name: &str) -> Option<ZoneId> {
        self.zones.name_to_id(name)
    }

    /// Adds a zone and its controller together. `None` if the layout
    /// cannot grow.
    pub fn add_zone(&mut self) -> Option<ZoneId> {
        let zone = self.zones.add_zone()?;
        let layout = self.zones.layout();
        if let Err(err) = self.state.axes.zone_controllers(&layout) {
            log::warn!("cannot add zone {zone}: {err}");
            self.zones.remove_zone(&zone);
            return None;
        }
        Some(zone)
    }

    /// Removes a zone and its controller; layers placed there fall back to
    /// the default zone on the next redraw.
    pub fn remove_zone(&mut self, zone: &ZoneId) -> bool {
        if !self.zones.remove_zone(zone) {
            return false;
        }
        let layout = self.zones.layout();
        if let Err(err) = self.state.axes.zone_controllers(&layout) {
            log::warn!("zone removal left an unsupported layout: {err}");
        }
        true
    }

    /// Moves a layer control to another zone.
    pub fn move_layer(&mut self, control: &str, zone: ZoneId) -> bool {
        let zones = self.zones.zones();
        match self.control_mut(control) {
            Some(control) => {
                control.zone = ZoneSpecifier::new(control.zone.selected(), zones);
                control.zone.select(zone)
            }
            None => false,
        }
    }

    pub fn zone_states(&self) -> Vec<(ZoneId, &AxisState)> {
        self.state
            .axes
            .controllers()
            .iter()
            .map(|controller| (controller.zone(), controller.state()))
            .collect()
    }

    pub fn zone_controller(&self, zone: &ZoneId) -> Option<&ZoneController> {
        self.state.axes.zone_controller(zone)
    }

    pub fn effective_zone_config(&self, zone: &ZoneId) -> Option<ConfigMap> {
        self.state.axes.effective_config(zone)
    }

    /// Changing the lock makes the next redraw recompute every layer
    /// against the new view windows.
    pub fn set_axis_lock(&mut self, locked: bool) {
        self.state.axes.set_axis_lock(locked);
        self.state.completed = None;
    }

    /// Resets one zone's view; the next redraw configures it afresh.
    pub fn clear_zone(&mut self, zone: &ZoneId) -> bool {
        match self.state.axes.zone_controller_mut(zone) {
            Some(controller) => {
                controller.axis_mut().clear();
                self.state.completed = None;
                true
            }
            None => false,
        }
    }

    /// Resets every zone's view.
    pub fn reset_views(&mut self) {
        self.state.axes.clear_all();
        self.state.completed = None;
    }

    /// Moving a view window invalidates the last redraw, since locked zones
    /// count the points outside it.
    pub fn pan_zone(&mut self, zone: &ZoneId, dx: f64, dy: f64) -> bool {
        let moved = self
            .state
            .axes
            .zone_controller_mut(zone)
            .is_some_and(|controller| controller.axis_mut().pan(dx, dy));
        if moved {
            self.state.completed = None;
        }
        moved
    }

    pub fn zoom_zone(&mut self, zone: &ZoneId, factor: f64, centre: (f64, f64)) -> bool {
        let moved = self
            .state
            .axes
            .zone_controller_mut(zone)
            .is_some_and(|controller| controller.axis_mut().zoom(factor, centre));
        if moved {
            self.state.completed = None;
        }
        moved
    }

    pub fn control_reports(&self, control: &str) -> Option<&ControlReports> {
        self.state.router.control_reports(control)
    }

    pub fn notifications(&self) -> &Notifications {
        &self.state.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.state.notifications
    }
}

impl std::fmt::Debug for PlotSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlotSession")
            .field("name", &self.name)
            .field("controls", &self.controls)
            .field("status", &self.state.status)
            .finish()
    }
}

fn coord_index(name: &str) -> Option<usize> {
    name.strip_prefix("coord-")?
        .parse::<usize>()
        .ok()?
        .checked_sub(1)
}

fn report_invalid(
    notifications: &mut Notifications,
    control: Option<&str>,
    err: &ConfigValidationError,
) {
    log::warn!("{err}");
    notifications.set_active_control(control);
    notifications.report_error(err);
    notifications.set_active_control(None);
}

fn layout_size(value: usize) -> Result<u32, BuildError> {
    u32::try_from(value).map_err(|_| BuildError::LayoutSize(value))
}

/// Size key whose automatic value shrinks as the dataset grows.
fn auto_strategy(key: &str) -> Box<dyn AutoDefault> {
    match key {
        "size" => Box::new(RowScaled {
            max: 5.0,
            min: 1.0,
            per_decade: 1.0,
        }),
        _ => Box::new(KeyDefault),
    }
}

struct ControlBuilder<'a> {
    tables: &'a HashMap<String, Arc<dyn RowSource>>,
    colors: Palette<String>,
    shapes: Palette<String>,
}

impl ControlBuilder<'_> {
    fn build(
        &mut self,
        layer: &LayerDefinition,
        zones: &mut dyn ZoneFactory,
        notifications: &mut Notifications,
    ) -> Result<LayerControl, BuildError> {
        let control = layer.control.clone();
        let plotter = plotter_by_name(&layer.plotter).ok_or_else(|| BuildError::UnknownPlotter {
            control: control.clone(),
            plotter: layer.plotter.clone(),
        })?;

        let requested = layer.zone.as_deref().and_then(|name| {
            let zone = zones.name_to_id(name);
            if zone.is_none() {
                notifications.show_control_info(
                    &control,
                    "Unknown zone",
                    &format!("zone '{name}' does not exist; using a default zone"),
                );
            }
            zone
        });
        let zone = match requested {
            Some(zone) => ZoneSpecifier::new(zone, zones.zones()),
            None => zones.create_zone_specifier(),
        };

        let (source, columns, data_spec, dataset) = match &layer.table {
            Some(table) => {
                let source = self.tables.get(table).cloned().ok_or_else(|| {
                    SessionRuleError::UnknownTable {
                        control: control.clone(),
                        table: table.clone(),
                    }
                })?;
                if layer.coords.len() != plotter.coord_count() {
                    return Err(BuildError::CoordCount {
                        control,
                        expected: plotter.coord_count(),
                        found: layer.coords.len(),
                    });
                }
                let index = |name: &str| {
                    source.column_index(name).map_err(|source| BuildError::Data {
                        control: control.clone(),
                        source,
                    })
                };
                let columns = (index(&layer.coords[0])?, index(&layer.coords[1])?);
                let dataset = DatasetContext::new(table.clone(), source.row_count());
                let spec = DataSpec::new(table.clone(), layer.subset.clone(), layer.coords.clone());
                (Some(source), Some(columns), Some(spec), dataset)
            }
            None => (None, None, None, DatasetContext::default()),
        };

        let keys = plotter.style_keys();
        let mut defaults = StaticConfig::new(keys.clone());
        for (name, palette) in [("color", &mut self.colors), ("shape", &mut self.shapes)] {
            if defaults.key(name).is_none() {
                continue;
            }
            if let Some(value) = palette.next_value() {
                if let Err(err) = defaults.set_text(name, &value) {
                    log::warn!("palette default rejected: {err}");
                }
            }
        }

        let mut auto = AutoConfig::new();
        for key in &keys {
            if key.name() == "size" || layer.auto.iter().any(|name| name == key.name()) {
                auto.add_key(key.clone(), auto_strategy(key.name()));
            }
        }
        auto.set_dataset(dataset);

        let mut built = LayerControl {
            name: control.clone(),
            plotter,
            data_spec,
            source,
            columns,
            zone,
            defaults,
            auto,
            config: StaticConfig::new(keys),
            styler: LayerStyler::new(),
        };
        for (key, value) in &layer.config {
            if layer.auto.iter().any(|name| name == key) {
                log::debug!("'{control}': '{key}' is automatic, ignoring its literal value");
                continue;
            }
            if let Err(err) = built.set_value(key, value) {
                report_invalid(notifications, Some(&control), &err);
            }
        }
        Ok(built)
    }
}

/// Turns a session definition into a live plot session. Invalid
/// configuration values are reported as notifications and left at their
/// defaults; structural problems are errors.
pub fn build_session(definition: &SessionDefinition) -> Result<PlotSession, BuildError> {
    validate_session(definition)?;
    let settings = normalize_session_settings(definition.settings.clone());
    let tables: HashMap<String, Arc<dyn RowSource>> = definition
        .tables
        .iter()
        .map(|table| (table.name.clone(), table_from_definition(table)))
        .collect();
    let mut notifications = Notifications::new();

    let layout = &definition.layout;
    let (mut zones, mut axes): (Box<dyn ZoneFactory>, Box<dyn AxesController>) = match layout.kind
    {
        LayoutKind::Single => (
            Box::new(SingleZoneFactory),
            Box::new(SingleAxesController::new()),
        ),
        LayoutKind::Stack => (
            Box::new(StackZoneFactory::with_zones(layout_size(layout.zones)?)),
            Box::new(MultiAxesController::new()),
        ),
        LayoutKind::Matrix => {
            let mut axes = MultiAxesController::matrix(layout.ncoord, settings.matrix_diagonal_x);
            for (name, values) in &definition.zones {
                let Some(coord) = coord_index(name).and_then(|idx| axes.coord_config_mut(idx))
                else {
                    continue;
                };
                for (key, value) in values {
                    if let Err(err) = coord.set_json(key, value) {
                        report_invalid(&mut notifications, None, &err);
                    }
                }
            }
            (
                Box::new(MatrixZoneFactory::new(layout_size(layout.ncoord)?)),
                Box::new(axes),
            )
        }
    };

    let mut builder = ControlBuilder {
        tables: &tables,
        colors: Palette::colors(),
        shapes: Palette::shapes(),
    };
    let controls = definition
        .layers
        .iter()
        .map(|layer| builder.build(layer, zones.as_mut(), &mut notifications))
        .collect::<Result<Vec<_>, _>>()?;

    axes.zone_controllers(&zones.layout())?;
    for (key, value) in &definition.global {
        if let Err(err) = axes.global_config_mut().set_json(key, value) {
            report_invalid(&mut notifications, None, &err);
        }
    }
    for (name, values) in &definition.zones {
        if layout.kind == LayoutKind::Matrix && coord_index(name).is_some() {
            continue;
        }
        let Some(controller) = zones
            .name_to_id(name)
            .and_then(|zone| axes.zone_controller_mut(&zone))
        else {
            notifications.show_info("Unknown zone", &format!("no zone named '{name}'"));
            continue;
        };
        for (key, value) in values {
            if let Err(err) = controller.config_mut().set_json(key, value) {
                report_invalid(&mut notifications, None, &err);
            }
        }
    }
    axes.set_axis_lock(settings.axis_lock);

    log::info!(
        "session '{}': {} layer controls, {} zones",
        definition.name,
        controls.len(),
        zones.layout().zone_count()
    );
    Ok(PlotSession {
        name: definition.name.clone(),
        controls,
        coordinator: Coordinator::new(&settings.worker_name_prefix),
        state: PlotState {
            axes,
            router: ReportRouter::new(),
            cache: LayerCache::new(),
            current: Vec::new(),
            completed: None,
            notifications,
            status: JobStatus::Idle,
            discarded: 0,
        },
        zones,
        settings,
        in_flight: None,
        progress: None,
    })
}
