use super::axis::{keys, AxisController, AxisState, Profile, Range};
use super::{GangLayout, ZoneId};
use crate::config::{
    ConfigKey, ConfigMap, ConfigSource, ConfigValidationError, MultiConfigger, StaticConfig,
};
use std::collections::HashMap;
use std::fmt;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ZoneError {
    #[error("layout declares {found} zones but this controller handles {expected}")]
    LayoutMismatch { expected: usize, found: usize },
}

/// Axis state and zone-specific configuration of one zone.
#[derive(Debug, Clone)]
pub struct ZoneController {
    zone: ZoneId,
    config: StaticConfig,
    axis: AxisController,
}

impl ZoneController {
    pub fn new(zone: ZoneId) -> Self {
        Self {
            zone,
            config: StaticConfig::new(keys::all()),
            axis: AxisController::new(),
        }
    }

    pub fn zone(&self) -> ZoneId {
        self.zone
    }

    /// Values set for this zone only.
    pub fn config(&self) -> &StaticConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut StaticConfig {
        &mut self.config
    }

    pub fn axis(&self) -> &AxisController {
        &self.axis
    }

    pub fn axis_mut(&mut self) -> &mut AxisController {
        &mut self.axis
    }

    pub fn state(&self) -> &AxisState {
        self.axis.state()
    }

    /// Applies a redraw given the zone's effective configuration.
    pub fn configure(
        &mut self,
        effective: &ConfigMap,
        x: Range,
        y: Range,
    ) -> Result<(), ConfigValidationError> {
        let profile = Profile::from_config(effective)?;
        self.axis.configure(profile, x, y);
        Ok(())
    }
}

/// Owns the zone controllers of a plot, keeping exactly one per zone of the
/// layout it was last given.
pub trait AxesController: fmt::Debug {
    /// Axis configuration shared by every zone.
    fn global_config(&self) -> &StaticConfig;

    fn global_config_mut(&mut self) -> &mut StaticConfig;

    /// Brings the controllers in line with `layout` and returns them in
    /// layout order.
    fn zone_controllers(
        &mut self,
        layout: &GangLayout,
    ) -> Result<&mut [ZoneController], ZoneError>;

    fn controllers(&self) -> &[ZoneController];

    fn controllers_mut(&mut self) -> &mut [ZoneController];

    /// Merged configuration for one zone, most general source first.
    fn effective_config(&self, zone: &ZoneId) -> Option<ConfigMap>;

    fn set_axis_lock(&mut self, locked: bool);

    fn zone_controller(&self, zone: &ZoneId) -> Option<&ZoneController> {
        self.controllers().iter().find(|c| c.zone() == *zone)
    }

    fn zone_controller_mut(&mut self, zone: &ZoneId) -> Option<&mut ZoneController> {
        self.controllers_mut().iter_mut().find(|c| c.zone() == *zone)
    }

    fn clear_all(&mut self) {
        for controller in self.controllers_mut() {
            controller.axis_mut().clear();
        }
    }
}

/// Presents a single zone through the multi-zone [`AxesController`]
/// interface.
#[derive(Debug)]
pub struct SingleAxesController {
    global: StaticConfig,
    controller: ZoneController,
    locked: bool,
}

impl Default for SingleAxesController {
    fn default() -> Self {
        Self::new()
    }
}

impl SingleAxesController {
    pub fn new() -> Self {
        Self {
            global: StaticConfig::new(keys::all()),
            controller: ZoneController::new(ZoneId::DEFAULT),
            locked: false,
        }
    }
}

impl AxesController for SingleAxesController {
    fn global_config(&self) -> &StaticConfig {
        &self.global
    }

    fn global_config_mut(&mut self) -> &mut StaticConfig {
        &mut self.global
    }

    fn zone_controllers(
        &mut self,
        layout: &GangLayout,
    ) -> Result<&mut [ZoneController], ZoneError> {
        let [zone] = layout.zones() else {
            return Err(ZoneError::LayoutMismatch {
                expected: 1,
                found: layout.zone_count(),
            });
        };
        if self.controller.zone() != *zone {
            self.controller = ZoneController::new(*zone);
            self.controller.axis_mut().set_axis_lock(self.locked);
        }
        Ok(std::slice::from_mut(&mut self.controller))
    }

    fn controllers(&self) -> &[ZoneController] {
        std::slice::from_ref(&self.controller)
    }

    fn controllers_mut(&mut self) -> &mut [ZoneController] {
        std::slice::from_mut(&mut self.controller)
    }

    fn effective_config(&self, zone: &ZoneId) -> Option<ConfigMap> {
        if *zone != self.controller.zone() {
            return None;
        }
        let merged = MultiConfigger::new()
            .with_source(&self.global)
            .with_source(self.controller.config());
        Some(merged.config())
    }

    fn set_axis_lock(&mut self, locked: bool) {
        self.locked = locked;
        self.controller.axis_mut().set_axis_lock(locked);
    }
}

pub mod coord_keys {
    use crate::config::ConfigKey;

    pub fn label() -> ConfigKey {
        ConfigKey::text("label", "")
    }

    pub fn log() -> ConfigKey {
        ConfigKey::boolean("log", false)
    }

    pub fn flip() -> ConfigKey {
        ConfigKey::boolean("flip", false)
    }

    pub fn all() -> Vec<ConfigKey> {
        vec![label(), log(), flip()]
    }
}

/// Per-coordinate settings of a scatter matrix projected onto one cell's
/// x and y axes.
struct CellOverrides<'a> {
    x: Option<&'a StaticConfig>,
    y: Option<&'a StaticConfig>,
}

impl CellOverrides<'_> {
    fn x_keys() -> [ConfigKey; 3] {
        [keys::xlabel(), keys::xlog(), keys::xflip()]
    }

    fn y_keys() -> [ConfigKey; 3] {
        [keys::ylabel(), keys::ylog(), keys::yflip()]
    }
}

impl ConfigSource for CellOverrides<'_> {
    fn config(&self) -> ConfigMap {
        let mut config = ConfigMap::new();
        for (coord, axis_keys) in [(self.x, Self::x_keys()), (self.y, Self::y_keys())] {
            let Some(coord) = coord else {
                continue;
            };
            for (coord_key, axis_key) in coord_keys::all().iter().zip(axis_keys.iter()) {
                if let Some(value) = coord.get(coord_key.name()) {
                    config.put(axis_key, value.clone());
                }
            }
        }
        config
    }

    fn keys(&self) -> Vec<ConfigKey> {
        Self::x_keys().into_iter().chain(Self::y_keys()).collect()
    }
}

/// Controllers for stacked or matrix layouts.
///
/// A zone keeps its controller, and so its axis state, across relayouts for
/// as long as the layout contains it.
#[derive(Debug)]
pub struct MultiAxesController {
    global: StaticConfig,
    coords: Vec<StaticConfig>,
    diagonal_x: bool,
    controllers: Vec<ZoneController>,
    locked: bool,
}

impl Default for MultiAxesController {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiAxesController {
    pub fn new() -> Self {
        Self {
            global: StaticConfig::new(keys::all()),
            coords: Vec::new(),
            diagonal_x: true,
            controllers: Vec::new(),
            locked: false,
        }
    }

    /// Controller for an `ncoord` scatter matrix. `diagonal_x` selects
    /// whether diagonal cells take the x or the y coordinate settings.
    pub fn matrix(ncoord: usize, diagonal_x: bool) -> Self {
        let mut controller = Self::new();
        controller.diagonal_x = diagonal_x;
        controller.set_ncoord(ncoord);
        controller
    }

    pub fn set_ncoord(&mut self, ncoord: usize) {
        self.coords
            .resize_with(ncoord, || StaticConfig::new(coord_keys::all()));
    }

    /// Settings of matrix coordinate `index` (zero-based).
    pub fn coord_config_mut(&mut self, index: usize) -> Option<&mut StaticConfig> {
        self.coords.get_mut(index)
    }

    fn cell_overrides(&self, zone: &ZoneId) -> CellOverrides<'_> {
        let Some((x, y)) = zone.cell_coords() else {
            return CellOverrides { x: None, y: None };
        };
        let x_coord = self.coords.get(x as usize);
        let y_coord = self.coords.get(y as usize);
        if zone.is_diagonal() {
            if self.diagonal_x {
                CellOverrides { x: x_coord, y: None }
            } else {
                CellOverrides { x: None, y: y_coord }
            }
        } else {
            CellOverrides {
                x: x_coord,
                y: y_coord,
            }
        }
    }
}

impl AxesController for MultiAxesController {
    fn global_config(&self) -> &StaticConfig {
        &self.global
    }

    fn global_config_mut(&mut self) -> &mut StaticConfig {
        &mut self.global
    }

    fn zone_controllers(
        &mut self,
        layout: &GangLayout,
    ) -> Result<&mut [ZoneController], ZoneError> {
        let mut existing: HashMap<ZoneId, ZoneController> = self
            .controllers
            .drain(..)
            .map(|controller| (controller.zone(), controller))
            .collect();
        let locked = self.locked;
        self.controllers = layout
            .zones()
            .iter()
            .map(|zone| {
                existing.remove(zone).unwrap_or_else(|| {
                    log::debug!("new controller for zone {zone}");
                    let mut controller = ZoneController::new(*zone);
                    controller.axis_mut().set_axis_lock(locked);
                    controller
                })
            })
            .collect();
        for zone in existing.keys() {
            log::debug!("dropped controller for zone {zone}");
        }
        Ok(&mut self.controllers)
    }

    fn controllers(&self) -> &[ZoneController] {
        &self.controllers
    }

    fn controllers_mut(&mut self) -> &mut [ZoneController] {
        &mut self.controllers
    }

    fn effective_config(&self, zone: &ZoneId) -> Option<ConfigMap> {
        let controller = self.zone_controller(zone)?;
        let merged = MultiConfigger::new()
            .with_source(&self.global)
            .with_source(self.cell_overrides(zone))
            .with_source(controller.config());
        let mut config = merged.config();
        if zone.is_diagonal() {
            config.remove(&keys::aspect_ratio());
        }
        Some(config)
    }

    fn set_axis_lock(&mut self, locked: bool) {
        self.locked = locked;
        for controller in &mut self.controllers {
            controller.axis_mut().set_axis_lock(locked);
        }
    }
}
