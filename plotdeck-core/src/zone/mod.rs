//! Zones are the independently addressable panes of a plot. A
//! [`ZoneFactory`] dispenses zone ids for a ganging arrangement and resolves
//! textual zone references; the controllers in [`controller`] keep one
//! [`ZoneController`] per zone of the current [`GangLayout`].

pub mod axis;
pub mod controller;

pub use axis::{Aspect, AxisController, AxisState, Navigator, Profile, Range};
pub use controller::{
    AxesController, MultiAxesController, SingleAxesController, ZoneController, ZoneError,
};

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum ZoneKey {
    Default,
    Index(u32),
    Cell { x: u32, y: u32 },
}

/// Opaque zone identifier. Equal ids denote the same pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(ZoneKey);

impl ZoneId {
    pub const DEFAULT: ZoneId = ZoneId(ZoneKey::Default);

    pub fn index(index: u32) -> Self {
        ZoneId(ZoneKey::Index(index))
    }

    pub fn cell(x: u32, y: u32) -> Self {
        ZoneId(ZoneKey::Cell { x, y })
    }

    /// Matrix cell coordinates, zero-based.
    pub fn cell_coords(&self) -> Option<(u32, u32)> {
        match self.0 {
            ZoneKey::Cell { x, y } => Some((x, y)),
            _ => None,
        }
    }

    pub fn is_diagonal(&self) -> bool {
        matches!(self.0, ZoneKey::Cell { x, y } if x == y)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ZoneKey::Default => f.write_str("default"),
            ZoneKey::Index(i) => write!(f, "{}", i + 1),
            ZoneKey::Cell { x, y } => write!(f, "{}-{}", x + 1, y + 1),
        }
    }
}

/// Zone selection attached to a layer control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSpecifier {
    zone: ZoneId,
    choices: Vec<ZoneId>,
}

impl ZoneSpecifier {
    pub fn new(zone: ZoneId, choices: Vec<ZoneId>) -> Self {
        Self { zone, choices }
    }

    pub fn selected(&self) -> ZoneId {
        self.zone
    }

    pub fn choices(&self) -> &[ZoneId] {
        &self.choices
    }

    /// Returns false, leaving the selection alone, if `zone` is not a choice.
    pub fn select(&mut self, zone: ZoneId) -> bool {
        if self.choices.contains(&zone) {
            self.zone = zone;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GangShape {
    Single,
    Stack,
    Matrix { ncoord: u32 },
}

/// How many zones a plot has and in which order they are laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GangLayout {
    shape: GangShape,
    zones: Vec<ZoneId>,
}

impl GangLayout {
    pub fn single() -> Self {
        Self {
            shape: GangShape::Single,
            zones: vec![ZoneId::DEFAULT],
        }
    }

    pub fn stack(count: u32) -> Self {
        Self {
            shape: GangShape::Stack,
            zones: (0..count).map(ZoneId::index).collect(),
        }
    }

    pub fn matrix(ncoord: u32) -> Self {
        let zones = (0..ncoord)
            .flat_map(|y| (0..ncoord).map(move |x| ZoneId::cell(x, y)))
            .collect();
        Self {
            shape: GangShape::Matrix { ncoord },
            zones,
        }
    }

    pub fn shape(&self) -> GangShape {
        self.shape
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn zones(&self) -> &[ZoneId] {
        &self.zones
    }

    pub fn contains(&self, zone: &ZoneId) -> bool {
        self.zones.contains(zone)
    }

    pub fn with_zone(&self, zone: ZoneId) -> Self {
        let mut next = self.clone();
        if !next.zones.contains(&zone) {
            next.zones.push(zone);
        }
        next
    }

    pub fn without_zone(&self, zone: &ZoneId) -> Self {
        let mut next = self.clone();
        next.zones.retain(|z| z != zone);
        next
    }
}

/// Dispenses zone ids for one ganging arrangement.
pub trait ZoneFactory: fmt::Debug {
    /// True if every id this factory hands out is the same.
    fn is_single_zone(&self) -> bool;

    /// Stable for the lifetime of the factory.
    fn default_zone(&self) -> ZoneId;

    fn create_zone_specifier(&mut self) -> ZoneSpecifier;

    /// Resolves a zone name such as `"2"` or `"1-3"`; `None` if no such
    /// zone currently exists.
    fn name_to_id(&self, name: &str) -> Option<ZoneId>;

    fn zones(&self) -> Vec<ZoneId>;

    fn layout(&self) -> GangLayout;

    /// Adds a zone at runtime where the arrangement allows it.
    fn add_zone(&mut self) -> Option<ZoneId> {
        None
    }

    fn remove_zone(&mut self, _zone: &ZoneId) -> bool {
        false
    }
}

#[derive(Debug, Default)]
pub struct SingleZoneFactory;

impl ZoneFactory for SingleZoneFactory {
    fn is_single_zone(&self) -> bool {
        true
    }

    fn default_zone(&self) -> ZoneId {
        ZoneId::DEFAULT
    }

    fn create_zone_specifier(&mut self) -> ZoneSpecifier {
        ZoneSpecifier::new(ZoneId::DEFAULT, vec![ZoneId::DEFAULT])
    }

    fn name_to_id(&self, _name: &str) -> Option<ZoneId> {
        Some(ZoneId::DEFAULT)
    }

    fn zones(&self) -> Vec<ZoneId> {
        vec![ZoneId::DEFAULT]
    }

    fn layout(&self) -> GangLayout {
        GangLayout::single()
    }
}

/// Vertically stacked panes sharing an x axis. The first specifier gets the
/// first zone; every later one gets a zone of its own.
#[derive(Debug)]
pub struct StackZoneFactory {
    zones: Vec<ZoneId>,
    next_index: u32,
    dispensed: usize,
}

impl Default for StackZoneFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl StackZoneFactory {
    pub fn new() -> Self {
        Self {
            zones: vec![ZoneId::index(0)],
            next_index: 1,
            dispensed: 0,
        }
    }

    /// Starts with `count` zones already present (at least one).
    pub fn with_zones(count: u32) -> Self {
        let count = count.max(1);
        Self {
            zones: (0..count).map(ZoneId::index).collect(),
            next_index: count,
            dispensed: 0,
        }
    }

    fn push_zone(&mut self) -> ZoneId {
        let zone = ZoneId::index(self.next_index);
        self.next_index += 1;
        self.zones.push(zone);
        zone
    }
}

impl ZoneFactory for StackZoneFactory {
    fn is_single_zone(&self) -> bool {
        false
    }

    fn default_zone(&self) -> ZoneId {
        ZoneId::index(0)
    }

    fn create_zone_specifier(&mut self) -> ZoneSpecifier {
        let zone = match self.dispensed {
            0 => self.default_zone(),
            n if n < self.zones.len() => self.zones[n],
            _ => self.push_zone(),
        };
        self.dispensed += 1;
        ZoneSpecifier::new(zone, self.zones.clone())
    }

    fn name_to_id(&self, name: &str) -> Option<ZoneId> {
        let index = name.trim().parse::<u32>().ok()?.checked_sub(1)?;
        let zone = ZoneId::index(index);
        self.zones.contains(&zone).then_some(zone)
    }

    fn zones(&self) -> Vec<ZoneId> {
        self.zones.clone()
    }

    fn layout(&self) -> GangLayout {
        GangLayout {
            shape: GangShape::Stack,
            zones: self.zones.clone(),
        }
    }

    fn add_zone(&mut self) -> Option<ZoneId> {
        Some(self.push_zone())
    }

    fn remove_zone(&mut self, zone: &ZoneId) -> bool {
        if *zone == self.default_zone() {
            return false;
        }
        let before = self.zones.len();
        self.zones.retain(|z| z != zone);
        self.zones.len() != before
    }
}

/// One zone per cell of an `ncoord` x `ncoord` scatter matrix.
#[derive(Debug)]
pub struct MatrixZoneFactory {
    ncoord: u32,
}

impl MatrixZoneFactory {
    pub fn new(ncoord: u32) -> Self {
        Self {
            ncoord: ncoord.max(1),
        }
    }

    pub fn ncoord(&self) -> u32 {
        self.ncoord
    }

    pub fn set_ncoord(&mut self, ncoord: u32) {
        self.ncoord = ncoord.max(1);
    }
}

impl ZoneFactory for MatrixZoneFactory {
    fn is_single_zone(&self) -> bool {
        false
    }

    fn default_zone(&self) -> ZoneId {
        ZoneId::cell(0, 0)
    }

    fn create_zone_specifier(&mut self) -> ZoneSpecifier {
        ZoneSpecifier::new(self.default_zone(), self.zones())
    }

    fn name_to_id(&self, name: &str) -> Option<ZoneId> {
        let (x, y) = name.trim().split_once('-')?;
        let x = x.trim().parse::<u32>().ok()?.checked_sub(1)?;
        let y = y.trim().parse::<u32>().ok()?.checked_sub(1)?;
        (x < self.ncoord && y < self.ncoord).then(|| ZoneId::cell(x, y))
    }

    fn zones(&self) -> Vec<ZoneId> {
        GangLayout::matrix(self.ncoord).zones
    }

    fn layout(&self) -> GangLayout {
        GangLayout::matrix(self.ncoord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_one_based() {
        assert_eq!(ZoneId::index(0).to_string(), "1");
        assert_eq!(ZoneId::cell(1, 2).to_string(), "2-3");
        assert_eq!(ZoneId::DEFAULT.to_string(), "default");
    }

    #[test]
    fn matrix_resolves_cells() {
        let factory = MatrixZoneFactory::new(3);
        assert_eq!(factory.name_to_id("2-3"), Some(ZoneId::cell(1, 2)));
        assert_eq!(factory.name_to_id("4-1"), None);
        assert_eq!(factory.name_to_id("0-1"), None);
        assert_eq!(factory.name_to_id("x"), None);
        assert_eq!(factory.layout().zone_count(), 9);
    }
}
