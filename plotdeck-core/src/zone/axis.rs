//! Per-zone axis state: the static [`Profile`], the current view window
//! ([`Aspect`]) and the lifecycle that connects them.

use crate::config::{ConfigMap, ConfigValidationError};

pub mod keys {
    use crate::config::ConfigKey;

    pub fn xlabel() -> ConfigKey {
        ConfigKey::text("xlabel", "X")
    }

    pub fn ylabel() -> ConfigKey {
        ConfigKey::text("ylabel", "Y")
    }

    pub fn xlog() -> ConfigKey {
        ConfigKey::boolean("xlog", false)
    }

    pub fn ylog() -> ConfigKey {
        ConfigKey::boolean("ylog", false)
    }

    pub fn xflip() -> ConfigKey {
        ConfigKey::boolean("xflip", false)
    }

    pub fn yflip() -> ConfigKey {
        ConfigKey::boolean("yflip", false)
    }

    pub fn grid() -> ConfigKey {
        ConfigKey::boolean("grid", false)
    }

    /// Fixed x:y scale ratio; zero leaves the axes independent.
    pub fn aspect_ratio() -> ConfigKey {
        ConfigKey::float("aspect_ratio", 0.0).with_range(0.0, 1000.0)
    }

    /// Fraction of the data span added on each side of the view.
    pub fn padding() -> ConfigKey {
        ConfigKey::float("padding", 0.02).with_range(0.0, 1.0)
    }

    pub fn all() -> Vec<ConfigKey> {
        vec![
            xlabel(),
            ylabel(),
            xlog(),
            ylog(),
            xflip(),
            yflip(),
            grid(),
            aspect_ratio(),
            padding(),
        ]
    }
}

/// Accumulated extent of submitted values. Non-finite values are ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    lo: f64,
    hi: f64,
}

impl Default for Range {
    fn default() -> Self {
        Self::empty()
    }
}

impl Range {
    pub fn empty() -> Self {
        Self {
            lo: f64::INFINITY,
            hi: f64::NEG_INFINITY,
        }
    }

    pub fn new(lo: f64, hi: f64) -> Self {
        let mut range = Self::empty();
        range.submit(lo);
        range.submit(hi);
        range
    }

    pub fn submit(&mut self, value: f64) {
        if value.is_finite() {
            self.lo = self.lo.min(value);
            self.hi = self.hi.max(value);
        }
    }

    pub fn union(&self, other: &Range) -> Range {
        Range {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lo > self.hi
    }

    pub fn bounds(&self) -> Option<(f64, f64)> {
        (!self.is_empty()).then_some((self.lo, self.hi))
    }

    pub fn span(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.hi - self.lo
        }
    }
}

/// Static axis configuration, independent of the view window.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub xlabel: String,
    pub ylabel: String,
    pub xlog: bool,
    pub ylog: bool,
    pub xflip: bool,
    pub yflip: bool,
    pub grid: bool,
    pub aspect_ratio: Option<f64>,
    pub padding: f64,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            xlabel: "X".to_string(),
            ylabel: "Y".to_string(),
            xlog: false,
            ylog: false,
            xflip: false,
            yflip: false,
            grid: false,
            aspect_ratio: None,
            padding: 0.02,
        }
    }
}

impl Profile {
    pub fn from_config(config: &ConfigMap) -> Result<Self, ConfigValidationError> {
        let ratio = config.float_value(&keys::aspect_ratio())?;
        Ok(Self {
            xlabel: config.text_value(&keys::xlabel())?,
            ylabel: config.text_value(&keys::ylabel())?,
            xlog: config.bool_value(&keys::xlog())?,
            ylog: config.bool_value(&keys::ylog())?,
            xflip: config.bool_value(&keys::xflip())?,
            yflip: config.bool_value(&keys::yflip())?,
            grid: config.bool_value(&keys::grid())?,
            aspect_ratio: (ratio > 0.0).then_some(ratio),
            padding: config.float_value(&keys::padding())?,
        })
    }
}

/// Visible data window of a zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aspect {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl Default for Aspect {
    fn default() -> Self {
        Self {
            x: (0.0, 1.0),
            y: (0.0, 1.0),
        }
    }
}

fn padded(range: &Range, log: bool, padding: f64) -> (f64, f64) {
    let Some((mut lo, mut hi)) = range.bounds() else {
        return if log { (1.0, 10.0) } else { (0.0, 1.0) };
    };
    if log {
        if hi <= 0.0 {
            return (1.0, 10.0);
        }
        if lo <= 0.0 {
            lo = hi / 1000.0;
        }
        let (llo, lhi) = (lo.log10(), hi.log10());
        let (llo, lhi) = if llo == lhi {
            (llo - 0.5, lhi + 0.5)
        } else {
            let pad = (lhi - llo) * padding;
            (llo - pad, lhi + pad)
        };
        return (10f64.powf(llo), 10f64.powf(lhi));
    }
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    } else {
        let pad = (hi - lo) * padding;
        lo -= pad;
        hi += pad;
    }
    (lo, hi)
}

fn widen(bounds: (f64, f64), span: f64) -> (f64, f64) {
    let mid = (bounds.0 + bounds.1) / 2.0;
    (mid - span / 2.0, mid + span / 2.0)
}

impl Aspect {
    /// Initial view window fitted around the data ranges.
    pub fn from_ranges(profile: &Profile, x: &Range, y: &Range) -> Self {
        let mut aspect = Self {
            x: padded(x, profile.xlog, profile.padding),
            y: padded(y, profile.ylog, profile.padding),
        };
        if let Some(ratio) = profile.aspect_ratio {
            if !profile.xlog && !profile.ylog {
                let xspan = aspect.x.1 - aspect.x.0;
                let yspan = aspect.y.1 - aspect.y.0;
                if xspan / yspan > ratio {
                    aspect.y = widen(aspect.y, xspan / ratio);
                } else {
                    aspect.x = widen(aspect.x, yspan * ratio);
                }
            }
        }
        aspect
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x.0 && x <= self.x.1 && y >= self.y.0 && y <= self.y.1
    }
}

/// Pan and zoom operations on a view window, honouring log axes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Navigator;

fn to_axis(value: f64, log: bool) -> f64 {
    if log {
        value.log10()
    } else {
        value
    }
}

fn from_axis(value: f64, log: bool) -> f64 {
    if log {
        10f64.powf(value)
    } else {
        value
    }
}

impl Navigator {
    fn pan_axis(bounds: (f64, f64), fraction: f64, log: bool) -> (f64, f64) {
        let (lo, hi) = (to_axis(bounds.0, log), to_axis(bounds.1, log));
        let shift = (hi - lo) * fraction;
        (from_axis(lo + shift, log), from_axis(hi + shift, log))
    }

    fn zoom_axis(bounds: (f64, f64), factor: f64, centre: f64, log: bool) -> (f64, f64) {
        let (lo, hi, c) = (
            to_axis(bounds.0, log),
            to_axis(bounds.1, log),
            to_axis(centre, log),
        );
        (
            from_axis(c + (lo - c) / factor, log),
            from_axis(c + (hi - c) / factor, log),
        )
    }

    /// Shifts the window by a fraction of its current extent.
    pub fn pan(&self, aspect: &Aspect, profile: &Profile, dx: f64, dy: f64) -> Aspect {
        Aspect {
            x: Self::pan_axis(aspect.x, dx, profile.xlog),
            y: Self::pan_axis(aspect.y, dy, profile.ylog),
        }
    }

    /// Zooms in by `factor` (values below one zoom out) about `centre`.
    pub fn zoom(&self, aspect: &Aspect, profile: &Profile, factor: f64, centre: (f64, f64)) -> Aspect {
        if !(factor.is_finite() && factor > 0.0) {
            return *aspect;
        }
        Aspect {
            x: Self::zoom_axis(aspect.x, factor, centre.0, profile.xlog),
            y: Self::zoom_axis(aspect.y, factor, centre.1, profile.ylog),
        }
    }
}

/// Lifecycle of one zone's axes.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AxisState {
    #[default]
    Unconfigured,
    Configured {
        profile: Profile,
        aspect: Aspect,
    },
    RangeLocked {
        profile: Profile,
        aspect: Aspect,
        fixed: (Range, Range),
    },
}

impl AxisState {
    pub fn name(&self) -> &'static str {
        match self {
            AxisState::Unconfigured => "unconfigured",
            AxisState::Configured { .. } => "configured",
            AxisState::RangeLocked { .. } => "range-locked",
        }
    }

    pub fn aspect(&self) -> Option<&Aspect> {
        match self {
            AxisState::Unconfigured => None,
            AxisState::Configured { aspect, .. } | AxisState::RangeLocked { aspect, .. } => {
                Some(aspect)
            }
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        match self {
            AxisState::Unconfigured => None,
            AxisState::Configured { profile, .. } | AxisState::RangeLocked { profile, .. } => {
                Some(profile)
            }
        }
    }
}

/// Drives [`AxisState`] for one zone.
///
/// While the axis lock is on, redraws keep the current aspect even when the
/// data changes; explicit pan, zoom and [`AxisController::set_aspect`] still
/// move it.
#[derive(Debug, Clone, Default)]
pub struct AxisController {
    state: AxisState,
    locked: bool,
    navigator: Navigator,
}

impl AxisController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AxisState {
        &self.state
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Applies a redraw's profile and data ranges.
    pub fn configure(&mut self, profile: Profile, x: Range, y: Range) {
        let state = std::mem::take(&mut self.state);
        self.state = match (state, self.locked) {
            (AxisState::Unconfigured, locked) => {
                let aspect = Aspect::from_ranges(&profile, &x, &y);
                if locked {
                    AxisState::RangeLocked {
                        profile,
                        aspect,
                        fixed: (x, y),
                    }
                } else {
                    AxisState::Configured { profile, aspect }
                }
            }
            (
                AxisState::Configured { aspect, .. } | AxisState::RangeLocked { aspect, .. },
                true,
            ) => AxisState::RangeLocked {
                profile,
                aspect,
                fixed: (x, y),
            },
            (AxisState::Configured { .. } | AxisState::RangeLocked { .. }, false) => {
                let aspect = Aspect::from_ranges(&profile, &x, &y);
                AxisState::Configured { profile, aspect }
            }
        };
    }

    /// Turns the axis lock on or off. Locking a configured zone freezes its
    /// current aspect immediately.
    pub fn set_axis_lock(&mut self, locked: bool) {
        self.locked = locked;
        let state = std::mem::take(&mut self.state);
        self.state = match (state, locked) {
            (AxisState::Configured { profile, aspect }, true) => AxisState::RangeLocked {
                profile,
                fixed: (
                    Range::new(aspect.x.0, aspect.x.1),
                    Range::new(aspect.y.0, aspect.y.1),
                ),
                aspect,
            },
            (AxisState::RangeLocked { profile, aspect, .. }, false) => {
                AxisState::Configured { profile, aspect }
            }
            (state, _) => state,
        };
    }

    fn aspect_mut(&mut self) -> Option<&mut Aspect> {
        match &mut self.state {
            AxisState::Unconfigured => None,
            AxisState::Configured { aspect, .. } | AxisState::RangeLocked { aspect, .. } => {
                Some(aspect)
            }
        }
    }

    /// Returns false if the zone has not been configured yet.
    pub fn set_aspect(&mut self, aspect: Aspect) -> bool {
        match self.aspect_mut() {
            Some(current) => {
                *current = aspect;
                true
            }
            None => false,
        }
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        let (Some(profile), Some(aspect)) = (self.state.profile(), self.state.aspect()) else {
            return false;
        };
        let next = self.navigator.pan(aspect, profile, dx, dy);
        self.set_aspect(next)
    }

    pub fn zoom(&mut self, factor: f64, centre: (f64, f64)) -> bool {
        let (Some(profile), Some(aspect)) = (self.state.profile(), self.state.aspect()) else {
            return false;
        };
        let next = self.navigator.zoom(aspect, profile, factor, centre);
        self.set_aspect(next)
    }

    /// Returns to [`AxisState::Unconfigured`]; the lock setting is kept.
    pub fn clear(&mut self) {
        self.state = AxisState::Unconfigured;
    }
}
