//! Plot layers and their content-addressed identity.

use crate::config::ConfigValue;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Which rows of which table feed a layer, and the coordinate expressions
/// read from them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataSpec {
    pub table: String,
    pub subset: String,
    pub coords: Vec<String>,
}

impl DataSpec {
    pub fn new(table: impl Into<String>, subset: impl Into<String>, coords: Vec<String>) -> Self {
        Self {
            table: table.into(),
            subset: subset.into(),
            coords,
        }
    }
}

/// How data coordinates map onto the plot surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataGeom {
    pub name: String,
    pub dimensions: usize,
}

impl DataGeom {
    pub fn plane() -> Self {
        Self {
            name: "plane".to_string(),
            dimensions: 2,
        }
    }
}

/// Immutable rendering parameters of one layer, as produced by a plotter from
/// validated configuration. Parameters are held sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Style {
    plotter: Arc<str>,
    params: Vec<(String, ConfigValue)>,
}

impl Style {
    pub fn new(plotter: &str, params: impl IntoIterator<Item = (String, ConfigValue)>) -> Self {
        let mut params: Vec<(String, ConfigValue)> = params.into_iter().collect();
        params.sort_by(|a, b| a.0.cmp(&b.0));
        params.dedup_by(|later, earlier| later.0 == earlier.0);
        Self {
            plotter: Arc::from(plotter),
            params,
        }
    }

    pub fn plotter(&self) -> &str {
        &self.plotter
    }

    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.params
            .binary_search_by(|(param, _)| param.as_str().cmp(name))
            .ok()
            .map(|idx| &self.params[idx].1)
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.params.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// One plotted data series. Created by a plotter, never modified.
#[derive(Debug, Clone)]
pub struct PlotLayer {
    plotter: Arc<str>,
    data_spec: Option<DataSpec>,
    geom: Option<DataGeom>,
    style: Style,
}

impl PlotLayer {
    pub fn new(
        plotter: &str,
        data_spec: Option<DataSpec>,
        geom: Option<DataGeom>,
        style: Style,
    ) -> Self {
        Self {
            plotter: Arc::from(plotter),
            data_spec,
            geom,
            style,
        }
    }

    pub fn plotter(&self) -> &str {
        &self.plotter
    }

    pub fn data_spec(&self) -> Option<&DataSpec> {
        self.data_spec.as_ref()
    }

    pub fn geom(&self) -> Option<&DataGeom> {
        self.geom.as_ref()
    }

    pub fn style(&self) -> &Style {
        &self.style
    }
}

/// Identity of a layer: equal exactly when plotter, data specification,
/// geometry and style are all equal. Used as a lookup key across redraws.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayerId {
    plotter: Arc<str>,
    data_spec: Option<DataSpec>,
    geom: Option<DataGeom>,
    style: Option<Style>,
}

impl LayerId {
    pub fn new(
        plotter: &str,
        data_spec: Option<DataSpec>,
        geom: Option<DataGeom>,
        style: Option<Style>,
    ) -> Self {
        Self {
            plotter: Arc::from(plotter),
            data_spec,
            geom,
            style,
        }
    }

    pub fn of(layer: &PlotLayer) -> Self {
        Self {
            plotter: Arc::clone(&layer.plotter),
            data_spec: layer.data_spec.clone(),
            geom: layer.geom.clone(),
            style: Some(layer.style.clone()),
        }
    }

    /// Identity ignoring style; equal for layers that differ only in
    /// appearance and so share all data-dependent work.
    pub fn without_style(layer: &PlotLayer) -> Self {
        Self {
            style: None,
            ..Self::of(layer)
        }
    }

    pub fn plotter(&self) -> &str {
        &self.plotter
    }

    pub fn data_spec(&self) -> Option<&DataSpec> {
        self.data_spec.as_ref()
    }

    pub fn geom(&self) -> Option<&DataGeom> {
        self.geom.as_ref()
    }

    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }
}

pub fn layer_ids(layers: &[PlotLayer]) -> Vec<LayerId> {
    layers.iter().map(LayerId::of).collect()
}

/// True iff both lists contain equivalent layers in the same order.
pub fn layer_list_equals(a: &[PlotLayer], b: &[PlotLayer]) -> bool {
    layer_ids(a) == layer_ids(b)
}

/// True iff both lists contain the same set of distinct layers.
pub fn layer_set_equals(a: &[PlotLayer], b: &[PlotLayer]) -> bool {
    let a: HashSet<LayerId> = a.iter().map(LayerId::of).collect();
    let b: HashSet<LayerId> = b.iter().map(LayerId::of).collect();
    a == b
}

/// Results of expensive per-layer work, keyed by layer identity.
#[derive(Debug, Clone)]
pub struct LayerCache<V> {
    entries: HashMap<LayerId, V>,
}

impl<V> Default for LayerCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> LayerCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &LayerId) -> Option<&V> {
        self.entries.get(id)
    }

    pub fn insert(&mut self, id: LayerId, value: V) -> Option<V> {
        self.entries.insert(id, value)
    }

    pub fn contains(&self, id: &LayerId) -> bool {
        self.entries.contains_key(id)
    }

    /// Drops entries for layers that are no longer plotted.
    pub fn retain_only(&mut self, live: &[LayerId]) {
        let live: HashSet<&LayerId> = live.iter().collect();
        self.entries.retain(|id, _| live.contains(id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
