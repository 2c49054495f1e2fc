//! Routing of asynchronously computed layer diagnostics back to the layer
//! control that produced each layer.

use crate::config::ConfigValue;
use crate::layer::{LayerId, PlotLayer};
use std::collections::{BTreeMap, HashMap};

/// Named diagnostic values for one layer, e.g. `points` or `out_of_range`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportMap {
    entries: BTreeMap<String, ConfigValue>,
}

impl ReportMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, name: &str, value: impl Into<ConfigValue>) {
        self.entries.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries present with an identical value in every one of `reports`.
    /// Empty if `reports` is empty.
    pub fn common<'a>(reports: impl IntoIterator<Item = &'a ReportMap>) -> ReportMap {
        let mut reports = reports.into_iter();
        let Some(first) = reports.next() else {
            return ReportMap::new();
        };
        let mut entries = first.entries.clone();
        for report in reports {
            entries.retain(|name, value| report.entries.get(name) == Some(value));
        }
        ReportMap { entries }
    }
}

/// Reports for one layer control after a redraw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlReports {
    pub common: ReportMap,
    pub per_subset: BTreeMap<String, ReportMap>,
}

impl ControlReports {
    pub fn for_subset(&self, subset: &str) -> Option<&ReportMap> {
        self.per_subset.get(subset)
    }
}

/// Remembers which control produced which layer on the latest redraw.
#[derive(Debug, Default)]
pub struct ReportRouter {
    owners: HashMap<LayerId, String>,
    reports: BTreeMap<String, ControlReports>,
}

impl ReportRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the layer ownership of the previous redraw.
    pub fn begin_redraw(&mut self) {
        self.owners.clear();
    }

    pub fn register_layer(&mut self, control: &str, layer: &PlotLayer) {
        self.owners.insert(LayerId::of(layer), control.to_string());
    }

    pub fn owner(&self, id: &LayerId) -> Option<&str> {
        self.owners.get(id).map(String::as_str)
    }

    /// Routes each report to the control owning its layer. Every control
    /// that receives something has its previous reports replaced, and
    /// controls that produced no layer this redraw lose theirs. Reports for
    /// unknown layers, or layers without a data specification, are ignored.
    pub fn submit_reports(&mut self, reports: &HashMap<LayerId, ReportMap>) {
        let mut routed: BTreeMap<&str, BTreeMap<String, ReportMap>> = BTreeMap::new();
        for (id, report) in reports {
            let Some(control) = self.owners.get(id) else {
                log::debug!("dropping report for unknown layer '{}'", id.plotter());
                continue;
            };
            let Some(spec) = id.data_spec() else {
                continue;
            };
            routed
                .entry(control.as_str())
                .or_default()
                .insert(spec.subset.clone(), report.clone());
        }
        for (control, per_subset) in routed {
            let common = ReportMap::common(per_subset.values());
            self.reports
                .insert(control.to_string(), ControlReports { common, per_subset });
        }
        let owners = &self.owners;
        self.reports
            .retain(|control, _| owners.values().any(|owner| owner == control));
    }

    pub fn control_reports(&self, control: &str) -> Option<&ControlReports> {
        self.reports.get(control)
    }

    pub fn clear_control(&mut self, control: &str) {
        self.reports.remove(control);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_keeps_identical_entries() {
        let mut a = ReportMap::new();
        a.put("points", 10_i64);
        a.put("blank_rows", 0_i64);
        let mut b = ReportMap::new();
        b.put("points", 12_i64);
        b.put("blank_rows", 0_i64);
        let common = ReportMap::common([&a, &b]);
        assert_eq!(common.len(), 1);
        assert_eq!(common.get("blank_rows"), Some(&ConfigValue::Int(0)));
        assert!(ReportMap::common(std::iter::empty()).is_empty());
    }
}
