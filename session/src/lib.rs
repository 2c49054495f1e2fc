use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

pub mod settings;
pub use settings::{normalize_session_settings, SessionSettings, MIN_PROGRESS_STEPS};

pub const MAX_STACK_ZONES: usize = 64;
pub const MAX_MATRIX_COORDS: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub layout: LayoutDefinition,
    #[serde(default)]
    pub tables: Vec<TableDefinition>,
    #[serde(default)]
    pub layers: Vec<LayerDefinition>,
    /// Settings shared by every zone, least specific first in the merge order.
    #[serde(default)]
    pub global: BTreeMap<String, serde_json::Value>,
    /// Per-zone overrides, keyed by zone name.
    #[serde(default)]
    pub zones: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    pub settings: SessionSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    #[default]
    Single,
    Stack,
    Matrix,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutDefinition {
    #[serde(default)]
    pub kind: LayoutKind,
    /// Number of stacked zones; ignored for other layouts.
    #[serde(default = "default_zone_count")]
    pub zones: usize,
    /// Number of matrix coordinates; the matrix has `ncoord * ncoord` cells.
    #[serde(default = "default_ncoord")]
    pub ncoord: usize,
}

fn default_zone_count() -> usize {
    1
}

fn default_ncoord() -> usize {
    2
}

impl Default for LayoutDefinition {
    fn default() -> Self {
        Self {
            kind: LayoutKind::Single,
            zones: default_zone_count(),
            ncoord: default_ncoord(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<f64>>,
    #[serde(default)]
    pub synthetic: Option<SyntheticRows>,
}

/// Deterministically generated rows, for sessions that want volume without
/// shipping the data inline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SyntheticRows {
    pub count: u64,
    #[serde(default)]
    pub seed: u64,
    /// Hide the row count from consumers, so progress is indeterminate.
    #[serde(default)]
    pub unsized_source: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerDefinition {
    pub control: String,
    pub plotter: String,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default = "default_subset")]
    pub subset: String,
    #[serde(default)]
    pub coords: Vec<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub config: BTreeMap<String, serde_json::Value>,
    /// Keys whose value is chosen automatically from the active dataset.
    #[serde(default)]
    pub auto: Vec<String>,
}

fn default_subset() -> String {
    "All".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFormat {
    Json,
    Toml,
}

impl SessionFormat {
    pub fn from_path(path: &Path) -> Result<Self, SessionError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(SessionError::UnsupportedFormat(
                other.unwrap_or("").to_string(),
            )),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("toml write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("unsupported session file extension '{0}' (expected json or toml)")]
    UnsupportedFormat(String),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SessionRuleError {
    #[error("layer control '{0}' is defined more than once")]
    DuplicateControl(String),
    #[error("layer control '{control}' refers to unknown table '{table}'")]
    UnknownTable { control: String, table: String },
    #[error("table '{0}' is defined more than once")]
    DuplicateTable(String),
    #[error("layout {field} is {value}, expected 1..={max}")]
    LayoutSize {
        field: &'static str,
        value: usize,
        max: usize,
    },
    #[error("table '{table}' row {row} has {found} values, expected {expected}")]
    RowWidth {
        table: String,
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// Checks cross references inside a session: table names and layer control ids
/// must be unique, layers must name existing tables, and inline rows must match
/// their table's column count. Stacked and matrix layouts must have a zone
/// count within bounds.
pub fn validate_session(session: &SessionDefinition) -> Result<(), SessionRuleError> {
    let layout = &session.layout;
    let size = match layout.kind {
        LayoutKind::Single => None,
        LayoutKind::Stack => Some(("zones", layout.zones, MAX_STACK_ZONES)),
        LayoutKind::Matrix => Some(("ncoord", layout.ncoord, MAX_MATRIX_COORDS)),
    };
    if let Some((field, value, max)) = size {
        if value == 0 || value > max {
            return Err(SessionRuleError::LayoutSize { field, value, max });
        }
    }

    let mut tables = HashSet::new();
    for table in &session.tables {
        if !tables.insert(table.name.as_str()) {
            return Err(SessionRuleError::DuplicateTable(table.name.clone()));
        }
        if let Some((row, values)) = table
            .rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != table.columns.len())
        {
            return Err(SessionRuleError::RowWidth {
                table: table.name.clone(),
                row,
                found: values.len(),
                expected: table.columns.len(),
            });
        }
    }

    let mut controls = HashSet::new();
    for layer in &session.layers {
        if !controls.insert(layer.control.as_str()) {
            return Err(SessionRuleError::DuplicateControl(layer.control.clone()));
        }
        if let Some(table) = &layer.table {
            if !tables.contains(table.as_str()) {
                return Err(SessionRuleError::UnknownTable {
                    control: layer.control.clone(),
                    table: table.clone(),
                });
            }
        }
    }
    Ok(())
}

impl SessionDefinition {
    pub fn table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SessionError> {
        let path = path.as_ref();
        let data = match SessionFormat::from_path(path)? {
            SessionFormat::Json => serde_json::to_vec_pretty(self)?,
            SessionFormat::Toml => toml::to_string_pretty(self)?.into_bytes(),
        };
        fs::write(path, data)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let format = SessionFormat::from_path(path)?;
        let data = fs::read_to_string(path)?;
        let mut definition: SessionDefinition = match format {
            SessionFormat::Json => serde_json::from_str(&data)?,
            SessionFormat::Toml => toml::from_str(&data)?,
        };
        definition.settings = normalize_session_settings(definition.settings);
        Ok(definition)
    }
}
