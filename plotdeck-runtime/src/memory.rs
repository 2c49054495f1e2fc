use crate::tracking::{DataError, RowCursor, RowSource};
use session::TableDefinition;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct InMemoryTable {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl InMemoryTable {
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }
}

struct SliceCursor<'a> {
    rows: &'a [Vec<f64>],
    next: usize,
}

impl RowCursor for SliceCursor<'_> {
    fn advance(&mut self) -> Result<bool, DataError> {
        if self.next < self.rows.len() {
            self.next += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn value(&self, column: usize) -> Result<f64, DataError> {
        let row = self
            .next
            .checked_sub(1)
            .and_then(|idx| self.rows.get(idx))
            .ok_or(DataError::ColumnOutOfRange { column, width: 0 })?;
        row.get(column).copied().ok_or(DataError::ColumnOutOfRange {
            column,
            width: row.len(),
        })
    }
}

impl RowSource for InMemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn row_count(&self) -> Option<u64> {
        Some(self.rows.len() as u64)
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn open(&self) -> Result<Box<dyn RowCursor + '_>, DataError> {
        Ok(Box::new(SliceCursor {
            rows: &self.rows,
            next: 0,
        }))
    }
}

/// Every this many rows the first column is blank (NaN).
const BLANK_ROW_PERIOD: u64 = 97;

fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Deterministic pseudo-random rows. Column `c` holds values in
/// `[-10 (c + 1), 10 (c + 1))`.
#[derive(Debug, Clone)]
pub struct SyntheticTable {
    name: String,
    columns: Vec<String>,
    count: u64,
    seed: u64,
    hide_count: bool,
}

impl SyntheticTable {
    pub fn new(name: impl Into<String>, columns: Vec<String>, count: u64, seed: u64) -> Self {
        Self {
            name: name.into(),
            columns,
            count,
            seed,
            hide_count: false,
        }
    }

    /// Keeps the row count from consumers.
    pub fn unsized_source(mut self) -> Self {
        self.hide_count = true;
        self
    }

    fn cell(&self, row: u64, column: usize) -> f64 {
        if column == 0 && row % BLANK_ROW_PERIOD == BLANK_ROW_PERIOD - 1 {
            return f64::NAN;
        }
        let key = row.wrapping_mul(1_000_003).wrapping_add(column as u64);
        let bits = splitmix64(self.seed ^ splitmix64(key));
        let unit = (bits >> 11) as f64 / (1u64 << 53) as f64;
        (unit * 2.0 - 1.0) * 10.0 * (column as f64 + 1.0)
    }
}

struct SyntheticCursor<'a> {
    table: &'a SyntheticTable,
    row: Option<u64>,
}

impl RowCursor for SyntheticCursor<'_> {
    fn advance(&mut self) -> Result<bool, DataError> {
        let next = self.row.map_or(0, |row| row + 1);
        if next < self.table.count {
            self.row = Some(next);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn value(&self, column: usize) -> Result<f64, DataError> {
        let width = self.table.columns.len();
        match self.row {
            Some(row) if column < width => Ok(self.table.cell(row, column)),
            _ => Err(DataError::ColumnOutOfRange { column, width }),
        }
    }
}

impl RowSource for SyntheticTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn row_count(&self) -> Option<u64> {
        (!self.hide_count).then_some(self.count)
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn open(&self) -> Result<Box<dyn RowCursor + '_>, DataError> {
        Ok(Box::new(SyntheticCursor {
            table: self,
            row: None,
        }))
    }
}

pub fn table_from_definition(definition: &TableDefinition) -> Arc<dyn RowSource> {
    match definition.synthetic {
        Some(synthetic) => {
            let table = SyntheticTable::new(
                definition.name.clone(),
                definition.columns.clone(),
                synthetic.count,
                synthetic.seed,
            );
            if synthetic.unsized_source {
                Arc::new(table.unsized_source())
            } else {
                Arc::new(table)
            }
        }
        None => Arc::new(InMemoryTable::new(
            definition.name.clone(),
            definition.columns.clone(),
            definition.rows.clone(),
        )),
    }
}
