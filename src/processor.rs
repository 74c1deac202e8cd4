use std::fmt;

use probe_table_lib::{FixedHashTable, PlacementKind, TableError};
use tracing::{debug, info, warn};

use crate::config::MAX_LOGGED_SKIPS;
use crate::error::Result;
use crate::record::{FieldValue, RawRow, Record};
use crate::store::SnapshotStore;

/// Why an input row did not become a record.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    MissingId,
    InvalidInteger { field: &'static str, value: String },
    NegativeCount { field: &'static str, value: i64 },
    CountOutOfRange { field: &'static str, value: i64 },
    CapacityExceeded(TableError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingId => write!(f, "missing id"),
            SkipReason::InvalidInteger { field, value } => {
                write!(f, "{} is not an integer: '{}'", field, value)
            }
            SkipReason::NegativeCount { field, value } => {
                write!(f, "{} must not be negative: {}", field, value)
            }
            SkipReason::CountOutOfRange { field, value } => {
                write!(f, "{} is out of range: {}", field, value)
            }
            SkipReason::CapacityExceeded(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowSkip {
    /// Zero-based position of the row in the batch.
    pub row: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub processed: Vec<Record>,
    pub skipped: Vec<RowSkip>,
}

impl BatchOutcome {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Validates one raw row into a record for a table of `capacity` slots.
pub fn normalize_row(row: &RawRow, capacity: usize) -> std::result::Result<Record, SkipReason> {
    let id = match &row.id {
        None => return Err(SkipReason::MissingId),
        Some(v) if v.is_null() => return Err(SkipReason::MissingId),
        Some(v) => v.as_integer().ok_or_else(|| SkipReason::InvalidInteger {
            field: "id",
            value: v.as_text(),
        })?,
    };

    let name = row.name.as_ref().map(FieldValue::as_text).unwrap_or_default();
    let department = row
        .department
        .as_ref()
        .map(FieldValue::as_text)
        .unwrap_or_default();
    let attendance = parse_count("attendance", row.attendance.as_ref())?;
    let total_days = parse_count("total_days", row.total_days.as_ref())?;

    Ok(Record::new(id, name, department, attendance, total_days, capacity))
}

// Absent or null counts default to 0.
fn parse_count(field: &'static str, value: Option<&FieldValue>) -> std::result::Result<u32, SkipReason> {
    let value = match value {
        None | Some(FieldValue::Null) => return Ok(0),
        Some(v) => v,
    };
    let n = value.as_integer().ok_or_else(|| SkipReason::InvalidInteger {
        field,
        value: value.as_text(),
    })?;
    if n < 0 {
        return Err(SkipReason::NegativeCount { field, value: n });
    }
    u32::try_from(n).map_err(|_| SkipReason::CountOutOfRange { field, value: n })
}

/// Turns batches of raw rows into records and applies them to the table.
pub struct RecordProcessor<'a> {
    table: &'a mut FixedHashTable<Record>,
    store: Option<&'a SnapshotStore>,
}

impl<'a> RecordProcessor<'a> {
    pub fn new(table: &'a mut FixedHashTable<Record>) -> Self {
        Self { table, store: None }
    }

    /// Persist the full snapshot to `store` after every batch.
    pub fn with_store(mut self, store: &'a SnapshotStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Processes `rows` in order. Bad rows are skipped individually and
    /// reported in the outcome; only a failed snapshot write is an error.
    pub fn process<I>(&mut self, rows: I) -> Result<BatchOutcome>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let capacity = self.table.capacity();
        let mut outcome = BatchOutcome::default();
        let mut warnings = 0;

        for (row_index, row) in rows.into_iter().enumerate() {
            let applied = normalize_row(&row, capacity).and_then(|record| {
                self.table
                    .insert(record.clone())
                    .map(|placement| (record, placement))
                    .map_err(SkipReason::CapacityExceeded)
            });

            match applied {
                Ok((record, placement)) => {
                    if let PlacementKind::Evicted { evicted_key } = placement.kind {
                        warn_limited(&mut warnings, || {
                            warn!(
                                "Table full: id {} overwrote id {} at slot {}",
                                record.id, evicted_key, placement.index
                            )
                        });
                    } else {
                        debug!("id {} -> slot {} ({:?})", record.id, placement.index, placement.kind);
                    }
                    outcome.processed.push(record);
                }
                Err(reason) => {
                    warn_limited(&mut warnings, || warn!("Skipping row {}: {}", row_index, reason));
                    outcome.skipped.push(RowSkip { row: row_index, reason });
                }
            }
        }

        if warnings > MAX_LOGGED_SKIPS {
            warn!("({} further row warnings suppressed)", warnings - MAX_LOGGED_SKIPS);
        }

        info!(
            "Processed {} rows ({} applied, {} skipped). Load: {:.2}%",
            outcome.processed.len() + outcome.skipped.len(),
            outcome.processed.len(),
            outcome.skipped.len(),
            self.table.load_factor() * 100.0
        );

        if let Some(store) = self.store {
            store.save(&self.table.snapshot())?;
        }
        Ok(outcome)
    }
}

fn warn_limited(count: &mut usize, log: impl FnOnce()) {
    if *count < MAX_LOGGED_SKIPS {
        log();
    }
    *count += 1;
}
