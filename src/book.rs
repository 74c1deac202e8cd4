use probe_table_lib::{FixedHashTable, OverflowPolicy};
use tracing::info;

use crate::config::ServiceConfig;
use crate::error::Result;
use crate::processor::{BatchOutcome, RecordProcessor};
use crate::record::{RawRow, Record};
use crate::store::SnapshotStore;

/// The attendance table together with its optional on-disk snapshot.
#[derive(Debug)]
pub struct AttendanceBook {
    table: FixedHashTable<Record>,
    store: Option<SnapshotStore>,
}

impl AttendanceBook {
    /// A table that is never persisted.
    pub fn in_memory(capacity: usize, policy: OverflowPolicy) -> Result<Self> {
        Ok(Self {
            table: FixedHashTable::with_policy(capacity, policy)?,
            store: None,
        })
    }

    /// Opens the configured database and replays it into a fresh table.
    pub fn open(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;
        let store = SnapshotStore::new(&config.db_path);
        let mut table = FixedHashTable::with_policy(config.table_capacity, config.overflow_policy())?;
        // Derived fields follow the current capacity, not the stored file.
        let capacity = table.capacity();
        let records = store.load()?.into_iter().map(|r| {
            Record::new(r.id, r.name, r.department, r.attendance, r.total_days, capacity)
        });
        table.clear_and_rebuild(records)?;
        info!(
            "Table ready: {} of {} slots used ({:?})",
            table.len(),
            table.capacity(),
            table.policy()
        );
        Ok(Self { table, store: Some(store) })
    }

    pub fn table(&self) -> &FixedHashTable<Record> {
        &self.table
    }

    pub fn store(&self) -> Option<&SnapshotStore> {
        self.store.as_ref()
    }

    /// Applies a batch of rows and persists the resulting snapshot.
    pub fn ingest<I>(&mut self, rows: I) -> Result<BatchOutcome>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut processor = RecordProcessor::new(&mut self.table);
        if let Some(store) = &self.store {
            processor = processor.with_store(store);
        }
        processor.process(rows)
    }
}
