//! Record storage.
//!
//! `RecordStore` holds the in-memory record sequence and delegates
//! durability to a `RecordSource` backend.

pub mod json_file;

pub use json_file::JsonFileSource;

use crate::error::{Result, TallyError};
use crate::models::{ActivityRecord, NewActivity};
use tracing::{debug, info};

/// Result of loading a record source.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Records in file order.
    pub records: Vec<ActivityRecord>,
    /// Set when the source was unreadable and has been reset.
    pub warning: Option<TallyError>,
}

impl LoadOutcome {
    /// An empty outcome after recovering from an unreadable source.
    pub fn recovered(warning: TallyError) -> Self {
        Self {
            records: Vec::new(),
            warning: Some(warning),
        }
    }
}

/// Durable storage for the full record set.
pub trait RecordSource {
    /// Read every record. Unreadable data is recovered from, not returned
    /// as an error.
    fn load(&self) -> Result<LoadOutcome>;

    /// Replace the stored records with `records`, all or nothing.
    fn save(&self, records: &[ActivityRecord]) -> Result<()>;
}

/// Append-only collection of activity records.
pub struct RecordStore<S: RecordSource> {
    source: S,
    records: Vec<ActivityRecord>,
}

impl<S: RecordSource> RecordStore<S> {
    /// Load the store from its source.
    ///
    /// Returns the storage warning, if any, alongside the store.
    pub fn open(source: S) -> Result<(Self, Option<TallyError>)> {
        let outcome = source.load()?;
        debug!("Opened record store with {} records", outcome.records.len());

        let store = Self {
            source,
            records: outcome.records,
        };
        Ok((store, outcome.warning))
    }

    /// All records in registration order.
    pub fn records(&self) -> &[ActivityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Add a record in memory. Call [`RecordStore::persist`] to make it durable.
    pub fn append(&mut self, record: ActivityRecord) {
        self.records.push(record);
    }

    /// Write every record to the source.
    pub fn persist(&self) -> Result<()> {
        self.source.save(&self.records)
    }

    /// Validate, append and persist a new activity.
    ///
    /// If saving fails, the record is removed again so memory never holds
    /// more than what is durable.
    pub fn register(&mut self, new: NewActivity, roster: &[String]) -> Result<ActivityRecord> {
        let record = new.into_record(roster)?;
        self.append(record.clone());

        if let Err(e) = self.persist() {
            self.records.pop();
            return Err(e);
        }

        info!(
            "Registered {} {:.1} km for {} on {}",
            record.activity_type(),
            record.distance_km(),
            record.person(),
            record.date()
        );
        Ok(record)
    }
}
