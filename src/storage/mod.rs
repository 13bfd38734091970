//! Fault Log Storage
//!
//! Durable append-only fault event log on embedded sled. Keys are big-endian
//! epoch-millisecond ids so the natural key order is chronological; recent-N
//! queries are a bounded reverse scan, no index needed.
//!
//! Values are JSON-serialized [`FaultRecord`]s. The ingestion path only ever
//! appends; `resolve` is the single administrative mutation and flips one
//! record's lifecycle status in place.

use std::path::Path;

use tracing::{debug, info};

use crate::error::StorageError;
use crate::types::{FaultRecord, FaultStatus};

/// Handle to the fault event log. Clone-cheap (sled trees are `Arc` inside).
#[derive(Clone)]
pub struct FaultLog {
    db: sled::Db,
}

impl FaultLog {
    /// Open (or create) the fault log at the given directory.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        info!(path = %path.display(), records = db.len(), "Fault log opened");
        Ok(Self { db })
    }

    /// Append one fault record, returning the id it was stored under.
    ///
    /// Ids are epoch milliseconds; if two faults land in the same
    /// millisecond the id is bumped until a free slot is found, so every
    /// record survives. The final id is written back into the record.
    pub fn append(&self, mut record: FaultRecord) -> Result<u64, StorageError> {
        loop {
            let key = record.id.to_be_bytes();
            let value = serde_json::to_vec(&record)?;
            match self
                .db
                .compare_and_swap(key, None as Option<&[u8]>, Some(value))?
            {
                Ok(()) => break,
                Err(_) => record.id += 1,
            }
        }
        self.db.flush()?;
        debug!(id = record.id, label = %record.fault_label, "Fault record appended");
        Ok(record.id)
    }

    /// The `n` most recent fault records, newest first.
    pub fn recent(&self, n: usize) -> Result<Vec<FaultRecord>, StorageError> {
        let mut records = Vec::with_capacity(n.min(64));
        for entry in self.db.iter().rev().take(n) {
            let (_, value) = entry?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }

    /// Fetch one record by id.
    pub fn get(&self, id: u64) -> Result<FaultRecord, StorageError> {
        let value = self
            .db
            .get(id.to_be_bytes())?
            .ok_or(StorageError::NotFound(id))?;
        Ok(serde_json::from_slice(&value)?)
    }

    /// Mark a fault record resolved. Idempotent.
    pub fn resolve(&self, id: u64) -> Result<FaultRecord, StorageError> {
        let mut record = self.get(id)?;
        record.status = FaultStatus::Resolved;
        self.db
            .insert(id.to_be_bytes(), serde_json::to_vec(&record)?)?;
        self.db.flush()?;
        info!(id, label = %record.fault_label, "Fault record resolved");
        Ok(record)
    }

    /// Total records in the log.
    pub fn count(&self) -> usize {
        self.db.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: u64, label: &str) -> FaultRecord {
        FaultRecord {
            id,
            substation_id: "SUB-01".to_string(),
            line_id: "LINE-A".to_string(),
            timestamp: Utc::now(),
            voltage: 100.0,
            current: 15_000.0,
            fault_label: label.to_string(),
            status: FaultStatus::Active,
        }
    }

    fn open_temp() -> (tempfile::TempDir, FaultLog) {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = FaultLog::open(dir.path()).expect("open");
        (dir, log)
    }

    #[test]
    fn test_append_and_get() {
        let (_dir, log) = open_temp();
        let id = log.append(record(1_000, "LG")).expect("append");
        assert_eq!(id, 1_000);
        let fetched = log.get(id).expect("get");
        assert_eq!(fetched.fault_label, "LG");
        assert_eq!(fetched.status, FaultStatus::Active);
    }

    #[test]
    fn test_same_millisecond_ids_do_not_collide() {
        let (_dir, log) = open_temp();
        let a = log.append(record(2_000, "LG")).expect("append");
        let b = log.append(record(2_000, "LL")).expect("append");
        assert_eq!(a, 2_000);
        assert_eq!(b, 2_001);
        assert_eq!(log.count(), 2);
        assert_eq!(log.get(b).expect("get").fault_label, "LL");
    }

    #[test]
    fn test_recent_is_newest_first() {
        let (_dir, log) = open_temp();
        for (id, label) in [(10, "LG"), (20, "LL"), (30, "LLL")] {
            log.append(record(id, label)).expect("append");
        }
        let recent = log.recent(2).expect("recent");
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].fault_label, "LLL");
        assert_eq!(recent[1].fault_label, "LL");
    }

    #[test]
    fn test_recent_on_empty_log() {
        let (_dir, log) = open_temp();
        assert!(log.recent(20).expect("recent").is_empty());
    }

    #[test]
    fn test_resolve_flips_status() {
        let (_dir, log) = open_temp();
        let id = log.append(record(5_000, "Open")).expect("append");
        let resolved = log.resolve(id).expect("resolve");
        assert_eq!(resolved.status, FaultStatus::Resolved);
        assert_eq!(log.get(id).expect("get").status, FaultStatus::Resolved);
        // Idempotent
        let again = log.resolve(id).expect("resolve again");
        assert_eq!(again.status, FaultStatus::Resolved);
    }

    #[test]
    fn test_resolve_missing_is_not_found() {
        let (_dir, log) = open_temp();
        assert!(matches!(log.resolve(99), Err(StorageError::NotFound(99))));
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let log = FaultLog::open(dir.path()).expect("open");
            log.append(record(7_000, "HighImpedance")).expect("append");
        }
        let log = FaultLog::open(dir.path()).expect("reopen");
        assert_eq!(log.count(), 1);
        assert_eq!(log.get(7_000).expect("get").fault_label, "HighImpedance");
    }
}
