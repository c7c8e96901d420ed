//! # Stale Lock Reaper
//!
//! Out-of-band cleanup for deployments that mirror claims into a `locks/`
//! directory of `<node_id>.lock` files. The reaper scans the directory;
//! every record that parses and reports itself stale is removed and a
//! `lock_reaped` event appended to the ledger. Files without the `.lock`
//! suffix and unparseable JSON are skipped; per-file removal errors are
//! non-fatal.

use crate::domain::errors::LockError;
use af_02_ledger::{EventBody, EventLedger, LedgerEvent, LockReapedPayload};
use serde::{Deserialize, Serialize};
use shared_types::{NodeId, Timestamp};
use std::fs;
use std::path::{Path, PathBuf};

/// One `<node_id>.lock` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockFileRecord {
    pub node_id: NodeId,
    pub owner: String,
    pub acquired_at: Timestamp,
    pub expires_at: Timestamp,
}

impl LockFileRecord {
    /// Whether the record's deadline has passed.
    pub fn is_stale(&self) -> bool {
        Timestamp::now() > self.expires_at
    }
}

/// Scans a lock-file directory and reaps stale records into the ledger.
pub struct StaleLockReaper {
    locks_dir: PathBuf,
    ledger: EventLedger,
}

impl StaleLockReaper {
    pub fn new<P: AsRef<Path>>(locks_dir: P, ledger: EventLedger) -> Self {
        StaleLockReaper {
            locks_dir: locks_dir.as_ref().to_path_buf(),
            ledger,
        }
    }

    /// One sweep over the directory. Returns the records reaped.
    ///
    /// A missing directory is an empty sweep, not an error.
    pub fn reap_once(&self) -> Result<Vec<LockFileRecord>, LockError> {
        let entries = match fs::read_dir(&self.locks_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(LockError::Ledger(af_02_ledger::LedgerError::Io {
                    path: self.locks_dir.display().to_string(),
                    message: e.to_string(),
                }))
            }
        };

        let mut reaped = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("lock") {
                continue;
            }
            let record = match fs::read(&path)
                .ok()
                .and_then(|bytes| serde_json::from_slice::<LockFileRecord>(&bytes).ok())
            {
                Some(record) => record,
                None => {
                    tracing::debug!(path = %path.display(), "skipping unparseable lock file");
                    continue;
                }
            };
            if !record.is_stale() {
                continue;
            }

            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "stale lock removal failed");
                continue;
            }
            self.ledger
                .append(&LedgerEvent::now(EventBody::LockReaped(LockReapedPayload {
                    node_id: record.node_id.clone(),
                    owner: record.owner.clone(),
                    expires_at: record.expires_at,
                })))?;
            tracing::debug!(node_id = %record.node_id, "stale lock file reaped");
            reaped.push(record);
        }
        Ok(reaped)
    }
}
