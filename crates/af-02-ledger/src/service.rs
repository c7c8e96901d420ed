//! # Ledger Service
//!
//! The `EventLedger` is a handle on a shared directory of `<seq>.json`
//! files. Any number of reader and writer processes may share it; commit
//! order is arbitrated purely by the filesystem.
//!
//! ## Append protocol (INVARIANT-2, INVARIANT-3)
//!
//! 1. Scan the directory for the current maximum sequence `N`.
//! 2. Stage the full JSON to a unique dot-prefixed temp name and fsync it.
//! 3. Link the temp into place as `<N+1>.json`. Creating the link fails if
//!    the name exists, so exactly one writer wins each sequence number and
//!    readers only ever observe complete files.
//! 4. Unlink the temp. On a lost race, retry from the scan up to
//!    [`MAX_APPEND_ATTEMPTS`], then surface a retriable error.

use crate::domain::errors::LedgerError;
use crate::domain::events::LedgerEvent;
use serde::Deserialize;
use shared_types::Timestamp;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Zero-padded width of sequence file names (`000001.json`).
pub const SEQUENCE_WIDTH: usize = 6;

/// Bounded retry count for lost sequence races.
pub const MAX_APPEND_ATTEMPTS: u32 = 16;

/// Process-local staging counter; keeps temp names unique per writer.
static STAGE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One event as read back from the ledger: its sequence number and the
/// raw bytes of its file.
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub seq: u64,
    pub bytes: Vec<u8>,
}

/// The envelope keys every event file must carry.
#[derive(Debug, Clone, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    timestamp: Timestamp,
}

impl RawEvent {
    /// The `type` string, validating the envelope shape only.
    pub fn peek_type(&self) -> Result<String, LedgerError> {
        self.envelope().map(|(kind, _)| kind)
    }

    /// The `(type, timestamp)` envelope, validating shape only.
    pub fn envelope(&self) -> Result<(String, Timestamp), LedgerError> {
        let envelope: Envelope =
            serde_json::from_slice(&self.bytes).map_err(|e| LedgerError::InvalidEnvelope {
                seq: self.seq,
                message: e.to_string(),
            })?;
        Ok((envelope.kind, envelope.timestamp))
    }

    /// Decode into the typed event, payload included.
    pub fn decode(&self) -> Result<LedgerEvent, LedgerError> {
        serde_json::from_slice(&self.bytes).map_err(|e| LedgerError::DecodeFailed {
            seq: self.seq,
            message: e.to_string(),
        })
    }
}

/// Handle on a ledger directory.
///
/// The handle holds no state beyond the path: every operation consults the
/// filesystem, which is what makes concurrent writers safe.
#[derive(Debug, Clone)]
pub struct EventLedger {
    dir: PathBuf,
}

impl EventLedger {
    /// Open (creating if absent) the ledger directory.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, LedgerError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        Ok(EventLedger { dir })
    }

    /// The ledger directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The current maximum sequence number (0 for an empty ledger).
    pub fn count(&self) -> Result<u64, LedgerError> {
        self.scan_max_seq()
    }

    /// Append a typed event; returns its assigned sequence number.
    pub fn append(&self, event: &LedgerEvent) -> Result<u64, LedgerError> {
        let bytes = serde_json::to_vec(event).map_err(|e| LedgerError::Serialize {
            message: e.to_string(),
        })?;
        let seq = self.append_bytes(&bytes)?;
        tracing::debug!(seq, kind = event.kind(), "ledger append");
        Ok(seq)
    }

    /// Append a pre-serialised JSON object; returns its sequence number.
    ///
    /// The value must already carry the `type` and `timestamp` envelope
    /// keys; the ledger does not inspect it further.
    pub fn append_value(&self, value: &serde_json::Value) -> Result<u64, LedgerError> {
        let bytes = serde_json::to_vec(value).map_err(|e| LedgerError::Serialize {
            message: e.to_string(),
        })?;
        self.append_bytes(&bytes)
    }

    fn append_bytes(&self, bytes: &[u8]) -> Result<u64, LedgerError> {
        for _attempt in 0..MAX_APPEND_ATTEMPTS {
            let next = self.scan_max_seq()? + 1;
            let target = self.seq_path(next);
            let staged = self.stage(bytes, next)?;

            match fs::hard_link(&staged, &target) {
                Ok(()) => {
                    let _ = fs::remove_file(&staged);
                    return Ok(next);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    // Another writer committed this sequence first.
                    let _ = fs::remove_file(&staged);
                    continue;
                }
                Err(e) => {
                    let _ = fs::remove_file(&staged);
                    return Err(io_err(&target, e));
                }
            }
        }
        Err(LedgerError::AppendContention {
            attempts: MAX_APPEND_ATTEMPTS,
        })
    }

    /// Write the payload to a unique temp name in the ledger directory and
    /// flush it fully before it can become visible under a sequence name.
    fn stage(&self, bytes: &[u8], seq: u64) -> Result<PathBuf, LedgerError> {
        let nonce = STAGE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let name = format!(".tmp-{:0width$}-{}-{}", seq, std::process::id(), nonce, width = SEQUENCE_WIDTH);
        let path = self.dir.join(name);

        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&path)
            .map_err(|e| io_err(&path, e))?;
        file.write_all(bytes).map_err(|e| io_err(&path, e))?;
        file.sync_all().map_err(|e| io_err(&path, e))?;
        Ok(path)
    }

    /// All events in sequence order, verifying the dense 1..N topology.
    pub fn read_all(&self) -> Result<Vec<RawEvent>, LedgerError> {
        let present = self.scan_sequences()?;
        let max = match present.keys().next_back() {
            Some(max) => *max,
            None => return Ok(Vec::new()),
        };

        let missing: Vec<u64> = (1..=max).filter(|seq| !present.contains_key(seq)).collect();
        if !missing.is_empty() {
            return Err(LedgerError::MissingSequences { missing });
        }

        let mut events = Vec::with_capacity(present.len());
        for (seq, path) in present {
            let mut bytes = Vec::new();
            File::open(&path)
                .and_then(|mut f| f.read_to_end(&mut bytes))
                .map_err(|e| LedgerError::Unreadable {
                    seq,
                    message: e.to_string(),
                })?;
            events.push(RawEvent { seq, bytes });
        }
        Ok(events)
    }

    /// All events decoded into their typed form. Decode failures carry the
    /// offending sequence number.
    pub fn read_typed(&self) -> Result<Vec<(u64, LedgerEvent)>, LedgerError> {
        self.read_all()?
            .iter()
            .map(|raw| raw.decode().map(|event| (raw.seq, event)))
            .collect()
    }

    fn seq_path(&self, seq: u64) -> PathBuf {
        self.dir
            .join(format!("{:0width$}.json", seq, width = SEQUENCE_WIDTH))
    }

    /// Map of sequence number to file path for every well-named event
    /// file. Staging files and foreign names are ignored; a sequence of
    /// zero is corruption (sequences are one-based).
    fn scan_sequences(&self) -> Result<BTreeMap<u64, PathBuf>, LedgerError> {
        let mut present = BTreeMap::new();
        let entries = fs::read_dir(&self.dir).map_err(|e| io_err(&self.dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&self.dir, e))?;
            let path = entry.path();
            let Some(seq) = parse_seq_name(&path) else {
                continue;
            };
            if seq == 0 {
                return Err(LedgerError::InvalidSequence { seq });
            }
            present.insert(seq, path);
        }
        Ok(present)
    }

    fn scan_max_seq(&self) -> Result<u64, LedgerError> {
        Ok(self
            .scan_sequences()?
            .keys()
            .next_back()
            .copied()
            .unwrap_or(0))
    }
}

/// Parse `<digits>.json` into a sequence number; anything else is `None`.
fn parse_seq_name(path: &Path) -> Option<u64> {
    if path.extension()?.to_str()? != "json" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

fn io_err(path: &Path, e: std::io::Error) -> LedgerError {
    LedgerError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}
