//! Flat-file storage backend: one JSON document per collection.
//!
//! No external server is required; the data directory is the database.
//!
//! # Layout
//!
//! - `customers.json`, `devices.json`, `tickets.json`, `services.json`,
//!   `invoices.json`: each a JSON array of records
//! - `<collection>.json.tmp`: staging files, only present during a commit
//!
//! # Commit protocol
//!
//! A commit may replace several files, which the filesystem cannot do
//! atomically as a group. The store therefore stages:
//!
//! 1. every changed collection is encoded and written to its `.tmp` file and
//!    synced; any failure deletes the staging files and leaves the live files
//!    untouched
//! 2. staging files are renamed over the live files, children before parents
//!    ([`EntityKind::LEAVES_FIRST`]); the previous bytes of each replaced file
//!    are kept in memory and written back if a later rename fails
//!
//! Each individual rename is atomic, so a reader sees either the old or the
//! new version of any one collection.
//!
//! # Feature flag
//!
//! Enabled by the default `file-store` feature.

use crate::core::entity::{EntityKind, Record};
use crate::core::error::StoreError;
use crate::core::store::{RecordStore, Tables};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

// ---------------------------------------------------------------------------
// Serialization helpers
// ---------------------------------------------------------------------------

fn encode_collection<R: Serialize>(kind: EntityKind, records: &[R]) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec_pretty(records).map_err(|source| StoreError::Codec {
        collection: kind.plural(),
        source,
    })
}

fn encode_kind(staged: &Tables, kind: EntityKind) -> Result<Vec<u8>, StoreError> {
    match kind {
        EntityKind::Customer => encode_collection(kind, &staged.customers),
        EntityKind::Device => encode_collection(kind, &staged.devices),
        EntityKind::Ticket => encode_collection(kind, &staged.tickets),
        EntityKind::Service => encode_collection(kind, &staged.services),
        EntityKind::Invoice => encode_collection(kind, &staged.invoices),
    }
}

/// Write `bytes` to `path` and flush them to disk
fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

// ---------------------------------------------------------------------------
// JsonFileStore
// ---------------------------------------------------------------------------

/// Directory-backed implementation of [`RecordStore`].
///
/// Clones share the write lock and generation counter, so every handle in
/// one process serialises its writers.
///
/// # Example
///
/// ```rust,ignore
/// use fixdesk::storage::JsonFileStore;
///
/// let store = JsonFileStore::open("data")?;
/// let shop = RepairShop::new(Arc::new(store));
/// ```
#[derive(Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
    generation: Arc<AtomicU64>,
}

impl JsonFileStore {
    /// Open (or create) a store in `dir`, initialising missing collections
    /// as empty arrays.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let store = Self {
            dir,
            write_lock: Arc::new(Mutex::new(())),
            generation: Arc::new(AtomicU64::new(0)),
        };

        for kind in EntityKind::ALL {
            let path = store.path(kind);
            if !path.exists() {
                write_synced(&path, b"[]").map_err(|e| StoreError::io(&path, e))?;
            }
        }

        tracing::debug!(dir = %store.dir.display(), "opened JSON file store");
        Ok(store)
    }

    /// Directory holding the collection files
    pub fn data_dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, kind: EntityKind) -> PathBuf {
        self.dir.join(format!("{}.json", kind.plural()))
    }

    fn staging_path(&self, kind: EntityKind) -> PathBuf {
        self.dir.join(format!("{}.json.tmp", kind.plural()))
    }

    /// Read one collection; a missing or blank file is an empty collection
    fn read_collection<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        let path = self.path(R::KIND);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Codec {
            collection: R::KIND.plural(),
            source,
        })
    }

    fn discard_staging(&self, kinds: &[EntityKind]) {
        for kind in kinds {
            let path = self.staging_path(*kind);
            if let Err(e) = fs::remove_file(&path) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "could not remove staging file");
                }
            }
        }
    }

    /// Put back the live files replaced so far, newest first
    fn restore(&self, replaced: Vec<(EntityKind, Option<Vec<u8>>)>) {
        for (kind, previous) in replaced.into_iter().rev() {
            let path = self.path(kind);
            let outcome = match previous {
                Some(bytes) => write_synced(&path, &bytes),
                None => fs::remove_file(&path),
            };
            match outcome {
                Ok(()) => tracing::warn!(collection = kind.plural(), "restored collection after failed commit"),
                Err(e) => tracing::error!(
                    collection = kind.plural(),
                    error = %e,
                    "could not restore collection after failed commit"
                ),
            }
        }
    }

    /// Phase 1: write every staging file or none
    fn stage(&self, staged: &Tables, order: &[EntityKind]) -> Result<(), StoreError> {
        for (index, kind) in order.iter().enumerate() {
            let path = self.staging_path(*kind);
            let written = encode_kind(staged, *kind)
                .and_then(|bytes| write_synced(&path, &bytes).map_err(|e| StoreError::io(&path, e)));

            if let Err(e) = written {
                self.discard_staging(&order[..=index]);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Phase 2: move staging files over the live ones, undoing on failure
    fn publish(&self, order: &[EntityKind]) -> Result<(), StoreError> {
        let mut replaced = Vec::with_capacity(order.len());

        for (index, kind) in order.iter().enumerate() {
            let live = self.path(*kind);
            let previous = match fs::read(&live) {
                Ok(bytes) => Some(bytes),
                Err(e) if e.kind() == io::ErrorKind::NotFound => None,
                Err(e) => {
                    self.restore(replaced);
                    self.discard_staging(&order[index..]);
                    return Err(StoreError::io(&live, e));
                }
            };

            if let Err(e) = fs::rename(self.staging_path(*kind), &live) {
                self.restore(replaced);
                self.discard_staging(&order[index..]);
                return Err(StoreError::io(&live, e));
            }

            replaced.push((*kind, previous));
        }
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn snapshot(&self) -> Result<Tables, StoreError> {
        Ok(Tables {
            customers: self.read_collection()?,
            devices: self.read_collection()?,
            tickets: self.read_collection()?,
            services: self.read_collection()?,
            invoices: self.read_collection()?,
        })
    }

    fn commit(&self, staged: &Tables, changed: &BTreeSet<EntityKind>) -> Result<(), StoreError> {
        let order: Vec<EntityKind> = EntityKind::LEAVES_FIRST
            .into_iter()
            .filter(|kind| changed.contains(kind))
            .collect();

        self.stage(staged, &order)?;
        self.publish(&order)?;

        self.generation.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(collections = order.len(), "committed to JSON file store");
        Ok(())
    }

    fn write_lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock.lock().map_err(|_| StoreError::Poisoned)
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
