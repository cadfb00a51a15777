use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::codec::{self, Decoded, legacy};
use crate::collection::{Collection, Command};
use crate::config::StoragePaths;
use crate::domain::StorageBox;
use crate::error::Result;
use crate::images::ImageStore;
use crate::repo::{BoxRepo, LoadStatus};
use crate::util::fsio::{ensure_private_dir, read_if_exists, write_atomic};

const MAX_CORRUPT_BACKUPS: u32 = 1000;

/// Repository persisted to one file, `boxes.cbor`, in the data directory.
pub struct FsBoxRepo {
    paths: StoragePaths,
    collection: Collection,
    dirty: bool,
}

impl FsBoxRepo {
    pub fn open(paths: StoragePaths) -> Result<Self> {
        ensure_private_dir(paths.root())?;
        Ok(Self {
            paths,
            collection: Collection::default(),
            dirty: false,
        })
    }

    pub fn path(&self) -> PathBuf {
        self.paths.collection()
    }

    fn persist(&mut self) -> Result<()> {
        let result = codec::encode(self.collection.boxes()).and_then(|bytes| {
            write_atomic(&self.paths.collection(), &bytes).map_err(Into::into)
        });
        match &result {
            Ok(()) => {
                self.dirty = false;
                debug!(boxes = self.collection.len(), "collection persisted");
            }
            Err(e) => {
                self.dirty = true;
                warn!(error = %e, "collection persist failed");
            }
        }
        result
    }

    /// Move an unreadable collection file out of the way so the next save
    /// cannot overwrite it. Earlier set-aside files are never replaced.
    fn set_aside(&self) -> Option<PathBuf> {
        let Some(backup) = (0..MAX_CORRUPT_BACKUPS)
            .map(|n| self.paths.corrupt_backup(n))
            .find(|p| !p.exists())
        else {
            warn!("too many set-aside collections; leaving the unreadable file in place");
            return None;
        };
        match fs::rename(self.paths.collection(), &backup) {
            Ok(()) => Some(backup),
            Err(e) => {
                warn!(error = %e, "could not move unreadable collection aside");
                None
            }
        }
    }

    fn recover(&mut self, reason: String) -> LoadStatus {
        let backup = self.set_aside();
        warn!(%reason, backup = ?backup, "starting with an empty collection");
        self.collection = Collection::default();
        LoadStatus::Recovered { reason, backup }
    }

    fn migrate(
        &mut self,
        raw: &[u8],
        old: Vec<legacy::BoxV1>,
        images: &ImageStore,
    ) -> LoadStatus {
        let backup = self.paths.legacy_backup(legacy::VERSION);
        if let Err(e) = write_atomic(&backup, raw) {
            warn!(error = %e, "could not keep a copy of the legacy collection");
        }
        let boxes = match legacy::migrate_v1(old.clone(), images) {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "photo migration failed; photos remain in the legacy copy");
                legacy::strip_v1(old)
            }
        };
        let n = boxes.len();
        self.collection = Collection::new(boxes);
        // A failed write leaves the repo dirty; the next mutation retries.
        let _ = self.persist();
        LoadStatus::Migrated {
            from: legacy::VERSION,
            boxes: n,
        }
    }
}

impl BoxRepo for FsBoxRepo {
    fn collection(&self) -> &Collection {
        &self.collection
    }

    fn load(&mut self, images: &ImageStore) -> LoadStatus {
        self.dirty = false;
        let raw = match read_if_exists(&self.paths.collection()) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.collection = Collection::default();
                return LoadStatus::Fresh;
            }
            Err(e) => return self.recover(format!("read: {e}")),
        };
        match codec::decode(&raw) {
            Ok(Decoded::Current(boxes)) => {
                let n = boxes.len();
                self.collection = Collection::new(boxes);
                debug!(boxes = n, "collection loaded");
                LoadStatus::Loaded { boxes: n }
            }
            Ok(Decoded::V1(old)) => self.migrate(&raw, old, images),
            Err(e) => self.recover(e.to_string()),
        }
    }

    fn execute(&mut self, cmd: Command) -> Result<Option<StorageBox>> {
        let out = self.collection.apply(cmd)?;
        self.persist()?;
        Ok(out)
    }

    fn flush(&mut self) -> Result<()> {
        if self.dirty {
            self.persist()?;
        }
        Ok(())
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }
}
