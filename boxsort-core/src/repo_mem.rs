use tracing::debug;

use crate::codec;
use crate::collection::{Collection, Command};
use crate::domain::StorageBox;
use crate::error::Result;
use crate::images::ImageStore;
use crate::repo::{BoxRepo, LoadStatus};

/// Repository whose "disk" is an in-memory encoded snapshot. Every persist
/// goes through the codec, so reloading behaves like an app restart.
#[derive(Debug, Default)]
pub struct MemBoxRepo {
    collection: Collection,
    snapshot: Option<Vec<u8>>,
}

impl MemBoxRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bytes a file-backed repository would have written.
    pub fn snapshot(&self) -> Option<&[u8]> {
        self.snapshot.as_deref()
    }

    fn persist(&mut self) -> Result<()> {
        let bytes = codec::encode(self.collection.boxes())?;
        debug!(boxes = self.collection.len(), len = bytes.len(), "persisted to memory");
        self.snapshot = Some(bytes);
        Ok(())
    }
}

impl BoxRepo for MemBoxRepo {
    fn collection(&self) -> &Collection {
        &self.collection
    }

    fn load(&mut self, images: &ImageStore) -> LoadStatus {
        let Some(bytes) = self.snapshot.as_deref() else {
            self.collection = Collection::default();
            return LoadStatus::Fresh;
        };
        match codec::decode(bytes) {
            Ok(codec::Decoded::Current(boxes)) => {
                let n = boxes.len();
                self.collection = Collection::new(boxes);
                LoadStatus::Loaded { boxes: n }
            }
            Ok(codec::Decoded::V1(old)) => {
                let boxes = codec::legacy::migrate_v1(old.clone(), images)
                    .unwrap_or_else(|_| codec::legacy::strip_v1(old));
                let n = boxes.len();
                self.collection = Collection::new(boxes);
                let _ = self.persist();
                LoadStatus::Migrated {
                    from: codec::legacy::VERSION,
                    boxes: n,
                }
            }
            Err(e) => {
                self.collection = Collection::default();
                LoadStatus::Recovered {
                    reason: e.to_string(),
                    backup: None,
                }
            }
        }
    }

    fn execute(&mut self, cmd: Command) -> Result<Option<StorageBox>> {
        let out = self.collection.apply(cmd)?;
        self.persist()?;
        Ok(out)
    }

    fn flush(&mut self) -> Result<()> {
        self.persist()
    }

    fn is_dirty(&self) -> bool {
        false
    }
}
