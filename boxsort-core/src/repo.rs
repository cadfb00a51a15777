// boxsort_core/src/repo.rs
use std::path::PathBuf;

use uuid::Uuid;

use crate::collection::{Collection, Command};
use crate::domain::StorageBox;
use crate::error::{BoxSortError, Result};
use crate::images::ImageStore;

/// What [`BoxRepo::load`] found on disk. Loading itself never fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing persisted yet.
    Fresh,
    Loaded { boxes: usize },
    /// An older schema was upgraded and written back in the current one.
    Migrated { from: u16, boxes: usize },
    /// The persisted file could not be read; the collection starts empty and
    /// the unreadable file was moved to `backup` when possible.
    Recovered {
        reason: String,
        backup: Option<PathBuf>,
    },
}

/// Source of truth for the box collection.
///
/// Every mutating call changes the in-memory collection and then persists
/// synchronously. The returned `Result` reports the persist step: on error
/// the change is kept in memory, the repository is marked dirty and
/// [`BoxRepo::flush`] can retry.
pub trait BoxRepo {
    fn collection(&self) -> &Collection;

    /// Replace the in-memory collection with the persisted one.
    fn load(&mut self, images: &ImageStore) -> LoadStatus;

    /// Apply one command and persist.
    fn execute(&mut self, cmd: Command) -> Result<Option<StorageBox>>;

    /// Persist if an earlier write failed.
    fn flush(&mut self) -> Result<()>;

    fn is_dirty(&self) -> bool;

    fn boxes(&self) -> &[StorageBox] {
        self.collection().boxes()
    }

    fn find_by_id(&self, id: &str) -> Option<&StorageBox> {
        self.collection().find_by_id(id)
    }

    fn insert(&mut self, b: StorageBox) -> Result<()> {
        self.execute(Command::Insert(b)).map(|_| ())
    }

    /// Mutate box `id` in place. Rejected, leaving the box untouched, if the
    /// result is not well-formed or the mutator changed the id.
    fn update(&mut self, id: Uuid, mutator: &mut dyn FnMut(&mut StorageBox)) -> Result<()> {
        let edited = self.collection().prepare_update(id, mutator)?;
        self.execute(Command::Replace(edited)).map(|_| ())
    }

    fn remove(&mut self, id: Uuid) -> Result<StorageBox> {
        self.execute(Command::Remove(id))?
            .ok_or_else(|| BoxSortError::NotFound(id.to_string()))
    }

    fn remove_at(&mut self, index: usize) -> Result<StorageBox> {
        let len = self.collection().len();
        self.execute(Command::RemoveAt(index))?
            .ok_or(BoxSortError::IndexOutOfRange { index, len })
    }

    /// Move the box at `from` so it ends up at index `to`.
    fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        self.execute(Command::Reorder { from, to }).map(|_| ())
    }
}
