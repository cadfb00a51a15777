//! Explicitly constructed entry point: one repository, one image store.
//!
//! Built once at process start with [`Library::open`] and handed to whatever
//! presents boxes; [`Library::close`] flushes on exit.
use std::collections::HashSet;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::OpenParams;
use crate::domain::{BoxDraft, Item, ItemDraft, StorageBox, check_index};
use crate::error::{BoxSortError, Result, ValidationError};
use crate::images::{ImageHandle, ImageStore};
use crate::link::{self, Resolution};
use crate::qr;
use crate::repo::{BoxRepo, LoadStatus};
use crate::repo_factory::{Backend, open_repo};
use crate::search::{self, SearchHit};

pub struct Library {
    repo: Box<dyn BoxRepo>,
    images: ImageStore,
    status: LoadStatus,
}

impl Library {
    /// Open the file-backed library under `params.data_dir` and load it.
    pub fn open(params: &OpenParams) -> Result<(Self, LoadStatus)> {
        Self::open_with(Backend::Fs, params)
    }

    pub fn open_with(backend: Backend, params: &OpenParams) -> Result<(Self, LoadStatus)> {
        let repo = open_repo(backend, params)?;
        let images = ImageStore::open(params.paths(), params.seal_key.clone())?;
        let mut lib = Self {
            repo,
            images,
            status: LoadStatus::Fresh,
        };
        let status = lib.reload();
        Ok((lib, status))
    }

    /// Re-read the persisted collection, discarding unsaved memory state.
    pub fn reload(&mut self) -> LoadStatus {
        let status = self.repo.load(&self.images);
        info!(?status, "library loaded");
        self.status = status.clone();
        status
    }

    pub fn boxes(&self) -> &[StorageBox] {
        self.repo.boxes()
    }

    pub fn find(&self, id: &str) -> Option<&StorageBox> {
        self.repo.find_by_id(id)
    }

    pub fn repo(&self) -> &dyn BoxRepo {
        self.repo.as_ref()
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn add_box(&mut self, draft: BoxDraft) -> Result<Uuid> {
        let b = draft.validate()?;
        let id = b.id;
        self.repo.insert(b)?;
        debug!(%id, "box added");
        Ok(id)
    }

    pub fn rename_box(&mut self, id: Uuid, name: &str) -> Result<()> {
        self.repo.update(id, &mut |b| b.rename(name))
    }

    pub fn update_box(
        &mut self,
        id: Uuid,
        mutator: &mut dyn FnMut(&mut StorageBox),
    ) -> Result<()> {
        let before = self.get(id)?.clone();
        self.repo.update(id, mutator)?;
        let dropped: Vec<ImageHandle> = before.image_handles().collect();
        self.release_unreferenced(dropped);
        Ok(())
    }

    /// Delete a box and the photos only it referenced.
    pub fn remove_box(&mut self, id: Uuid) -> Result<StorageBox> {
        let removed = self.repo.remove(id)?;
        self.release_unreferenced(removed.image_handles());
        Ok(removed)
    }

    pub fn remove_box_at(&mut self, index: usize) -> Result<StorageBox> {
        let removed = self.repo.remove_at(index)?;
        self.release_unreferenced(removed.image_handles());
        Ok(removed)
    }

    pub fn reorder_boxes(&mut self, from: usize, to: usize) -> Result<()> {
        self.repo.reorder(from, to)
    }

    /// Append an item to box `box_id`; returns the new item's id.
    pub fn add_item(&mut self, box_id: Uuid, draft: ItemDraft) -> Result<Uuid> {
        if draft.name.is_empty() {
            let index = self.get(box_id)?.items.len();
            return Err(ValidationError::EmptyItemName { index }.into());
        }
        let item = draft.into_item();
        let id = item.id;
        let mut pending = Some(item);
        self.repo.update(box_id, &mut |b| {
            if let Some(it) = pending.take() {
                b.push_item(it);
            }
        })?;
        Ok(id)
    }

    pub fn remove_item(&mut self, box_id: Uuid, index: usize) -> Result<Item> {
        let removed = self.item(box_id, index)?.clone();
        self.repo.update(box_id, &mut |b| {
            b.items.remove(index);
        })?;
        self.release_unreferenced(removed.image_handle());
        Ok(removed)
    }

    pub fn move_item(&mut self, box_id: Uuid, from: usize, to: usize) -> Result<()> {
        let len = self.get(box_id)?.items.len();
        check_index(from, len)?;
        check_index(to, len)?;
        let mut moved = Ok(());
        self.repo
            .update(box_id, &mut |b| moved = b.move_item(from, to))?;
        moved
    }

    pub fn describe_item(
        &mut self,
        box_id: Uuid,
        index: usize,
        description: &str,
    ) -> Result<()> {
        self.item(box_id, index)?;
        self.repo.update(box_id, &mut |b| {
            b.items[index].description = description.to_string();
        })
    }

    /// Store `bytes` under a fresh handle and point the item at it. The
    /// previous photo is released.
    pub fn set_item_image(
        &mut self,
        box_id: Uuid,
        index: usize,
        bytes: &[u8],
    ) -> Result<ImageHandle> {
        let previous = self.item(box_id, index)?.image_handle();
        let handle = ImageHandle::generate();
        self.images.save(bytes, &handle)?;

        let new_ref = handle.to_string();
        let result = self.repo.update(box_id, &mut |b| {
            b.items[index].image_ref = new_ref.clone();
        });
        if let Err(e) = result {
            // Persist failures keep the change in memory, so only drop the
            // file when nothing points at it.
            self.release_unreferenced(Some(handle));
            return Err(e);
        }
        self.release_unreferenced(previous);
        Ok(handle)
    }

    pub fn clear_item_image(&mut self, box_id: Uuid, index: usize) -> Result<()> {
        let previous = self.item(box_id, index)?.image_handle();
        if previous.is_none() {
            return Ok(());
        }
        self.repo.update(box_id, &mut |b| b.items[index].image_ref.clear())?;
        self.release_unreferenced(previous);
        Ok(())
    }

    /// Photo bytes for an item; `None` when it has no photo or the file is
    /// gone.
    pub fn item_image(&self, box_id: Uuid, index: usize) -> Result<Option<Vec<u8>>> {
        match self.item(box_id, index)?.image_handle() {
            Some(h) => self.images.load(&h),
            None => Ok(None),
        }
    }

    pub fn resolve(&self, uri: &str) -> Resolution<'_> {
        link::resolve(self.repo.as_ref(), uri)
    }

    pub fn deep_link(&self, id: Uuid) -> Result<String> {
        Ok(qr::encode_deep_link(self.get(id)?))
    }

    pub fn qr_png(&self, id: Uuid) -> Result<Vec<u8>> {
        Ok(qr::render_qr_png(&self.deep_link(id)?))
    }

    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        search::search(self.repo.boxes(), query)
    }

    /// Delete image files that no item references.
    ///
    /// Refused while the collection is a recovery placeholder: the real data
    /// sits in the set-aside file and still owns those photos.
    pub fn sweep_orphans(&mut self) -> Result<Vec<ImageHandle>> {
        if let LoadStatus::Recovered { reason, .. } = &self.status {
            return Err(BoxSortError::Format(format!(
                "collection was recovered ({reason}); not sweeping images"
            )));
        }
        let referenced = self.referenced();
        let mut removed = Vec::new();
        for h in self.images.handles()? {
            if !referenced.contains(h.as_str()) && self.images.remove(&h)? {
                removed.push(h);
            }
        }
        if !removed.is_empty() {
            info!(count = removed.len(), "orphaned images removed");
        }
        Ok(removed)
    }

    pub fn is_dirty(&self) -> bool {
        self.repo.is_dirty()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.repo.flush()
    }

    /// Flush-on-exit.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }

    fn get(&self, id: Uuid) -> Result<&StorageBox> {
        let key = id.to_string();
        self.repo
            .find_by_id(&key)
            .ok_or(BoxSortError::NotFound(key))
    }

    fn item(&self, box_id: Uuid, index: usize) -> Result<&Item> {
        let b = self.get(box_id)?;
        check_index(index, b.items.len())?;
        Ok(&b.items[index])
    }

    fn referenced(&self) -> HashSet<&str> {
        self.repo
            .boxes()
            .iter()
            .flat_map(|b| b.items.iter())
            .filter(|i| i.has_image())
            .map(|i| i.image_ref.as_str())
            .collect()
    }

    /// Best effort: a file that cannot be removed now is left for
    /// [`Library::sweep_orphans`].
    fn release_unreferenced(&self, handles: impl IntoIterator<Item = ImageHandle>) {
        let referenced = self.referenced();
        for h in handles {
            if referenced.contains(h.as_str()) {
                continue;
            }
            if let Err(e) = self.images.remove(&h) {
                warn!(handle = %h, error = %e, "could not release image");
            }
        }
    }
}
