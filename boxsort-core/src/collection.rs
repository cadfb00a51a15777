use uuid::Uuid;

use crate::domain::{StorageBox, check_index, move_within};
use crate::error::{BoxSortError, Result, ValidationError};
use crate::validate::validate_box;

/// One mutation of the box collection. Repositories apply a command in
/// memory and then persist the whole collection.
#[derive(Clone, Debug)]
pub enum Command {
    Insert(StorageBox),
    Replace(StorageBox),
    Remove(Uuid),
    RemoveAt(usize),
    Reorder { from: usize, to: usize },
}

/// Ordered boxes, most recently created first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Collection {
    boxes: Vec<StorageBox>,
}

impl Collection {
    pub fn new(boxes: Vec<StorageBox>) -> Self {
        Self { boxes }
    }

    pub fn boxes(&self) -> &[StorageBox] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// First box whose id renders as `id`. Ids are unique by construction,
    /// so the first match is the only one unless the file was tampered with.
    pub fn find_by_id(&self, id: &str) -> Option<&StorageBox> {
        self.boxes.iter().find(|b| b.id.to_string() == id)
    }

    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.boxes.iter().position(|b| b.id == id)
    }

    /// Run `mutator` on a copy of box `id` and check the result is still
    /// admissible. The stored box is not touched.
    pub fn prepare_update(
        &self,
        id: Uuid,
        mutator: &mut dyn FnMut(&mut StorageBox),
    ) -> Result<StorageBox> {
        let idx = self
            .position(id)
            .ok_or_else(|| BoxSortError::NotFound(id.to_string()))?;
        let mut edited = self.boxes[idx].clone();
        mutator(&mut edited);
        if edited.id != id {
            return Err(ValidationError::IdChanged.into());
        }
        validate_box(&edited)?;
        Ok(edited)
    }

    /// Apply `cmd`; returns the box that left the collection, if any.
    pub fn apply(&mut self, cmd: Command) -> Result<Option<StorageBox>> {
        match cmd {
            Command::Insert(b) => {
                validate_box(&b)?;
                self.boxes.insert(0, b);
                Ok(None)
            }
            Command::Replace(b) => {
                validate_box(&b)?;
                let idx = self
                    .position(b.id)
                    .ok_or_else(|| BoxSortError::NotFound(b.id.to_string()))?;
                let old = std::mem::replace(&mut self.boxes[idx], b);
                Ok(Some(old))
            }
            Command::Remove(id) => {
                let idx = self
                    .position(id)
                    .ok_or_else(|| BoxSortError::NotFound(id.to_string()))?;
                Ok(Some(self.boxes.remove(idx)))
            }
            Command::RemoveAt(index) => {
                check_index(index, self.boxes.len())?;
                Ok(Some(self.boxes.remove(index)))
            }
            Command::Reorder { from, to } => {
                move_within(&mut self.boxes, from, to)?;
                Ok(None)
            }
        }
    }
}
