// boxsort_core/src/domain.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BoxSortError, Result};
use crate::images::ImageHandle;

/// One physical thing kept in a box.
///
/// `image_ref` is a handle into the image store; an empty string means the
/// item has no photo. Image bytes never live in this record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_ref: String,
}

impl Item {
    /// The validated image handle, if the item has a photo.
    ///
    /// A reference that is not a valid handle is treated as "no image".
    pub fn image_handle(&self) -> Option<ImageHandle> {
        if self.image_ref.is_empty() {
            return None;
        }
        ImageHandle::parse(&self.image_ref).ok()
    }

    pub fn has_image(&self) -> bool {
        !self.image_ref.is_empty()
    }
}

/// A named group of items. `id` is assigned once and is the only identifier
/// deep links and QR codes rely on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageBox {
    pub id: Uuid,
    pub name: String,
    pub items: Vec<Item>,
}

impl StorageBox {
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn push_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn remove_item(&mut self, index: usize) -> Result<Item> {
        check_index(index, self.items.len())?;
        Ok(self.items.remove(index))
    }

    /// Moves the item at `from` so that it ends up at index `to`.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        move_within(&mut self.items, from, to)
    }

    pub fn image_handles(&self) -> impl Iterator<Item = ImageHandle> + '_ {
        self.items.iter().filter_map(Item::image_handle)
    }
}

/// User input for an item before it has an identity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
    pub image_ref: String,
}

impl ItemDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub(crate) fn into_item(self) -> Item {
        Item {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            image_ref: self.image_ref,
        }
    }
}

/// User input for a box. Only [`BoxDraft::validate`] turns it into a
/// [`StorageBox`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoxDraft {
    pub name: String,
    pub items: Vec<ItemDraft>,
}

impl BoxDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub fn item(mut self, item: ItemDraft) -> Self {
        self.items.push(item);
        self
    }
}

pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(BoxSortError::IndexOutOfRange { index, len });
    }
    Ok(())
}

/// Remove at `from`, insert at `to`; both must address existing slots.
pub(crate) fn move_within<T>(v: &mut Vec<T>, from: usize, to: usize) -> Result<()> {
    check_index(from, v.len())?;
    check_index(to, v.len())?;
    if from != to {
        let x = v.remove(from);
        v.insert(to, x);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StorageBox {
        StorageBox {
            id: Uuid::new_v4(),
            name: "Kitchen".into(),
            items: ["Mug", "Plate", "Bowl"]
                .into_iter()
                .map(|n| ItemDraft::named(n).into_item())
                .collect(),
        }
    }

    fn names(b: &StorageBox) -> Vec<&str> {
        b.items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn move_item_forward_and_back() {
        let mut b = sample();
        b.move_item(0, 2).unwrap();
        assert_eq!(names(&b), ["Plate", "Bowl", "Mug"]);
        b.move_item(2, 0).unwrap();
        assert_eq!(names(&b), ["Mug", "Plate", "Bowl"]);
    }

    #[test]
    fn move_item_out_of_range() {
        let mut b = sample();
        let err = b.move_item(0, 3).unwrap_err();
        assert!(matches!(
            err,
            BoxSortError::IndexOutOfRange { index: 3, len: 3 }
        ));
        assert_eq!(names(&b), ["Mug", "Plate", "Bowl"]);
    }

    #[test]
    fn image_handle_ignores_empty_and_bogus_refs() {
        let mut item = ItemDraft::named("Mug").into_item();
        assert!(item.image_handle().is_none());
        item.image_ref = "../../etc/passwd".into();
        assert!(item.image_handle().is_none());
        item.image_ref = "0b7c1d2e-aaaa-4bbb-8ccc-123456789abc".into();
        assert_eq!(
            item.image_handle().map(|h| h.to_string()),
            Some(item.image_ref.clone())
        );
    }
}
