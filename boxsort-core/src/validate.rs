use uuid::Uuid;

use crate::domain::{BoxDraft, StorageBox};
use crate::error::ValidationError;

/// A box is admissible when its name and every item name are non-empty.
pub fn validate_box(b: &StorageBox) -> Result<(), ValidationError> {
    check_names(&b.name, b.items.iter().map(|i| i.name.as_str()))
}

fn check_names<'a>(
    box_name: &str,
    item_names: impl Iterator<Item = &'a str>,
) -> Result<(), ValidationError> {
    if box_name.is_empty() {
        return Err(ValidationError::EmptyBoxName);
    }
    for (index, name) in item_names.enumerate() {
        if name.is_empty() {
            return Err(ValidationError::EmptyItemName { index });
        }
    }
    Ok(())
}

impl BoxDraft {
    /// Checks the draft and assigns fresh ids to the box and its items.
    pub fn validate(self) -> Result<StorageBox, ValidationError> {
        check_names(&self.name, self.items.iter().map(|i| i.name.as_str()))?;
        Ok(StorageBox {
            id: Uuid::new_v4(),
            name: self.name,
            items: self.items.into_iter().map(|d| d.into_item()).collect(),
        })
    }
}
