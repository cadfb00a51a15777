//! Schema version 1: items carried their photo inline as base64 text.
//!
//! Version 2 moved photos into the image store and left only a handle in
//! the record. [`migrate_v1`] performs that move for files written by older
//! builds.
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{Item, StorageBox};
use crate::error::Result;
use crate::images::{ImageHandle, ImageStore};

pub const VERSION: u16 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemV1 {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Base64 JPEG; empty when the item had no photo.
    pub image_b64: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxV1 {
    pub id: Uuid,
    pub name: String,
    pub items: Vec<ItemV1>,
}

/// Move every inline photo into `images` under a fresh handle.
///
/// Ids, names, descriptions and ordering carry over unchanged. A photo
/// whose base64 does not decode is dropped; the item is kept.
pub fn migrate_v1(boxes: Vec<BoxV1>, images: &ImageStore) -> Result<Vec<StorageBox>> {
    let mut out = Vec::with_capacity(boxes.len());
    let mut moved = 0usize;
    for b in boxes {
        let mut items = Vec::with_capacity(b.items.len());
        for it in b.items {
            let image_ref = match decode_photo(&it) {
                Some(bytes) => {
                    let handle = ImageHandle::generate();
                    images.save(&bytes, &handle)?;
                    moved += 1;
                    handle.to_string()
                }
                None => String::new(),
            };
            items.push(Item {
                id: it.id,
                name: it.name,
                description: it.description,
                image_ref,
            });
        }
        out.push(StorageBox {
            id: b.id,
            name: b.name,
            items,
        });
    }
    debug!(boxes = out.len(), photos = moved, "migrated schema v1");
    Ok(out)
}

/// Convert without an image store; inline photos are discarded.
pub fn strip_v1(boxes: Vec<BoxV1>) -> Vec<StorageBox> {
    boxes
        .into_iter()
        .map(|b| StorageBox {
            id: b.id,
            name: b.name,
            items: b
                .items
                .into_iter()
                .map(|it| Item {
                    id: it.id,
                    name: it.name,
                    description: it.description,
                    image_ref: String::new(),
                })
                .collect(),
        })
        .collect()
}

fn decode_photo(it: &ItemV1) -> Option<Vec<u8>> {
    // Older writers wrapped long base64 lines.
    let compact: String = it
        .image_b64
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return None;
    }
    match STANDARD.decode(compact.as_bytes()) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!(item = %it.id, error = %e, "dropping undecodable inline photo");
            None
        }
    }
}
