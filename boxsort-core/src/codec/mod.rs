//! On-disk form of the box collection.
//!
//! A file is a fixed [`header::Header`] followed by a CBOR payload
//! `{ "boxes": [ { "id", "name", "items": [ { "id", "name", "description",
//! "image_ref" } ] } ] }`. Field names travel with the data, and an empty
//! item list is written as an empty array rather than omitted.
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::StorageBox;
use crate::error::{BoxSortError, DecodeError, Result};

pub mod header;
pub mod legacy;

use header::Header;
use legacy::BoxV1;

pub const CURRENT_VERSION: u16 = 2;

#[derive(Serialize)]
struct PayloadRef<'a> {
    boxes: &'a [StorageBox],
}

#[derive(Deserialize)]
struct Payload<T> {
    boxes: Vec<T>,
}

/// Result of a successful decode, tagged with the schema it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Current(Vec<StorageBox>),
    V1(Vec<BoxV1>),
}

impl Decoded {
    pub fn version(&self) -> u16 {
        match self {
            Decoded::Current(_) => CURRENT_VERSION,
            Decoded::V1(_) => legacy::VERSION,
        }
    }

    /// Boxes in the current schema; legacy inline photos are discarded.
    pub fn into_boxes(self) -> Vec<StorageBox> {
        match self {
            Decoded::Current(v) => v,
            Decoded::V1(v) => legacy::strip_v1(v),
        }
    }
}

pub fn encode(boxes: &[StorageBox]) -> Result<Vec<u8>> {
    frame(CURRENT_VERSION, &PayloadRef { boxes })
}

pub fn decode(bytes: &[u8]) -> std::result::Result<Decoded, DecodeError> {
    let header = Header::parse(bytes)?;
    let payload = header.payload(bytes)?;
    match header.version {
        CURRENT_VERSION => Ok(Decoded::Current(read_payload(payload)?)),
        legacy::VERSION => Ok(Decoded::V1(read_payload(payload)?)),
        v => Err(DecodeError::UnsupportedVersion(v)),
    }
}

/// Decode, treating any failure as an empty collection.
pub fn decode_or_empty(bytes: &[u8]) -> Vec<StorageBox> {
    match decode(bytes) {
        Ok(d) => d.into_boxes(),
        Err(e) => {
            warn!(error = %e, "collection unreadable, using empty");
            Vec::new()
        }
    }
}

fn frame<T: Serialize>(version: u16, payload: &T) -> Result<Vec<u8>> {
    let mut body = Vec::with_capacity(1024);
    ciborium::ser::into_writer(payload, &mut body)
        .map_err(|e| BoxSortError::Format(format!("collection encode: {e}")))?;
    if body.len() > u32::MAX as usize {
        return Err(BoxSortError::Format("collection too large".into()));
    }
    let mut out = Vec::with_capacity(header::HEADER_LEN + body.len());
    Header::for_payload(version, &body).write_to(&mut out)?;
    out.extend_from_slice(&body);
    Ok(out)
}

fn read_payload<T: for<'de> Deserialize<'de>>(
    payload: &[u8],
) -> std::result::Result<Vec<T>, DecodeError> {
    let p: Payload<T> =
        ciborium::de::from_reader(payload).map_err(|e| DecodeError::Schema(e.to_string()))?;
    Ok(p.boxes)
}

/// Write a schema v1 file, as older builds did.
#[cfg(test)]
pub(crate) fn encode_v1(boxes: &[BoxV1]) -> Result<Vec<u8>> {
    #[derive(Serialize)]
    struct V1Ref<'a> {
        boxes: &'a [BoxV1],
    }
    frame(legacy::VERSION, &V1Ref { boxes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoxDraft, Item, ItemDraft};
    use uuid::Uuid;

    fn kitchen_and_garage() -> Vec<StorageBox> {
        vec![
            BoxDraft::named("Kitchen")
                .item(ItemDraft::named("Mug"))
                .validate()
                .unwrap(),
            BoxDraft::named("Garage").validate().unwrap(),
        ]
    }

    #[test]
    fn kitchen_and_garage_survive() {
        let boxes = kitchen_and_garage();
        let back = decode(&encode(&boxes).unwrap()).unwrap();
        assert_eq!(back.version(), CURRENT_VERSION);
        let back = back.into_boxes();
        assert_eq!(back, boxes);
        assert_eq!(back[0].items[0].name, "Mug");
        assert!(back[1].items.is_empty());
    }

    #[test]
    fn empty_item_list_is_written_not_omitted() {
        let boxes = kitchen_and_garage();
        let bytes = encode(&boxes[1..]).unwrap();
        let value: ciborium::value::Value =
            ciborium::de::from_reader(&bytes[header::HEADER_LEN..]).unwrap();
        let text = format!("{value:?}");
        assert!(text.contains("\"items\""), "{text}");
    }

    #[test]
    fn empty_collection_and_unicode() {
        assert_eq!(decode(&encode(&[]).unwrap()).unwrap().into_boxes(), vec![]);

        let b = StorageBox {
            id: Uuid::new_v4(),
            name: "Küche 📦".into(),
            items: vec![Item {
                id: Uuid::new_v4(),
                name: "茶碗".into(),
                description: "ひび割れ".into(),
                image_ref: "f3a1c2d4-0000-4000-8000-000000000000".into(),
            }],
        };
        let back = decode(&encode(std::slice::from_ref(&b)).unwrap()).unwrap();
        assert_eq!(back, Decoded::Current(vec![b]));
    }

    #[test]
    fn failures_are_typed() {
        let bytes = encode(&kitchen_and_garage()).unwrap();
        assert_eq!(decode(&[]), Err(DecodeError::Empty));
        assert_eq!(decode(&bytes[..10]), Err(DecodeError::Truncated));
        assert_eq!(decode(b"bplist00junk"), Err(DecodeError::BadMagic));

        let mut future = bytes.clone();
        future[8] = 9;
        assert_eq!(decode(&future), Err(DecodeError::UnsupportedVersion(9)));
    }

    #[test]
    fn schema_mismatch_is_reported() {
        #[derive(Serialize)]
        struct Wrong {
            boxes: Vec<u32>,
        }
        let bytes = frame(CURRENT_VERSION, &Wrong { boxes: vec![1, 2] }).unwrap();
        assert!(matches!(decode(&bytes), Err(DecodeError::Schema(_))));
        assert!(decode_or_empty(&bytes).is_empty());
    }

    #[test]
    fn v1_files_are_recognised() {
        let old = vec![BoxV1 {
            id: Uuid::new_v4(),
            name: "Attic".into(),
            items: vec![],
        }];
        let d = decode(&encode_v1(&old).unwrap()).unwrap();
        assert_eq!(d.version(), legacy::VERSION);
        assert_eq!(d.into_boxes()[0].name, "Attic");
    }
}
