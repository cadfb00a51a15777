//! Property test: decoding an encoded collection gives back the same boxes.

use boxsort_core::codec::{self, Decoded};
use boxsort_core::{Item, StorageBox};
use proptest::prelude::*;
use uuid::Uuid;

fn item() -> impl Strategy<Value = Item> {
    (
        any::<u128>(),
        "\\PC{1,16}",
        "\\PC{0,40}",
        prop_oneof![Just(String::new()), "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}"],
    )
        .prop_map(|(id, name, description, image_ref)| Item {
            id: Uuid::from_u128(id),
            name,
            description,
            image_ref,
        })
}

fn storage_box() -> impl Strategy<Value = StorageBox> {
    (any::<u128>(), "\\PC{1,24}", prop::collection::vec(item(), 0..6)).prop_map(
        |(id, name, items)| StorageBox {
            id: Uuid::from_u128(id),
            name,
            items,
        },
    )
}

proptest! {
    #[test]
    fn decode_inverts_encode(boxes in prop::collection::vec(storage_box(), 0..8)) {
        let bytes = codec::encode(&boxes).unwrap();
        let back = codec::decode(&bytes).unwrap();
        prop_assert_eq!(back, Decoded::Current(boxes));
    }

    #[test]
    fn truncation_never_panics(boxes in prop::collection::vec(storage_box(), 1..4), cut in 0usize..64) {
        let bytes = codec::encode(&boxes).unwrap();
        let cut = cut.min(bytes.len() - 1);
        prop_assert!(codec::decode(&bytes[..cut]).is_err());
        prop_assert!(codec::decode_or_empty(&bytes[..cut]).is_empty());
    }
}
