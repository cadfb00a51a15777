use uuid::Uuid;

use crate::domain::StorageBox;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchHit {
    /// Position in the collection.
    pub index: usize,
    pub box_id: Uuid,
    /// Items whose name contains the query.
    pub matches: usize,
}

/// Boxes holding at least one item whose name contains `query`, ignoring
/// case, in collection order. An empty query lists every box; whitespace is
/// part of the query.
pub fn search(boxes: &[StorageBox], query: &str) -> Vec<SearchHit> {
    let needle = query.to_uppercase();
    boxes
        .iter()
        .enumerate()
        .filter_map(|(index, b)| {
            let matches = if needle.is_empty() {
                0
            } else {
                let n = b
                    .items
                    .iter()
                    .filter(|i| i.name.to_uppercase().contains(&needle))
                    .count();
                if n == 0 {
                    return None;
                }
                n
            };
            Some(SearchHit {
                index,
                box_id: b.id,
                matches,
            })
        })
        .collect()
}
