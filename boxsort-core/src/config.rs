// boxsort_core/src/config.rs
use std::path::{Path, PathBuf};

use crate::crypto::aead::SealKey;
use crate::images::ImageHandle;

pub const COLLECTION_FILE: &str = "boxes.cbor";
pub const CORRUPT_SUFFIX: &str = "corrupt";
pub const IMAGE_EXT: &str = "jpg";

#[derive(Clone, Debug)]
pub struct OpenParams {
    /// Private per-device storage area holding the collection and images.
    pub data_dir: PathBuf,
    /// When set, image files are sealed at rest with this key.
    pub seal_key: Option<SealKey>,
}

impl OpenParams {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            seal_key: None,
        }
    }

    pub fn sealed(mut self, key: SealKey) -> Self {
        self.seal_key = Some(key);
        self
    }

    pub fn paths(&self) -> StoragePaths {
        StoragePaths::new(&self.data_dir)
    }
}

/// Fixed file locations inside the data directory.
#[derive(Clone, Debug)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection(&self) -> PathBuf {
        self.root.join(COLLECTION_FILE)
    }

    /// Where the `n`th set-aside collection goes: `boxes.cbor.corrupt`,
    /// then `boxes.cbor.corrupt.1`, `.2` and so on.
    pub fn corrupt_backup(&self, n: u32) -> PathBuf {
        match n {
            0 => self.root.join(format!("{COLLECTION_FILE}.{CORRUPT_SUFFIX}")),
            n => self
                .root
                .join(format!("{COLLECTION_FILE}.{CORRUPT_SUFFIX}.{n}")),
        }
    }

    /// Copy of a collection file written by an older schema, kept after
    /// migration.
    pub fn legacy_backup(&self, version: u16) -> PathBuf {
        self.root.join(format!("{COLLECTION_FILE}.v{version}"))
    }

    pub fn image(&self, handle: &ImageHandle) -> PathBuf {
        self.root.join(format!("{handle}.{IMAGE_EXT}"))
    }
}
