// boxsort_core/src/images.rs
use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{IMAGE_EXT, StoragePaths};
use crate::crypto::aead::{self, SealKey};
use crate::error::{BoxSortError, Result};
use crate::util::fsio::{ensure_private_dir, read_if_exists, write_atomic};

/// Marks an image file whose bytes are sealed; plain files are stored as-is.
pub const SEAL_MAGIC: &[u8; 8] = b"BXSEAL01";

const MAX_HANDLE_LEN: usize = 64;

/// Opaque key into the image store. Restricted to `[A-Za-z0-9-]` so it can
/// only ever name a file directly inside the storage directory.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageHandle(String);

impl ImageHandle {
    /// Fresh random handle for a new capture. Never derived from content.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn parse(s: &str) -> Result<Self> {
        let ok = !s.is_empty()
            && s.len() <= MAX_HANDLE_LEN
            && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-');
        if !ok {
            return Err(BoxSortError::InvalidHandle(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One file per handle, `<handle>.jpg`, in the private data directory.
pub struct ImageStore {
    paths: StoragePaths,
    seal: Option<SealKey>,
}

impl ImageStore {
    pub fn open(paths: StoragePaths, seal: Option<SealKey>) -> Result<Self> {
        ensure_private_dir(paths.root())?;
        Ok(Self { paths, seal })
    }

    pub fn is_sealed(&self) -> bool {
        self.seal.is_some()
    }

    pub fn save(&self, bytes: &[u8], handle: &ImageHandle) -> Result<()> {
        let body = match &self.seal {
            Some(key) => {
                let sealed = aead::seal(key, handle.as_str().as_bytes(), bytes)?;
                let mut out = Vec::with_capacity(SEAL_MAGIC.len() + sealed.len());
                out.extend_from_slice(SEAL_MAGIC);
                out.extend_from_slice(&sealed);
                out
            }
            None => bytes.to_vec(),
        };
        write_atomic(&self.paths.image(handle), &body)?;
        debug!(%handle, len = bytes.len(), sealed = self.is_sealed(), "image saved");
        Ok(())
    }

    /// `Ok(None)` when no file exists for `handle`.
    pub fn load(&self, handle: &ImageHandle) -> Result<Option<Vec<u8>>> {
        let Some(raw) = read_if_exists(&self.paths.image(handle))? else {
            return Ok(None);
        };
        match raw.strip_prefix(&SEAL_MAGIC[..]) {
            Some(sealed) => {
                let key = self.seal.as_ref().ok_or_else(|| {
                    BoxSortError::Crypto("image is sealed; a key is required".into())
                })?;
                Ok(Some(aead::open(key, handle.as_str().as_bytes(), sealed)?))
            }
            None => Ok(Some(raw)),
        }
    }

    /// Like [`ImageStore::load`] but any failure reads as "no image".
    pub fn load_or_none(&self, handle: &ImageHandle) -> Option<Vec<u8>> {
        match self.load(handle) {
            Ok(v) => v,
            Err(e) => {
                warn!(%handle, error = %e, "image unreadable");
                None
            }
        }
    }

    pub fn contains(&self, handle: &ImageHandle) -> bool {
        self.paths.image(handle).is_file()
    }

    /// Delete the file for `handle`. A missing file is not an error.
    pub fn remove(&self, handle: &ImageHandle) -> Result<bool> {
        match fs::remove_file(self.paths.image(handle)) {
            Ok(()) => {
                debug!(%handle, "image removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Every handle with a file on disk, sorted.
    pub fn handles(&self) -> Result<Vec<ImageHandle>> {
        let mut out = Vec::new();
        for entry in walkdir::WalkDir::new(self.paths.root())
            .min_depth(1)
            .max_depth(1)
        {
            let entry = entry.map_err(|e| {
                std::io::Error::new(std::io::ErrorKind::Other, format!("walk: {e}"))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(h) = handle_from_path(entry.path()) {
                out.push(h);
            }
        }
        out.sort();
        Ok(out)
    }
}

fn handle_from_path(p: &Path) -> Option<ImageHandle> {
    if p.extension()?.to_str()? != IMAGE_EXT {
        return None;
    }
    ImageHandle::parse(p.file_stem()?.to_str()?).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path, seal: Option<SealKey>) -> ImageStore {
        ImageStore::open(StoragePaths::new(dir), seal).unwrap()
    }

    #[test]
    fn handle_rejects_path_tricks() {
        let long = "a".repeat(65);
        for bad in ["", "../x", "a/b", "a.b", "x y", long.as_str()] {
            assert!(ImageHandle::parse(bad).is_err(), "{bad:?}");
        }
        assert!(ImageHandle::parse(&ImageHandle::generate().to_string()).is_ok());
    }

    #[test]
    fn generated_handles_are_unique() {
        assert_ne!(ImageHandle::generate(), ImageHandle::generate());
    }

    #[test]
    fn save_load_plain() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(dir.path(), None);
        let h = ImageHandle::generate();
        s.save(b"\xff\xd8jpeg", &h).unwrap();
        assert_eq!(s.load(&h).unwrap().unwrap(), b"\xff\xd8jpeg");
        let on_disk = fs::read(dir.path().join(format!("{h}.jpg"))).unwrap();
        assert_eq!(on_disk, b"\xff\xd8jpeg");
    }

    #[test]
    fn missing_image_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(dir.path(), None);
        assert!(s.load(&ImageHandle::generate()).unwrap().is_none());
        assert!(!s.remove(&ImageHandle::generate()).unwrap());
    }

    #[test]
    fn sealed_files_need_the_key() {
        let dir = tempfile::tempdir().unwrap();
        let sealed = store(dir.path(), Some(SealKey([3u8; 32])));
        let h = ImageHandle::generate();
        sealed.save(b"photo", &h).unwrap();

        let raw = fs::read(dir.path().join(format!("{h}.jpg"))).unwrap();
        assert!(raw.starts_with(SEAL_MAGIC));
        assert_eq!(sealed.load(&h).unwrap().unwrap(), b"photo");

        let plain = store(dir.path(), None);
        assert!(matches!(plain.load(&h), Err(BoxSortError::Crypto(_))));
        assert!(plain.load_or_none(&h).is_none());
    }

    #[test]
    fn removing_one_handle_leaves_others() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(dir.path(), None);
        let a = ImageHandle::generate();
        let b = ImageHandle::generate();
        s.save(b"a", &a).unwrap();
        s.save(b"b", &b).unwrap();
        fs::write(dir.path().join("boxes.cbor"), b"not an image").unwrap();

        assert!(s.remove(&a).unwrap());
        assert_eq!(s.handles().unwrap(), vec![b.clone()]);
        assert_eq!(s.load(&b).unwrap().unwrap(), b"b");
    }
}
