#![forbid(unsafe_code)]

pub mod error;

pub mod util {
    pub mod fsio;
}

pub mod crypto {
    pub mod aead;
    pub mod hex;
    pub mod kdf;
}

pub mod config;
pub mod domain;
pub mod validate;

pub mod codec;
pub mod collection;

pub mod repo;
pub mod repo_factory;
pub mod repo_fs;
pub mod repo_mem;

pub mod images;
pub mod link;
pub mod qr;
pub mod search;

pub mod library;

// Re-exports: stable API surface
pub use config::OpenParams;
pub use domain::{BoxDraft, Item, ItemDraft, StorageBox};
pub use error::{BoxSortError, Result};
pub use images::{ImageHandle, ImageStore};
pub use library::Library;
pub use link::{MalformedLink, Resolution, parse_box_link, resolve, resolve_box};
pub use qr::{encode_deep_link, render_qr_png};
pub use repo::{BoxRepo, LoadStatus};
