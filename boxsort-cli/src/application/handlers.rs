use std::path::PathBuf;

use boxsort_core::crypto::aead::SealKey;
use boxsort_core::crypto::hex::parse_hex_array;
use boxsort_core::crypto::kdf::derive_key;
use boxsort_core::error::{BoxSortError, Result};
use boxsort_core::qr::{render_qr_png, render_qr_text};
use boxsort_core::{BoxDraft, ItemDraft, Library, LoadStatus, OpenParams, Resolution, StorageBox};
use tracing::debug;
use uuid::Uuid;

pub fn params_from_args(
    data_dir: PathBuf,
    key_hex: Option<String>,
    passphrase: Option<String>,
    key_salt_hex: Option<String>,
) -> Result<OpenParams> {
    let key_salt = key_salt_hex
        .map(|h| parse_hex_array::<32>(&h))
        .transpose()?
        .unwrap_or([0u8; 32]);
    let seal = match (key_hex, passphrase) {
        (Some(hex), _) => Some(SealKey(parse_hex_array::<32>(&hex)?)),
        (None, Some(p)) => Some(derive_key(&p, &key_salt)?),
        (None, None) => None,
    };
    let params = OpenParams::new(data_dir);
    Ok(match seal {
        Some(k) => params.sealed(k),
        None => params,
    })
}

pub fn open_library(params: &OpenParams) -> Result<Library> {
    debug!(data_dir = %params.data_dir.display(), sealed = params.seal_key.is_some(), "opening library");
    let (lib, status) = Library::open(params)?;
    match &status {
        LoadStatus::Migrated { from, boxes } => {
            eprintln!("upgraded {boxes} boxes from schema v{from}");
        }
        LoadStatus::Recovered { reason, backup } => {
            eprintln!("warning: stored boxes were unreadable ({reason}); starting empty");
            if let Some(b) = backup {
                eprintln!("warning: the unreadable file was kept at {}", b.display());
            }
        }
        LoadStatus::Fresh | LoadStatus::Loaded { .. } => {}
    }
    Ok(lib)
}

/// A box is addressed by its id or by its position in the list.
pub fn box_id(lib: &Library, target: &str) -> Result<Uuid> {
    if let Ok(index) = target.parse::<usize>() {
        return lib
            .boxes()
            .get(index)
            .map(|b| b.id)
            .ok_or(BoxSortError::IndexOutOfRange {
                index,
                len: lib.boxes().len(),
            });
    }
    lib.find(target)
        .map(|b| b.id)
        .ok_or_else(|| BoxSortError::NotFound(target.to_string()))
}

fn print_box(b: &StorageBox) {
    println!("{}  {}", b.name, b.id);
    for (i, item) in b.items.iter().enumerate() {
        let photo = if item.has_image() { "  [photo]" } else { "" };
        if item.description.is_empty() {
            println!("  {i:>3}. {}{photo}", item.name);
        } else {
            println!("  {i:>3}. {} - {}{photo}", item.name, item.description);
        }
    }
}

pub fn handle_add(lib: &mut Library, name: String, items: Vec<String>) -> Result<()> {
    let draft = BoxDraft {
        name,
        items: items.into_iter().map(ItemDraft::named).collect(),
    };
    let id = lib.add_box(draft)?;
    eprintln!("add: {id}");
    Ok(())
}

pub fn handle_ls(lib: &Library, search: Option<String>, long: bool) -> Result<()> {
    let hits = lib.search(search.as_deref().unwrap_or(""));
    for h in hits {
        let b = &lib.boxes()[h.index];
        if long {
            println!("{:>3}  {}  {:>3} items  {}", h.index, b.id, b.items.len(), b.name);
        } else if h.matches > 0 {
            println!("{:>3}  {}  ({} matches)", h.index, b.name, h.matches);
        } else {
            println!("{:>3}  {}", h.index, b.name);
        }
    }
    Ok(())
}

pub fn handle_show(lib: &Library, target: &str) -> Result<()> {
    let id = box_id(lib, target)?;
    if let Some(b) = lib.find(&id.to_string()) {
        print_box(b);
    }
    Ok(())
}

pub fn handle_rename(lib: &mut Library, target: &str, name: &str) -> Result<()> {
    let id = box_id(lib, target)?;
    lib.rename_box(id, name)?;
    eprintln!("rename: {id} -> {name}");
    Ok(())
}

pub fn handle_rm(lib: &mut Library, target: &str) -> Result<()> {
    let id = box_id(lib, target)?;
    let removed = lib.remove_box(id)?;
    eprintln!("rm: {} ({})", removed.name, removed.id);
    Ok(())
}

pub fn handle_mv(lib: &mut Library, from: usize, to: usize) -> Result<()> {
    lib.reorder_boxes(from, to)?;
    eprintln!("mv: {from} -> {to}");
    Ok(())
}

pub fn handle_item_add(
    lib: &mut Library,
    target: &str,
    name: String,
    description: String,
    photo: Option<PathBuf>,
) -> Result<()> {
    let id = box_id(lib, target)?;
    // Read the photo first so a bad path adds nothing.
    let bytes = photo.map(std::fs::read).transpose()?;
    lib.add_item(id, ItemDraft::named(name).with_description(description))?;
    if let Some(bytes) = bytes {
        let index = lib.find(&id.to_string()).map_or(0, |b| b.items.len() - 1);
        lib.set_item_image(id, index, &bytes)?;
    }
    Ok(())
}

pub fn handle_item_rm(lib: &mut Library, target: &str, index: usize) -> Result<()> {
    let id = box_id(lib, target)?;
    let item = lib.remove_item(id, index)?;
    eprintln!("item rm: {}", item.name);
    Ok(())
}

pub fn handle_item_mv(lib: &mut Library, target: &str, from: usize, to: usize) -> Result<()> {
    let id = box_id(lib, target)?;
    lib.move_item(id, from, to)
}

pub fn handle_item_describe(
    lib: &mut Library,
    target: &str,
    index: usize,
    description: &str,
) -> Result<()> {
    let id = box_id(lib, target)?;
    lib.describe_item(id, index, description)
}

pub fn handle_item_photo(lib: &mut Library, target: &str, index: usize, file: PathBuf) -> Result<()> {
    let id = box_id(lib, target)?;
    let bytes = std::fs::read(&file)?;
    let handle = lib.set_item_image(id, index, &bytes)?;
    eprintln!("photo: {} -> {handle}", file.display());
    Ok(())
}

pub fn handle_item_clear_photo(lib: &mut Library, target: &str, index: usize) -> Result<()> {
    let id = box_id(lib, target)?;
    lib.clear_item_image(id, index)
}

pub fn handle_item_get_photo(lib: &Library, target: &str, index: usize, out: PathBuf) -> Result<()> {
    let id = box_id(lib, target)?;
    match lib.item_image(id, index)? {
        Some(bytes) => {
            std::fs::write(&out, bytes)?;
            eprintln!("photo: written to {}", out.display());
        }
        None => eprintln!("photo: item has no photo"),
    }
    Ok(())
}

pub fn handle_open(lib: &Library, uri: &str) -> Result<()> {
    match lib.resolve(uri) {
        Resolution::Found(b) => print_box(b),
        Resolution::NotFound { uuid } => {
            eprintln!("Missing Box: {uuid} does not exist or has been deleted.");
        }
        Resolution::Malformed(reason) => {
            eprintln!("Not a box link ({reason}).");
        }
    }
    Ok(())
}

pub fn handle_link(lib: &Library, target: &str) -> Result<()> {
    let id = box_id(lib, target)?;
    println!("{}", lib.deep_link(id)?);
    Ok(())
}

pub fn handle_qr(lib: &Library, target: &str, out: Option<PathBuf>) -> Result<()> {
    let id = box_id(lib, target)?;
    let link = lib.deep_link(id)?;
    match out {
        Some(path) => {
            std::fs::write(&path, render_qr_png(&link))?;
            eprintln!("qr: {} -> {}", link, path.display());
        }
        None => match render_qr_text(&link) {
            Some(text) => println!("{text}"),
            None => eprintln!("qr: could not render {link}"),
        },
    }
    Ok(())
}

pub fn handle_gc(lib: &mut Library) -> Result<()> {
    let removed = lib.sweep_orphans()?;
    eprintln!("gc: removed {} orphaned photos", removed.len());
    Ok(())
}
