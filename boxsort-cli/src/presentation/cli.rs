use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "boxsort: which box is it in?", long_about = None)]
pub struct Cli {
    /// Private storage directory holding boxes.cbor and photos
    #[arg(long, global = true, default_value = "boxsort-data")]
    pub data_dir: PathBuf,

    /// 32-byte hex key to seal photos at rest (XChaCha20-Poly1305)
    #[arg(long = "key", global = true, conflicts_with = "passphrase")]
    pub key_hex: Option<String>,

    /// Passphrase to seal photos at rest; stretched with Argon2id
    #[arg(long, global = true)]
    pub passphrase: Option<String>,

    /// 32-byte hex salt for the passphrase (defaults to all-zero)
    #[arg(long = "key-salt", global = true)]
    pub key_salt_hex: Option<String>,

    /// tracing filter, e.g. "info" or "boxsort_core=debug"
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Append an item to a box
    Add {
        /// box id or position
        target: String,
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// photo file to attach
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Remove the item at INDEX (and its photo)
    Rm { target: String, index: usize },
    /// Move an item within its box
    Mv {
        target: String,
        from: usize,
        to: usize,
    },
    /// Replace an item's description
    Describe {
        target: String,
        index: usize,
        description: String,
    },
    /// Attach or replace an item's photo
    Photo {
        target: String,
        index: usize,
        file: PathBuf,
    },
    /// Remove an item's photo
    ClearPhoto { target: String, index: usize },
    /// Write an item's photo to a file
    GetPhoto {
        target: String,
        index: usize,
        out: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a box; it becomes the first in the list
    Add {
        name: String,
        /// item names, repeatable
        #[arg(long = "item")]
        items: Vec<String>,
    },

    /// List boxes
    Ls {
        /// only boxes with an item whose name contains this text
        #[arg(long)]
        search: Option<String>,
        /// show ids and item counts
        #[arg(long)]
        long: bool,
    },

    /// Print one box with its items
    Show { target: String },

    /// Rename a box
    Rename { target: String, name: String },

    /// Delete a box and its photos
    Rm { target: String },

    /// Move a box from one position to another
    Mv { from: usize, to: usize },

    #[command(subcommand)]
    /// Item commands
    Item(ItemCommands),

    /// Open a boxsort:// deep link
    Open { uri: String },

    /// Print the deep link for a box
    Link { target: String },

    /// Render a box's QR code (PNG with --out, else to the terminal)
    Qr {
        target: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Delete photos no item refers to
    Gc,
}
