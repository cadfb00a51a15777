pub mod handlers;

use crate::presentation::cli::{Cli, Commands, ItemCommands};
use boxsort_core::error::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let params = handlers::params_from_args(
        cli.data_dir,
        cli.key_hex,
        cli.passphrase,
        cli.key_salt_hex,
    )?;
    let mut lib = handlers::open_library(&params)?;

    let result = match cli.command {
        Commands::Add { name, items } => handlers::handle_add(&mut lib, name, items),
        Commands::Ls { search, long } => handlers::handle_ls(&lib, search, long),
        Commands::Show { target } => handlers::handle_show(&lib, &target),
        Commands::Rename { target, name } => handlers::handle_rename(&mut lib, &target, &name),
        Commands::Rm { target } => handlers::handle_rm(&mut lib, &target),
        Commands::Mv { from, to } => handlers::handle_mv(&mut lib, from, to),
        Commands::Item(cmd) => match cmd {
            ItemCommands::Add {
                target,
                name,
                description,
                photo,
            } => handlers::handle_item_add(&mut lib, &target, name, description, photo),
            ItemCommands::Rm { target, index } => {
                handlers::handle_item_rm(&mut lib, &target, index)
            }
            ItemCommands::Mv { target, from, to } => {
                handlers::handle_item_mv(&mut lib, &target, from, to)
            }
            ItemCommands::Describe {
                target,
                index,
                description,
            } => handlers::handle_item_describe(&mut lib, &target, index, &description),
            ItemCommands::Photo {
                target,
                index,
                file,
            } => handlers::handle_item_photo(&mut lib, &target, index, file),
            ItemCommands::ClearPhoto { target, index } => {
                handlers::handle_item_clear_photo(&mut lib, &target, index)
            }
            ItemCommands::GetPhoto { target, index, out } => {
                handlers::handle_item_get_photo(&lib, &target, index, out)
            }
        },
        Commands::Open { uri } => handlers::handle_open(&lib, &uri),
        Commands::Link { target } => handlers::handle_link(&lib, &target),
        Commands::Qr { target, out } => handlers::handle_qr(&lib, &target, out),
        Commands::Gc => handlers::handle_gc(&mut lib),
    };

    // Flush even when the command failed; a failed write may have left the
    // collection dirty.
    let closed = lib.close();
    result.and(closed)
}
