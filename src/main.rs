mod backup;
mod cli;
mod config;
mod imap;
mod logging;
mod mbox;
mod report;
mod restore;
mod retry;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::error;

/// Backs up an IMAP mailbox into single mail files, an mbox archive and a zip file, and
/// restores it from the archive.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file instead of `$XDG_CONFIG_HOME/imapbackup/config.toml`
    #[arg(long)]
    config: Option<PathBuf>,
    /// Mail account to log in with, asked for on stdin when neither given here nor configured
    #[arg(long)]
    user: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download every message of the mailbox
    Backup,
    /// Upload every message of an mbox archive into the mailbox
    Restore {
        /// Archive to upload, defaults to the archive written by `backup`
        #[arg(long)]
        archive: Option<PathBuf>,
    },
}

fn main() {
    let args = Args::parse();
    logging::init();

    if let Err(e) = cli::run(&args) {
        error!("{e:#}");
    }
}
