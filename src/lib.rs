pub mod cli;
pub mod coerce;
pub mod data;
pub mod dataset;
pub mod dates;
pub mod derive;
pub mod error;
pub mod io_utils;
pub mod job;
pub mod normalize;
pub mod pipeline;
pub mod preview;
pub mod profile;
pub mod profile_cmd;
pub mod schema;
pub mod sink;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

pub use crate::{
    dataset::Table,
    error::CleanError,
    normalize::NormalizeMode,
    pipeline::{CleanReport, clean},
    profile::CleaningProfile,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("retail_clean", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => job::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
        Commands::Profile(args) => profile_cmd::execute(&args),
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
