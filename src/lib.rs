pub mod cache;
pub mod cli;
pub mod data;
pub mod error;
pub mod frequency;
pub mod io_utils;
pub mod normalize;
pub mod preview;
pub mod rank;
pub mod rows;
pub mod schema;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("series_tidy", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Normalize(args) => normalize::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
        Commands::Genres(args) => frequency::execute(&args),
        Commands::Top(args) => rank::execute_top(&args),
        Commands::Pick(args) => rank::execute_pick(&args),
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
