use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

mod config;
mod convert;

use config::Config;

/// lnstacks - apply the minus natural logarithm to normalized stacks
///
/// Accepts an HDF5 stack (or an MRC stack, not yet supported) or a directory
/// containing stacks.
#[derive(Parser)]
#[command(name = "lnstacks")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Input stack file, or a directory containing stacks
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Transform frames in parallel (requires the parallel feature)
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Could not load settings from {}", path.display()))?,
        None => Config::default(),
    };

    if cli.input.is_file() {
        println!("Applying minus log to the given stack");
        convert::run(cli.input, &config, cli.parallel)
    } else if cli.input.is_dir() {
        println!("Applying minus log to the stacks in the given directory");
        info!(
            "Directory input {} is left to a batch driver; no stacks were converted",
            cli.input.display()
        );
        Ok(())
    } else {
        anyhow::bail!(
            "Input is neither a file nor a directory: {}",
            cli.input.display()
        )
    }
}
