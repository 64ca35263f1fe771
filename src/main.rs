//! # lnstacks
//!
//! Command-line tool applying the minus natural logarithm to normalized
//! tomography stacks.
//!
//! ## Usage
//!
//! ```bash
//! # Convert one stack; writes /data/run01_ln.hdf5
//! lnstacks /data/run01.hdf5
//!
//! # Transform frames in parallel (requires the parallel feature)
//! lnstacks --parallel /data/run01.hdf5
//!
//! # Load settings from a TOML file, with info-level logging
//! lnstacks -v --config lnstacks.toml /data/run01.hdf5
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
