//! `arkiv`: batch conversion of archival scans.
//!
//! ```text
//! arkiv convert <SOURCE> <OUTPUT>   # protocol folders -> <name>/jpgs
//! arkiv pdf <OUTPUT>                # <name>/jpgs -> <name>/<name>.pdf
//! arkiv resize <SOURCE> <OUTPUT>    # any tree of images -> flat folder of JPEGs
//! arkiv collect <SOURCE> <OUTPUT>   # copy <name>/jpgs folders to another tree
//! arkiv audit <OUTPUT>              # list jpgs folders that don't look finished
//! ```

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    logging::init(cli.verbose, cli.quiet);
    match commands::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", *err);
            eprintln!("{err:?}");
            ExitCode::FAILURE
        },
    }
}
