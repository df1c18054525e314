//! Entry point for oalink.
//!
//! This file handles high-level application flow:
//! 1. Parse command-line arguments using `clap`.
//! 2. Initialize logging from `--log-level`.
//! 3. Validate inputs and link the library into the workspace.
//! 4. Optionally prepare the EM setup of a cell.
//!
//! Failures are reported via `anyhow` and mapped to the exit code of the
//! underlying `LinkError`.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use oalink::config::Config;
use oalink::error::LinkError;
use oalink::linker::Linker;

fn main() {
    let config = Config::parse();

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run(&config) {
        eprintln!("error: {:#}", e);
        let code = e
            .downcast_ref::<LinkError>()
            .map(LinkError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn run(config: &Config) -> Result<()> {
    let request = config.link_request()?;

    // 1. Validate inputs and resolve paths
    let linker = Linker::new(&request)?;

    // 2. Install technology file, bootstrap lib.defs, register library
    let report = linker
        .link()
        .with_context(|| format!("linking {} failed", linker.library().display()))?;

    // 3. EM setup, if a cell was named
    if let Some(em) = config.em_setup(linker.library(), linker.workspace())? {
        em.prepare()
            .with_context(|| format!("preparing EM setup for cell {} failed", em.cell))?;
    }

    if report.library_registered {
        println!(
            "Linked {} into {}",
            report.library_name,
            report.defs_path.display()
        );
    } else {
        println!(
            "{} already linked in {}",
            report.library_name,
            report.defs_path.display()
        );
    }
    Ok(())
}
