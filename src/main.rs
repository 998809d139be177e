//! Plugman - plugin manager for git submodule plugins.
//!
//! The command line is assembled from the plugins found in the host project,
//! so the global options are read first to know where to look.

use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use plugman::{build_surface, find_host_root, Config, GlobalArgs, Status};

fn main() -> ExitCode {
    let args: Vec<_> = env::args_os().collect();
    let global = GlobalArgs::bootstrap(args.iter().cloned());

    init_logging(global.verbose);

    match run(&global, args) {
        Ok(status) => status.exit_code(),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Setup logging on stderr so command output stays clean.
///
/// `RUST_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(global: &GlobalArgs, args: Vec<std::ffi::OsString>) -> Result<Status> {
    let start_dir = match &global.root {
        Some(root) => root.clone(),
        None => env::current_dir().context("Failed to read the current directory")?,
    };

    let host_root = find_host_root(&start_dir).unwrap_or_else(|| start_dir.clone());
    tracing::debug!(
        start_dir = %start_dir.display(),
        host_root = %host_root.display(),
        "Resolved host project"
    );

    let config = Config::load(global.config.as_deref(), &host_root)?;
    let surface = build_surface(&start_dir, &host_root, &config);

    let matches = surface.build_command().get_matches_from(args);
    surface.dispatch(&matches)
}
