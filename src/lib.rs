//! # Plugman
//!
//! Plugin manager for projects whose plugins are git submodules.
//!
//! A host project declares each plugin as a submodule under `plugins/`.
//! Plugman lists the declared plugins, checks them out, installs their
//! Python dependencies, removes them again, and exposes every discovered
//! plugin as a subcommand of its own.
//!
//! ## Quick Start
//!
//! ```bash
//! # Show declared plugins and whether they are checked out
//! plugman plugin-manager list
//!
//! # Check out one plugin and install its requirements
//! plugman plugin-manager install virsh
//!
//! # Run it
//! plugman virsh --help
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::needless_pass_by_value)]

pub mod commands;
pub mod core;
pub mod git;
pub mod plugin;

// Re-export commonly used types
pub use commands::{build_surface, CommandContributor, CommandSurface, GlobalArgs, Status};
pub use core::Config;
pub use git::{find_host_root, GitRepository};
pub use plugin::{
    CommandInstaller, LifecycleManager, PackageInstaller, PluginDescriptor, PluginError,
    PluginInspector, PluginResult, SubmoduleEntry, VersionControl,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "plugman";
