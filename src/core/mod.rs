//! Core functionality for plugman.
//!
//! Holds the configuration shared by the command surface and the plugin
//! lifecycle.

mod config;

pub use config::{Config, InstallerConfig, PluginsConfig, LOCAL_CONFIG_FILE};
