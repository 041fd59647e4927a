//! Configuration inspection command.

use std::path::Path;

use console::style;

use crate::config::{config_path, Settings};

/// Print the effective configuration as TOML.
pub fn cmd_config_show(settings: &Settings, explicit: Option<&Path>) -> anyhow::Result<()> {
    match config_path(explicit) {
        Some(path) => eprintln!("{} {}", style("Config file:").bold(), path.display()),
        None => eprintln!("{}", style("No config file, using defaults").dim()),
    }

    print!("{}", toml::to_string_pretty(settings)?);
    Ok(())
}
