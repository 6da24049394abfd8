//! Subcommand implementations

pub mod parse;
pub mod remind;
pub mod serve;

use std::path::Path;

use healthlog_core::logging_facility::init;

use crate::config::Config;

/// Load config and start logging; shared by the commands that touch the store
fn bootstrap(config_path: Option<&Path>) -> anyhow::Result<Config> {
    let config = Config::load(config_path)?;
    init(config.log.profile()?);
    Ok(config)
}

