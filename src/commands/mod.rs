pub mod audit;
pub mod output;
pub mod run;
pub mod strategies;
pub mod version;

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::config::{ConfigOverrides, RunConfig};
use crate::types::OutputFormat;

/// Options shared by every command that performs or describes a run
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Config file (defaults to ~/.cardpulse/config.json when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// How long to wait for cards, in milliseconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Delay between searches, in milliseconds
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Pause between applying and verifying, in milliseconds
    #[arg(long)]
    pub settle: Option<u64>,

    /// Text that marks a card (repeatable; replaces the default markers)
    #[arg(long = "marker")]
    pub markers: Vec<String>,

    /// Presence attribute to look for instead of data-ps-start-needed
    #[arg(long)]
    pub attribute: Option<String>,

    /// Limit selector strategies to [data-ps-scope="VALUE"]
    #[arg(long)]
    pub scope: Option<String>,

    /// Tag that text matches are lifted to
    #[arg(long)]
    pub container: Option<String>,

    /// Skip clearing and reassigning the animation
    #[arg(long)]
    pub no_restart: bool,

    /// Output format
    #[arg(short, long, default_value = "json")]
    pub format: OutputFormat,
}

impl RunArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            timeout_ms: self.timeout,
            poll_interval_ms: self.poll_interval,
            settle_ms: self.settle,
            markers: self.markers.clone(),
            attribute: self.attribute.clone(),
            scope: self.scope.clone(),
            container_tag: self.container.clone(),
            no_restart: self.no_restart,
        }
    }

    /// Config file (or defaults) with the flags applied on top
    pub fn load_config(&self) -> Result<RunConfig> {
        RunConfig::load(self.config.as_deref())?.with_overrides(self.overrides())
    }
}

#[cfg(test)]
#[path = "../commands_test.rs"]
mod commands_test;
