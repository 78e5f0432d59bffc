//! Run configuration: JSON file, defaults and command-line overrides

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::applicator::{Applicator, DEFAULT_RESTART_DELAY_MS};
use crate::keyframes::AnimationSpec;
use crate::locator::LocatorConfig;
use crate::strategy::{MatchStrategy, StrategyKind, StrategyList};
use crate::wait::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS, WaitConfig};

/// Pause between applying and reading computed style back
pub const DEFAULT_SETTLE_MS: u64 = 500;

/// Everything one run needs; every field has a default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Maximum time to wait for cards, in milliseconds
    pub timeout_ms: u64,
    /// Delay between searches, in milliseconds
    pub poll_interval_ms: u64,
    /// Clear and reassign the animation after applying it
    pub restart: bool,
    pub restart_delay_ms: u64,
    /// Wait before verification, in milliseconds
    pub settle_ms: u64,
    /// Value of `data-ps-scope` selector strategies are limited to
    pub scope: Option<String>,
    /// Tag text hits are lifted to
    pub container_tag: String,
    pub strategies: StrategyList,
    pub animation: AnimationSpec,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            restart: true,
            restart_delay_ms: DEFAULT_RESTART_DELAY_MS,
            settle_ms: DEFAULT_SETTLE_MS,
            scope: None,
            container_tag: "div".to_string(),
            strategies: StrategyList::canonical(),
            animation: AnimationSpec::default(),
        }
    }
}

/// Values given on the command line; `None`/empty leaves the config alone
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub timeout_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub settle_ms: Option<u64>,
    /// Replaces the markers of every text scan
    pub markers: Vec<String>,
    /// Replaces the attribute name of every attribute strategy
    pub attribute: Option<String>,
    pub scope: Option<String>,
    pub container_tag: Option<String>,
    pub no_restart: bool,
}

/// `~/.cardpulse/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".cardpulse").join("config.json"))
}

impl RunConfig {
    /// Load from `path`, or from the default location when it exists
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file just means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => {
                    debug!("No config file, using defaults");
                    return Ok(RunConfig::default());
                }
            },
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Invalid configuration: cannot read {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: RunConfig = serde_json::from_str(text).context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            anyhow::bail!("Invalid configuration: poll_interval_ms must be greater than 0");
        }
        if self.strategies.is_empty() {
            anyhow::bail!("Invalid configuration: at least one strategy is required");
        }
        if self.container_tag.trim().is_empty() {
            anyhow::bail!("Invalid configuration: container_tag must not be empty");
        }
        for strategy in self.strategies.iter() {
            if let StrategyKind::TextScan { markers } = &strategy.kind {
                if markers.is_empty() {
                    anyhow::bail!("Invalid configuration: a text scan needs at least one marker");
                }
                if markers.iter().any(|m| m.trim().is_empty()) {
                    anyhow::bail!("Invalid configuration: text scan markers must not be empty");
                }
            }
        }
        Ok(())
    }

    /// Apply command-line values on top of this configuration
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(timeout) = overrides.timeout_ms {
            self.timeout_ms = timeout;
        }
        if let Some(poll) = overrides.poll_interval_ms {
            self.poll_interval_ms = poll;
        }
        if let Some(settle) = overrides.settle_ms {
            self.settle_ms = settle;
        }
        if overrides.scope.is_some() {
            self.scope = overrides.scope;
        }
        if let Some(tag) = overrides.container_tag {
            self.container_tag = tag;
        }
        if overrides.no_restart {
            self.restart = false;
        }

        if overrides.attribute.is_some() || !overrides.markers.is_empty() {
            let mut strategies: Vec<MatchStrategy> = self.strategies.iter().cloned().collect();
            let mut has_text_scan = false;

            for strategy in &mut strategies {
                match &mut strategy.kind {
                    StrategyKind::Attribute { name, .. } => {
                        if let Some(attribute) = &overrides.attribute {
                            *name = attribute.clone();
                        }
                    }
                    StrategyKind::TextScan { markers } => {
                        has_text_scan = true;
                        if !overrides.markers.is_empty() {
                            *markers = overrides.markers.clone();
                        }
                    }
                    _ => {}
                }
            }

            if !has_text_scan && !overrides.markers.is_empty() {
                let rank = strategies
                    .iter()
                    .map(|s| s.rank)
                    .max()
                    .map_or(0, |r| r.saturating_add(1));
                strategies.push(MatchStrategy::text_scan(&overrides.markers, rank));
            }
            self.strategies = StrategyList::new(strategies);
        }

        self.validate()?;
        Ok(self)
    }

    pub fn wait_config(&self) -> WaitConfig {
        WaitConfig {
            timeout: Duration::from_millis(self.timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn locator_config(&self) -> LocatorConfig {
        LocatorConfig {
            strategies: self.strategies.clone(),
            scope: self.scope.clone(),
            container_tag: self.container_tag.clone(),
        }
    }

    pub fn applicator(&self) -> Applicator {
        let restart = self
            .restart
            .then(|| Duration::from_millis(self.restart_delay_ms));
        Applicator::new(self.animation.clone()).with_restart(restart)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
