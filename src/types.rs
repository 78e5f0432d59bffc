use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::page::NodeSummary;
use crate::reporter::CardReport;
use crate::strategy::MatchStrategy;

/// Output format for CLI results
#[derive(Clone, Copy, Debug, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON format for programmatic consumption
    Json,
    /// Human-readable simple format
    Simple,
}

/// Browser viewport dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportSize {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
}

impl ViewportSize {
    /// Parse viewport size from "WIDTHxHEIGHT" format (e.g., "1920x1080")
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid viewport format. Use WIDTHxHEIGHT (e.g., 1920x1080)");
        }

        let width = parts[0]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid width in viewport size"))?;
        let height = parts[1]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid height in viewport size"))?;

        Ok(ViewportSize { width, height })
    }
}

/// Phase of the one-shot routine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Searching,
    Found,
    TimedOut,
    Applying,
    Verifying,
    Done,
}

/// Overall result of a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every card shows the animation
    Animated,
    /// Some cards show the animation, others do not
    PartiallyAnimated,
    /// Cards were found and styled but none shows the animation
    NotObserved,
    /// No strategy matched before the timeout
    NotFound,
}

/// The strategy that found the cards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedBy {
    #[serde(flatten)]
    pub strategy: MatchStrategy,
    /// Human-readable form, e.g. `selector .ps-start-needed-card`
    pub description: String,
}

/// Everything a run found, did and observed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub outcome: Outcome,
    /// Page URL or snapshot path
    pub target: String,
    pub checked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_by: Option<MatchedBy>,
    /// Style blocks carrying the keyframe id after injection
    pub style_blocks: usize,
    pub waited_ms: u64,
    pub probes: u32,
    /// Cards that received the bundle
    pub applied: usize,
    pub cards: Vec<CardReport>,
    /// Near misses, only when nothing was found
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub hints: Vec<NodeSummary>,
}

impl RunReport {
    pub fn running_count(&self) -> usize {
        self.cards.iter().filter(|c| c.verdict.is_running()).count()
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
