//! Read computed style back and say whether the animation runs

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::page::{NodeSummary, Page, PageError};

/// What the computed style showed for one card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// The expected animation name is in `animation-name`
    Running,
    /// The computed `animation-name` lacks it
    Missing { observed: String },
    /// The card is no longer in the document
    Detached,
}

impl Verdict {
    pub fn is_running(&self) -> bool {
        matches!(self, Verdict::Running)
    }
}

/// Per-card line of the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardReport {
    /// 1-based position in the located set
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<NodeSummary>,
    pub verdict: Verdict,
}

/// Whether `computed` names `expected` as one of its animations
pub fn names_animation(computed: &str, expected: &str) -> bool {
    computed.split(',').any(|name| name.trim() == expected)
}

/// Check each card's computed `animation-name` for `expected`
///
/// Only reports; nothing is retried.
pub async fn verify<P: Page>(
    page: &P,
    nodes: &[P::Node],
    expected: &str,
) -> Result<Vec<CardReport>, PageError> {
    let mut reports = Vec::with_capacity(nodes.len());

    for (i, node) in nodes.iter().enumerate() {
        let index = i + 1;
        let verdict = match page.computed_style(node, "animation-name").await {
            Ok(computed) if names_animation(&computed, expected) => {
                info!("Card {}: animation running", index);
                Verdict::Running
            }
            Ok(computed) => {
                warn!(
                    "Card {}: animation not observed (animation-name: {}); another rule may override it",
                    index, computed
                );
                Verdict::Missing { observed: computed }
            }
            Err(PageError::Detached) => {
                warn!("Card {}: no longer attached to the document", index);
                Verdict::Detached
            }
            Err(e) => return Err(e),
        };

        let element = match verdict {
            Verdict::Detached => None,
            _ => match page.describe(node).await {
                Ok(summary) => Some(summary),
                Err(PageError::Detached) => None,
                Err(e) => return Err(e),
            },
        };

        reports.push(CardReport {
            index,
            element,
            verdict,
        });
    }

    Ok(reports)
}

#[cfg(test)]
#[path = "reporter_test.rs"]
mod reporter_test;
