//! Element locator: run the strategy cascade and return the first hit

use std::collections::HashSet;
use std::hash::Hash;

use tracing::{debug, warn};

use crate::page::{NodeSummary, Page, PageError};
use crate::strategy::{MatchStrategy, StrategyKind, StrategyList};

/// Maximum number of near-miss hints reported when nothing matched
pub const MAX_HINTS: usize = 10;

/// Class fragments that suggest a card when the real strategies miss
const HINT_CLASS_FRAGMENTS: &[&str] = &["start", "needed", "card"];

/// Locator settings that do not belong to a single strategy
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    pub strategies: StrategyList,
    /// Restricts selector strategies to `[data-ps-scope="<scope>"]`
    pub scope: Option<String>,
    /// Tag of the container a text hit is lifted to
    pub container_tag: String,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        LocatorConfig {
            strategies: StrategyList::canonical(),
            scope: None,
            container_tag: "div".to_string(),
        }
    }
}

/// Elements found by one strategy
#[derive(Debug, Clone)]
pub struct Located<N> {
    pub strategy: MatchStrategy,
    pub elements: Vec<N>,
}

/// Keep the first occurrence of every element
pub fn dedup_preserving_order<N: Clone + Eq + Hash>(nodes: Vec<N>) -> Vec<N> {
    let mut seen = HashSet::new();
    nodes
        .into_iter()
        .filter(|n| seen.insert(n.clone()))
        .collect()
}

/// Run one strategy; an empty vector means no match
pub async fn run_strategy<P: Page>(
    page: &P,
    strategy: &MatchStrategy,
    config: &LocatorConfig,
) -> Result<Vec<P::Node>, PageError> {
    let found = match &strategy.kind {
        StrategyKind::TextScan { markers } => {
            let hits = page.text_hits(markers).await?;
            let mut containers = Vec::with_capacity(hits.len());
            for hit in hits {
                match page.enclosing(&hit, &config.container_tag).await {
                    Ok(container) => containers.push(container.unwrap_or(hit)),
                    // Re-rendered between the scan and the walk up
                    Err(PageError::Detached) => continue,
                    Err(e) => return Err(e),
                }
            }
            containers
        }
        _ => {
            // Only text scans lack a selector
            let Some(selector) = strategy.selector(config.scope.as_deref()) else {
                return Ok(Vec::new());
            };
            page.select_all(&selector).await?
        }
    };

    Ok(dedup_preserving_order(found))
}

/// Evaluate strategies in rank order and return the first non-empty result
///
/// Invalid selectors only skip their own strategy. `Ok(None)` means nothing
/// matched, which is a normal outcome.
pub async fn locate<P: Page>(
    page: &P,
    config: &LocatorConfig,
) -> Result<Option<Located<P::Node>>, PageError> {
    for strategy in config.strategies.iter() {
        match run_strategy(page, strategy, config).await {
            Ok(elements) if !elements.is_empty() => {
                debug!("{} matched {} element(s)", strategy, elements.len());
                return Ok(Some(Located {
                    strategy: strategy.clone(),
                    elements,
                }));
            }
            Ok(_) => debug!("{} matched nothing", strategy),
            Err(PageError::InvalidSelector { selector, reason }) => {
                warn!("Skipping invalid selector {}: {}", selector, reason);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(None)
}

/// Near misses worth showing when no strategy matched
///
/// Elements carrying the presence attribute with any value come first, then
/// `div`s whose class looks card-related, then elements with marker text.
pub async fn hints<P: Page>(
    page: &P,
    config: &LocatorConfig,
) -> Result<Vec<NodeSummary>, PageError> {
    let mut candidates = Vec::new();

    if let Some(attribute) = config.strategies.presence_attribute() {
        candidates.extend(select_or_skip(page, &format!("[{}]", attribute)).await?);
    }

    let class_selector = HINT_CLASS_FRAGMENTS
        .iter()
        .map(|fragment| format!("div[class*=\"{}\"]", fragment))
        .collect::<Vec<_>>()
        .join(", ");
    candidates.extend(select_or_skip(page, &class_selector).await?);

    let markers = config.strategies.markers();
    if !markers.is_empty() {
        candidates.extend(page.text_hits(markers).await?);
    }

    let mut summaries = Vec::new();
    for node in dedup_preserving_order(candidates).into_iter().take(MAX_HINTS) {
        match page.describe(&node).await {
            Ok(summary) => summaries.push(summary),
            Err(PageError::Detached) => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(summaries)
}

async fn select_or_skip<P: Page>(page: &P, selector: &str) -> Result<Vec<P::Node>, PageError> {
    match page.select_all(selector).await {
        Err(PageError::InvalidSelector { selector, reason }) => {
            debug!("Hint selector {} rejected: {}", selector, reason);
            Ok(Vec::new())
        }
        other => other,
    }
}

#[cfg(test)]
#[path = "locator_test.rs"]
mod locator_test;
