//! Match strategies for finding cards, tried in rank order

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Presence attribute set by the host renderer on cards that need a start
pub const DEFAULT_ATTRIBUTE: &str = "data-ps-start-needed";

/// Scoping attribute the host renderer puts on the widget root
pub const SCOPE_ATTRIBUTE: &str = "data-ps-scope";

pub const DEFAULT_CARD_CLASS: &str = "ps-start-needed-card";

pub const DEFAULT_CLASS_FRAGMENT: &str = "start-needed";

/// Texts rendered inside a card that needs a start
pub const DEFAULT_MARKERS: &[&str] = &["지금 시작하세요", "시작 필요"];

/// How a strategy finds candidate elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyKind {
    /// `[name]` or `[name="value"]`
    Attribute { name: String, value: Option<String> },
    /// `.class`
    Class { class: String },
    /// `[class*="fragment"]`
    SubstringClass { fragment: String },
    /// Elements whose text contains one of the markers, lifted to their container
    TextScan { markers: Vec<String> },
}

/// One entry of the search cascade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStrategy {
    #[serde(flatten)]
    pub kind: StrategyKind,
    /// Lower ranks are tried first
    pub rank: u8,
}

impl MatchStrategy {
    pub fn attribute(name: &str, value: Option<&str>, rank: u8) -> Self {
        MatchStrategy {
            kind: StrategyKind::Attribute {
                name: name.to_string(),
                value: value.map(str::to_string),
            },
            rank,
        }
    }

    pub fn class(class: &str, rank: u8) -> Self {
        MatchStrategy {
            kind: StrategyKind::Class {
                class: class.to_string(),
            },
            rank,
        }
    }

    pub fn substring_class(fragment: &str, rank: u8) -> Self {
        MatchStrategy {
            kind: StrategyKind::SubstringClass {
                fragment: fragment.to_string(),
            },
            rank,
        }
    }

    pub fn text_scan<S: AsRef<str>>(markers: &[S], rank: u8) -> Self {
        MatchStrategy {
            kind: StrategyKind::TextScan {
                markers: markers.iter().map(|m| m.as_ref().to_string()).collect(),
            },
            rank,
        }
    }

    /// CSS selector for selector-based strategies, `None` for text scans
    ///
    /// With a scope, the selector only matches inside
    /// `[data-ps-scope="<scope>"]`.
    pub fn selector(&self, scope: Option<&str>) -> Option<String> {
        let base = match &self.kind {
            StrategyKind::Attribute { name, value: None } => format!("[{}]", name),
            StrategyKind::Attribute {
                name,
                value: Some(value),
            } => format!("[{}=\"{}\"]", name, escape_quoted(value)),
            StrategyKind::Class { class } => format!(".{}", class),
            StrategyKind::SubstringClass { fragment } => {
                format!("[class*=\"{}\"]", escape_quoted(fragment))
            }
            StrategyKind::TextScan { .. } => return None,
        };

        Some(match scope {
            Some(scope) => format!(
                "[{}=\"{}\"] {}",
                SCOPE_ATTRIBUTE,
                escape_quoted(scope),
                base
            ),
            None => base,
        })
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StrategyKind::TextScan { markers } => {
                write!(f, "text scan for {}", markers.join(" | "))
            }
            _ => match self.selector(None) {
                Some(selector) => write!(f, "selector {}", selector),
                None => Ok(()),
            },
        }
    }
}

fn escape_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Strategies ordered by rank; ties keep insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StrategyList(Vec<MatchStrategy>);

impl StrategyList {
    pub fn new(mut strategies: Vec<MatchStrategy>) -> Self {
        strategies.sort_by_key(|s| s.rank);
        StrategyList(strategies)
    }

    /// Canonical cascade: presence attribute, card class, class fragment, text
    pub fn canonical() -> Self {
        StrategyList::new(vec![
            MatchStrategy::attribute(DEFAULT_ATTRIBUTE, Some("true"), 0),
            MatchStrategy::class(DEFAULT_CARD_CLASS, 1),
            MatchStrategy::substring_class(DEFAULT_CLASS_FRAGMENT, 2),
            MatchStrategy::text_scan(DEFAULT_MARKERS, 3),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchStrategy> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Presence attribute of the first attribute strategy, used for hints
    pub fn presence_attribute(&self) -> Option<&str> {
        self.0.iter().find_map(|s| match &s.kind {
            StrategyKind::Attribute { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }

    /// Markers of the first text scan, used for hints
    pub fn markers(&self) -> &[String] {
        self.0
            .iter()
            .find_map(|s| match &s.kind {
                StrategyKind::TextScan { markers } => Some(markers.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }
}

impl<'de> Deserialize<'de> for StrategyList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<MatchStrategy>::deserialize(deserializer).map(StrategyList::new)
    }
}

impl Default for StrategyList {
    fn default() -> Self {
        StrategyList::canonical()
    }
}

#[cfg(test)]
#[path = "strategy_test.rs"]
mod strategy_test;
