//! The document surface the routine works against.
//!
//! A [`Page`] is owned by the host (a live browser tab or a parsed snapshot).
//! The routine only queries it and mutates inline styles of the nodes it
//! hands out.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised at the page boundary
#[derive(Debug, Error)]
pub enum PageError {
    /// The selector could not be parsed by the page's selector engine
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
    /// The node is no longer attached to the document
    #[error("element is no longer attached to the document")]
    Detached,
    /// A script evaluated in the page returned something unexpected
    #[error("page script failed: {0}")]
    Script(String),
    /// The WebDriver session failed
    #[error("WebDriver command failed: {0}")]
    Driver(String),
}

impl PageError {
    pub fn invalid_selector(selector: &str, reason: impl fmt::Display) -> Self {
        PageError::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Short description of a node, used in reports and near-miss hints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    /// Lowercase tag name
    pub tag: String,
    /// Value of the class attribute (empty when absent)
    pub class_name: String,
    /// Leading text content, trimmed
    pub text: String,
}

/// Number of text characters kept in a [`NodeSummary`]
pub const SUMMARY_TEXT_CHARS: usize = 50;

impl NodeSummary {
    pub fn new(tag: &str, class_name: &str, text: &str) -> Self {
        let text: String = text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .take(SUMMARY_TEXT_CHARS)
            .collect();
        NodeSummary {
            tag: tag.to_lowercase(),
            class_name: class_name.to_string(),
            text,
        }
    }
}

/// A document that can be searched and restyled
///
/// Every method is a single round trip for remote implementations, so the
/// locator and applicator keep their calls coarse.
#[allow(async_fn_in_trait)]
pub trait Page {
    /// Handle to a node in the document; equal handles refer to the same node
    type Node: Clone + Eq + Hash + fmt::Debug;

    /// All elements matching a CSS selector, in document order
    async fn select_all(&self, selector: &str) -> Result<Vec<Self::Node>, PageError>;

    /// Deepest elements whose text content contains one of `markers`
    ///
    /// An element is reported only when none of its element children also
    /// contains a marker, so wrappers such as `<body>` never appear.
    async fn text_hits(&self, markers: &[String]) -> Result<Vec<Self::Node>, PageError>;

    /// Nearest ancestor-or-self element with the given tag name
    async fn enclosing(&self, node: &Self::Node, tag: &str)
    -> Result<Option<Self::Node>, PageError>;

    /// Remove every style element with `id`, then append one carrying `css`
    async fn replace_style_block(&self, id: &str, css: &str) -> Result<(), PageError>;

    /// Number of style elements with `id` currently in the document
    async fn count_style_blocks(&self, id: &str) -> Result<usize, PageError>;

    /// Set one inline style property on a node
    async fn set_style(
        &self,
        node: &Self::Node,
        property: &str,
        value: &str,
        important: bool,
    ) -> Result<(), PageError>;

    /// Inline (specified) value of a property, if set
    async fn inline_style(
        &self,
        node: &Self::Node,
        property: &str,
    ) -> Result<Option<String>, PageError>;

    /// Resolved value of a property; `Err(PageError::Detached)` for stale nodes
    async fn computed_style(&self, node: &Self::Node, property: &str)
    -> Result<String, PageError>;

    /// Tag, class and text of a node
    async fn describe(&self, node: &Self::Node) -> Result<NodeSummary, PageError>;
}

#[cfg(test)]
#[path = "page_test.rs"]
mod page_test;
