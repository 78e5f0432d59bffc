//! Offline page backed by a parsed HTML snapshot
//!
//! Models the parts of a browser the routine touches: CSS selection, text
//! content, inline style declarations (with the CSSOM rule that setting the
//! `animation` shorthand resets its longhands), author rules, injected style
//! blocks and a small cascade for computed values.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::page::{NodeSummary, Page, PageError};

/// Elements whose text never counts as rendered content
const NON_RENDERED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

#[derive(Debug, Clone, PartialEq)]
struct Declaration {
    property: String,
    value: String,
    important: bool,
}

/// Ordered inline declarations of one element
#[derive(Debug, Clone, Default)]
struct InlineStyle(Vec<Declaration>);

impl InlineStyle {
    fn parse(attr: &str) -> Self {
        let declarations = attr
            .split(';')
            .filter_map(|chunk| {
                let (property, value) = chunk.split_once(':')?;
                let property = property.trim().to_lowercase();
                let value = value.trim();
                if property.is_empty() || value.is_empty() {
                    return None;
                }
                let (value, important) = match value.strip_suffix("!important") {
                    Some(rest) => (rest.trim_end(), true),
                    None => (value, false),
                };
                Some(Declaration {
                    property,
                    value: value.to_string(),
                    important,
                })
            })
            .collect();
        InlineStyle(declarations)
    }

    fn set(&mut self, property: &str, value: &str, important: bool) {
        if property == "animation" {
            self.0.retain(|d| !d.property.starts_with("animation-"));
        }
        let declaration = Declaration {
            property: property.to_string(),
            value: value.to_string(),
            important,
        };
        match self.0.iter_mut().find(|d| d.property == property) {
            Some(existing) => *existing = declaration,
            None => self.0.push(declaration),
        }
    }

    fn get(&self, property: &str) -> Option<&Declaration> {
        self.0.iter().find(|d| d.property == property)
    }
}

/// Value a declaration list gives `property` at one importance level
fn declared(declarations: &[&Declaration], property: &str, important: bool) -> Option<String> {
    let at_level = |name: &str| {
        declarations
            .iter()
            .rev()
            .find(|d| d.property == name && d.important == important)
    };

    if let Some(d) = at_level(property) {
        return Some(d.value.clone());
    }
    if property == "animation-name" {
        return at_level("animation").map(|d| names_from_shorthand(&d.value));
    }
    None
}

/// `animation-name` implied by an `animation` shorthand value
fn names_from_shorthand(value: &str) -> String {
    value
        .split(',')
        .filter_map(|item| item.split_whitespace().next())
        .collect::<Vec<_>>()
        .join(", ")
}

fn initial_value(property: &str) -> &'static str {
    match property {
        "animation" | "animation-name" | "animation-fill-mode" | "transform" => "none",
        "animation-duration" => "0s",
        "animation-timing-function" => "ease",
        "animation-iteration-count" => "1",
        "animation-play-state" => "running",
        "will-change" => "auto",
        _ => "",
    }
}

struct AuthorRule {
    selector: Selector,
    declaration: Declaration,
}

#[derive(Debug, Clone)]
struct StyleBlock {
    id: Option<String>,
    css: String,
}

/// Snapshot of a document with mutable styles
pub struct MemoryPage {
    html: RefCell<Html>,
    inline: RefCell<HashMap<NodeId, InlineStyle>>,
    style_blocks: RefCell<Vec<StyleBlock>>,
    author_rules: Vec<AuthorRule>,
}

impl MemoryPage {
    /// Parse a full HTML document
    pub fn parse(source: &str) -> Self {
        let html = Html::parse_document(source);

        let style_blocks = match Selector::parse("style") {
            Ok(selector) => html
                .select(&selector)
                .map(|el| StyleBlock {
                    id: el.value().attr("id").map(str::to_string),
                    css: el.text().collect(),
                })
                .collect(),
            Err(_) => Vec::new(),
        };

        MemoryPage {
            html: RefCell::new(html),
            inline: RefCell::new(HashMap::new()),
            style_blocks: RefCell::new(style_blocks),
            author_rules: Vec::new(),
        }
    }

    /// Read and parse an HTML snapshot from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read HTML snapshot {}", path.display()))?;
        debug!("Parsed {} bytes from {}", source.len(), path.display());
        Ok(Self::parse(&source))
    }

    /// Add a page-authored rule, as if it came from the host's stylesheet
    pub fn with_author_rule(
        mut self,
        selector: &str,
        property: &str,
        value: &str,
        important: bool,
    ) -> Result<Self, PageError> {
        let parsed =
            Selector::parse(selector).map_err(|e| PageError::invalid_selector(selector, e))?;
        self.author_rules.push(AuthorRule {
            selector: parsed,
            declaration: Declaration {
                property: property.to_string(),
                value: value.to_string(),
                important,
            },
        });
        Ok(self)
    }

    /// Remove a node from the document, the way a host re-render drops it
    pub fn detach(&self, node: &NodeId) {
        if let Some(mut n) = self.html.borrow_mut().tree.get_mut(*node) {
            n.detach();
        }
    }

    /// CSS text of the style blocks with the given id
    pub fn style_block_css(&self, id: &str) -> Vec<String> {
        self.style_blocks
            .borrow()
            .iter()
            .filter(|b| b.id.as_deref() == Some(id))
            .map(|b| b.css.clone())
            .collect()
    }

    fn is_attached(html: &Html, node: NodeId) -> bool {
        let root = html.tree.root().id();
        match html.tree.get(node) {
            Some(n) => n.ancestors().any(|a| a.id() == root),
            None => false,
        }
    }

    fn attached_element(html: &Html, node: NodeId) -> Result<ElementRef<'_>, PageError> {
        if !Self::is_attached(html, node) {
            return Err(PageError::Detached);
        }
        html.tree
            .get(node)
            .and_then(ElementRef::wrap)
            .ok_or(PageError::Detached)
    }

    fn inline_for(&self, element: &ElementRef<'_>) -> InlineStyle {
        self.inline
            .borrow()
            .get(&element.id())
            .cloned()
            .unwrap_or_else(|| InlineStyle::parse(element.value().attr("style").unwrap_or("")))
    }
}

/// Text content without script, style and other non-rendered subtrees
fn rendered_text(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    collect_text(element, &mut text);
    text
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child)
            && !is_non_rendered(&child_el)
        {
            collect_text(child_el, out);
        }
    }
}

fn is_non_rendered(element: &ElementRef<'_>) -> bool {
    NON_RENDERED_TAGS.contains(&element.value().name())
}

fn contains_marker(text: &str, markers: &[String]) -> bool {
    markers.iter().any(|m| !m.is_empty() && text.contains(m.as_str()))
}

impl Page for MemoryPage {
    type Node = NodeId;

    async fn select_all(&self, selector: &str) -> Result<Vec<NodeId>, PageError> {
        let parsed =
            Selector::parse(selector).map_err(|e| PageError::invalid_selector(selector, e))?;
        let html = self.html.borrow();
        Ok(html.select(&parsed).map(|el| el.id()).collect())
    }

    async fn text_hits(&self, markers: &[String]) -> Result<Vec<NodeId>, PageError> {
        let html = self.html.borrow();
        let hits = html
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| {
                !is_non_rendered(el)
                    && !el
                        .ancestors()
                        .filter_map(ElementRef::wrap)
                        .any(|a| is_non_rendered(&a))
            })
            .filter(|el| contains_marker(&rendered_text(*el), markers))
            .filter(|el| {
                !el.children()
                    .filter_map(ElementRef::wrap)
                    .filter(|child| !is_non_rendered(child))
                    .any(|child| contains_marker(&rendered_text(child), markers))
            })
            .map(|el| el.id())
            .collect();
        Ok(hits)
    }

    async fn enclosing(&self, node: &NodeId, tag: &str) -> Result<Option<NodeId>, PageError> {
        let html = self.html.borrow();
        let element = Self::attached_element(&html, *node)?;
        if element.value().name().eq_ignore_ascii_case(tag) {
            return Ok(Some(element.id()));
        }
        Ok(element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|a| a.value().name().eq_ignore_ascii_case(tag))
            .map(|a| a.id()))
    }

    async fn replace_style_block(&self, id: &str, css: &str) -> Result<(), PageError> {
        let mut blocks = self.style_blocks.borrow_mut();
        blocks.retain(|b| b.id.as_deref() != Some(id));
        blocks.push(StyleBlock {
            id: Some(id.to_string()),
            css: css.to_string(),
        });
        Ok(())
    }

    async fn count_style_blocks(&self, id: &str) -> Result<usize, PageError> {
        Ok(self
            .style_blocks
            .borrow()
            .iter()
            .filter(|b| b.id.as_deref() == Some(id))
            .count())
    }

    async fn set_style(
        &self,
        node: &NodeId,
        property: &str,
        value: &str,
        important: bool,
    ) -> Result<(), PageError> {
        let html = self.html.borrow();
        let element = Self::attached_element(&html, *node)?;
        let mut style = self.inline_for(&element);
        style.set(&property.to_lowercase(), value, important);
        self.inline.borrow_mut().insert(*node, style);
        Ok(())
    }

    async fn inline_style(
        &self,
        node: &NodeId,
        property: &str,
    ) -> Result<Option<String>, PageError> {
        let html = self.html.borrow();
        let element = Self::attached_element(&html, *node)?;
        Ok(self
            .inline_for(&element)
            .get(&property.to_lowercase())
            .map(|d| d.value.clone()))
    }

    async fn computed_style(&self, node: &NodeId, property: &str) -> Result<String, PageError> {
        let html = self.html.borrow();
        let element = Self::attached_element(&html, *node)?;
        let property = property.to_lowercase();

        let inline = self.inline_for(&element);
        let inline: Vec<&Declaration> = inline.0.iter().collect();
        let author: Vec<&Declaration> = self
            .author_rules
            .iter()
            .filter(|rule| rule.selector.matches(&element))
            .map(|rule| &rule.declaration)
            .collect();

        let value = declared(&inline, &property, true)
            .or_else(|| declared(&author, &property, true))
            .or_else(|| declared(&inline, &property, false))
            .or_else(|| declared(&author, &property, false))
            .unwrap_or_else(|| initial_value(&property).to_string());
        Ok(value)
    }

    async fn describe(&self, node: &NodeId) -> Result<NodeSummary, PageError> {
        let html = self.html.borrow();
        let element = Self::attached_element(&html, *node)?;
        Ok(NodeSummary::new(
            element.value().name(),
            element.value().attr("class").unwrap_or(""),
            &rendered_text(element),
        ))
    }
}

#[cfg(test)]
#[path = "memory_page_test.rs"]
mod memory_page_test;
