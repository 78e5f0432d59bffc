//! [`Page`] over a live WebDriver session
//!
//! Every operation is one `execute` round trip. Elements travel as W3C web
//! element references and come back the same way.

use fantoccini::Client;
use fantoccini::error::CmdError;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::page::{NodeSummary, Page, PageError};

/// W3C web element identifier key
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
/// Key used by pre-W3C chromedriver
const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

const SELECT_ALL_JS: &str = r#"
    try {
        return { nodes: Array.from(document.querySelectorAll(arguments[0])) };
    } catch (e) {
        return { error: String(e && e.message || e) };
    }
"#;

const TEXT_HITS_JS: &str = r#"
    const markers = arguments[0];
    const skip = new Set(['SCRIPT', 'STYLE', 'NOSCRIPT', 'TEMPLATE', 'HEAD']);
    const rendered = (el) => {
        let out = '';
        for (const child of el.childNodes) {
            if (child.nodeType === Node.TEXT_NODE) {
                out += child.data;
            } else if (child.nodeType === Node.ELEMENT_NODE && !skip.has(child.tagName)) {
                out += rendered(child);
            }
        }
        return out;
    };
    const hits = [];
    const visit = (el) => {
        if (skip.has(el.tagName)) return false;
        const text = rendered(el);
        if (!markers.some((m) => m && text.includes(m))) return false;
        let deeper = false;
        for (const child of el.children) {
            if (visit(child)) deeper = true;
        }
        if (!deeper) hits.push(el);
        return true;
    };
    visit(document.documentElement);
    return hits;
"#;

const ENCLOSING_JS: &str = r#"
    const el = arguments[0];
    if (!el.isConnected) return { detached: true };
    const tag = arguments[1].toUpperCase();
    for (let cur = el; cur; cur = cur.parentElement) {
        if (cur.tagName === tag) return { node: cur };
    }
    return { node: null };
"#;

const REPLACE_STYLE_BLOCK_JS: &str = r#"
    const id = arguments[0];
    document.querySelectorAll('style').forEach((s) => { if (s.id === id) s.remove(); });
    const block = document.createElement('style');
    block.id = id;
    block.textContent = arguments[1];
    (document.head || document.documentElement).appendChild(block);
    return true;
"#;

const COUNT_STYLE_BLOCKS_JS: &str = r#"
    return Array.from(document.querySelectorAll('style')).filter((s) => s.id === arguments[0]).length;
"#;

const SET_STYLE_JS: &str = r#"
    const el = arguments[0];
    if (!el.isConnected) return false;
    el.style.setProperty(arguments[1], arguments[2], arguments[3] ? 'important' : '');
    return true;
"#;

const INLINE_STYLE_JS: &str = r#"
    const el = arguments[0];
    if (!el.isConnected) return { detached: true };
    const value = el.style.getPropertyValue(arguments[1]);
    return { value: value === '' ? null : value };
"#;

const COMPUTED_STYLE_JS: &str = r#"
    const el = arguments[0];
    if (!el.isConnected) return null;
    return getComputedStyle(el).getPropertyValue(arguments[1]);
"#;

const DESCRIBE_JS: &str = r#"
    const el = arguments[0];
    if (!el.isConnected) return null;
    return {
        tag: el.tagName,
        class_name: el.getAttribute('class') || '',
        text: el.textContent || '',
    };
"#;

/// Web element reference handed out by [`WebDriverPage`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteNode(String);

impl RemoteNode {
    pub fn id(&self) -> &str {
        &self.0
    }

    fn to_arg(&self) -> Value {
        let mut reference = Map::new();
        reference.insert(ELEMENT_KEY.to_string(), Value::String(self.0.clone()));
        Value::Object(reference)
    }

    fn from_value(value: &Value) -> Option<Self> {
        let reference = value.as_object()?;
        reference
            .get(ELEMENT_KEY)
            .or_else(|| reference.get(LEGACY_ELEMENT_KEY))
            .and_then(Value::as_str)
            .map(|id| RemoteNode(id.to_string()))
    }
}

fn nodes_from(value: &Value) -> Result<Vec<RemoteNode>, PageError> {
    let items = value
        .as_array()
        .ok_or_else(|| PageError::Script(format!("expected an element list, got {}", value)))?;
    items
        .iter()
        .map(|item| {
            RemoteNode::from_value(item)
                .ok_or_else(|| PageError::Script(format!("not an element reference: {}", item)))
        })
        .collect()
}

fn driver_error(err: CmdError) -> PageError {
    let msg = err.to_string();
    if msg.contains("stale element") || msg.contains("no such element") {
        PageError::Detached
    } else {
        PageError::Driver(msg)
    }
}

/// The document currently loaded in a WebDriver session
pub struct WebDriverPage {
    client: Client,
}

impl WebDriverPage {
    pub fn new(client: Client) -> Self {
        WebDriverPage { client }
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, PageError> {
        self.client.execute(script, args).await.map_err(driver_error)
    }
}

impl Page for WebDriverPage {
    type Node = RemoteNode;

    async fn select_all(&self, selector: &str) -> Result<Vec<RemoteNode>, PageError> {
        let result = self.execute(SELECT_ALL_JS, vec![json!(selector)]).await?;
        if let Some(reason) = result.get("error").and_then(Value::as_str) {
            return Err(PageError::invalid_selector(selector, reason));
        }
        let nodes = nodes_from(result.get("nodes").unwrap_or(&Value::Null))?;
        debug!("{} matched {} element(s)", selector, nodes.len());
        Ok(nodes)
    }

    async fn text_hits(&self, markers: &[String]) -> Result<Vec<RemoteNode>, PageError> {
        let result = self.execute(TEXT_HITS_JS, vec![json!(markers)]).await?;
        nodes_from(&result)
    }

    async fn enclosing(
        &self,
        node: &RemoteNode,
        tag: &str,
    ) -> Result<Option<RemoteNode>, PageError> {
        let result = self
            .execute(ENCLOSING_JS, vec![node.to_arg(), json!(tag)])
            .await?;
        if result.get("detached").is_some() {
            return Err(PageError::Detached);
        }
        match result.get("node") {
            Some(Value::Null) | None => Ok(None),
            Some(found) => RemoteNode::from_value(found)
                .map(Some)
                .ok_or_else(|| PageError::Script(format!("not an element reference: {}", found))),
        }
    }

    async fn replace_style_block(&self, id: &str, css: &str) -> Result<(), PageError> {
        self.execute(REPLACE_STYLE_BLOCK_JS, vec![json!(id), json!(css)])
            .await?;
        Ok(())
    }

    async fn count_style_blocks(&self, id: &str) -> Result<usize, PageError> {
        let result = self.execute(COUNT_STYLE_BLOCKS_JS, vec![json!(id)]).await?;
        result
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| PageError::Script(format!("expected a count, got {}", result)))
    }

    async fn set_style(
        &self,
        node: &RemoteNode,
        property: &str,
        value: &str,
        important: bool,
    ) -> Result<(), PageError> {
        let result = self
            .execute(
                SET_STYLE_JS,
                vec![node.to_arg(), json!(property), json!(value), json!(important)],
            )
            .await?;
        match result.as_bool() {
            Some(true) => Ok(()),
            _ => Err(PageError::Detached),
        }
    }

    async fn inline_style(
        &self,
        node: &RemoteNode,
        property: &str,
    ) -> Result<Option<String>, PageError> {
        let result = self
            .execute(INLINE_STYLE_JS, vec![node.to_arg(), json!(property)])
            .await?;
        if result.get("detached").is_some() {
            return Err(PageError::Detached);
        }
        Ok(result
            .get("value")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn computed_style(&self, node: &RemoteNode, property: &str) -> Result<String, PageError> {
        let result = self
            .execute(COMPUTED_STYLE_JS, vec![node.to_arg(), json!(property)])
            .await?;
        match result {
            Value::String(value) => Ok(value.trim().to_string()),
            Value::Null => Err(PageError::Detached),
            other => Err(PageError::Script(format!("expected a style value, got {}", other))),
        }
    }

    async fn describe(&self, node: &RemoteNode) -> Result<NodeSummary, PageError> {
        let result = self.execute(DESCRIBE_JS, vec![node.to_arg()]).await?;
        if result.is_null() {
            return Err(PageError::Detached);
        }
        let field = |name: &str| result.get(name).and_then(Value::as_str).unwrap_or("");
        Ok(NodeSummary::new(field("tag"), field("class_name"), field("text")))
    }
}
