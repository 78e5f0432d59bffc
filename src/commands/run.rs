use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::commands::RunArgs;
use crate::commands::output::print_report;
use crate::routine::Routine;
use crate::types::ViewportSize;
use crate::webdriver::{Browser, BrowserType, SessionOptions};

/// Only pages a browser can load directly
pub fn parse_target(raw: &str) -> Result<url::Url> {
    let target = url::Url::parse(raw).with_context(|| format!("Invalid URL: {}", raw))?;
    match target.scheme() {
        "http" | "https" | "file" => Ok(target),
        other => anyhow::bail!("Unsupported URL scheme '{}' in {}", other, raw),
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn handle_run(
    url: String,
    browser: String,
    webdriver_url: Option<String>,
    no_headless: bool,
    viewport: Option<String>,
    hold: Option<u64>,
    args: RunArgs,
) -> Result<()> {
    let target = parse_target(&url)?;
    let config = args.load_config()?;

    let options = SessionOptions {
        browser_type: browser.parse::<BrowserType>()?,
        webdriver_url,
        viewport: viewport.as_deref().map(ViewportSize::parse).transpose()?,
        headless: !no_headless,
    };

    let browser = Browser::new(&options).await?;
    let result = async {
        browser.goto(target.as_str()).await?;
        let page = browser.page();
        let report = Routine::new(&page, &config)
            .run(target.as_str())
            .await
            .context("Run aborted")?;

        if let Some(ms) = hold {
            info!("Holding the browser open for {}ms", ms);
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        Ok::<_, anyhow::Error>(report)
    }
    .await;

    // Close the session whether or not the run succeeded
    if let Err(e) = browser.close().await {
        tracing::debug!("Closing the session failed: {}", e);
    }

    print_report(&result?, args.format)
}
