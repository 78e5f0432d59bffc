use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::remote_page::WebDriverPage;
use crate::types::ViewportSize;
use crate::webdriver_manager::{GLOBAL_WEBDRIVER_MANAGER, WebDriverManager};

/// Supported browser types
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BrowserType {
    /// Mozilla Firefox
    Firefox,
    /// Google Chrome/Chromium
    Chrome,
}

impl std::str::FromStr for BrowserType {
    type Err = anyhow::Error;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserType::Firefox),
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            _ => anyhow::bail!("Unsupported browser: {}", s),
        }
    }
}

impl BrowserType {
    pub fn driver_command(&self) -> &'static str {
        match self {
            BrowserType::Firefox => "geckodriver",
            BrowserType::Chrome => "chromedriver",
        }
    }

    /// Where an externally started driver usually listens
    pub fn default_webdriver_url(&self) -> String {
        match self {
            BrowserType::Firefox => "http://localhost:4444".to_string(),
            BrowserType::Chrome => "http://localhost:9515".to_string(),
        }
    }

    /// WebDriver capabilities for a fresh session
    pub fn capabilities(
        &self,
        viewport: Option<&ViewportSize>,
        headless: bool,
        user_data_dir: Option<&std::path::Path>,
    ) -> serde_json::Map<String, serde_json::Value> {
        let mut caps = serde_json::Map::new();

        match self {
            BrowserType::Firefox => {
                let mut args = Vec::new();
                if headless {
                    args.push("--headless".to_string());
                }
                if let Some(vp) = viewport {
                    args.push(format!("--width={}", vp.width));
                    args.push(format!("--height={}", vp.height));
                }
                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
            }
            BrowserType::Chrome => {
                let mut args = vec!["--no-sandbox".to_string()];
                if headless {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }
                if let Some(vp) = viewport {
                    args.push(format!("--window-size={},{}", vp.width, vp.height));
                }
                if let Some(dir) = user_data_dir {
                    args.push(format!("--user-data-dir={}", dir.display()));
                }
                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
        }

        caps
    }
}

/// How to reach a browser for one run
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub browser_type: BrowserType,
    /// Use this driver instead of finding or starting one
    pub webdriver_url: Option<String>,
    pub viewport: Option<ViewportSize>,
    pub headless: bool,
}

/// Browser session for one run
pub struct Browser {
    client: Client,
    // Chrome's user data dir lives as long as the session
    _user_data_dir: Option<TempDir>,
}

impl Browser {
    /// Connect to a WebDriver and open a session
    pub async fn new(options: &SessionOptions) -> Result<Self> {
        let browser_type = options.browser_type;
        info!("Connecting to {:?} WebDriver", browser_type);

        let webdriver_url = match &options.webdriver_url {
            Some(url) => {
                if !WebDriverManager::is_driver_running(url).await {
                    anyhow::bail!("Failed to connect to WebDriver at {}", url);
                }
                url.clone()
            }
            None => GLOBAL_WEBDRIVER_MANAGER
                .ensure_driver(&browser_type)
                .await
                .context("Failed to connect to WebDriver")?,
        };

        // Chrome refuses to share a profile directory between sessions
        let user_data_dir = match browser_type {
            BrowserType::Chrome => Some(
                tempfile::Builder::new()
                    .prefix("cardpulse-chrome-")
                    .tempdir()?,
            ),
            BrowserType::Firefox => None,
        };

        let caps = browser_type.capabilities(
            options.viewport.as_ref(),
            options.headless,
            user_data_dir.as_ref().map(|d| d.path()),
        );

        debug!("Connecting to WebDriver at {}", webdriver_url);
        let client = match ClientBuilder::rustls()
            .capabilities(caps.clone())
            .connect(&webdriver_url)
            .await
        {
            Ok(client) => client,
            Err(e) => {
                let error_str = e.to_string();
                let recoverable = options.webdriver_url.is_none()
                    && (error_str.contains("Session is already started")
                        || error_str.contains("session not created"));
                if !recoverable {
                    return Err(e).context("Failed to connect to WebDriver");
                }

                info!("WebDriver appears to be in a bad state, restarting it");
                GLOBAL_WEBDRIVER_MANAGER.kill_driver(&browser_type);
                tokio::time::sleep(std::time::Duration::from_millis(500)).await;

                let new_url = GLOBAL_WEBDRIVER_MANAGER
                    .ensure_driver(&browser_type)
                    .await
                    .context("Failed to restart WebDriver after recovery")?;
                ClientBuilder::rustls()
                    .capabilities(caps)
                    .connect(&new_url)
                    .await
                    .context("Failed to connect to WebDriver after restart")?
            }
        };

        if let Some(vp) = &options.viewport {
            debug!("Setting viewport to {}x{}", vp.width, vp.height);
            if let Err(e) = client.set_window_size(vp.width, vp.height).await {
                debug!("Could not set window size: {}", e);
            }
        }

        Ok(Browser {
            client,
            _user_data_dir: user_data_dir,
        })
    }

    /// Navigate and wait (up to 2s) for `document.readyState == "complete"`
    pub async fn goto(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);
        self.client
            .goto(url)
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;

        for _ in 0..20 {
            match self
                .client
                .execute("return document.readyState === 'complete';", vec![])
                .await
            {
                Ok(val) if val.as_bool().unwrap_or(false) => break,
                _ => tokio::time::sleep(tokio::time::Duration::from_millis(100)).await,
            }
        }

        Ok(())
    }

    /// The current document as a [`Page`](crate::page::Page)
    pub fn page(&self) -> WebDriverPage {
        WebDriverPage::new(self.client.clone())
    }

    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}
