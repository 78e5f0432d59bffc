use anyhow::{Context, Result};
use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::webdriver::BrowserType;

/// Attempts to reach `/status` after spawning a driver, 100ms apart
const STARTUP_ATTEMPTS: u32 = 30;

/// Starts and tracks the driver processes (geckodriver, chromedriver) a run needs
#[derive(Default)]
pub struct WebDriverManager {
    processes: Mutex<Vec<DriverProcess>>,
}

struct DriverProcess {
    browser_type: BrowserType,
    child: Child,
    port: u16,
    url: String,
}

impl WebDriverManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn processes(&self) -> MutexGuard<'_, Vec<DriverProcess>> {
        self.processes.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// URL of a ready driver for `browser_type`, starting one if needed
    ///
    /// Order: a driver this manager already started, an external driver on the
    /// standard port, then a freshly spawned one.
    pub async fn ensure_driver(&self, browser_type: &BrowserType) -> Result<String> {
        let managed: Vec<String> = self
            .processes()
            .iter()
            .filter(|p| p.browser_type == *browser_type)
            .map(|p| p.url.clone())
            .collect();

        for url in managed {
            if Self::is_driver_ready(&url).await {
                debug!("Using managed WebDriver at {}", url);
                return Ok(url);
            }
        }

        let standard = browser_type.default_webdriver_url();
        if Self::is_driver_ready(&standard).await {
            debug!("Found external WebDriver at {}", standard);
            return Ok(standard);
        }

        info!("WebDriver not detected, starting {}", browser_type.driver_command());
        self.start_driver(browser_type).await
    }

    async fn start_driver(&self, browser_type: &BrowserType) -> Result<String> {
        let command = browser_type.driver_command();
        if !Self::command_exists(command) {
            anyhow::bail!(
                "{} not found in PATH. Install it or pass --webdriver-url:\n\
                  macOS: brew install {}\n\
                  Linux: download from the official releases",
                command,
                command
            );
        }

        let port = Self::find_free_port(browser_type)?;
        let args = match browser_type {
            BrowserType::Firefox => vec!["--port".to_string(), port.to_string()],
            BrowserType::Chrome => vec![format!("--port={}", port)],
        };
        info!("Starting {} on port {}", command, port);

        let mut cmd = Command::new(command);
        cmd.args(&args).stdout(Stdio::null()).stderr(Stdio::null());

        // Own process group so the browser it spawns goes down with it
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to start {}", command))?;

        let url = format!("http://localhost:{}", port);
        self.processes().push(DriverProcess {
            browser_type: *browser_type,
            child,
            port,
            url: url.clone(),
        });

        for attempt in 1..=STARTUP_ATTEMPTS {
            if Self::is_driver_running(&url).await {
                info!("WebDriver started on port {}", port);
                return Ok(url);
            }
            if attempt < STARTUP_ATTEMPTS {
                sleep(Duration::from_millis(100)).await;
            }
        }

        self.stop_port(port);
        anyhow::bail!("WebDriver failed to start within timeout")
    }

    /// Check if a command exists in PATH
    pub fn command_exists(command: &str) -> bool {
        #[cfg(unix)]
        let finder = "which";
        #[cfg(windows)]
        let finder = "where";

        Command::new(finder)
            .arg(command)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Driver port: the browser's usual ones first, then any free port
    pub fn find_free_port(browser_type: &BrowserType) -> Result<u16> {
        let preferred: [u16; 3] = match browser_type {
            BrowserType::Firefox => [4444, 4445, 4446],
            BrowserType::Chrome => [9515, 9516, 9517],
        };

        if let Some(port) = preferred.into_iter().find(|p| !Self::is_port_in_use(*p)) {
            debug!("Found free port {} for {:?}", port, browser_type);
            return Ok(port);
        }

        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        Ok(listener.local_addr()?.port())
    }

    pub fn is_port_in_use(port: u16) -> bool {
        std::net::TcpListener::bind(("127.0.0.1", port)).is_err()
    }

    /// Whether `/status` answers at all
    pub async fn is_driver_running(url: &str) -> bool {
        Self::status(url).await.is_some()
    }

    /// Whether `/status` reports `ready: true`
    pub async fn is_driver_ready(url: &str) -> bool {
        Self::status(url)
            .await
            .and_then(|body| body.pointer("/value/ready").and_then(|r| r.as_bool()))
            .unwrap_or(false)
    }

    async fn status(url: &str) -> Option<serde_json::Value> {
        let response = reqwest::Client::new()
            .get(format!("{}/status", url.trim_end_matches('/')))
            .timeout(Duration::from_secs(1))
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json().await.ok()
    }

    /// Stop managed drivers for one browser, e.g. after a wedged session
    pub fn kill_driver(&self, browser_type: &BrowserType) {
        let mut processes = self.processes();
        let (doomed, kept): (Vec<_>, Vec<_>) = processes
            .drain(..)
            .partition(|p| p.browser_type == *browser_type);
        *processes = kept;
        drop(processes);

        for process in doomed {
            Self::terminate(process);
        }
    }

    fn stop_port(&self, port: u16) {
        let mut processes = self.processes();
        if let Some(index) = processes.iter().position(|p| p.port == port) {
            let process = processes.remove(index);
            drop(processes);
            Self::terminate(process);
        }
    }

    fn terminate(mut process: DriverProcess) {
        debug!("Stopping WebDriver on port {}", process.port);

        #[cfg(unix)]
        {
            let pgid = process.child.id().to_string();
            let _ = Command::new("kill")
                .args(["-TERM", &format!("-{}", pgid)])
                .output();
            std::thread::sleep(Duration::from_millis(100));
            let _ = Command::new("kill")
                .args(["-KILL", &format!("-{}", pgid)])
                .output();
        }

        let _ = process.child.kill();
        let _ = process.child.wait();
    }

    /// Stop all managed WebDriver processes
    pub fn stop_all(&self) {
        let processes: Vec<_> = self.processes().drain(..).collect();
        for process in processes {
            Self::terminate(process);
        }
    }

    /// Number of drivers this manager started and still tracks
    pub fn managed_count(&self) -> usize {
        self.processes().len()
    }
}

impl Drop for WebDriverManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}

lazy_static::lazy_static! {
    pub static ref GLOBAL_WEBDRIVER_MANAGER: WebDriverManager = WebDriverManager::new();
}

#[cfg(test)]
#[path = "webdriver_manager_test.rs"]
mod webdriver_manager_test;
