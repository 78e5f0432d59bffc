//! # cardpulse
#![allow(clippy::uninlined_format_args)]
//!
//! Finds the "start needed" cards a dashboard renders and forces their pulse
//! and glow animation to run, then reads computed style back to report
//! whether it does.
//!
//! One run is a single pass: inject the `@keyframes` block, poll the page
//! for cards through a ranked list of strategies, apply the animation bundle
//! with `!important` inline declarations, and verify.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Run against a live page (starts geckodriver if needed)
//! cardpulse run "http://localhost:3000/hub"
//!
//! # Chrome, visible, keep the window open for five seconds afterwards
//! cardpulse run "http://localhost:3000/hub" --browser chrome --no-headless --hold 5000
//!
//! # Check a saved snapshot offline
//! cardpulse audit saved-page.html --format simple
//!
//! # Show the strategies a run would try, with compiled selectors
//! cardpulse strategies --scope input_hub
//! ```
//!
//! Reports go to stdout as JSON (or `--format simple`), logs go to stderr.
//! Not finding cards is a normal outcome (`"outcome": "not_found"`, exit 0).
//!
//! ## Library Usage
//!
//! ```no_run
//! use cardpulse::{MemoryPage, Routine, RunConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let page = MemoryPage::parse(r#"<div data-ps-start-needed="true">Go</div>"#);
//! let config = RunConfig::default();
//! let report = Routine::new(&page, &config).run("inline").await?;
//! println!("{:?}", report.outcome);
//! # Ok(())
//! # }
//! ```

/// Animation bundle application and restart
pub mod applicator;

/// Command handlers behind the CLI
pub mod commands;

/// Run configuration: file, defaults, flags
pub mod config;

/// Exit-code aware error type
pub mod errors;

/// The keyframe style block
pub mod keyframes;

/// Strategy cascade over a page
pub mod locator;

/// Offline page over an HTML snapshot
pub mod memory_page;

/// The document abstraction
pub mod page;

/// Page implementation over WebDriver
pub mod remote_page;

/// Computed-style verification
pub mod reporter;

/// The one-shot state machine
pub mod routine;

/// Match strategies
pub mod strategy;

/// Report and CLI types
pub mod types;

/// Poll-until-found helper
pub mod wait;

/// WebDriver session control
pub mod webdriver;

/// Automatic WebDriver process management
pub mod webdriver_manager;

pub use config::RunConfig;
pub use memory_page::MemoryPage;
pub use page::{NodeSummary, Page, PageError};
pub use routine::Routine;
pub use strategy::{MatchStrategy, StrategyKind, StrategyList};
pub use types::{Outcome, OutputFormat, RunReport, ViewportSize};
pub use webdriver::{Browser, BrowserType};
