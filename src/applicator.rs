//! Force the animation bundle onto cards through `!important` inline styles

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::keyframes::AnimationSpec;
use crate::page::{Page, PageError};

/// Delay between clearing and reassigning the animation on restart
pub const DEFAULT_RESTART_DELAY_MS: u64 = 10;

/// Restart step an element is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPhase {
    /// `animation: none` is set; the engine drops the running animation
    Cleared,
    /// The full bundle is set again and the animation starts fresh
    Reassigned,
}

/// Counts from one application pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Applied {
    /// Elements that received the whole bundle
    pub touched: usize,
    /// Elements that disappeared from the document mid-pass
    pub detached: usize,
}

/// Applies the animation bundle with forced precedence
#[derive(Debug, Clone)]
pub struct Applicator {
    spec: AnimationSpec,
    restart_delay: Option<Duration>,
}

impl Applicator {
    pub fn new(spec: AnimationSpec) -> Self {
        Applicator {
            spec,
            restart_delay: Some(Duration::from_millis(DEFAULT_RESTART_DELAY_MS)),
        }
    }

    /// `None` disables the clear-and-reassign restart
    pub fn with_restart(mut self, delay: Option<Duration>) -> Self {
        self.restart_delay = delay;
        self
    }

    pub fn spec(&self) -> &AnimationSpec {
        &self.spec
    }

    /// Set every declaration of the bundle on one element
    pub async fn apply_one<P: Page>(&self, page: &P, node: &P::Node) -> Result<(), PageError> {
        for (property, value) in self.spec.declarations() {
            page.set_style(node, property, &value, true).await?;
        }
        Ok(())
    }

    /// Apply the bundle to every element, then restart if enabled
    ///
    /// Elements that went stale are counted, not fatal.
    pub async fn apply<P: Page>(&self, page: &P, nodes: &[P::Node]) -> Result<Applied, PageError> {
        let mut applied = Applied::default();
        let mut live = Vec::with_capacity(nodes.len());

        for (index, node) in nodes.iter().enumerate() {
            match self.apply_one(page, node).await {
                Ok(()) => {
                    debug!("Animation applied to card {}", index + 1);
                    live.push(node);
                }
                Err(PageError::Detached) => {
                    warn!("Card {} left the document before styling", index + 1);
                    applied.detached += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if let Some(delay) = self.restart_delay {
            let mut restarted = Vec::with_capacity(live.len());
            for node in live {
                match self.restart_step(page, node, RestartPhase::Cleared).await {
                    Ok(()) => restarted.push(node),
                    Err(PageError::Detached) => applied.detached += 1,
                    Err(e) => return Err(e),
                }
            }

            tokio::time::sleep(delay).await;

            live = Vec::with_capacity(restarted.len());
            for node in restarted {
                match self.restart_step(page, node, RestartPhase::Reassigned).await {
                    Ok(()) => live.push(node),
                    Err(PageError::Detached) => applied.detached += 1,
                    Err(e) => return Err(e),
                }
            }
        }

        applied.touched = live.len();
        info!(
            "Animation forced on {} card(s){}",
            applied.touched,
            if self.restart_delay.is_some() {
                " with restart"
            } else {
                ""
            }
        );
        Ok(applied)
    }

    /// Move one element into `phase`
    pub async fn restart_step<P: Page>(
        &self,
        page: &P,
        node: &P::Node,
        phase: RestartPhase,
    ) -> Result<(), PageError> {
        match phase {
            RestartPhase::Cleared => page.set_style(node, "animation", "none", true).await,
            RestartPhase::Reassigned => self.apply_one(page, node).await,
        }
    }
}

#[cfg(test)]
#[path = "applicator_test.rs"]
mod applicator_test;
