//! The one-shot routine: inject, search, wait, apply, verify

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::keyframes::ensure_keyframes;
use crate::locator::{self, Located};
use crate::page::{Page, PageError};
use crate::reporter;
use crate::types::{MatchedBy, Outcome, Phase, RunReport};
use crate::wait::{WaitOutcome, wait_for};

/// Whether `from → to` is a legal step of the routine
pub fn can_transition(from: Phase, to: Phase) -> bool {
    matches!(
        (from, to),
        (Phase::Idle, Phase::Searching)
            | (Phase::Searching, Phase::Found)
            | (Phase::Searching, Phase::TimedOut)
            | (Phase::Found, Phase::Applying)
            | (Phase::Applying, Phase::Verifying)
            | (Phase::Verifying, Phase::Done)
            | (Phase::TimedOut, Phase::Done)
    )
}

/// One invocation against one page; consumed by [`Routine::run`]
pub struct Routine<'a, P: Page> {
    page: &'a P,
    config: &'a RunConfig,
    phase: Phase,
}

impl<'a, P: Page> Routine<'a, P> {
    pub fn new(page: &'a P, config: &'a RunConfig) -> Self {
        Routine {
            page,
            config,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn advance(&mut self, next: Phase) {
        debug_assert!(
            can_transition(self.phase, next),
            "illegal transition {:?} -> {:?}",
            self.phase,
            next
        );
        debug!("{:?} -> {:?}", self.phase, next);
        self.phase = next;
    }

    /// Run to completion; `target` is only echoed in the report
    ///
    /// Not finding cards, skipped selectors and unobserved animations all end
    /// in a report. Only page transport failures are errors.
    pub async fn run(mut self, target: &str) -> Result<RunReport, PageError> {
        let page = self.page;
        let config = self.config;

        let style_blocks = ensure_keyframes(page, &config.animation).await?;
        if style_blocks != 1 {
            warn!("Expected one keyframe block, found {}", style_blocks);
        }

        self.advance(Phase::Searching);
        info!(
            "Searching for cards (up to {}ms, every {}ms)",
            config.timeout_ms, config.poll_interval_ms
        );
        let locator_config = &config.locator_config();
        let waited = wait_for(config.wait_config(), move || {
            locator::locate(page, locator_config)
        })
        .await?;

        let mut report = RunReport {
            outcome: Outcome::NotFound,
            target: target.to_string(),
            checked_at: Utc::now(),
            matched_by: None,
            style_blocks,
            waited_ms: waited.elapsed.as_millis() as u64,
            probes: waited.probes,
            applied: 0,
            cards: Vec::new(),
            hints: Vec::new(),
        };

        let Located { strategy, elements } = match waited.outcome {
            WaitOutcome::Found(located) => located,
            WaitOutcome::NotFound => {
                self.advance(Phase::TimedOut);
                warn!("No cards found after {}ms", report.waited_ms);
                report.hints = locator::hints(page, locator_config).await?;
                if !report.hints.is_empty() {
                    info!("{} near miss(es) listed in the report", report.hints.len());
                }
                self.advance(Phase::Done);
                return Ok(report);
            }
        };

        self.advance(Phase::Found);
        info!("Found {} card(s) with {}", elements.len(), strategy);
        report.matched_by = Some(MatchedBy {
            description: strategy.to_string(),
            strategy,
        });

        self.advance(Phase::Applying);
        let applicator = config.applicator();
        let applied = applicator.apply(page, &elements).await?;
        report.applied = applied.touched;

        if !config.settle().is_zero() {
            tokio::time::sleep(config.settle()).await;
        }

        self.advance(Phase::Verifying);
        report.cards =
            reporter::verify(page, &elements, applicator.spec().primary_name()).await?;

        let running = report.running_count();
        let total = report.cards.len();
        report.outcome = if running == total {
            info!("Animation running on all {} card(s)", total);
            Outcome::Animated
        } else if running == 0 {
            warn!("Animation not observed on any of {} card(s)", total);
            Outcome::NotObserved
        } else {
            warn!("Animation running on {} of {} card(s)", running, total);
            Outcome::PartiallyAnimated
        };

        self.advance(Phase::Done);
        Ok(report)
    }
}

#[cfg(test)]
#[path = "routine_test.rs"]
mod routine_test;
