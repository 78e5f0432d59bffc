//! The forced animation: keyframe rules and the declaration bundle

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::page::{Page, PageError};

/// Identifier of the injected style element; reruns replace it
pub const STYLE_BLOCK_ID: &str = "ps-animation-fix";

/// One named keyframe animation and its timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeAnimation {
    pub name: String,
    pub duration_ms: u64,
    pub timing_function: String,
    pub iteration_count: String,
    pub fill_mode: String,
}

impl KeyframeAnimation {
    fn duration(&self) -> String {
        if self.duration_ms % 1000 == 0 {
            format!("{}s", self.duration_ms / 1000)
        } else {
            format!("{}ms", self.duration_ms)
        }
    }

    /// Single item of the `animation` shorthand
    fn shorthand(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.name,
            self.duration(),
            self.timing_function,
            self.iteration_count,
            self.fill_mode
        )
    }
}

/// Pulse plus glow animation forced onto every card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSpec {
    pub pulse: KeyframeAnimation,
    pub glow: KeyframeAnimation,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        AnimationSpec {
            pulse: KeyframeAnimation {
                name: "pulse-start-needed".to_string(),
                duration_ms: 2000,
                timing_function: "ease-in-out".to_string(),
                iteration_count: "infinite".to_string(),
                fill_mode: "both".to_string(),
            },
            glow: KeyframeAnimation {
                name: "glow-pulse".to_string(),
                duration_ms: 3000,
                timing_function: "ease-in-out".to_string(),
                iteration_count: "infinite".to_string(),
                fill_mode: "both".to_string(),
            },
        }
    }
}

impl AnimationSpec {
    fn each(&self) -> [&KeyframeAnimation; 2] {
        [&self.pulse, &self.glow]
    }

    fn joined(&self, field: impl Fn(&KeyframeAnimation) -> String) -> String {
        self.each().into_iter().map(field).collect::<Vec<_>>().join(", ")
    }

    /// Name the reporter looks for in the computed `animation-name`
    pub fn primary_name(&self) -> &str {
        &self.pulse.name
    }

    /// Value of the `animation` shorthand
    pub fn shorthand(&self) -> String {
        self.joined(KeyframeAnimation::shorthand)
    }

    /// Inline declarations in application order
    ///
    /// The shorthand comes first: setting it resets every `animation-*`
    /// longhand, which the following entries then pin explicitly.
    pub fn declarations(&self) -> Vec<(&'static str, String)> {
        vec![
            ("animation", self.shorthand()),
            ("animation-name", self.joined(|a| a.name.clone())),
            ("animation-duration", self.joined(KeyframeAnimation::duration)),
            (
                "animation-timing-function",
                self.joined(|a| a.timing_function.clone()),
            ),
            (
                "animation-iteration-count",
                self.joined(|a| a.iteration_count.clone()),
            ),
            ("animation-fill-mode", self.joined(|a| a.fill_mode.clone())),
            ("animation-play-state", self.joined(|_| "running".to_string())),
            ("transform", "scale(1)".to_string()),
            ("will-change", "transform, box-shadow".to_string()),
        ]
    }

    /// The two `@keyframes` rules
    pub fn keyframes_css(&self) -> String {
        format!(
            r#"@keyframes {pulse} {{
    0%, 100% {{
        transform: scale(1);
        box-shadow: 0 0 0 0 rgba(245, 158, 11, 0.7),
                    0 0 15px rgba(245, 158, 11, 0.5),
                    0 0 30px rgba(245, 158, 11, 0.3);
    }}
    50% {{
        transform: scale(1.02);
        box-shadow: 0 0 0 8px rgba(245, 158, 11, 0),
                    0 0 20px rgba(245, 158, 11, 0.7),
                    0 0 40px rgba(245, 158, 11, 0.5);
    }}
}}
@keyframes {glow} {{
    0%, 100% {{
        box-shadow: 0 0 10px rgba(245, 158, 11, 0.5),
                    0 0 20px rgba(245, 158, 11, 0.3);
    }}
    50% {{
        box-shadow: 0 0 15px rgba(245, 158, 11, 0.7),
                    0 0 30px rgba(245, 158, 11, 0.5);
    }}
}}
"#,
            pulse = self.pulse.name,
            glow = self.glow.name,
        )
    }
}

/// Inject the keyframes, replacing any earlier block with the same id
///
/// Returns how many blocks carry the id afterwards, which is 1 unless the
/// page misbehaves.
pub async fn ensure_keyframes<P: Page>(
    page: &P,
    spec: &AnimationSpec,
) -> Result<usize, PageError> {
    debug!("Replacing style block #{}", STYLE_BLOCK_ID);
    page.replace_style_block(STYLE_BLOCK_ID, &spec.keyframes_css())
        .await?;

    let count = page.count_style_blocks(STYLE_BLOCK_ID).await?;
    info!(
        "Keyframes {} and {} injected ({} block(s))",
        spec.pulse.name, spec.glow.name, count
    );
    Ok(count)
}

#[cfg(test)]
#[path = "keyframes_test.rs"]
mod keyframes_test;
