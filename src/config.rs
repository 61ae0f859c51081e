//! Configuration for evidence location.
//!
//! Every knob has a default, so `EvidenceConfig::default()` reproduces the
//! standard behaviour: 5 unit proximity threshold, 50 unit margins, 4x scale,
//! 300 DPI, vertical clamping, last-match tie-break and abort on page failure.

use crate::error::{Error, Result};
use crate::rendering::{DEFAULT_HIGHLIGHT_COLOR, DEFAULT_SCALE};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Maximum vertical distance between a search-term box and an answer box.
pub const DEFAULT_PROXIMITY_THRESHOLD: f32 = 5.0;

/// Margin added above and below the evidence region.
pub const DEFAULT_MARGIN: f32 = 50.0;

/// Nominal resolution recorded with rendered images.
pub const DEFAULT_DPI: u32 = 300;

/// Which candidate wins when several answer boxes qualify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TieBreak {
    /// First qualifying pair in search-major, answer-minor order
    FirstMatch,
    /// Last qualifying pair in search-major, answer-minor order
    #[default]
    LastMatch,
    /// Qualifying pair whose centres are nearest; earlier pairs win ties
    Closest,
}

/// What to do when one page cannot be searched or rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Propagate the first page failure
    #[default]
    Abort,
    /// Record the failure and continue with the next page
    SkipPage,
}

/// Evidence location configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Maximum `|search.y0 - answer.y0|` for a highlight candidate.
    pub proximity_threshold: f32,

    /// Margin added above the evidence region, in page units.
    pub top_margin: f32,

    /// Margin added below the evidence region, in page units.
    pub bottom_margin: f32,

    /// Pixels per page unit.
    pub scale: f32,

    /// Nominal resolution of the output images.
    pub dpi: u32,

    /// Clamp the crop to `[0, page height]`.
    pub clamp_vertical: bool,

    /// Highlight tie-break policy.
    pub tie_break: TieBreak,

    /// Page failure policy.
    pub failure_policy: FailurePolicy,

    /// Highlight colour as RGB.
    pub highlight_color: [u8; 3],
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EvidenceConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            proximity_threshold: DEFAULT_PROXIMITY_THRESHOLD,
            top_margin: DEFAULT_MARGIN,
            bottom_margin: DEFAULT_MARGIN,
            scale: DEFAULT_SCALE,
            dpi: DEFAULT_DPI,
            clamp_vertical: true,
            tie_break: TieBreak::default(),
            failure_policy: FailurePolicy::default(),
            highlight_color: DEFAULT_HIGHLIGHT_COLOR,
        }
    }

    /// Load configuration from a JSON file; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::Json`] for unreadable files and
    /// [`Error::Config`] for out-of-range values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.proximity_threshold.is_finite() && self.proximity_threshold >= 0.0) {
            return Err(Error::Config(format!(
                "proximity_threshold must be a non-negative number, got {}",
                self.proximity_threshold
            )));
        }
        for (name, margin) in [("top_margin", self.top_margin), ("bottom_margin", self.bottom_margin)] {
            if !(margin.is_finite() && margin >= 0.0) {
                return Err(Error::Config(format!("{} must be a non-negative number, got {}", name, margin)));
            }
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(Error::Config(format!("scale must be positive, got {}", self.scale)));
        }
        if self.dpi == 0 {
            return Err(Error::Config("dpi must be positive".to_string()));
        }
        Ok(())
    }

    /// Set the proximity threshold.
    pub fn with_proximity_threshold(mut self, threshold: f32) -> Self {
        self.proximity_threshold = threshold;
        self
    }

    /// Set the same margin above and below the region.
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.top_margin = margin;
        self.bottom_margin = margin;
        self
    }

    /// Set the margin above the region.
    pub fn with_top_margin(mut self, margin: f32) -> Self {
        self.top_margin = margin;
        self
    }

    /// Set the margin below the region.
    pub fn with_bottom_margin(mut self, margin: f32) -> Self {
        self.bottom_margin = margin;
        self
    }

    /// Set the render scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Set the nominal DPI.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Enable or disable vertical clamping of the crop.
    pub fn with_clamp_vertical(mut self, enable: bool) -> Self {
        self.clamp_vertical = enable;
        self
    }

    /// Set the tie-break policy.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Set the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set the highlight colour.
    pub fn with_highlight_color(mut self, color: [u8; 3]) -> Self {
        self.highlight_color = color;
        self
    }
}
