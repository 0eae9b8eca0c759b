//! Editor tuning and policy knobs.
//!
//! Everything here has a sensible default, so hosts only need to supply a
//! config when they want to change behavior. The struct deserializes from
//! JSON with missing fields filled from [`EditorConfig::default`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::doc::ElementKind;

/// Which element kinds a marquee drag may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarqueePolicy {
    /// Walls, doors and windows are never marquee-selected.
    #[default]
    ExcludeWallsAndInsertables,
    /// Every element kind participates.
    AllElements,
}

impl MarqueePolicy {
    #[must_use]
    pub fn includes(self, kind: ElementKind) -> bool {
        match self {
            Self::ExcludeWallsAndInsertables => !matches!(kind, ElementKind::Wall | ElementKind::Door | ElementKind::Window),
            Self::AllElements => true,
        }
    }
}

/// Which element kinds arrow-key nudging moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NudgePolicy {
    /// Everything except doors and windows, whose position is wall-relative.
    #[default]
    ExcludeInsertables,
    /// Walls are left alone as well.
    ExcludeWallsAndInsertables,
}

impl NudgePolicy {
    #[must_use]
    pub fn includes(self, kind: ElementKind) -> bool {
        match self {
            Self::ExcludeInsertables => !matches!(kind, ElementKind::Door | ElementKind::Window),
            Self::ExcludeWallsAndInsertables => !matches!(kind, ElementKind::Wall | ElementKind::Door | ElementKind::Window),
        }
    }
}

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Lowest allowed zoom factor.
    pub min_zoom: f64,
    /// Highest allowed zoom factor.
    pub max_zoom: f64,
    /// Zoom increment for the zoom-in/zoom-out commands.
    pub zoom_step: f64,
    /// Multiplicative zoom change per wheel notch.
    pub wheel_zoom_factor: f64,
    /// Endpoint snapping distance in screen pixels.
    pub snap_threshold_px: f64,
    /// Maximum number of retained history snapshots.
    pub history_capacity: usize,
    /// Offset applied to duplicated elements, in document units.
    pub duplicate_offset: f64,
    /// Arrow-key nudge distance in document units.
    pub nudge_step: f64,
    /// Arrow-key nudge distance with Shift held.
    pub nudge_step_large: f64,
    /// Quiet period after the last nudge before it is committed to history.
    pub nudge_commit_delay_ms: f64,
    /// Maximum distance in screen pixels from a wall for door/window placement.
    pub insertable_tolerance_px: f64,
    pub marquee_policy: MarqueePolicy,
    pub nudge_policy: NudgePolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.25,
            max_zoom: 4.0,
            zoom_step: 0.25,
            wheel_zoom_factor: 1.1,
            snap_threshold_px: 10.0,
            history_capacity: 50,
            duplicate_offset: 20.0,
            nudge_step: 1.0,
            nudge_step_large: 10.0,
            nudge_commit_delay_ms: 500.0,
            insertable_tolerance_px: 20.0,
            marquee_policy: MarqueePolicy::default(),
            nudge_policy: NudgePolicy::default(),
        }
    }
}

/// Why a config was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("zoom range {min}..{max} must be finite, positive and ordered")]
    ZoomRange { min: f64, max: f64 },
    #[error("{field} must be finite and positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("history_capacity must be at least 1")]
    NoHistory,
}

impl EditorConfig {
    /// Check the numeric knobs are usable.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: an unordered or non-positive zoom
    /// range, a non-positive step, threshold or tolerance, or an empty history.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = (self.min_zoom, self.max_zoom);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(ConfigError::ZoomRange { min, max });
        }
        for (field, value) in [
            ("zoom_step", self.zoom_step),
            ("wheel_zoom_factor", self.wheel_zoom_factor),
            ("snap_threshold_px", self.snap_threshold_px),
            ("nudge_step", self.nudge_step),
            ("nudge_step_large", self.nudge_step_large),
            ("insertable_tolerance_px", self.insertable_tolerance_px),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::NoHistory);
        }
        Ok(())
    }

    /// Clamp a zoom factor into the configured range.
    #[must_use]
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.max(self.min_zoom).min(self.max_zoom)
    }
}
