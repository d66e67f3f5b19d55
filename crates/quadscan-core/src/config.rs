// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{QuadscanError, Result};

/// Tuning constants for the rectangle stabilizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Maximum number of recent candidates kept for comparison.
    pub max_window_size: usize,
    /// Candidates required before any rectangle is shown. Must not exceed
    /// `max_window_size`.
    pub min_window_size_to_decide: usize,
    /// Per-corner distance (px) under which two rectangles match.
    pub match_distance_threshold: f64,
    /// Consecutive close observations required before auto-capture fires.
    pub auto_scan_pass_threshold: u32,
    /// Tighter per-corner distance (px) used for auto-capture accounting.
    pub auto_scan_match_distance_threshold: f64,
    /// Consecutive empty frames before the displayed rectangle is cleared.
    pub no_observation_threshold: u32,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            max_window_size: 8,
            min_window_size_to_decide: 3,
            match_distance_threshold: 40.0,
            auto_scan_pass_threshold: 35,
            auto_scan_match_distance_threshold: 18.0,
            no_observation_threshold: 3,
        }
    }
}

impl StabilizerConfig {
    /// Reject configurations the stabilizer cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_window_size == 0 || self.min_window_size_to_decide == 0 {
            return Err(QuadscanError::InvalidConfig(
                "window sizes must be at least 1".into(),
            ));
        }
        if self.min_window_size_to_decide > self.max_window_size {
            return Err(QuadscanError::InvalidConfig(format!(
                "min_window_size_to_decide ({}) exceeds max_window_size ({})",
                self.min_window_size_to_decide, self.max_window_size
            )));
        }
        for (name, value) in [
            ("match_distance_threshold", self.match_distance_threshold),
            (
                "auto_scan_match_distance_threshold",
                self.auto_scan_match_distance_threshold,
            ),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(QuadscanError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative distance (got {value})"
                )));
            }
        }
        if self.no_observation_threshold == 0 {
            return Err(QuadscanError::InvalidConfig(
                "no_observation_threshold must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Parameters handed to the rectangle detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Lowest detector confidence accepted for a rectangle.
    pub minimum_confidence: f32,
    /// Upper bound on rectangles returned per frame.
    pub maximum_observations: usize,
    /// Smallest accepted short-side / long-side ratio.
    pub minimum_aspect_ratio: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            minimum_confidence: 0.8,
            maximum_observations: 15,
            minimum_aspect_ratio: 0.3,
        }
    }
}

/// Persistent scanner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub stabilizer: StabilizerConfig,
    pub detection: DetectionConfig,
    /// Whether a stable rectangle triggers the shutter automatically.
    pub auto_scan_enabled: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            stabilizer: StabilizerConfig::default(),
            detection: DetectionConfig::default(),
            auto_scan_enabled: true,
        }
    }
}

impl ScanConfig {
    /// Load and validate settings from a JSON file. Missing fields take
    /// their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.stabilizer.validate()?;
        info!(path = %path.display(), "scan config loaded");
        Ok(config)
    }

    /// Write the settings as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        debug!(path = %path.as_ref().display(), "scan config saved");
        Ok(())
    }
}
