// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectangle stabilizer ("funnel") turns a noisy stream of per-frame
// quadrilateral detections into display decisions and an auto-capture signal.
//
// Recent detections are kept in a small FIFO window. Each new detection
// rescores the whole window by mutual proximity; the best-scoring candidate is
// shown, and a pass counter tracks how long the shown rectangle has stayed put.

use std::collections::VecDeque;

use quadscan_core::config::StabilizerConfig;
use quadscan_core::error::Result;
use quadscan_core::types::Quadrilateral;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// What the consumer should do after an observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "quad", rename_all = "snake_case")]
pub enum Decision {
    /// Keep whatever is on screen.
    NoChange,
    /// Remove the overlay; the document is gone.
    Clear,
    /// Draw the overlay at this rectangle.
    Show(Quadrilateral),
    /// Draw the overlay and fire the shutter.
    ShowAndAutoCapture(Quadrilateral),
}

impl Decision {
    /// The rectangle to draw, if the decision carries one.
    pub fn quad(&self) -> Option<&Quadrilateral> {
        match self {
            Self::Show(q) | Self::ShowAndAutoCapture(q) => Some(q),
            Self::NoChange | Self::Clear => None,
        }
    }

    /// Whether the consumer should fire the shutter.
    pub fn is_auto_capture(&self) -> bool {
        matches!(self, Self::ShowAndAutoCapture(_))
    }
}

/// A retained observation and its matching score.
#[derive(Debug, Clone)]
struct Candidate {
    quad: Quadrilateral,
    score: u32,
}

/// Stateful filter over per-frame rectangle detections.
///
/// Calls to [`observe`](Self::observe) must be serialized in frame order; the
/// stabilizer holds no locks and is meant to be owned by a single processing
/// thread.
#[derive(Debug, Clone)]
pub struct RectangleStabilizer {
    config: StabilizerConfig,
    /// Oldest candidate at the front.
    window: VecDeque<Candidate>,
    /// Last rectangle the consumer was told to show.
    displayed: Option<Quadrilateral>,
    auto_scan_pass_count: u32,
    /// Consecutive frames without a detection.
    miss_count: u32,
}

impl Default for RectangleStabilizer {
    fn default() -> Self {
        Self::with_config(StabilizerConfig::default())
    }
}

impl RectangleStabilizer {
    /// Create a stabilizer after validating `config`.
    pub fn new(config: StabilizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: StabilizerConfig) -> Self {
        let capacity = config.max_window_size + 1;
        Self {
            config,
            window: VecDeque::with_capacity(capacity),
            displayed: None,
            auto_scan_pass_count: 0,
            miss_count: 0,
        }
    }

    // -- Accessors ------------------------------------------------------------

    /// Tuning the stabilizer was built with.
    pub fn config(&self) -> &StabilizerConfig {
        &self.config
    }

    /// The rectangle currently on screen, as far as the stabilizer knows.
    pub fn displayed(&self) -> Option<&Quadrilateral> {
        self.displayed.as_ref()
    }

    /// Candidates currently held, at most `max_window_size`.
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Consecutive close observations counted toward auto-capture.
    pub fn auto_scan_pass_count(&self) -> u32 {
        self.auto_scan_pass_count
    }

    /// Consecutive frames without a detection.
    pub fn miss_count(&self) -> u32 {
        self.miss_count
    }

    // -- State control --------------------------------------------------------

    /// Forget everything: window, counters, and the displayed rectangle.
    pub fn reset(&mut self) {
        self.window.clear();
        self.displayed = None;
        self.auto_scan_pass_count = 0;
        self.miss_count = 0;
    }

    /// Restart auto-capture accounting, e.g. when a capture has begun.
    pub fn reset_auto_scan(&mut self) {
        self.auto_scan_pass_count = 0;
    }

    // -- Observation ----------------------------------------------------------

    /// Feed one frame's detection (`None` when nothing was found) and get the
    /// resulting display decision.
    pub fn observe(&mut self, observation: Option<Quadrilateral>) -> Decision {
        let Some(quad) = observation else {
            return self.observe_miss();
        };
        self.miss_count = 0;

        self.admit(quad);
        if self.window.len() < self.config.min_window_size_to_decide {
            trace!(
                window = self.window.len(),
                needed = self.config.min_window_size_to_decide,
                "not enough candidates to decide"
            );
            return Decision::NoChange;
        }

        self.rescore();
        match self.best() {
            Some(best) => self.decide(best),
            None => Decision::NoChange,
        }
    }

    fn observe_miss(&mut self) -> Decision {
        self.miss_count = self.miss_count.saturating_add(1);
        if self.miss_count < self.config.no_observation_threshold {
            trace!(misses = self.miss_count, "frame without rectangle");
            return Decision::NoChange;
        }

        if self.displayed.is_some() {
            debug!(misses = self.miss_count, "rectangle lost; clearing overlay");
        }
        self.window.clear();
        self.displayed = None;
        self.auto_scan_pass_count = 0;
        Decision::Clear
    }

    /// Append a fresh candidate, evicting the oldest past capacity.
    fn admit(&mut self, quad: Quadrilateral) {
        self.window.push_back(Candidate { quad, score: 0 });
        if self.window.len() > self.config.max_window_size {
            self.window.pop_front();
            trace!("evicted oldest candidate");
        }
        trace!(window = self.window.len(), quad = %quad, "candidate admitted");
    }

    /// Score every candidate by how many window members it matches,
    /// itself included.
    fn rescore(&mut self) {
        let threshold = self.config.match_distance_threshold;
        for candidate in self.window.iter_mut() {
            candidate.score = 1;
        }
        let n = self.window.len();
        for i in 0..n {
            for j in (i + 1)..n {
                if self.window[i].quad.is_within(threshold, &self.window[j].quad) {
                    self.window[i].score += 1;
                    self.window[j].score += 1;
                }
            }
        }
    }

    /// Highest-scoring candidate, scanning newest to oldest. An older
    /// candidate with an equal score wins only if it matches the displayed
    /// rectangle; with nothing displayed the newest of the tied wins.
    fn best(&self) -> Option<Quadrilateral> {
        let threshold = self.config.match_distance_threshold;
        let mut best: Option<&Candidate> = None;

        for candidate in self.window.iter().rev() {
            match best {
                None => best = Some(candidate),
                Some(current) if candidate.score > current.score => best = Some(candidate),
                Some(current) if candidate.score == current.score => {
                    if let Some(displayed) = &self.displayed {
                        if candidate.quad.is_within(threshold, displayed) {
                            best = Some(candidate);
                        }
                    }
                }
                Some(_) => {}
            }
        }

        best.map(|c| {
            trace!(score = c.score, quad = %c.quad, "best candidate");
            c.quad
        })
    }

    /// Auto-scan accounting against the displayed rectangle.
    fn decide(&mut self, best: Quadrilateral) -> Decision {
        let close_to_displayed = self
            .displayed
            .is_some_and(|prev| best.is_within(self.config.auto_scan_match_distance_threshold, &prev));
        self.displayed = Some(best);

        if !close_to_displayed {
            if self.auto_scan_pass_count > 0 {
                debug!(passes = self.auto_scan_pass_count, "rectangle moved; auto-scan restarted");
            }
            self.auto_scan_pass_count = 0;
            return Decision::Show(best);
        }

        self.auto_scan_pass_count += 1;
        if self.auto_scan_pass_count > self.config.auto_scan_pass_threshold {
            debug!(
                passes = self.auto_scan_pass_count,
                quad = %best,
                "rectangle stable; auto-capture"
            );
            self.auto_scan_pass_count = 0;
            return Decision::ShowAndAutoCapture(best);
        }
        Decision::Show(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadscan_core::geometry::{Affine, Point, Rect, Size};
    use quadscan_core::types::CornerPosition;

    fn rect_quad(x: f64, y: f64, w: f64, h: f64) -> Quadrilateral {
        Quadrilateral::from_rect(&Rect::new(Point::new(x, y), Size::new(w, h)))
    }

    fn unit_square() -> Quadrilateral {
        Quadrilateral::new(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        )
    }

    fn doc_a() -> Quadrilateral {
        rect_quad(100.0, 100.0, 400.0, 600.0)
    }

    /// Far from `doc_a` at every corner.
    fn doc_b() -> Quadrilateral {
        rect_quad(600.0, 150.0, 300.0, 500.0)
    }

    fn small_window(max: usize, min: usize) -> RectangleStabilizer {
        RectangleStabilizer::new(StabilizerConfig {
            max_window_size: max,
            min_window_size_to_decide: min,
            ..Default::default()
        })
        .expect("valid config")
    }

    #[test]
    fn unit_square_then_misses() {
        let mut s = RectangleStabilizer::default();
        let q = unit_square();

        assert_eq!(s.observe(Some(q)), Decision::NoChange);
        assert_eq!(s.observe(Some(q)), Decision::NoChange);
        assert_eq!(s.observe(Some(q)), Decision::Show(q));

        assert_eq!(s.observe(None), Decision::NoChange);
        assert_eq!(s.observe(None), Decision::NoChange);
        assert_eq!(s.observe(None), Decision::Clear);
        assert!(s.displayed().is_none());
    }

    #[test]
    fn too_few_observations_never_decide() {
        let mut s = small_window(8, 5);
        for i in 0..4 {
            let q = doc_a().apply(&Affine::translate(i as f64 * 7.0, 0.0));
            assert_eq!(s.observe(Some(q)), Decision::NoChange);
        }
    }

    #[test]
    fn single_miss_is_debounced() {
        let mut s = RectangleStabilizer::default();
        for _ in 0..3 {
            s.observe(Some(doc_a()));
        }
        assert_eq!(s.observe(None), Decision::NoChange);
        // A detection resets the miss counter.
        assert!(matches!(s.observe(Some(doc_a())), Decision::Show(_)));
        assert_eq!(s.miss_count(), 0);
        assert_eq!(s.observe(None), Decision::NoChange);
        assert_eq!(s.observe(None), Decision::NoChange);
        assert_eq!(s.observe(None), Decision::Clear);
        // Still gone on further misses.
        assert_eq!(s.observe(None), Decision::Clear);
    }

    #[test]
    fn clear_restarts_warm_up() {
        let mut s = RectangleStabilizer::default();
        for _ in 0..5 {
            s.observe(Some(doc_a()));
        }
        for _ in 0..3 {
            s.observe(None);
        }
        assert_eq!(s.window_len(), 0);
        assert_eq!(s.auto_scan_pass_count(), 0);

        assert_eq!(s.observe(Some(doc_b())), Decision::NoChange);
        assert_eq!(s.observe(Some(doc_b())), Decision::NoChange);
        assert_eq!(s.observe(Some(doc_b())), Decision::Show(doc_b()));
    }

    #[test]
    fn window_is_bounded() {
        let mut s = RectangleStabilizer::default();
        for k in 0..20 {
            s.observe(Some(doc_a()));
            assert_eq!(s.window_len(), (k + 1).min(8));
        }
    }

    #[test]
    fn repeated_quad_is_shown() {
        let mut s = RectangleStabilizer::default();
        let q = doc_a();
        for i in 0..10 {
            let decision = s.observe(Some(q));
            if i < 2 {
                assert_eq!(decision, Decision::NoChange);
            } else {
                assert_eq!(decision.quad(), Some(&q));
            }
        }
    }

    #[test]
    fn jitter_keeps_a_stable_choice() {
        let mut s = RectangleStabilizer::default();
        let jitter = [(0.0, 0.0), (5.0, -3.0), (-4.0, 2.0), (3.0, 6.0), (-2.0, -5.0)];
        let mut shown = Vec::new();
        for (dx, dy) in jitter.iter().cycle().take(20) {
            let observed = doc_a().apply(&Affine::translate(*dx, *dy));
            if let Some(q) = s.observe(Some(observed)).quad() {
                shown.push(*q);
            }
        }
        assert!(!shown.is_empty());
        assert!(shown.iter().all(|q| q.is_within(10.0, &doc_a())));
    }

    #[test]
    fn spurious_detection_does_not_win() {
        let mut s = RectangleStabilizer::default();
        for _ in 0..4 {
            s.observe(Some(doc_a()));
        }
        // One outlier frame: it scores 1 against the matching majority.
        assert_eq!(s.observe(Some(doc_b())), Decision::Show(doc_a()));
    }

    #[test]
    fn majority_shift_switches_display() {
        let mut s = RectangleStabilizer::default();
        for _ in 0..8 {
            s.observe(Some(doc_a()));
        }
        // 4 A vs 4 B ties and keeps the displayed A; the fifth B wins outright.
        for _ in 0..4 {
            assert_eq!(s.observe(Some(doc_b())), Decision::Show(doc_a()));
        }
        assert_eq!(s.observe(Some(doc_b())), Decision::Show(doc_b()));
    }

    #[test]
    fn tie_prefers_candidate_matching_display() {
        let mut s = small_window(4, 3);
        for _ in 0..3 {
            s.observe(Some(doc_a()));
        }
        assert_eq!(s.displayed(), Some(&doc_a()));

        // Window becomes A A B B: equal scores, only A matches the display.
        s.observe(Some(doc_b()));
        assert_eq!(s.observe(Some(doc_b())), Decision::Show(doc_a()));
    }

    #[test]
    fn tie_without_display_prefers_newest() {
        let mut s = small_window(4, 4);
        s.observe(Some(doc_a()));
        s.observe(Some(doc_a()));
        s.observe(Some(doc_b()));
        assert_eq!(s.observe(Some(doc_b())), Decision::Show(doc_b()));
    }

    #[test]
    fn auto_capture_fires_once_past_threshold() {
        let mut s = RectangleStabilizer::default();
        let q = doc_a();
        let nearby = q.apply(&Affine::translate(6.0, -6.0));

        // Warm-up: the third observation shows without a prior display.
        s.observe(Some(q));
        s.observe(Some(q));
        assert_eq!(s.observe(Some(q)), Decision::Show(q));

        // 35 close observations count up without firing; the 36th fires.
        for pass in 1..=35 {
            let decision = s.observe(Some(nearby));
            assert!(!decision.is_auto_capture(), "fired early at pass {pass}");
            assert_eq!(s.auto_scan_pass_count(), pass);
        }
        assert!(s.observe(Some(nearby)).is_auto_capture());
        assert_eq!(s.auto_scan_pass_count(), 0);

        // The next close observation restarts the count instead of re-firing.
        assert!(!s.observe(Some(nearby)).is_auto_capture());
        assert_eq!(s.auto_scan_pass_count(), 1);
    }

    #[test]
    fn moving_far_resets_pass_count() {
        let config = StabilizerConfig {
            max_window_size: 3,
            min_window_size_to_decide: 1,
            ..Default::default()
        };
        let mut s = RectangleStabilizer::new(config).expect("valid config");
        s.observe(Some(doc_a()));
        s.observe(Some(doc_a()));
        s.observe(Some(doc_a()));
        assert_eq!(s.auto_scan_pass_count(), 2);

        // 25 px at one corner: still a window match (40) but not an
        // auto-scan match (18).
        let shifted = doc_a().with_corner(CornerPosition::TopLeft, Point::new(125.0, 100.0));
        for _ in 0..3 {
            s.observe(Some(shifted));
        }
        assert_eq!(s.displayed(), Some(&shifted));
        assert_eq!(s.auto_scan_pass_count(), 0);

        s.observe(Some(doc_b()));
        assert_eq!(s.observe(Some(doc_b())), Decision::Show(doc_b()));
        assert_eq!(s.auto_scan_pass_count(), 0);
    }

    #[test]
    fn reset_auto_scan_only_touches_counter() {
        let mut s = RectangleStabilizer::default();
        for _ in 0..6 {
            s.observe(Some(doc_a()));
        }
        assert!(s.auto_scan_pass_count() > 0);
        s.reset_auto_scan();
        assert_eq!(s.auto_scan_pass_count(), 0);
        assert_eq!(s.displayed(), Some(&doc_a()));
        assert_eq!(s.window_len(), 6);

        s.reset();
        assert_eq!(s.window_len(), 0);
        assert!(s.displayed().is_none());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = StabilizerConfig {
            min_window_size_to_decide: 10,
            max_window_size: 4,
            ..Default::default()
        };
        assert!(RectangleStabilizer::new(config).is_err());
    }

    #[test]
    fn decision_serializes_with_tag() {
        let json = serde_json::to_value(Decision::Show(unit_square())).expect("serialize");
        assert_eq!(json["decision"], "show");
        assert_eq!(json["quad"]["top_right"]["x"], 1.0);

        let json = serde_json::to_value(Decision::NoChange).expect("serialize");
        assert_eq!(json["decision"], "no_change");
    }
}
