// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectangle detection seam and per-frame observation selection.
//
// Detectors report quadrilaterals in normalized coordinates (0..1 on both
// axes) with a bottom-left origin. Before the stabilizer sees them they are
// reduced to the single largest candidate, scaled to image pixels, and
// flipped to a top-left origin.

use quadscan_core::config::DetectionConfig;
use quadscan_core::error::Result;
use quadscan_core::geometry::{Affine, Size};
use quadscan_core::types::Quadrilateral;
use tracing::{trace, warn};

/// A source of rectangle candidates for one frame.
pub trait RectangleDetector {
    /// The frame representation this detector consumes.
    type Frame;

    /// Apply detection parameters. Detectors that have no tunables can
    /// ignore this.
    fn configure(&mut self, _config: &DetectionConfig) {}

    /// Detect rectangles in `frame`, in normalized bottom-left-origin
    /// coordinates.
    fn detect(&mut self, frame: &Self::Frame) -> Result<Vec<Quadrilateral>>;
}

/// The candidate with the largest perimeter. On equal perimeters the first
/// one reported wins.
pub fn largest_by_perimeter<I>(detections: I) -> Option<Quadrilateral>
where
    I: IntoIterator<Item = Quadrilateral>,
{
    let mut best: Option<(Quadrilateral, f64)> = None;
    for quad in detections {
        let perimeter = quad.perimeter();
        match best {
            Some((_, largest)) if perimeter <= largest => {}
            _ => best = Some((quad, perimeter)),
        }
    }
    best.map(|(quad, _)| quad)
}

/// Scale a normalized quad to pixel coordinates of `image_size`.
pub fn to_image_space(quad: &Quadrilateral, image_size: Size) -> Quadrilateral {
    quad.apply(&Affine::scale(image_size.width, image_size.height))
}

/// Reduce one frame's detections to the stabilizer's observation: the
/// largest finite candidate, in top-left-origin image pixels.
pub fn observation_from_detections(
    detections: Vec<Quadrilateral>,
    image_size: Size,
) -> Option<Quadrilateral> {
    let count = detections.len();
    let finite = detections.into_iter().filter(|q| {
        let ok = q.is_finite();
        if !ok {
            warn!(quad = %q, "discarding non-finite detection");
        }
        ok
    });

    let largest = largest_by_perimeter(finite)?;
    let observation = to_image_space(&largest, image_size).to_cartesian(image_size.height);
    trace!(candidates = count, quad = %observation, "frame observation");
    Some(observation)
}

/// Run `detector` on `frame` and reduce the result. A failed detection is
/// logged and treated as a frame with no rectangle.
pub fn detect_observation<D>(
    detector: &mut D,
    frame: &D::Frame,
    image_size: Size,
) -> Option<Quadrilateral>
where
    D: RectangleDetector + ?Sized,
{
    match detector.detect(frame) {
        Ok(detections) => observation_from_detections(detections, image_size),
        Err(e) => {
            warn!(error = %e, "rectangle detection failed");
            None
        }
    }
}
