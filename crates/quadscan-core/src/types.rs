// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for quadscan: the document quadrilateral and its corners.

use serde::{Deserialize, Serialize};

use crate::geometry::{Affine, Point, Rect, Size};

/// One of the four named corners of a [`Quadrilateral`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CornerPosition {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl CornerPosition {
    /// All corners in the cyclic polygon order used by distance math.
    pub const ALL: [CornerPosition; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomRight,
        Self::BottomLeft,
    ];
}

/// Four corner points of a detected (or user-adjusted) document.
///
/// The points are not required to be convex or non-degenerate. Distance
/// computations compare corners by role, in the order
/// top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quadrilateral {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl Quadrilateral {
    pub const fn new(
        top_left: Point,
        top_right: Point,
        bottom_right: Point,
        bottom_left: Point,
    ) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Axis-aligned rectangle as a quadrilateral.
    pub fn from_rect(rect: &Rect) -> Self {
        Self::new(
            Point::new(rect.min_x(), rect.min_y()),
            Point::new(rect.max_x(), rect.min_y()),
            Point::new(rect.max_x(), rect.max_y()),
            Point::new(rect.min_x(), rect.max_y()),
        )
    }

    /// Corners in cyclic order: top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    pub fn corner(&self, position: CornerPosition) -> Point {
        match position {
            CornerPosition::TopLeft => self.top_left,
            CornerPosition::TopRight => self.top_right,
            CornerPosition::BottomRight => self.bottom_right,
            CornerPosition::BottomLeft => self.bottom_left,
        }
    }

    /// A copy with one corner replaced.
    pub fn with_corner(mut self, position: CornerPosition, point: Point) -> Self {
        match position {
            CornerPosition::TopLeft => self.top_left = point,
            CornerPosition::TopRight => self.top_right = point,
            CornerPosition::BottomRight => self.bottom_right = point,
            CornerPosition::BottomLeft => self.bottom_left = point,
        }
        self
    }

    /// Whether every corner lies within `distance` of the same corner of
    /// `other`. This is a per-corner bound, not a centroid or perimeter test.
    pub fn is_within(&self, distance: f64, other: &Quadrilateral) -> bool {
        self.corners()
            .iter()
            .zip(other.corners().iter())
            .all(|(a, b)| a.distance(b) <= distance)
    }

    /// Sum of the four edge lengths in cyclic order.
    pub fn perimeter(&self) -> f64 {
        let c = self.corners();
        (0..4).map(|i| c[i].distance(&c[(i + 1) % 4])).sum()
    }

    /// Relabel the corners so that each name matches its position: the two
    /// points with the smallest y are the top pair, and within each pair the
    /// smaller x is the left one.
    pub fn reorganize(&mut self) {
        let mut by_y = self.corners();
        by_y.sort_by(|a, b| a.y.total_cmp(&b.y));

        let mut top = [by_y[0], by_y[1]];
        let mut bottom = [by_y[2], by_y[3]];
        top.sort_by(|a, b| a.x.total_cmp(&b.x));
        bottom.sort_by(|a, b| a.x.total_cmp(&b.x));

        *self = Self::new(top[0], top[1], bottom[1], bottom[0]);
    }

    /// Reorganized copy; see [`Quadrilateral::reorganize`].
    pub fn reorganized(mut self) -> Self {
        self.reorganize();
        self
    }

    /// Flip the y axis inside a frame of `height` (bottom-left origin <->
    /// top-left origin).
    pub fn to_cartesian(&self, height: f64) -> Self {
        self.map_points(|p| p.to_cartesian(height))
    }

    pub fn apply(&self, transform: &Affine) -> Self {
        self.map_points(|p| transform.apply_point(p))
    }

    /// Apply each transform in turn.
    pub fn apply_all(&self, transforms: &[Affine]) -> Self {
        let combined = transforms
            .iter()
            .fold(Affine::identity(), |acc, t| acc.then(t));
        self.apply(&combined)
    }

    /// Map the quad from an image of size `from` to one of size `to`.
    ///
    /// With a non-zero `angle` (other than pi) the source is treated as
    /// rotated: its size is transposed before computing the scale, then the
    /// quad is rotated by `angle` and re-centred on the target bounds.
    pub fn scale(&self, from: Size, to: Size, angle: f64) -> Self {
        let inverted = if angle != 0.0 && angle != std::f64::consts::PI {
            from.transposed()
        } else {
            from
        };
        let magnitude = inverted.to_magnitude();
        let scaling = Affine::scale(to.width / magnitude.width, to.height / magnitude.height);
        let scaled = self.apply(&scaling);

        if angle == 0.0 {
            return scaled;
        }

        let rotation = Affine::rotate(angle);
        let from_bounds = Rect::from_size(from)
            .transformed(&scaling)
            .transformed(&rotation);
        let translation = Affine::center_translation(&from_bounds, &Rect::from_size(to));

        scaled.apply_all(&[rotation, translation])
    }

    pub fn is_finite(&self) -> bool {
        self.corners().iter().all(Point::is_finite)
    }

    fn map_points(&self, f: impl Fn(&Point) -> Point) -> Self {
        Self::new(
            f(&self.top_left),
            f(&self.top_right),
            f(&self.bottom_right),
            f(&self.bottom_left),
        )
    }
}

impl std::fmt::Display for Quadrilateral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[tl=({:.1}, {:.1}) tr=({:.1}, {:.1}) br=({:.1}, {:.1}) bl=({:.1}, {:.1})]",
            self.top_left.x,
            self.top_left.y,
            self.top_right.x,
            self.top_right.y,
            self.bottom_right.x,
            self.bottom_right.y,
            self.bottom_left.x,
            self.bottom_left.y,
        )
    }
}

impl Point {
    /// The corner of `quad` closest to this point (first in cyclic order on
    /// a tie).
    pub fn closest_corner(&self, quad: &Quadrilateral) -> CornerPosition {
        let mut best = CornerPosition::TopLeft;
        let mut best_distance = self.distance(&quad.top_left);
        for position in &CornerPosition::ALL[1..] {
            let d = self.distance(&quad.corner(*position));
            if d < best_distance {
                best = *position;
                best_distance = d;
            }
        }
        best
    }
}
