// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plane geometry primitives: points, sizes, rectangles, and 2D affine
// transforms. Coordinates are `f64` pixels unless stated otherwise.

use nalgebra::{Matrix3, Point2, Rotation2, Translation2, Vector2};
use serde::{Deserialize, Serialize};

/// A 2D coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Whether both axis offsets to `other` are at most `delta`.
    pub fn is_within(&self, delta: f64, other: &Point) -> bool {
        (self.x - other.x).abs() <= delta && (self.y - other.y).abs() <= delta
    }

    /// The same point with the y axis flipped inside a frame of `height`.
    pub fn to_cartesian(&self, height: f64) -> Self {
        Self::new(self.x, height - self.y)
    }

    /// Offset by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Clamp into `[0, bounds.width] x [0, bounds.height]`.
    pub fn clamped(&self, bounds: Size) -> Self {
        Self::new(
            self.x.clamp(0.0, bounds.width.max(0.0)),
            self.y.clamp(0.0, bounds.height.max(0.0)),
        )
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Width and height of an image or view.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width and height swapped (portrait <-> landscape).
    pub fn transposed(&self) -> Self {
        Self::new(self.height, self.width)
    }

    /// Non-positive dimensions replaced by the smallest positive `f64`, so the
    /// size can be used as a divisor.
    pub fn to_magnitude(&self) -> Self {
        let clamp = |v: f64| if v <= 0.0 { f64::MIN_POSITIVE } else { v };
        Self::new(clamp(self.width), clamp(self.height))
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Rectangle at the origin with the given size.
    pub const fn from_size(size: Size) -> Self {
        Self::new(Point::ZERO, size)
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn mid(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// Smallest rectangle containing every point, or `None` for an empty set.
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(
            Point::new(min_x, min_y),
            Size::new(max_x - min_x, max_y - min_y),
        ))
    }

    /// Bounding box of this rectangle after `transform`.
    pub fn transformed(&self, transform: &Affine) -> Self {
        let corners = [
            Point::new(self.min_x(), self.min_y()),
            Point::new(self.max_x(), self.min_y()),
            Point::new(self.max_x(), self.max_y()),
            Point::new(self.min_x(), self.max_y()),
        ]
        .map(|p| transform.apply_point(&p));
        Self::bounding(&corners).unwrap_or(*self)
    }
}

/// 2D affine transform, stored as a homogeneous 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine(Matrix3<f64>);

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine {
    pub fn identity() -> Self {
        Self(Matrix3::identity())
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self(Matrix3::new_nonuniform_scaling(&Vector2::new(sx, sy)))
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self(Translation2::new(tx, ty).to_homogeneous())
    }

    /// Counter-clockwise rotation by `angle` radians (clockwise on screen,
    /// where y points down).
    pub fn rotate(angle: f64) -> Self {
        Self(Rotation2::new(angle).to_homogeneous())
    }

    /// Translation moving the centre of `from` onto the centre of `to`.
    pub fn center_translation(from: &Rect, to: &Rect) -> Self {
        let (f, t) = (from.mid(), to.mid());
        Self::translate(t.x - f.x, t.y - f.y)
    }

    /// `self` followed by `next`.
    pub fn then(&self, next: &Affine) -> Self {
        Self(next.0 * self.0)
    }

    pub fn apply_point(&self, p: &Point) -> Point {
        let mapped = self.0.transform_point(&Point2::new(p.x, p.y));
        Point::new(mapped.x, mapped.y)
    }
}
