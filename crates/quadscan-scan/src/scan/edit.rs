// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Manual corner editing after capture.
//
// The host forwards touch positions in view coordinates; the editor moves the
// nearest corner by the touch delta and keeps it inside the view.

use quadscan_core::geometry::{Point, Rect, Size};
use quadscan_core::types::{CornerPosition, Quadrilateral};
use tracing::debug;

/// Magnification of the loupe shown while dragging a corner.
pub const ZOOM_SCALE_FACTOR: f64 = 2.5;

/// Drag state for adjusting a quadrilateral's corners.
#[derive(Debug, Clone)]
pub struct CornerEditor {
    quad: Quadrilateral,
    bounds: Size,
    active: Option<CornerPosition>,
    last_touch: Option<Point>,
}

impl CornerEditor {
    pub fn new(quad: Quadrilateral, bounds: Size) -> Self {
        Self {
            quad,
            bounds,
            active: None,
            last_touch: None,
        }
    }

    /// The quad with every drag so far applied.
    pub fn quad(&self) -> Quadrilateral {
        self.quad
    }

    /// Area the corners are clamped into.
    pub fn bounds(&self) -> Size {
        self.bounds
    }

    /// Corner locked by the current drag, if any.
    pub fn active_corner(&self) -> Option<CornerPosition> {
        self.active
    }

    /// Lock the corner closest to `touch` for the rest of the drag.
    pub fn begin_drag(&mut self, touch: Point) -> CornerPosition {
        let corner = touch.closest_corner(&self.quad);
        debug!(?corner, "corner drag started");
        self.active = Some(corner);
        self.last_touch = Some(touch);
        corner
    }

    /// Move the locked corner by the distance the touch travelled since the
    /// previous event. A drag without `begin_drag` starts one here.
    pub fn drag_to(&mut self, touch: Point) -> Quadrilateral {
        let corner = match self.active {
            Some(corner) => corner,
            None => self.begin_drag(touch),
        };
        let previous = self.last_touch.unwrap_or(touch);

        let moved = self
            .quad
            .corner(corner)
            .translated(touch.x - previous.x, touch.y - previous.y)
            .clamped(self.bounds);
        self.quad = self.quad.with_corner(corner, moved);
        self.last_touch = Some(touch);
        self.quad
    }

    /// Release the locked corner.
    pub fn end_drag(&mut self) {
        self.active = None;
        self.last_touch = None;
    }

    /// The edited quad with corner labels matching their positions.
    pub fn finish(self) -> Quadrilateral {
        self.quad.reorganized()
    }

    /// The edited quad mapped from view space into an image of
    /// `image_size` pixels, ready for perspective correction.
    pub fn finish_for_image(self, image_size: Size) -> Quadrilateral {
        self.quad.scale(self.bounds, image_size, 0.0).reorganized()
    }
}

/// Region of the image to magnify around `point` (in view coordinates).
///
/// The point is scaled into image pixels and the returned rectangle, centred
/// on it, covers the view size divided by [`ZOOM_SCALE_FACTOR`].
pub fn loupe_rect(point: Point, view_size: Size, image_size: Size) -> Rect {
    let view = view_size.to_magnitude();
    let centre = Point::new(
        point.x * image_size.width / view.width,
        point.y * image_size.height / view.height,
    );
    let size = Size::new(
        view_size.width / ZOOM_SCALE_FACTOR,
        view_size.height / ZOOM_SCALE_FACTOR,
    );
    Rect::new(
        Point::new(centre.x - size.width / 2.0, centre.y - size.height / 2.0),
        size,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> CornerEditor {
        let quad = Quadrilateral::from_rect(&Rect::new(Point::new(10.0, 10.0), Size::new(80.0, 80.0)));
        CornerEditor::new(quad, Size::new(100.0, 100.0))
    }

    #[test]
    fn drag_moves_nearest_corner_by_delta() {
        let mut e = editor();
        assert_eq!(e.begin_drag(Point::new(85.0, 88.0)), CornerPosition::BottomRight);

        let quad = e.drag_to(Point::new(80.0, 78.0));
        assert_eq!(quad.bottom_right, Point::new(85.0, 80.0));
        assert_eq!(quad.top_left, Point::new(10.0, 10.0));
    }

    #[test]
    fn locked_corner_survives_crossing_another() {
        let mut e = editor();
        e.begin_drag(Point::new(12.0, 12.0));
        // Dragging far past the top-right corner still moves the top-left.
        let quad = e.drag_to(Point::new(95.0, 12.0));
        assert_eq!(e.active_corner(), Some(CornerPosition::TopLeft));
        assert_eq!(quad.top_left, Point::new(93.0, 10.0));
    }

    #[test]
    fn corners_stay_inside_bounds() {
        let mut e = editor();
        e.begin_drag(Point::new(10.0, 10.0));
        let quad = e.drag_to(Point::new(-50.0, -50.0));
        assert_eq!(quad.top_left, Point::new(0.0, 0.0));
    }

    #[test]
    fn first_drag_event_without_begin_is_still() {
        let mut e = editor();
        let quad = e.drag_to(Point::new(88.0, 12.0));
        assert_eq!(quad, editor().quad());
        assert_eq!(e.active_corner(), Some(CornerPosition::TopRight));

        e.end_drag();
        assert_eq!(e.active_corner(), None);
    }

    #[test]
    fn finish_relabels_corners() {
        let mut e = editor();
        e.begin_drag(Point::new(10.0, 10.0));
        e.drag_to(Point::new(100.0, 100.0));
        e.end_drag();
        // Top-left now sits below and right of bottom-right.
        let quad = e.finish();
        assert_eq!(quad.bottom_right, Point::new(100.0, 100.0));
        assert_eq!(quad.top_left, Point::new(90.0, 10.0));
    }

    #[test]
    fn finish_for_image_scales_up() {
        let e = editor();
        let quad = e.finish_for_image(Size::new(1000.0, 2000.0));
        assert_eq!(quad.top_left, Point::new(100.0, 200.0));
        assert_eq!(quad.bottom_right, Point::new(900.0, 1800.0));
    }

    #[test]
    fn loupe_is_centred_in_image_space() {
        let rect = loupe_rect(
            Point::new(50.0, 100.0),
            Size::new(100.0, 200.0),
            Size::new(1000.0, 2000.0),
        );
        assert_eq!(rect.size, Size::new(40.0, 80.0));
        assert_eq!(rect.mid(), Point::new(500.0, 1000.0));
    }
}
