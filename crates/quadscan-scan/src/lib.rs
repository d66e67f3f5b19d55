// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// quadscan-scan — Live document detection for camera scanning.
//
// Provides the rectangle stabilizer that filters per-frame detections into
// overlay and auto-capture decisions, the detector seam, a threaded scan
// session, and post-capture corner editing.

pub mod scan;

// Re-export the primary types so callers can use `quadscan_scan::RectangleStabilizer` etc.
pub use scan::detect::RectangleDetector;
pub use scan::edit::CornerEditor;
pub use scan::session::{FrameSource, ScanEvent, ScanHandle, ScanSession, SourceFrame};
pub use scan::stabilizer::{Decision, RectangleStabilizer};
