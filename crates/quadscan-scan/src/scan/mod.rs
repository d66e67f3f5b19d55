// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline: detection, stabilization, the live session loop, and
// manual corner editing.

pub mod detect;
pub mod edit;
pub mod session;
pub mod stabilizer;

pub use detect::RectangleDetector;
pub use stabilizer::{Decision, RectangleStabilizer};
