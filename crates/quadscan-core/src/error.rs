// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for quadscan.

use thiserror::Error;

/// Top-level error type for all quadscan operations.
///
/// The stabilizer itself never fails; these errors come from the pieces
/// around it (camera, detector, configuration, persistence).
#[derive(Debug, Error)]
pub enum QuadscanError {
    // -- Camera errors --
    #[error("camera access was not authorized")]
    Authorization,

    #[error("could not set up the capture input device")]
    InputDevice,

    #[error("could not capture picture")]
    Capture,

    #[error("could not create image from captured frame")]
    ImageCreation,

    // -- Detection --
    #[error("rectangle detection failed: {0}")]
    Detection(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Session --
    #[error("scan session is closed")]
    SessionClosed,

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, QuadscanError>;
