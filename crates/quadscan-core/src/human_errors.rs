// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the scanning UI.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how the host app presents it.

use crate::error::QuadscanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Momentary problem; trying again usually works.
    Transient,
    /// User must do something (grant access, free the camera).
    ActionRequired,
    /// Cannot be fixed by retrying or user action.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the host may retry on its own.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `QuadscanError` into a `HumanError` for display.
pub fn humanize_error(err: &QuadscanError) -> HumanError {
    match err {
        // -- Camera --
        QuadscanError::Authorization => HumanError {
            message: "The app isn't allowed to use the camera.".into(),
            suggestion: "Open your device settings and allow camera access for this app, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        QuadscanError::InputDevice => HumanError {
            message: "The camera couldn't be started.".into(),
            suggestion: "Close other apps that might be using the camera, then try again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        QuadscanError::Capture => HumanError {
            message: "The picture couldn't be taken.".into(),
            suggestion: "Hold the device steady and try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        QuadscanError::ImageCreation => HumanError {
            message: "The captured picture couldn't be processed.".into(),
            suggestion: "Try taking the picture again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        // -- Detection --
        QuadscanError::Detection(_) => HumanError {
            message: "We couldn't find the document edges.".into(),
            suggestion: "Place the document on a plain, contrasting surface with good lighting.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        // -- Configuration --
        QuadscanError::InvalidConfig(detail) => HumanError {
            message: "The scanner settings aren't valid.".into(),
            suggestion: format!("Reset the scanner settings to their defaults. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        QuadscanError::SessionClosed => HumanError {
            message: "The scanner was stopped.".into(),
            suggestion: "Open the scanner again to continue.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Storage --
        QuadscanError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to read that file.".into(),
                    suggestion: "Check the file permissions, or try copying the file to a different location first.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        QuadscanError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}
