// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages and response classification.
//
// Every error is mapped to a plain English message with a suggestion, plus a
// class that decides the HTTP status the route layer answers with: client
// input problems are 4xx, a failing spooler is a dependency error (5xx).

use crate::error::LabelwerkError;

/// Who is responsible for an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request itself was wrong; resending it unchanged will fail again.
    ClientInput,
    /// The print spooler or printer failed.
    Dependency,
    /// Something inside Labelwerk failed (storage, encoding, config).
    Internal,
}

impl ErrorClass {
    /// HTTP status code the route layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ClientInput => 400,
            Self::Dependency => 502,
            Self::Internal => 500,
        }
    }
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    pub class: ErrorClass,
}

/// Classify an error without building the full message.
pub fn classify(err: &LabelwerkError) -> ErrorClass {
    match err {
        LabelwerkError::UnknownLabelSize(_)
        | LabelwerkError::EmptyText
        | LabelwerkError::InvalidRequest(_) => ErrorClass::ClientInput,
        LabelwerkError::PrintSubmissionFailed(_) => ErrorClass::Dependency,
        LabelwerkError::ImageError(_)
        | LabelwerkError::Io(_)
        | LabelwerkError::Serialization(_)
        | LabelwerkError::Config(_) => ErrorClass::Internal,
    }
}

/// Convert a `LabelwerkError` into a `HumanError`.
pub fn humanize_error(err: &LabelwerkError) -> HumanError {
    let class = classify(err);
    let (message, suggestion) = match err {
        LabelwerkError::UnknownLabelSize(code) => (
            format!("Label size {code} isn't supported."),
            "Pick one of the label sizes from the list.".to_string(),
        ),

        LabelwerkError::EmptyText => (
            "There's nothing to print.".to_string(),
            "Type the text for your label, then try again.".to_string(),
        ),

        LabelwerkError::InvalidRequest(detail) => (
            "Some label settings aren't valid.".to_string(),
            format!("Check the font size, alignment and copies. ({detail})"),
        ),

        LabelwerkError::PrintSubmissionFailed(detail) => humanize_spooler_failure(detail),

        LabelwerkError::ImageError(_) => (
            "The label picture couldn't be created.".to_string(),
            "Try again. If this keeps happening, please report it.".to_string(),
        ),

        LabelwerkError::Io(io_err) if io_err.kind() == std::io::ErrorKind::PermissionDenied => (
            "Labelwerk can't write its data files.".to_string(),
            "Check the permissions of the data directory.".to_string(),
        ),

        LabelwerkError::Io(_) | LabelwerkError::Serialization(_) => (
            "Saved labels couldn't be updated.".to_string(),
            "Try again. If this keeps happening, the disk may be full.".to_string(),
        ),

        LabelwerkError::Config(detail) => (
            "Labelwerk is misconfigured.".to_string(),
            format!("Fix the setting and restart. ({detail})"),
        ),
    };

    HumanError {
        message,
        suggestion,
        class,
    }
}

/// Turn a CUPS/IPP failure description into something actionable.
fn humanize_spooler_failure(detail: &str) -> (String, String) {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("connection refused") {
        (
            "The print service isn't running.".to_string(),
            "Start CUPS (or restart the container), then try again.".to_string(),
        )
    } else if lower.contains("not-found") || lower.contains("not found") {
        (
            "The label printer isn't set up in the print service.".to_string(),
            "Check that the Dymo printer is registered in CUPS.".to_string(),
        )
    } else if lower.contains("not-accepting") || lower.contains("stopped") {
        (
            "The label printer is paused.".to_string(),
            "Resume the printer queue in CUPS, then try again.".to_string(),
        )
    } else if lower.contains("media") {
        (
            "The printer doesn't accept that label size.".to_string(),
            "Check that the loaded label roll matches the selected size.".to_string(),
        )
    } else {
        (
            "The printer had a problem.".to_string(),
            format!("Check the printer is on and connected, then try again. (Detail: {detail})"),
        )
    }
}
