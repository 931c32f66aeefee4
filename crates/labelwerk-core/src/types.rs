// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Labelwerk label service.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LabelwerkError, Result};
use crate::labels::{self, DEFAULT_LABEL_SIZE};

/// Default font size in pixels per em.
pub const DEFAULT_FONT_SIZE: u32 = 40;

/// Font sizes accepted from clients.
pub const FONT_SIZE_RANGE: std::ops::RangeInclusive<u32> = 10..=200;

/// Horizontal placement of label text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

impl Alignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Alignment {
    type Err = LabelwerkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" | "centre" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(LabelwerkError::InvalidRequest(format!(
                "unknown alignment '{other}' (expected left, center or right)"
            ))),
        }
    }
}

/// A label to compose (and possibly print).
///
/// The same five fields form the de-duplication key of the saved-label
/// memory, so `Eq`/`Hash` cover exactly these fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelRequest {
    pub text: String,
    #[serde(default = "default_label_size")]
    pub label_size: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default)]
    pub align: Alignment,
    #[serde(default = "default_copies")]
    pub copies: u32,
}

fn default_label_size() -> String {
    DEFAULT_LABEL_SIZE.to_string()
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

fn default_copies() -> u32 {
    1
}

impl LabelRequest {
    /// A request for `text` with every other field at its default.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label_size: default_label_size(),
            font_size: DEFAULT_FONT_SIZE,
            align: Alignment::default(),
            copies: 1,
        }
    }

    pub fn with_label_size(mut self, code: impl Into<String>) -> Self {
        self.label_size = code.into();
        self
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    pub fn with_copies(mut self, copies: u32) -> Self {
        self.copies = copies;
        self
    }

    /// Client-facing validation, run before anything is composed.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(LabelwerkError::EmptyText);
        }
        if !FONT_SIZE_RANGE.contains(&self.font_size) {
            return Err(LabelwerkError::InvalidRequest(format!(
                "font size {} outside {}..={}",
                self.font_size,
                FONT_SIZE_RANGE.start(),
                FONT_SIZE_RANGE.end()
            )));
        }
        if self.copies == 0 {
            return Err(LabelwerkError::InvalidRequest(
                "copies must be at least 1".into(),
            ));
        }
        labels::resolve(&self.label_size)?;
        Ok(())
    }
}

/// Identifier of a saved label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelId(pub String);

impl LabelId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for LabelId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LabelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A previously printed label kept in the saved-label memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLabelEntry {
    pub id: LabelId,
    #[serde(flatten)]
    pub label: LabelRequest,
    /// Older memory files have no timestamp; those load as the Unix epoch.
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl SavedLabelEntry {
    /// Wrap `label` with a fresh id and the current time.
    pub fn new(label: LabelRequest) -> Self {
        Self {
            id: LabelId::new(),
            label,
            created_at: Utc::now(),
        }
    }
}

/// Job identifier assigned by the print spooler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub i32);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Printer attributes reported by the spooler, flattened to strings.
pub type PrinterAttributes = BTreeMap<String, String>;

/// Outcome of a printer status query.
///
/// None of these are errors: an absent or unreachable printer is a normal,
/// reportable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrinterStatus {
    Found {
        printer: String,
        attributes: PrinterAttributes,
    },
    NotFound {
        printer: String,
    },
    Unavailable {
        printer: String,
        error: String,
    },
}

impl PrinterStatus {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn printer(&self) -> &str {
        match self {
            Self::Found { printer, .. }
            | Self::NotFound { printer }
            | Self::Unavailable { printer, .. } => printer,
        }
    }

    /// The spooler's `printer-state` value, when the printer was found.
    pub fn state(&self) -> Option<&str> {
        match self {
            Self::Found { attributes, .. } => attributes.get("printer-state").map(String::as_str),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_from_json() {
        let req: LabelRequest = serde_json::from_str(r#"{"text":"Hello"}"#).expect("parse");
        assert_eq!(req, LabelRequest::new("Hello"));
        assert_eq!(req.label_size, "11354");
        assert_eq!(req.font_size, 40);
        assert_eq!(req.align, Alignment::Center);
        assert_eq!(req.copies, 1);
    }

    #[test]
    fn alignment_parses_case_insensitively() {
        assert_eq!("LEFT".parse::<Alignment>().expect("left"), Alignment::Left);
        assert_eq!(" right ".parse::<Alignment>().expect("right"), Alignment::Right);
        assert!("middle".parse::<Alignment>().is_err());
    }

    #[test]
    fn whitespace_text_is_rejected() {
        let err = LabelRequest::new("   \n").validate().expect_err("empty");
        assert!(matches!(err, LabelwerkError::EmptyText));
    }

    #[test]
    fn font_size_range_is_enforced_at_validation() {
        assert!(LabelRequest::new("x").with_font_size(10).validate().is_ok());
        assert!(LabelRequest::new("x").with_font_size(200).validate().is_ok());
        assert!(LabelRequest::new("x").with_font_size(9).validate().is_err());
        assert!(LabelRequest::new("x").with_font_size(201).validate().is_err());
    }

    #[test]
    fn zero_copies_is_rejected() {
        let err = LabelRequest::new("x").with_copies(0).validate().expect_err("zero");
        assert!(matches!(err, LabelwerkError::InvalidRequest(_)));
    }

    #[test]
    fn unknown_label_size_is_rejected() {
        let err = LabelRequest::new("x")
            .with_label_size("BAD")
            .validate()
            .expect_err("unknown");
        assert!(matches!(err, LabelwerkError::UnknownLabelSize(_)));
    }

    #[test]
    fn saved_entry_serializes_flat() {
        let entry = SavedLabelEntry::new(LabelRequest::new("Flat"));
        let value = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(value["text"], "Flat");
        assert_eq!(value["align"], "center");
        assert_eq!(value["id"], entry.id.0.as_str());
        assert!(value.get("label").is_none());
    }

    #[test]
    fn saved_entry_without_timestamp_loads_as_epoch() {
        let json = r#"{"id":"abc","text":"Seed","label_size":"11354","font_size":40,"align":"center","copies":1}"#;
        let entry: SavedLabelEntry = serde_json::from_str(json).expect("parse");
        assert_eq!(entry.id, LabelId::from("abc"));
        assert_eq!(entry.created_at, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn printer_status_reports_state() {
        let mut attributes = PrinterAttributes::new();
        attributes.insert("printer-state".into(), "idle".into());
        let status = PrinterStatus::Found {
            printer: "dymo".into(),
            attributes,
        };
        assert!(status.is_found());
        assert_eq!(status.state(), Some("idle"));

        let missing = PrinterStatus::NotFound {
            printer: "dymo".into(),
        };
        assert!(!missing.is_found());
        assert_eq!(missing.printer(), "dymo");
        assert_eq!(missing.state(), None);
    }
}
