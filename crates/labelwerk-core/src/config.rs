// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LabelwerkError, Result};

/// Environment variables that override persisted settings.
pub mod env {
    pub const PRINTER: &str = "LABELWERK_PRINTER";
    pub const SPOOLER_URI: &str = "LABELWERK_SPOOLER_URI";
    pub const DPI: &str = "LABELWERK_DPI";
    pub const FONT_PATH: &str = "LABELWERK_FONT_PATH";
    pub const FONT_SIZE: &str = "LABELWERK_FONT_SIZE";
    pub const LABEL_SIZE: &str = "LABELWERK_LABEL_SIZE";
    pub const MEMORY_FILE: &str = "LABEL_MEMORY_FILE";
}

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Queue name of the label printer in CUPS.
    pub printer_name: String,
    /// Base IPP URI of the CUPS daemon.
    pub spooler_uri: String,
    /// Raster resolution used when composing labels.
    pub dpi: u32,
    /// TrueType face used for label text; the bundled face is used if this
    /// file cannot be loaded.
    pub font_path: PathBuf,
    pub default_font_size: u32,
    pub default_label_size: String,
    /// Job name shown in the spooler queue.
    pub job_title: String,
    /// Saved-label memory file; `None` means `saved_labels.json` in the
    /// data directory.
    pub memory_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            printer_name: "dymo".into(),
            spooler_uri: "ipp://localhost:631".into(),
            dpi: 300,
            font_path: PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
            default_font_size: crate::types::DEFAULT_FONT_SIZE,
            default_label_size: crate::labels::DEFAULT_LABEL_SIZE.into(),
            job_title: "Label".into(),
            memory_file: None,
        }
    }
}

impl AppConfig {
    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the process environment in
    /// production, a map in tests). Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(env::PRINTER) {
            self.printer_name = v;
        }
        if let Some(v) = get(env::SPOOLER_URI) {
            self.spooler_uri = v;
        }
        if let Some(v) = get(env::DPI) {
            self.dpi = parse_positive(env::DPI, &v)?;
        }
        if let Some(v) = get(env::FONT_PATH) {
            self.font_path = PathBuf::from(v);
        }
        if let Some(v) = get(env::FONT_SIZE) {
            self.default_font_size = parse_positive(env::FONT_SIZE, &v)?;
        }
        if let Some(v) = get(env::LABEL_SIZE) {
            crate::labels::resolve(&v)?;
            self.default_label_size = v;
        }
        if let Some(v) = get(env::MEMORY_FILE) {
            self.memory_file = Some(PathBuf::from(v));
        }

        debug!(config = ?self, "configuration overrides applied");
        Ok(())
    }
}

fn parse_positive(key: &str, value: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(LabelwerkError::Config(format!(
            "{key} must be a positive integer, got '{value}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_deployment() {
        let config = AppConfig::default();
        assert_eq!(config.printer_name, "dymo");
        assert_eq!(config.dpi, 300);
        assert_eq!(config.default_font_size, 40);
        assert_eq!(config.default_label_size, "11354");
        assert_eq!(config.spooler_uri, "ipp://localhost:631");
    }

    #[test]
    fn env_overrides_replace_defaults() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(lookup(&[
                (env::PRINTER, "dymo450"),
                (env::SPOOLER_URI, "ipp://cups.local:631/"),
                (env::DPI, "600"),
                (env::LABEL_SIZE, "99012"),
                (env::MEMORY_FILE, "/var/lib/labelwerk/memory.json"),
            ]))
            .expect("overrides");

        assert_eq!(config.dpi, 600);
        assert_eq!(config.default_label_size, "99012");
        assert_eq!(
            config.memory_file.as_deref(),
            Some(std::path::Path::new("/var/lib/labelwerk/memory.json"))
        );
        assert_eq!(config.printer_name, "dymo450");
        assert_eq!(config.spooler_uri, "ipp://cups.local:631/");
    }

    #[test]
    fn malformed_numbers_are_config_errors() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(lookup(&[(env::DPI, "lots")]))
            .expect_err("bad dpi");
        assert!(matches!(err, LabelwerkError::Config(_)));

        let err = config
            .apply_overrides(lookup(&[(env::FONT_SIZE, "0")]))
            .expect_err("zero font size");
        assert!(matches!(err, LabelwerkError::Config(_)));
    }

    #[test]
    fn unknown_default_label_size_is_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(lookup(&[(env::LABEL_SIZE, "12345")]))
            .expect_err("unknown size");
        assert!(matches!(err, LabelwerkError::UnknownLabelSize(_)));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"dpi": 203}"#).expect("parse");
        assert_eq!(config.dpi, 203);
        assert_eq!(config.printer_name, "dymo");
    }
}
