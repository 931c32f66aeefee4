// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk: Core types, label-size registry and error definitions shared
// across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod labels;
pub mod types;

pub use config::AppConfig;
pub use error::LabelwerkError;
pub use labels::LabelSizeSpec;
pub use types::*;
