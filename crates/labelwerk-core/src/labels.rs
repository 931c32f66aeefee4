// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label-size registry.
//
// Maps a Dymo label code (the number printed on the label roll) to its
// physical dimensions and the CUPS media keyword the Dymo driver expects.
// The table is static; an unknown code is always an error, never a default.

use crate::error::{LabelwerkError, Result};

/// Millimetres per inch, used for DPI conversion.
pub const MM_PER_INCH: f64 = 25.4;

/// Physical description of one Dymo label stock.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSizeSpec {
    /// Label code, e.g. `"11354"`.
    pub code: &'static str,
    /// Human-readable name shown in label pickers.
    pub name: &'static str,
    pub width_mm: f64,
    pub height_mm: f64,
    /// CUPS `media` keyword, passed verbatim to the spooler.
    pub media_code: &'static str,
}

impl LabelSizeSpec {
    /// Pixel dimensions (width, height) of this label at `dpi`.
    ///
    /// Each side is `round(mm * dpi / 25.4)`, computed independently.
    pub fn pixel_dimensions(&self, dpi: u32) -> (u32, u32) {
        (mm_to_px(self.width_mm, dpi), mm_to_px(self.height_mm, dpi))
    }
}

/// Convert a millimetre measurement to whole pixels at `dpi`.
pub fn mm_to_px(mm: f64, dpi: u32) -> u32 {
    let px = (mm * f64::from(dpi) / MM_PER_INCH).round();
    if px <= 0.0 { 0 } else { px as u32 }
}

/// Supported label stocks, in the order they are presented to users.
static LABEL_SIZES: [LabelSizeSpec; 5] = [
    LabelSizeSpec {
        code: "11354",
        name: "2-1/4\" x 1-1/4\" (57x32mm) Multipurpose",
        width_mm: 57.0,
        height_mm: 32.0,
        media_code: "w162h90",
    },
    LabelSizeSpec {
        code: "30252",
        name: "1-1/8\" x 3-1/2\" (28x89mm) Address",
        width_mm: 28.0,
        height_mm: 89.0,
        media_code: "w79h252",
    },
    LabelSizeSpec {
        code: "30323",
        name: "2-1/8\" x 4\" (54x101mm) Shipping",
        width_mm: 54.0,
        height_mm: 101.0,
        media_code: "w153h286",
    },
    LabelSizeSpec {
        code: "30256",
        name: "2-5/16\" x 4\" (59x101mm) Shipping",
        width_mm: 59.0,
        height_mm: 101.0,
        media_code: "w167h286",
    },
    LabelSizeSpec {
        code: "99012",
        name: "3-1/2\" x 1-1/8\" (89x36mm) Large Address",
        width_mm: 89.0,
        height_mm: 36.0,
        media_code: "w252h102",
    },
];

/// Label code used when a request does not name one.
pub const DEFAULT_LABEL_SIZE: &str = "11354";

/// Look up the stock registered under `code`.
pub fn resolve(code: &str) -> Result<&'static LabelSizeSpec> {
    LABEL_SIZES
        .iter()
        .find(|spec| spec.code == code)
        .ok_or_else(|| LabelwerkError::UnknownLabelSize(code.to_string()))
}

/// All registered stocks.
pub fn all() -> &'static [LabelSizeSpec] {
    &LABEL_SIZES
}
