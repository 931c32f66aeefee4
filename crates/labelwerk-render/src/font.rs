// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Font resolution for label text.
//
// Resolution is two explicit steps: try the configured TrueType file, and if
// it is missing or unparseable use the face compiled into the binary. Text is
// therefore always renderable, and which face was used is recorded on the
// returned handle.

use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc, PxScale};
use tracing::{debug, instrument, warn};

use labelwerk_core::error::{LabelwerkError, Result};

/// DejaVu Sans Mono, bundled so labels render on hosts without the
/// configured font installed. See `assets/DejaVu-LICENSE.txt`.
static BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

/// Where a resolved face came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// Loaded from the configured file.
    Configured(PathBuf),
    /// The face compiled into the binary.
    Bundled,
}

/// A font handle ready for layout.
#[derive(Clone)]
pub struct LabelFont {
    font: FontArc,
    source: FontSource,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelFont")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl LabelFont {
    /// Resolve the face for label text: the file at `configured` if it loads,
    /// otherwise the bundled face.
    ///
    /// Only fails if the bundled face itself is unusable.
    #[instrument(skip_all, fields(path = %configured.as_ref().display()))]
    pub fn resolve(configured: impl AsRef<Path>) -> Result<Self> {
        let path = configured.as_ref();
        match Self::from_file(path) {
            Ok(font) => {
                debug!("using configured font");
                Ok(font)
            }
            Err(err) => {
                warn!(error = %err, "configured font unavailable, using bundled face");
                Self::bundled()
            }
        }
    }

    /// Load a TrueType/OpenType face from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let font = FontArc::try_from_vec(data).map_err(|err| {
            LabelwerkError::ImageError(format!("invalid font {}: {err}", path.display()))
        })?;
        Ok(Self {
            font,
            source: FontSource::Configured(path.to_path_buf()),
        })
    }

    /// The face compiled into the binary.
    pub fn bundled() -> Result<Self> {
        let font = FontArc::try_from_slice(BUNDLED_FONT)
            .map_err(|err| LabelwerkError::ImageError(format!("bundled font: {err}")))?;
        Ok(Self {
            font,
            source: FontSource::Bundled,
        })
    }

    pub fn source(&self) -> &FontSource {
        &self.source
    }

    pub fn font(&self) -> &FontArc {
        &self.font
    }

    /// Scale at which one em spans `size` pixels.
    ///
    /// `PxScale` measures ascent-to-descent height, so the em size is
    /// converted through the face's own metrics.
    pub fn em_scale(&self, size: u32) -> PxScale {
        let em = size as f32;
        let height = self.font.height_unscaled();
        match self.font.units_per_em() {
            Some(units) if units > 0.0 && height > 0.0 => PxScale::from(em * height / units),
            _ => PxScale::from(em),
        }
    }
}
