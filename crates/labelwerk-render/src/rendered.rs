// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// A composed label raster and its encodings.

use std::io::{Seek, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbImage};

use labelwerk_core::error::{LabelwerkError, Result};

/// Pixel buffer of one composed label plus the resolution it was drawn at.
///
/// Owned by the request that composed it; never shared.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLabel {
    image: RgbImage,
    dpi: u32,
}

impl RenderedLabel {
    pub fn new(image: RgbImage, dpi: u32) -> Self {
        Self { image, dpi }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Encode as PNG into any seekable writer.
    pub fn write_png<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        self.image
            .write_to(writer, ImageFormat::Png)
            .map_err(|err| LabelwerkError::ImageError(format!("PNG encoding failed: {err}")))
    }

    /// Encode as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        self.write_png(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// `data:image/png;base64,...` URL, usable directly as an `<img src>`.
    pub fn to_data_url(&self) -> Result<String> {
        let png = self.to_png_bytes()?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }

    /// Write the label to a PNG file.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        self.image
            .save_with_format(path.as_ref(), ImageFormat::Png)
            .map_err(|err| {
                LabelwerkError::ImageError(format!(
                    "failed to save label to {}: {err}",
                    path.as_ref().display()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;

    const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    fn sample() -> RenderedLabel {
        let mut image = RgbImage::from_pixel(12, 8, Rgb([255, 255, 255]));
        image.put_pixel(3, 4, Rgb([0, 0, 0]));
        RenderedLabel::new(image, 300)
    }

    #[test]
    fn png_bytes_decode_to_same_pixels() {
        let label = sample();
        let png = label.to_png_bytes().expect("encode");
        assert!(png.starts_with(PNG_SIGNATURE));

        let decoded = image::load_from_memory(&png).expect("decode").to_rgb8();
        assert_eq!(&decoded, label.image());
    }

    #[test]
    fn data_url_has_png_prefix() {
        let url = sample().to_data_url().expect("data url");
        assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn save_writes_png_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("label.png");
        sample().save(&path).expect("save");
        let bytes = std::fs::read(&path).expect("read back");
        assert!(bytes.starts_with(PNG_SIGNATURE));
    }
}
