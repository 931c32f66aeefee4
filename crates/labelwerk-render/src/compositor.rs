// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label compositor: text + layout parameters to a label-sized raster.
//
// Canvas size comes from the label-size registry at the requested DPI. Text
// is laid out with `ab_glyph`, thresholded to pure black on white (direct
// thermal printers have no grey), and placed using the ink bounds of the
// laid-out glyphs:
//   - left:   ink starts `TEXT_MARGIN_PX` from the left edge
//   - right:  ink ends `TEXT_MARGIN_PX` from the right edge
//   - center: ink centred horizontally
// The block is always centred vertically, whatever the alignment. Text that
// does not fit is clipped, never wrapped or shrunk.

use ab_glyph::{Font, GlyphId, OutlinedGlyph, PxScale, ScaleFont, point};
use image::{Rgb, RgbImage};
use tracing::{debug, instrument};

use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::labels;
use labelwerk_core::types::{Alignment, LabelRequest};

use crate::font::LabelFont;
use crate::rendered::RenderedLabel;

/// Gap between the text and the canvas edge for left/right alignment.
pub const TEXT_MARGIN_PX: i32 = 20;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FOREGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// Glyph coverage at or above which a pixel is inked.
const COVERAGE_THRESHOLD: f32 = 0.5;

/// Composes label rasters with a resolved font.
#[derive(Debug, Clone)]
pub struct LabelCompositor {
    font: LabelFont,
}

/// Integer pixel bounds, max exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InkBounds {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl InkBounds {
    fn union(self, other: Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    fn height(&self) -> i32 {
        self.max_y - self.min_y
    }
}

/// One laid-out line: outlined glyphs in line-local coordinates.
struct LineLayout {
    glyphs: Vec<OutlinedGlyph>,
    bounds: Option<InkBounds>,
}

impl LabelCompositor {
    /// Resolve the configured font (falling back to the bundled face) and
    /// build a compositor around it.
    pub fn new(font_path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::with_font(LabelFont::resolve(font_path)?))
    }

    pub fn with_font(font: LabelFont) -> Self {
        Self { font }
    }

    pub fn font(&self) -> &LabelFont {
        &self.font
    }

    /// Compose `request` into a raster at `dpi`.
    ///
    /// Fails with `UnknownLabelSize` before allocating anything if the label
    /// code is not registered. Font size and text content are not validated
    /// here; that is the caller's contract.
    #[instrument(skip(self, request), fields(label_size = %request.label_size, font_size = request.font_size, align = %request.align))]
    pub fn compose(&self, request: &LabelRequest, dpi: u32) -> Result<RenderedLabel> {
        let size = labels::resolve(&request.label_size)?;
        if dpi == 0 {
            return Err(LabelwerkError::InvalidRequest("dpi must be positive".into()));
        }

        let (width, height) = size.pixel_dimensions(dpi);
        let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);

        let scale = self.font.em_scale(request.font_size);
        let lines = self.layout_lines(&request.text, scale);

        let block = lines
            .iter()
            .filter_map(|line| line.bounds)
            .reduce(InkBounds::union);

        let Some(block) = block else {
            debug!(width, height, "no visible glyphs, blank label");
            return Ok(RenderedLabel::new(canvas, dpi));
        };

        let canvas_w = width as i32;
        let canvas_h = height as i32;
        let dy = (canvas_h - block.height()).div_euclid(2) - block.min_y;

        for line in &lines {
            let Some(bounds) = line.bounds else { continue };
            let dx = horizontal_offset(request.align, bounds, canvas_w);
            draw_glyphs(&mut canvas, &line.glyphs, dx, dy);
        }

        debug!(width, height, lines = lines.len(), "label composed");
        Ok(RenderedLabel::new(canvas, dpi))
    }

    /// Lay out each `\n`-separated line, with line `i`'s baseline at
    /// `ascent + i * line_advance`.
    fn layout_lines(&self, text: &str, scale: PxScale) -> Vec<LineLayout> {
        let font = self.font.font();
        let scaled = font.as_scaled(scale);
        let line_advance = scaled.height() + scaled.line_gap();

        text.split('\n')
            .enumerate()
            .map(|(index, line)| {
                let baseline = scaled.ascent() + index as f32 * line_advance;
                let mut caret = 0.0_f32;
                let mut previous: Option<GlyphId> = None;
                let mut glyphs = Vec::new();

                for ch in line.chars().filter(|c| !c.is_control()) {
                    let id = scaled.glyph_id(ch);
                    if let Some(prev) = previous {
                        caret += scaled.kern(prev, id);
                    }
                    let glyph = id.with_scale_and_position(scale, point(caret, baseline));
                    caret += scaled.h_advance(id);
                    previous = Some(id);

                    if let Some(outlined) = font.outline_glyph(glyph) {
                        glyphs.push(outlined);
                    }
                }

                let bounds = glyphs.iter().map(glyph_bounds).reduce(InkBounds::union);
                LineLayout { glyphs, bounds }
            })
            .collect()
    }
}

/// Horizontal shift that places a line's ink per `align`.
fn horizontal_offset(align: Alignment, bounds: InkBounds, canvas_w: i32) -> i32 {
    match align {
        Alignment::Left => TEXT_MARGIN_PX - bounds.min_x,
        Alignment::Right => canvas_w - TEXT_MARGIN_PX - bounds.max_x,
        Alignment::Center => (canvas_w - bounds.width()).div_euclid(2) - bounds.min_x,
    }
}

/// Coverage needed to ink a pixel of `glyph`.
///
/// Hairlines (`_`, `|`, `'` at small sizes) can peak below
/// `COVERAGE_THRESHOLD`; those ink their strongest pixels instead of
/// disappearing.
fn glyph_threshold(glyph: &OutlinedGlyph) -> f32 {
    let mut peak = 0.0_f32;
    glyph.draw(|_, _, coverage| peak = peak.max(coverage));
    if peak > 0.0 {
        COVERAGE_THRESHOLD.min(peak)
    } else {
        COVERAGE_THRESHOLD
    }
}

fn glyph_bounds(glyph: &OutlinedGlyph) -> InkBounds {
    let rect = glyph.px_bounds();
    InkBounds {
        min_x: rect.min.x.floor() as i32,
        min_y: rect.min.y.floor() as i32,
        max_x: rect.max.x.ceil() as i32,
        max_y: rect.max.y.ceil() as i32,
    }
}

/// Rasterise glyphs shifted by (dx, dy), dropping pixels off the canvas.
fn draw_glyphs(canvas: &mut RgbImage, glyphs: &[OutlinedGlyph], dx: i32, dy: i32) {
    let (w, h) = (canvas.width() as i32, canvas.height() as i32);
    for glyph in glyphs {
        let threshold = glyph_threshold(glyph);
        let origin = glyph_bounds(glyph);
        glyph.draw(|gx, gy, coverage| {
            if coverage < threshold {
                return;
            }
            let px = origin.min_x + gx as i32 + dx;
            let py = origin.min_y + gy as i32 + dy;
            if (0..w).contains(&px) && (0..h).contains(&py) {
                canvas.put_pixel(px as u32, py as u32, FOREGROUND);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compositor() -> LabelCompositor {
        LabelCompositor::with_font(LabelFont::bundled().expect("bundled font"))
    }

    /// Bounds of all dark pixels, max inclusive.
    fn ink_box(image: &RgbImage) -> Option<(u32, u32, u32, u32)> {
        let mut found: Option<(u32, u32, u32, u32)> = None;
        for (x, y, pixel) in image.enumerate_pixels() {
            if pixel.0[0] < 128 {
                found = Some(match found {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
        found
    }

    fn assert_vertically_centred(image: &RgbImage, y0: u32, y1: u32) {
        let top = y0 as i64;
        let bottom = image.height() as i64 - 1 - y1 as i64;
        assert!((top - bottom).abs() <= 2, "top gap {top}, bottom gap {bottom}");
    }

    #[test]
    fn hello_world_scenario() {
        let request = LabelRequest::new("Hello World");
        let label = compositor().compose(&request, 300).expect("compose");

        assert_eq!((label.width(), label.height()), (673, 378));
        assert_eq!(label.dpi(), 300);

        let image = label.image();
        for (x, y) in [(0, 0), (672, 0), (0, 377), (672, 377)] {
            assert_eq!(image.get_pixel(x, y), &Rgb([255, 255, 255]));
        }
        // Only pure black or pure white.
        assert!(image.pixels().all(|p| *p == Rgb([0, 0, 0]) || *p == Rgb([255, 255, 255])));

        let (x0, y0, x1, y1) = ink_box(image).expect("text drawn");
        let left = x0 as i64;
        let right = image.width() as i64 - 1 - x1 as i64;
        assert!((left - right).abs() <= 2, "left gap {left}, right gap {right}");
        assert_vertically_centred(image, y0, y1);
    }

    #[test]
    fn every_label_size_has_exact_pixel_dimensions() {
        let compositor = compositor();
        for size in labels::all() {
            for dpi in [203, 300] {
                let request = LabelRequest::new("Test").with_label_size(size.code);
                let label = compositor.compose(&request, dpi).expect("compose");
                let expected_w = (size.width_mm * f64::from(dpi) / 25.4).round() as u32;
                let expected_h = (size.height_mm * f64::from(dpi) / 25.4).round() as u32;
                assert_eq!((label.width(), label.height()), (expected_w, expected_h));
            }
        }
    }

    #[test]
    fn unknown_label_size_fails() {
        let request = LabelRequest::new("Test").with_label_size("INVALID");
        let err = compositor().compose(&request, 300).expect_err("unknown size");
        assert!(matches!(err, LabelwerkError::UnknownLabelSize(ref c) if c == "INVALID"));
    }

    #[test]
    fn left_alignment_respects_margin() {
        let request = LabelRequest::new("Test Label")
            .with_font_size(60)
            .with_align(Alignment::Left);
        let label = compositor().compose(&request, 300).expect("compose");
        let (x0, y0, _, y1) = ink_box(label.image()).expect("text drawn");
        assert!((20..=22).contains(&x0), "left edge at {x0}");
        assert_vertically_centred(label.image(), y0, y1);
    }

    #[test]
    fn right_alignment_respects_margin() {
        let request = LabelRequest::new("Right Aligned").with_align(Alignment::Right);
        let label = compositor().compose(&request, 300).expect("compose");
        let (_, y0, x1, y1) = ink_box(label.image()).expect("text drawn");
        let gap = label.width() - 1 - x1;
        assert!((20..=22).contains(&gap), "right gap {gap}");
        assert_vertically_centred(label.image(), y0, y1);
    }

    #[test]
    fn composition_is_deterministic() {
        let compositor = compositor();
        let request = LabelRequest::new("Same every time").with_align(Alignment::Right);
        let first = compositor.compose(&request, 300).expect("compose");
        let second = compositor.compose(&request, 300).expect("compose");
        assert_eq!(first, second);
    }

    #[test]
    fn overflowing_text_is_clipped_not_wrapped() {
        let request = LabelRequest::new("A".repeat(1000));
        let label = compositor().compose(&request, 300).expect("compose");
        assert_eq!((label.width(), label.height()), (673, 378));
        let (x0, _, x1, _) = ink_box(label.image()).expect("text drawn");
        assert!(x0 < TEXT_MARGIN_PX as u32);
        assert!(x1 > label.width() - TEXT_MARGIN_PX as u32);
    }

    #[test]
    fn multiline_text_stacks_lines() {
        let compositor = compositor();
        let single = compositor
            .compose(&LabelRequest::new("Line 1"), 300)
            .expect("compose");
        let multi = compositor
            .compose(&LabelRequest::new("Line 1\nLine 2\nLine 3"), 300)
            .expect("compose");

        let (_, s0, _, s1) = ink_box(single.image()).expect("ink");
        let (_, m0, _, m1) = ink_box(multi.image()).expect("ink");
        assert!(m1 - m0 > 2 * (s1 - s0));
        assert_vertically_centred(multi.image(), m0, m1);
    }

    #[test]
    fn blank_text_renders_blank_label() {
        let label = compositor()
            .compose(&LabelRequest::new("   "), 300)
            .expect("compose");
        assert!(ink_box(label.image()).is_none());

        let empty = compositor()
            .compose(&LabelRequest::new(""), 300)
            .expect("compose");
        assert_eq!((empty.width(), empty.height()), (673, 378));
    }

    #[test]
    fn larger_font_draws_larger_text() {
        let compositor = compositor();
        let small = compositor
            .compose(&LabelRequest::new("Big").with_font_size(10), 300)
            .expect("compose");
        let large = compositor
            .compose(&LabelRequest::new("Big").with_font_size(200), 300)
            .expect("compose");
        let (sx0, _, sx1, _) = ink_box(small.image()).expect("ink");
        let (lx0, _, lx1, _) = ink_box(large.image()).expect("ink");
        assert!(lx1 - lx0 > sx1 - sx0);
    }

    #[test]
    fn special_characters_render() {
        let label = compositor()
            .compose(&LabelRequest::new("Hello! @#$%^&*() <> {} []"), 300)
            .expect("compose");
        assert!(ink_box(label.image()).is_some());
    }

    #[test]
    fn hairline_glyphs_never_vanish() {
        let compositor = compositor();
        for font_size in [10, 12, 14] {
            for text in ["_", "|", "'"] {
                let request = LabelRequest::new(text).with_font_size(font_size);
                let label = compositor.compose(&request, 300).expect("compose");
                assert!(
                    ink_box(label.image()).is_some(),
                    "{text:?} at size {font_size} drew nothing"
                );
            }
        }
    }

    #[test]
    fn printable_ascii_always_inks_at_minimum_size() {
        let compositor = compositor();
        for ch in '!'..='~' {
            let request = LabelRequest::new(ch.to_string()).with_font_size(10);
            let label = compositor.compose(&request, 300).expect("compose");
            assert!(ink_box(label.image()).is_some(), "{ch:?} drew nothing");
        }
    }

    #[test]
    fn zero_dpi_is_rejected() {
        let err = compositor()
            .compose(&LabelRequest::new("x"), 0)
            .expect_err("zero dpi");
        assert!(matches!(err, LabelwerkError::InvalidRequest(_)));
    }
}
