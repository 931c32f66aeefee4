// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// labelwerk-render: Label composition for the Labelwerk label service.
//
// Turns a `LabelRequest` into a white raster sized to the physical label at a
// given DPI, with the text drawn in black according to the requested
// alignment. Also provides PNG / data-URL encoding of the result.

pub mod compositor;
pub mod font;
pub mod rendered;

pub use compositor::LabelCompositor;
pub use font::{FontSource, LabelFont};
pub use rendered::RenderedLabel;
