//! Raster preview of the SVG glow.
//!
//! Mirrors the SVG backend's geometry: the image sits at `(5b, 5b)` on a
//! canvas `8b` larger than the image in both directions, and the glow
//! filter graph runs over the whole canvas.

use ndarray::{Array3, ArrayView3};
use tracing::debug;

use super::core::{place_on_canvas, premultiplied_to_u8, u8_to_premultiplied};
use super::graph::evaluate;
use crate::glow::backend::{SVG_MARGIN_FACTOR, SVG_OFFSET_FACTOR};
use crate::glow::config::GlowConfig;
use crate::glow::graph::build_filter_graph;

const PREVIEW_FILTER_ID: &str = "iglow-preview";

/// Canvas margin and image offset in pixels for a blur radius.
pub fn preview_geometry(blur: f32) -> (usize, usize) {
    let blur = blur.max(0.0);
    let margin = (blur * SVG_MARGIN_FACTOR).round() as usize;
    let offset = (blur * SVG_OFFSET_FACTOR).round() as usize;
    (margin, offset)
}

/// Render the glow of a premultiplied RGBA image.
///
/// # Returns
/// Premultiplied RGBA of shape `(h + 8b, w + 8b, 4)`
pub fn glow_preview(image: ArrayView3<f32>, config: &GlowConfig) -> Array3<f32> {
    let (height, width, _) = image.dim();
    let (margin, offset) = preview_geometry(config.blur);
    let canvas = place_on_canvas(image, height + margin, width + margin, offset, offset);

    let graph = build_filter_graph(PREVIEW_FILTER_ID, config);
    debug!(
        width = width + margin,
        height = height + margin,
        stages = graph.primitives.len(),
        "rendering glow preview"
    );
    evaluate(&graph, canvas.view())
}

/// Render the glow of a straight-alpha u8 image (RGB or RGBA).
pub fn glow_preview_rgba(image: ArrayView3<u8>, config: &GlowConfig) -> Array3<u8> {
    let premultiplied = u8_to_premultiplied(image);
    let out = glow_preview(premultiplied.view(), config);
    premultiplied_to_u8(out.view())
}
