//! Raster filters behind the glow preview.
//!
//! ## Format
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | RGBA8 | (H, W, 4) | u8 | Straight alpha, 0-255 (input and output of the preview) |
//! | RGB8 | (H, W, 3) | u8 | Treated as opaque on input |
//! | Premultiplied float | (H, W, 4) | f32 | Colour multiplied by alpha, 0.0-1.0 |
//!
//! Every primitive works on premultiplied float, which is what SVG filter
//! primitives operate on.
//!
//! ## Primitives
//!
//! | Module | SVG element | Notes |
//! |--------|-------------|-------|
//! | [`blend`] | `feBlend` | screen, lighten |
//! | [`turbulence`] | `feTurbulence` | reference Perlin noise, seeded |
//! | [`displacement`] | `feDisplacementMap` | straight-colour channel lookup |
//! | [`morphology`] | `feMorphology` | rectangular, separable |
//! | [`blur`] | `feGaussianBlur` | separable, rayon rows |
//!
//! [`graph::evaluate`] runs a whole glow filter graph and [`preview`] wraps
//! it with the SVG canvas geometry.

pub mod core;
pub mod blend;
pub mod blur;
pub mod displacement;
pub mod morphology;
pub mod turbulence;
pub mod graph;
pub mod preview;

pub use graph::evaluate;
pub use preview::{glow_preview, glow_preview_rgba};
