//! Blend modes on premultiplied RGBA images (`feBlend`).
//!
//! `top` is the primitive's `in`, `bottom` its `in2`. With `qa`/`qb` the
//! alphas and `ca`/`cb` the premultiplied colours:
//!
//! | mode    | colour                                          |
//! |---------|-------------------------------------------------|
//! | screen  | `cb + ca - ca * cb`                             |
//! | lighten | `max((1 - qa) * cb + ca, (1 - qb) * ca + cb)`   |
//!
//! Alpha is `1 - (1 - qa) * (1 - qb)` for both.

use ndarray::{Array3, ArrayView3};

use crate::glow::graph::BlendMode;

/// Blend `top` over `bottom`. Both must have the same shape.
pub fn blend(top: ArrayView3<f32>, bottom: ArrayView3<f32>, mode: BlendMode) -> Array3<f32> {
    let (height, width, _) = top.dim();
    let mut output = Array3::<f32>::zeros((height, width, 4));

    for y in 0..height {
        for x in 0..width {
            let qa = top[[y, x, 3]];
            let qb = bottom[[y, x, 3]];
            for c in 0..3 {
                let ca = top[[y, x, c]];
                let cb = bottom[[y, x, c]];
                output[[y, x, c]] = match mode {
                    BlendMode::Screen => cb + ca - ca * cb,
                    BlendMode::Lighten => ((1.0 - qa) * cb + ca).max((1.0 - qb) * ca + cb),
                };
            }
            output[[y, x, 3]] = 1.0 - (1.0 - qa) * (1.0 - qb);
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(r: f32, g: f32, b: f32, a: f32) -> Array3<f32> {
        let mut img = Array3::<f32>::zeros((1, 1, 4));
        img[[0, 0, 0]] = r;
        img[[0, 0, 1]] = g;
        img[[0, 0, 2]] = b;
        img[[0, 0, 3]] = a;
        img
    }

    #[test]
    fn test_screen_with_itself_brightens() {
        let p = pixel(0.5, 0.2, 0.0, 1.0);
        let out = blend(p.view(), p.view(), BlendMode::Screen);
        assert!((out[[0, 0, 0]] - 0.75).abs() < 1e-6);
        assert!((out[[0, 0, 1]] - 0.36).abs() < 1e-6);
        assert_eq!(out[[0, 0, 2]], 0.0);
        assert_eq!(out[[0, 0, 3]], 1.0);
    }

    #[test]
    fn test_screen_never_darkens() {
        for v in [0.0f32, 0.1, 0.5, 0.9, 1.0] {
            let p = pixel(v, v, v, 1.0);
            let out = blend(p.view(), p.view(), BlendMode::Screen);
            assert!(out[[0, 0, 0]] >= v);
        }
    }

    #[test]
    fn test_lighten_takes_brighter_opaque_colour() {
        let top = pixel(0.2, 0.9, 0.5, 1.0);
        let bottom = pixel(0.6, 0.1, 0.5, 1.0);
        let out = blend(top.view(), bottom.view(), BlendMode::Lighten);
        assert!((out[[0, 0, 0]] - 0.6).abs() < 1e-6);
        assert!((out[[0, 0, 1]] - 0.9).abs() < 1e-6);
        assert!((out[[0, 0, 2]] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_transparent_top_keeps_bottom() {
        let top = pixel(0.0, 0.0, 0.0, 0.0);
        let bottom = pixel(0.3, 0.3, 0.3, 0.5);
        let out = blend(top.view(), bottom.view(), BlendMode::Lighten);
        assert!((out[[0, 0, 0]] - 0.3).abs() < 1e-6);
        assert!((out[[0, 0, 3]] - 0.5).abs() < 1e-6);
    }
}
