//! Morphology filters: Dilate, Erode.
//!
//! Rectangular structuring element of `(2r + 1) x (2r + 1)` pixels as in
//! `feMorphology`, applied to every channel of a premultiplied image.
//! Both passes are separable (row then column).

use ndarray::{Array3, ArrayView3};

use crate::glow::graph::MorphologyOperator;

/// Apply a morphology operator with the given radius.
///
/// Out-of-bounds pixels count as transparent black: they never win a
/// dilate and always win an erode.
///
/// # Arguments
/// * `input` - Premultiplied image (height, width, channels)
/// * `operator` - Dilate (max) or erode (min)
/// * `radius` - Radius in pixels, rounded; `<= 0` returns a copy
pub fn morphology(input: ArrayView3<f32>, operator: MorphologyOperator, radius: f32) -> Array3<f32> {
    let r = radius.round() as isize;
    if r <= 0 {
        return input.to_owned();
    }

    let (height, width, channels) = input.dim();
    let pick = |a: f32, b: f32| match operator {
        MorphologyOperator::Dilate => a.max(b),
        MorphologyOperator::Erode => a.min(b),
    };
    let (start, outside) = match operator {
        MorphologyOperator::Dilate => (0.0f32, 0.0f32),
        MorphologyOperator::Erode => (f32::MAX, 0.0f32),
    };

    let mut temp = Array3::<f32>::zeros((height, width, channels));
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut acc = start;
                for dx in -r..=r {
                    let sx = x as isize + dx;
                    let v = if sx < 0 || sx >= width as isize {
                        outside
                    } else {
                        input[[y, sx as usize, c]]
                    };
                    acc = pick(acc, v);
                }
                temp[[y, x, c]] = acc;
            }
        }
    }

    let mut output = Array3::<f32>::zeros((height, width, channels));
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut acc = start;
                for dy in -r..=r {
                    let sy = y as isize + dy;
                    let v = if sy < 0 || sy >= height as isize {
                        outside
                    } else {
                        temp[[sy as usize, x, c]]
                    };
                    acc = pick(acc, v);
                }
                output[[y, x, c]] = acc;
            }
        }
    }

    output
}

/// Dilate: bright regions grow.
pub fn dilate(input: ArrayView3<f32>, radius: f32) -> Array3<f32> {
    morphology(input, MorphologyOperator::Dilate, radius)
}

/// Erode: bright regions shrink.
pub fn erode(input: ArrayView3<f32>, radius: f32) -> Array3<f32> {
    morphology(input, MorphologyOperator::Erode, radius)
}
