//! Core utilities shared by the raster filters.
//!
//! All filters work on premultiplied RGBA `f32` images of shape
//! `(height, width, 4)` with values in 0.0-1.0. This module provides:
//! - Gaussian kernel generation
//! - u8 <-> premultiplied f32 conversion
//! - canvas placement
//! - flat buffer validation for the binding layers

use ndarray::{Array3, ArrayView3};

use crate::error::{Error, Result};

/// Generate a 1D Gaussian kernel.
///
/// # Arguments
/// * `sigma` - Standard deviation of the Gaussian
///
/// # Returns
/// Normalized 1D kernel as Vec<f32>
pub fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        return vec![1.0];
    }

    // Kernel size = 6 sigma (covers 99.7% of distribution), ensure odd
    let kernel_size = ((sigma * 6.0).ceil() as usize) | 1;
    let half = kernel_size / 2;

    let mut kernel: Vec<f32> = (0..kernel_size)
        .map(|i| {
            let x = i as f32 - half as f32;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }

    kernel
}

/// Convert a u8 image with 3 or 4 channels to premultiplied RGBA f32.
///
/// RGB input is treated as opaque.
pub fn u8_to_premultiplied(input: ArrayView3<u8>) -> Array3<f32> {
    let (height, width, channels) = input.dim();
    let mut output = Array3::<f32>::zeros((height, width, 4));

    for y in 0..height {
        for x in 0..width {
            let a = if channels >= 4 {
                input[[y, x, 3]] as f32 / 255.0
            } else {
                1.0
            };
            for c in 0..3 {
                let v = if channels >= 3 {
                    input[[y, x, c]]
                } else {
                    input[[y, x, 0]]
                };
                output[[y, x, c]] = v as f32 / 255.0 * a;
            }
            output[[y, x, 3]] = a;
        }
    }

    output
}

/// Convert premultiplied RGBA f32 back to straight-alpha RGBA u8.
pub fn premultiplied_to_u8(input: ArrayView3<f32>) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, 4));

    for y in 0..height {
        for x in 0..width {
            let a = input[[y, x, 3]].clamp(0.0, 1.0);
            for c in 0..3 {
                let v = if a > 0.0 { input[[y, x, c]] / a } else { 0.0 };
                output[[y, x, c]] = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
            output[[y, x, 3]] = (a * 255.0).round() as u8;
        }
    }

    output
}

/// Copy `image` onto a transparent canvas with its top-left corner at
/// (`left`, `top`). Pixels falling outside the canvas are dropped.
pub fn place_on_canvas(
    image: ArrayView3<f32>,
    canvas_height: usize,
    canvas_width: usize,
    left: usize,
    top: usize,
) -> Array3<f32> {
    let (h, w, c) = image.dim();
    let mut result = Array3::<f32>::zeros((canvas_height, canvas_width, c));

    for y in 0..h {
        let ty = y + top;
        if ty >= canvas_height {
            break;
        }
        for x in 0..w {
            let tx = x + left;
            if tx >= canvas_width {
                break;
            }
            for ch in 0..c {
                result[[ty, tx, ch]] = image[[y, x, ch]];
            }
        }
    }

    result
}

/// Wrap a flat RGBA buffer as a `(height, width, 4)` array.
pub fn rgba_from_flat<T: Clone>(data: &[T], width: usize, height: usize) -> Result<Array3<T>> {
    let invalid = |expected| Error::InvalidDimensions {
        width,
        height,
        expected,
        actual: data.len(),
    };
    // Saturates on overflow; no buffer can be that long
    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| invalid(usize::MAX))?;
    if data.len() != expected {
        return Err(invalid(expected));
    }
    Array3::from_shape_vec((height, width, 4), data.to_vec()).map_err(|_| invalid(expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_is_normalized_and_odd() {
        let k = gaussian_kernel_1d(2.0);
        assert_eq!(k.len() % 2, 1);
        assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        let mid = k.len() / 2;
        assert!(k[mid] > k[0]);
    }

    #[test]
    fn test_zero_sigma_is_identity_kernel() {
        assert_eq!(gaussian_kernel_1d(0.0), vec![1.0]);
    }

    #[test]
    fn test_premultiply_round_trip() {
        let mut img = Array3::<u8>::zeros((1, 2, 4));
        img[[0, 0, 0]] = 200;
        img[[0, 0, 3]] = 128;
        img[[0, 1, 1]] = 255;
        img[[0, 1, 3]] = 255;

        let pm = u8_to_premultiplied(img.view());
        assert!((pm[[0, 0, 0]] - 200.0 / 255.0 * 128.0 / 255.0).abs() < 1e-5);

        let back = premultiplied_to_u8(pm.view());
        assert_eq!(back[[0, 0, 0]], 200);
        assert_eq!(back[[0, 0, 3]], 128);
        assert_eq!(back[[0, 1, 1]], 255);
    }

    #[test]
    fn test_rgb_input_is_opaque() {
        let img = Array3::<u8>::from_elem((1, 1, 3), 10);
        let pm = u8_to_premultiplied(img.view());
        assert_eq!(pm[[0, 0, 3]], 1.0);
    }

    #[test]
    fn test_place_on_canvas() {
        let img = Array3::<f32>::ones((2, 3, 4));
        let canvas = place_on_canvas(img.view(), 6, 7, 2, 1);
        assert_eq!(canvas.dim(), (6, 7, 4));
        assert_eq!(canvas[[1, 2, 0]], 1.0);
        assert_eq!(canvas[[2, 4, 3]], 1.0);
        assert_eq!(canvas[[0, 0, 3]], 0.0);
        assert_eq!(canvas[[3, 2, 3]], 0.0);
        assert_eq!(canvas.sum(), 2.0 * 3.0 * 4.0);
    }

    #[test]
    fn test_rgba_from_flat_checks_length() {
        assert!(rgba_from_flat(&[0u8; 16], 2, 2).is_ok());
        match rgba_from_flat(&[0u8; 15], 2, 2) {
            Err(Error::InvalidDimensions { expected, actual, .. }) => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 15);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rgba_from_flat_rejects_overflowing_dimensions() {
        for (width, height) in [(usize::MAX, 2), (usize::MAX / 4 + 1, 1), (usize::MAX / 2, 3)] {
            match rgba_from_flat(&[0u8; 16], width, height) {
                Err(Error::InvalidDimensions { expected, actual, .. }) => {
                    assert_eq!(expected, usize::MAX);
                    assert_eq!(actual, 16);
                }
                other => panic!("unexpected {:?}", other.map(|a| a.dim())),
            }
        }
    }
}
