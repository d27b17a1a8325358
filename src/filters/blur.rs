//! Gaussian blur for premultiplied RGBA images.
//!
//! Separable 2-pass convolution over all four channels. Pixels outside the
//! image count as transparent black, matching `feGaussianBlur`'s default
//! edge mode. Rows are processed in parallel.

use ndarray::{Array3, ArrayView3};
use rayon::prelude::*;

use super::core::gaussian_kernel_1d;

/// Apply Gaussian blur with standard deviation `sigma`.
///
/// # Arguments
/// * `input` - Premultiplied image (height, width, channels)
/// * `sigma` - Standard deviation in pixels; `<= 0` returns a copy
///
/// # Returns
/// Blurred image with the same dimensions
pub fn gaussian_blur(input: ArrayView3<f32>, sigma: f32) -> Array3<f32> {
    let (height, width, channels) = input.dim();
    if sigma <= 0.0 || height == 0 || width == 0 {
        return input.to_owned();
    }

    let kernel = gaussian_kernel_1d(sigma);
    let half = kernel.len() as isize / 2;
    let row_len = width * channels;

    let src: Vec<f32> = input.iter().copied().collect();
    let mut temp = vec![0.0f32; src.len()];

    // Horizontal pass
    temp.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let src_row = &src[y * row_len..(y + 1) * row_len];
            for x in 0..width {
                for c in 0..channels {
                    let mut sum = 0.0f32;
                    for (ki, &kv) in kernel.iter().enumerate() {
                        let sx = x as isize + ki as isize - half;
                        if sx >= 0 && sx < width as isize {
                            sum += src_row[sx as usize * channels + c] * kv;
                        }
                    }
                    row[x * channels + c] = sum;
                }
            }
        });

    // Vertical pass
    let mut output = Array3::<f32>::zeros((height, width, channels));
    // Freshly allocated arrays are contiguous
    if let Some(out) = output.as_slice_mut() {
        out.par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                for (i, value) in row.iter_mut().enumerate() {
                    let mut sum = 0.0f32;
                    for (ki, &kv) in kernel.iter().enumerate() {
                        let sy = y as isize + ki as isize - half;
                        if sy >= 0 && sy < height as isize {
                            sum += temp[sy as usize * row_len + i] * kv;
                        }
                    }
                    *value = sum;
                }
            });
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sigma_is_copy() {
        let mut img = Array3::<f32>::zeros((3, 3, 4));
        img[[1, 1, 0]] = 0.5;
        assert_eq!(gaussian_blur(img.view(), 0.0), img);
    }

    #[test]
    fn test_blur_spreads_and_preserves_mass() {
        let mut img = Array3::<f32>::zeros((21, 21, 4));
        img[[10, 10, 3]] = 1.0;
        img[[10, 10, 0]] = 1.0;

        let result = gaussian_blur(img.view(), 1.5);

        assert!(result[[10, 10, 3]] < 1.0);
        assert!(result[[10, 11, 3]] > 0.0);
        assert!(result[[9, 10, 3]] > 0.0);
        // Kernel fits inside the image, so nothing leaks past the edges
        let alpha_sum: f32 = result.index_axis(ndarray::Axis(2), 3).sum();
        assert!((alpha_sum - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_blur_is_symmetric() {
        let mut img = Array3::<f32>::zeros((9, 9, 4));
        img[[4, 4, 3]] = 1.0;
        let result = gaussian_blur(img.view(), 1.0);
        assert!((result[[4, 3, 3]] - result[[4, 5, 3]]).abs() < 1e-6);
        assert!((result[[3, 4, 3]] - result[[5, 4, 3]]).abs() < 1e-6);
        assert!((result[[3, 4, 3]] - result[[4, 3, 3]]).abs() < 1e-6);
    }

    #[test]
    fn test_edges_fade_to_transparent() {
        let img = Array3::<f32>::ones((5, 5, 4));
        let result = gaussian_blur(img.view(), 2.0);
        assert!(result[[0, 0, 3]] < result[[2, 2, 3]]);
    }
}
