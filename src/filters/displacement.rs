//! Displacement map (`feDisplacementMap`).
//!
//! `P'(x, y) = P(x + s * (XC(x, y) - 0.5), y + s * (YC(x, y) - 0.5))`
//! where `XC`/`YC` are the selected channels of the map, read with straight
//! (non-premultiplied) colour. Samples outside the input are transparent.

use ndarray::{Array3, ArrayView3};

use crate::glow::graph::Channel;

#[inline]
fn straight_channel(map: &ArrayView3<f32>, y: usize, x: usize, channel: Channel) -> f32 {
    let a = map[[y, x, 3]];
    match channel {
        Channel::A => a,
        c if a > 0.0 => map[[y, x, c.index()]] / a,
        _ => 0.0,
    }
}

/// Displace `input` by `map`.
pub fn displace(
    input: ArrayView3<f32>,
    map: ArrayView3<f32>,
    scale: f32,
    x_channel: Channel,
    y_channel: Channel,
) -> Array3<f32> {
    let (height, width, channels) = input.dim();
    let mut output = Array3::<f32>::zeros((height, width, channels));

    for y in 0..height {
        for x in 0..width {
            let dx = scale * (straight_channel(&map, y, x, x_channel) - 0.5);
            let dy = scale * (straight_channel(&map, y, x, y_channel) - 0.5);
            let sx = (x as f32 + dx).round() as isize;
            let sy = (y as f32 + dy).round() as isize;
            if sx < 0 || sy < 0 || sx >= width as isize || sy >= height as isize {
                continue;
            }
            for c in 0..channels {
                output[[y, x, c]] = input[[sy as usize, sx as usize, c]];
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_map_is_identity() {
        let mut input = Array3::<f32>::zeros((4, 4, 4));
        input[[1, 2, 0]] = 0.8;
        input[[1, 2, 3]] = 1.0;
        let mut neutral = Array3::<f32>::from_elem((4, 4, 4), 0.5);
        for y in 0..4 {
            for x in 0..4 {
                neutral[[y, x, 3]] = 1.0;
            }
        }
        let out = displace(input.view(), neutral.view(), 10.0, Channel::R, Channel::B);
        assert_eq!(out, input);
    }

    #[test]
    fn test_full_red_shifts_left_sample() {
        let mut input = Array3::<f32>::zeros((1, 5, 4));
        input[[0, 3, 3]] = 1.0;
        let mut map = Array3::<f32>::zeros((1, 5, 4));
        for x in 0..5 {
            map[[0, x, 0]] = 1.0;
            map[[0, x, 2]] = 0.5;
            map[[0, x, 3]] = 1.0;
        }
        // XC = 1.0 -> dx = 2 * 0.5 = 1: pixel x samples x + 1
        let out = displace(input.view(), map.view(), 2.0, Channel::R, Channel::B);
        assert_eq!(out[[0, 2, 3]], 1.0);
        assert_eq!(out[[0, 3, 3]], 0.0);
        // The last column samples outside the input
        assert_eq!(out[[0, 4, 3]], 0.0);
    }
}
