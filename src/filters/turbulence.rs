//! Perlin turbulence (`feTurbulence`).
//!
//! Follows the reference algorithm: a seeded lattice of gradient vectors
//! per channel, summed over octaves. Deterministic for a given seed so
//! previews match across hosts.

use ndarray::Array3;
use rayon::prelude::*;

const B_SIZE: usize = 0x100;
const B_MASK: i64 = 0xff;
const PERLIN_N: f64 = 4096.0;

// ============================================================================
// Lattice RNG
// ============================================================================

/// Park-Miller minimal standard generator (Schrage's method).
struct LatticeRng {
    state: i64,
}

impl LatticeRng {
    const M: i64 = 2_147_483_647;
    const A: i64 = 16_807;
    const Q: i64 = 127_773; // M / A
    const R: i64 = 2_836; // M % A

    fn new(seed: i64) -> Self {
        let mut state = seed;
        if state <= 0 {
            state = -(state % (Self::M - 1)) + 1;
        }
        if state > Self::M - 1 {
            state = Self::M - 1;
        }
        LatticeRng { state }
    }

    fn next(&mut self) -> i64 {
        let mut result = Self::A * (self.state % Self::Q) - Self::R * (self.state / Self::Q);
        if result <= 0 {
            result += Self::M;
        }
        self.state = result;
        result
    }
}

// ============================================================================
// Lattice
// ============================================================================

/// Permutation table and per-channel gradients.
pub struct Lattice {
    selector: Vec<usize>,
    gradient: Vec<Vec<[f64; 2]>>,
}

impl Lattice {
    pub fn new(seed: i64) -> Self {
        let mut rng = LatticeRng::new(seed);
        let len = B_SIZE + B_SIZE + 2;
        let mut selector = vec![0usize; len];
        let mut gradient = vec![vec![[0.0f64; 2]; len]; 4];

        for channel in gradient.iter_mut() {
            for i in 0..B_SIZE {
                selector[i] = i;
                for j in 0..2 {
                    channel[i][j] =
                        ((rng.next() % (2 * B_SIZE as i64)) - B_SIZE as i64) as f64 / B_SIZE as f64;
                }
                let s = (channel[i][0] * channel[i][0] + channel[i][1] * channel[i][1]).sqrt();
                if s > 0.0 {
                    channel[i][0] /= s;
                    channel[i][1] /= s;
                }
            }
        }

        for i in (1..B_SIZE).rev() {
            let j = (rng.next() % B_SIZE as i64) as usize;
            selector.swap(i, j);
        }

        for i in 0..B_SIZE + 2 {
            selector[B_SIZE + i] = selector[i];
            for channel in gradient.iter_mut() {
                channel[B_SIZE + i] = channel[i];
            }
        }

        Lattice { selector, gradient }
    }

    fn noise2(&self, channel: usize, vx: f64, vy: f64) -> f64 {
        let s_curve = |t: f64| t * t * (3.0 - 2.0 * t);
        let lerp = |t: f64, a: f64, b: f64| a + t * (b - a);

        let t = vx + PERLIN_N;
        let bx0 = ((t as i64) & B_MASK) as usize;
        let bx1 = (bx0 + 1) & B_MASK as usize;
        let rx0 = t - (t as i64) as f64;
        let rx1 = rx0 - 1.0;

        let t = vy + PERLIN_N;
        let by0 = ((t as i64) & B_MASK) as usize;
        let by1 = (by0 + 1) & B_MASK as usize;
        let ry0 = t - (t as i64) as f64;
        let ry1 = ry0 - 1.0;

        let i = self.selector[bx0];
        let j = self.selector[bx1];
        let b00 = self.selector[i + by0];
        let b10 = self.selector[j + by0];
        let b01 = self.selector[i + by1];
        let b11 = self.selector[j + by1];

        let sx = s_curve(rx0);
        let sy = s_curve(ry0);
        let g = &self.gradient[channel];

        let u = rx0 * g[b00][0] + ry0 * g[b00][1];
        let v = rx1 * g[b10][0] + ry0 * g[b10][1];
        let a = lerp(sx, u, v);

        let u = rx0 * g[b01][0] + ry1 * g[b01][1];
        let v = rx1 * g[b11][0] + ry1 * g[b11][1];
        let b = lerp(sx, u, v);

        lerp(sy, a, b)
    }

    /// Turbulence sum for one channel at a point.
    pub fn turbulence(&self, channel: usize, x: f64, y: f64, base_frequency: f64, octaves: u32) -> f64 {
        let mut sum = 0.0;
        let mut vx = x * base_frequency;
        let mut vy = y * base_frequency;
        let mut ratio = 1.0;
        for _ in 0..octaves {
            sum += self.noise2(channel, vx, vy).abs() / ratio;
            vx *= 2.0;
            vy *= 2.0;
            ratio *= 2.0;
        }
        sum
    }
}

/// Render a premultiplied RGBA turbulence image.
pub fn turbulence(
    height: usize,
    width: usize,
    base_frequency: f32,
    octaves: u32,
    seed: i64,
) -> Array3<f32> {
    let lattice = Lattice::new(seed);
    let freq = base_frequency as f64;
    let mut output = Array3::<f32>::zeros((height, width, 4));

    // Freshly allocated arrays are contiguous
    if let Some(buf) = output.as_slice_mut() {
        buf.par_chunks_mut(width * 4)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..width {
                    let mut px = [0.0f32; 4];
                    for (c, value) in px.iter_mut().enumerate() {
                        let t = lattice.turbulence(c, x as f64, y as f64, freq, octaves);
                        *value = (t as f32).clamp(0.0, 1.0);
                    }
                    let a = px[3];
                    row[x * 4] = px[0] * a;
                    row[x * 4 + 1] = px[1] * a;
                    row[x * 4 + 2] = px[2] * a;
                    row[x * 4 + 3] = a;
                }
            });
    }

    output
}
