//! Software evaluation of a glow [`FilterGraph`].
//!
//! Results are kept by name. An input naming an unknown result reads the
//! previous primitive's output (or the source for the first primitive),
//! which is how SVG resolves dangling references.

use std::collections::HashMap;

use ndarray::{Array3, ArrayView3};
use tracing::trace;

use super::blend::blend;
use super::blur::gaussian_blur;
use super::displacement::displace;
use super::morphology::morphology;
use super::turbulence::turbulence;
use crate::glow::graph::{FilterGraph, Primitive, SOURCE_GRAPHIC};

fn resolve<'a>(
    results: &'a HashMap<String, Array3<f32>>,
    last: &'a Array3<f32>,
    name: &str,
) -> ArrayView3<'a, f32> {
    results.get(name).unwrap_or(last).view()
}

/// Run `graph` on a premultiplied RGBA `source` and return the final result.
pub fn evaluate(graph: &FilterGraph, source: ArrayView3<f32>) -> Array3<f32> {
    let (height, width, _) = source.dim();
    let mut results: HashMap<String, Array3<f32>> = HashMap::new();
    results.insert(SOURCE_GRAPHIC.to_string(), source.to_owned());
    let mut last = source.to_owned();

    for primitive in &graph.primitives {
        let out = match primitive {
            Primitive::Blend {
                input,
                input2,
                mode,
                ..
            } => blend(
                resolve(&results, &last, input),
                resolve(&results, &last, input2),
                *mode,
            ),
            Primitive::Turbulence {
                base_frequency,
                octaves,
                seed,
                ..
            } => turbulence(height, width, *base_frequency, *octaves, *seed),
            Primitive::DisplacementMap {
                input,
                input2,
                scale,
                x_channel,
                y_channel,
                ..
            } => displace(
                resolve(&results, &last, input),
                resolve(&results, &last, input2),
                *scale,
                *x_channel,
                *y_channel,
            ),
            Primitive::Morphology {
                input,
                operator,
                radius,
                ..
            } => morphology(resolve(&results, &last, input), *operator, *radius),
            Primitive::GaussianBlur {
                input,
                std_deviation,
                ..
            } => gaussian_blur(resolve(&results, &last, input), *std_deviation),
        };
        trace!(primitive = primitive.tag(), "primitive evaluated");

        if let Some(name) = primitive.result() {
            results.insert(name.to_string(), out.clone());
        }
        last = out;
    }

    last
}
