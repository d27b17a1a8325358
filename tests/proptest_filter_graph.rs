//! Property-based tests for the glow filter graph.
//!
//! 1. The blur runs after every morphology stage.
//! 2. Nothing but the optional final blend follows the blur.
//! 3. Every named input refers to `SourceGraphic` or an earlier result.
//! 4. Stage counts follow the configuration.
//! 5. The raster evaluation never produces out-of-range values.

use iglow::filters::evaluate;
use iglow::glow::graph::{Primitive, SOURCE_GRAPHIC};
use iglow::glow::{build_filter_graph, GlowConfig};
use ndarray::Array3;
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn config() -> impl Strategy<Value = GlowConfig> {
    (
        0u32..=4,
        prop_oneof![Just(0.0f32), 0.01f32..0.5],
        0.0f32..20.0,
        0.0f32..4.0,
        0.0f32..8.0,
        0.0f32..20.0,
        any::<bool>(),
    )
        .prop_map(|(lighten, turbulence, displace, dilate, erode, blur, use_image)| {
            GlowConfig {
                lighten,
                turbulence,
                displace,
                dilate,
                erode,
                blur,
                use_image,
                ..GlowConfig::default()
            }
        })
}

fn inputs(p: &Primitive) -> Vec<&str> {
    match p {
        Primitive::Blend { input, input2, .. } | Primitive::DisplacementMap { input, input2, .. } => {
            vec![input.as_str(), input2.as_str()]
        }
        Primitive::Morphology { input, .. } | Primitive::GaussianBlur { input, .. } => {
            vec![input.as_str()]
        }
        Primitive::Turbulence { .. } => Vec::new(),
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1-2. Blur placement
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn blur_follows_morphology_and_precedes_final_blend(config in config()) {
        let graph = build_filter_graph("g", &config);
        let tags = graph.tags();

        match tags.iter().position(|t| *t == "feGaussianBlur") {
            Some(blur) => {
                prop_assert!(config.blur > 0.0);
                prop_assert!(tags[..blur].iter().all(|t| *t != "feGaussianBlur"));
                let after = &tags[blur + 1..];
                prop_assert!(after.iter().all(|t| *t == "feBlend"));
                prop_assert_eq!(after.len(), usize::from(config.use_image));
                if let Some(last_morph) = tags.iter().rposition(|t| *t == "feMorphology") {
                    prop_assert!(last_morph < blur);
                }
            }
            None => prop_assert!(config.blur <= 0.0),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Inputs resolve
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn inputs_refer_to_earlier_results(config in config()) {
        let graph = build_filter_graph("g", &config);
        let mut known = vec![SOURCE_GRAPHIC.to_string()];
        for p in &graph.primitives {
            for input in inputs(p) {
                prop_assert!(known.iter().any(|k| k == input), "{} not defined before {}", input, p.tag());
            }
            if let Some(result) = p.result() {
                known.push(result.to_string());
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Stage counts
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn stage_counts_follow_config(config in config()) {
        let tags = build_filter_graph("g", &config).tags();
        let count = |tag: &str| tags.iter().filter(|t| **t == tag).count();

        let screens = config.lighten as usize;
        prop_assert_eq!(count("feBlend"), screens + usize::from(config.use_image));
        prop_assert_eq!(count("feTurbulence"), usize::from(config.turbulence != 0.0));
        prop_assert_eq!(count("feDisplacementMap"), usize::from(config.turbulence != 0.0));
        prop_assert_eq!(
            count("feMorphology"),
            usize::from(config.dilate != 0.0) + usize::from(config.erode != 0.0)
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Evaluation stays in range
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn evaluation_stays_in_range(
        config in config(),
        pixels in proptest::collection::vec(0.0f32..=1.0, 12 * 12),
    ) {
        let mut source = Array3::<f32>::zeros((12, 12, 4));
        for (i, alpha) in pixels.iter().enumerate() {
            let (y, x) = (i / 12, i % 12);
            source[[y, x, 0]] = alpha * 0.8;
            source[[y, x, 3]] = *alpha;
        }
        let config = GlowConfig { blur: config.blur.min(3.0), ..config };
        let out = evaluate(&build_filter_graph("g", &config), source.view());

        prop_assert_eq!(out.dim(), (12, 12, 4));
        for v in out.iter() {
            prop_assert!(v.is_finite());
            prop_assert!(*v >= 0.0 && *v <= 1.0 + 1e-4, "value {} out of range", v);
        }
    }
}
