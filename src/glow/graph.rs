//! SVG filter graph for the glow halo.
//!
//! The graph is a linear chain of primitives wired through named results.
//! Stage order is fixed:
//!
//! 1. `lighten` screen blends, each feeding the next
//! 2. turbulence + displacement map (when `turbulence` is set)
//! 3. dilate, then erode (each when non-zero)
//! 4. Gaussian blur (when `blur > 0`)
//! 5. lighten-blend of the sharp source over the halo (when `use_image`)
//!
//! The blur has to run after every morphology stage and be the last stage
//! before the final blend; anything that follows it re-introduces hard,
//! dark edges.

use std::fmt;

use tracing::trace;

use super::config::GlowConfig;

pub const SOURCE_GRAPHIC: &str = "SourceGraphic";
pub const LIGHTENED: &str = "lightened";
pub const TURBULENCE: &str = "turb";
pub const BLURRED: &str = "blurred";

/// Turbulence parameters that are not exposed in [`GlowConfig`].
pub const TURBULENCE_OCTAVES: u32 = 8;
pub const TURBULENCE_SEED: i64 = 125;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Screen,
    Lighten,
}

impl BlendMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BlendMode::Screen => "screen",
            BlendMode::Lighten => "lighten",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphologyOperator {
    Dilate,
    Erode,
}

impl MorphologyOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            MorphologyOperator::Dilate => "dilate",
            MorphologyOperator::Erode => "erode",
        }
    }
}

/// Colour channel read by a displacement map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    R,
    G,
    B,
    A,
}

impl Channel {
    pub fn index(self) -> usize {
        match self {
            Channel::R => 0,
            Channel::G => 1,
            Channel::B => 2,
            Channel::A => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::R => "R",
            Channel::G => "G",
            Channel::B => "B",
            Channel::A => "A",
        }
    }
}

/// One stage of the filter graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Blend {
        input: String,
        input2: String,
        mode: BlendMode,
        result: Option<String>,
    },
    Turbulence {
        base_frequency: f32,
        octaves: u32,
        seed: i64,
        result: String,
    },
    DisplacementMap {
        input: String,
        input2: String,
        scale: f32,
        x_channel: Channel,
        y_channel: Channel,
        result: String,
    },
    Morphology {
        input: String,
        operator: MorphologyOperator,
        radius: f32,
        result: String,
    },
    GaussianBlur {
        input: String,
        std_deviation: f32,
        result: String,
    },
}

impl Primitive {
    /// SVG element name.
    pub fn tag(&self) -> &'static str {
        match self {
            Primitive::Blend { .. } => "feBlend",
            Primitive::Turbulence { .. } => "feTurbulence",
            Primitive::DisplacementMap { .. } => "feDisplacementMap",
            Primitive::Morphology { .. } => "feMorphology",
            Primitive::GaussianBlur { .. } => "feGaussianBlur",
        }
    }

    pub fn result(&self) -> Option<&str> {
        match self {
            Primitive::Blend { result, .. } => result.as_deref(),
            Primitive::Turbulence { result, .. }
            | Primitive::DisplacementMap { result, .. }
            | Primitive::Morphology { result, .. }
            | Primitive::GaussianBlur { result, .. } => Some(result),
        }
    }

    /// Attributes in the order they are written to markup.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        match self {
            Primitive::Blend {
                input,
                input2,
                mode,
                result,
            } => {
                let mut attrs = vec![
                    ("in", input.clone()),
                    ("in2", input2.clone()),
                    ("mode", mode.as_str().to_string()),
                ];
                if let Some(r) = result {
                    attrs.push(("result", r.clone()));
                }
                attrs
            }
            Primitive::Turbulence {
                base_frequency,
                octaves,
                seed,
                result,
            } => vec![
                ("baseFrequency", base_frequency.to_string()),
                ("numOctaves", octaves.to_string()),
                ("seed", seed.to_string()),
                ("result", result.clone()),
            ],
            Primitive::DisplacementMap {
                input,
                input2,
                scale,
                x_channel,
                y_channel,
                result,
            } => vec![
                ("in", input.clone()),
                ("in2", input2.clone()),
                ("scale", scale.to_string()),
                ("xChannelSelector", x_channel.as_str().to_string()),
                ("yChannelSelector", y_channel.as_str().to_string()),
                ("result", result.clone()),
            ],
            Primitive::Morphology {
                input,
                operator,
                radius,
                result,
            } => vec![
                ("in", input.clone()),
                ("operator", operator.as_str().to_string()),
                ("radius", radius.to_string()),
                ("result", result.clone()),
            ],
            Primitive::GaussianBlur {
                input,
                std_deviation,
                result,
            } => vec![
                ("in", input.clone()),
                ("stdDeviation", std_deviation.to_string()),
                ("result", result.clone()),
            ],
        }
    }
}

/// A named chain of filter primitives.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGraph {
    pub id: String,
    pub primitives: Vec<Primitive>,
}

impl FilterGraph {
    /// Element names in chain order.
    pub fn tags(&self) -> Vec<&'static str> {
        self.primitives.iter().map(Primitive::tag).collect()
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.tags().join(" -> "))
    }
}

/// Build the glow filter chain for `config`.
pub fn build_filter_graph(id: &str, config: &GlowConfig) -> FilterGraph {
    let mut primitives = Vec::new();
    let mut current = SOURCE_GRAPHIC.to_string();

    for _ in 0..config.lighten {
        primitives.push(Primitive::Blend {
            input: current.clone(),
            input2: current.clone(),
            mode: BlendMode::Screen,
            result: Some(LIGHTENED.to_string()),
        });
        current = LIGHTENED.to_string();
    }

    if config.turbulence != 0.0 {
        primitives.push(Primitive::Turbulence {
            base_frequency: config.turbulence,
            octaves: TURBULENCE_OCTAVES,
            seed: TURBULENCE_SEED,
            result: TURBULENCE.to_string(),
        });
        primitives.push(Primitive::DisplacementMap {
            input: current.clone(),
            input2: TURBULENCE.to_string(),
            scale: config.displace,
            x_channel: Channel::R,
            y_channel: Channel::B,
            result: LIGHTENED.to_string(),
        });
        current = LIGHTENED.to_string();
    }

    for (operator, radius) in [
        (MorphologyOperator::Dilate, config.dilate),
        (MorphologyOperator::Erode, config.erode),
    ] {
        if radius != 0.0 {
            primitives.push(Primitive::Morphology {
                input: current.clone(),
                operator,
                radius,
                result: LIGHTENED.to_string(),
            });
            current = LIGHTENED.to_string();
        }
    }

    if config.blur > 0.0 {
        primitives.push(Primitive::GaussianBlur {
            input: current.clone(),
            std_deviation: config.blur,
            result: BLURRED.to_string(),
        });
        current = BLURRED.to_string();
    }

    if config.use_image {
        primitives.push(Primitive::Blend {
            input: SOURCE_GRAPHIC.to_string(),
            input2: current,
            mode: BlendMode::Lighten,
            result: None,
        });
    }

    let graph = FilterGraph {
        id: id.to_string(),
        primitives,
    };
    trace!(%graph, "filter graph built");
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GlowConfig {
        GlowConfig::default()
    }

    #[test]
    fn test_default_chain() {
        let graph = build_filter_graph("g", &config());
        assert_eq!(
            graph.tags(),
            vec!["feBlend", "feBlend", "feMorphology", "feMorphology", "feGaussianBlur"]
        );
    }

    #[test]
    fn test_lighten_stages_feed_each_other() {
        let graph = build_filter_graph("g", &GlowConfig { lighten: 3, ..config() });
        let inputs: Vec<String> = graph
            .primitives
            .iter()
            .take(3)
            .map(|p| match p {
                Primitive::Blend { input, mode, .. } => {
                    assert_eq!(*mode, BlendMode::Screen);
                    input.clone()
                }
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(inputs, vec![SOURCE_GRAPHIC, LIGHTENED, LIGHTENED]);
    }

    #[test]
    fn test_no_lighten_reads_source() {
        let graph = build_filter_graph(
            "g",
            &GlowConfig {
                lighten: 0,
                dilate: 0.0,
                erode: 0.0,
                ..config()
            },
        );
        assert_eq!(
            graph.primitives,
            vec![Primitive::GaussianBlur {
                input: SOURCE_GRAPHIC.to_string(),
                std_deviation: 14.0,
                result: BLURRED.to_string(),
            }]
        );
    }

    #[test]
    fn test_turbulence_pair_distorts_lightened_signal() {
        let graph = build_filter_graph("g", &GlowConfig { turbulence: 2.0, ..config() });
        assert_eq!(graph.primitives[2].tag(), "feTurbulence");
        match &graph.primitives[3] {
            Primitive::DisplacementMap {
                input,
                input2,
                scale,
                ..
            } => {
                assert_eq!(input, LIGHTENED);
                assert_eq!(input2, TURBULENCE);
                assert_eq!(*scale, 5.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_blur_precedes_final_blend() {
        let graph = build_filter_graph("g", &GlowConfig { use_image: true, ..config() });
        let tags = graph.tags();
        let n = tags.len();
        assert_eq!(tags[n - 2], "feGaussianBlur");
        assert_eq!(tags[n - 1], "feBlend");
        match graph.primitives.last() {
            Some(Primitive::Blend {
                input,
                input2,
                mode,
                result,
            }) => {
                assert_eq!(input, SOURCE_GRAPHIC);
                assert_eq!(input2, BLURRED);
                assert_eq!(*mode, BlendMode::Lighten);
                assert!(result.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_zero_blur_skips_stage() {
        let graph = build_filter_graph("g", &GlowConfig { blur: 0.0, ..config() });
        assert!(!graph.tags().contains(&"feGaussianBlur"));
    }

    #[test]
    fn test_attribute_formatting() {
        let graph = build_filter_graph("g", &config());
        let attrs = graph.primitives[2].attributes();
        assert_eq!(
            attrs,
            vec![
                ("in", "lightened".to_string()),
                ("operator", "dilate".to_string()),
                ("radius", "1".to_string()),
                ("result", "lightened".to_string()),
            ]
        );
    }
}
