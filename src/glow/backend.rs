//! Glow visual builders, one per backend.
//!
//! Builders only describe what to render ([`Visual`]); turning a
//! description into nodes is [`super::render`]'s job.

use super::capability::{Backend, CssFilterProperty};
use super::config::GlowConfig;
use super::graph::{build_filter_graph, FilterGraph};

/// Safety margin around the image on the SVG canvas, in multiples of blur.
pub const SVG_MARGIN_FACTOR: f32 = 8.0;
/// Offset of the image inside the SVG canvas, in multiples of blur.
pub const SVG_OFFSET_FACTOR: f32 = 5.0;
/// Extra pixels the legacy filter spills past its blur radius.
pub const LEGACY_EDGE: f32 = 3.0;

/// What the builders need to know about a target image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub width: f32,
    pub height: f32,
    pub src: String,
}

/// `<image>` element placed inside the SVG canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgImage {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub href: String,
}

/// Padded SVG document holding the filter graph and the image it filters.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgCanvas {
    pub width: f32,
    pub height: f32,
    pub graph: FilterGraph,
    pub image: SvgImage,
}

/// Clone of the source image with a filter applied through a style property.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredClone {
    pub property: &'static str,
    pub filter: String,
}

/// Description of a glow visual.
#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    Clone(FilteredClone),
    Svg(SvgCanvas),
}

/// Placement of the glow wrapper relative to the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowLayout {
    /// Left and top offset, in pixels.
    pub offset: f32,
    pub fade_in_ms: u32,
}

/// One rendering path for the glow visual.
pub trait GlowBackend {
    fn build_visual(&self, image: &ImageInfo, config: &GlowConfig, id: &str) -> Visual;
}

/// CSS `filter` on a clone of the image.
#[derive(Debug, Clone, Copy)]
pub struct CssBackend {
    pub property: CssFilterProperty,
}

/// Filter graph inside a padded SVG document.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgBackend;

/// Legacy filter directives on a clone of the image.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyBackend;

/// Filter string for the CSS backend.
///
/// Each screen pass roughly doubles the brightness of the halo, so the
/// boost is `(lighten + 1) * 100%`.
pub fn css_filter(config: &GlowConfig) -> String {
    format!(
        "blur({}px) brightness({}%) contrast(200%)",
        config.blur,
        (config.lighten + 1) * 100
    )
}

/// Filter string for the legacy backend: waves, alpha falloff, blur last.
pub fn legacy_filter(config: &GlowConfig) -> String {
    let mut filter = String::new();
    for _ in 0..config.lighten {
        filter.push_str(
            "progid:DXImageTransform.Microsoft.Wave(freq=0, lightStrength=100, strength=1, add=1) ",
        );
    }
    filter.push_str(&format!(
        "progid:DXImageTransform.Microsoft.Alpha(opacity=100, finishopacity={}, style=2) ",
        config.legacy_falloff
    ));
    filter.push_str(&format!(
        "progid:DXImageTransform.Microsoft.Blur(pixelradius={})",
        config.blur
    ));
    filter
}

impl GlowBackend for CssBackend {
    fn build_visual(&self, _image: &ImageInfo, config: &GlowConfig, _id: &str) -> Visual {
        Visual::Clone(FilteredClone {
            property: self.property.name(),
            filter: css_filter(config),
        })
    }
}

impl GlowBackend for SvgBackend {
    fn build_visual(&self, image: &ImageInfo, config: &GlowConfig, id: &str) -> Visual {
        let margin = config.blur * SVG_MARGIN_FACTOR;
        let offset = config.blur * SVG_OFFSET_FACTOR;
        Visual::Svg(SvgCanvas {
            width: image.width + margin,
            height: image.height + margin,
            graph: build_filter_graph(id, config),
            image: SvgImage {
                x: offset,
                y: offset,
                width: image.width,
                height: image.height,
                href: image.src.clone(),
            },
        })
    }
}

impl GlowBackend for LegacyBackend {
    fn build_visual(&self, _image: &ImageInfo, config: &GlowConfig, _id: &str) -> Visual {
        Visual::Clone(FilteredClone {
            property: "filter",
            filter: legacy_filter(config),
        })
    }
}

impl Backend {
    fn builder(&self) -> Box<dyn GlowBackend> {
        match *self {
            Backend::Css(property) => Box::new(CssBackend { property }),
            Backend::Svg => Box::new(SvgBackend),
            Backend::Legacy => Box::new(LegacyBackend),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Css(_) => "css",
            Backend::Svg => "svg",
            Backend::Legacy => "legacy",
        }
    }

    pub fn build_visual(&self, image: &ImageInfo, config: &GlowConfig, id: &str) -> Visual {
        self.builder().build_visual(image, config, id)
    }

    /// Where the glow wrapper sits and how it is revealed.
    pub fn layout(&self, config: &GlowConfig, supports_blur: bool) -> GlowLayout {
        let offset = match self {
            Backend::Css(_) => 0.0,
            Backend::Svg => -config.blur * SVG_OFFSET_FACTOR,
            Backend::Legacy => -config.blur - LEGACY_EDGE,
        };
        GlowLayout {
            offset,
            fade_in_ms: if supports_blur { config.fade_in_ms } else { 0 },
        }
    }
}
