//! Renderer capability detection and backend selection.

use tracing::debug;

use super::config::GlowConfig;

/// CSS property that accepted a filter in the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssFilterProperty {
    /// `-webkit-filter`, probed first.
    Prefixed,
    /// `filter`.
    Standard,
}

impl CssFilterProperty {
    pub fn name(self) -> &'static str {
        match self {
            CssFilterProperty::Prefixed => "-webkit-filter",
            CssFilterProperty::Standard => "filter",
        }
    }
}

/// Probes a host runs to learn what it can render.
pub trait CapabilityProbe {
    /// Which property (if any) accepts a CSS blur filter. Implementations
    /// should try the prefixed property first.
    fn css_filter(&self) -> Option<CssFilterProperty>;

    /// Whether a synthetic `feGaussianBlur` node exposes a blur API.
    fn svg_blur(&self) -> bool;

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            css_filter: self.css_filter(),
            svg_blur: self.svg_blur(),
        }
    }
}

/// Result of probing a host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub css_filter: Option<CssFilterProperty>,
    pub svg_blur: bool,
}

impl Capabilities {
    /// No CSS filters, no SVG blur: only the legacy path remains.
    pub const NONE: Capabilities = Capabilities {
        css_filter: None,
        svg_blur: false,
    };

    /// Whether the host can blur at all. Without blur the reveal is instant.
    pub fn supports_blur(&self) -> bool {
        self.css_filter.is_some() || self.svg_blur
    }
}

/// Fixed capabilities act as their own probe.
impl CapabilityProbe for Capabilities {
    fn css_filter(&self) -> Option<CssFilterProperty> {
        self.css_filter
    }

    fn svg_blur(&self) -> bool {
        self.svg_blur
    }

    fn capabilities(&self) -> Capabilities {
        *self
    }
}

/// Rendering path for the glow visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Css(CssFilterProperty),
    Svg,
    Legacy,
}

/// Pick a backend; first match wins:
/// 1. CSS filters, unless `force_svg`
/// 2. SVG Gaussian blur
/// 3. legacy filters
pub fn select_backend(caps: &Capabilities, config: &GlowConfig) -> Backend {
    let backend = match caps.css_filter {
        Some(property) if !config.force_svg => Backend::Css(property),
        _ if caps.svg_blur => Backend::Svg,
        _ => Backend::Legacy,
    };
    debug!(?caps, force_svg = config.force_svg, ?backend, "glow backend selected");
    backend
}
