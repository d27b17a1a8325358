//! Glow configuration.
//!
//! [`GlowConfig`] is a complete, immutable set of parameters. Callers
//! override parts of it with a [`GlowOverrides`] record; the combination is
//! a new value and never touches the defaults it was built from.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Parameters of the glow effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct GlowConfig {
    /// Number of screen-blend passes brightening the halo.
    pub lighten: u32,
    /// Turbulence base frequency; 0 disables the distortion stage.
    pub turbulence: f32,
    /// Displacement scale of the distortion stage.
    pub displace: f32,
    /// Dilate radius; 0 skips the stage.
    pub dilate: f32,
    /// Erode radius; 0 skips the stage.
    pub erode: f32,
    /// Blur standard deviation in pixels.
    pub blur: f32,
    /// Blend the sharp source over the halo.
    pub use_image: bool,
    /// Prefer the SVG backend even when CSS filters are available.
    #[serde(rename = "forceSVG")]
    pub force_svg: bool,
    /// Final opacity (0-100) of the legacy alpha falloff.
    pub legacy_falloff: u8,
    /// Duration of the reveal transition.
    pub fade_in_ms: u32,
}

impl Default for GlowConfig {
    fn default() -> Self {
        GlowConfig {
            lighten: 2,
            turbulence: 0.0,
            displace: 5.0,
            dilate: 1.0,
            erode: 6.0,
            blur: 14.0,
            use_image: false,
            force_svg: false,
            legacy_falloff: 55,
            fade_in_ms: 500,
        }
    }
}

/// Per-call overrides; unset fields fall back to the engine defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct GlowOverrides {
    pub lighten: Option<u32>,
    pub turbulence: Option<f32>,
    pub displace: Option<f32>,
    pub dilate: Option<f32>,
    pub erode: Option<f32>,
    pub blur: Option<f32>,
    pub use_image: Option<bool>,
    #[serde(rename = "forceSVG")]
    pub force_svg: Option<bool>,
    pub legacy_falloff: Option<u8>,
    pub fade_in_ms: Option<u32>,
}

impl GlowOverrides {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_empty(&self) -> bool {
        *self == GlowOverrides::default()
    }
}

impl GlowConfig {
    /// A new configuration: `self` with every set field of `overrides`.
    pub fn with_overrides(&self, overrides: &GlowOverrides) -> GlowConfig {
        GlowConfig {
            lighten: overrides.lighten.unwrap_or(self.lighten),
            turbulence: overrides.turbulence.unwrap_or(self.turbulence),
            displace: overrides.displace.unwrap_or(self.displace),
            dilate: overrides.dilate.unwrap_or(self.dilate),
            erode: overrides.erode.unwrap_or(self.erode),
            blur: overrides.blur.unwrap_or(self.blur),
            use_image: overrides.use_image.unwrap_or(self.use_image),
            force_svg: overrides.force_svg.unwrap_or(self.force_svg),
            legacy_falloff: overrides.legacy_falloff.unwrap_or(self.legacy_falloff),
            fade_in_ms: overrides.fade_in_ms.unwrap_or(self.fade_in_ms),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
