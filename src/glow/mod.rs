//! Glow effect for images.
//!
//! [`GlowEngine::apply`] probes the host once, selects a [`Backend`], builds
//! a [`Visual`] per image and attaches it under the image:
//!
//! ```text
//! div.iglow-wrapper
//! ├── img.iglow            position: relative; z-index: 2
//! └── div#iglow-N.iglow    position: absolute; z-index: 1; faded in
//!     └── visual           filtered clone or padded <svg>
//! ```
//!
//! Images already carrying [`MARKER_CLASS`] are left alone, so repeated
//! calls never stack wrappers.

pub mod backend;
pub mod capability;
pub mod config;
pub mod graph;
pub mod render;

pub use backend::{GlowBackend, GlowLayout, ImageInfo, Visual};
pub use capability::{select_backend, Backend, Capabilities, CapabilityProbe, CssFilterProperty};
pub use config::{GlowConfig, GlowOverrides};
pub use graph::{build_filter_graph, FilterGraph, Primitive};

use tracing::{debug, warn};

use crate::dom::{ElementTree, Namespace};
use crate::error::Result;

/// Class marking processed images.
pub const MARKER_CLASS: &str = "iglow";
/// Class of the positioning wrapper around a processed image.
pub const WRAPPER_CLASS: &str = "iglow-wrapper";

/// Nodes and decisions for one processed image.
#[derive(Debug, Clone)]
pub struct GlowInstance<N> {
    pub image: N,
    pub wrapper: N,
    pub glow: N,
    pub visual_node: N,
    pub backend: Backend,
    pub layout: GlowLayout,
    pub visual: Visual,
}

/// Applies glows using fixed defaults and a host capability probe.
#[derive(Debug, Clone)]
pub struct GlowEngine<P> {
    defaults: GlowConfig,
    probe: P,
}

impl<P: CapabilityProbe> GlowEngine<P> {
    pub fn new(probe: P) -> Self {
        Self::with_defaults(probe, GlowConfig::default())
    }

    pub fn with_defaults(probe: P, defaults: GlowConfig) -> Self {
        GlowEngine { defaults, probe }
    }

    pub fn defaults(&self) -> &GlowConfig {
        &self.defaults
    }

    /// Resolved configuration for a call with `overrides`.
    pub fn config(&self, overrides: &GlowOverrides) -> GlowConfig {
        self.defaults.with_overrides(overrides)
    }

    /// Attach a glow to every unprocessed image in `images`.
    ///
    /// Never fails: an image whose structure cannot be built is logged and
    /// skipped.
    pub fn apply<T: ElementTree>(
        &self,
        tree: &mut T,
        images: &[T::Node],
        overrides: &GlowOverrides,
    ) -> Vec<GlowInstance<T::Node>> {
        let config = self.config(overrides);
        let caps = self.probe.capabilities();
        let backend = select_backend(&caps, &config);
        let layout = backend.layout(&config, caps.supports_blur());

        let mut next_index = tree.select(&format!(".{WRAPPER_CLASS}")).len();
        let mut instances = Vec::new();

        for image in images {
            if tree.has_class(image, MARKER_CLASS) {
                debug!(?image, "image already has a glow, skipped");
                continue;
            }
            match attach(tree, image, next_index, backend, layout, &config) {
                Ok(instance) => {
                    next_index += 1;
                    instances.push(instance);
                }
                Err(e) => warn!(?image, error = %e, "glow not attached"),
            }
        }

        debug!(
            backend = backend.name(),
            requested = images.len(),
            attached = instances.len(),
            "glow applied"
        );
        instances
    }
}

fn px(value: f32) -> String {
    format!("{value}px")
}

fn attach<T: ElementTree>(
    tree: &mut T,
    image: &T::Node,
    index: usize,
    backend: Backend,
    layout: GlowLayout,
    config: &GlowConfig,
) -> Result<GlowInstance<T::Node>> {
    let (width, height) = tree.image_size(image);
    let info = ImageInfo {
        width,
        height,
        src: tree.attribute(image, "src").unwrap_or_default(),
    };

    let visual = backend.build_visual(&info, config, &format!("iglow-blur-{index}"));
    let visual_node = render::materialize(tree, image, &visual)?;

    let glow = tree.create_element(Namespace::Html, "div")?;
    tree.set_attribute(&glow, "id", &format!("iglow-{index}"));
    tree.add_class(&glow, MARKER_CLASS);
    tree.set_style(&glow, "position", "absolute");
    tree.set_style(&glow, "z-index", "1");
    tree.set_style(&glow, "left", &px(layout.offset));
    tree.set_style(&glow, "top", &px(layout.offset));
    if let Visual::Clone(_) = visual {
        tree.set_style(&glow, "width", &px(width));
        tree.set_style(&glow, "height", &px(height));
    }
    tree.append_child(&glow, &visual_node)?;

    let wrapper = tree.create_element(Namespace::Html, "div")?;
    tree.add_class(&wrapper, WRAPPER_CLASS);
    tree.wrap(image, &wrapper)?;

    tree.set_displayed(&glow, false);
    tree.insert_after(image, &glow)?;

    // Mark only once the glow is in place
    tree.add_class(image, MARKER_CLASS);
    tree.set_style(image, "position", "relative");
    tree.set_style(image, "z-index", "2");
    tree.fade_in(&glow, layout.fade_in_ms);

    Ok(GlowInstance {
        image: image.clone(),
        wrapper,
        glow,
        visual_node,
        backend,
        layout,
        visual,
    })
}
