//! WebAssembly exports.
//!
//! These functions are exposed to JavaScript via wasm-bindgen.
//!
//! - [`IncrementalSearch`]: binds a [`Finder`] to the page
//! - [`apply_glow`]: attaches glows to the images matching a selector
//! - [`glow_preview_rgba_wasm`]: software glow on a flat RGBA buffer
//!
//! Errors cross the boundary as JavaScript strings.

use std::rc::Rc;

use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::dom::web::{WebProbe, WebTree};
use crate::dom::{ElementTree, Event};
use crate::error::Error;
use crate::filters::core::rgba_from_flat;
use crate::filters::preview::glow_preview_rgba;
use crate::finder::{Finder, FinderConfig, FinderSelectors};
use crate::glow::{GlowConfig, GlowEngine, GlowOverrides};

impl From<Error> for JsValue {
    fn from(e: Error) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

fn overrides_from(json: Option<String>) -> Result<GlowOverrides, Error> {
    match json.as_deref() {
        Some(json) if !json.trim().is_empty() => GlowOverrides::from_json(json),
        _ => Ok(GlowOverrides::default()),
    }
}

// ============================================================================
// Incremental Search
// ============================================================================

/// A finder attached to the current document.
#[wasm_bindgen]
pub struct IncrementalSearch {
    finder: Rc<Finder<web_sys::Element>>,
    tree: WebTree,
}

#[wasm_bindgen]
impl IncrementalSearch {
    /// Attach to the page.
    ///
    /// # Arguments
    /// * `config_json` - Optional JSON object of selectors, e.g.
    ///   `{"queryInput": "#Search"}`; missing fields keep their defaults
    ///
    /// # Returns
    /// `undefined` when the page has no query input
    pub fn attach(config_json: Option<String>) -> Result<Option<IncrementalSearch>, JsValue> {
        let selectors = match config_json.as_deref() {
            Some(json) if !json.trim().is_empty() => FinderSelectors::from_json(json)?,
            _ => FinderSelectors::default(),
        };
        let mut tree = WebTree::from_window()?;
        let config = FinderConfig::new().with_selectors(selectors);
        let Some(finder) = Finder::attach(&mut tree, config) else {
            return Ok(None);
        };
        let finder = Rc::new(finder);

        for (node, kind) in tree.take_listeners() {
            let finder = Rc::clone(&finder);
            let document = tree.document().clone();
            let target = node.clone();
            let handler = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
                let mut tree = WebTree::new(document.clone());
                finder.handle_event(&mut tree, &Event::new(kind, target.clone()));
            });
            node.add_event_listener_with_callback(kind.as_str(), handler.as_ref().unchecked_ref())?;
            // Listeners live as long as the page
            handler.forget();
        }

        Ok(Some(IncrementalSearch { finder, tree }))
    }

    /// Filter for `query` without touching the input.
    ///
    /// # Returns
    /// Number of visible items
    pub fn filter(&mut self, query: &str) -> usize {
        self.finder.filter(&mut self.tree, query).visible_items
    }

    /// Filter using the input's current text.
    pub fn refresh(&mut self) -> usize {
        self.finder.refresh(&mut self.tree).visible_items
    }
}

// ============================================================================
// Glow
// ============================================================================

/// Attach a glow to every image matching `selector`.
///
/// # Arguments
/// * `selector` - CSS selector of the target images
/// * `overrides_json` - Optional JSON object of glow options
///
/// # Returns
/// Number of glows attached
#[wasm_bindgen]
pub fn apply_glow(selector: &str, overrides_json: Option<String>) -> Result<usize, JsValue> {
    let overrides = overrides_from(overrides_json)?;
    let mut tree = WebTree::from_window()?;
    let engine = GlowEngine::new(WebProbe::new(tree.document().clone()));
    let images = tree.select(selector);
    let attached = engine.apply(&mut tree, &images, &overrides).len();
    debug!(selector, attached, "apply_glow");
    Ok(attached)
}

/// Render the SVG glow of an RGBA u8 image in software.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `overrides_json` - Optional JSON object of glow options
///
/// # Returns
/// Flat RGBA bytes of size (width + 8 * blur) x (height + 8 * blur)
#[wasm_bindgen]
pub fn glow_preview_rgba_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    overrides_json: Option<String>,
) -> Result<Vec<u8>, JsValue> {
    let config = GlowConfig::default().with_overrides(&overrides_from(overrides_json)?);
    let input = rgba_from_flat(data, width, height)?;
    let result = glow_preview_rgba(input.view(), &config);
    Ok(result.into_raw_vec_and_offset().0)
}
