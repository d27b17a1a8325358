//! iglow
//!
//! Two small page-enhancement widgets for documentation pages:
//!
//! - [`finder`]: an incremental filter that hides list items (and whole
//!   groups) whose titles do not contain the typed query.
//! - [`glow`]: a soft halo attached beneath images, rendered with CSS
//!   filters, an SVG filter graph or legacy filter directives depending on
//!   what the host supports.
//!
//! Both widgets work against the [`dom::ElementTree`] trait. The in-memory
//! [`dom::Document`] implements it for tests and server-side use; the
//! `wasm` feature adds a browser implementation and JavaScript exports.
//!
//! [`filters`] renders the SVG glow in software on `ndarray` buffers, which
//! backs the raster previews exposed to Python (feature `python`) and
//! JavaScript (feature `wasm`).

pub mod dom;
pub mod error;
pub mod filters;
pub mod finder;
pub mod glow;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{Error, Result};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::error::Error;
    use crate::filters::preview;
    use crate::finder;
    use crate::glow::backend::{GlowBackend, ImageInfo, SvgBackend};
    use crate::glow::config::{GlowConfig, GlowOverrides};
    use crate::glow::render::to_markup;

    fn value_error(e: Error) -> PyErr {
        PyValueError::new_err(e.to_string())
    }

    fn resolve_config(overrides_json: Option<&str>) -> PyResult<GlowConfig> {
        let overrides = match overrides_json {
            Some(json) => GlowOverrides::from_json(json).map_err(value_error)?,
            None => GlowOverrides::default(),
        };
        Ok(GlowConfig::default().with_overrides(&overrides))
    }

    // ========================================================================
    // Glow
    // ========================================================================

    /// Render the SVG glow of an RGB/RGBA u8 image in software.
    ///
    /// # Arguments
    /// * `image` - Input image (H, W, 3 or 4)
    /// * `overrides_json` - Optional JSON object of glow options, e.g.
    ///   `{"blur": 6, "useImage": true}`
    ///
    /// # Returns
    /// RGBA u8 image of shape (H + 8*blur, W + 8*blur, 4)
    #[pyfunction]
    #[pyo3(signature = (image, overrides_json=None))]
    pub fn glow_preview_rgba<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        overrides_json: Option<&str>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let config = resolve_config(overrides_json)?;
        let input = image.as_array();
        let result = preview::glow_preview_rgba(input, &config);
        Ok(result.into_pyarray(py))
    }

    /// SVG markup of the glow canvas for an image of the given size.
    #[pyfunction]
    #[pyo3(signature = (width, height, src, overrides_json=None))]
    pub fn glow_filter_svg(
        width: f32,
        height: f32,
        src: &str,
        overrides_json: Option<&str>,
    ) -> PyResult<String> {
        let config = resolve_config(overrides_json)?;
        let image = ImageInfo {
            width,
            height,
            src: src.to_string(),
        };
        let visual = SvgBackend.build_visual(&image, &config, "iglow-blur-0");
        Ok(to_markup(&visual, &image))
    }

    // ========================================================================
    // Finder
    // ========================================================================

    /// Whether an item with `titles` stays visible for `query`.
    #[pyfunction]
    pub fn title_matches(query: &str, titles: Vec<String>) -> bool {
        finder::item_visible(query, &titles)
    }

    // ========================================================================
    // Module Registration
    // ========================================================================

    /// Python module definition
    #[pymodule]
    pub fn iglow(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(glow_preview_rgba, m)?)?;
        m.add_function(wrap_pyfunction!(glow_filter_svg, m)?)?;
        m.add_function(wrap_pyfunction!(title_matches, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::iglow;
