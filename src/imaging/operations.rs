//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::needs_resize;
use super::params::{ResizeParams, Sharpening, ThumbnailParams};
use image::DynamicImage;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Configuration for the strip preview.
#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    /// Edge of the square preview in pixels.
    pub edge: u32,
    pub sharpening: Option<Sharpening>,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            edge: 96,
            sharpening: Some(Sharpening::light()),
        }
    }
}

/// Plan a preview operation without executing it.
pub fn plan_thumbnail(config: &ThumbnailConfig) -> ThumbnailParams {
    ThumbnailParams {
        edge: config.edge,
        sharpening: config.sharpening,
    }
}

/// Build the small fixed preview that strip thumbnails are rendered from.
pub fn create_preview(
    backend: &impl ImageBackend,
    image: &DynamicImage,
    config: &ThumbnailConfig,
) -> Result<DynamicImage> {
    backend.thumbnail(image, &plan_thumbnail(config))
}

/// Downscale a freshly acquired image so it fits `max_edge`.
///
/// Images already within bounds skip the backend entirely.
pub fn prepare_source(
    backend: &impl ImageBackend,
    image: DynamicImage,
    max_edge: u32,
) -> Result<DynamicImage> {
    let dims = (image.width(), image.height());
    if !needs_resize(dims, max_edge) {
        return Ok(image);
    }
    log::debug!("resizing acquired image {}x{} to fit {max_edge}", dims.0, dims.1);
    backend.resize(&image, &ResizeParams { max_edge })
}
