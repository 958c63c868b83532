//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the five operations every backend must
//! support: decode, resize, thumbnail, apply, and encode. Everything above
//! this seam (catalog, session, storage) works on [`DynamicImage`] values and
//! never touches pixel math directly.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — pure Rust, built on
//! the `image` crate.

use super::params::{EncodeParams, FilterOp, ResizeParams, ThumbnailParams};
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
///
/// `Send + Sync` because acquisitions resize on a worker thread and the
/// thumbnail strip renders filters in parallel.
pub trait ImageBackend: Send + Sync {
    /// Decode an image file.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Fit the image inside `params.max_edge`, keeping aspect. Never upscales.
    fn resize(&self, image: &DynamicImage, params: &ResizeParams)
    -> Result<DynamicImage, BackendError>;

    /// Square preview: fill-resize, center crop, optional sharpening.
    fn thumbnail(
        &self,
        image: &DynamicImage,
        params: &ThumbnailParams,
    ) -> Result<DynamicImage, BackendError>;

    /// Run one preset transform. Must be deterministic.
    fn apply(&self, op: FilterOp, image: &DynamicImage) -> Result<DynamicImage, BackendError>;

    /// Encode and write the image to `path`.
    fn encode(
        &self,
        image: &DynamicImage,
        params: &EncodeParams,
        path: &Path,
    ) -> Result<(), BackendError>;
}
