//! Image processing — pure Rust on top of the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` |
//! | **Acquisition resize** | Lanczos3 fit-inside |
//! | **Preview** | `resize_to_fill` + `unsharpen` |
//! | **Presets** | color matrix + baked tone curves |
//! | **Encode** | JPEG / PNG encoders |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Presets**: Pure pixel math for the ten filters (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod presets;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{calculate_fit_dimensions, needs_resize};
pub use operations::{ThumbnailConfig, create_preview, prepare_source};
pub use params::{
    EncodeParams, ExportFormat, FilterOp, Quality, ResizeParams, Sharpening, ThumbnailParams,
};
pub use rust_backend::RustBackend;
