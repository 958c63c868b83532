//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Thumbnail crop | `image::DynamicImage::resize_to_fill` |
//! | Sharpening | `image::imageops::unsharpen` |
//! | Presets | [`Recipe`](super::presets::Recipe) over RGBA8 pixels |
//! | Encode → JPEG / PNG | `image::codecs::jpeg::JpegEncoder` / `image::codecs::png::PngEncoder` |

use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_fit_dimensions;
use super::params::{EncodeParams, ExportFormat, FilterOp, ResizeParams, ThumbnailParams};
use super::presets::Recipe;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_not_empty(image: &DynamicImage, what: &str) -> Result<(), BackendError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(BackendError::ProcessingFailed(format!(
            "{what}: image has no pixels ({}x{})",
            image.width(),
            image.height()
        )));
    }
    Ok(())
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!(
                    "Failed to decode {}: {}",
                    path.display(),
                    e
                ))
            })
    }

    fn resize(
        &self,
        image: &DynamicImage,
        params: &ResizeParams,
    ) -> Result<DynamicImage, BackendError> {
        ensure_not_empty(image, "resize")?;
        let (w, h) = calculate_fit_dimensions((image.width(), image.height()), params.max_edge);
        if (w, h) == (image.width(), image.height()) {
            return Ok(image.clone());
        }
        Ok(image.resize_exact(w, h, FilterType::Lanczos3))
    }

    fn thumbnail(
        &self,
        image: &DynamicImage,
        params: &ThumbnailParams,
    ) -> Result<DynamicImage, BackendError> {
        ensure_not_empty(image, "thumbnail")?;

        // Fill-resize then center-crop to an exact square
        let filled = image.resize_to_fill(params.edge, params.edge, FilterType::Lanczos3);

        Ok(match params.sharpening {
            Some(sharpening) => DynamicImage::from(image::imageops::unsharpen(
                &filled,
                sharpening.sigma,
                sharpening.threshold,
            )),
            None => filled,
        })
    }

    fn apply(&self, op: FilterOp, image: &DynamicImage) -> Result<DynamicImage, BackendError> {
        ensure_not_empty(image, op.key())?;
        let rgba = image.to_rgba8();
        Ok(DynamicImage::ImageRgba8(Recipe::for_op(op).apply(&rgba)))
    }

    fn encode(
        &self,
        image: &DynamicImage,
        params: &EncodeParams,
        path: &Path,
    ) -> Result<(), BackendError> {
        ensure_not_empty(image, "encode")?;
        let file = std::fs::File::create(path).map_err(BackendError::Io)?;
        let writer = std::io::BufWriter::new(file);

        match params.format {
            ExportFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
                let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                    writer,
                    params.quality.value() as u8,
                );
                rgb.write_with_encoder(encoder)
            }
            ExportFormat::Png => {
                let encoder = image::codecs::png::PngEncoder::new(writer);
                image.write_with_encoder(encoder)
            }
        }
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to encode {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::{Quality, Sharpening};
    use image::{ImageEncoder, RgbImage};

    fn synthetic(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }))
    }

    /// Create a small valid JPEG file with the given dimensions.
    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = synthetic(width, height).to_rgb8();
        let file = std::fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        image::codecs::jpeg::JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    #[test]
    fn decode_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let img = RustBackend::new().decode(&path).unwrap();
        assert_eq!((img.width(), img.height()), (200, 150));
    }

    #[test]
    fn decode_nonexistent_file_errors() {
        let result = RustBackend::new().decode(Path::new("/nonexistent/image.jpg"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn decode_garbage_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        let result = RustBackend::new().decode(&path);
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }

    #[test]
    fn resize_fits_longer_edge() {
        let out = RustBackend::new()
            .resize(&synthetic(400, 300), &ResizeParams { max_edge: 200 })
            .unwrap();
        assert_eq!((out.width(), out.height()), (200, 150));
    }

    #[test]
    fn resize_small_image_is_unchanged() {
        let img = synthetic(40, 30);
        let out = RustBackend::new()
            .resize(&img, &ResizeParams { max_edge: 200 })
            .unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn thumbnail_is_exact_square() {
        let backend = RustBackend::new();
        for (w, h) in [(800, 600), (600, 800)] {
            let thumb = backend
                .thumbnail(
                    &synthetic(w, h),
                    &ThumbnailParams {
                        edge: 64,
                        sharpening: Some(Sharpening::light()),
                    },
                )
                .unwrap();
            assert_eq!((thumb.width(), thumb.height()), (64, 64));
        }
    }

    #[test]
    fn thumbnail_without_sharpening() {
        let thumb = RustBackend::new()
            .thumbnail(
                &synthetic(100, 50),
                &ThumbnailParams {
                    edge: 32,
                    sharpening: None,
                },
            )
            .unwrap();
        assert_eq!((thumb.width(), thumb.height()), (32, 32));
    }

    #[test]
    fn apply_keeps_dimensions_and_is_deterministic() {
        let backend = RustBackend::new();
        let img = synthetic(30, 20);
        for op in FilterOp::ALL {
            let a = backend.apply(op, &img).unwrap();
            let b = backend.apply(op, &img).unwrap();
            assert_eq!((a.width(), a.height()), (30, 20));
            assert_eq!(a, b, "{op} not deterministic");
        }
    }

    #[test]
    fn apply_on_empty_image_fails() {
        let empty = DynamicImage::new_rgba8(0, 0);
        let result = RustBackend::new().apply(FilterOp::Mono, &empty);
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }

    #[test]
    fn encode_jpeg_and_png_roundtrip_dimensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = RustBackend::new();
        let img = backend.apply(FilterOp::Chrome, &synthetic(48, 32)).unwrap();

        for format in [ExportFormat::Jpeg, ExportFormat::Png] {
            let path = tmp.path().join(format!("out.{}", format.extension()));
            backend
                .encode(
                    &img,
                    &EncodeParams {
                        format,
                        quality: Quality::new(85),
                    },
                    &path,
                )
                .unwrap();
            let back = backend.decode(&path).unwrap();
            assert_eq!((back.width(), back.height()), (48, 32));
        }
    }

    #[test]
    fn encode_png_is_lossless() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = RustBackend::new();
        let img = backend.apply(FilterOp::Noir, &synthetic(16, 16)).unwrap();
        let path = tmp.path().join("noir.png");
        backend
            .encode(
                &img,
                &EncodeParams {
                    format: ExportFormat::Png,
                    quality: Quality::default(),
                },
                &path,
            )
            .unwrap();
        assert_eq!(backend.decode(&path).unwrap().to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn encode_into_missing_directory_errors() {
        let result = RustBackend::new().encode(
            &synthetic(4, 4),
            &EncodeParams {
                format: ExportFormat::Jpeg,
                quality: Quality::default(),
            },
            Path::new("/nonexistent/dir/out.jpg"),
        );
        assert!(matches!(result, Err(BackendError::Io(_))));
    }
}
