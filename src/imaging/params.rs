//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the callers (catalog, session, storage) and the
//! [`backend`](super::backend), which does the actual pixel work. This
//! separation allows swapping backends (e.g. for testing with a mock) without
//! changing the selection logic.
//!
//! ## Types
//!
//! - [`FilterOp`] — Identifier for one preset transform.
//! - [`Quality`] — Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`Sharpening`] — Unsharp-mask parameters (sigma + threshold) for preview crispness.
//! - [`ResizeParams`] — Longest edge allowed after an acquisition resize.
//! - [`ThumbnailParams`] — Square preview edge and optional sharpening.
//! - [`EncodeParams`] — Output format and quality for saved photos.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Named image transform referenced by a catalog entry.
///
/// The variants are the ten presets of the stock catalog, in display order.
/// `LinearToSrgb` and `SrgbToLinear` are pure tone curves; the others are
/// color recipes (see [`presets`](super::presets)).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Chrome,
    Fade,
    Instant,
    Mono,
    Noir,
    Process,
    Tonal,
    Transfer,
    LinearToSrgb,
    SrgbToLinear,
}

impl FilterOp {
    pub const ALL: [FilterOp; 10] = [
        FilterOp::Chrome,
        FilterOp::Fade,
        FilterOp::Instant,
        FilterOp::Mono,
        FilterOp::Noir,
        FilterOp::Process,
        FilterOp::Tonal,
        FilterOp::Transfer,
        FilterOp::LinearToSrgb,
        FilterOp::SrgbToLinear,
    ];

    /// Stable kebab-case key, accepted by [`FromStr`].
    pub fn key(self) -> &'static str {
        match self {
            FilterOp::Chrome => "chrome",
            FilterOp::Fade => "fade",
            FilterOp::Instant => "instant",
            FilterOp::Mono => "mono",
            FilterOp::Noir => "noir",
            FilterOp::Process => "process",
            FilterOp::Tonal => "tonal",
            FilterOp::Transfer => "transfer",
            FilterOp::LinearToSrgb => "linear-to-srgb",
            FilterOp::SrgbToLinear => "srgb-to-linear",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FilterOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterOp::ALL
            .into_iter()
            .find(|op| op.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown filter operation: {s}"))
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Sharpening parameters for unsharp mask.
///
/// - `sigma`: Standard deviation of the Gaussian blur (higher = more sharpening)
/// - `threshold`: Minimum brightness difference to sharpen (0 = sharpen all pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sharpening {
    pub sigma: f32,
    pub threshold: i32,
}

impl Sharpening {
    /// Light sharpening suitable for thumbnails.
    pub fn light() -> Self {
        Self {
            sigma: 0.5,
            threshold: 0,
        }
    }
}

/// Parameters for a fit-inside resize. Images are never upscaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    pub max_edge: u32,
}

/// Parameters for a square preview (resize to fill + center crop).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbnailParams {
    pub edge: u32,
    pub sharpening: Option<Sharpening>,
}

/// Encoded output format for saved photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Jpeg,
    Png,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Png => "png",
        }
    }

    /// Format implied by a file extension, if it is one we can write.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "png" => Some(ExportFormat::Png),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub format: ExportFormat,
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn sharpening_light_values() {
        let s = Sharpening::light();
        assert_eq!(s.sigma, 0.5);
        assert_eq!(s.threshold, 0);
    }

    #[test]
    fn filter_op_keys_parse_back() {
        for op in FilterOp::ALL {
            assert_eq!(op.key().parse::<FilterOp>().unwrap(), op);
        }
    }

    #[test]
    fn filter_op_parse_is_case_insensitive() {
        assert_eq!("NOIR".parse::<FilterOp>().unwrap(), FilterOp::Noir);
        assert_eq!(
            "Linear-To-SRGB".parse::<FilterOp>().unwrap(),
            FilterOp::LinearToSrgb
        );
    }

    #[test]
    fn filter_op_parse_rejects_unknown() {
        assert!("sepia".parse::<FilterOp>().is_err());
    }

    #[test]
    fn export_format_extensions() {
        assert_eq!(ExportFormat::Jpeg.extension(), "jpg");
        assert_eq!(ExportFormat::Png.extension(), "png");
        assert_eq!(ExportFormat::default(), ExportFormat::Jpeg);
    }

    #[test]
    fn export_format_from_path() {
        assert_eq!(
            ExportFormat::from_path(Path::new("out/a.JPEG")),
            Some(ExportFormat::Jpeg)
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("a.png")),
            Some(ExportFormat::Png)
        );
        assert_eq!(ExportFormat::from_path(Path::new("a.webp")), None);
        assert_eq!(ExportFormat::from_path(Path::new("noext")), None);
    }
}
