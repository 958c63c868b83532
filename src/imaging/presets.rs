//! Pure pixel math for the preset filters.
//!
//! Every preset compiles to a [`Recipe`]: an optional input tone curve, a 3×3
//! color matrix with offset, and an optional output tone curve. Curves are
//! baked into 256-entry lookup tables once per recipe, so applying a preset is
//! two table lookups and one matrix multiply per pixel.
//!
//! All functions here are pure: the same op and the same pixels always give
//! the same output, with no I/O and no global state.
//!
//! | Op | Recipe |
//! |---|---|
//! | `Chrome` | saturation ×1.25, contrast 1.10 |
//! | `Fade` | saturation ×0.75, lifted blacks, dimmed whites |
//! | `Instant` | warm channel gains, saturation ×0.90, slight fade |
//! | `Mono` | Rec. 709 luma |
//! | `Noir` | Rec. 709 luma, contrast 1.45 |
//! | `Process` | cool channel gains, saturation ×0.90, contrast 1.15 |
//! | `Tonal` | Rec. 601 luma, contrast 0.85 |
//! | `Transfer` | warm vintage gains, saturation ×1.05, slight fade |
//! | `LinearToSrgb` | sRGB transfer function applied to linear input |
//! | `SrgbToLinear` | inverse sRGB transfer function |

use super::params::FilterOp;
use image::{Rgba, RgbaImage};

type Matrix = [[f32; 3]; 3];

const IDENTITY: Matrix = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

const REC709: [f32; 3] = [0.2126, 0.7152, 0.0722];
const REC601: [f32; 3] = [0.299, 0.587, 0.114];

/// Convert an sRGB gamma-encoded value (0..=1) to linear light.
#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert a linear-light value (0..=1) to sRGB gamma encoding.
#[inline]
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Matrix that replaces every channel with the weighted luma.
fn luma_matrix(weights: [f32; 3]) -> Matrix {
    [weights, weights, weights]
}

/// Saturation matrix: 0 = luma only, 1 = unchanged, >1 = boosted.
fn saturation_matrix(amount: f32) -> Matrix {
    let mut m = [[0.0; 3]; 3];
    for (row, out) in m.iter_mut().enumerate() {
        for (col, cell) in out.iter_mut().enumerate() {
            let identity = if row == col { 1.0 } else { 0.0 };
            *cell = (1.0 - amount) * REC709[col] + amount * identity;
        }
    }
    m
}

fn gains(r: f32, g: f32, b: f32) -> Matrix {
    [[r, 0.0, 0.0], [0.0, g, 0.0], [0.0, 0.0, b]]
}

fn multiply(a: &Matrix, b: &Matrix) -> Matrix {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Bake a normalized curve into an 8-bit lookup table.
fn bake(curve: impl Fn(f32) -> f32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        let v = curve(i as f32 / 255.0).clamp(0.0, 1.0);
        *entry = (v * 255.0).round() as u8;
    }
    lut
}

fn contrast(amount: f32) -> impl Fn(f32) -> f32 {
    move |v| (v - 0.5) * amount + 0.5
}

/// Linear remap of `0..=1` onto `black..=white`.
fn fade(black: f32, white: f32) -> impl Fn(f32) -> f32 {
    move |v| black + (white - black) * v
}

/// Compiled form of one preset.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    input_curve: Option<[u8; 256]>,
    matrix: Matrix,
    offset: [f32; 3],
    output_curve: Option<[u8; 256]>,
}

impl Recipe {
    fn matrix(matrix: Matrix) -> Self {
        Self {
            input_curve: None,
            matrix,
            offset: [0.0; 3],
            output_curve: None,
        }
    }

    fn with_output_curve(mut self, lut: [u8; 256]) -> Self {
        self.output_curve = Some(lut);
        self
    }

    fn with_offset(mut self, offset: [f32; 3]) -> Self {
        self.offset = offset;
        self
    }

    fn curve(lut: [u8; 256]) -> Self {
        Self {
            input_curve: Some(lut),
            ..Self::matrix(IDENTITY)
        }
    }

    pub fn for_op(op: FilterOp) -> Self {
        match op {
            FilterOp::Chrome => {
                Self::matrix(saturation_matrix(1.25)).with_output_curve(bake(contrast(1.10)))
            }
            FilterOp::Fade => {
                Self::matrix(saturation_matrix(0.75)).with_output_curve(bake(fade(0.10, 0.92)))
            }
            FilterOp::Instant => Self::matrix(multiply(
                &gains(1.08, 1.02, 0.88),
                &saturation_matrix(0.90),
            ))
            .with_offset([0.02, 0.01, 0.0])
            .with_output_curve(bake(fade(0.05, 0.97))),
            FilterOp::Mono => Self::matrix(luma_matrix(REC709)),
            FilterOp::Noir => {
                Self::matrix(luma_matrix(REC709)).with_output_curve(bake(contrast(1.45)))
            }
            FilterOp::Process => Self::matrix(multiply(
                &gains(0.94, 1.0, 1.10),
                &saturation_matrix(0.90),
            ))
            .with_output_curve(bake(contrast(1.15))),
            FilterOp::Tonal => {
                Self::matrix(luma_matrix(REC601)).with_output_curve(bake(contrast(0.85)))
            }
            FilterOp::Transfer => Self::matrix(multiply(
                &gains(1.10, 1.0, 0.85),
                &saturation_matrix(1.05),
            ))
            .with_offset([0.0, 0.0, 0.03])
            .with_output_curve(bake(fade(0.04, 0.98))),
            FilterOp::LinearToSrgb => Self::curve(bake(linear_to_srgb)),
            FilterOp::SrgbToLinear => Self::curve(bake(srgb_to_linear)),
        }
    }

    /// Map a single pixel. Alpha is passed through untouched.
    pub fn map_pixel(&self, px: Rgba<u8>) -> Rgba<u8> {
        let [r, g, b, a] = px.0;
        let mut rgb = [r, g, b];
        if let Some(lut) = &self.input_curve {
            rgb = rgb.map(|c| lut[c as usize]);
        }

        if self.matrix != IDENTITY || self.offset != [0.0; 3] {
            let v = rgb.map(|c| c as f32 / 255.0);
            let mut out = [0u8; 3];
            for (i, channel) in out.iter_mut().enumerate() {
                let m = self.matrix[i];
                let mixed = m[0] * v[0] + m[1] * v[1] + m[2] * v[2] + self.offset[i];
                *channel = (mixed.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
            rgb = out;
        }

        if let Some(lut) = &self.output_curve {
            rgb = rgb.map(|c| lut[c as usize]);
        }
        Rgba([rgb[0], rgb[1], rgb[2], a])
    }

    pub fn apply(&self, img: &RgbaImage) -> RgbaImage {
        let mut out = img.clone();
        for px in out.pixels_mut() {
            *px = self.map_pixel(*px);
        }
        out
    }
}
