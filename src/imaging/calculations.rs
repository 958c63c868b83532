//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate dimensions that fit inside a `max_edge` square, keeping aspect.
///
/// Images already within bounds are returned unchanged (never upscaled).
/// Neither output edge drops below 1 pixel.
///
/// # Examples
/// ```
/// # use photo_presets::imaging::calculate_fit_dimensions;
/// // Landscape 4000x3000 into 2048 → 2048x1536
/// assert_eq!(calculate_fit_dimensions((4000, 3000), 2048), (2048, 1536));
///
/// // Already small enough
/// assert_eq!(calculate_fit_dimensions((640, 480), 2048), (640, 480));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), max_edge: u32) -> (u32, u32) {
    let (w, h) = source;
    let longer = w.max(h);
    if longer <= max_edge || longer == 0 {
        return (w, h);
    }

    let scale = max_edge as f64 / longer as f64;
    if w >= h {
        let new_h = ((h as f64 * scale).round() as u32).max(1);
        (max_edge, new_h)
    } else {
        let new_w = ((w as f64 * scale).round() as u32).max(1);
        (new_w, max_edge)
    }
}

/// Whether an image of `source` dimensions needs a resize to fit `max_edge`.
pub fn needs_resize(source: (u32, u32), max_edge: u32) -> bool {
    calculate_fit_dimensions(source, max_edge) != source
}
