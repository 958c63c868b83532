//! The filter catalog: a fixed, ordered list of named presets.
//!
//! Order is display order in the selection strip and is significant: the
//! session addresses filters by index. The stock catalog is:
//!
//! | Index | Name | Op |
//! |---|---|---|
//! | 0 | Vivid | `chrome` |
//! | 1 | Fade | `fade` |
//! | 2 | Instant | `instant` |
//! | 3 | Mono | `mono` |
//! | 4 | Noir | `noir` |
//! | 5 | Process | `process` |
//! | 6 | Tonal | `tonal` |
//! | 7 | Transfer | `transfer` |
//! | 8 | Curve | `linear-to-srgb` |
//! | 9 | Linear | `srgb-to-linear` |
//!
//! ## Thumbnails
//!
//! [`FilterCatalog::thumbnail`] renders one entry on demand.
//! [`FilterCatalog::render_strip`] renders all of them at once, in parallel,
//! which front-loads the cost so that scrolling the strip later is free.
//! Either way the result is the same pixels.

use crate::imaging::{BackendError, FilterOp, ImageBackend};
use image::DynamicImage;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("filter index {index} out of range (catalog has {count} filters)")]
    OutOfRange { index: usize, count: usize },
    #[error("filter '{name}' unavailable: {source}")]
    FilterUnavailable {
        name: String,
        #[source]
        source: BackendError,
    },
    #[error("duplicate filter name: {0}")]
    DuplicateName(String),
}

/// Stock presets, in strip order.
pub const STOCK_FILTERS: [(&str, FilterOp); 10] = [
    ("Vivid", FilterOp::Chrome),
    ("Fade", FilterOp::Fade),
    ("Instant", FilterOp::Instant),
    ("Mono", FilterOp::Mono),
    ("Noir", FilterOp::Noir),
    ("Process", FilterOp::Process),
    ("Tonal", FilterOp::Tonal),
    ("Transfer", FilterOp::Transfer),
    ("Curve", FilterOp::LinearToSrgb),
    ("Linear", FilterOp::SrgbToLinear),
];

/// A named reference to one image transform. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDescriptor {
    name: String,
    op: FilterOp,
}

impl FilterDescriptor {
    pub fn new(name: impl Into<String>, op: FilterOp) -> Self {
        Self {
            name: name.into(),
            op,
        }
    }

    /// Display label, unique within a catalog.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn op(&self) -> FilterOp {
        self.op
    }
}

#[derive(Debug, Clone)]
pub struct FilterCatalog {
    filters: Vec<FilterDescriptor>,
}

impl FilterCatalog {
    /// Build a catalog from descriptors in display order.
    pub fn new(filters: Vec<FilterDescriptor>) -> Result<Self, CatalogError> {
        for (i, filter) in filters.iter().enumerate() {
            if filters[..i].iter().any(|f| f.name == filter.name) {
                return Err(CatalogError::DuplicateName(filter.name.clone()));
            }
        }
        Ok(Self { filters })
    }

    /// The ten stock presets.
    pub fn stock() -> Self {
        Self {
            filters: STOCK_FILTERS
                .iter()
                .map(|(name, op)| FilterDescriptor::new(*name, *op))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterDescriptor> {
        self.filters.iter()
    }

    pub fn at(&self, index: usize) -> Result<&FilterDescriptor, CatalogError> {
        self.filters.get(index).ok_or(CatalogError::OutOfRange {
            index,
            count: self.filters.len(),
        })
    }

    /// Find a filter by display name or op key, ignoring case.
    pub fn position(&self, query: &str) -> Option<usize> {
        self.filters
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(query))
            .or_else(|| {
                let op: FilterOp = query.parse().ok()?;
                self.filters.iter().position(|f| f.op == op)
            })
    }

    /// Render the thumbnail for one entry from the shared preview image.
    pub fn thumbnail(
        &self,
        backend: &impl ImageBackend,
        index: usize,
        preview: &DynamicImage,
    ) -> Result<DynamicImage, CatalogError> {
        let descriptor = self.at(index)?;
        run(backend, descriptor, preview)
    }

    /// Render every thumbnail up front, in parallel.
    ///
    /// A failing filter does not abort the strip; its entry carries the error.
    pub fn render_strip(
        &self,
        backend: &impl ImageBackend,
        preview: &DynamicImage,
    ) -> ThumbnailStrip {
        let started = Instant::now();
        let entries: Vec<StripEntry> = self
            .filters
            .par_iter()
            .enumerate()
            .map(|(index, descriptor)| StripEntry {
                index,
                name: descriptor.name.clone(),
                thumbnail: run(backend, descriptor, preview),
            })
            .collect();
        log::debug!(
            "rendered {} thumbnails in {:?}",
            entries.len(),
            started.elapsed()
        );
        ThumbnailStrip { entries }
    }
}

impl Default for FilterCatalog {
    fn default() -> Self {
        Self::stock()
    }
}

fn run(
    backend: &impl ImageBackend,
    descriptor: &FilterDescriptor,
    image: &DynamicImage,
) -> Result<DynamicImage, CatalogError> {
    backend
        .apply(descriptor.op, image)
        .map_err(|source| CatalogError::FilterUnavailable {
            name: descriptor.name.clone(),
            source,
        })
}

/// Apply a selection to an image.
///
/// `None` means "no filter": the very same handle comes back. Backend
/// failures surface as [`CatalogError::FilterUnavailable`]; the original is
/// never substituted here.
pub fn apply(
    backend: &impl ImageBackend,
    descriptor: Option<&FilterDescriptor>,
    image: &Arc<DynamicImage>,
) -> Result<Arc<DynamicImage>, CatalogError> {
    match descriptor {
        None => Ok(Arc::clone(image)),
        Some(descriptor) => run(backend, descriptor, image).map(Arc::new),
    }
}

/// One cell of the selection strip.
#[derive(Debug)]
pub struct StripEntry {
    pub index: usize,
    pub name: String,
    pub thumbnail: Result<DynamicImage, CatalogError>,
}

/// Eagerly rendered thumbnails for every catalog entry, in catalog order.
#[derive(Debug)]
pub struct ThumbnailStrip {
    pub entries: Vec<StripEntry>,
}

impl ThumbnailStrip {
    pub fn failures(&self) -> impl Iterator<Item = &StripEntry> {
        self.entries.iter().filter(|e| e.thumbnail.is_err())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::RustBackend;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp, test_image};

    #[test]
    fn stock_catalog_names_in_order() {
        let catalog = FilterCatalog::stock();
        let names: Vec<&str> = catalog.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            [
                "Vivid", "Fade", "Instant", "Mono", "Noir", "Process", "Tonal", "Transfer",
                "Curve", "Linear"
            ]
        );
        assert_eq!(catalog.len(), 10);
    }

    #[test]
    fn at_three_is_mono() {
        let catalog = FilterCatalog::stock();
        let mono = catalog.at(3).unwrap();
        assert_eq!(mono.name(), "Mono");
        assert_eq!(mono.op(), FilterOp::Mono);
    }

    #[test]
    fn at_out_of_range() {
        let catalog = FilterCatalog::stock();
        assert!(matches!(
            catalog.at(10),
            Err(CatalogError::OutOfRange {
                index: 10,
                count: 10
            })
        ));
    }

    #[test]
    fn new_rejects_duplicate_names() {
        let result = FilterCatalog::new(vec![
            FilterDescriptor::new("Mono", FilterOp::Mono),
            FilterDescriptor::new("Mono", FilterOp::Noir),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateName(n)) if n == "Mono"));
    }

    #[test]
    fn new_accepts_custom_order() {
        let catalog = FilterCatalog::new(vec![
            FilterDescriptor::new("B&W", FilterOp::Noir),
            FilterDescriptor::new("Warm", FilterOp::Transfer),
        ])
        .unwrap();
        assert_eq!(catalog.at(1).unwrap().name(), "Warm");
    }

    #[test]
    fn position_matches_name_or_key() {
        let catalog = FilterCatalog::stock();
        assert_eq!(catalog.position("noir"), Some(4));
        assert_eq!(catalog.position("VIVID"), Some(0));
        assert_eq!(catalog.position("chrome"), Some(0));
        assert_eq!(catalog.position("srgb-to-linear"), Some(9));
        assert_eq!(catalog.position("Linear-To-SRGB"), Some(8));
        assert_eq!(catalog.position("sepia"), None);
    }

    #[test]
    fn apply_none_returns_same_handle() {
        let backend = MockBackend::new();
        let img = Arc::new(test_image(4, 4));
        let out = apply(&backend, None, &img).unwrap();
        assert!(Arc::ptr_eq(&img, &out));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn apply_is_deterministic_for_every_entry() {
        let backend = RustBackend::new();
        let catalog = FilterCatalog::stock();
        let img = Arc::new(test_image(12, 9));
        for descriptor in catalog.iter() {
            let a = apply(&backend, Some(descriptor), &img).unwrap();
            let b = apply(&backend, Some(descriptor), &img).unwrap();
            assert_eq!(a, b, "{} not deterministic", descriptor.name());
        }
    }

    #[test]
    fn apply_surfaces_backend_failure() {
        let backend = MockBackend::failing(vec![FilterOp::Fade]);
        let catalog = FilterCatalog::stock();
        let img = Arc::new(test_image(4, 4));
        let err = apply(&backend, Some(catalog.at(1).unwrap()), &img).unwrap_err();
        assert!(matches!(err, CatalogError::FilterUnavailable { ref name, .. } if name == "Fade"));
    }

    #[test]
    fn thumbnail_uses_entry_op() {
        let backend = MockBackend::new();
        let catalog = FilterCatalog::stock();
        catalog.thumbnail(&backend, 8, &test_image(4, 4)).unwrap();
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Apply(FilterOp::LinearToSrgb)]
        );
    }

    #[test]
    fn thumbnail_out_of_range_never_calls_backend() {
        let backend = MockBackend::new();
        let catalog = FilterCatalog::stock();
        assert!(catalog.thumbnail(&backend, 42, &test_image(4, 4)).is_err());
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn render_strip_matches_lazy_thumbnails() {
        let backend = RustBackend::new();
        let catalog = FilterCatalog::stock();
        let preview = test_image(16, 16);

        let strip = catalog.render_strip(&backend, &preview);
        assert_eq!(strip.entries.len(), catalog.len());
        for entry in &strip.entries {
            let lazy = catalog.thumbnail(&backend, entry.index, &preview).unwrap();
            assert_eq!(entry.thumbnail.as_ref().unwrap(), &lazy);
            assert_eq!(entry.name, catalog.at(entry.index).unwrap().name());
        }
    }

    #[test]
    fn render_strip_keeps_failed_entries() {
        let backend = MockBackend::failing(vec![FilterOp::Noir]);
        let strip = FilterCatalog::stock().render_strip(&backend, &test_image(4, 4));
        assert_eq!(strip.entries.len(), 10);
        let failed: Vec<&str> = strip.failures().map(|e| e.name.as_str()).collect();
        assert_eq!(failed, ["Noir"]);
    }
}
