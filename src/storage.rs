//! Where saved photos go.
//!
//! [`PhotoStorage`] is the "save to the user's photo storage" seam. The
//! shipped implementation, [`DirectoryStorage`], writes numbered files into a
//! directory:
//!
//! ```text
//! saved/
//! ├── 0001-original.jpg
//! ├── 0002-mono.jpg
//! └── 0003-vivid.jpg
//! ```
//!
//! Numbering continues after the highest existing `NNNN-` prefix, so earlier
//! saves are never overwritten.

use crate::imaging::{BackendError, EncodeParams, ImageBackend};
use image::DynamicImage;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoding failed: {0}")]
    Backend(#[from] BackendError),
    #[error("no save number left after {0} in the save directory")]
    NumberingExhausted(u32),
}

/// Receipt for a stored photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    pub location: PathBuf,
}

pub trait PhotoStorage {
    /// Persist `image`. `label` names what is in it (filter name or "Original").
    fn store(&mut self, image: &DynamicImage, label: &str) -> Result<StoredPhoto, StorageError>;
}

/// Numbered files in a directory, created on first save.
pub struct DirectoryStorage<B> {
    directory: PathBuf,
    params: EncodeParams,
    backend: Arc<B>,
}

impl<B: ImageBackend> DirectoryStorage<B> {
    pub fn new(directory: impl Into<PathBuf>, params: EncodeParams, backend: Arc<B>) -> Self {
        Self {
            directory: directory.into(),
            params,
            backend,
        }
    }

    fn next_number(&self) -> Result<u32, StorageError> {
        let mut highest = 0;
        for entry in fs::read_dir(&self.directory)? {
            let name = entry?.file_name();
            if let Some(n) = leading_number(&name.to_string_lossy()) {
                highest = highest.max(n);
            }
        }
        highest
            .checked_add(1)
            .ok_or(StorageError::NumberingExhausted(highest))
    }
}

/// Number prefix of a `NNNN-label.ext` file name.
fn leading_number(file_name: &str) -> Option<u32> {
    let (prefix, _) = file_name.split_once('-')?;
    prefix.parse().ok()
}

/// Lowercase, dash-separated, ASCII-only form of a label for file names.
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "photo".to_string()
    } else {
        trimmed.to_string()
    }
}

impl<B: ImageBackend> PhotoStorage for DirectoryStorage<B> {
    fn store(&mut self, image: &DynamicImage, label: &str) -> Result<StoredPhoto, StorageError> {
        fs::create_dir_all(&self.directory)?;
        let number = self.next_number()?;
        let file_name = format!(
            "{:04}-{}.{}",
            number,
            slugify(label),
            self.params.format.extension()
        );
        let location = self.directory.join(file_name);
        self.backend.encode(image, &self.params, &location)?;
        log::info!("saved {}", location.display());
        Ok(StoredPhoto { location })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp, test_image};
    use crate::imaging::{ExportFormat, Quality, RustBackend};
    use tempfile::TempDir;

    /// In-memory storage that keeps every stored image.
    #[derive(Default)]
    pub struct MemoryStorage {
        pub saved: Vec<(String, DynamicImage)>,
    }

    impl PhotoStorage for MemoryStorage {
        fn store(
            &mut self,
            image: &DynamicImage,
            label: &str,
        ) -> Result<StoredPhoto, StorageError> {
            self.saved.push((label.to_string(), image.clone()));
            Ok(StoredPhoto {
                location: PathBuf::from(format!("memory://{}", self.saved.len())),
            })
        }
    }

    fn jpeg_params() -> EncodeParams {
        EncodeParams {
            format: ExportFormat::Jpeg,
            quality: Quality::new(85),
        }
    }

    #[test]
    fn slugify_labels() {
        assert_eq!(slugify("Mono"), "mono");
        assert_eq!(slugify("Black & White"), "black-white");
        assert_eq!(slugify("  Vivid!! "), "vivid");
        assert_eq!(slugify("Ünïcode"), "n-code");
        assert_eq!(slugify("***"), "photo");
    }

    #[test]
    fn leading_number_parses_prefix() {
        assert_eq!(leading_number("0007-mono.jpg"), Some(7));
        assert_eq!(leading_number("mono.jpg"), None);
        assert_eq!(leading_number("notes-0007.txt"), None);
    }

    #[test]
    fn store_creates_directory_and_numbers_files() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("saved");
        let backend = Arc::new(MockBackend::new());
        let mut storage = DirectoryStorage::new(&dir, jpeg_params(), Arc::clone(&backend));

        // Mock encode writes nothing, so pre-create files to drive numbering
        let first = storage.store(&test_image(2, 2), "Original").unwrap();
        assert_eq!(first.location, dir.join("0001-original.jpg"));
        fs::write(&first.location, b"x").unwrap();

        let second = storage.store(&test_image(2, 2), "Mono").unwrap();
        assert_eq!(second.location, dir.join("0002-mono.jpg"));

        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Encode { quality: 85, format: ExportFormat::Jpeg, .. }
        ));
    }

    #[test]
    fn store_continues_after_highest_existing_number() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("0041-noir.jpg"), b"x").unwrap();
        fs::write(tmp.path().join("0007-fade.jpg"), b"x").unwrap();
        fs::write(tmp.path().join("README"), b"x").unwrap();

        let mut storage =
            DirectoryStorage::new(tmp.path(), jpeg_params(), Arc::new(MockBackend::new()));
        let stored = storage.store(&test_image(2, 2), "Curve").unwrap();
        assert_eq!(stored.location, tmp.path().join("0042-curve.jpg"));
    }

    #[test]
    fn store_reports_exhausted_numbering() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(format!("{}-noir.jpg", u32::MAX)), b"x").unwrap();

        let backend = Arc::new(MockBackend::new());
        let mut storage = DirectoryStorage::new(tmp.path(), jpeg_params(), Arc::clone(&backend));
        let result = storage.store(&test_image(2, 2), "Mono");

        assert!(matches!(
            result,
            Err(StorageError::NumberingExhausted(u32::MAX))
        ));
        assert!(backend.get_operations().is_empty());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn store_writes_real_png() {
        let tmp = TempDir::new().unwrap();
        let backend = Arc::new(RustBackend::new());
        let params = EncodeParams {
            format: ExportFormat::Png,
            quality: Quality::default(),
        };
        let mut storage = DirectoryStorage::new(tmp.path(), params, Arc::clone(&backend));

        let stored = storage.store(&test_image(8, 6), "Tonal").unwrap();
        assert!(stored.location.ends_with("0001-tonal.png"));
        let back = backend.decode(&stored.location).unwrap();
        assert_eq!((back.width(), back.height()), (8, 6));
    }

    #[test]
    fn store_reports_encode_failure() {
        let tmp = TempDir::new().unwrap();
        let mut storage =
            DirectoryStorage::new(tmp.path(), jpeg_params(), Arc::new(RustBackend::new()));
        let empty = DynamicImage::new_rgba8(0, 0);
        assert!(matches!(
            storage.store(&empty, "Mono"),
            Err(StorageError::Backend(_))
        ));
    }
}
