//! Image acquisition: where source images come from.
//!
//! An [`ImageSource`] stands in for "pick from library" or "capture from
//! camera". Sources run on the session's worker thread and may be slow, so
//! they receive a [`CancelToken`] to check while they work. Returning
//! [`AcquireError::Cancelled`] means the user backed out; the session treats
//! that as an ordinary outcome, not a failure.

use crate::imaging::{BackendError, ImageBackend};
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("acquisition cancelled")]
    Cancelled,
    #[error("Image acquisition failed: {0}")]
    Backend(#[from] BackendError),
    #[error("acquisition worker exited without a result")]
    WorkerLost,
}

/// Shared cancellation flag between the session and its worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once cancelled, for use with `?`.
    pub fn check(&self) -> Result<(), AcquireError> {
        if self.is_cancelled() {
            Err(AcquireError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Something that can produce a raw source image.
pub trait ImageSource: Send {
    /// Human-readable description for logs and status lines.
    fn describe(&self) -> String;

    fn acquire(&mut self, cancel: &CancelToken) -> Result<DynamicImage, AcquireError>;
}

/// Picks an image file from disk: the library half of acquisition.
pub struct LibrarySource<B> {
    path: PathBuf,
    backend: Arc<B>,
}

impl<B: ImageBackend> LibrarySource<B> {
    pub fn new(path: impl Into<PathBuf>, backend: Arc<B>) -> Self {
        Self {
            path: path.into(),
            backend,
        }
    }
}

impl<B: ImageBackend> ImageSource for LibrarySource<B> {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn acquire(&mut self, cancel: &CancelToken) -> Result<DynamicImage, AcquireError> {
        cancel.check()?;
        let image = self.backend.decode(&self.path)?;
        cancel.check()?;
        Ok(image)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, test_image};
    use std::path::Path;
    use std::sync::mpsc;

    /// Source that hands out a fixed image, or blocks until released.
    pub struct StubSource {
        pub image: Option<DynamicImage>,
        pub gate: Option<mpsc::Receiver<()>>,
    }

    impl StubSource {
        pub fn ready(image: DynamicImage) -> Self {
            Self {
                image: Some(image),
                gate: None,
            }
        }

        /// Source that waits for a message on the returned sender first.
        pub fn gated(image: DynamicImage) -> (Self, mpsc::Sender<()>) {
            let (tx, rx) = mpsc::channel();
            (
                Self {
                    image: Some(image),
                    gate: Some(rx),
                },
                tx,
            )
        }

        /// Source whose user always backs out.
        pub fn cancelled() -> Self {
            Self {
                image: None,
                gate: None,
            }
        }
    }

    impl ImageSource for StubSource {
        fn describe(&self) -> String {
            "stub".to_string()
        }

        fn acquire(&mut self, cancel: &CancelToken) -> Result<DynamicImage, AcquireError> {
            if let Some(gate) = &self.gate {
                // Sender dropped also releases the gate
                let _ = gate.recv();
            }
            cancel.check()?;
            self.image.take().ok_or(AcquireError::Cancelled)
        }
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let worker_side = token.clone();
        assert!(worker_side.check().is_ok());
        token.cancel();
        assert!(worker_side.is_cancelled());
        assert!(matches!(worker_side.check(), Err(AcquireError::Cancelled)));
    }

    #[test]
    fn library_source_decodes_through_backend() {
        let backend = Arc::new(MockBackend::with_decoded(vec![test_image(6, 4)]));
        let mut source = LibrarySource::new("/photos/beach.jpg", Arc::clone(&backend));

        let img = source.acquire(&CancelToken::new()).unwrap();
        assert_eq!((img.width(), img.height()), (6, 4));
        assert_eq!(source.describe(), Path::new("/photos/beach.jpg").display().to_string());
    }

    #[test]
    fn library_source_honors_cancel_before_decode() {
        let backend = Arc::new(MockBackend::with_decoded(vec![test_image(6, 4)]));
        let mut source = LibrarySource::new("/photos/beach.jpg", Arc::clone(&backend));
        let token = CancelToken::new();
        token.cancel();

        assert!(matches!(source.acquire(&token), Err(AcquireError::Cancelled)));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn library_source_reports_decode_failure() {
        let backend = Arc::new(MockBackend::new());
        let mut source = LibrarySource::new("/photos/missing.jpg", backend);
        assert!(matches!(
            source.acquire(&CancelToken::new()),
            Err(AcquireError::Backend(_))
        ));
    }
}
