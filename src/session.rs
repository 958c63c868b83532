//! The editing session: selection state machine plus acquisition lifecycle.
//!
//! ```text
//!              acquire_image / acquisition completes
//!   ┌─────────┐ ─────────────▶ ┌───────────────┐ select_filter(i) ┌──────────────────┐
//!   │ NoImage │                │ ImageNoFilter │ ───────────────▶ │ ImageWithFilter  │
//!   └─────────┘                └───────────────┘ ◀─────────────── │      (i)         │
//!                                     ▲            clear_filter   └──────────────────┘
//!                                     └──────── acquire_image (from any state) ┘
//! ```
//!
//! A new source image always lands in `ImageNoFilter`: the whole state is
//! replaced in one assignment, so no stale filter index survives.
//!
//! The display image is recomputed on every call to
//! [`Session::current_display_image`]; the session caches nothing derived.
//!
//! ## Acquisition
//!
//! [`Session::begin_acquisition`] runs an [`ImageSource`] on a worker thread,
//! then downsizes the result to the configured edge. One acquisition may be in
//! flight at a time, and [`Session::is_busy`] reports it so the view layer can
//! block input. Results are collected with [`Session::poll_acquisition`] or
//! [`Session::wait_acquisition`]. Cancelling or failing leaves the state as it
//! was.

use crate::acquire::{AcquireError, CancelToken, ImageSource};
use crate::catalog::{self, CatalogError, FilterCatalog, FilterDescriptor};
use crate::imaging::{ImageBackend, prepare_source};
use crate::storage::{PhotoStorage, StorageError, StoredPhoto};
use image::DynamicImage;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("no image acquired yet")]
    NoImage,
    #[error("nothing to save: no image acquired yet")]
    NoSelectionToSave,
    #[error("an acquisition is already in progress")]
    AcquisitionInProgress,
    #[error(transparent)]
    Acquisition(#[from] AcquireError),
    #[error("Save failed: {0}")]
    Storage(#[from] StorageError),
}

/// What is selected right now.
#[derive(Debug, Clone, Default)]
pub enum SelectionState {
    #[default]
    NoImage,
    ImageNoFilter {
        source: Arc<DynamicImage>,
    },
    ImageWithFilter {
        source: Arc<DynamicImage>,
        index: usize,
    },
}

impl SelectionState {
    pub fn source(&self) -> Option<&Arc<DynamicImage>> {
        match self {
            SelectionState::NoImage => None,
            SelectionState::ImageNoFilter { source }
            | SelectionState::ImageWithFilter { source, .. } => Some(source),
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        match self {
            SelectionState::ImageWithFilter { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// How a finished acquisition resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionOutcome {
    /// The source image was replaced and the filter selection cleared.
    Replaced,
    /// The user backed out; nothing changed.
    Cancelled,
}

/// Display image plus the filter failure it fell back from, if any.
#[derive(Debug)]
pub struct DisplayResult {
    pub image: Option<Arc<DynamicImage>>,
    pub failure: Option<SessionError>,
}

/// Session settings taken from config.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Longer edge of acquired images after the background resize.
    pub max_edge: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { max_edge: 2048 }
    }
}

struct PendingAcquisition {
    description: String,
    cancel: CancelToken,
    result: Receiver<Result<DynamicImage, AcquireError>>,
}

pub struct Session<B> {
    catalog: FilterCatalog,
    backend: Arc<B>,
    config: SessionConfig,
    state: SelectionState,
    pending: Option<PendingAcquisition>,
}

impl<B: ImageBackend + 'static> Session<B> {
    pub fn new(catalog: FilterCatalog, backend: Arc<B>, config: SessionConfig) -> Self {
        Self {
            catalog,
            backend,
            config,
            state: SelectionState::NoImage,
            pending: None,
        }
    }

    pub fn catalog(&self) -> &FilterCatalog {
        &self.catalog
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Replace the source image and clear any filter selection.
    pub fn acquire_image(&mut self, image: DynamicImage) {
        log::debug!("source image replaced ({}x{})", image.width(), image.height());
        self.state = SelectionState::ImageNoFilter {
            source: Arc::new(image),
        };
    }

    /// Select catalog entry `index`. Invalid indices leave the state alone.
    pub fn select_filter(&mut self, index: usize) -> Result<(), SessionError> {
        let source = Arc::clone(self.state.source().ok_or(SessionError::NoImage)?);
        let name = self.catalog.at(index)?.name();
        log::debug!("selected filter {index} ({name})");
        self.state = SelectionState::ImageWithFilter { source, index };
        Ok(())
    }

    /// Go back to the unfiltered source.
    pub fn clear_filter(&mut self) -> Result<(), SessionError> {
        let source = Arc::clone(self.state.source().ok_or(SessionError::NoImage)?);
        self.state = SelectionState::ImageNoFilter { source };
        Ok(())
    }

    pub fn selected_filter(&self) -> Option<&FilterDescriptor> {
        self.state
            .selected_index()
            .and_then(|i| self.catalog.at(i).ok())
    }

    /// Name of what is shown: the filter's display name, or "Original".
    pub fn selected_name(&self) -> &str {
        self.selected_filter()
            .map(FilterDescriptor::name)
            .unwrap_or("Original")
    }

    /// The image the view should show, computed fresh.
    ///
    /// `None` before any image is acquired; the source itself (same handle)
    /// when no filter is selected.
    pub fn current_display_image(&self) -> Result<Option<Arc<DynamicImage>>, SessionError> {
        match &self.state {
            SelectionState::NoImage => Ok(None),
            SelectionState::ImageNoFilter { source } => Ok(Some(Arc::clone(source))),
            SelectionState::ImageWithFilter { source, index } => {
                let descriptor = self.catalog.at(*index)?;
                let filtered = catalog::apply(self.backend.as_ref(), Some(descriptor), source)?;
                Ok(Some(filtered))
            }
        }
    }

    /// Like [`current_display_image`](Self::current_display_image), but falls
    /// back to the unfiltered source when the filter fails.
    pub fn display(&self) -> DisplayResult {
        match self.current_display_image() {
            Ok(image) => DisplayResult {
                image,
                failure: None,
            },
            Err(err) => {
                log::warn!("showing original: {err}");
                DisplayResult {
                    image: self.state.source().cloned(),
                    failure: Some(err),
                }
            }
        }
    }

    /// Persist what is currently displayed.
    ///
    /// A failing filter is reported; the unfiltered image is never saved in
    /// its place.
    pub fn save(&self, storage: &mut impl PhotoStorage) -> Result<StoredPhoto, SessionError> {
        let image = self
            .current_display_image()?
            .ok_or(SessionError::NoSelectionToSave)?;
        Ok(storage.store(&image, self.selected_name())?)
    }

    // ------------------------------------------------------------------
    // Background acquisition
    // ------------------------------------------------------------------

    /// True while an acquisition is in flight.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Start acquiring from `source` on a worker thread.
    pub fn begin_acquisition<S>(&mut self, mut source: S) -> Result<(), SessionError>
    where
        S: ImageSource + 'static,
    {
        if self.pending.is_some() {
            return Err(SessionError::AcquisitionInProgress);
        }

        let description = source.describe();
        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();
        let backend = Arc::clone(&self.backend);
        let max_edge = self.config.max_edge;
        let (tx, rx) = mpsc::channel();

        log::info!("acquiring {description}");
        thread::spawn(move || {
            let result = source.acquire(&worker_cancel).and_then(|raw| {
                worker_cancel.check()?;
                Ok(prepare_source(backend.as_ref(), raw, max_edge)?)
            });
            // Receiver is gone if the session cancelled or was dropped
            let _ = tx.send(result);
        });

        self.pending = Some(PendingAcquisition {
            description,
            cancel,
            result: rx,
        });
        Ok(())
    }

    /// Description of the in-flight acquisition, if any.
    pub fn pending_description(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.description.as_str())
    }

    /// Abandon the in-flight acquisition. The state is left untouched.
    ///
    /// Returns false when nothing was in flight.
    pub fn cancel_acquisition(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                log::info!("cancelled acquisition of {}", pending.description);
                pending.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Collect the acquisition result without blocking.
    ///
    /// `Ok(None)` while still running or when nothing is in flight.
    pub fn poll_acquisition(&mut self) -> Result<Option<AcquisitionOutcome>, SessionError> {
        let Some(pending) = &self.pending else {
            return Ok(None);
        };
        let result = match pending.result.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return Ok(None),
            Err(TryRecvError::Disconnected) => Err(AcquireError::WorkerLost),
        };
        self.finish(result).map(Some)
    }

    /// Block until the in-flight acquisition resolves.
    ///
    /// `Ok(None)` when nothing is in flight.
    pub fn wait_acquisition(&mut self) -> Result<Option<AcquisitionOutcome>, SessionError> {
        let Some(pending) = &self.pending else {
            return Ok(None);
        };
        let result = pending
            .result
            .recv()
            .unwrap_or(Err(AcquireError::WorkerLost));
        self.finish(result).map(Some)
    }

    fn finish(
        &mut self,
        result: Result<DynamicImage, AcquireError>,
    ) -> Result<AcquisitionOutcome, SessionError> {
        let pending = self.pending.take();
        let description = pending.map(|p| p.description).unwrap_or_default();
        match result {
            Ok(image) => {
                log::info!("acquired {description}");
                self.acquire_image(image);
                Ok(AcquisitionOutcome::Replaced)
            }
            Err(AcquireError::Cancelled) => {
                log::info!("acquisition of {description} cancelled by source");
                Ok(AcquisitionOutcome::Cancelled)
            }
            Err(err) => Err(err.into()),
        }
    }
}
