//! # photo-presets
//!
//! A small photo editor core: acquire an image, pick one of ten preset
//! filters from a thumbnail strip, preview the result, save it.
//!
//! # Architecture: Selection Over a Fixed Catalog
//!
//! ```text
//!   ImageSource ──(worker thread)──▶ Session ──apply──▶ FilterCatalog ──▶ ImageBackend
//!                                       │
//!                                       └──save──▶ PhotoStorage
//! ```
//!
//! The [`session::Session`] holds the only mutable state: which image is
//! loaded and which filter (if any) is selected. Everything it shows is
//! derived on demand from those two facts, so there is no cached filtered
//! image to fall out of sync.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Ordered filter presets, filter application, thumbnail strip |
//! | [`session`] | Selection state machine, background acquisition, save |
//! | [`acquire`] | `ImageSource` seam, library source, cancellation |
//! | [`storage`] | `PhotoStorage` seam, numbered files in a directory |
//! | [`imaging`] | Pure-Rust image operations: decode, resize, preview, presets, encode |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Pure Transforms
//!
//! Each preset is a pure function of its input pixels (a color matrix plus
//! baked tone curves, see [`imaging::presets`]). The same filter on the same
//! image always yields the same output, which is what lets the session
//! recompute the display image instead of caching it.
//!
//! ## Reset on Acquire
//!
//! Loading a new image always clears the filter selection. The state is a
//! single enum value ([`session::SelectionState`]) replaced in one
//! assignment, so an index can never outlive the image it was chosen for.
//!
//! ## Failures Are Reported, Not Hidden
//!
//! A filter that cannot produce output is an error the caller sees. The view
//! may fall back to the original ([`session::Session::display`]), but saving
//! never quietly writes the unfiltered image instead.

pub mod acquire;
pub mod catalog;
pub mod config;
pub mod imaging;
pub mod output;
pub mod session;
pub mod storage;
