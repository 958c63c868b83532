//! CLI output formatting.
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and, where the CLI needs it, a `print_*` wrapper that writes
//! to stdout. Format functions are pure — no I/O, no side effects.
//!
//! ## Filters
//!
//! ```text
//!  0 Vivid      chrome
//!  1 Fade       fade
//!  ...
//! ```
//!
//! ## Status
//!
//! ```text
//! Image: 1024x768
//! Filter: 3 Mono
//! ```

use crate::catalog::{FilterCatalog, ThumbnailStrip};
use crate::imaging::ImageBackend;
use crate::session::{AcquisitionOutcome, SelectionState, Session};
use std::path::Path;

/// Width of the name column, from the longest filter name.
fn name_width(catalog: &FilterCatalog) -> usize {
    catalog.iter().map(|f| f.name().len()).max().unwrap_or(0)
}

/// One line per filter: index, display name, op key.
pub fn format_catalog(catalog: &FilterCatalog) -> Vec<String> {
    let width = name_width(catalog);
    catalog
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{:>2} {:<width$} {}", i, f.name(), f.op()))
        .collect()
}

pub fn print_catalog(catalog: &FilterCatalog) {
    for line in format_catalog(catalog) {
        println!("{}", line);
    }
}

/// Current session state, for the `status` command.
pub fn format_status<B: ImageBackend + 'static>(session: &Session<B>) -> Vec<String> {
    let mut lines = Vec::new();
    match session.state() {
        SelectionState::NoImage => lines.push("Image: none".to_string()),
        SelectionState::ImageNoFilter { source } => {
            lines.push(format!("Image: {}x{}", source.width(), source.height()));
            lines.push("Filter: Original".to_string());
        }
        SelectionState::ImageWithFilter { source, index } => {
            lines.push(format!("Image: {}x{}", source.width(), source.height()));
            lines.push(format!("Filter: {} {}", index, session.selected_name()));
        }
    }
    if let Some(description) = session.pending_description() {
        lines.push(format!("Busy: acquiring {}", description));
    }
    lines
}

pub fn format_outcome(outcome: AcquisitionOutcome, description: &str) -> String {
    match outcome {
        AcquisitionOutcome::Replaced => format!("Opened {}", description),
        AcquisitionOutcome::Cancelled => format!("Cancelled opening {}", description),
    }
}

/// Strip rendering results: one line per entry, written path or failure.
pub fn format_strip(strip: &ThumbnailStrip, written: &[(usize, &Path)]) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in &strip.entries {
        match &entry.thumbnail {
            Ok(_) => {
                let path = written
                    .iter()
                    .find(|(i, _)| *i == entry.index)
                    .map(|(_, p)| p.display().to_string())
                    .unwrap_or_else(|| "(not written)".to_string());
                lines.push(format!("{:>2} {} \u{2192} {}", entry.index, entry.name, path));
            }
            Err(e) => lines.push(format!("{:>2} {} failed: {}", entry.index, entry.name, e)),
        }
    }
    let failed = strip.failures().count();
    lines.push(format!(
        "Rendered {} of {} thumbnails",
        strip.entries.len() - failed,
        strip.entries.len()
    ));
    lines
}

/// Help text for the interactive `edit` command.
pub fn format_edit_help() -> Vec<String> {
    [
        "open <path>        open an image (runs in the background)",
        "wait               block until the open finishes",
        "cancel             abandon the open in progress",
        "filters            list filters",
        "select <name|n>    apply a filter",
        "original           remove the filter",
        "show <path>        write what is displayed to <path>",
        "save               save what is displayed",
        "status             show the current state",
        "quit               leave",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
