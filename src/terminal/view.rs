//! Text rendering of the session state.

use std::fmt::Write;
use std::path::Path;

use crate::output::outfit_path;
use crate::session::SessionState;

/// Render the current session as the user sees it.
#[must_use]
pub fn render(state: &SessionState, output_dir: &Path) -> String {
    let mut out = String::new();

    if let Some(error) = state.error() {
        let _ = writeln!(out, "Oops! {}", error.message);
    }

    let Some(upload) = state.upload() else {
        out.push_str("Upload a photo of a clothing item to get started: upload <path>\n");
        return out;
    };
    let _ = writeln!(
        out,
        "Your item: {} ({}, {} bytes)",
        upload.file_name,
        upload.image.mime_type,
        upload.image.data.len()
    );

    if state.is_loading() {
        out.push_str("Styling your outfits... This may take a moment.\n");
    }

    for outfit in state.outfits() {
        let marker = if state.is_editing(&outfit.id) { " (editing...)" } else { "" };
        let _ = writeln!(out, "\n[{}]{marker}", outfit.category);
        if outfit.id != outfit.category {
            let _ = writeln!(out, "  id: {}", outfit.id);
        }
        let _ = writeln!(out, "  {}", outfit.description);
        let _ = writeln!(out, "  image: {}", outfit_path(output_dir, outfit).display());
    }

    out
}
