//! Layout persistence for context proxies.
//!
//! Each context persists its window layout (the GUI library's memory blob)
//! under `<save-dir>/ui/<sanitized-name>.ron`. The blob format is owned by
//! the library; this module only derives the path and triggers load/save at
//! the right lifecycle points. Failures degrade to the default layout and
//! never block construction or teardown.

use std::fs;
use std::path::{Path, PathBuf};

use scrim_core::{Result, ScrimError};

/// Directory under the host save dir holding per-context layout blobs.
const LAYOUT_DIR: &str = "ui";

/// Replaces characters that are unsafe in file names.
pub(crate) fn sanitize_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() {
        out.push('_');
    }
    out
}

/// Derives the layout file path for a named context, creating the layout
/// directory if absent.
pub(crate) fn layout_file(save_dir: &Path, name: &str) -> PathBuf {
    let dir = save_dir.join(LAYOUT_DIR);
    if let Err(err) = fs::create_dir_all(&dir) {
        log::warn!("could not create layout directory {}: {err}", dir.display());
    }
    dir.join(format!("{}.ron", sanitize_name(name)))
}

/// Loads a persisted memory blob, if one exists.
pub(crate) fn load_memory(path: &Path) -> Result<Option<egui::Memory>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    let memory =
        ron::from_str(&text).map_err(|err| ScrimError::MalformedLayout(err.to_string()))?;
    Ok(Some(memory))
}

/// Serializes the context's current memory blob to `path`.
pub(crate) fn save_memory(ctx: &egui::Context, path: &Path) -> Result<()> {
    let memory = ctx.memory(Clone::clone);
    let text = ron::ser::to_string(&memory)
        .map_err(|err| ScrimError::LayoutSerialization(err.to_string()))?;
    fs::write(path, text)?;
    Ok(())
}
