//! Preservation of hand-written content above the autogenerated marker.
//!
//! Generated configuration files are split in two by a marker line. Anything
//! above the marker belongs to the operator and survives regeneration;
//! anything below it is replaced on every run.

use camino::Utf8Path;

use crate::artifacts::{self, ArtifactError};

/// Marker line separating hand-written content from generated content.
pub const DEFAULT_MARKER: &str = "### AUTOGENERATED CONFIG ###";

/// Returns the operator-owned prefix of `content` followed by a fresh marker.
///
/// When the marker occurs after the first character, everything from the
/// character preceding the marker onwards is dropped. When the marker is
/// absent, or is the very first thing in the file, the whole content is kept
/// and a marker is appended after it.
///
/// # Examples
///
/// ```
/// use fleetgen::preamble::preserve_preamble;
///
/// let kept = preserve_preamble("header\n### AUTOGENERATED CONFIG ###\nstale", "### AUTOGENERATED CONFIG ###");
/// assert_eq!(kept, "header\n### AUTOGENERATED CONFIG ###");
/// ```
#[must_use]
pub fn preserve_preamble(content: &str, marker: &str) -> String {
    let mut prefix = match content.find(marker) {
        Some(position) if position > 0 => {
            let (before, _) = content.split_at(position);
            let mut kept = before.to_owned();
            kept.pop();
            kept
        }
        _ => content.to_owned(),
    };
    prefix.push('\n');
    prefix.push_str(marker);
    prefix
}

/// Reads the file at `path` and applies [`preserve_preamble`] to it.
///
/// # Errors
///
/// Returns [`ArtifactError`] when the file cannot be read. A missing file is
/// an error; the operator is expected to create it once.
pub fn read_preamble(path: &Utf8Path, marker: &str) -> Result<String, ArtifactError> {
    let content = artifacts::read_to_string(path)?;
    Ok(preserve_preamble(&content, marker))
}
