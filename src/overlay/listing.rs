//! Directory listing transformation.
//!
//! Compressed files are listed under the name they can be opened by, so a
//! listing and single-file access agree. Directories are passed through
//! without looking at their names or contents.

use crate::codec::strip_suffix;
use crate::error::Result;
use crate::overlay::rename::RenamedEntry;
use crate::store::Entry;

/// Rename every file entry that carries a recognized compression suffix
///
/// Store order is preserved and nothing is merged: a directory holding both
/// `a.txt` and `a.txt.gz` lists `a.txt` twice.
///
/// # Errors
/// * Metadata lookup failure for a renamed entry, returned as-is
pub(crate) fn rewrite_entries(entries: Vec<Box<dyn Entry>>) -> Result<Vec<Box<dyn Entry>>> {
    entries
        .into_iter()
        .map(|entry| {
            if entry.is_dir() {
                return Ok(entry);
            }
            let stripped = strip_suffix(entry.name()).map(|(codec, stem)| (codec, stem.to_string()));
            let Some((codec, stem)) = stripped else {
                return Ok(entry);
            };

            let metadata = entry.metadata()?;
            log::trace!("Listing {} as {stem} ({codec})", entry.name());
            Ok(Box::new(RenamedEntry::new(&metadata, &stem)) as Box<dyn Entry>)
        })
        .collect()
}
