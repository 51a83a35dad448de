//! One-time row materialization for metadata-backed entities.

use std::sync::RwLock;

use crate::Result;

/// Defers and caches the one-time decode of an entity's fixed-width table row.
///
/// A bound entity stores nothing but its row id and a back-reference to the owning image at
/// construction; no row decode happens until the first field loader runs. That loader calls
/// [`LazyRow::get`] with the image's table-row reader, the decode happens exactly once, and
/// every other field loader of the same instance reuses the cached result.
///
/// A failing decode caches nothing, so a malformed row surfaces on every access rather than
/// being silently remembered.
pub struct LazyRow<T> {
    row: RwLock<Option<T>>,
}

impl<T: Clone> LazyRow<T> {
    /// Creates an empty cache; no decode happens here
    #[must_use]
    pub fn new() -> Self {
        LazyRow {
            row: RwLock::new(None),
        }
    }

    /// Returns the decoded row, running `decode` exactly once per instance.
    ///
    /// # Arguments
    /// * `decode` - Reads the fixed-width row from the owning image's table stream
    ///
    /// # Errors
    /// Propagates the decoder's error; nothing is cached in that case.
    pub fn get<F>(&self, decode: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        {
            if let Some(row) = &*read_lock!(self.row) {
                return Ok(row.clone());
            }
        }

        let mut slot = write_lock!(self.row);
        if let Some(row) = &*slot {
            return Ok(row.clone());
        }

        let row = decode()?;
        *slot = Some(row.clone());
        Ok(row)
    }

    /// Returns true once the row has been decoded and cached
    #[must_use]
    pub fn is_decoded(&self) -> bool {
        read_lock!(self.row).is_some()
    }
}

impl<T: Clone> Default for LazyRow<T> {
    fn default() -> Self {
        Self::new()
    }
}
