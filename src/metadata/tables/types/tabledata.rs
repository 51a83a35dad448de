//! Owned storage for one table's raw row bytes.

use crate::{
    metadata::tables::types::{MetadataTable, RowReadable, TableInfoRef},
    Result,
};

/// Owned raw bytes plus row count for a single metadata table.
///
/// The owning image holds one `TableData` per materializable table. The bytes are immutable
/// after construction; typed access goes through [`TableData::rows`], which wraps them in a
/// borrowing [`MetadataTable`] view.
pub struct TableData {
    data: Vec<u8>,
    row_count: u32,
}

impl TableData {
    /// Creates a table from its raw row bytes and row count
    ///
    /// # Arguments
    /// * `data` - The contiguous fixed-width row data
    /// * `row_count` - The number of rows the data holds
    #[must_use]
    pub fn new(data: Vec<u8>, row_count: u32) -> TableData {
        TableData { data, row_count }
    }

    /// The raw row bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The number of rows in this table
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Returns a typed row reader over this table's bytes
    ///
    /// # Arguments
    /// * `sizes` - Index width configuration for the owning image
    ///
    /// # Errors
    /// Returns an error if the table cannot be constructed over the data.
    pub fn rows<T: RowReadable>(&self, sizes: &TableInfoRef) -> Result<MetadataTable<'_, T>> {
        MetadataTable::new(&self.data, self.row_count, sizes.clone())
    }
}
