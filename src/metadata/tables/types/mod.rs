//! Core infrastructure for working with CLI metadata tables.
//!
//! The metadata format stores its entities in a series of fixed-width row tables. This
//! module provides the foundational abstractions for reading those rows in a type-safe
//! manner, independent of any particular table's column layout.
//!
//! ## Key Components
//!
//! - [`MetadataTable`]: Generic container for metadata table data with typed row access
//! - [`RowReadable`]: Trait defining how to read and parse individual table rows
//! - [`TableIterator`]: Sequential iterator over table rows
//! - [`TableData`]: Owned raw table bytes held by the image
//! - [`TableId`]: Enumeration of all metadata table ids
//! - [`TableInfo`] / [`TableInfoRef`]: Table row counts and index width configuration
//! - [`CodedIndex`] / [`CodedIndexType`]: Compact cross-table references (owner tags)
//!
//! ## References
//!
//! - [ECMA-335 II.22 / II.24.2.6](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

mod codedindex;
mod tabledata;
mod tableid;
mod tableinfo;

use crate::Result;

pub use codedindex::{CodedIndex, CodedIndexType};
pub use tabledata::TableData;
pub use tableid::TableId;
pub use tableinfo::{TableInfo, TableInfoRef, TableRowInfo};

/// Trait defining the interface for reading and parsing metadata table rows.
///
/// This trait must be implemented by any type that represents a row in a metadata table.
/// It provides the necessary methods for determining row size and parsing row data from
/// byte buffers, enabling generic table operations. Row indexing is 1-based, as per the
/// CLI specification.
pub trait RowReadable: Sized + Send {
    /// Calculates the size in bytes of a single row for this table type.
    ///
    /// Takes variable-width fields into account: string, GUID and blob heap indices as
    /// well as table indices may be 2 or 4 bytes depending on the image.
    ///
    /// ## Arguments
    ///
    /// * `sizes` - Table size information containing heap widths and table row counts
    fn row_size(sizes: &TableInfoRef) -> u32;

    /// Reads and parses a single row from the provided byte buffer.
    ///
    /// Extracts one complete row from the table data, advancing the offset to the next
    /// row position.
    ///
    /// ## Arguments
    ///
    /// * `data` - The byte buffer containing the table data to read from
    /// * `offset` - Mutable reference to the current read position, advanced by the number
    ///   of bytes consumed
    /// * `rid` - The 1-based row identifier for this entry
    /// * `sizes` - Table size information for parsing variable-sized fields
    ///
    /// ## Errors
    ///
    /// Returns an error if the buffer contains insufficient data for a complete row.
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self>;
}

/// Generic container for metadata table data with typed row access.
///
/// Wraps one table's raw bytes and provides type-safe access to individual rows through
/// the [`RowReadable`] trait, either directly by row id or sequentially via iteration.
/// Rows are parsed on demand; the container itself holds no decoded state.
///
/// ## Type Parameters
///
/// * `'a` - Lifetime of the underlying byte data
/// * `T` - The row type that implements [`RowReadable`]
pub struct MetadataTable<'a, T> {
    /// Reference to the raw table data bytes
    data: &'a [u8],
    /// Total number of rows in this table
    row_count: u32,
    /// Size in bytes of each row
    row_size: u32,
    /// Table configuration and size information
    sizes: TableInfoRef,
    /// Phantom data to maintain type information
    _phantom: std::marker::PhantomData<T>,
}

impl<'a, T: RowReadable> MetadataTable<'a, T> {
    /// Creates a new metadata table view over raw byte data.
    ///
    /// ## Arguments
    ///
    /// * `data` - The raw byte buffer containing the table data
    /// * `row_count` - The total number of rows present in the table
    /// * `sizes` - Table configuration for row size calculation
    ///
    /// ## Errors
    ///
    /// Returns an error if the provided data buffer is too small for the declared row
    /// count.
    pub fn new(data: &'a [u8], row_count: u32, sizes: TableInfoRef) -> Result<Self> {
        let row_size = T::row_size(&sizes);
        if u64::from(row_count) * u64::from(row_size) > data.len() as u64 {
            return Err(malformed_error!(
                "Table data too small for {} rows of {} bytes",
                row_count,
                row_size
            ));
        }

        Ok(MetadataTable {
            data,
            row_count,
            row_size,
            sizes,
            _phantom: std::marker::PhantomData,
        })
    }

    /// Returns the total size of this table in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        u64::from(self.row_count) * u64::from(self.row_size)
    }

    /// Returns the size of a single row in bytes.
    #[must_use]
    pub fn row_size(&self) -> u32 {
        self.row_size
    }

    /// Returns the total number of rows in this table.
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Retrieves a specific row by its 1-based index.
    ///
    /// Row 0 is reserved and represents a null reference in the metadata format, so it is
    /// rejected like an index beyond the row count.
    ///
    /// ## Arguments
    ///
    /// * `index` - The 1-based row index to retrieve (must be between 1 and `row_count` inclusive)
    ///
    /// ## Errors
    ///
    /// Returns a malformed-format error naming the row id when the index is outside the
    /// table's valid range, or propagates the row parse failure.
    pub fn get(&self, index: u32) -> Result<T> {
        if index == 0 || self.row_count < index {
            return Err(malformed_error!(
                "Row id out of range - {} (table has {} rows)",
                index,
                self.row_count
            ));
        }

        T::row_read(
            self.data,
            &mut ((index as usize - 1) * self.row_size as usize),
            index,
            &self.sizes,
        )
    }

    /// Creates a sequential iterator over all rows in the table.
    ///
    /// Rows are parsed on demand as the iterator advances; a parse failure ends the
    /// iteration.
    #[must_use]
    pub fn iter(&'a self) -> TableIterator<'a, T> {
        TableIterator {
            table: self,
            current_row: 0,
            current_offset: 0,
        }
    }
}

impl<'a, T: RowReadable> IntoIterator for &'a MetadataTable<'a, T> {
    type Item = T;
    type IntoIter = TableIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sequential iterator for metadata table rows.
///
/// Provides lazy, on-demand access to table rows in order. It maintains minimal state and
/// parses rows only as they are requested, keeping memory usage constant regardless of
/// table size.
pub struct TableIterator<'a, T> {
    /// Reference to the table being iterated
    table: &'a MetadataTable<'a, T>,
    /// Current row number (0-based for internal tracking)
    current_row: u32,
    /// Current byte offset in the table data
    current_offset: usize,
}

impl<T: RowReadable> Iterator for TableIterator<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row >= self.table.row_count {
            return None;
        }

        match T::row_read(
            self.table.data,
            &mut self.current_offset,
            self.current_row + 1,
            &self.table.sizes,
        ) {
            Ok(row) => {
                self.current_row += 1;
                Some(row)
            }
            Err(_) => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.table.row_count - self.current_row) as usize;
        (remaining, Some(remaining))
    }
}
