//! Table row counts and index width information for the `#~` stream.

use std::sync::Arc;
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    io::{read_le, read_le_at},
    metadata::tables::types::{CodedIndexType, TableId},
    Error::OutOfBounds,
    Result,
};

/// Holds information about the size that reference index fields have
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct TableRowInfo {
    /// The count of rows in this table
    pub rows: u32,
    /// Number of bits required to represent any valid row index
    pub bits: u8,
    /// If the count is > `u16::MAX`, the indexes of other tables into this table will be 4 bytes instead of 2
    pub is_large: bool,
}

impl TableRowInfo {
    /// Creates a new `TableRowInfo` instance with the given row count.
    ///
    /// Automatically calculates the number of bits required to represent
    /// indices into a table with the specified number of rows.
    ///
    /// # Arguments
    /// * `rows` - The number of rows in the table
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(rows: u32) -> Self {
        let bits = if rows == 0 {
            1
        } else {
            let zeros = rows.leading_zeros();
            // 32 - zeros is always <= 32, fits in u8
            (32 - zeros) as u8
        };

        Self {
            rows,
            bits,
            is_large: rows > u32::from(u16::MAX),
        }
    }
}

/// `TableInfo` holds information regarding the row count and reference index field sizes of
/// all tables in an image.
///
/// It is parsed from the `#~` tables-stream header of an existing binary, or constructed
/// synthetically via [`TableInfo::with_tables`] when assembling an image from parts. Either
/// way it answers the two questions row decoding needs: how many rows a table has, and
/// whether a given heap or table index column is 2 or 4 bytes wide.
#[derive(Clone)]
pub struct TableInfo {
    rows: Vec<TableRowInfo>,
    coded_indexes: Vec<u8>,
    is_large_index_str: bool,
    is_large_index_guid: bool,
    is_large_index_blob: bool,
}

/// Cheap-copy reference to a `TableInfo` structure
pub type TableInfoRef = Arc<TableInfo>;

impl TableInfo {
    /// Parses the `#~` tables-stream header.
    ///
    /// The header carries the heap-size flags at offset 6, the valid-table bitvector at
    /// offset 8, and one `u32` row count per present table from offset 24. Returns the
    /// parsed info plus the offset at which the table row data begins (24 plus 4 bytes per
    /// present table). Bits of the valid vector outside the table catalogue still consume
    /// their row count so that subsequent counts stay aligned.
    ///
    /// # Arguments
    /// * `data` - The raw bytes of the `#~` stream
    ///
    /// # Errors
    /// Returns an error if the stream is too short for its declared tables.
    pub fn from_tables_stream(data: &[u8]) -> Result<(TableInfo, usize)> {
        if data.len() < 24 {
            return Err(OutOfBounds);
        }

        let heap_size_flags = read_le::<u8>(&data[6..])?;
        let valid_bitvec = read_le::<u64>(&data[8..])?;

        let mut rows = vec![TableRowInfo::default(); TableId::GenericParamConstraint as usize + 1];
        let mut offset = 24_usize;
        for bit in 0..64u8 {
            if (valid_bitvec & (1u64 << bit)) == 0 {
                continue;
            }

            let row_count = read_le_at::<u32>(data, &mut offset)?;
            if row_count == 0 {
                // Empty tables should be omitted during compilation and not be present in a valid sample
                continue;
            }

            if let Some(table_id) = TableId::from_code(bit) {
                rows[table_id as usize] = TableRowInfo::new(row_count);
            }
        }

        let mut table_info = TableInfo {
            rows,
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: heap_size_flags & 1 == 1,
            is_large_index_guid: heap_size_flags & 2 == 2,
            is_large_index_blob: heap_size_flags & 4 == 4,
        };

        table_info.calculate_coded_index_bits();

        Ok((table_info, offset))
    }

    /// Builds a `TableInfo` from explicit table row counts and heap index widths.
    ///
    /// Used when assembling a synthetic image, or when the table layout is known from a
    /// source other than a `#~` header.
    ///
    /// # Arguments
    /// * `tables` - `(table, row_count)` pairs for every present table
    /// * `large_str` - Whether `#Strings` heap indexes are 4 bytes instead of 2
    /// * `large_guid` - Whether `#GUID` heap indexes are 4 bytes instead of 2
    /// * `large_blob` - Whether `#Blob` heap indexes are 4 bytes instead of 2
    #[must_use]
    pub fn with_tables(
        tables: &[(TableId, u32)],
        large_str: bool,
        large_guid: bool,
        large_blob: bool,
    ) -> Self {
        let mut table_info = TableInfo {
            rows: vec![TableRowInfo::default(); TableId::GenericParamConstraint as usize + 1],
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: large_str,
            is_large_index_guid: large_guid,
            is_large_index_blob: large_blob,
        };

        for (table, row_count) in tables {
            table_info.rows[*table as usize] = TableRowInfo::new(*row_count);
        }

        table_info.calculate_coded_index_bits();
        table_info
    }

    /// Returns true if a requested table is larger than 2^16 rows and hence requires
    /// 4-byte instead of 2-byte indexes
    ///
    /// ## Arguments
    /// * `id` - The `TableId` to query
    #[must_use]
    pub fn is_large(&self, id: TableId) -> bool {
        self.rows[id as usize].is_large
    }

    /// Indicates the size of indexes referring into the '#Strings' heap. True means 4 bytes, false 2 bytes
    #[must_use]
    pub fn is_large_str(&self) -> bool {
        self.is_large_index_str
    }

    /// Indicates the size of indexes referring into the '#GUID' heap. True means 4 bytes, false 2 bytes
    #[must_use]
    pub fn is_large_guid(&self) -> bool {
        self.is_large_index_guid
    }

    /// Indicates the size of indexes referring into the '#Blob' heap. True means 4 bytes, false 2 bytes
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.is_large_index_blob
    }

    /// Returns the byte width of '#Strings' heap index columns
    #[must_use]
    pub fn str_bytes(&self) -> u8 {
        if self.is_large_index_str {
            4
        } else {
            2
        }
    }

    /// Returns the byte width of '#GUID' heap index columns
    #[must_use]
    pub fn guid_bytes(&self) -> u8 {
        if self.is_large_index_guid {
            4
        } else {
            2
        }
    }

    /// Returns the byte width of '#Blob' heap index columns
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.is_large_index_blob {
            4
        } else {
            2
        }
    }

    /// Returns the metadata for a specific table.
    ///
    /// # Arguments
    /// * `table` - The `TableId` for which to retrieve metadata
    #[must_use]
    pub fn get(&self, table: TableId) -> &TableRowInfo {
        &self.rows[table as usize]
    }

    /// Returns the number of bits required to represent an index into a specific table.
    ///
    /// # Arguments
    /// * `table_id` - The `TableId` for which to calculate the index size
    #[must_use]
    pub fn table_index_bits(&self, table_id: TableId) -> u8 {
        self.rows[table_id as usize].bits
    }

    /// Returns the number of bytes required to represent an index into a specific table.
    ///
    /// # Arguments
    /// * `table_id` - The `TableId` for which to calculate the index size
    #[must_use]
    pub fn table_index_bytes(&self, table_id: TableId) -> u8 {
        if self.rows[table_id as usize].bits > 16 {
            4
        } else {
            2
        }
    }

    /// Returns the cached bit size for a specific coded index type.
    ///
    /// # Arguments
    /// * `coded_index_type` - The `CodedIndexType` for which to retrieve the size
    #[must_use]
    pub fn coded_index_bits(&self, coded_index_type: CodedIndexType) -> u8 {
        self.coded_indexes[coded_index_type as usize]
    }

    /// Returns the cached byte size for a specific coded index reference.
    ///
    /// # Arguments
    /// * `coded_index_type` - The `CodedIndexType` for which to retrieve the size
    #[must_use]
    pub fn coded_index_bytes(&self, coded_index_type: CodedIndexType) -> u8 {
        if self.coded_indexes[coded_index_type as usize] > 16 {
            4
        } else {
            2
        }
    }

    /// Calculates the number of bits required for a specific coded index type.
    fn calculate_coded_index_size(&self, coded_index_type: CodedIndexType) -> u8 {
        let tables = coded_index_type.tables();
        let max_bits = tables
            .iter()
            .map(|table| self.table_index_bits(*table))
            .max()
            .unwrap_or(1);

        max_bits + coded_index_type.tag_bits()
    }

    /// Calculates and caches the bit sizes required for all coded index types.
    fn calculate_coded_index_bits(&mut self) {
        for coded_index in CodedIndexType::iter() {
            let size = self.calculate_coded_index_size(coded_index);
            self.coded_indexes[coded_index as usize] = size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_small_indexes() {
        let info = TableInfo::with_tables(&[(TableId::File, 2)], false, false, false);

        assert_eq!(info.get(TableId::File).rows, 2);
        assert!(!info.is_large(TableId::File));
        assert_eq!(info.str_bytes(), 2);
        assert_eq!(info.blob_bytes(), 2);
        assert_eq!(info.guid_bytes(), 2);
        assert_eq!(info.table_index_bytes(TableId::File), 2);
    }

    #[test]
    fn synthetic_large_indexes() {
        let info = TableInfo::with_tables(&[(TableId::File, 0x1_0000)], true, true, true);

        assert!(info.is_large(TableId::File));
        assert_eq!(info.str_bytes(), 4);
        assert_eq!(info.blob_bytes(), 4);
        assert_eq!(info.guid_bytes(), 4);
    }

    #[test]
    fn tables_stream_header() {
        #[rustfmt::skip]
        let mut data = vec![
            0x00, 0x00, 0x00, 0x00, // reserved
            0x02, 0x00,             // major, minor
            0x00,                   // heap size flags
            0x01,                   // reserved
        ];
        data.extend_from_slice(&(1u64 << TableId::File as usize).to_le_bytes());
        data.extend_from_slice(&0u64.to_le_bytes()); // sorted
        data.extend_from_slice(&2u32.to_le_bytes()); // File row count

        let (info, data_offset) = TableInfo::from_tables_stream(&data).unwrap();

        assert_eq!(info.get(TableId::File).rows, 2);
        assert_eq!(data_offset, 28);
        assert!(!info.is_large_str());
    }

    #[test]
    fn tables_stream_header_heap_flags() {
        let mut data = vec![0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x07, 0x01];
        data.extend_from_slice(&0u64.to_le_bytes());
        data.extend_from_slice(&0u64.to_le_bytes());

        let (info, data_offset) = TableInfo::from_tables_stream(&data).unwrap();

        assert!(info.is_large_str());
        assert!(info.is_large_guid());
        assert!(info.is_large_blob());
        assert_eq!(data_offset, 24);
    }

    #[test]
    fn tables_stream_truncated() {
        assert!(TableInfo::from_tables_stream(&[0u8; 16]).is_err());

        // Declares a present table but carries no row count
        let mut data = vec![0u8; 8];
        data.extend_from_slice(&(1u64 << TableId::File as usize).to_le_bytes());
        data.extend_from_slice(&0u64.to_le_bytes());
        assert!(TableInfo::from_tables_stream(&data).is_err());
    }

    #[test]
    fn coded_index_widths() {
        // Small tables keep HasCustomAttribute at 2 bytes (max 11 row bits + 5 tag bits)
        let small = TableInfo::with_tables(&[(TableId::File, 100)], false, false, false);
        assert_eq!(small.coded_index_bytes(CodedIndexType::HasCustomAttribute), 2);

        // A table with more than 2^11 rows pushes it to 4 bytes
        let large = TableInfo::with_tables(&[(TableId::MethodDef, 0x1000)], false, false, false);
        assert_eq!(large.coded_index_bytes(CodedIndexType::HasCustomAttribute), 4);
    }
}
