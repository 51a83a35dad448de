use crate::{
    io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// One undecoded row of the File table, exactly as laid out in the table stream.
/// `TableId` = 0x26
///
/// Heap offsets are kept as raw column values; translating them through the owning image's
/// heaps is the bound entity's business, and only happens on first field access.
pub struct FileRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Byte offset of this row within the table data
    pub offset: usize,
    /// a 4-byte bitmask of type `FileAttributes`, §II.23.1.6
    pub flags: u32,
    /// an index into the `#Strings` heap
    pub name: u32,
    /// an index into the `#Blob` heap
    pub hash_value: u32,
}

impl RowReadable for FileRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* flags */      4 +
            /* name */       sizes.str_bytes() +
            /* hash_value */ sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(FileRaw {
            rid,
            token: Token::from_table_row(TableId::File, rid),
            offset: *offset,
            flags: read_le_at::<u32>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            hash_value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{MetadataTable, TableInfo};
    use std::sync::Arc;

    #[test]
    fn crafted_short() {
        let data = vec![
            0x01, 0x01, 0x01, 0x01, // flags
            0x02, 0x02, // name
            0x03, 0x03, // hash_value
        ];

        let sizes = Arc::new(TableInfo::with_tables(
            &[(TableId::File, 1)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<FileRaw>::new(&data, 1, sizes).unwrap();

        let eval = |row: FileRaw| {
            assert_eq!(row.rid, 1);
            assert_eq!(row.token.value(), 0x26000001);
            assert_eq!(row.flags, 0x01010101);
            assert_eq!(row.name, 0x0202);
            assert_eq!(row.hash_value, 0x0303);
        };

        {
            for row in table.iter() {
                eval(row);
            }
        }

        {
            let row = table.get(1).unwrap();
            eval(row);
        }
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x01, 0x01, 0x01, 0x01, // flags
            0x02, 0x02, 0x02, 0x02, // name
            0x03, 0x03, 0x03, 0x03, // hash_value
        ];

        let sizes = Arc::new(TableInfo::with_tables(&[(TableId::File, 1)], true, true, true));
        let table = MetadataTable::<FileRaw>::new(&data, 1, sizes).unwrap();

        let eval = |row: FileRaw| {
            assert_eq!(row.rid, 1);
            assert_eq!(row.token.value(), 0x26000001);
            assert_eq!(row.flags, 0x01010101);
            assert_eq!(row.name, 0x02020202);
            assert_eq!(row.hash_value, 0x03030303);
        };

        {
            for row in table.iter() {
                eval(row);
            }
        }

        {
            let row = table.get(1).unwrap();
            eval(row);
        }
    }

    #[test]
    fn second_row_offsets() {
        let data = vec![
            0x00, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x00, // row 1
            0x01, 0x00, 0x00, 0x00, 0x10, 0x00, 0x05, 0x00, // row 2
        ];

        let sizes = Arc::new(TableInfo::with_tables(
            &[(TableId::File, 2)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<FileRaw>::new(&data, 2, sizes).unwrap();

        let row = table.get(2).unwrap();
        assert_eq!(row.token.value(), 0x26000002);
        assert_eq!(row.offset, 8);
        assert_eq!(row.flags, 1);
        assert_eq!(row.name, 0x10);
        assert_eq!(row.hash_value, 0x05);
    }
}
