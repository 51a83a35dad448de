//! Metadata tables: generic row infrastructure plus the modeled entities.
//!
//! The `types` submodule carries the table-independent machinery - row reading, table ids,
//! index widths, coded indexes - and `file` carries the one entity this library models in
//! full: the File table, in its raw, synthetic and metadata-backed representations.

pub mod file;
pub mod types;

pub use file::{
    BoundFile, File, FileAttributes, FileHash, FileMap, FileRaw, FileRc, UserFile,
};
pub use types::{
    CodedIndex, CodedIndexType, MetadataTable, RowReadable, TableData, TableId, TableInfo,
    TableInfoRef, TableRowInfo,
};
