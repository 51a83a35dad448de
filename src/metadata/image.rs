//! The owning container for one metadata image.
//!
//! A [`CilImage`] owns the decoded root header, the heaps, the File table's raw bytes and
//! the custom attribute registry, and hands out lazily-bound entities that reference back
//! into it. It is assembled through [`CilImageBuilder`] - either from a real metadata blob
//! via [`CilImageBuilder::metadata`], from synthetic parts, or a mix of both.
//!
//! Locating a table's rows inside the `#~` stream normally requires the row schemas of
//! every preceding table. This library carries the File table only, so it locates the rows
//! itself exactly when no lower-id table is present; otherwise the collaborator that owns
//! the full catalogue supplies the byte offset via [`CilImageBuilder::file_table_at`].

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use strum::IntoEnumIterator;

use crate::{
    metadata::{
        customattributes::CustomAttributeRegistry,
        root::Root,
        streams::{BlobHeap, GuidHeap, StringsHeap, UserStringsHeap},
        tables::{
            BoundFile, File, FileMap, FileRaw, FileRc, RowReadable, TableData, TableId,
            TableInfo, TableInfoRef, UserFile,
        },
        token::Token,
    },
    Error, Result,
};

/// An in-memory, editable model of one CLI metadata image.
///
/// The image owns all decoded data; entities hold non-owning back-references into it and
/// materialize their fields on first access. Entities are created once per row and cached,
/// so a row id always yields the same instance - and with it the same field cache and
/// overrides - for the image's lifetime.
///
/// # Example
///
/// ```rust,no_run
/// use cilmeta::metadata::image::CilImage;
///
/// let image = CilImage::builder()
///     .strings(b"\0a.dll\0".to_vec())
///     .file_table(vec![0, 0, 0, 0, 1, 0, 0, 0], 1)
///     .build()?;
///
/// let file = image.file(1)?;
/// assert_eq!(file.name()?, "a.dll");
/// # Ok::<(), cilmeta::Error>(())
/// ```
pub struct CilImage {
    verify: bool,
    root: Option<Root>,
    strings: StringsHeap,
    user_strings: UserStringsHeap,
    blob: BlobHeap,
    guids: GuidHeap,
    table_info: TableInfoRef,
    file_table: Option<TableData>,
    files: FileMap,
    next_file_rid: AtomicU32,
    attributes: CustomAttributeRegistry,
}

impl CilImage {
    /// Starts assembling an image from parts
    #[must_use]
    pub fn builder() -> CilImageBuilder {
        CilImageBuilder::default()
    }

    /// Builds an image from a complete metadata blob, with verification enabled.
    ///
    /// # Arguments
    /// * `data` - The raw metadata, positioned at the root header
    ///
    /// # Errors
    /// Returns an error if the root header, stream directory or tables-stream header are
    /// malformed, or if the File table cannot be located without external schema knowledge.
    pub fn from_metadata(data: &[u8]) -> Result<Arc<CilImage>> {
        Self::builder().metadata(data)?.build()
    }

    /// Returns true while this image validates headers and row ranges.
    ///
    /// Images built through [`CilImageBuilder::trusted`] skip those checks; malformed
    /// input then yields undefined field values rather than failures.
    #[must_use]
    pub fn is_verifying(&self) -> bool {
        self.verify
    }

    /// The decoded metadata root header, when the image was built from a blob
    #[must_use]
    pub fn root(&self) -> Option<&Root> {
        self.root.as_ref()
    }

    /// The `#Strings` heap
    #[must_use]
    pub fn strings(&self) -> &StringsHeap {
        &self.strings
    }

    /// The `#US` heap
    #[must_use]
    pub fn user_strings(&self) -> &UserStringsHeap {
        &self.user_strings
    }

    /// The `#Blob` heap
    #[must_use]
    pub fn blob(&self) -> &BlobHeap {
        &self.blob
    }

    /// The `#GUID` heap
    #[must_use]
    pub fn guids(&self) -> &GuidHeap {
        &self.guids
    }

    /// Row counts and index width configuration for this image
    #[must_use]
    pub fn table_info(&self) -> &TableInfoRef {
        &self.table_info
    }

    /// The custom attribute registry shared by all owner kinds of this image
    #[must_use]
    pub fn custom_attributes(&self) -> &CustomAttributeRegistry {
        &self.attributes
    }

    /// The number of rows in this image's File table
    #[must_use]
    pub fn file_row_count(&self) -> u32 {
        self.file_table.as_ref().map_or(0, TableData::row_count)
    }

    /// Decodes one raw File row. Callers are the bound entities' row loaders.
    pub(crate) fn file_row(&self, rid: u32) -> Result<FileRaw> {
        match &self.file_table {
            Some(table) => table.rows::<FileRaw>(&self.table_info)?.get(rid),
            None => Err(malformed_error!(
                "File row id out of range - {} (image has no File table)",
                rid
            )),
        }
    }

    /// Returns the file entry bound to the given row id, creating it on first request.
    ///
    /// The entry is cached by token: repeated calls yield the same instance, preserving
    /// its field cache and overrides.
    ///
    /// # Arguments
    /// * `rid` - The 1-based row id within the File table
    ///
    /// # Errors
    /// Returns a malformed-format error naming the row id when it is out of range and the
    /// image verifies.
    pub fn file(self: &Arc<Self>, rid: u32) -> Result<FileRc> {
        let token = Token::from_table_row(TableId::File, rid);
        if let Some(entry) = self.files.get(&token) {
            return Ok(entry.value().clone());
        }

        let bound = BoundFile::new(self, rid)?;
        let entry = self.files.get_or_insert(token, Arc::new(File::Bound(bound)));
        Ok(entry.value().clone())
    }

    /// Returns all file entries of this image in token order: every bound row, followed by
    /// the user-added entries.
    ///
    /// # Errors
    /// Propagates entity construction failures.
    pub fn files(self: &Arc<Self>) -> Result<Vec<FileRc>> {
        for rid in 1..=self.file_row_count() {
            self.file(rid)?;
        }

        Ok(self
            .files
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    /// Registers a user-authored file entry, assigning it the next free row id.
    ///
    /// # Arguments
    /// * `file` - The synthetic entry to add
    pub fn add_file(&self, file: UserFile) -> FileRc {
        let rid = self.next_file_rid.fetch_add(1, Ordering::SeqCst);
        let token = Token::from_table_row(TableId::File, rid);
        file.assign_token(token);

        let entry = self.files.get_or_insert(token, Arc::new(File::User(file)));
        entry.value().clone()
    }
}

/// Assembles a [`CilImage`] from a metadata blob, synthetic parts, or both.
///
/// Verification is on unless [`CilImageBuilder::trusted`] is called; trusting the input is
/// an explicit opt-in, never the default.
pub struct CilImageBuilder {
    verify: bool,
    root: Option<Root>,
    strings: Vec<u8>,
    user_strings: Vec<u8>,
    blob: Vec<u8>,
    guids: Vec<u8>,
    table_info: Option<TableInfo>,
    tables_stream: Option<Vec<u8>>,
    tables_data_offset: usize,
    file_table: Option<(Vec<u8>, u32)>,
    file_table_offset: Option<usize>,
}

impl Default for CilImageBuilder {
    fn default() -> Self {
        CilImageBuilder {
            verify: true,
            root: None,
            strings: Vec::new(),
            user_strings: Vec::new(),
            blob: Vec::new(),
            guids: Vec::new(),
            table_info: None,
            tables_stream: None,
            tables_data_offset: 0,
            file_table: None,
            file_table_offset: None,
        }
    }
}

impl CilImageBuilder {
    /// Opts this image out of header and row-range verification.
    ///
    /// Meant for pre-validated pipelines; malformed input then yields undefined downstream
    /// field values instead of failures.
    #[must_use]
    pub fn trusted(mut self) -> Self {
        self.verify = false;
        self
    }

    /// Parses a metadata blob and seeds the builder from its streams.
    ///
    /// The root header is decoded (verifying or trusted per the builder's mode), each
    /// well-known heap is copied into the builder, and the `#~` header yields the table
    /// row counts and index widths. When the File table is the image's lowest-id table,
    /// its rows are located directly behind the `#~` header; when other tables precede it,
    /// a collaborator has to provide the offset via [`CilImageBuilder::file_table_at`].
    ///
    /// # Arguments
    /// * `data` - The raw metadata, positioned at the root header
    ///
    /// # Errors
    /// Returns an error if the root header or the tables-stream header cannot be decoded.
    pub fn metadata(mut self, data: &[u8]) -> Result<Self> {
        let root = if self.verify {
            Root::read(data)?
        } else {
            Root::read_trusted(data)?
        };

        for header in &root.stream_headers {
            // Ranges are validated in verifying mode; in trusted mode a stream past the
            // blob degrades to its in-bounds prefix
            let start = std::cmp::min(header.offset as usize, data.len());
            let end = std::cmp::min(start.saturating_add(header.size as usize), data.len());
            let bytes = data[start..end].to_vec();

            match header.name.as_str() {
                "#Strings" => self.strings = bytes,
                "#US" => self.user_strings = bytes,
                "#Blob" => self.blob = bytes,
                "#GUID" => self.guids = bytes,
                "#~" | "#-" => {
                    let (info, data_offset) = TableInfo::from_tables_stream(&bytes)?;
                    self.table_info = Some(info);
                    self.tables_data_offset = data_offset;
                    self.tables_stream = Some(bytes);
                }
                _ => {}
            }
        }

        self.root = Some(root);
        Ok(self)
    }

    /// Seeds the `#Strings` heap from raw bytes
    #[must_use]
    pub fn strings(mut self, data: Vec<u8>) -> Self {
        self.strings = data;
        self
    }

    /// Seeds the `#US` heap from raw bytes
    #[must_use]
    pub fn user_strings(mut self, data: Vec<u8>) -> Self {
        self.user_strings = data;
        self
    }

    /// Seeds the `#Blob` heap from raw bytes
    #[must_use]
    pub fn blob(mut self, data: Vec<u8>) -> Self {
        self.blob = data;
        self
    }

    /// Seeds the `#GUID` heap from raw bytes
    #[must_use]
    pub fn guids(mut self, data: Vec<u8>) -> Self {
        self.guids = data;
        self
    }

    /// Provides explicit row counts and index widths, overriding anything parsed from a
    /// `#~` header
    #[must_use]
    pub fn table_info(mut self, info: TableInfo) -> Self {
        self.table_info = Some(info);
        self
    }

    /// Provides the File table's rows directly from synthetic bytes.
    ///
    /// Takes precedence over rows located in a parsed tables stream.
    ///
    /// # Arguments
    /// * `data` - The contiguous fixed-width row data
    /// * `row_count` - The number of rows the data holds
    #[must_use]
    pub fn file_table(mut self, data: Vec<u8>, row_count: u32) -> Self {
        self.file_table = Some((data, row_count));
        self
    }

    /// Provides the byte offset of the File table's rows within the `#~` stream.
    ///
    /// This is the collaborator hook for images whose tables stream carries tables this
    /// library has no schemas for.
    ///
    /// # Arguments
    /// * `offset` - Offset of the first File row, relative to the tables stream start
    #[must_use]
    pub fn file_table_at(mut self, offset: usize) -> Self {
        self.file_table_offset = Some(offset);
        self
    }

    /// Builds the image.
    ///
    /// # Errors
    /// Returns [`Error::NotSupported`] when the image declares File rows that cannot be
    /// located without external schema knowledge, or a bounds error when the declared rows
    /// do not fit their stream.
    pub fn build(self) -> Result<Arc<CilImage>> {
        let table_info: TableInfoRef = Arc::new(
            self.table_info
                .unwrap_or_else(|| TableInfo::with_tables(&[], false, false, false)),
        );

        let file_table = if let Some((data, row_count)) = self.file_table {
            Some(TableData::new(data, row_count))
        } else {
            Self::locate_file_table(
                &table_info,
                self.tables_stream.as_deref(),
                self.tables_data_offset,
                self.file_table_offset,
            )?
        };

        let next_file_rid = file_table.as_ref().map_or(0, TableData::row_count) + 1;

        Ok(Arc::new(CilImage {
            verify: self.verify,
            root: self.root,
            strings: StringsHeap::from_bytes(self.strings),
            user_strings: UserStringsHeap::from_bytes(self.user_strings),
            blob: BlobHeap::from_bytes(self.blob),
            guids: GuidHeap::from_bytes(self.guids),
            table_info,
            file_table,
            files: FileMap::new(),
            next_file_rid: AtomicU32::new(next_file_rid),
            attributes: CustomAttributeRegistry::new(),
        }))
    }

    fn locate_file_table(
        table_info: &TableInfoRef,
        tables_stream: Option<&[u8]>,
        tables_data_offset: usize,
        explicit_offset: Option<usize>,
    ) -> Result<Option<TableData>> {
        let declared_rows = table_info.get(TableId::File).rows;
        if declared_rows == 0 {
            return Ok(None);
        }

        let Some(stream) = tables_stream else {
            return Err(Error::NotSupported);
        };

        let offset = match explicit_offset {
            Some(offset) => offset,
            None => {
                let preceded = TableId::iter().any(|table| {
                    (table as usize) < TableId::File as usize && table_info.get(table).rows > 0
                });
                if preceded {
                    return Err(Error::NotSupported);
                }

                tables_data_offset
            }
        };

        let size = FileRaw::row_size(table_info) as usize * declared_rows as usize;
        let end = offset.checked_add(size).ok_or(Error::OutOfBounds)?;
        if end > stream.len() {
            return Err(Error::OutOfBounds);
        }

        Ok(Some(TableData::new(
            stream[offset..end].to_vec(),
            declared_rows,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_image_round_trip() {
        let image = CilImage::builder()
            .strings(b"\0a.dll\0".to_vec())
            .file_table(vec![0, 0, 0, 0, 1, 0, 0, 0], 1)
            .build()
            .unwrap();

        assert!(image.is_verifying());
        assert!(image.root().is_none());
        assert_eq!(image.file_row_count(), 1);

        let file = image.file(1).unwrap();
        assert_eq!(file.name().unwrap(), "a.dll");
        assert_eq!(file.token().value(), 0x26000001);
    }

    #[test]
    fn entities_are_cached_per_row() {
        let image = CilImage::builder()
            .strings(b"\0a.dll\0".to_vec())
            .file_table(vec![0, 0, 0, 0, 1, 0, 0, 0], 1)
            .build()
            .unwrap();

        let first = image.file(1).unwrap();
        first.set_name("patched.dll");

        let second = image.file(1).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.name().unwrap(), "patched.dll");
    }

    #[test]
    fn add_file_assigns_next_rids() {
        let image = CilImage::builder()
            .strings(b"\0a.dll\0".to_vec())
            .file_table(vec![0, 0, 0, 0, 1, 0, 0, 0], 1)
            .build()
            .unwrap();

        let second = image.add_file(UserFile::new("extra.dll", 0, None));
        let third = image.add_file(UserFile::new("more.dll", 1, None));

        assert_eq!(second.rid(), 2);
        assert_eq!(third.rid(), 3);
        assert_eq!(third.token().value(), 0x26000003);

        let all = image.files().unwrap();
        let names: Vec<String> = all.iter().map(|file| file.name().unwrap()).collect();
        assert_eq!(names, vec!["a.dll", "extra.dll", "more.dll"]);
    }

    #[test]
    fn empty_image() {
        let image = CilImage::builder().build().unwrap();

        assert_eq!(image.file_row_count(), 0);
        assert!(image.files().unwrap().is_empty());
        assert!(image.file(1).is_err());
        assert!(image.strings().is_empty());
    }
}
