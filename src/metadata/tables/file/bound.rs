use std::sync::{Arc, Weak};

use crate::{
    metadata::{
        customattributes::{CustomAttribute, CustomAttributeList},
        image::CilImage,
        lazy::{LazyField, LazyList, LazyRow},
        tables::{file::FileHash, file::FileRaw, TableId},
        token::Token,
    },
    Error, Result,
};

/// The metadata-backed variant of a file entry.
///
/// Construction stores nothing but the row id and a non-owning back-reference to the
/// owning image - no row decode, no heap read. The first accessed field triggers exactly
/// one decode of the fixed-width row; each field then translates its column through the
/// image's heaps, once, on its own first access. Writing any field overrides it
/// permanently without touching the image.
///
/// The back-reference is a [`Weak`] handle: the image owns its entities through the file
/// registry, and an owning pointer in the other direction would cycle. The image is
/// expected to outlive its entities; a field access after the image is gone fails with
/// [`Error::Detached`].
pub struct BoundFile {
    /// `RowID`
    rid: u32,
    /// Token
    token: Token,
    /// Non-owning back-reference to the owning image
    image: Weak<CilImage>,
    /// The one-time decoded raw row, shared by all field loaders of this instance
    row: LazyRow<FileRaw>,
    /// `FileAttributes` bitmask column
    flags: LazyField<u32>,
    /// Name column, resolved through the `#Strings` heap
    name: LazyField<String>,
    /// Hash column, resolved through the `#Blob` heap
    hash_value: LazyField<Option<FileHash>>,
    /// Custom attributes applied to this file entry
    custom_attributes: CustomAttributeList,
}

impl BoundFile {
    /// Binds a file entry to a row of the image's File table.
    ///
    /// Unless the image was built in trusted mode, the row id is validated against the
    /// table's row count here; everything else waits for first access. The attribute
    /// collection snapshots its owner's token list now and resolves lazily through the
    /// image's registry.
    ///
    /// ## Arguments
    /// * `image` - The owning image
    /// * `rid` - The 1-based row id within the File table
    ///
    /// # Errors
    /// Returns a malformed-format error naming the row id when it is 0 or beyond the
    /// table's row count (verifying mode only).
    pub(crate) fn new(image: &Arc<CilImage>, rid: u32) -> Result<BoundFile> {
        if image.is_verifying() {
            let row_count = image.file_row_count();
            if rid == 0 || rid > row_count {
                return Err(malformed_error!(
                    "File row id out of range - {} (table has {} rows)",
                    rid,
                    row_count
                ));
            }
        }

        let token = Token::from_table_row(TableId::File, rid);
        let attribute_ids = image.custom_attributes().owner_tokens(token);

        let resolver_image = Arc::downgrade(image);
        let custom_attributes = LazyList::new(attribute_ids, move |ids, index| {
            let token = ids[index];
            resolver_image
                .upgrade()
                .and_then(|image| image.custom_attributes().get(token))
                .unwrap_or_else(|| Arc::new(CustomAttribute::placeholder(token)))
        });

        Ok(BoundFile {
            rid,
            token,
            image: Arc::downgrade(image),
            row: LazyRow::new(),
            flags: LazyField::new(),
            name: LazyField::new(),
            hash_value: LazyField::new(),
            custom_attributes,
        })
    }

    fn image(&self) -> Result<Arc<CilImage>> {
        self.image.upgrade().ok_or(Error::Detached)
    }

    fn row(&self) -> Result<FileRaw> {
        self.row.get(|| self.image()?.file_row(self.rid))
    }

    /// This entry's row id
    #[must_use]
    pub fn rid(&self) -> u32 {
        self.rid
    }

    /// This entry's token
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// The `FileAttributes` bitmask
    ///
    /// # Errors
    /// Returns an error if the row cannot be decoded or the image is gone.
    pub fn flags(&self) -> Result<u32> {
        self.flags.get(|| Ok(self.row()?.flags))
    }

    /// Overrides the `FileAttributes` bitmask, permanently
    pub fn set_flags(&self, value: u32) {
        self.flags.set(value);
    }

    /// The file name, resolved through the image's `#Strings` heap.
    ///
    /// An out-of-range name offset resolves to the empty string; such references occur in
    /// otherwise loadable binaries.
    ///
    /// # Errors
    /// Returns an error if the row cannot be decoded or the image is gone.
    pub fn name(&self) -> Result<String> {
        self.name.get(|| {
            let row = self.row()?;
            let image = self.image()?;
            Ok(image.strings().get_or_empty(row.name as usize).into_owned())
        })
    }

    /// Overrides the file name, permanently
    pub fn set_name(&self, name: impl Into<String>) {
        self.name.set(name.into());
    }

    /// The file's hash value, resolved through the image's `#Blob` heap.
    ///
    /// A zero hash column means absent; a dangling blob offset also resolves to absent.
    ///
    /// # Errors
    /// Returns an error if the row cannot be decoded or the image is gone.
    pub fn hash_value(&self) -> Result<Option<FileHash>> {
        self.hash_value.get(|| {
            let row = self.row()?;
            if row.hash_value == 0 {
                return Ok(None);
            }

            let image = self.image()?;
            Ok(FileHash::new(image.blob().get_or_empty(row.hash_value as usize)).ok())
        })
    }

    /// Overrides the file's hash value, permanently
    pub fn set_hash_value(&self, hash_value: Option<FileHash>) {
        self.hash_value.set(hash_value);
    }

    /// Custom attributes applied to this file entry
    #[must_use]
    pub fn custom_attributes(&self) -> &CustomAttributeList {
        &self.custom_attributes
    }

    /// Returns true while no field of this instance has forced the row decode
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        !self.row.is_decoded()
            && self.flags.is_unset()
            && self.name.is_unset()
            && self.hash_value.is_unset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::image::CilImage;
    use crate::metadata::tables::FileAttributes;

    fn two_row_image() -> Arc<CilImage> {
        // Row 1: name -> "a.dll" at 1, no hash; Row 2: name -> "b.dll" at 7, no hash
        let strings = b"\0a.dll\0b.dll\0".to_vec();
        #[rustfmt::skip]
        let rows = vec![
            0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00,
        ];

        CilImage::builder()
            .strings(strings)
            .file_table(rows, 2)
            .build()
            .unwrap()
    }

    #[test]
    fn construction_is_lazy() {
        let image = two_row_image();
        let file = image.file(1).unwrap();

        // Nothing is decoded until a field is read
        if let crate::metadata::tables::File::Bound(bound) = &*file {
            assert!(bound.is_pristine());
            assert_eq!(bound.name().unwrap(), "a.dll");
            assert!(!bound.is_pristine());
            assert!(bound.row.is_decoded());
        } else {
            panic!("expected a bound entry");
        }
    }

    #[test]
    fn row_decodes_once_for_all_fields(){
        let image = two_row_image();
        let file = image.file(2).unwrap();

        assert_eq!(file.name().unwrap(), "b.dll");
        assert_eq!(file.flags().unwrap(), FileAttributes::CONTAINS_NO_META_DATA);
        assert!(file.hash_value().unwrap().is_none());
    }

    #[test]
    fn rid_range_is_checked_at_construction() {
        let image = two_row_image();

        assert!(image.file(0).is_err());
        assert!(image.file(3).is_err());
        assert!(image.file(2).is_ok());
    }

    #[test]
    fn detached_image_surfaces() {
        let image = two_row_image();
        let file = image.file(1).unwrap();
        drop(image);

        match &*file {
            crate::metadata::tables::File::Bound(bound) => {
                assert!(matches!(bound.name(), Err(Error::Detached)));
            }
            crate::metadata::tables::File::User(_) => panic!("expected a bound entry"),
        }
    }

    #[test]
    fn override_survives_detachment() {
        let image = two_row_image();
        let file = image.file(1).unwrap();
        file.set_name("patched.dll");
        drop(image);

        // An overridden field never needs the image again
        assert_eq!(file.name().unwrap(), "patched.dll");
    }
}
