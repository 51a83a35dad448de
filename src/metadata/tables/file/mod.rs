//! File table entries (`TableId` = 0x26) as a dual-representation entity.
//!
//! The File table lists the files that make up the current assembly. Each entry exposes
//! `Flags`, `Name` and `HashValue` plus its custom attributes - behind one capability
//! surface, [`File`], with two lifecycles behind it:
//!
//! - [`UserFile`] - synthetic, user-authored; all fields live in memory from construction
//! - [`BoundFile`] - metadata-backed; fields materialize from the raw row and heaps on
//!   first access, and writes override them permanently
//!
//! Consuming code depends on [`File`]'s accessors only, never on which variant backs a
//! given instance.
//!
//! ## Reference
//! - [ECMA-335 II.22.19](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crossbeam_skiplist::SkipMap;
use std::sync::Arc;

use crate::{
    metadata::{customattributes::CustomAttributeList, token::Token},
    Result,
};

mod bound;
mod hash;
mod raw;
mod user;

pub use bound::BoundFile;
pub use hash::FileHash;
pub use raw::FileRaw;
pub use user::UserFile;

/// A map that holds the mapping of Token to resolved `File` entries
pub type FileMap = SkipMap<Token, FileRc>;
/// A reference to a `File`
pub type FileRc = Arc<File>;

#[allow(non_snake_case)]
/// All possible flags for `FileAttributes`
pub mod FileAttributes {
    /// This is not a resource file
    pub const CONTAINS_META_DATA: u32 = 0x0000;
    /// This is a resource file or other non-metadata-containing file
    pub const CONTAINS_NO_META_DATA: u32 = 0x0001;
}

/// A file entry of the current assembly, synthetic or metadata-backed.
///
/// The two variants form a closed set; every accessor delegates, so callers never need to
/// know which lifecycle backs an instance. Getters on the bound variant can fail (the row
/// decode is deferred and the image may be gone), so the shared surface is fallible even
/// though the synthetic variant always succeeds.
pub enum File {
    /// User-authored entry, absent from the original binary
    User(UserFile),
    /// Entry bound to a row of the image's File table
    Bound(BoundFile),
}

impl File {
    /// This entry's token
    #[must_use]
    pub fn token(&self) -> Token {
        match self {
            File::User(file) => file.token(),
            File::Bound(file) => file.token(),
        }
    }

    /// This entry's row id within the File table
    #[must_use]
    pub fn rid(&self) -> u32 {
        match self {
            File::User(file) => file.rid(),
            File::Bound(file) => file.rid(),
        }
    }

    /// The `FileAttributes` bitmask
    ///
    /// # Errors
    /// Returns an error if a bound row cannot be decoded or the owning image is gone.
    pub fn flags(&self) -> Result<u32> {
        match self {
            File::User(file) => Ok(file.flags()),
            File::Bound(file) => file.flags(),
        }
    }

    /// Replaces the `FileAttributes` bitmask; on a bound entry the override is permanent
    pub fn set_flags(&self, value: u32) {
        match self {
            File::User(file) => file.set_flags(value),
            File::Bound(file) => file.set_flags(value),
        }
    }

    /// The file name
    ///
    /// # Errors
    /// Returns an error if a bound row cannot be decoded or the owning image is gone.
    pub fn name(&self) -> Result<String> {
        match self {
            File::User(file) => Ok(file.name()),
            File::Bound(file) => file.name(),
        }
    }

    /// Replaces the file name; on a bound entry the override is permanent
    pub fn set_name(&self, name: impl Into<String>) {
        match self {
            File::User(file) => file.set_name(name),
            File::Bound(file) => file.set_name(name),
        }
    }

    /// The file's hash value, if any
    ///
    /// # Errors
    /// Returns an error if a bound row cannot be decoded or the owning image is gone.
    pub fn hash_value(&self) -> Result<Option<FileHash>> {
        match self {
            File::User(file) => Ok(file.hash_value()),
            File::Bound(file) => file.hash_value(),
        }
    }

    /// Replaces the file's hash value; on a bound entry the override is permanent
    pub fn set_hash_value(&self, hash_value: Option<FileHash>) {
        match self {
            File::User(file) => file.set_hash_value(hash_value),
            File::Bound(file) => file.set_hash_value(hash_value),
        }
    }

    /// Returns true if this file carries CLI metadata.
    ///
    /// Computed from the flags on every call, and the exact logical complement of
    /// [`File::contains_no_metadata`] for every flags value.
    ///
    /// # Errors
    /// Returns an error if a bound row cannot be decoded or the owning image is gone.
    pub fn contains_metadata(&self) -> Result<bool> {
        Ok(!self.contains_no_metadata()?)
    }

    /// Returns true if this is a resource file or other file without CLI metadata
    ///
    /// # Errors
    /// Returns an error if a bound row cannot be decoded or the owning image is gone.
    pub fn contains_no_metadata(&self) -> Result<bool> {
        Ok(self.flags()? & FileAttributes::CONTAINS_NO_META_DATA != 0)
    }

    /// Sets or clears the metadata-presence state, leaving all other flag bits unchanged
    ///
    /// # Errors
    /// Returns an error if the current flags of a bound row cannot be read.
    pub fn set_contains_metadata(&self, value: bool) -> Result<()> {
        self.set_contains_no_metadata(!value)
    }

    /// Sets or clears the no-metadata bit, leaving all other flag bits unchanged
    ///
    /// # Errors
    /// Returns an error if the current flags of a bound row cannot be read.
    pub fn set_contains_no_metadata(&self, value: bool) -> Result<()> {
        let flags = self.flags()?;
        let updated = if value {
            flags | FileAttributes::CONTAINS_NO_META_DATA
        } else {
            flags & !FileAttributes::CONTAINS_NO_META_DATA
        };
        self.set_flags(updated);

        Ok(())
    }

    /// Custom attributes applied to this file entry
    #[must_use]
    pub fn custom_attributes(&self) -> &CustomAttributeList {
        match self {
            File::User(file) => file.custom_attributes(),
            File::Bound(file) => file.custom_attributes(),
        }
    }

    /// A human-readable name for this entry: the file name, or the token when the name is
    /// empty. Derived on every call, never stored.
    ///
    /// # Errors
    /// Returns an error if a bound row cannot be decoded or the owning image is gone.
    pub fn display_name(&self) -> Result<String> {
        let name = self.name()?;
        if name.is_empty() {
            return Ok(format!("file:{}", self.token()));
        }

        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_pair_complements_on_user_files() {
        // The derived pair must complement for every flags value, not just the defined ones
        for flags in [0u32, 1, 2, 3, 0x0F, 0xFFFF_FFFE, 0xFFFF_FFFF] {
            let file = File::User(UserFile::new("x.dll", flags, None));

            assert_eq!(
                file.contains_metadata().unwrap(),
                !file.contains_no_metadata().unwrap()
            );
        }
    }

    #[test]
    fn flag_toggle_flips_exactly_one_bit() {
        let file = File::User(UserFile::new("x.dll", 0xFFFF_FFFE, None));

        file.set_contains_no_metadata(true).unwrap();
        assert_eq!(file.flags().unwrap(), 0xFFFF_FFFF);

        file.set_contains_metadata(true).unwrap();
        assert_eq!(file.flags().unwrap(), 0xFFFF_FFFE);

        // Clearing an already clear bit changes nothing
        file.set_contains_no_metadata(false).unwrap();
        assert_eq!(file.flags().unwrap(), 0xFFFF_FFFE);
    }

    #[test]
    fn display_name_falls_back_to_token() {
        let named = File::User(UserFile::new("res.bin", 1, None));
        assert_eq!(named.display_name().unwrap(), "res.bin");

        let unnamed = File::User(UserFile::new("", 1, None));
        assert_eq!(unnamed.display_name().unwrap(), "file:0x26000000");
    }
}
