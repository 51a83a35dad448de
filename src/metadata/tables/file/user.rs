use std::sync::{OnceLock, RwLock};

use crate::metadata::{
    customattributes::CustomAttributeList,
    lazy::LazyList,
    tables::{file::FileHash, TableId},
    token::Token,
};

/// The synthetic variant of a file entry: user-authored, all fields live in memory from
/// construction.
///
/// A `UserFile` has no raw row and no lazy resolution; it exists to add files that are
/// absent from any original binary. Its token starts out null and is assigned exactly once
/// when the entry is registered with an image via
/// [`crate::metadata::image::CilImage::add_file`].
pub struct UserFile {
    /// Assigned on registration with an image; null until then
    token: OnceLock<Token>,
    /// a 4-byte bitmask of type `FileAttributes`, §II.23.1.6
    flags: RwLock<u32>,
    /// The file name
    name: RwLock<String>,
    /// The file's hash value, if any
    hash_value: RwLock<Option<FileHash>>,
    /// Custom attributes applied to this file entry
    custom_attributes: CustomAttributeList,
}

impl UserFile {
    /// Creates a new synthetic file entry with explicit initial values
    ///
    /// ## Arguments
    /// * `name` - The file name
    /// * `flags` - The `FileAttributes` bitmask
    /// * `hash_value` - The file's hash, or `None` when absent
    #[must_use]
    pub fn new(name: impl Into<String>, flags: u32, hash_value: Option<FileHash>) -> UserFile {
        UserFile {
            token: OnceLock::new(),
            flags: RwLock::new(flags),
            name: RwLock::new(name.into()),
            hash_value: RwLock::new(hash_value),
            custom_attributes: LazyList::from_values(Vec::new()),
        }
    }

    /// This entry's token; null until the entry has been registered with an image
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
            .get()
            .copied()
            .unwrap_or_else(|| Token::from_table_row(TableId::File, 0))
    }

    /// This entry's row id; 0 until the entry has been registered with an image
    #[must_use]
    pub fn rid(&self) -> u32 {
        self.token().row()
    }

    /// Binds this entry to its registry slot. A second assignment is ignored; the first
    /// registration wins.
    pub(crate) fn assign_token(&self, token: Token) {
        let _ = self.token.set(token);
    }

    /// The `FileAttributes` bitmask
    #[must_use]
    pub fn flags(&self) -> u32 {
        *read_lock!(self.flags)
    }

    /// Replaces the `FileAttributes` bitmask
    pub fn set_flags(&self, value: u32) {
        *write_lock!(self.flags) = value;
    }

    /// The file name
    #[must_use]
    pub fn name(&self) -> String {
        read_lock!(self.name).clone()
    }

    /// Replaces the file name
    pub fn set_name(&self, name: impl Into<String>) {
        *write_lock!(self.name) = name.into();
    }

    /// The file's hash value, if any
    #[must_use]
    pub fn hash_value(&self) -> Option<FileHash> {
        read_lock!(self.hash_value).clone()
    }

    /// Replaces the file's hash value
    pub fn set_hash_value(&self, hash_value: Option<FileHash>) {
        *write_lock!(self.hash_value) = hash_value;
    }

    /// Custom attributes applied to this file entry
    #[must_use]
    pub fn custom_attributes(&self) -> &CustomAttributeList {
        &self.custom_attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_live_from_construction() {
        let file = UserFile::new("extra.dll", 0, None);

        assert_eq!(file.name(), "extra.dll");
        assert_eq!(file.flags(), 0);
        assert!(file.hash_value().is_none());
        assert!(file.custom_attributes().is_empty());
        assert!(file.token().is_null());
        assert_eq!(file.rid(), 0);
    }

    #[test]
    fn mutation() {
        let file = UserFile::new("extra.dll", 0, None);

        file.set_name("renamed.dll");
        file.set_flags(1);
        file.set_hash_value(Some(FileHash::new(&[1, 2, 3]).unwrap()));

        assert_eq!(file.name(), "renamed.dll");
        assert_eq!(file.flags(), 1);
        assert_eq!(file.hash_value().unwrap().data(), &[1, 2, 3]);
    }

    #[test]
    fn first_token_assignment_wins() {
        let file = UserFile::new("extra.dll", 0, None);

        file.assign_token(Token::new(0x26000003));
        file.assign_token(Token::new(0x26000009));

        assert_eq!(file.token().value(), 0x26000003);
        assert_eq!(file.rid(), 3);
    }
}
