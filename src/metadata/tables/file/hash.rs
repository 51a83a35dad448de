use md5::Md5;
use sha1::{Digest, Sha1};
use std::fmt::Write;

use crate::Result;

/// Helper function to convert bytes to lowercase hex string
fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut hex_string = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut hex_string, "{:02x}", byte).unwrap();
    }
    hex_string
}

/// The hash value of a file entry, resolved from the `#Blob` heap.
///
/// The algorithm is not stored alongside the bytes; it is implied by the defining
/// assembly's hash algorithm and, in practice, by the digest length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileHash {
    data: Vec<u8>,
}

impl FileHash {
    /// Create a new `FileHash` from the input data
    ///
    /// ## Arguments
    /// * `data` - The hash bytes resolved from the blob heap
    ///
    /// # Errors
    /// Returns an error if the input data is empty
    pub fn new(data: &[u8]) -> Result<FileHash> {
        if data.is_empty() {
            return Err(malformed_error!("File hash entries are not allowed to be empty"));
        }

        Ok(FileHash {
            data: data.to_vec(),
        })
    }

    /// Get the underlying data
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a formatted hex representation of the hash
    #[must_use]
    pub fn hex(&self) -> String {
        bytes_to_hex(&self.data)
    }

    /// Return a human-readable representation
    #[must_use]
    pub fn to_string_pretty(&self) -> String {
        let hex = self.hex();
        let algorithm = match self.data.len() {
            16 => "MD5",
            20 => "SHA1",
            _ => "Unknown",
        };

        format!("{}: {}", algorithm, hex)
    }

    /// Verify if the hash matches the expected content using MD5
    ///
    /// ## Arguments
    /// * `content` - The file content this hash is supposed to cover
    #[must_use]
    pub fn verify_md5(&self, content: &[u8]) -> bool {
        if self.data.len() != 16 {
            return false;
        }

        let mut hasher = Md5::new();
        hasher.update(content);
        let result = hasher.finalize();

        self.data == result.as_slice()
    }

    /// Verify if the hash matches the expected content using SHA1
    ///
    /// ## Arguments
    /// * `content` - The file content this hash is supposed to cover
    #[must_use]
    pub fn verify_sha1(&self, content: &[u8]) -> bool {
        if self.data.len() != 20 {
            return false;
        }

        let mut hasher = Sha1::new();
        hasher.update(content);
        let result = hasher.finalize();

        self.data == result.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_with_valid_data() {
        let data = vec![1, 2, 3, 4, 5];
        let hash = FileHash::new(&data).unwrap();
        assert_eq!(hash.data(), &data);
    }

    #[test]
    fn new_with_empty_data() {
        assert!(FileHash::new(&[]).is_err());
    }

    #[test]
    fn hex_formatting() {
        let hash = FileHash::new(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
        assert_eq!(hash.hex(), "deadbeef");
        assert!(hash.to_string_pretty().starts_with("Unknown"));
    }

    #[test]
    fn verify_sha1_round_trip() {
        let mut hasher = Sha1::new();
        hasher.update(b"file content");
        let digest = hasher.finalize().to_vec();

        let hash = FileHash::new(&digest).unwrap();
        assert!(hash.to_string_pretty().starts_with("SHA1"));
        assert!(hash.verify_sha1(b"file content"));
        assert!(!hash.verify_sha1(b"other content"));
        assert!(!hash.verify_md5(b"file content"));
    }

    #[test]
    fn verify_md5_round_trip() {
        let mut hasher = Md5::new();
        hasher.update(b"file content");
        let digest = hasher.finalize().to_vec();

        let hash = FileHash::new(&digest).unwrap();
        assert!(hash.to_string_pretty().starts_with("MD5"));
        assert!(hash.verify_md5(b"file content"));
        assert!(!hash.verify_md5(b"other content"));
        assert!(!hash.verify_sha1(b"file content"));
    }
}
