//! User string heap (`#US`) for .NET metadata.
//!
//! Provides access to the ECMA-335 `#US` heap, which stores user-defined string literals in
//! UTF-16 encoding. This module exposes the [`UserStringsHeap`] struct for safe access to
//! the user strings referenced from IL instructions.
//!
//! # Reference
//! - [ECMA-335 II.24.2.4](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use widestring::U16String;

use crate::metadata::streams::BlobHeap;

/// The `UserStringsHeap` object provides access to the data within the '#US' heap. Entries
/// share the blob heap's length-prefix framing; the payload is a sequence of UTF-16 code
/// units followed by one trailing flag byte indicating whether any character needs special
/// handling beyond ASCII.
///
/// Reads are total: out-of-range offsets, malformed prefixes and even-length payloads all
/// yield an absent result. Decoding is lossy for unpaired surrogates.
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::streams::UserStringsHeap;
/// let heap = UserStringsHeap::from_bytes(vec![0u8, 0x03, b'A', 0x00, 0x00]);
/// assert_eq!(heap.get(1).unwrap(), "A");
/// ```
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.4
pub struct UserStringsHeap {
    data: BlobHeap,
}

impl UserStringsHeap {
    /// Create a `UserStringsHeap` that owns the provided heap bytes
    ///
    /// # Arguments
    /// * `data` - The heap content; an empty heap is valid and answers every read as absent
    #[must_use]
    pub fn from_bytes(data: Vec<u8>) -> UserStringsHeap {
        UserStringsHeap {
            data: BlobHeap::from_bytes(data),
        }
    }

    /// The length of the heap in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the heap contains no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the user string at the provided offset.
    ///
    /// Returns `None` when the offset is out of range, the length prefix is malformed, or
    /// the payload is not a sequence of UTF-16 code units plus the trailing flag byte.
    ///
    /// ## Arguments
    /// * `offset` - The offset within the heap to be accessed
    #[must_use]
    pub fn get(&self, offset: usize) -> Option<String> {
        let bytes = self.data.get(offset)?;
        if bytes.is_empty() {
            return Some(String::new());
        }

        // Payload is 2n UTF-16 bytes plus the flag byte, so valid lengths are odd
        if bytes.len() % 2 == 0 {
            return None;
        }

        let units: Vec<u16> = bytes[..bytes.len() - 1]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        Some(U16String::from_vec(units).to_string_lossy())
    }
}
