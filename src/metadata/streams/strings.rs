//! String heap (`#Strings`) for .NET metadata.
//!
//! Provides access to the ECMA-335 `#Strings` heap, which stores identifier strings in
//! UTF-8 encoding. This module exposes the [`StringsHeap`] struct for safe access to the
//! identifier strings referenced by metadata tables.
//!
//! # Reference
//! - [ECMA-335 II.24.2.3](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use std::borrow::Cow;

/// '#Strings' holds various identifiers which are referenced from other tables within the
/// CIL metadata, e.g. type names, method names, file names.
///
/// Heap bytes originate from an externally supplied, possibly adversarial binary, and
/// offsets inside otherwise loadable images routinely point nowhere. Every read is
/// therefore total: an out-of-range offset yields an explicit absent result instead of an
/// error, and invalid UTF-8 decodes lossily. Offset 0 conventionally refers to the empty
/// string, and any byte offset inside the heap is a valid independent reference
/// (overlapping references permitted).
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::streams::StringsHeap;
/// let heap = StringsHeap::from_bytes(vec![0u8, b'H', b'e', b'l', b'l', b'o', 0u8]);
/// assert_eq!(heap.get(1).unwrap(), "Hello");
/// assert_eq!(heap.get(3).unwrap(), "llo");
/// assert!(heap.get(7).is_none());
/// ```
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.3
pub struct StringsHeap {
    data: Vec<u8>,
}

impl StringsHeap {
    /// Create a `StringsHeap` that owns the provided heap bytes
    ///
    /// # Arguments
    /// * `data` - The heap content; an empty heap is valid and answers every read as absent
    #[must_use]
    pub fn from_bytes(data: Vec<u8>) -> StringsHeap {
        StringsHeap { data }
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

    /// Get the string contained at the provided offset, decoded up to the first NUL byte or
    /// the heap end, terminator excluded.
    ///
    /// Returns `None` only when the offset lies at or past the end of the heap.
    ///
    /// ## Arguments
    /// * `offset` - The offset within the heap to be accessed (comes from metadata tables)
    #[must_use]
    pub fn get(&self, offset: usize) -> Option<Cow<'_, str>> {
        if offset >= self.data.len() {
            return None;
        }

        let bytes = &self.data[offset..];
        let content = bytes
            .iter()
            .position(|byte| *byte == 0)
            .map_or(bytes, |end| &bytes[..end]);

        Some(String::from_utf8_lossy(content))
    }

    /// Get the string contained at the provided offset, or the empty string when the offset
    /// is out of range.
    ///
    /// This is the variant entity field loaders use: absent offsets are routine in valid
    /// binaries, and row materialization must not fail over them.
    ///
    /// ## Arguments
    /// * `offset` - The offset within the heap to be accessed (comes from metadata tables)
    #[must_use]
    pub fn get_or_empty(&self, offset: usize) -> Cow<'_, str> {
        self.get(offset).unwrap_or(Cow::Borrowed(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data = vec![
            0x00,
            0x3c, 0x4d, 0x61, 0x69, 0x6e, 0x3e, 0x24, 0x00,
            0x61, 0x2e, 0x64, 0x6c, 0x6c, 0x00,
            0x62, 0x2e, 0x64, 0x6c, 0x6c, 0x00,
        ];

        let heap = StringsHeap::from_bytes(data);

        assert_eq!(heap.get(0).unwrap(), "");
        assert_eq!(heap.get(1).unwrap(), "<Main>$");
        assert_eq!(heap.get(9).unwrap(), "a.dll");
        assert_eq!(heap.get(15).unwrap(), "b.dll");
    }

    #[test]
    fn overlapping_references() {
        let heap = StringsHeap::from_bytes(vec![0x00, b'H', b'e', b'l', b'l', b'o', 0x00]);

        assert_eq!(heap.get(1).unwrap(), "Hello");
        assert_eq!(heap.get(2).unwrap(), "ello");
        assert_eq!(heap.get(5).unwrap(), "o");
    }

    #[test]
    fn totality() {
        for len in 0..4 {
            let heap = StringsHeap::from_bytes(vec![0u8; len]);
            for offset in len..len + 8 {
                assert!(heap.get(offset).is_none());
                assert_eq!(heap.get_or_empty(offset), "");
            }
        }
    }

    #[test]
    fn round_trip_idempotent() {
        let mut data = vec![0u8; 10];
        data.extend_from_slice(b"Hello\0");
        let heap = StringsHeap::from_bytes(data);

        assert_eq!(heap.get(10).unwrap(), "Hello");
        assert_eq!(heap.get(10).unwrap(), "Hello");
        assert_eq!(heap.get_or_empty(10), "Hello");
    }

    #[test]
    fn unterminated_tail() {
        let heap = StringsHeap::from_bytes(vec![0x00, b'a', b'b']);
        assert_eq!(heap.get(1).unwrap(), "ab");
    }

    #[test]
    fn invalid_utf8_is_lossy() {
        let heap = StringsHeap::from_bytes(vec![0x00, 0xFF, 0xFE, b'x', 0x00]);
        assert_eq!(heap.get(3).unwrap(), "x");
        assert!(!heap.get(1).unwrap().is_empty());
    }
}
