//! Blob heap (`#Blob`) for .NET metadata.
//!
//! Provides access to the ECMA-335 `#Blob` heap, which stores binary data such as hash
//! values, signatures and custom attribute payloads. This module exposes the [`BlobHeap`]
//! struct for safe access to blobs referenced by metadata tables. What the bytes of an
//! individual blob mean is the concern of whoever holds the reference; this reader only
//! handles the length-prefix framing.
//!
//! # Reference
//! - [ECMA-335 II.24.2.4](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

/// '#Blob' points to streams of bytes. Each valid blob is pointed to by a table column, and
/// each carries its size encoded into its leading bytes:
///
/// * If the first byte of the blob is 0bbbbbbb, the blob holds bbbbbbb bytes of data.
/// * If the first two bytes are 10bbbbbb and x, the blob holds (bbbbbb << 8 + x) bytes.
/// * If the first four bytes are 110bbbbb, x, y, and z, the blob holds
///   (bbbbb << 24 + x << 16 + y << 8 + z) bytes.
///
/// As with the other heaps, every read is total: an offset outside the heap, a truncated
/// length prefix, or a declared length running past the heap end all yield an absent
/// result rather than an error.
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::streams::BlobHeap;
/// let heap = BlobHeap::from_bytes(vec![0u8, 0x03, 0x41, 0x42, 0x43]);
/// assert_eq!(heap.get(1).unwrap(), &[0x41, 0x42, 0x43]);
/// assert!(heap.get(5).is_none());
/// ```
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.4
pub struct BlobHeap {
    data: Vec<u8>,
}

impl BlobHeap {
    /// Create a `BlobHeap` that owns the provided heap bytes
    ///
    /// # Arguments
    /// * `data` - The heap content; an empty heap is valid and answers every read as absent
    #[must_use]
    pub fn from_bytes(data: Vec<u8>) -> BlobHeap {
        BlobHeap { data }
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

    /// Decodes the ECMA-335 compressed length prefix at `offset`.
    ///
    /// Returns the data length and the prefix width, or `None` when the prefix is
    /// truncated or uses the reserved 111 leading bit pattern.
    fn read_length(&self, offset: usize) -> Option<(usize, usize)> {
        let first = *self.data.get(offset)?;

        if first & 0x80 == 0 {
            return Some((first as usize, 1));
        }

        if first & 0xC0 == 0x80 {
            let second = *self.data.get(offset + 1)?;
            return Some(((((first & 0x3F) as usize) << 8) + second as usize, 2));
        }

        if first & 0xE0 == 0xC0 {
            let second = *self.data.get(offset + 1)?;
            let third = *self.data.get(offset + 2)?;
            let fourth = *self.data.get(offset + 3)?;
            return Some((
                (((first & 0x1F) as usize) << 24)
                    + ((second as usize) << 16)
                    + ((third as usize) << 8)
                    + fourth as usize,
                4,
            ));
        }

        None
    }

    /// Get the bytes of the blob at the provided offset.
    ///
    /// Returns `None` when the offset lies at or past the heap end, the length prefix is
    /// malformed, or the declared length would run past the heap end.
    ///
    /// ## Arguments
    /// * `offset` - The offset within the heap to be accessed (comes from metadata tables)
    #[must_use]
    pub fn get(&self, offset: usize) -> Option<&[u8]> {
        let (length, prefix) = self.read_length(offset)?;

        let start = offset.checked_add(prefix)?;
        let end = start.checked_add(length)?;
        if end > self.data.len() {
            return None;
        }

        Some(&self.data[start..end])
    }

    /// Get the bytes of the blob at the provided offset, or an empty slice when absent.
    ///
    /// This is the variant entity field loaders use, mirroring
    /// [`crate::metadata::streams::StringsHeap::get_or_empty`].
    ///
    /// ## Arguments
    /// * `offset` - The offset within the heap to be accessed (comes from metadata tables)
    #[must_use]
    pub fn get_or_empty(&self, offset: usize) -> &[u8] {
        self.get(offset).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted_short_prefix() {
        let heap = BlobHeap::from_bytes(vec![0x00, 0x03, 0x41, 0x42, 0x43]);

        assert_eq!(heap.get(0).unwrap(), &[] as &[u8]);
        assert_eq!(heap.get(1).unwrap(), &[0x41, 0x42, 0x43]);
    }

    #[test]
    fn crafted_two_byte_prefix() {
        let mut data = vec![0x00, 0x81, 0x00];
        data.extend(std::iter::repeat(0xAA).take(0x100));
        let heap = BlobHeap::from_bytes(data);

        let blob = heap.get(1).unwrap();
        assert_eq!(blob.len(), 0x100);
        assert!(blob.iter().all(|byte| *byte == 0xAA));
    }

    #[test]
    fn crafted_four_byte_prefix() {
        let mut data = vec![0x00, 0xC0, 0x00, 0x00, 0x05];
        data.extend_from_slice(&[1, 2, 3, 4, 5]);
        let heap = BlobHeap::from_bytes(data);

        assert_eq!(heap.get(1).unwrap(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn totality() {
        for len in 0..4 {
            let heap = BlobHeap::from_bytes(vec![0u8; len]);
            for offset in len..len + 8 {
                assert!(heap.get(offset).is_none());
                assert!(heap.get_or_empty(offset).is_empty());
            }
        }
    }

    #[test]
    fn truncated_declared_length() {
        // Declared 5 bytes of data, only 2 present
        let heap = BlobHeap::from_bytes(vec![0x00, 0x05, 0x41, 0x42]);
        assert!(heap.get(1).is_none());
        assert!(heap.get_or_empty(1).is_empty());
    }

    #[test]
    fn reserved_prefix_pattern() {
        let heap = BlobHeap::from_bytes(vec![0x00, 0xE0, 0x41, 0x42, 0x43, 0x44]);
        assert!(heap.get(1).is_none());
    }
}
