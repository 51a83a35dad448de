//! GUID heap (`#GUID`) for .NET metadata.
//!
//! Provides access to the ECMA-335 `#GUID` heap, which stores 128-bit GUIDs for module
//! identity and references. This module exposes the [`GuidHeap`] struct for safe access to
//! the GUIDs referenced by metadata tables.
//!
//! # Reference
//! - [ECMA-335 II.24.2.5](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

/// '#GUID' is a heap which contains a sequence of 128-bit GUIDs. Unlike the byte-offset
/// heaps, table columns reference this heap with a 1-based element index; index 0 denotes
/// an absent GUID.
///
/// Reads are total: index 0 and any index past the stored sequence yield `None`.
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::streams::GuidHeap;
/// let heap = GuidHeap::from_bytes(vec![0u8; 16]);
/// assert_eq!(heap.get(1).unwrap(), uguid::guid!("00000000-0000-0000-0000-000000000000"));
/// assert!(heap.get(0).is_none());
/// assert!(heap.get(2).is_none());
/// ```
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.5
pub struct GuidHeap {
    data: Vec<u8>,
}

impl GuidHeap {
    /// Create a `GuidHeap` that owns the provided heap bytes
    ///
    /// # Arguments
    /// * `data` - The heap content; a trailing partial entry is unreachable and ignored
    #[must_use]
    pub fn from_bytes(data: Vec<u8>) -> GuidHeap {
        GuidHeap { data }
    }

    /// The number of complete GUIDs stored in the heap
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.len() / 16
    }

    /// Returns the GUID at the specified 1-based index
    ///
    /// GUIDs have to be built from their bytes, hence no view is possible.
    ///
    /// ## Arguments
    /// * `index` - The 1-based index of the GUID to be accessed (comes from metadata tables)
    #[must_use]
    pub fn get(&self, index: usize) -> Option<uguid::Guid> {
        if index == 0 {
            return None;
        }

        let start = (index - 1).checked_mul(16)?;
        let end = start.checked_add(16)?;
        if end > self.data.len() {
            return None;
        }

        let mut buffer = [0u8; 16];
        buffer.copy_from_slice(&self.data[start..end]);

        Some(uguid::Guid::from_bytes(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data = vec![
            0x8e, 0x90, 0x37, 0xd4, 0xe6, 0x65, 0x7c, 0x48, 0x97, 0x35, 0x7b, 0xdf, 0xf6, 0x99, 0xbe, 0xa5,
            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
        ];

        let heap = GuidHeap::from_bytes(data);

        assert_eq!(heap.count(), 2);
        assert_eq!(
            heap.get(1).unwrap(),
            uguid::guid!("d437908e-65e6-487c-9735-7bdff699bea5")
        );
        assert_eq!(
            heap.get(2).unwrap(),
            uguid::guid!("AAAAAAAA-AAAA-AAAA-AAAA-AAAAAAAAAAAA")
        );
    }

    #[test]
    fn totality() {
        let heap = GuidHeap::from_bytes(vec![0u8; 20]);

        assert_eq!(heap.count(), 1);
        assert!(heap.get(0).is_none());
        assert!(heap.get(1).is_some());
        assert!(heap.get(2).is_none());

        let empty = GuidHeap::from_bytes(Vec::new());
        assert!(empty.get(0).is_none());
        assert!(empty.get(1).is_none());
    }
}
