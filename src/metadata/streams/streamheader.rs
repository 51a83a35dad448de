//! Stream header for .NET metadata streams.
//!
//! Provides parsing and access to stream headers, which describe the name, offset, and size
//! of each metadata stream in a CLI image. This module exposes the [`StreamHeader`] struct
//! for reading and validating stream header information.
//!
//! # Reference
//! - [ECMA-335 II.24.2.2](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{io::read_le_at, Error::OutOfBounds, Result};

/// A stream header provides the name, and the position and length of a particular table or
/// heap. Note that the length of a stream header structure is not fixed, but depends on the
/// length of its name field (a variable length NUL-terminated string, padded to the next
/// 4-byte boundary).
///
/// Names are not restricted to the five well-known heaps; obfuscated or hand-crafted images
/// carry custom stream names, and the directory has to survive those. The 32-byte name cap
/// from the standard is enforced.
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.2
pub struct StreamHeader {
    /// Memory offset relative to the start of the metadata root
    pub offset: u32,
    /// Size of this stream in bytes, shall be a multiple of 4
    pub size: u32,
    /// Name of Stream\0, max 32 characters
    pub name: String,
}

impl StreamHeader {
    /// Create a `StreamHeader` object from a sequence of bytes
    ///
    /// # Arguments
    /// * `data` - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the data is too short or the name is missing its terminator
    /// within the 32-byte limit.
    pub fn from(data: &[u8]) -> Result<StreamHeader> {
        if data.len() < 9 {
            return Err(OutOfBounds);
        }

        let mut offset = 0_usize;
        let stream_offset = read_le_at::<u32>(data, &mut offset)?;
        let stream_size = read_le_at::<u32>(data, &mut offset)?;

        let mut name = String::with_capacity(32);
        let mut terminated = false;
        for counter in 0..std::cmp::min(32, data.len() - 8) {
            let name_char = data[8 + counter];
            if name_char == 0 {
                terminated = true;
                break;
            }

            name.push(char::from(name_char));
        }

        if !terminated {
            return Err(malformed_error!(
                "Stream name missing terminator - '{}'",
                name
            ));
        }

        Ok(StreamHeader {
            offset: stream_offset,
            size: stream_size,
            name,
        })
    }
}
