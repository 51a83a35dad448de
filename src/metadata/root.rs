//! Metadata root header and stream directory for .NET assemblies.
//!
//! This module defines the [`Root`] struct, which represents the root metadata header and
//! stream directory as specified by ECMA-335. It provides access to all metadata streams,
//! version info, and structural metadata required for locating and interpreting the
//! metadata heaps and tables.
//!
//! Verification of the header's structural invariants (signature, version, reserved flags)
//! is on by default; [`Root::read_trusted`] skips those checks for pre-validated pipelines.
//!
//! # References
//!
//! - [ECMA-335 II.24.2.1: Metadata root](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{io::read_le_at, metadata::streams::StreamHeader, Error::OutOfBounds, Result};

/// The MAGIC value indicating the CIL metadata header
pub const CIL_HEADER_MAGIC: u32 = 0x424A_5342;

/// The header of the present metadata, providing necessary information for parsing.
///
/// The [`Root`] struct gives access to the version string, stream directory, and all stream
/// headers required to parse CLI metadata. It is the first structure parsed when reading a
/// metadata blob.
///
/// The version string occupies a declared number of bytes in the image; the decoded
/// [`Root::version`] only covers the content up to its NUL terminator, while
/// [`Root::length`] keeps the declared byte count. Parsing always consumes the full
/// declared length, because the field is commonly over-allocated.
///
/// # Example
///
/// ```rust,no_run
/// use cilmeta::metadata::root::Root;
/// let root = Root::read(&[
///            0x42, 0x53, 0x4A, 0x42,
///            0x01, 0x00,
///            0x01, 0x00,
///            0x00, 0x00, 0x00, 0x00,
///            0x04, 0x00, 0x00, 0x00,
///            b'v', b'1', 0x00, 0x00,
///            0x00,
///            0x00,
///            0x01, 0x00,
///            0x00, 0x00, 0x00, 0x00, // StreamHeader
///            0x05, 0x00, 0x00, 0x00,
///            0x23, 0x7E, 0x00, 0x00,
///        ])?;
/// println!("Metadata version: {}", root.version);
/// for stream in &root.stream_headers {
///     println!("Stream: {} (offset: {}, size: {})", stream.name, stream.offset, stream.size);
/// }
/// # Ok::<(), cilmeta::Error>(())
/// ```
///
/// ## Reference
/// - [ECMA-335 II.24.2.1: Metadata root](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)
pub struct Root {
    /// Magic signature for physical metadata: 0x424A5342
    pub signature: u32,
    /// `MajorVersion`
    pub major_version: u16,
    /// `MinorVersion`
    pub minor_version: u16,
    /// Always 0
    pub reserved: u32,
    /// Number of bytes allocated to hold the version string
    pub length: u32,
    /// 'VersionString\0', decoded up to the terminator
    pub version: String,
    /// Reserved, always 0
    pub flags: u8,
    /// Reserved, second byte
    pub reserved2: u8,
    /// Number of streams
    pub stream_number: u16,
    /// Streams
    pub stream_headers: Vec<StreamHeader>,
}

impl Root {
    /// Reads a [`Root`] metadata header from a byte slice, verifying its structure.
    ///
    /// # Arguments
    /// * `data` - The byte slice from which this object shall be read
    ///
    /// # Errors
    /// Returns an error naming the offending field if the signature is invalid, the header
    /// version is unknown, the reserved flags are nonzero, the declared version string
    /// length would read past the available bytes, or the stream directory is malformed.
    pub fn read(data: &[u8]) -> Result<Root> {
        Self::read_with(data, true)
    }

    /// Reads a [`Root`] metadata header without verifying signature, version or flags.
    ///
    /// This is the explicit "trust the input" mode for pre-validated pipelines: the
    /// structural gate checks of [`Root::read`] are skipped, and malformed input yields
    /// undefined field values downstream instead of failures. Reads that would run past the
    /// provided buffer still fail.
    ///
    /// # Arguments
    /// * `data` - The byte slice from which this object shall be read
    ///
    /// # Errors
    /// Returns an error if the data is too short to hold the declared structures.
    pub fn read_trusted(data: &[u8]) -> Result<Root> {
        Self::read_with(data, false)
    }

    fn read_with(data: &[u8], verify: bool) -> Result<Root> {
        if data.is_empty() {
            return Err(crate::Error::Empty);
        }

        if data.len() < 20 {
            return Err(OutOfBounds);
        }

        let mut offset = 0_usize;
        let signature = read_le_at::<u32>(data, &mut offset)?;
        if verify && signature != CIL_HEADER_MAGIC {
            return Err(malformed_error!(
                "Invalid metadata signature - {:#010x}",
                signature
            ));
        }

        let major_version = read_le_at::<u16>(data, &mut offset)?;
        let minor_version = read_le_at::<u16>(data, &mut offset)?;
        let known_version = (major_version == 1 && minor_version == 1)
            || (major_version == 0 && minor_version >= 19);
        if verify && !known_version {
            return Err(malformed_error!(
                "Unknown metadata header version - {}.{}",
                major_version,
                minor_version
            ));
        }

        let reserved = read_le_at::<u32>(data, &mut offset)?;
        let length = read_le_at::<u32>(data, &mut offset)?;

        let Some(version_end) = (length as usize).checked_add(offset) else {
            return Err(malformed_error!(
                "Version string length causing integer overflow - {}",
                length
            ));
        };
        if version_end > data.len() {
            return Err(malformed_error!(
                "Version string length reads past the available bytes - {}",
                length
            ));
        }

        // The version string occupies the full declared length; the content ends at the
        // first NUL inside it. Consume all declared bytes either way.
        let version_bytes = &data[offset..version_end];
        let terminated = version_bytes
            .iter()
            .position(|byte| *byte == 0)
            .map_or(version_bytes, |end| &version_bytes[..end]);
        let version = String::from_utf8_lossy(terminated).into_owned();
        offset = version_end;

        let flags = read_le_at::<u8>(data, &mut offset)?;
        if verify && flags != 0 {
            return Err(malformed_error!("Reserved header flags not zero - {}", flags));
        }

        let reserved2 = read_le_at::<u8>(data, &mut offset)?;
        let stream_number = read_le_at::<u16>(data, &mut offset)?;

        let mut streams = Vec::with_capacity(stream_number as usize);
        for _ in 0..stream_number {
            if offset > data.len() {
                return Err(OutOfBounds);
            }

            let new_stream = StreamHeader::from(&data[offset..])?;
            if verify {
                match u32::checked_add(new_stream.offset, new_stream.size) {
                    Some(range) => {
                        if range as usize > data.len() {
                            return Err(malformed_error!(
                                "Stream '{}' extends past the metadata - {} + {}",
                                new_stream.name,
                                new_stream.offset,
                                new_stream.size
                            ));
                        }
                    }
                    None => {
                        return Err(malformed_error!(
                            "Stream offset and size cause integer overflow - {} + {}",
                            new_stream.offset,
                            new_stream.size
                        ))
                    }
                }
            }

            let name_aligned = ((new_stream.name.len() + 1) + 3) & !3;
            offset += 8 + name_aligned;

            streams.push(new_stream);
        }

        Ok(Root {
            signature,
            major_version,
            minor_version,
            reserved,
            length,
            version,
            flags,
            reserved2,
            stream_number,
            stream_headers: streams,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crafted_header(major: u16, minor: u16, flags: u8) -> Vec<u8> {
        #[rustfmt::skip]
        let mut header_bytes = vec![
            0x42, 0x53, 0x4A, 0x42,
            0x00, 0x00,
            0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x05, 0x00, 0x00, 0x00,
            b'H', b'E', b'L', b'L', b'O',
            0x00,
            0x00,
            0x01, 0x00,

            0x01, 0x00, 0x00, 0x00, // StreamHeader
            0x05, 0x00, 0x00, 0x00,
            0x23, 0x7E, 0x00, 0x00,
        ];
        header_bytes[4..6].copy_from_slice(&major.to_le_bytes());
        header_bytes[6..8].copy_from_slice(&minor.to_le_bytes());
        header_bytes[21] = flags;
        header_bytes
    }

    #[test]
    fn crafted() {
        let parsed_header = Root::read(&crafted_header(1, 1, 0)).unwrap();

        assert_eq!(parsed_header.signature, CIL_HEADER_MAGIC);
        assert_eq!(parsed_header.major_version, 1);
        assert_eq!(parsed_header.minor_version, 1);
        assert_eq!(parsed_header.reserved, 0);
        assert_eq!(parsed_header.length, 5);
        assert_eq!(parsed_header.version, "HELLO");
        assert_eq!(parsed_header.flags, 0);
        assert_eq!(parsed_header.stream_number, 1);
        assert_eq!(parsed_header.stream_headers.len(), 1);
        assert_eq!(parsed_header.stream_headers[0].offset, 0x1);
        assert_eq!(parsed_header.stream_headers[0].size, 0x5);
        assert_eq!(parsed_header.stream_headers[0].name, "#~");
    }

    #[test]
    fn signature_gate() {
        let mut data = crafted_header(1, 1, 0);
        data[0] = 0x41;

        assert!(Root::read(&data).is_err());
        assert!(Root::read_trusted(&data).is_ok());
    }

    #[test]
    fn version_gate() {
        assert!(Root::read(&crafted_header(1, 1, 0)).is_ok());
        assert!(Root::read(&crafted_header(0, 19, 0)).is_ok());
        assert!(Root::read(&crafted_header(0, 42, 0)).is_ok());

        assert!(Root::read(&crafted_header(0, 18, 0)).is_err());
        assert!(Root::read(&crafted_header(2, 0, 0)).is_err());
        assert!(Root::read(&crafted_header(1, 0, 0)).is_err());

        assert!(Root::read_trusted(&crafted_header(2, 0, 0)).is_ok());
        assert!(Root::read_trusted(&crafted_header(0, 18, 0)).is_ok());
    }

    #[test]
    fn flags_gate() {
        assert!(Root::read(&crafted_header(1, 1, 0x01)).is_err());
        assert!(Root::read_trusted(&crafted_header(1, 1, 0x01)).is_ok());
    }

    #[test]
    fn version_string_consumes_declared_length() {
        // Declared length 6, terminator after one byte; the cursor still advances the
        // full 6 bytes, so the stream directory parses from the right position.
        #[rustfmt::skip]
        let data = [
            0x42, 0x53, 0x4A, 0x42,
            0x01, 0x00,
            0x01, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x06, 0x00, 0x00, 0x00,
            b'A', 0x00, b'B', b'B', b'B', b'B',
            0x00,
            0x00,
            0x01, 0x00,

            0x01, 0x00, 0x00, 0x00,
            0x05, 0x00, 0x00, 0x00,
            0x23, 0x7E, 0x00, 0x00,
        ];

        let parsed_header = Root::read(&data).unwrap();
        assert_eq!(parsed_header.version, "A");
        assert_eq!(parsed_header.length, 6);
        assert_eq!(parsed_header.stream_number, 1);
        assert_eq!(parsed_header.stream_headers[0].name, "#~");
    }

    #[test]
    fn version_string_overrun() {
        #[rustfmt::skip]
        let data = [
            0x42, 0x53, 0x4A, 0x42,
            0x01, 0x00,
            0x01, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0xFF, 0x00, 0x00, 0x00,
            b'A', 0x00, b'B', b'B',
        ];

        assert!(Root::read(&data).is_err());
        assert!(Root::read_trusted(&data).is_err());
    }

    #[test]
    fn empty_input() {
        assert!(matches!(Root::read(&[]), Err(crate::Error::Empty)));
    }
}
