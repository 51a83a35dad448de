use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Structural violations ([`Error::Malformed`]) are fatal at the point of detection and carry
/// the offending field plus the source location where the malformation was found. Out-of-bounds
/// *heap* offsets are deliberately NOT represented here: heap readers recover locally by
/// returning an absent/empty value, because such offsets occur in binaries that are otherwise
/// loadable.
///
/// # Examples
///
/// ```rust
/// use cilmeta::{metadata::root::Root, Error};
///
/// match Root::read(&[0xFF; 40]) {
///     Ok(_) => println!("valid metadata root"),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed metadata: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input is damaged and could not be parsed.
    ///
    /// This error indicates a structural violation of the ECMA-335 metadata format: a bad
    /// signature, an unknown header version, nonzero reserved flags, a declared length that
    /// would overrun the available bytes, or a row id outside a table's valid range. The
    /// error includes the source location where the malformation was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the input.
    ///
    /// This error occurs when a fixed-width read would extend beyond the end of the provided
    /// buffer. It's a safety check to prevent buffer overruns during parsing and is reported
    /// even in trusted mode, since no value can be produced from missing bytes.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// Provided input was empty.
    ///
    /// This error occurs when an empty buffer is provided where actual CLI metadata was
    /// expected.
    #[error("Provided input was empty")]
    Empty,

    /// The requested operation needs table layout knowledge this library does not carry.
    ///
    /// Locating a table's byte range inside the `#~` stream requires the row schemas of every
    /// table preceding it. This library models the File table only; when another table comes
    /// first, the caller has to supply the byte offset itself.
    #[error("Operation requires table schemas outside the supported catalogue")]
    NotSupported,

    /// The owning metadata image has been dropped.
    ///
    /// Bound entities hold a non-owning back-reference to their [`crate::metadata::image::CilImage`].
    /// The image is expected to outlive every entity it created; if it does not, any field
    /// access that still needs to materialize data fails with this error.
    #[error("The owning metadata image is no longer alive")]
    Detached,
}
