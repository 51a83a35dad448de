//! Metadata streams and heaps as defined by ECMA-335.
//!
//! A metadata blob carries its variable-length data in named streams: the `#Strings`,
//! `#US`, `#Blob` and `#GUID` heaps plus the `#~` table stream. This module provides the
//! stream directory entry type and an owning reader per heap.
//!
//! All heap readers share one contract: reads are total. Offsets come out of table rows of
//! externally supplied binaries, and a reference that points nowhere must degrade to an
//! absent value so that row materialization stays robust. Structural failures are reserved
//! for the header decoders.
//!
//! # Key Components
//!
//! - [`StreamHeader`] - One stream directory entry (offset, size, name)
//! - [`StringsHeap`] - NUL-terminated UTF-8 identifier strings (`#Strings`)
//! - [`UserStringsHeap`] - Length-prefixed UTF-16 string literals (`#US`)
//! - [`BlobHeap`] - Length-prefixed binary blobs (`#Blob`)
//! - [`GuidHeap`] - 128-bit GUID sequence (`#GUID`)
//!
//! # References
//!
//! - [ECMA-335 II.24.2](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

mod blob;
mod guid;
mod streamheader;
mod strings;
mod userstrings;

pub use blob::BlobHeap;
pub use guid::GuidHeap;
pub use streamheader::StreamHeader;
pub use strings::StringsHeap;
pub use userstrings::UserStringsHeap;
