// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # cilmeta
//!
//! A lazily-materialized, editable object model for ECMA-335 CLI metadata. Built in pure
//! Rust, `cilmeta` decodes the metadata embedded in managed binaries - fixed-width table
//! rows plus variable-length heaps - and exposes it as a mutable object graph usable both
//! for reading an existing binary and for editing one.
//!
//! ## The lazy dual-source model
//!
//! Every metadata-backed entity defers its row decode until the first field access, caches
//! it exactly once, and lets any field be permanently overridden for editing - without
//! re-parsing or double-parsing. The same handful of primitives carries this behavior for
//! every entity kind:
//!
//! - [`metadata::lazy::LazyField`] - one field, unset → loaded-once → overridable
//! - [`metadata::lazy::LazyRow`] - one instance's raw row, decoded at most once
//! - [`metadata::lazy::LazyList`] - an id-list resolved into elements exactly once
//!
//! Entities come in two lifecycles behind one capability surface: *synthetic* (authored in
//! memory, for adding entries no binary contains) and *bound* (backed by a table row and
//! the heaps). The File table ([`metadata::tables::File`]) is the modeled instantiation.
//!
//! ## Quick Start
//!
//! ```rust
//! use cilmeta::prelude::*;
//!
//! // Assemble a small synthetic image: one File row, name -> "a.dll"
//! let image = CilImage::builder()
//!     .strings(b"\0a.dll\0".to_vec())
//!     .file_table(vec![0, 0, 0, 0, 1, 0, 0, 0], 1)
//!     .build()?;
//!
//! let file = image.file(1)?;
//! assert_eq!(file.name()?, "a.dll");
//! assert!(file.contains_metadata()?);
//!
//! // Editing overrides the field permanently
//! file.set_name("b.dll");
//! assert_eq!(file.name()?, "b.dll");
//! # Ok::<(), cilmeta::Error>(())
//! ```
//!
//! Reading an existing blob goes through the same container:
//!
//! ```rust,no_run
//! use cilmeta::metadata::image::CilImage;
//!
//! let data: Vec<u8> = std::fs::read("metadata.bin")?;
//! let image = CilImage::from_metadata(&data)?;
//! println!("Metadata version: {}", image.root().unwrap().version);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Structural violations fail fast with [`Error::Malformed`] naming the offending field.
//! Dangling heap offsets do NOT fail: heaps answer them with absent/empty values, because
//! they occur in binaries that are otherwise loadable. Verification can be opted out of
//! per image ([`metadata::image::CilImageBuilder::trusted`]) for pre-validated pipelines -
//! explicitly, never by default.
//!
//! ## Concurrency
//!
//! Materialization happens synchronously on the calling thread at first access. The
//! compute-once contracts are guarded internally, so sharing an image and its entities
//! across threads is safe; once materialized, values are freely read concurrently.
//!
//! ## Standards Compliance
//!
//! `cilmeta` follows the **ECMA-335 specification** (6th edition) for all binary layouts.
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;
pub(crate) mod io;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use cilmeta::prelude::*;
///
/// let image = CilImage::builder().build()?;
/// assert_eq!(image.file_row_count(), 0);
/// # Ok::<(), cilmeta::Error>(())
/// ```
pub mod prelude;

/// Definitions, parsing and lazy modeling of CLI metadata based on ECMA-335
///
/// # Key Components
///
/// - [`metadata::image::CilImage`] - Owning container and main entry point
/// - [`metadata::root`] - Metadata root header and stream directory
/// - [`metadata::streams`] - String, user-string, blob and GUID heaps
/// - [`metadata::lazy`] - Compute-once primitives behind every bound entity
/// - [`metadata::tables`] - Table row infrastructure and the File entity
pub mod metadata;

/// `cilmeta` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always
/// [`Error`]. This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `cilmeta` Error type
///
/// The main error type for all operations in this crate. Provides detailed error
/// information for metadata parsing and entity materialization.
pub use error::Error;

/// Main entry point for working with CLI metadata images.
///
/// See [`metadata::image::CilImage`] for container assembly and entity access.
pub use metadata::image::CilImage;

/// Metadata heaps for direct access to ECMA-335 data structures.
///
/// - [`BlobHeap`] - Binary blob heap for hashes and other variable-length data
/// - [`GuidHeap`] - GUID heap for module identifiers
/// - [`StringsHeap`] - String heap for names and identifiers
/// - [`UserStringsHeap`] - User string heap for string literals
pub use metadata::streams::{BlobHeap, GuidHeap, StreamHeader, StringsHeap, UserStringsHeap};
