//! Definitions, parsing and lazy modeling of CLI metadata based on ECMA-335.
//!
//! The module is organized leaves-first:
//!
//! - [`token`] - Token identity (table kind + row id)
//! - [`root`] - The metadata root header and stream directory
//! - [`streams`] - The variable-length heaps, with total read semantics
//! - [`lazy`] - The compute-once primitives every bound entity is built from
//! - [`tables`] - Generic row infrastructure plus the modeled File entity
//! - [`customattributes`] - Attribute values and the shared owner registry
//! - [`image`] - The owning container tying all of it together
//!
//! Data flows bottom-up: raw bytes → [`root::Root`] locates the stream directory → the
//! heaps and the tables stream are opened → bound entities are created holding only a row
//! id and a back-reference to their [`image::CilImage`] → the first field access decodes
//! the row and resolves heap offsets → attribute collections resolve on first traversal.

pub mod customattributes;
pub mod image;
pub mod lazy;
pub mod root;
pub mod streams;
pub mod tables;
pub mod token;
