//! Lazy materialization primitives for metadata-backed entities.
//!
//! Every entity bound to a metadata image defers its work until first access: the row
//! decode, the per-field heap resolution, and the resolution of attached collections. The
//! three primitives here carry those contracts for every entity kind:
//!
//! - [`LazyField`] - One field's value: unset until loaded once, overridable permanently
//! - [`LazyRow`] - One instance's fixed-width row: decoded at most once, shared by all of
//!   that instance's field loaders
//! - [`LazyList`] - An ordered id-list resolved into concrete elements on first access,
//!   exactly once per id, editable afterwards
//!
//! Materialization is synchronous on the calling thread; there are no suspension points.
//! The compute-once guarantees are enforced with internal locks, so concurrent first-access
//! is safe, and once materialized the values are freely shared for concurrent reads.

mod field;
mod list;
mod row;

pub use field::LazyField;
pub use list::{LazyList, ListResolver};
pub use row::LazyRow;
