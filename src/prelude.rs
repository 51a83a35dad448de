//! Curated re-exports of the most commonly used types.
//!
//! Importing the prelude brings the container, the File entity surface, the lazy
//! primitives and the error types into scope in one line:
//!
//! ```rust
//! use cilmeta::prelude::*;
//! ```

pub use crate::{
    metadata::{
        customattributes::{CustomAttribute, CustomAttributeList, CustomAttributeRegistry},
        image::{CilImage, CilImageBuilder},
        lazy::{LazyField, LazyList, LazyRow},
        root::Root,
        streams::{BlobHeap, GuidHeap, StreamHeader, StringsHeap, UserStringsHeap},
        tables::{
            File, FileAttributes, FileHash, FileRaw, FileRc, TableId, TableInfo, UserFile,
        },
        token::Token,
    },
    Error, Result,
};
