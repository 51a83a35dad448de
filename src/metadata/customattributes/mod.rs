//! Custom attribute values and their owner registry.
//!
//! Custom attributes annotate nearly every metadata entity. This module carries them as
//! opaque values: the attribute's token, the constructor it invokes, and the raw value
//! blob. Decoding the blob into fixed and named arguments follows the ECMA-335 II.23.3
//! grammar and is deliberately left to a collaborator - the object model only needs
//! identity and bytes.
//!
//! Entities expose their attributes as a [`CustomAttributeList`]: an ordered collection
//! resolved lazily, exactly once, from the owner's token list in the
//! [`CustomAttributeRegistry`].
//!
//! # References
//!
//! - [ECMA-335 II.22.10 / II.23.3](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

mod registry;

use std::sync::Arc;

use crate::metadata::{lazy::LazyList, token::Token};

pub use registry::CustomAttributeRegistry;

/// One custom attribute application, payload left undecoded.
///
/// The `value` bytes follow the II.23.3 custom attribute grammar (prolog, fixed arguments,
/// named arguments); parsing them requires resolved constructor signatures and happens
/// outside this object model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomAttribute {
    /// Token of this attribute in the `CustomAttribute` table
    pub token: Token,
    /// Token of the constructor method (`MethodDef` or `MemberRef`)
    pub constructor: Token,
    /// The raw value blob, undecoded
    pub value: Vec<u8>,
}

impl CustomAttribute {
    /// Creates an attribute value from its parts
    ///
    /// # Arguments
    /// * `token` - The attribute's own token
    /// * `constructor` - The constructor method token
    /// * `value` - The raw value blob
    #[must_use]
    pub fn new(token: Token, constructor: Token, value: Vec<u8>) -> CustomAttribute {
        CustomAttribute {
            token,
            constructor,
            value,
        }
    }

    /// Creates an empty placeholder for a token the registry does not know.
    ///
    /// List resolvers have to be total; a dangling attribute token materializes as this
    /// placeholder instead of failing the whole collection.
    #[must_use]
    pub fn placeholder(token: Token) -> CustomAttribute {
        CustomAttribute {
            token,
            constructor: Token::new(0),
            value: Vec::new(),
        }
    }
}

/// A reference to a `CustomAttribute`
pub type CustomAttributeRc = Arc<CustomAttribute>;
/// The lazily resolved, editable attribute collection attached to each entity
pub type CustomAttributeList = LazyList<CustomAttributeRc>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_empty() {
        let placeholder = CustomAttribute::placeholder(Token::new(0x0C000007));

        assert_eq!(placeholder.token.value(), 0x0C000007);
        assert!(placeholder.constructor.is_null());
        assert!(placeholder.value.is_empty());
    }
}
