//! Owner-indexed storage for custom attribute values.

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;

use crate::{
    metadata::{
        customattributes::{CustomAttribute, CustomAttributeRc},
        tables::{CodedIndex, CodedIndexType, TableId},
        token::Token,
    },
    Result,
};

/// Registry mapping attribute owners to their ordered custom attribute values.
///
/// Owners of every kind - types, methods, assemblies, files - share one addressing
/// mechanism: the `HasCustomAttribute` coded index, whose per-table tag value is fixed by
/// the standard. The registry keys its owner index by that encoded value, so an owner's
/// identity is exactly what it would be in the serialized `CustomAttribute` table.
///
/// The registry is the collaborator behind every entity's lazily resolved attribute
/// collection: entities snapshot their owner's token list at construction and resolve
/// individual tokens through [`CustomAttributeRegistry::get`] on first access.
pub struct CustomAttributeRegistry {
    /// Encoded `HasCustomAttribute` owner -> ordered attribute tokens
    owners: DashMap<u32, Vec<Token>>,
    /// Attribute token -> attribute value
    attributes: SkipMap<Token, CustomAttributeRc>,
}

impl CustomAttributeRegistry {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        CustomAttributeRegistry {
            owners: DashMap::new(),
            attributes: SkipMap::new(),
        }
    }

    /// Registers an attribute under its owner, appending to the owner's ordered list.
    ///
    /// # Arguments
    /// * `owner` - Token of the owning entity; its table must be a `HasCustomAttribute`
    ///   owner kind
    /// * `attribute` - The attribute value to store
    ///
    /// # Errors
    /// Returns an error if the owner token names an unknown table or one that cannot own
    /// custom attributes.
    pub fn register(
        &self,
        owner: Token,
        attribute: CustomAttribute,
    ) -> Result<CustomAttributeRc> {
        let key = Self::owner_key(owner)?;

        let attribute = CustomAttributeRc::new(attribute);
        self.attributes.insert(attribute.token, attribute.clone());
        self.owners.entry(key).or_default().push(attribute.token);

        Ok(attribute)
    }

    /// Returns the ordered attribute-token list of an owner.
    ///
    /// Owners without attributes - including tokens that are no valid owner kind at all -
    /// yield an empty list; the id-list consumer side is total.
    ///
    /// # Arguments
    /// * `owner` - Token of the owning entity
    #[must_use]
    pub fn owner_tokens(&self, owner: Token) -> Vec<Token> {
        match Self::owner_key(owner) {
            Ok(key) => self
                .owners
                .get(&key)
                .map(|tokens| tokens.value().clone())
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    /// Looks up an attribute value by its token
    #[must_use]
    pub fn get(&self, token: Token) -> Option<CustomAttributeRc> {
        self.attributes.get(&token).map(|entry| entry.value().clone())
    }

    /// The number of registered attributes
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if no attributes are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    fn owner_key(owner: Token) -> Result<u32> {
        let Some(table) = TableId::from_code(owner.table()) else {
            return Err(malformed_error!(
                "Unknown owner table for custom attribute - {}",
                owner
            ));
        };

        CodedIndex::new(table, owner.row()).encode(CodedIndexType::HasCustomAttribute)
    }
}

impl Default for CustomAttributeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribute(rid: u32) -> CustomAttribute {
        CustomAttribute::new(
            Token::new(0x0C00_0000 + rid),
            Token::new(0x0A00_0001),
            vec![0x01, 0x00],
        )
    }

    #[test]
    fn register_and_lookup() {
        let registry = CustomAttributeRegistry::new();
        let owner = Token::new(0x26000001);

        let stored = registry.register(owner, attribute(1)).unwrap();
        assert_eq!(stored.token.value(), 0x0C000001);
        assert_eq!(registry.len(), 1);

        let tokens = registry.owner_tokens(owner);
        assert_eq!(tokens, vec![Token::new(0x0C000001)]);
        assert!(registry.get(Token::new(0x0C000001)).is_some());
        assert!(registry.get(Token::new(0x0C000002)).is_none());
    }

    #[test]
    fn owner_lists_are_ordered_and_separate() {
        let registry = CustomAttributeRegistry::new();
        let file_owner = Token::new(0x26000001);
        let method_owner = Token::new(0x06000001);

        registry.register(file_owner, attribute(2)).unwrap();
        registry.register(file_owner, attribute(1)).unwrap();
        registry.register(method_owner, attribute(3)).unwrap();

        assert_eq!(
            registry.owner_tokens(file_owner),
            vec![Token::new(0x0C000002), Token::new(0x0C000001)]
        );
        assert_eq!(
            registry.owner_tokens(method_owner),
            vec![Token::new(0x0C000003)]
        );
    }

    #[test]
    fn same_rid_different_owner_kind() {
        // File rid 1 and MethodDef rid 1 must never collide in the owner index
        let registry = CustomAttributeRegistry::new();

        registry.register(Token::new(0x26000001), attribute(1)).unwrap();

        assert!(registry.owner_tokens(Token::new(0x06000001)).is_empty());
        assert_eq!(registry.owner_tokens(Token::new(0x26000001)).len(), 1);
    }

    #[test]
    fn invalid_owner_kind() {
        let registry = CustomAttributeRegistry::new();

        // FieldPtr is not a HasCustomAttribute owner kind
        let result = registry.register(Token::new(0x03000001), attribute(1));
        assert!(result.is_err());

        // Unknown table code
        assert!(registry.owner_tokens(Token::new(0xFF000001)).is_empty());
    }
}
