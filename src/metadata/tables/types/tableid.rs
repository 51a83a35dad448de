//! Identifiers for the metadata tables defined in the ECMA-335 specification.

use strum::{EnumCount, EnumIter, FromRepr};

/// Identifiers for the different metadata tables defined in the ECMA-335 specification.
///
/// Each variant represents a specific type of metadata table that can be present in a CLI
/// image; the numeric values correspond to the table ids as defined in the standard, and
/// double as the high byte of every metadata token referring into that table. This is an
/// identifier catalogue only - of all row schemas, this library decodes the
/// [`crate::metadata::tables::FileRaw`] layout.
///
/// ## Reference
/// - [ECMA-335 II.22](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, EnumIter, EnumCount, FromRepr)]
#[repr(usize)]
pub enum TableId {
    /// `Module` table (0x00) - Information about the current module
    Module = 0x00,
    /// `TypeRef` table (0x01) - References to types defined in external assemblies
    TypeRef = 0x01,
    /// `TypeDef` table (0x02) - Definitions of types within this assembly
    TypeDef = 0x02,
    /// `FieldPtr` table (0x03) - Indirection for field rows in edit-and-continue scenarios
    FieldPtr = 0x03,
    /// `Field` table (0x04) - Field definitions within types
    Field = 0x04,
    /// `MethodPtr` table (0x05) - Indirection for method rows in edit-and-continue scenarios
    MethodPtr = 0x05,
    /// `MethodDef` table (0x06) - Method definitions within types
    MethodDef = 0x06,
    /// `ParamPtr` table (0x07) - Indirection for parameter rows
    ParamPtr = 0x07,
    /// `Param` table (0x08) - Parameter definitions for methods
    Param = 0x08,
    /// `InterfaceImpl` table (0x09) - Interface implementations by types
    InterfaceImpl = 0x09,
    /// `MemberRef` table (0x0A) - References to external members
    MemberRef = 0x0A,
    /// `Constant` table (0x0B) - Compile-time constant values
    Constant = 0x0B,
    /// `CustomAttribute` table (0x0C) - Custom attribute applications
    CustomAttribute = 0x0C,
    /// `FieldMarshal` table (0x0D) - Marshalling information for interop
    FieldMarshal = 0x0D,
    /// `DeclSecurity` table (0x0E) - Declarative security permissions
    DeclSecurity = 0x0E,
    /// `ClassLayout` table (0x0F) - Memory layout information for types
    ClassLayout = 0x0F,
    /// `FieldLayout` table (0x10) - Explicit field positioning within types
    FieldLayout = 0x10,
    /// `StandAloneSig` table (0x11) - Standalone signatures
    StandAloneSig = 0x11,
    /// `EventMap` table (0x12) - Mapping from types to their events
    EventMap = 0x12,
    /// `EventPtr` table (0x13) - Indirection for event rows
    EventPtr = 0x13,
    /// `Event` table (0x14) - Event definitions within types
    Event = 0x14,
    /// `PropertyMap` table (0x15) - Mapping from types to their properties
    PropertyMap = 0x15,
    /// `PropertyPtr` table (0x16) - Indirection for property rows
    PropertyPtr = 0x16,
    /// `Property` table (0x17) - Property definitions within types
    Property = 0x17,
    /// `MethodSemantics` table (0x18) - Association of methods with events and properties
    MethodSemantics = 0x18,
    /// `MethodImpl` table (0x19) - Method implementation overrides
    MethodImpl = 0x19,
    /// `ModuleRef` table (0x1A) - References to external modules
    ModuleRef = 0x1A,
    /// `TypeSpec` table (0x1B) - Instantiated generic type specifications
    TypeSpec = 0x1B,
    /// `ImplMap` table (0x1C) - P/Invoke mapping information
    ImplMap = 0x1C,
    /// `FieldRVA` table (0x1D) - Field initial data locations
    FieldRVA = 0x1D,
    /// `EncLog` table (0x1E) - Edit-and-continue log
    EncLog = 0x1E,
    /// `EncMap` table (0x1F) - Edit-and-continue map
    EncMap = 0x1F,
    /// `Assembly` table (0x20) - The defining assembly's identity
    Assembly = 0x20,
    /// `AssemblyProcessor` table (0x21) - Processor targeting (unused by compilers)
    AssemblyProcessor = 0x21,
    /// `AssemblyOS` table (0x22) - Operating system targeting (unused by compilers)
    AssemblyOS = 0x22,
    /// `AssemblyRef` table (0x23) - References to external assemblies
    AssemblyRef = 0x23,
    /// `AssemblyRefProcessor` table (0x24) - Processor targeting for references
    AssemblyRefProcessor = 0x24,
    /// `AssemblyRefOS` table (0x25) - Operating system targeting for references
    AssemblyRefOS = 0x25,
    /// `File` table (0x26) - The files that make up the current assembly
    File = 0x26,
    /// `ExportedType` table (0x27) - Types exported from other modules of this assembly
    ExportedType = 0x27,
    /// `ManifestResource` table (0x28) - Resources of this assembly
    ManifestResource = 0x28,
    /// `NestedClass` table (0x29) - Nesting relationships between types
    NestedClass = 0x29,
    /// `GenericParam` table (0x2A) - Generic parameter definitions
    GenericParam = 0x2A,
    /// `MethodSpec` table (0x2B) - Instantiated generic method specifications
    MethodSpec = 0x2B,
    /// `GenericParamConstraint` table (0x2C) - Constraints on generic parameters
    GenericParamConstraint = 0x2C,
}

impl TableId {
    /// Resolves a raw table code (the high byte of a token, or a bit position in the `#~`
    /// valid bitvector) to its identifier.
    ///
    /// Returns `None` for codes outside the catalogue.
    #[must_use]
    pub fn from_code(code: u8) -> Option<TableId> {
        TableId::from_repr(code as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn codes_round_trip() {
        for table in TableId::iter() {
            #[allow(clippy::cast_possible_truncation)]
            let code = table as usize as u8;
            assert_eq!(TableId::from_code(code), Some(table));
        }
    }

    #[test]
    fn unknown_codes() {
        assert_eq!(TableId::from_code(0x2D), None);
        assert_eq!(TableId::from_code(0xFF), None);
    }

    #[test]
    fn file_table_code() {
        assert_eq!(TableId::File as usize, 0x26);
    }
}
