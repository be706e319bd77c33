//! # Value Types
//!
//! Every Solidity type the generator can place in a signature: encrypted
//! handles, their plaintext counterparts, and a handful of fixed types
//! (public keys, seeds, security zones, wrapper structs).
//!
//! Encrypted and plaintext types share one rank scale (declaration order),
//! which drives implicit widening in the expander.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ENCRYPTED TYPES
// =============================================================================

/// An encrypted value type. Always a 256-bit opaque handle on-chain.
///
/// Declaration order is the rank order used for promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncryptedType {
    /// Encrypted boolean (comparison result type).
    Ebool,
    /// Encrypted 8-bit unsigned integer.
    Euint8,
    /// Encrypted 16-bit unsigned integer.
    Euint16,
    /// Encrypted 32-bit unsigned integer.
    Euint32,
    /// Encrypted 64-bit unsigned integer.
    Euint64,
    /// Encrypted 128-bit unsigned integer.
    Euint128,
    /// Encrypted 256-bit unsigned integer.
    Euint256,
    /// Encrypted address.
    Eaddress,
}

impl EncryptedType {
    /// All encrypted types in rank order.
    pub const ALL: [Self; 8] = [
        Self::Ebool,
        Self::Euint8,
        Self::Euint16,
        Self::Euint32,
        Self::Euint64,
        Self::Euint128,
        Self::Euint256,
        Self::Eaddress,
    ];

    /// Solidity type name (`euint8`).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ebool => "ebool",
            Self::Euint8 => "euint8",
            Self::Euint16 => "euint16",
            Self::Euint32 => "euint32",
            Self::Euint64 => "euint64",
            Self::Euint128 => "euint128",
            Self::Euint256 => "euint256",
            Self::Eaddress => "eaddress",
        }
    }

    /// Position on the shared promotion scale.
    #[must_use]
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Inverse of [`EncryptedType::rank`].
    #[must_use]
    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.get(usize::from(rank)).copied()
    }

    /// Parse a Solidity type name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Bit width of the plaintext value behind the handle.
    #[must_use]
    pub fn bits(self) -> u16 {
        self.plaintext().bits()
    }

    /// Plaintext counterpart (strips the `e` prefix).
    #[must_use]
    pub fn plaintext(self) -> PlaintextType {
        PlaintextType::ALL[usize::from(self.rank())]
    }

    /// `true` for the type comparisons produce.
    #[must_use]
    pub fn is_comparison_result(self) -> bool {
        self == Self::Ebool
    }

    /// Sealed-output struct family for the typed seal variant.
    #[must_use]
    pub fn sealed_kind(self) -> SealedKind {
        match self {
            Self::Ebool => SealedKind::Bool,
            Self::Eaddress => SealedKind::Address,
            _ => SealedKind::Uint,
        }
    }
}

impl fmt::Display for EncryptedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// PLAINTEXT TYPES
// =============================================================================

/// A plaintext Solidity value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaintextType {
    /// `bool`
    Bool,
    /// `uint8`
    Uint8,
    /// `uint16`
    Uint16,
    /// `uint32`
    Uint32,
    /// `uint64`
    Uint64,
    /// `uint128`
    Uint128,
    /// `uint256`
    Uint256,
    /// `address`
    Address,
}

impl PlaintextType {
    /// All plaintext types in rank order.
    pub const ALL: [Self; 8] = [
        Self::Bool,
        Self::Uint8,
        Self::Uint16,
        Self::Uint32,
        Self::Uint64,
        Self::Uint128,
        Self::Uint256,
        Self::Address,
    ];

    /// Solidity type name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uint128 => "uint128",
            Self::Uint256 => "uint256",
            Self::Address => "address",
        }
    }

    /// Parse a Solidity type name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Position on the shared promotion scale.
    #[must_use]
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Bit width.
    #[must_use]
    pub fn bits(self) -> u16 {
        match self {
            Self::Bool => 1,
            Self::Uint8 => 8,
            Self::Uint16 => 16,
            Self::Uint32 => 32,
            Self::Uint64 => 64,
            Self::Uint128 => 128,
            Self::Uint256 => 256,
            Self::Address => 160,
        }
    }

    /// Encrypted counterpart.
    #[must_use]
    pub fn encrypted(self) -> EncryptedType {
        EncryptedType::ALL[usize::from(self.rank())]
    }

    /// `Common` helper truncating a raw 256-bit result to this type.
    #[must_use]
    pub fn from_handle_fn(self) -> String {
        format!("Common.bigIntTo{}", super::naming::capitalize(self.name()))
    }

    /// Expression converting a `uint256` test input into this type.
    #[must_use]
    pub fn from_uint256_expr(self, var: &str) -> String {
        match self {
            Self::Bool => format!("{var} != 0"),
            Self::Address => format!("address(uint160({var}))"),
            Self::Uint256 => var.to_string(),
            other => format!("{}({var})", other.name()),
        }
    }
}

impl fmt::Display for PlaintextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// FIXED TYPES
// =============================================================================

/// Struct family returned by the typed seal variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SealedKind {
    /// `SealedBool`
    Bool,
    /// `SealedUint`
    Uint,
    /// `SealedAddress`
    Address,
}

impl SealedKind {
    /// All sealed struct families.
    pub const ALL: [Self; 3] = [Self::Bool, Self::Uint, Self::Address];

    /// Solidity struct name.
    #[must_use]
    pub fn struct_name(self) -> &'static str {
        match self {
            Self::Bool => "SealedBool",
            Self::Uint => "SealedUint",
            Self::Address => "SealedAddress",
        }
    }
}

/// A type that never takes part in promotion and is placed in signatures
/// verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FixedType {
    /// 32-byte public key.
    Bytes32,
    /// Dynamic byte string.
    Bytes,
    /// Random seed.
    Uint64,
    /// Security zone.
    Int32,
    /// `in<Type>` input ciphertext wrapper.
    InputStruct(EncryptedType),
    /// Typed sealed output.
    Sealed(SealedKind),
}

impl FixedType {
    /// Solidity type name.
    #[must_use]
    pub fn name(self) -> String {
        match self {
            Self::Bytes32 => "bytes32".to_string(),
            Self::Bytes => "bytes".to_string(),
            Self::Uint64 => "uint64".to_string(),
            Self::Int32 => "int32".to_string(),
            Self::InputStruct(t) => format!("in{}", super::naming::capitalize(t.name())),
            Self::Sealed(kind) => kind.struct_name().to_string(),
        }
    }

    /// `true` for reference types that need a data location.
    #[must_use]
    pub fn needs_location(self) -> bool {
        matches!(self, Self::Bytes | Self::InputStruct(_) | Self::Sealed(_))
    }
}

// =============================================================================
// VALUE TYPE
// =============================================================================

/// Any type that can appear in a concrete signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValueType {
    /// Encrypted handle.
    Encrypted(EncryptedType),
    /// Plaintext value.
    Plaintext(PlaintextType),
    /// Fixed, non-promotable type.
    Fixed(FixedType),
}

impl ValueType {
    /// Parse an explicit type name as written in catalog annotations.
    ///
    /// `uint64` resolves to the plaintext type; use [`FixedType::Uint64`]
    /// directly for seed parameters.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(t) = EncryptedType::from_name(name) {
            return Some(Self::Encrypted(t));
        }
        if let Some(t) = PlaintextType::from_name(name) {
            return Some(Self::Plaintext(t));
        }
        match name {
            "bytes32" => Some(Self::Fixed(FixedType::Bytes32)),
            "bytes" | "string" => Some(Self::Fixed(FixedType::Bytes)),
            "int32" => Some(Self::Fixed(FixedType::Int32)),
            _ => SealedKind::ALL
                .into_iter()
                .find(|k| k.struct_name() == name)
                .map(|k| Self::Fixed(FixedType::Sealed(k))),
        }
    }

    /// Solidity type name without data location.
    #[must_use]
    pub fn name(self) -> String {
        match self {
            Self::Encrypted(t) => t.name().to_string(),
            Self::Plaintext(t) => t.name().to_string(),
            Self::Fixed(t) => t.name(),
        }
    }

    /// Solidity type as written in a parameter or return list.
    #[must_use]
    pub fn declaration(self) -> String {
        match self {
            Self::Fixed(t) if t.needs_location() => format!("{} memory", t.name()),
            other => other.name(),
        }
    }

    /// Rank on the promotion scale; fixed types have none.
    #[must_use]
    pub fn rank(self) -> Option<u8> {
        match self {
            Self::Encrypted(t) => Some(t.rank()),
            Self::Plaintext(t) => Some(t.rank()),
            Self::Fixed(_) => None,
        }
    }

    /// `true` for dynamic byte strings.
    #[must_use]
    pub fn is_byte_string(self) -> bool {
        matches!(self, Self::Fixed(FixedType::Bytes))
    }

    /// The encrypted type, if this is one.
    #[must_use]
    pub fn as_encrypted(self) -> Option<EncryptedType> {
        match self {
            Self::Encrypted(t) => Some(t),
            _ => None,
        }
    }

    /// The plaintext type, if this is one.
    #[must_use]
    pub fn as_plaintext(self) -> Option<PlaintextType> {
        match self {
            Self::Plaintext(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl From<EncryptedType> for ValueType {
    fn from(t: EncryptedType) -> Self {
        Self::Encrypted(t)
    }
}

impl From<PlaintextType> for ValueType {
    fn from(t: PlaintextType) -> Self {
        Self::Plaintext(t)
    }
}

impl From<FixedType> for ValueType {
    fn from(t: FixedType) -> Self {
        Self::Fixed(t)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_order_matches_declaration() {
        let ranks: Vec<u8> = EncryptedType::ALL.iter().map(|t| t.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(EncryptedType::from_rank(3), Some(EncryptedType::Euint32));
        assert_eq!(EncryptedType::from_rank(8), None);
    }

    #[test]
    fn test_plaintext_counterparts_share_rank() {
        for t in EncryptedType::ALL {
            assert_eq!(t.plaintext().rank(), t.rank());
            assert_eq!(t.plaintext().encrypted(), t);
            assert_eq!(format!("e{}", t.plaintext().name()), t.name());
        }
    }

    #[test]
    fn test_parse_explicit_types() {
        assert_eq!(
            ValueType::parse("ebool"),
            Some(ValueType::Encrypted(EncryptedType::Ebool))
        );
        assert_eq!(
            ValueType::parse("uint64"),
            Some(ValueType::Plaintext(PlaintextType::Uint64))
        );
        assert_eq!(
            ValueType::parse("bytes32"),
            Some(ValueType::Fixed(FixedType::Bytes32))
        );
        assert_eq!(
            ValueType::parse("SealedUint"),
            Some(ValueType::Fixed(FixedType::Sealed(SealedKind::Uint)))
        );
        assert_eq!(ValueType::parse("float"), None);
    }

    #[test]
    fn test_declarations_carry_data_location() {
        assert_eq!(ValueType::Fixed(FixedType::Bytes).declaration(), "bytes memory");
        assert_eq!(
            ValueType::Fixed(FixedType::InputStruct(EncryptedType::Euint16)).declaration(),
            "inEuint16 memory"
        );
        assert_eq!(ValueType::Fixed(FixedType::Bytes32).declaration(), "bytes32");
        assert_eq!(ValueType::Encrypted(EncryptedType::Euint8).declaration(), "euint8");
    }

    #[test]
    fn test_fixed_types_have_no_rank() {
        assert_eq!(ValueType::Fixed(FixedType::Uint64).rank(), None);
        assert_eq!(ValueType::Plaintext(PlaintextType::Uint64).rank(), Some(4));
        assert!(ValueType::Fixed(FixedType::Bytes).is_byte_string());
        assert!(!ValueType::Fixed(FixedType::Bytes32).is_byte_string());
    }

    #[test]
    fn test_plaintext_conversion_helpers() {
        assert_eq!(PlaintextType::Uint8.from_handle_fn(), "Common.bigIntToUint8");
        assert_eq!(PlaintextType::Bool.from_uint256_expr("a"), "a != 0");
        assert_eq!(PlaintextType::Uint16.from_uint256_expr("b"), "uint16(b)");
        assert_eq!(
            PlaintextType::Address.from_uint256_expr("b"),
            "address(uint160(b))"
        );
    }
}
