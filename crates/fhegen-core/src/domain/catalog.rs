//! # Type/Operation Catalog
//!
//! Immutable rule tables consulted by the expander, template engine and
//! assembler: which types exist, which operations each type supports, which
//! casts are legal, the dispatcher's numbering, and the operator table.
//!
//! Build one with [`Catalog::standard`] and adjust it with the `with_*`
//! methods before handing it to the pipeline.
//!
//! ## Bit-exact tables
//!
//! | Table | Consumer |
//! |-------|----------|
//! | type tags | native dispatcher `utype` argument |
//! | function ids | `FunctionId` enum ordinal passed to the dispatcher |

use super::types::{EncryptedType, FixedType, PlaintextType, ValueType};
use std::collections::BTreeMap;

/// Function-id order expected by the dispatcher. Placeholders keep the
/// ordinals of retired ids stable.
pub const STANDARD_FUNCTION_IDS: &[&str] = &[
    "_0",
    "_1",
    "_2",
    "getNetworkKey",
    "cast",
    "sealoutput",
    "select",
    "_7",
    "decrypt",
    "sub",
    "add",
    "xor",
    "and",
    "or",
    "not",
    "div",
    "rem",
    "mul",
    "shl",
    "shr",
    "gte",
    "lte",
    "lt",
    "gt",
    "min",
    "max",
    "eq",
    "ne",
    "trivialEncrypt",
    "random",
    "rol",
    "ror",
    "square",
    "verify",
    "req",
];

/// Operations authored by hand and never expanded from the text catalog.
pub const STANDARD_EXCLUDED: &[&str] = &["trivialEncrypt", "cast", "verify", "getNetworkPublicKey"];

/// Canonical name of the seal operation.
pub const SEAL_OPERATION: &str = "sealoutput";

/// Symbol of the typed seal variant.
pub const SEAL_TYPED_SYMBOL: &str = "sealoutputTyped";

/// Which operations a type supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationFilter {
    /// Every operation.
    All,
    /// Every operation except these.
    Except(Vec<String>),
    /// Only these operations.
    Only(Vec<String>),
}

impl OperationFilter {
    /// Build an `Except` filter.
    #[must_use]
    pub fn except(ops: &[&str]) -> Self {
        Self::Except(ops.iter().map(|s| (*s).to_string()).collect())
    }

    /// Build an `Only` filter.
    #[must_use]
    pub fn only(ops: &[&str]) -> Self {
        Self::Only(ops.iter().map(|s| (*s).to_string()).collect())
    }

    /// Whether `operation` passes the filter.
    #[must_use]
    pub fn allows(&self, operation: &str) -> bool {
        match self {
            Self::All => true,
            Self::Except(ops) => !ops.iter().any(|o| o == operation),
            Self::Only(ops) => ops.iter().any(|o| o == operation),
        }
    }
}

/// A Solidity user-defined operator bound to a catalog operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    /// Catalog operation name.
    pub operation: String,
    /// Solidity operator token.
    pub symbol: String,
}

/// Immutable generation rules.
#[derive(Debug, Clone)]
pub struct Catalog {
    encrypted: Vec<EncryptedType>,
    plaintext: Vec<PlaintextType>,
    allowed: BTreeMap<EncryptedType, OperationFilter>,
    function_ids: Vec<String>,
    eaddress_cast_sources: Vec<ValueType>,
    operators: Vec<Operator>,
    excluded: Vec<String>,
    typed_seal: bool,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    /// The rule set matching the deployed dispatcher.
    #[must_use]
    pub fn standard() -> Self {
        let mut allowed = BTreeMap::new();
        for t in EncryptedType::ALL {
            allowed.insert(t, OperationFilter::All);
        }
        allowed.insert(EncryptedType::Euint128, OperationFilter::except(&["div", "rem"]));
        allowed.insert(
            EncryptedType::Euint256,
            OperationFilter::except(&["div", "rem", "mul", "shl", "shr", "rol", "ror"]),
        );
        allowed.insert(
            EncryptedType::Eaddress,
            OperationFilter::only(&["eq", "ne", "select", "decrypt", SEAL_OPERATION, "req"]),
        );

        let operators = [
            ("add", "+"),
            ("sub", "-"),
            ("mul", "*"),
            ("div", "/"),
            ("rem", "%"),
            ("and", "&"),
            ("or", "|"),
            ("xor", "^"),
        ]
        .into_iter()
        .map(|(operation, symbol)| Operator {
            operation: operation.to_string(),
            symbol: symbol.to_string(),
        })
        .collect();

        Self {
            encrypted: EncryptedType::ALL.to_vec(),
            plaintext: PlaintextType::ALL.to_vec(),
            allowed,
            function_ids: STANDARD_FUNCTION_IDS.iter().map(|s| (*s).to_string()).collect(),
            eaddress_cast_sources: vec![
                ValueType::Encrypted(EncryptedType::Euint256),
                ValueType::Plaintext(PlaintextType::Uint256),
                ValueType::Plaintext(PlaintextType::Address),
            ],
            operators,
            excluded: STANDARD_EXCLUDED.iter().map(|s| (*s).to_string()).collect(),
            typed_seal: true,
        }
    }

    /// Replace the allowed-operation filter of one type.
    #[must_use]
    pub fn with_filter(mut self, t: EncryptedType, filter: OperationFilter) -> Self {
        self.allowed.insert(t, filter);
        self
    }

    /// Replace the `eaddress` cast allow-list.
    #[must_use]
    pub fn with_eaddress_cast_sources(mut self, sources: Vec<ValueType>) -> Self {
        self.eaddress_cast_sources = sources;
        self
    }

    /// Toggle the typed seal variant.
    #[must_use]
    pub fn with_typed_seal(mut self, enabled: bool) -> Self {
        self.typed_seal = enabled;
        self
    }

    /// Encrypted types in rank order.
    #[must_use]
    pub fn encrypted_types(&self) -> &[EncryptedType] {
        &self.encrypted
    }

    /// Plaintext types in rank order.
    #[must_use]
    pub fn plaintext_types(&self) -> &[PlaintextType] {
        &self.plaintext
    }

    /// Whether `t` supports `operation`.
    #[must_use]
    pub fn allows(&self, t: EncryptedType, operation: &str) -> bool {
        self.allowed.get(&t).is_some_and(|f| f.allows(operation))
    }

    /// Dispatcher type tag.
    #[must_use]
    pub fn type_tag(&self, t: EncryptedType) -> u8 {
        match t {
            EncryptedType::Euint8 => 0,
            EncryptedType::Euint16 => 1,
            EncryptedType::Euint32 => 2,
            EncryptedType::Euint64 => 3,
            EncryptedType::Euint128 => 4,
            EncryptedType::Euint256 => 5,
            EncryptedType::Eaddress => 12,
            EncryptedType::Ebool => 13,
        }
    }

    /// Function-id table in ordinal order.
    #[must_use]
    pub fn function_ids(&self) -> &[String] {
        &self.function_ids
    }

    /// Ordinal of an operation in the function-id table.
    #[must_use]
    pub fn function_id(&self, operation: &str) -> Option<usize> {
        self.function_ids.iter().position(|id| id == operation)
    }

    /// Whether the text catalog must skip this operation.
    #[must_use]
    pub fn is_excluded(&self, operation: &str) -> bool {
        self.excluded.iter().any(|e| e.eq_ignore_ascii_case(operation))
    }

    /// Whether `operation` is the seal operation.
    #[must_use]
    pub fn is_seal(&self, operation: &str) -> bool {
        operation == SEAL_OPERATION
    }

    /// Whether the typed seal variant is generated.
    #[must_use]
    pub fn typed_seal(&self) -> bool {
        self.typed_seal
    }

    /// Operator table.
    #[must_use]
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// The `uint256`/`bool`/`address` overload a plaintext value reaches
    /// `as<Type>` through.
    #[must_use]
    pub fn canonical_cast_source(p: PlaintextType) -> PlaintextType {
        match p {
            PlaintextType::Bool => PlaintextType::Bool,
            PlaintextType::Address => PlaintextType::Address,
            _ => PlaintextType::Uint256,
        }
    }

    /// Whether an `as<to>(from)` conversion exists.
    ///
    /// Ciphertext bytes and `in<Type>` wrappers always convert (they already
    /// carry the target type). Identity conversions do not exist.
    #[must_use]
    pub fn can_cast(&self, from: ValueType, to: EncryptedType) -> bool {
        let source = match from {
            ValueType::Encrypted(s) if s == to => return false,
            ValueType::Fixed(FixedType::Bytes) => return true,
            ValueType::Fixed(FixedType::InputStruct(t)) => return t == to,
            ValueType::Fixed(_) => return false,
            ValueType::Plaintext(p) => ValueType::Plaintext(Self::canonical_cast_source(p)),
            encrypted @ ValueType::Encrypted(_) => encrypted,
        };
        if to == EncryptedType::Eaddress {
            return self.eaddress_cast_sources.contains(&source);
        }
        source != ValueType::Plaintext(PlaintextType::Address)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags_match_dispatcher() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.type_tag(EncryptedType::Euint8), 0);
        assert_eq!(catalog.type_tag(EncryptedType::Euint256), 5);
        assert_eq!(catalog.type_tag(EncryptedType::Eaddress), 12);
        assert_eq!(catalog.type_tag(EncryptedType::Ebool), 13);
    }

    #[test]
    fn test_type_tags_distinct_for_every_type() {
        let catalog = Catalog::standard();
        let tags: std::collections::BTreeSet<u8> = EncryptedType::ALL
            .iter()
            .map(|t| catalog.type_tag(*t))
            .collect();
        assert_eq!(tags.len(), EncryptedType::ALL.len());
        assert!(!tags.contains(&u8::MAX));
    }

    #[test]
    fn test_function_id_ordinals() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.function_id("cast"), Some(4));
        assert_eq!(catalog.function_id("add"), Some(10));
        assert_eq!(catalog.function_id("random"), Some(29));
        assert_eq!(catalog.function_id("teleport"), None);
    }

    #[test]
    fn test_allowed_operation_matrix() {
        let catalog = Catalog::standard();
        assert!(catalog.allows(EncryptedType::Euint64, "div"));
        assert!(!catalog.allows(EncryptedType::Euint128, "div"));
        assert!(catalog.allows(EncryptedType::Euint128, "mul"));
        assert!(!catalog.allows(EncryptedType::Euint256, "mul"));
        assert!(catalog.allows(EncryptedType::Eaddress, "eq"));
        assert!(!catalog.allows(EncryptedType::Eaddress, "add"));
    }

    #[test]
    fn test_eaddress_cast_allow_list() {
        let catalog = Catalog::standard();
        let to = EncryptedType::Eaddress;
        assert!(catalog.can_cast(EncryptedType::Euint256.into(), to));
        assert!(!catalog.can_cast(EncryptedType::Euint8.into(), to));
        assert!(!catalog.can_cast(EncryptedType::Ebool.into(), to));
        assert!(catalog.can_cast(PlaintextType::Address.into(), to));
        assert!(catalog.can_cast(PlaintextType::Uint8.into(), to));
        assert!(!catalog.can_cast(PlaintextType::Bool.into(), to));
    }

    #[test]
    fn test_numeric_casts() {
        let catalog = Catalog::standard();
        let to = EncryptedType::Euint16;
        assert!(catalog.can_cast(EncryptedType::Ebool.into(), to));
        assert!(catalog.can_cast(EncryptedType::Eaddress.into(), to));
        assert!(!catalog.can_cast(EncryptedType::Euint16.into(), to));
        assert!(catalog.can_cast(PlaintextType::Bool.into(), to));
        assert!(!catalog.can_cast(PlaintextType::Address.into(), to));
        assert!(catalog.can_cast(FixedType::Bytes.into(), to));
        assert!(!catalog.can_cast(FixedType::Bytes32.into(), to));
        assert!(!catalog.can_cast(FixedType::InputStruct(EncryptedType::Euint8).into(), to));
    }

    #[test]
    fn test_exclusions_are_case_insensitive() {
        let catalog = Catalog::standard();
        assert!(catalog.is_excluded("trivialEncrypt"));
        assert!(catalog.is_excluded("Verify"));
        assert!(!catalog.is_excluded("add"));
    }

    #[test]
    fn test_custom_filter() {
        let catalog = Catalog::standard()
            .with_filter(EncryptedType::Euint8, OperationFilter::only(&["add"]));
        assert!(catalog.allows(EncryptedType::Euint8, "add"));
        assert!(!catalog.allows(EncryptedType::Euint8, "sub"));
    }
}
