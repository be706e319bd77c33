//! # Operation Metadata
//!
//! Normalized description of one operation discovered in the catalog.
//! Created once by the extractor and never mutated afterwards.

use super::types::ValueType;
use crate::errors::CatalogError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of inputs an operation may take.
pub const MAX_ARITY: usize = 3;

/// Declared kind of one input position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    /// Any encrypted type.
    Encrypted,
    /// Any plaintext type.
    Plaintext,
    /// Exactly this type.
    Fixed(ValueType),
}

impl InputKind {
    /// Parse an annotation value (`encrypted`, `plaintext` or a type name).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "encrypted" => Some(Self::Encrypted),
            "plaintext" => Some(Self::Plaintext),
            _ => ValueType::parse(value).map(Self::Fixed),
        }
    }

    /// `true` for the kinds that expand over a whole type family.
    #[must_use]
    pub fn is_operand(self) -> bool {
        matches!(self, Self::Encrypted | Self::Plaintext)
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encrypted => f.write_str("encrypted"),
            Self::Plaintext => f.write_str("plaintext"),
            Self::Fixed(t) => write!(f, "{t}"),
        }
    }
}

/// Declared return kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnKind {
    /// Promoted encrypted type.
    Encrypted,
    /// Plaintext counterpart of the sole encrypted input.
    Plaintext,
    /// No return value.
    None,
    /// Exactly this type.
    Explicit(ValueType),
}

impl ReturnKind {
    /// Parse an annotation value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "encrypted" => Some(Self::Encrypted),
            "plaintext" => Some(Self::Plaintext),
            "none" | "void" => Some(Self::None),
            _ => ValueType::parse(value).map(Self::Explicit),
        }
    }
}

/// One operation as described by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSpec {
    name: String,
    inputs: Vec<InputKind>,
    returns: ReturnKind,
    same_type_required: bool,
    boolean_op: bool,
}

impl OperationSpec {
    /// Create an operation returning the promoted encrypted type.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidArity`] for more than [`MAX_ARITY`]
    /// inputs.
    pub fn new(name: impl Into<String>, inputs: Vec<InputKind>) -> Result<Self, CatalogError> {
        let name = name.into();
        if inputs.len() > MAX_ARITY {
            return Err(CatalogError::InvalidArity {
                operation: name,
                arity: inputs.len(),
            });
        }
        Ok(Self {
            name,
            inputs,
            returns: ReturnKind::Encrypted,
            same_type_required: false,
            boolean_op: false,
        })
    }

    /// Set the declared return kind.
    #[must_use]
    pub fn returning(mut self, returns: ReturnKind) -> Self {
        self.returns = returns;
        self
    }

    /// Mark as a boolean-math operation (`ebool` operands allowed).
    #[must_use]
    pub fn boolean(mut self) -> Self {
        self.boolean_op = true;
        self
    }

    /// Require encrypted value operands to share one concrete type.
    #[must_use]
    pub fn same_type(mut self) -> Self {
        self.same_type_required = true;
        self
    }

    /// Operation name as used in Solidity and the function-id table.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of inputs.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.inputs.len()
    }

    /// Declared input kinds.
    #[must_use]
    pub fn inputs(&self) -> &[InputKind] {
        &self.inputs
    }

    /// Declared return kind.
    #[must_use]
    pub fn returns(&self) -> ReturnKind {
        self.returns
    }

    /// Whether value operands must share a type.
    #[must_use]
    pub fn same_type_required(&self) -> bool {
        self.same_type_required
    }

    /// Whether `ebool` operands are meaningful.
    #[must_use]
    pub fn is_boolean_op(&self) -> bool {
        self.boolean_op
    }

    /// `true` for two-input operations whose inputs are both operands.
    #[must_use]
    pub fn is_binary_operand_op(&self) -> bool {
        self.arity() == 2 && self.inputs.iter().all(|k| k.is_operand())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{EncryptedType, FixedType};

    #[test]
    fn test_defaults() {
        let op = OperationSpec::new("add", vec![InputKind::Encrypted; 2]).unwrap();
        assert_eq!(op.arity(), 2);
        assert_eq!(op.returns(), ReturnKind::Encrypted);
        assert!(!op.is_boolean_op());
        assert!(!op.same_type_required());
        assert!(op.is_binary_operand_op());
    }

    #[test]
    fn test_rejects_arity_above_three() {
        let result = OperationSpec::new("wide", vec![InputKind::Encrypted; 4]);
        assert!(matches!(
            result,
            Err(CatalogError::InvalidArity { arity: 4, .. })
        ));
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!(InputKind::parse("Plaintext"), Some(InputKind::Plaintext));
        assert_eq!(
            InputKind::parse("bytes32"),
            Some(InputKind::Fixed(ValueType::Fixed(FixedType::Bytes32)))
        );
        assert_eq!(ReturnKind::parse("none"), Some(ReturnKind::None));
        assert_eq!(
            ReturnKind::parse("ebool"),
            Some(ReturnKind::Explicit(ValueType::Encrypted(EncryptedType::Ebool)))
        );
        assert_eq!(ReturnKind::parse("nonsense"), None);
    }

    #[test]
    fn test_seal_shape_is_not_binary_operand() {
        let op = OperationSpec::new(
            "sealoutput",
            vec![
                InputKind::Encrypted,
                InputKind::Fixed(ValueType::Fixed(FixedType::Bytes32)),
            ],
        )
        .unwrap();
        assert!(!op.is_binary_operand_op());
    }
}
