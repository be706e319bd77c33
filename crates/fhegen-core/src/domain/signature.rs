//! # Concrete Signatures
//!
//! A fully resolved overload produced by the expander. Two signatures are the
//! same Solidity overload when their symbol and rendered input types match.

use super::types::ValueType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Where a signature came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    /// Expanded from a catalog operation.
    Operation,
    /// Expanded from the catalog's cast matrix.
    Cast,
}

/// Resolved return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnType {
    /// Returns a value of this type.
    Value(ValueType),
    /// Side effect only.
    Nothing,
}

impl ReturnType {
    /// The returned value type, if any.
    #[must_use]
    pub fn value(self) -> Option<ValueType> {
        match self {
            Self::Value(t) => Some(t),
            Self::Nothing => None,
        }
    }
}

/// A fully resolved (operation, input types, return type) tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConcreteSignature {
    /// Origin of the signature.
    pub family: Family,
    /// Catalog operation name (function-id key).
    pub operation: String,
    /// Solidity function name.
    pub symbol: String,
    /// Concrete input types in position order.
    pub inputs: Vec<ValueType>,
    /// Resolved return type.
    pub returns: ReturnType,
}

impl ConcreteSignature {
    /// Create a catalog-operation signature whose symbol is the operation name.
    #[must_use]
    pub fn operation(name: &str, inputs: Vec<ValueType>, returns: ReturnType) -> Self {
        Self {
            family: Family::Operation,
            operation: name.to_string(),
            symbol: name.to_string(),
            inputs,
            returns,
        }
    }

    /// Override the Solidity symbol.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    /// Number of inputs.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.inputs.len()
    }

    /// Overload identity: symbol plus rendered input type names.
    #[must_use]
    pub fn overload_key(&self) -> (String, Vec<String>) {
        (
            self.symbol.clone(),
            self.inputs.iter().map(|t| t.name()).collect(),
        )
    }

    /// Test selector string (`add(euint8,euint8)`).
    #[must_use]
    pub fn selector(&self) -> String {
        let inputs: Vec<String> = self.inputs.iter().map(|t| t.name()).collect();
        format!("{}({})", self.symbol, inputs.join(","))
    }
}

impl fmt::Display for ConcreteSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.selector())?;
        match self.returns {
            ReturnType::Value(t) => write!(f, " -> {t}"),
            ReturnType::Nothing => Ok(()),
        }
    }
}

/// Overload keys that occur more than once, in first-seen order.
#[must_use]
pub fn duplicate_overloads<'a, I>(signatures: I) -> Vec<(String, Vec<String>)>
where
    I: IntoIterator<Item = &'a ConcreteSignature>,
{
    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();
    let mut duplicates = Vec::new();
    for sig in signatures {
        let key = sig.overload_key();
        if !seen.insert(key.clone()) && reported.insert(key.clone()) {
            duplicates.push(key);
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{EncryptedType, FixedType, PlaintextType};

    fn add(lhs: ValueType, rhs: ValueType) -> ConcreteSignature {
        ConcreteSignature::operation(
            "add",
            vec![lhs, rhs],
            ReturnType::Value(ValueType::Encrypted(EncryptedType::Euint8)),
        )
    }

    #[test]
    fn test_selector() {
        let sig = add(EncryptedType::Euint8.into(), PlaintextType::Uint8.into());
        assert_eq!(sig.selector(), "add(euint8,uint8)");
        assert_eq!(sig.to_string(), "add(euint8,uint8) -> euint8");
    }

    #[test]
    fn test_duplicates_detected_once() {
        let a = add(EncryptedType::Euint8.into(), EncryptedType::Euint8.into());
        let b = add(EncryptedType::Euint16.into(), EncryptedType::Euint16.into());
        let sigs = vec![a.clone(), b, a.clone(), a];
        let dups = duplicate_overloads(&sigs);
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].0, "add");
    }

    #[test]
    fn test_fixed_and_plaintext_uint64_collide() {
        let seed = ConcreteSignature::operation(
            "random",
            vec![ValueType::Fixed(FixedType::Uint64)],
            ReturnType::Nothing,
        );
        let plain = ConcreteSignature::operation(
            "random",
            vec![ValueType::Plaintext(PlaintextType::Uint64)],
            ReturnType::Nothing,
        );
        assert_eq!(duplicate_overloads([&seed, &plain]).len(), 1);
    }
}
