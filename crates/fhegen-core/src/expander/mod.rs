//! # Combination Expander
//!
//! Turns one [`OperationSpec`] into every [`ConcreteSignature`] the catalog
//! rules admit.
//!
//! ## Algorithm
//!
//! 1. Build the candidate type list of each input position.
//! 2. Take the Cartesian product of the lists.
//! 3. Drop tuples the rules exclude (see [`SkipReason`]).
//! 4. Resolve the return type of each surviving tuple.
//!
//! Skips are silent. Annotation mismatches (plaintext return on a
//! non-unary operation) abort the run with an [`ExpansionError`].

pub mod casts;

use crate::domain::catalog::{Catalog, SEAL_TYPED_SYMBOL};
use crate::domain::naming::capitalize;
use crate::domain::operation::{InputKind, OperationSpec, ReturnKind};
use crate::domain::signature::{ConcreteSignature, ReturnType};
use crate::domain::types::{EncryptedType, FixedType, ValueType};
use crate::errors::ExpansionError;
use std::fmt;
use tracing::{debug, trace};

/// Why a candidate tuple produced no signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Two different encrypted operands on a two-input operation.
    CrossType,
    /// Same-type operation with differing encrypted operands.
    MixedOperands,
    /// The promoted working type does not support the operation.
    UnsupportedByType(EncryptedType),
    /// An operand would need a conversion the cast matrix forbids.
    DisallowedCast {
        /// Operand type.
        from: ValueType,
        /// Working type it would be cast to.
        to: EncryptedType,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrossType => f.write_str("cross-type operands"),
            Self::MixedOperands => f.write_str("operands must share a type"),
            Self::UnsupportedByType(t) => write!(f, "{t} does not support the operation"),
            Self::DisallowedCast { from, to } => write!(f, "no cast from {from} to {to}"),
        }
    }
}

/// Cartesian product of per-position candidate lists.
///
/// Zero positions yield one empty tuple; an empty list at any position yields
/// no tuples.
#[must_use]
pub fn cartesian_product<T: Clone>(lists: &[Vec<T>]) -> Vec<Vec<T>> {
    match lists.split_first() {
        None => vec![Vec::new()],
        Some((head, tail)) => {
            let rest = cartesian_product(tail);
            head.iter()
                .flat_map(|h| {
                    rest.iter().map(move |r| {
                        let mut tuple = Vec::with_capacity(r.len() + 1);
                        tuple.push(h.clone());
                        tuple.extend(r.iter().cloned());
                        tuple
                    })
                })
                .collect()
        }
    }
}

/// Encrypted type with the highest rank among the ranked inputs.
#[must_use]
pub fn promoted_type(inputs: &[ValueType]) -> Option<EncryptedType> {
    inputs
        .iter()
        .filter_map(|t| t.rank())
        .max()
        .and_then(EncryptedType::from_rank)
}

/// Resolve the return type of one candidate tuple.
///
/// # Errors
///
/// Fails when a plaintext return is declared on anything but a single
/// encrypted input, or when an encrypted return has nothing to promote from.
pub fn resolve_return(
    op: &OperationSpec,
    inputs: &[ValueType],
) -> Result<ReturnType, ExpansionError> {
    match op.returns() {
        ReturnKind::Plaintext => match inputs {
            [ValueType::Encrypted(t)] => Ok(ReturnType::Value(t.plaintext().into())),
            [other] => Err(ExpansionError::PlaintextReturnInput {
                operation: op.name().to_string(),
                input: other.name(),
            }),
            _ => Err(ExpansionError::PlaintextReturnArity {
                operation: op.name().to_string(),
                arity: inputs.len(),
            }),
        },
        ReturnKind::Explicit(t) => Ok(ReturnType::Value(t)),
        ReturnKind::None => Ok(ReturnType::Nothing),
        ReturnKind::Encrypted => {
            if inputs.iter().any(|t| t.is_byte_string()) {
                return Ok(ReturnType::Value(FixedType::Bytes.into()));
            }
            promoted_type(inputs)
                .map(|t| ReturnType::Value(t.into()))
                .ok_or_else(|| ExpansionError::UnresolvableReturn {
                    operation: op.name().to_string(),
                })
        }
    }
}

/// Expands operations against an immutable [`Catalog`].
#[derive(Debug, Clone, Copy)]
pub struct Expander<'a> {
    catalog: &'a Catalog,
}

impl<'a> Expander<'a> {
    /// Create an expander over `catalog`.
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// The catalog in use.
    #[must_use]
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Expand every operation in catalog order.
    ///
    /// # Errors
    ///
    /// Propagates the first [`ExpansionError`].
    pub fn expand_all(
        &self,
        ops: &[OperationSpec],
    ) -> Result<Vec<ConcreteSignature>, ExpansionError> {
        let mut all = Vec::new();
        for op in ops {
            all.extend(self.expand(op)?);
        }
        Ok(all)
    }

    /// Expand one operation.
    ///
    /// # Errors
    ///
    /// Returns an [`ExpansionError`] for plaintext-return mismatches.
    pub fn expand(&self, op: &OperationSpec) -> Result<Vec<ConcreteSignature>, ExpansionError> {
        Self::check_plaintext_return(op)?;

        if Self::is_generator(op) {
            let sigs = self.expand_generator(op);
            debug!(operation = op.name(), signatures = sigs.len(), "expanded generator");
            return Ok(sigs);
        }

        let candidates: Vec<Vec<ValueType>> = op
            .inputs()
            .iter()
            .map(|kind| self.candidates(op, *kind))
            .collect();

        let mut signatures = Vec::new();
        let mut skipped = 0usize;
        for tuple in cartesian_product(&candidates) {
            if let Some(reason) = self.skip_reason(op, &tuple) {
                trace!(operation = op.name(), inputs = ?tuple, %reason, "skipped combination");
                skipped += 1;
                continue;
            }
            let returns = resolve_return(op, &tuple)?;
            let typed_seal = self.typed_seal_variant(op, &tuple);
            signatures.push(ConcreteSignature::operation(op.name(), tuple, returns));
            signatures.extend(typed_seal);
        }

        debug!(
            operation = op.name(),
            signatures = signatures.len(),
            skipped,
            "expanded operation"
        );
        Ok(signatures)
    }

    /// Candidate types for one input position.
    #[must_use]
    pub fn candidates(&self, op: &OperationSpec, kind: InputKind) -> Vec<ValueType> {
        let exclude_comparison = op.is_binary_operand_op() && !op.is_boolean_op();
        match kind {
            InputKind::Encrypted => self
                .catalog
                .encrypted_types()
                .iter()
                .filter(|t| self.catalog.allows(**t, op.name()))
                .filter(|t| !(exclude_comparison && t.is_comparison_result()))
                .map(|t| ValueType::Encrypted(*t))
                .collect(),
            InputKind::Plaintext => self
                .catalog
                .plaintext_types()
                .iter()
                .filter(|p| !(exclude_comparison && p.encrypted().is_comparison_result()))
                .map(|p| ValueType::Plaintext(*p))
                .collect(),
            InputKind::Fixed(t) => vec![t],
        }
    }

    /// The rule that drops `tuple`, if any.
    #[must_use]
    pub fn skip_reason(&self, op: &OperationSpec, tuple: &[ValueType]) -> Option<SkipReason> {
        if let [ValueType::Encrypted(a), ValueType::Encrypted(b)] = tuple {
            if a != b {
                return Some(SkipReason::CrossType);
            }
        }

        if op.same_type_required() {
            let mut operands = op
                .inputs()
                .iter()
                .zip(tuple)
                .filter(|(kind, _)| **kind == InputKind::Encrypted)
                .map(|(_, t)| *t);
            if let Some(first) = operands.next() {
                if operands.any(|t| t != first) {
                    return Some(SkipReason::MixedOperands);
                }
            }
        }

        if op.is_binary_operand_op() {
            let working = promoted_type(tuple)?;
            if !self.catalog.allows(working, op.name()) {
                return Some(SkipReason::UnsupportedByType(working));
            }
            for operand in tuple {
                if *operand != ValueType::Encrypted(working)
                    && !self.catalog.can_cast(*operand, working)
                {
                    return Some(SkipReason::DisallowedCast {
                        from: *operand,
                        to: working,
                    });
                }
            }
        }

        None
    }

    fn check_plaintext_return(op: &OperationSpec) -> Result<(), ExpansionError> {
        if op.returns() != ReturnKind::Plaintext {
            return Ok(());
        }
        match op.inputs() {
            [InputKind::Encrypted | InputKind::Fixed(ValueType::Encrypted(_))] => Ok(()),
            [other] => Err(ExpansionError::PlaintextReturnInput {
                operation: op.name().to_string(),
                input: other.to_string(),
            }),
            inputs => Err(ExpansionError::PlaintextReturnArity {
                operation: op.name().to_string(),
                arity: inputs.len(),
            }),
        }
    }

    /// Operations with no ranked input that still return an encrypted value
    /// (random) expand over the return type instead.
    fn is_generator(op: &OperationSpec) -> bool {
        op.returns() == ReturnKind::Encrypted
            && op.inputs().iter().all(|kind| match kind {
                InputKind::Fixed(t) => t.rank().is_none() && !t.is_byte_string(),
                InputKind::Encrypted | InputKind::Plaintext => false,
            })
    }

    fn expand_generator(&self, op: &OperationSpec) -> Vec<ConcreteSignature> {
        let inputs: Vec<ValueType> = op
            .inputs()
            .iter()
            .filter_map(|kind| match kind {
                InputKind::Fixed(t) => Some(*t),
                _ => None,
            })
            .collect();

        // Trailing zone and then seed are optional.
        let mut variants = vec![inputs.clone()];
        let mut rest = inputs;
        for optional in [FixedType::Int32, FixedType::Uint64] {
            if rest.last() == Some(&ValueType::Fixed(optional)) {
                rest.pop();
                variants.push(rest.clone());
            }
        }

        let mut signatures = Vec::new();
        for t in self.catalog.encrypted_types() {
            if !self.catalog.allows(*t, op.name()) {
                continue;
            }
            let symbol = format!("{}{}", op.name(), capitalize(t.name()));
            for variant in &variants {
                signatures.push(
                    ConcreteSignature::operation(
                        op.name(),
                        variant.clone(),
                        ReturnType::Value((*t).into()),
                    )
                    .with_symbol(symbol.clone()),
                );
            }
        }
        signatures
    }

    fn typed_seal_variant(
        &self,
        op: &OperationSpec,
        tuple: &[ValueType],
    ) -> Option<ConcreteSignature> {
        if !self.catalog.is_seal(op.name()) || !self.catalog.typed_seal() {
            return None;
        }
        let t = tuple.first()?.as_encrypted()?;
        Some(
            ConcreteSignature::operation(
                op.name(),
                tuple.to_vec(),
                ReturnType::Value(FixedType::Sealed(t.sealed_kind()).into()),
            )
            .with_symbol(SEAL_TYPED_SYMBOL),
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
