//! Conversion overloads (`as<Type>`) generated from the cast matrix.

use super::Expander;
use crate::domain::catalog::Catalog;
use crate::domain::naming::cast_function;
use crate::domain::signature::{ConcreteSignature, Family, ReturnType};
use crate::domain::types::{EncryptedType, FixedType, PlaintextType, ValueType};
use tracing::debug;

/// Operation name of every cast signature.
pub const CAST_OPERATION: &str = "cast";

impl Expander<'_> {
    /// Every `as<Type>` overload the catalog admits, grouped by target type.
    ///
    /// Sources per target: other encrypted types, `uint256` with and without
    /// a security zone, `bool`, `address`, verified ciphertext bytes and the
    /// `in<Type>` wrapper.
    #[must_use]
    pub fn expand_casts(&self) -> Vec<ConcreteSignature> {
        let catalog = self.catalog();
        let mut signatures = Vec::new();
        for target in catalog.encrypted_types() {
            let before = signatures.len();
            signatures.extend(
                cast_sources(catalog, *target)
                    .into_iter()
                    .map(|inputs| cast_signature(*target, inputs)),
            );
            debug!(
                target = target.name(),
                overloads = signatures.len() - before,
                "expanded casts"
            );
        }
        signatures
    }
}

fn cast_sources(catalog: &Catalog, target: EncryptedType) -> Vec<Vec<ValueType>> {
    let mut sources: Vec<Vec<ValueType>> = catalog
        .encrypted_types()
        .iter()
        .map(|s| ValueType::Encrypted(*s))
        .filter(|s| catalog.can_cast(*s, target))
        .map(|s| vec![s])
        .collect();

    let uint256 = ValueType::Plaintext(PlaintextType::Uint256);
    if catalog.can_cast(uint256, target) {
        sources.push(vec![uint256]);
        sources.push(vec![uint256, FixedType::Int32.into()]);
    }
    for p in [PlaintextType::Bool, PlaintextType::Address] {
        if catalog.can_cast(p.into(), target) {
            sources.push(vec![p.into()]);
        }
    }

    sources.push(vec![FixedType::Bytes.into(), FixedType::Int32.into()]);
    sources.push(vec![FixedType::InputStruct(target).into()]);
    sources
}

fn cast_signature(target: EncryptedType, inputs: Vec<ValueType>) -> ConcreteSignature {
    ConcreteSignature {
        family: Family::Cast,
        operation: CAST_OPERATION.to_string(),
        symbol: cast_function(target),
        inputs,
        returns: ReturnType::Value(target.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signature::duplicate_overloads;

    fn for_target(sigs: &[ConcreteSignature], target: EncryptedType) -> Vec<Vec<ValueType>> {
        sigs.iter()
            .filter(|s| s.returns == ReturnType::Value(target.into()))
            .map(|s| s.inputs.clone())
            .collect()
    }

    #[test]
    fn test_eaddress_casts_follow_allow_list() {
        let catalog = Catalog::standard();
        let sigs = Expander::new(&catalog).expand_casts();
        let sources = for_target(&sigs, EncryptedType::Eaddress);

        assert!(sources.contains(&vec![EncryptedType::Euint256.into()]));
        assert!(sources.contains(&vec![PlaintextType::Address.into()]));
        assert!(sources.contains(&vec![PlaintextType::Uint256.into()]));
        assert!(!sources.contains(&vec![EncryptedType::Euint8.into()]));
        assert!(!sources.contains(&vec![EncryptedType::Ebool.into()]));
        assert!(!sources.contains(&vec![PlaintextType::Bool.into()]));
    }

    #[test]
    fn test_numeric_target_sources() {
        let catalog = Catalog::standard();
        let sigs = Expander::new(&catalog).expand_casts();
        let sources = for_target(&sigs, EncryptedType::Euint8);

        // seven encrypted sources, uint256 twice, bool, bytes, inEuint8
        assert_eq!(sources.len(), 12);
        assert!(!sources.contains(&vec![EncryptedType::Euint8.into()]));
        assert!(!sources.contains(&vec![PlaintextType::Address.into()]));
        assert!(sources.contains(&vec![FixedType::InputStruct(EncryptedType::Euint8).into()]));
    }

    #[test]
    fn test_cast_symbols_and_family() {
        let catalog = Catalog::standard();
        let sigs = Expander::new(&catalog).expand_casts();
        assert!(sigs.iter().all(|s| s.family == Family::Cast));
        assert!(sigs
            .iter()
            .filter(|s| s.returns == ReturnType::Value(EncryptedType::Euint16.into()))
            .all(|s| s.symbol == "asEuint16"));
        assert!(duplicate_overloads(&sigs).is_empty());
    }
}
