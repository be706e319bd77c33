//! Naming conventions shared by every generated artifact.

use super::types::EncryptedType;

/// Upper-case the first character (`euint8` → `Euint8`).
#[must_use]
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-case the first character (`SealOutput` → `sealOutput`).
#[must_use]
pub fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Short form used by binding conversions (`euint16` → `U16`).
#[must_use]
pub fn shorten(t: EncryptedType) -> String {
    match t {
        EncryptedType::Ebool => "Bool".to_string(),
        EncryptedType::Eaddress => "Address".to_string(),
        other => format!("U{}", other.bits()),
    }
}

/// Cast function name (`asEuint8`).
#[must_use]
pub fn cast_function(t: EncryptedType) -> String {
    format!("as{}", capitalize(t.name()))
}

/// Binding library name (`BindingsEuint8`).
#[must_use]
pub fn binding_library(t: EncryptedType) -> String {
    format!("Bindings{}", capitalize(t.name()))
}

/// Free operator function name (`operatorAddEuint8`).
#[must_use]
pub fn operator_function(operation: &str, t: EncryptedType) -> String {
    format!("operator{}{}", capitalize(operation), capitalize(t.name()))
}

/// `Common` constant holding the type tag (`Common.EUINT8_TFHE`).
#[must_use]
pub fn type_tag_constant(t: EncryptedType) -> String {
    format!("Common.{}", type_tag_ident(t))
}

/// Bare identifier of the type tag constant (`EUINT8_TFHE`).
#[must_use]
pub fn type_tag_ident(t: EncryptedType) -> String {
    format!("{}_TFHE", t.name().to_uppercase())
}

/// Test contract name for an operation (`AddTest`).
#[must_use]
pub fn test_contract(operation: &str) -> String {
    format!("{}Test", capitalize(operation))
}

/// Benchmark contract name for an operation (`AddBench`).
#[must_use]
pub fn bench_contract(operation: &str) -> String {
    format!("{}Bench", capitalize(operation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_roundtrip() {
        assert_eq!(capitalize("euint8"), "Euint8");
        assert_eq!(decapitalize("SealOutput"), "sealOutput");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_generated_names() {
        assert_eq!(cast_function(EncryptedType::Eaddress), "asEaddress");
        assert_eq!(shorten(EncryptedType::Euint128), "U128");
        assert_eq!(shorten(EncryptedType::Ebool), "Bool");
        assert_eq!(operator_function("add", EncryptedType::Euint8), "operatorAddEuint8");
        assert_eq!(type_tag_constant(EncryptedType::Euint32), "Common.EUINT32_TFHE");
        assert_eq!(test_contract("lte"), "LteTest");
    }
}
