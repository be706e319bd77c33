//! Fixed sections of the library file: type declarations, wrapper structs,
//! the `FunctionId` enum and the `Common`/`Impl` helper libraries.

use crate::config::GeneratorConfig;
use crate::domain::catalog::Catalog;
use crate::domain::naming::{capitalize, type_tag_ident};
use crate::domain::types::{FixedType, PlaintextType, SealedKind};
use std::fmt::Write as _;

/// SPDX line, pragma and the generated-file marker.
#[must_use]
pub fn file_header(config: &GeneratorConfig) -> String {
    format!(
        "// SPDX-License-Identifier: {}\n// Generated by fhegen. Do not edit.\npragma solidity {};\n",
        config.license, config.pragma
    )
}

/// Library imports.
#[must_use]
pub fn library_imports(config: &GeneratorConfig) -> String {
    format!(
        "\nimport {{Precompiles, FheOps}} from \"{}\";\n",
        config.precompile_import
    )
}

/// `type euint8 is uint256;` for every encrypted type.
#[must_use]
pub fn type_declarations(catalog: &Catalog) -> String {
    let mut out = String::from("\n");
    for t in catalog.encrypted_types() {
        let _ = writeln!(out, "type {t} is uint256;");
    }
    out
}

/// `in<Type>` input ciphertext wrappers.
#[must_use]
pub fn input_structs(catalog: &Catalog) -> String {
    let mut out = String::new();
    for t in catalog.encrypted_types() {
        let _ = write!(
            out,
            "\nstruct {} {{\n    bytes data;\n    int32 securityZone;\n}}\n",
            FixedType::InputStruct(*t).name()
        );
    }
    out
}

/// Typed seal result structs.
#[must_use]
pub fn sealed_structs() -> String {
    let mut out = String::new();
    for kind in SealedKind::ALL {
        let _ = write!(
            out,
            "\nstruct {} {{\n    bytes data;\n    uint8 utype;\n}}\n",
            kind.struct_name()
        );
    }
    out
}

/// `enum FunctionId` in dispatcher order.
#[must_use]
pub fn function_id_enum(catalog: &Catalog) -> String {
    let ids = catalog.function_ids();
    let mut out = String::from("\nenum FunctionId {\n");
    for (i, id) in ids.iter().enumerate() {
        let sep = if i + 1 == ids.len() { "" } else { "," };
        let _ = writeln!(out, "    {id}{sep} // {i}");
    }
    out.push_str("}\n");
    out
}

/// `library Common`: type tags and conversions of raw results.
#[must_use]
pub fn common_library(catalog: &Catalog) -> String {
    let mut out = String::from("\nlibrary Common {\n    // Values used to communicate types to the runtime.\n");
    for t in catalog.encrypted_types() {
        let _ = writeln!(
            out,
            "    uint8 internal constant {} = {};",
            type_tag_ident(*t),
            catalog.type_tag(*t)
        );
    }

    for p in catalog.plaintext_types() {
        let expr = match p {
            PlaintextType::Bool => "i != 0".to_string(),
            PlaintextType::Address => "address(uint160(i))".to_string(),
            PlaintextType::Uint256 => "i".to_string(),
            other => format!("{other}(i)"),
        };
        let _ = write!(
            out,
            "\n    function bigIntTo{}(uint256 i) internal pure returns ({p}) {{\n        return {expr};\n    }}\n",
            capitalize(p.name())
        );
    }

    out.push_str(
        r"
    function toBytes(uint256 x) internal pure returns (bytes memory b) {
        b = new bytes(32);
        assembly {
            mstore(add(b, 32), x)
        }
    }

    function toUint256(bytes memory b) internal pure returns (uint256) {
        return abi.decode(b, (uint256));
    }
}
",
    );
    out
}

/// `library Impl`: thin wrappers over the precompile dispatcher.
#[must_use]
pub fn impl_library() -> String {
    r"
library Impl {
    function unaryOp(FunctionId op, uint8 utype, uint256 value) internal pure returns (uint256) {
        bytes memory output = FheOps(Precompiles.Fheos).unaryOp(uint8(op), utype, Common.toBytes(value));
        return Common.toUint256(output);
    }

    function mathOp(FunctionId op, uint8 utype, uint256 lhs, uint256 rhs) internal pure returns (uint256) {
        bytes memory output = FheOps(Precompiles.Fheos).mathOp(uint8(op), utype, Common.toBytes(lhs), Common.toBytes(rhs));
        return Common.toUint256(output);
    }

    function ternaryOp(FunctionId op, uint8 utype, uint256 control, uint256 ifTrue, uint256 ifFalse) internal pure returns (uint256) {
        bytes memory output = FheOps(Precompiles.Fheos).ternaryOp(
            uint8(op),
            utype,
            Common.toBytes(control),
            Common.toBytes(ifTrue),
            Common.toBytes(ifFalse)
        );
        return Common.toUint256(output);
    }

    function sealOp(FunctionId op, uint8 utype, uint256 value, bytes32 publicKey) internal pure returns (bytes memory) {
        return FheOps(Precompiles.Fheos).sealOp(uint8(op), utype, Common.toBytes(value), bytes.concat(publicKey));
    }

    function sealOpBytes(FunctionId op, uint8 utype, uint256 value, bytes memory publicKey) internal pure returns (bytes memory) {
        return FheOps(Precompiles.Fheos).sealOp(uint8(op), utype, Common.toBytes(value), publicKey);
    }

    function cast(FunctionId op, uint8 utype, uint256 value, uint8 toType) internal pure returns (uint256) {
        bytes memory output = FheOps(Precompiles.Fheos).cast(uint8(op), utype, Common.toBytes(value), toType);
        return Common.toUint256(output);
    }

    function trivialEncrypt(FunctionId op, uint256 value, uint8 toType, int32 securityZone) internal pure returns (uint256) {
        bytes memory output = FheOps(Precompiles.Fheos).trivialEncrypt(uint8(op), Common.toBytes(value), toType, securityZone);
        return Common.toUint256(output);
    }

    function verify(FunctionId op, bytes memory input, uint8 toType, int32 securityZone) internal pure returns (uint256) {
        bytes memory output = FheOps(Precompiles.Fheos).verify(uint8(op), toType, input, securityZone);
        return Common.toUint256(output);
    }

    function random(FunctionId op, uint8 utype, uint64 seed, int32 securityZone) internal view returns (uint256) {
        bytes memory output = FheOps(Precompiles.Fheos).random(uint8(op), utype, seed, securityZone);
        return Common.toUint256(output);
    }
}
"
    .to_string()
}

/// `isInitialized` helpers, one per encrypted type, as `library FHE` members.
#[must_use]
pub fn is_initialized_helpers(catalog: &Catalog) -> String {
    let mut out = String::new();
    for t in catalog.encrypted_types() {
        let _ = write!(
            out,
            "    function isInitialized({t} v) internal pure returns (bool) {{\n        return {t}.unwrap(v) != 0;\n    }}\n\n"
        );
    }
    out
}
