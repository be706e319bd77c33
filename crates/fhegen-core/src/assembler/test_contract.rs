//! Per-operation test contracts.
//!
//! Each contract exposes one public function named after the operation. The
//! first argument selects the overload under test by its selector string:
//!
//! | Form | Selector |
//! |------|----------|
//! | direct call | `add(euint8,euint8)` |
//! | binding call | `euint8.add(euint8)` |
//! | operator | `euint8 + euint8` |
//!
//! Unknown selectors revert with `TestNotFound(test)`.

use super::library::{binds_to, is_closed_binary};
use super::{preamble, RenderedOperation};
use crate::config::GeneratorConfig;
use crate::domain::catalog::Catalog;
use crate::domain::naming::{cast_function, test_contract};
use crate::domain::operation::{InputKind, OperationSpec};
use crate::domain::signature::ReturnType;
use crate::domain::types::{FixedType, PlaintextType, ValueType};
use crate::template::{BodyShape, GeneratedFunction};
use std::fmt::Write as _;

/// One parameter of the public test function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestParam {
    /// Solidity type with data location.
    pub solidity: String,
    /// Parameter name.
    pub name: String,
}

impl TestParam {
    fn new(solidity: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            solidity: solidity.into(),
            name: name.into(),
        }
    }

    /// Solidity type without data location.
    #[must_use]
    pub fn base_type(&self) -> &str {
        self.solidity
            .split_whitespace()
            .next()
            .unwrap_or(&self.solidity)
    }
}

/// Parameters of the public test function, after the selector string.
#[must_use]
pub fn test_params(spec: &OperationSpec) -> Vec<TestParam> {
    const OPERANDS: [&str; 3] = ["a", "b", "c"];
    spec.inputs()
        .iter()
        .enumerate()
        .map(|(i, kind)| match kind {
            InputKind::Fixed(ValueType::Fixed(fixed)) => match fixed {
                FixedType::Bytes32 => TestParam::new("bytes32", "pubkey"),
                FixedType::Bytes => TestParam::new("bytes calldata", "data"),
                FixedType::Uint64 => TestParam::new("uint64", "seed"),
                FixedType::Int32 => TestParam::new("int32", "securityZone"),
                other => TestParam::new(format!("{} calldata", other.name()), format!("input{}", i + 1)),
            },
            _ => TestParam::new("uint256", OPERANDS[i.min(OPERANDS.len() - 1)]),
        })
        .collect()
}

/// Whether the test function hands back bytes rather than a number.
#[must_use]
pub fn returns_bytes(op: &RenderedOperation) -> bool {
    op.functions.iter().any(|f| {
        matches!(
            f.signature.returns,
            ReturnType::Value(ValueType::Fixed(FixedType::Bytes | FixedType::Sealed(_)))
        )
    })
}

/// Full test contract source.
#[must_use]
pub fn render(catalog: &Catalog, config: &GeneratorConfig, op: &RenderedOperation) -> String {
    let params = test_params(&op.spec);
    let contract = test_contract(op.spec.name());

    let mut out = preamble::file_header(config);
    let _ = write!(
        out,
        "\nimport \"../{}\";\nimport {{Utils}} from \"./utils/Utils.sol\";\n\nerror TestNotFound(string test);\n\ncontract {contract} {{\n",
        config.library_file
    );

    let mut signature = vec!["string calldata test".to_string()];
    signature.extend(params.iter().map(|p| format!("{} {}", p.solidity, p.name)));
    let mutability = if op.functions.iter().all(|f| f.shape.is_pure()) {
        " pure"
    } else {
        ""
    };
    let output = if returns_bytes(op) {
        "bytes memory output"
    } else {
        "uint256 output"
    };
    let _ = writeln!(
        out,
        "    function {}({}) public{mutability} returns ({output}) {{",
        op.spec.name(),
        signature.join(", ")
    );

    let branches = branches(catalog, op, &params);
    for (i, (selector, body)) in branches.iter().enumerate() {
        let keyword = if i == 0 { "        if" } else { " else if" };
        let _ = write!(out, "{keyword} (Utils.cmp(test, \"{selector}\")) {{\n{body}        }}");
    }
    if !branches.is_empty() {
        out.push('\n');
    }
    out.push_str("        revert TestNotFound(test);\n    }\n}\n");
    out
}

/// Selector and body of every dispatch branch, in overload order.
fn branches(
    catalog: &Catalog,
    op: &RenderedOperation,
    params: &[TestParam],
) -> Vec<(String, String)> {
    let operator = catalog
        .operators()
        .iter()
        .find(|o| o.operation == op.spec.name());

    let mut out = Vec::new();
    for function in &op.functions {
        let sig = &function.signature;
        let args = arguments(function, params);

        out.push((
            sig.selector(),
            result_body(sig.returns, &format!("FHE.{}({})", sig.symbol, args.join(", "))),
        ));

        let Some(first) = sig.inputs.first().and_then(|t| t.as_encrypted()) else {
            continue;
        };
        let method = matches!(
            function.shape,
            BodyShape::Unary { .. } | BodyShape::Binary { .. } | BodyShape::Ternary { .. }
        );
        if method && binds_to(function, first) {
            let rest: Vec<String> = sig.inputs[1..].iter().map(|t| t.name()).collect();
            out.push((
                format!("{first}.{}({})", sig.symbol, rest.join(",")),
                result_body(
                    sig.returns,
                    &format!("{}.{}({})", args[0], sig.symbol, args[1..].join(", ")),
                ),
            ));
        }

        if let Some(operator) = operator {
            if !first.is_comparison_result() && is_closed_binary(function, first) {
                out.push((
                    format!("{first} {} {first}", operator.symbol),
                    result_body(
                        sig.returns,
                        &format!("{} {} {}", args[0], operator.symbol, args[1]),
                    ),
                ));
            }
        }
    }
    out
}

/// Call arguments built from the raw test parameters.
fn arguments(function: &GeneratedFunction, params: &[TestParam]) -> Vec<String> {
    function
        .signature
        .inputs
        .iter()
        .zip(params)
        .map(|(t, param)| match t {
            ValueType::Encrypted(e) => format!("FHE.{}({})", cast_function(*e), param.name),
            ValueType::Plaintext(p) => p.from_uint256_expr(&param.name),
            ValueType::Fixed(_) => param.name.clone(),
        })
        .collect()
}

/// Statements returning `call`'s result as the test function output.
fn result_body(returns: ReturnType, call: &str) -> String {
    const INDENT: &str = "            ";
    match returns {
        ReturnType::Value(ValueType::Encrypted(t)) => {
            plaintext_result(t.plaintext(), &format!("FHE.decrypt({call})"))
        }
        ReturnType::Value(ValueType::Plaintext(p)) => plaintext_result(p, call),
        ReturnType::Value(ValueType::Fixed(FixedType::Bytes)) => format!("{INDENT}return {call};\n"),
        ReturnType::Value(ValueType::Fixed(FixedType::Sealed(_))) => {
            format!("{INDENT}return {call}.data;\n")
        }
        ReturnType::Value(ValueType::Fixed(_)) | ReturnType::Nothing => {
            format!("{INDENT}{call};\n{INDENT}return 0;\n")
        }
    }
}

fn plaintext_result(p: PlaintextType, expr: &str) -> String {
    const INDENT: &str = "            ";
    match p {
        PlaintextType::Bool => format!(
            "{INDENT}if ({expr}) {{\n{INDENT}    return 1;\n{INDENT}}}\n{INDENT}return 0;\n"
        ),
        PlaintextType::Address => format!("{INDENT}return uint256(uint160({expr}));\n"),
        PlaintextType::Uint256 => format!("{INDENT}return {expr};\n"),
        _ => format!("{INDENT}return uint256({expr});\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::tests::{add_spec, surface};
    use crate::domain::operation::ReturnKind;
    use crate::domain::types::EncryptedType;

    fn contract(spec: OperationSpec) -> String {
        let s = surface(vec![spec]);
        render(&Catalog::standard(), &GeneratorConfig::default(), &s.operations[0])
    }

    #[test]
    fn test_add_branches() {
        let text = contract(add_spec());
        assert!(text.contains("contract AddTest {"));
        assert!(text.contains(
            "function add(string calldata test, uint256 a, uint256 b) public pure returns (uint256 output) {"
        ));
        assert!(text.contains(
            "        if (Utils.cmp(test, \"add(euint8,euint8)\")) {\n            return uint256(FHE.decrypt(FHE.add(FHE.asEuint8(a), FHE.asEuint8(b))));\n        }"
        ));
        assert!(text.contains("Utils.cmp(test, \"euint16.add(euint16)\")"));
        assert!(text.contains("return uint256(FHE.decrypt(FHE.asEuint16(a).add(FHE.asEuint16(b))));"));
        assert!(text.contains("Utils.cmp(test, \"euint32 + euint32\")"));
        assert!(text.contains("return uint256(FHE.decrypt(FHE.asEuint32(a) + FHE.asEuint32(b)));"));
        assert!(text.ends_with("        revert TestNotFound(test);\n    }\n}\n"));
    }

    #[test]
    fn test_comparison_result_maps_to_one_or_zero() {
        let lt = OperationSpec::new("lt", vec![InputKind::Encrypted, InputKind::Encrypted])
            .unwrap()
            .returning(ReturnKind::Explicit(EncryptedType::Ebool.into()));
        let text = contract(lt);
        assert!(text.contains(
            "            if (FHE.decrypt(FHE.lt(FHE.asEuint8(a), FHE.asEuint8(b)))) {\n                return 1;\n            }\n            return 0;\n"
        ));
    }

    #[test]
    fn test_seal_returns_bytes() {
        let seal = OperationSpec::new(
            "sealoutput",
            vec![InputKind::Encrypted, InputKind::Fixed(FixedType::Bytes32.into())],
        )
        .unwrap()
        .returning(ReturnKind::Explicit(FixedType::Bytes.into()));
        let text = contract(seal);
        assert!(text.contains(
            "function sealoutput(string calldata test, uint256 a, bytes32 pubkey) public pure returns (bytes memory output) {"
        ));
        for t in EncryptedType::ALL {
            assert!(text.contains(&format!("Utils.cmp(test, \"sealoutput({t},bytes32)\")")));
        }
        assert!(text.contains("return FHE.sealoutputTyped(FHE.asEaddress(a), pubkey).data;"));
        assert!(!text.contains(".sealoutput(bytes32)"));
    }

    #[test]
    fn test_eaddress_decrypt_converts_address() {
        let decrypt = OperationSpec::new("decrypt", vec![InputKind::Encrypted])
            .unwrap()
            .returning(ReturnKind::Plaintext);
        let text = contract(decrypt);
        assert!(text.contains("return uint256(uint160(FHE.decrypt(FHE.asEaddress(a))));"));
        assert!(text.contains("Utils.cmp(test, \"ebool.decrypt()\")"));
    }

    #[test]
    fn test_params_for_fixed_inputs() {
        let random = OperationSpec::new(
            "random",
            vec![
                InputKind::Fixed(FixedType::Uint64.into()),
                InputKind::Fixed(FixedType::Int32.into()),
            ],
        )
        .unwrap();
        let params = test_params(&random);
        assert_eq!(params[0], TestParam::new("uint64", "seed"));
        assert_eq!(params[1].base_type(), "int32");

        let text = contract(random);
        assert!(text.contains("public returns (uint256 output)"));
        assert!(text.contains("Utils.cmp(test, \"randomEuint8(uint64)\")"));
        assert!(text.contains("return uint256(FHE.decrypt(FHE.randomEuint8(seed, securityZone)));"));
        assert!(text.contains("FHE.decrypt(FHE.randomEuint8())"));
    }
}
