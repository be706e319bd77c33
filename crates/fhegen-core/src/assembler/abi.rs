//! TypeScript declarations of the test contracts (`abis.ts`).

use super::test_contract::{returns_bytes, test_params};
use super::RenderedOperation;
use crate::domain::naming::test_contract;
use std::fmt::Write as _;

/// TypeScript type of a Solidity parameter type.
fn ts_type(solidity: &str) -> &'static str {
    match solidity {
        "int32" | "int8" | "int16" | "uint8" | "uint16" | "uint32" => "number",
        "string" | "bytes" | "bytes32" | "address" => "string",
        "bool" => "boolean",
        s if s.starts_with("uint") || s.starts_with("int") => "bigint",
        _ => "unknown",
    }
}

/// The whole declaration file, one interface per test contract.
#[must_use]
pub fn render(operations: &[RenderedOperation]) -> String {
    let mut out = String::from("import { BaseContract } from \"ethers\";\n");
    for op in operations.iter().filter(|op| !op.functions.is_empty()) {
        let mut params = vec!["test: string".to_string()];
        params.extend(
            test_params(&op.spec)
                .iter()
                .map(|p| format!("{}: {}", p.name, ts_type(p.base_type()))),
        );
        let output = if returns_bytes(op) { "string" } else { "bigint" };
        let _ = write!(
            out,
            "\nexport interface {}Type extends BaseContract {{\n    {}: ({}) => Promise<{output}>;\n}}\n",
            test_contract(op.spec.name()),
            op.spec.name(),
            params.join(", ")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::tests::{add_spec, surface};
    use crate::domain::operation::{InputKind, OperationSpec, ReturnKind};
    use crate::domain::types::FixedType;

    #[test]
    fn test_interfaces() {
        let seal = OperationSpec::new(
            "sealoutput",
            vec![InputKind::Encrypted, InputKind::Fixed(FixedType::Bytes32.into())],
        )
        .unwrap()
        .returning(ReturnKind::Explicit(FixedType::Bytes.into()));
        let s = surface(vec![add_spec(), seal]);
        let text = render(&s.operations);

        assert!(text.starts_with("import { BaseContract } from \"ethers\";\n"));
        assert!(text.contains(
            "export interface AddTestType extends BaseContract {\n    add: (test: string, a: bigint, b: bigint) => Promise<bigint>;\n}\n"
        ));
        assert!(text.contains(
            "    sealoutput: (test: string, a: bigint, pubkey: string) => Promise<string>;\n"
        ));
    }

    #[test]
    fn test_ts_types() {
        assert_eq!(ts_type("uint256"), "bigint");
        assert_eq!(ts_type("uint64"), "bigint");
        assert_eq!(ts_type("int32"), "number");
        assert_eq!(ts_type("bytes32"), "string");
    }
}
