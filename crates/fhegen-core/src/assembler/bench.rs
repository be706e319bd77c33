//! Per-operation benchmark contracts.
//!
//! For every encrypted type an operation supports with a unary, same-type
//! binary or ternary body, the contract holds the operands in storage, loads
//! them from `in<Type>` wrappers and exposes a `view` entry point running the
//! operation once.

use super::{preamble, RenderedOperation};
use crate::config::GeneratorConfig;
use crate::domain::naming::{bench_contract, capitalize, cast_function};
use crate::domain::types::{EncryptedType, FixedType, ValueType};
use crate::template::{BodyShape, GeneratedFunction};
use std::fmt::Write as _;

/// A benchmarkable overload: its operand type and storage slot names.
struct Case<'a> {
    function: &'a GeneratedFunction,
    value: EncryptedType,
    slots: Vec<(EncryptedType, String)>,
}

fn case(function: &GeneratedFunction) -> Option<Case<'_>> {
    let sig = &function.signature;
    match function.shape {
        BodyShape::Unary { operand, .. } => Some(Case {
            function,
            value: operand,
            slots: vec![(operand, slot("a", operand))],
        }),
        BodyShape::Binary { working, .. }
            if sig.inputs == [ValueType::Encrypted(working), ValueType::Encrypted(working)] =>
        {
            Some(Case {
                function,
                value: working,
                slots: vec![(working, slot("a", working)), (working, slot("b", working))],
            })
        }
        BodyShape::Ternary { value, .. } => Some(Case {
            function,
            value,
            slots: vec![
                (EncryptedType::Ebool, slot("control", value)),
                (value, slot("a", value)),
                (value, slot("b", value)),
            ],
        }),
        _ => None,
    }
}

fn slot(prefix: &str, t: EncryptedType) -> String {
    format!("{prefix}{}", capitalize(t.name()))
}

/// Benchmark contract source, or `None` when nothing is benchmarkable.
#[must_use]
pub fn render(config: &GeneratorConfig, op: &RenderedOperation) -> Option<String> {
    let cases: Vec<Case<'_>> = op.functions.iter().filter_map(case).collect();
    if cases.is_empty() {
        return None;
    }

    let mut out = preamble::file_header(config);
    let _ = write!(
        out,
        "\nimport \"../{}\";\n\ncontract {} {{\n",
        config.library_file,
        bench_contract(op.spec.name())
    );

    for case in &cases {
        for (t, name) in &case.slots {
            let _ = writeln!(out, "    {t} internal {name};");
        }
    }

    for case in &cases {
        let cap = capitalize(case.value.name());
        let params: Vec<String> = case
            .slots
            .iter()
            .map(|(t, name)| format!("{} calldata _{name}", FixedType::InputStruct(*t).name()))
            .collect();
        let _ = write!(out, "\n    function load{cap}({}) public {{\n", params.join(", "));
        for (t, name) in &case.slots {
            let _ = writeln!(out, "        {name} = FHE.{}(_{name});", cast_function(*t));
        }
        out.push_str("    }\n");

        let view = if case.function.shape.is_pure() { " view" } else { "" };
        let args: Vec<&str> = case.slots.iter().map(|(_, name)| name.as_str()).collect();
        let _ = write!(
            out,
            "\n    function bench{}{cap}() public{view} {{\n        FHE.{}({});\n    }}\n",
            capitalize(op.spec.name()),
            case.function.signature.symbol,
            args.join(", ")
        );
    }

    out.push_str("}\n");
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::tests::{add_spec, surface};
    use crate::domain::operation::{InputKind, OperationSpec, ReturnKind};

    fn bench(spec: OperationSpec) -> Option<String> {
        let s = surface(vec![spec]);
        render(&GeneratorConfig::default(), &s.operations[0])
    }

    #[test]
    fn test_binary_bench() {
        let text = bench(add_spec()).unwrap();
        assert!(text.contains("contract AddBench {"));
        assert!(text.contains("    euint8 internal aEuint8;\n    euint8 internal bEuint8;\n"));
        assert!(text.contains(
            "    function loadEuint8(inEuint8 calldata _aEuint8, inEuint8 calldata _bEuint8) public {\n        aEuint8 = FHE.asEuint8(_aEuint8);\n"
        ));
        assert!(text.contains(
            "    function benchAddEuint8() public view {\n        FHE.add(aEuint8, bEuint8);\n    }\n"
        ));
        assert!(!text.contains("Eaddress"));
    }

    #[test]
    fn test_ternary_bench_loads_control() {
        let select = OperationSpec::new(
            "select",
            vec![
                InputKind::Fixed(EncryptedType::Ebool.into()),
                InputKind::Encrypted,
                InputKind::Encrypted,
            ],
        )
        .unwrap()
        .same_type();
        let text = bench(select).unwrap();
        assert!(text.contains("    ebool internal controlEuint16;\n"));
        assert!(text.contains("controlEuint16 = FHE.asEbool(_controlEuint16);"));
        assert!(text.contains("FHE.select(controlEaddress, aEaddress, bEaddress);"));
    }

    #[test]
    fn test_seal_has_no_bench() {
        let seal = OperationSpec::new(
            "sealoutput",
            vec![InputKind::Encrypted, InputKind::Fixed(FixedType::Bytes32.into())],
        )
        .unwrap()
        .returning(ReturnKind::Explicit(FixedType::Bytes.into()));
        assert!(bench(seal).is_none());
    }
}
