//! The `FHE.sol` library file.
//!
//! Section order: header, type declarations, wrapper structs, `FunctionId`,
//! `Common`, `Impl`, `library FHE` (initialization helpers, operations,
//! casts), operator overloads, per-type binding libraries.

use super::{forwarder, preamble, Surface};
use crate::config::GeneratorConfig;
use crate::domain::catalog::Catalog;
use crate::domain::naming::{binding_library, operator_function, shorten};
use crate::domain::signature::{Family, ReturnType};
use crate::domain::types::{EncryptedType, ValueType};
use crate::template::{BodyShape, GeneratedFunction};
use std::fmt::Write as _;

/// Full library source.
#[must_use]
pub fn render(catalog: &Catalog, config: &GeneratorConfig, surface: &Surface) -> String {
    let mut out = preamble::file_header(config);
    out.push_str(&preamble::library_imports(config));
    out.push_str(&preamble::type_declarations(catalog));
    out.push_str(&preamble::input_structs(catalog));
    out.push_str(&preamble::sealed_structs());
    out.push_str(&preamble::function_id_enum(catalog));
    out.push_str(&preamble::common_library(catalog));
    out.push_str(&preamble::impl_library());

    out.push_str("\nlibrary FHE {\n");
    out.push_str(&preamble::is_initialized_helpers(catalog));
    for op in &surface.operations {
        for function in &op.functions {
            out.push_str(&function.text());
            out.push('\n');
        }
    }
    out.push_str("    // ********** TYPE CASTING ************* //\n\n");
    for (i, function) in surface.casts.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&function.text());
    }
    out.push_str("}\n");

    out.push_str(&operators(catalog, surface));
    out.push_str(&bindings(catalog, surface));
    out
}

/// `true` when `function` is `op(T, T) -> T` over encrypted `t`.
pub(crate) fn is_closed_binary(function: &GeneratedFunction, t: EncryptedType) -> bool {
    let sig = &function.signature;
    sig.family == Family::Operation
        && sig.symbol == sig.operation
        && sig.inputs == [ValueType::Encrypted(t), ValueType::Encrypted(t)]
        && sig.returns == ReturnType::Value(ValueType::Encrypted(t))
}

/// User-defined operators: `using {...} for T global;` plus free functions.
fn operators(catalog: &Catalog, surface: &Surface) -> String {
    let mut out = String::new();
    for t in catalog.encrypted_types() {
        if t.is_comparison_result() {
            continue;
        }
        let mut bound = Vec::new();
        let mut functions = String::new();
        for operator in catalog.operators() {
            let found = surface
                .operations
                .iter()
                .filter(|op| op.spec.name() == operator.operation)
                .flat_map(|op| op.functions.iter())
                .find(|f| is_closed_binary(f, *t));
            let Some(function) = found else {
                continue;
            };
            let name = operator_function(&operator.operation, *t);
            functions.push('\n');
            functions.push_str(&forwarder(
                &name,
                function,
                &format!("FHE.{}", operator.operation),
                None,
                "",
            ));
            bound.push(format!("{name} as {}", operator.symbol));
        }
        if bound.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\nusing {{{}}} for {t} global;", bound.join(", "));
        out.push_str(&functions);
    }
    out
}

/// `Bindings<Type>` libraries enabling `x.op(y)` and `x.toU16()`.
fn bindings(catalog: &Catalog, surface: &Surface) -> String {
    let mut out = String::new();
    for t in catalog.encrypted_types() {
        let mut members = Vec::new();
        for function in surface.operations.iter().flat_map(|op| op.functions.iter()) {
            if !binds_to(function, *t) {
                continue;
            }
            let sig = &function.signature;
            members.push(forwarder(
                &sig.symbol,
                function,
                &format!("FHE.{}", sig.symbol),
                Some("internal"),
                "    ",
            ));
        }
        for function in &surface.casts {
            let sig = &function.signature;
            let (Some(ValueType::Encrypted(from)), Some(ValueType::Encrypted(to))) =
                (sig.inputs.first(), sig.returns.value())
            else {
                continue;
            };
            if *from != *t || sig.arity() != 1 {
                continue;
            }
            members.push(forwarder(
                &format!("to{}", shorten(to)),
                function,
                &format!("FHE.{}", sig.symbol),
                Some("internal"),
                "    ",
            ));
        }
        if members.is_empty() {
            continue;
        }
        let library = binding_library(*t);
        let _ = write!(out, "\nusing {library} for {t} global;\nlibrary {library} {{\n");
        out.push_str(&members.join("\n"));
        out.push_str("}\n");
    }
    out
}

/// Whether `function` gets a method on `t` (first input is `t`).
pub(crate) fn binds_to(function: &GeneratedFunction, t: EncryptedType) -> bool {
    function.signature.family == Family::Operation
        && function.signature.inputs.first() == Some(&ValueType::Encrypted(t))
        && !matches!(function.shape, BodyShape::Random { .. })
}
