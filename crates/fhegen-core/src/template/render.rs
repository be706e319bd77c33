//! Solidity text for each [`BodyShape`].
//!
//! Functions render as members of `library FHE` (four-space indent). Every
//! body guards uninitialized encrypted inputs by substituting an encryption of
//! zero before unwrapping.

use super::shape::{BodyShape, CastSource, FunctionRef, Output};
use crate::domain::naming::{cast_function, type_tag_constant};
use crate::domain::signature::{ConcreteSignature, ReturnType};
use crate::domain::types::{EncryptedType, FixedType, PlaintextType, ValueType};
use std::fmt::Write as _;

/// Function header without the trailing brace.
///
/// `visibility` is `None` for free functions (operator overloads).
#[must_use]
pub fn header(
    symbol: &str,
    inputs: &[ValueType],
    names: &[&str],
    visibility: Option<&str>,
    pure: bool,
    returns: ReturnType,
) -> String {
    let params: Vec<String> = inputs
        .iter()
        .zip(names)
        .map(|(t, name)| format!("{} {name}", t.declaration()))
        .collect();
    let mut line = format!("function {symbol}({})", params.join(", "));
    if let Some(visibility) = visibility {
        line.push(' ');
        line.push_str(visibility);
    }
    if pure {
        line.push_str(" pure");
    }
    if let ReturnType::Value(t) = returns {
        let _ = write!(line, " returns ({})", t.declaration());
    }
    line
}

/// NatSpec block for a generated function.
#[must_use]
pub fn doc(sig: &ConcreteSignature, shape: &BodyShape) -> String {
    let mut out = String::new();
    let notice = match shape {
        BodyShape::Unary { operand, .. } => {
            format!("This function performs the {} operation on an {operand}", sig.operation)
        }
        BodyShape::Binary { working, .. } => format!(
            "This function performs the {} operation, computed as {working}",
            sig.operation
        ),
        BodyShape::Ternary { .. } => {
            "Selects ifTrue where control is true and ifFalse elsewhere".to_string()
        }
        BodyShape::Seal { operand, typed, .. } => {
            if *typed {
                format!("Seals an {operand} and tags the result with its type")
            } else {
                format!("Seals an {operand} for the holder of publicKey")
            }
        }
        BodyShape::Cast { target, .. } => match sig.inputs.first() {
            Some(from) => format!("Converts a {from} value to an {target}"),
            None => format!("Converts a value to an {target}"),
        },
        BodyShape::Random { target, .. } => format!("Generates a random {target}"),
    };
    let _ = writeln!(out, "    /// @notice {notice}");
    if !matches!(shape, BodyShape::Cast { .. } | BodyShape::Random { .. }) {
        out.push_str("    /// @dev Uninitialized inputs are treated as an encryption of 0\n");
    }
    for name in shape.param_names() {
        let _ = writeln!(out, "    /// @param {name} {}", param_doc(name));
    }
    if let ReturnType::Value(t) = sig.returns {
        let _ = writeln!(out, "    /// @return The result as {}", t.name());
    }
    out
}

fn param_doc(name: &str) -> &'static str {
    match name {
        "lhs" => "The first operand",
        "rhs" => "The second operand",
        "control" => "The encrypted condition",
        "ifTrue" => "Value taken when control is true",
        "ifFalse" => "Value taken when control is false",
        "publicKey" => "Public key to seal under",
        "securityZone" => "Security zone of the ciphertext",
        "seed" => "Seed mixed into the generator",
        _ => "The input value",
    }
}

/// Full function text (header and body) for `sig`.
#[must_use]
pub fn function(sig: &ConcreteSignature, shape: &BodyShape) -> String {
    let names = shape.param_names();
    let mut out = format!(
        "    {} {{\n",
        header(
            &sig.symbol,
            &sig.inputs,
            &names,
            Some("internal"),
            shape.is_pure(),
            sig.returns
        )
    );
    out.push_str(&body(sig, shape));
    out.push_str("    }\n");
    out
}

fn body(sig: &ConcreteSignature, shape: &BodyShape) -> String {
    match shape {
        BodyShape::Unary {
            function_id,
            operand,
            output,
        } => unary(function_id, *operand, *output),
        BodyShape::Binary {
            function_id,
            lhs,
            rhs,
            working,
            output,
        } => binary(function_id, *lhs, *rhs, *working, *output),
        BodyShape::Ternary { function_id, value } => ternary(function_id, *value),
        BodyShape::Seal {
            function_id,
            operand,
            key,
            typed,
        } => seal(sig, function_id, *operand, *key, *typed),
        BodyShape::Cast {
            function_id,
            target,
            source,
        } => cast(function_id, *target, *source),
        BodyShape::Random {
            function_id,
            target,
            seeded,
            zoned,
        } => random(function_id, *target, *seeded, *zoned),
    }
}

fn guard(out: &mut String, name: &str, t: EncryptedType) {
    let _ = writeln!(out, "        if (!isInitialized({name})) {{");
    let _ = writeln!(out, "            {name} = {}(0);", cast_function(t));
    out.push_str("        }\n");
}

fn finish(out: &mut String, call: String, output: Output) {
    match output {
        Output::Encrypted(t) => {
            let _ = writeln!(out, "        uint256 result = {call};");
            let _ = writeln!(out, "        return {t}.wrap(result);");
        }
        Output::Plaintext(p) => {
            let _ = writeln!(out, "        uint256 result = {call};");
            let _ = writeln!(out, "        return {}(result);", p.from_handle_fn());
        }
        Output::Nothing => {
            let _ = writeln!(out, "        {call};");
        }
    }
}

fn unary(function_id: &FunctionRef, operand: EncryptedType, output: Output) -> String {
    let mut out = String::new();
    guard(&mut out, "value", operand);
    let _ = writeln!(out, "        uint256 unwrappedInput1 = {operand}.unwrap(value);");
    let call = format!(
        "Impl.unaryOp({}, {}, unwrappedInput1)",
        function_id.expr(),
        type_tag_constant(operand)
    );
    finish(&mut out, call, output);
    out
}

/// `working.unwrap(...)` of an operand, converting it first when it is not
/// already the working type.
fn unwrap_operand(name: &str, t: ValueType, working: EncryptedType) -> String {
    if t == ValueType::Encrypted(working) {
        format!("{working}.unwrap({name})")
    } else {
        format!("{working}.unwrap({}({name}))", cast_function(working))
    }
}

fn binary(
    function_id: &FunctionRef,
    lhs: ValueType,
    rhs: ValueType,
    working: EncryptedType,
    output: Output,
) -> String {
    let mut out = String::new();
    for (name, t) in [("lhs", lhs), ("rhs", rhs)] {
        if let ValueType::Encrypted(t) = t {
            guard(&mut out, name, t);
        }
    }
    let _ = writeln!(
        out,
        "        uint256 unwrappedInput1 = {};",
        unwrap_operand("lhs", lhs, working)
    );
    let _ = writeln!(
        out,
        "        uint256 unwrappedInput2 = {};",
        unwrap_operand("rhs", rhs, working)
    );
    let call = format!(
        "Impl.mathOp({}, {}, unwrappedInput1, unwrappedInput2)",
        function_id.expr(),
        type_tag_constant(working)
    );
    finish(&mut out, call, output);
    out
}

fn ternary(function_id: &FunctionRef, value: EncryptedType) -> String {
    let mut out = String::new();
    guard(&mut out, "control", EncryptedType::Ebool);
    guard(&mut out, "ifTrue", value);
    guard(&mut out, "ifFalse", value);
    out.push_str("        uint256 unwrappedInput1 = ebool.unwrap(control);\n");
    let _ = writeln!(out, "        uint256 unwrappedInput2 = {value}.unwrap(ifTrue);");
    let _ = writeln!(out, "        uint256 unwrappedInput3 = {value}.unwrap(ifFalse);");
    let call = format!(
        "Impl.ternaryOp({}, {}, unwrappedInput1, unwrappedInput2, unwrappedInput3)",
        function_id.expr(),
        type_tag_constant(value)
    );
    finish(&mut out, call, Output::Encrypted(value));
    out
}

fn seal(
    sig: &ConcreteSignature,
    function_id: &FunctionRef,
    operand: EncryptedType,
    key: FixedType,
    typed: bool,
) -> String {
    let mut out = String::new();
    if typed {
        let kind = operand.sealed_kind();
        let _ = writeln!(
            out,
            "        return {}({{data: {}(value, publicKey), utype: {}}});",
            kind.struct_name(),
            sig.operation,
            type_tag_constant(operand)
        );
        return out;
    }
    guard(&mut out, "value", operand);
    let _ = writeln!(out, "        uint256 unwrapped = {operand}.unwrap(value);");
    let helper = match key {
        FixedType::Bytes => "Impl.sealOpBytes",
        _ => "Impl.sealOp",
    };
    let _ = writeln!(
        out,
        "        return {helper}({}, {}, unwrapped, publicKey);",
        function_id.expr(),
        type_tag_constant(operand)
    );
    out
}

fn cast(function_id: &FunctionRef, target: EncryptedType, source: CastSource) -> String {
    let id = function_id.expr();
    let tag = type_tag_constant(target);
    let mut out = String::new();
    match source {
        CastSource::Encrypted(from) => {
            guard(&mut out, "value", from);
            let _ = writeln!(
                out,
                "        uint256 result = Impl.cast({id}, {}, {from}.unwrap(value), {tag});",
                type_tag_constant(from)
            );
            let _ = writeln!(out, "        return {target}.wrap(result);");
        }
        CastSource::Plaintext { value, zoned } => {
            let zone = if zoned { "securityZone" } else { "0" };
            let _ = writeln!(
                out,
                "        return {target}.wrap(Impl.trivialEncrypt({id}, {}, {tag}, {zone}));",
                plaintext_word(value)
            );
        }
        CastSource::Ciphertext => {
            let _ = writeln!(
                out,
                "        return {target}.wrap(Impl.verify({id}, value, {tag}, securityZone));"
            );
        }
        CastSource::InputStruct => {
            let _ = writeln!(
                out,
                "        return {}(value.data, value.securityZone);",
                cast_function(target)
            );
        }
    }
    out
}

/// Plaintext `value` as the 256-bit word handed to the dispatcher.
fn plaintext_word(p: PlaintextType) -> &'static str {
    match p {
        PlaintextType::Bool => "value ? uint256(1) : uint256(0)",
        PlaintextType::Address => "uint256(uint160(value))",
        PlaintextType::Uint256 => "value",
        _ => "uint256(value)",
    }
}

fn random(function_id: &FunctionRef, target: EncryptedType, seeded: bool, zoned: bool) -> String {
    let seed = if seeded { "seed" } else { "0" };
    let zone = if zoned { "securityZone" } else { "0" };
    let mut out = String::new();
    let _ = writeln!(
        out,
        "        uint256 result = Impl.random({}, {}, {seed}, {zone});",
        function_id.expr(),
        type_tag_constant(target)
    );
    let _ = writeln!(out, "        return {target}.wrap(result);");
    out
}
