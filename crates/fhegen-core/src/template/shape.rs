//! Body shapes: the closed set of function templates.
//!
//! [`plan`] classifies a signature by its input kinds, arity and return. A
//! signature no shape covers is a fatal [`TemplateError::UnsupportedShape`].

use crate::domain::catalog::Catalog;
use crate::domain::signature::{ConcreteSignature, Family, ReturnType};
use crate::domain::types::{EncryptedType, FixedType, PlaintextType, ValueType};
use crate::errors::TemplateError;

/// Function-id enum member and its ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef {
    /// Member name in `enum FunctionId`.
    pub name: String,
    /// Ordinal passed to the dispatcher.
    pub ordinal: usize,
}

impl FunctionRef {
    /// Solidity expression (`FunctionId.add`).
    #[must_use]
    pub fn expr(&self) -> String {
        format!("FunctionId.{}", self.name)
    }
}

/// What a unary or binary body hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Wrap the raw result as this encrypted type.
    Encrypted(EncryptedType),
    /// Truncate the raw result to this plaintext type.
    Plaintext(PlaintextType),
    /// Discard the result.
    Nothing,
}

/// Source of a cast overload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastSource {
    /// Re-encode another encrypted type.
    Encrypted(EncryptedType),
    /// Trivially encrypt a plaintext, optionally into a given security zone.
    Plaintext {
        /// Plaintext source type.
        value: PlaintextType,
        /// Whether a security zone parameter follows.
        zoned: bool,
    },
    /// Verify a ciphertext byte string in a security zone.
    Ciphertext,
    /// Unpack an `in<Type>` wrapper and verify it.
    InputStruct,
}

/// Body template of one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyShape {
    /// One encrypted operand.
    Unary {
        /// Dispatcher function.
        function_id: FunctionRef,
        /// Operand type.
        operand: EncryptedType,
        /// Result handling.
        output: Output,
    },
    /// Two operands, the first encrypted, computed in `working`.
    Binary {
        /// Dispatcher function.
        function_id: FunctionRef,
        /// Left operand type as declared.
        lhs: ValueType,
        /// Right operand type as declared.
        rhs: ValueType,
        /// Promoted type both operands are cast to.
        working: EncryptedType,
        /// Result handling.
        output: Output,
    },
    /// `select(control, ifTrue, ifFalse)`.
    Ternary {
        /// Dispatcher function.
        function_id: FunctionRef,
        /// Type of both branches.
        value: EncryptedType,
    },
    /// Re-encrypt an operand under a public key.
    Seal {
        /// Dispatcher function.
        function_id: FunctionRef,
        /// Sealed value type.
        operand: EncryptedType,
        /// Public key parameter type.
        key: FixedType,
        /// Whether the output is wrapped in the typed seal struct.
        typed: bool,
    },
    /// `as<Type>` conversion.
    Cast {
        /// Dispatcher function.
        function_id: FunctionRef,
        /// Resulting encrypted type.
        target: EncryptedType,
        /// What is converted.
        source: CastSource,
    },
    /// Random value of `target`.
    Random {
        /// Dispatcher function.
        function_id: FunctionRef,
        /// Generated type.
        target: EncryptedType,
        /// Whether the caller passes a seed.
        seeded: bool,
        /// Whether the caller passes a security zone.
        zoned: bool,
    },
}

impl BodyShape {
    /// Short label for logs and reports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unary { .. } => "unary",
            Self::Binary { .. } => "binary",
            Self::Ternary { .. } => "ternary",
            Self::Seal { .. } => "seal",
            Self::Cast { .. } => "cast",
            Self::Random { .. } => "random",
        }
    }

    /// Parameter names in input order.
    #[must_use]
    pub fn param_names(&self) -> Vec<&'static str> {
        match self {
            Self::Unary { .. } => vec!["value"],
            Self::Binary { .. } => vec!["lhs", "rhs"],
            Self::Ternary { .. } => vec!["control", "ifTrue", "ifFalse"],
            Self::Seal { .. } => vec!["value", "publicKey"],
            Self::Cast { source, .. } => match source {
                CastSource::Encrypted(_)
                | CastSource::InputStruct
                | CastSource::Plaintext { zoned: false, .. } => vec!["value"],
                CastSource::Plaintext { zoned: true, .. } | CastSource::Ciphertext => {
                    vec!["value", "securityZone"]
                }
            },
            Self::Random { seeded, zoned, .. } => match (seeded, zoned) {
                (true, true) => vec!["seed", "securityZone"],
                (true, false) => vec!["seed"],
                (false, _) => Vec::new(),
            },
        }
    }

    /// Whether the body reads chain state (random) or is `pure`.
    #[must_use]
    pub fn is_pure(&self) -> bool {
        !matches!(self, Self::Random { .. })
    }
}

/// Choose the body shape for `sig`.
///
/// # Errors
///
/// [`TemplateError::UnknownFunctionId`] when the dispatcher has no id for the
/// operation, [`TemplateError::UnsupportedShape`] when no template fits.
pub fn plan(sig: &ConcreteSignature, catalog: &Catalog) -> Result<BodyShape, TemplateError> {
    if sig.family == Family::Cast {
        return plan_cast(sig, catalog);
    }

    let function_id = function_ref(catalog, &sig.operation)?;
    let unsupported = || unsupported_shape(sig);

    use ValueType::{Encrypted, Fixed, Plaintext};
    let shape = match (sig.inputs.as_slice(), sig.returns) {
        ([Encrypted(operand)], returns) => BodyShape::Unary {
            function_id,
            operand: *operand,
            output: output_of(returns).ok_or_else(unsupported)?,
        },
        (
            [Encrypted(operand), Fixed(key @ (FixedType::Bytes32 | FixedType::Bytes))],
            ReturnType::Value(Fixed(ret)),
        ) => {
            let typed = match ret {
                FixedType::Bytes => false,
                FixedType::Sealed(kind) if kind == operand.sealed_kind() => true,
                _ => return Err(unsupported()),
            };
            BodyShape::Seal {
                function_id,
                operand: *operand,
                key: *key,
                typed,
            }
        }
        ([lhs @ Encrypted(_), rhs @ (Encrypted(_) | Plaintext(_))], returns) => {
            let working = lhs
                .rank()
                .max(rhs.rank())
                .and_then(EncryptedType::from_rank)
                .ok_or_else(unsupported)?;
            BodyShape::Binary {
                function_id,
                lhs: *lhs,
                rhs: *rhs,
                working,
                output: output_of(returns).ok_or_else(unsupported)?,
            }
        }
        (
            [Encrypted(EncryptedType::Ebool), Encrypted(a), Encrypted(b)],
            ReturnType::Value(Encrypted(ret)),
        ) if a == b && ret == *a => BodyShape::Ternary {
            function_id,
            value: *a,
        },
        ([], ReturnType::Value(Encrypted(target))) => BodyShape::Random {
            function_id,
            target,
            seeded: false,
            zoned: false,
        },
        ([Fixed(FixedType::Uint64)], ReturnType::Value(Encrypted(target))) => BodyShape::Random {
            function_id,
            target,
            seeded: true,
            zoned: false,
        },
        (
            [Fixed(FixedType::Uint64), Fixed(FixedType::Int32)],
            ReturnType::Value(Encrypted(target)),
        ) => BodyShape::Random {
            function_id,
            target,
            seeded: true,
            zoned: true,
        },
        _ => return Err(unsupported()),
    };
    Ok(shape)
}

fn plan_cast(sig: &ConcreteSignature, catalog: &Catalog) -> Result<BodyShape, TemplateError> {
    use ValueType::{Encrypted, Fixed, Plaintext};

    let Some(Encrypted(target)) = sig.returns.value() else {
        return Err(unsupported_shape(sig));
    };
    let (source, id) = match sig.inputs.as_slice() {
        [Encrypted(from)] if *from != target => (CastSource::Encrypted(*from), "cast"),
        [Plaintext(value)] => (
            CastSource::Plaintext {
                value: *value,
                zoned: false,
            },
            "trivialEncrypt",
        ),
        [Plaintext(value), Fixed(FixedType::Int32)] => (
            CastSource::Plaintext {
                value: *value,
                zoned: true,
            },
            "trivialEncrypt",
        ),
        [Fixed(FixedType::Bytes), Fixed(FixedType::Int32)] => (CastSource::Ciphertext, "verify"),
        [Fixed(FixedType::InputStruct(t))] if *t == target => (CastSource::InputStruct, "verify"),
        _ => return Err(unsupported_shape(sig)),
    };
    Ok(BodyShape::Cast {
        function_id: function_ref(catalog, id)?,
        target,
        source,
    })
}

fn function_ref(catalog: &Catalog, operation: &str) -> Result<FunctionRef, TemplateError> {
    catalog
        .function_id(operation)
        .map(|ordinal| FunctionRef {
            name: operation.to_string(),
            ordinal,
        })
        .ok_or_else(|| TemplateError::UnknownFunctionId {
            operation: operation.to_string(),
        })
}

fn output_of(returns: ReturnType) -> Option<Output> {
    match returns {
        ReturnType::Value(ValueType::Encrypted(t)) => Some(Output::Encrypted(t)),
        ReturnType::Value(ValueType::Plaintext(p)) => Some(Output::Plaintext(p)),
        ReturnType::Nothing => Some(Output::Nothing),
        ReturnType::Value(ValueType::Fixed(_)) => None,
    }
}

fn unsupported_shape(sig: &ConcreteSignature) -> TemplateError {
    let kinds: Vec<String> = sig.inputs.iter().map(|t| t.name()).collect();
    TemplateError::UnsupportedShape {
        symbol: sig.symbol.clone(),
        arity: sig.arity(),
        kinds: kinds.join(","),
        returns: match sig.returns {
            ReturnType::Value(t) => t.name(),
            ReturnType::Nothing => "none".to_string(),
        },
    }
}
