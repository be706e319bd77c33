//! Go Catalog Extractor
//!
//! Reads operation metadata from an annotated Go source file.
//!
//! ## Recognized declarations
//!
//! Exported top-level functions of the form
//! `func Name(utype byte, <params...>, tp *TxParams) (...)`. Methods,
//! unexported functions and everything else are ignored. Names are
//! normalized by lower-casing the first character.
//!
//! ## Parameters
//!
//! | Go type | Input kind |
//! |---------|------------|
//! | `[]byte` | encrypted |
//! | `uint64` | `uint64` seed |
//! | `int32` | `int32` security zone |
//! | `[32]byte` | `bytes32` |
//!
//! Other parameter types are ignored with a warning. When no parameter is
//! recognized the operation defaults to three encrypted inputs.
//!
//! ## Annotations
//!
//! Line comments directly above the function or inside its body,
//! case-insensitive:
//!
//! ```text
//! // Return type: <encrypted|plaintext|none|type>
//! // Input2 type: <encrypted|plaintext|type>
//! // Arity: <n>
//! // Plaintext input
//! // Plaintext output
//! // Boolean math
//! // Same type
//! ```

use crate::domain::catalog::{Catalog, SEAL_OPERATION};
use crate::domain::naming::decapitalize;
use crate::domain::operation::{InputKind, OperationSpec, ReturnKind, MAX_ARITY};
use crate::domain::types::{FixedType, ValueType};
use crate::errors::CatalogError;
use crate::ports::OperationExtractor;
use regex::Regex;
use std::ops::RangeInclusive;
use tracing::{debug, warn};

/// Names that all denote the seal operation.
const SEAL_ALIASES: &[&str] = &["sealoutput", "reencrypt"];

/// Compiled annotation and declaration patterns.
#[derive(Debug, Clone)]
struct Patterns {
    func: Regex,
    return_type: Regex,
    input_type: Regex,
    arity: Regex,
    plaintext_input: Regex,
    plaintext_output: Regex,
    boolean_math: Regex,
    same_type: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            func: Regex::new(r"^func\s+([A-Za-z_]\w*)\s*\(")?,
            return_type: Regex::new(r"(?i)^\s*return\s+type\s*:\s*(\S+)")?,
            input_type: Regex::new(r"(?i)^\s*input\s*(\d+)\s+type\s*:\s*(\S+)")?,
            arity: Regex::new(r"(?i)^\s*arity\s*:\s*(\d+)")?,
            plaintext_input: Regex::new(r"(?i)^\s*plaintext\s+input\s*$")?,
            plaintext_output: Regex::new(r"(?i)^\s*plaintext\s+output\s*$")?,
            boolean_math: Regex::new(r"(?i)^\s*boolean\s+math\s*$")?,
            same_type: Regex::new(r"(?i)^\s*same\s+type\s*$")?,
        })
    }
}

/// A top-level Go function as scanned from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GoFunction {
    name: String,
    params: String,
    comments: Vec<String>,
}

/// Extracts [`OperationSpec`]s from Go source text.
#[derive(Debug, Clone)]
pub struct GoCatalogExtractor {
    catalog: Catalog,
    patterns: Patterns,
}

impl GoCatalogExtractor {
    /// Create an extractor honoring `catalog`'s exclusion list.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Pattern`] if a built-in pattern fails to compile.
    pub fn new(catalog: Catalog) -> Result<Self, CatalogError> {
        Ok(Self {
            catalog,
            patterns: Patterns::compile()?,
        })
    }

    /// Scan every top-level function with its annotation comments.
    fn scan(&self, text: &str) -> Vec<GoFunction> {
        let lines: Vec<&str> = text.lines().collect();
        let mut functions = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            if let Some(comment) = line.trim_start().strip_prefix("//") {
                pending.push(comment.to_string());
                i += 1;
                continue;
            }

            let Some(caps) = self.patterns.func.captures(line) else {
                pending.clear();
                i += 1;
                continue;
            };
            let name = caps[1].to_string();
            let open = caps.get(0).map_or(line.len(), |m| m.end());
            let params = collect_params(&lines, i, open);
            let end = body_end(&lines, i);

            let mut comments = std::mem::take(&mut pending);
            comments.extend(
                lines[i..=end]
                    .iter()
                    .filter_map(|l| l.find("//").map(|pos| l[pos + 2..].to_string())),
            );
            functions.push(GoFunction {
                name,
                params,
                comments,
            });
            i = end + 1;
        }
        functions
    }

    /// Interpret one scanned function. `None` when it is not an operation.
    fn operation(&self, function: &GoFunction) -> Result<Option<OperationSpec>, CatalogError> {
        if !function.name.starts_with(|c: char| c.is_ascii_uppercase()) {
            return Ok(None);
        }
        let name = decapitalize(&function.name);
        if self.catalog.is_excluded(&name) {
            debug!(operation = %name, "excluded from expansion");
            return Ok(None);
        }
        if SEAL_ALIASES.iter().any(|a| a.eq_ignore_ascii_case(&name)) {
            return OperationSpec::new(
                SEAL_OPERATION,
                vec![InputKind::Encrypted, InputKind::Fixed(FixedType::Bytes32.into())],
            )
            .map(|op| Some(op.returning(ReturnKind::Explicit(FixedType::Bytes.into()))));
        }

        let mut inputs = parameter_kinds(&name, &function.params);
        if inputs.is_empty() {
            inputs = vec![InputKind::Encrypted; MAX_ARITY];
        }

        let mut returns = ReturnKind::Encrypted;
        let mut boolean = false;
        let mut same_type = false;
        for comment in &function.comments {
            let comment = comment.trim();
            if let Some(caps) = self.patterns.return_type.captures(comment) {
                returns = ReturnKind::parse(&caps[1]).ok_or_else(|| {
                    CatalogError::UnknownType {
                        operation: name.clone(),
                        name: caps[1].to_string(),
                    }
                })?;
            } else if let Some(caps) = self.patterns.input_type.captures(comment) {
                let position = parse_count(&name, &caps[1], 1..=MAX_ARITY)?;
                let kind = InputKind::parse(&caps[2]).ok_or_else(|| CatalogError::UnknownType {
                    operation: name.clone(),
                    name: caps[2].to_string(),
                })?;
                set_input(&mut inputs, position, kind);
            } else if let Some(caps) = self.patterns.arity.captures(comment) {
                let arity = parse_count(&name, &caps[1], 0..=MAX_ARITY)?;
                inputs.resize(arity, InputKind::Encrypted);
            } else if self.patterns.plaintext_input.is_match(comment) {
                set_input(&mut inputs, 2, InputKind::Plaintext);
            } else if self.patterns.plaintext_output.is_match(comment) {
                returns = ReturnKind::Plaintext;
            } else if self.patterns.boolean_math.is_match(comment) {
                boolean = true;
            } else if self.patterns.same_type.is_match(comment) {
                same_type = true;
            }
        }

        let mut op = OperationSpec::new(name, inputs)?.returning(returns);
        if boolean {
            op = op.boolean();
        }
        if same_type {
            op = op.same_type();
        }
        Ok(Some(op))
    }
}

impl OperationExtractor for GoCatalogExtractor {
    fn extract(&self, text: &str) -> Result<Vec<OperationSpec>, CatalogError> {
        let mut operations: Vec<OperationSpec> = Vec::new();
        for function in self.scan(text) {
            let Some(op) = self.operation(&function)? else {
                continue;
            };
            if operations.iter().any(|o| o.name() == op.name()) {
                warn!(operation = op.name(), "duplicate catalog entry ignored");
                continue;
            }
            debug!(
                operation = op.name(),
                arity = op.arity(),
                returns = ?op.returns(),
                "recognized operation"
            );
            operations.push(op);
        }
        if operations.is_empty() {
            return Err(CatalogError::NoOperations);
        }
        Ok(operations)
    }
}

/// Text between the parentheses opened at `lines[start][open - 1]`, joined
/// across lines.
fn collect_params(lines: &[&str], start: usize, open: usize) -> String {
    let mut params = String::new();
    let mut depth = 1usize;
    let mut rest = lines[start].get(open..).unwrap_or("");
    let mut index = start;
    loop {
        for ch in rest.chars() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return params;
                    }
                }
                _ => {}
            }
            params.push(ch);
        }
        index += 1;
        match lines.get(index) {
            Some(next) => {
                params.push(' ');
                rest = next;
            }
            None => return params,
        }
    }
}

/// Index of the line closing the body that opens at or after `start`.
fn body_end(lines: &[&str], start: usize) -> usize {
    let mut depth = 0i64;
    let mut opened = false;
    for (index, line) in lines.iter().enumerate().skip(start) {
        let code = line.find("//").map_or(*line, |pos| &line[..pos]);
        for ch in code.chars() {
            match ch {
                '{' => {
                    depth += 1;
                    opened = true;
                }
                '}' => depth -= 1,
                _ => {}
            }
        }
        if opened && depth <= 0 {
            return index;
        }
    }
    lines.len().saturating_sub(1).max(start)
}

/// Input kinds of a Go parameter list, skipping `utype` and `tp`.
fn parameter_kinds(operation: &str, params: &str) -> Vec<InputKind> {
    // Go shares one type across grouped names: `lhs, rhs []byte`.
    let mut typed: Vec<(String, String)> = Vec::new();
    let mut pending_type: Option<String> = None;
    for param in params.split(',').map(str::trim).rev() {
        if param.is_empty() {
            continue;
        }
        let (name, ty) = match param.split_once(char::is_whitespace) {
            Some((name, ty)) => {
                let ty = ty.trim().to_string();
                pending_type = Some(ty.clone());
                (name.to_string(), ty)
            }
            None => (param.to_string(), pending_type.clone().unwrap_or_default()),
        };
        typed.push((name, ty));
    }
    typed.reverse();

    typed
        .into_iter()
        .filter(|(name, ty)| !(name == "utype" || name == "tp" || ty.starts_with('*')))
        .filter_map(|(name, ty)| {
            let kind = match ty.replace(' ', "").as_str() {
                "[]byte" => Some(InputKind::Encrypted),
                "uint64" => Some(InputKind::Fixed(FixedType::Uint64.into())),
                "int32" => Some(InputKind::Fixed(FixedType::Int32.into())),
                "[32]byte" => Some(InputKind::Fixed(ValueType::Fixed(FixedType::Bytes32))),
                _ => None,
            };
            if kind.is_none() {
                warn!(operation, param = %name, go_type = %ty, "ignoring unrecognized parameter type");
            }
            kind
        })
        .collect()
}

fn parse_count(
    operation: &str,
    digits: &str,
    range: RangeInclusive<usize>,
) -> Result<usize, CatalogError> {
    match digits.parse::<usize>() {
        Ok(n) if range.contains(&n) => Ok(n),
        Ok(n) => Err(CatalogError::InvalidArity {
            operation: operation.to_string(),
            arity: n,
        }),
        Err(_) => Err(CatalogError::InvalidArity {
            operation: operation.to_string(),
            arity: usize::MAX,
        }),
    }
}

/// Set the kind of 1-based `position`, padding with encrypted inputs.
fn set_input(inputs: &mut Vec<InputKind>, position: usize, kind: InputKind) {
    if inputs.len() < position {
        inputs.resize(position, InputKind::Encrypted);
    }
    inputs[position - 1] = kind;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::EncryptedType;

    fn extract(text: &str) -> Result<Vec<OperationSpec>, CatalogError> {
        GoCatalogExtractor::new(Catalog::standard())
            .unwrap()
            .extract(text)
    }

    #[test]
    fn test_binary_operation_from_params() {
        let ops = extract(
            "func Add(utype byte, lhsHash []byte, rhsHash []byte, tp *TxParams) ([]byte, uint64, error) {\n\treturn nil, 0, nil\n}\n",
        )
        .unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name(), "add");
        assert_eq!(ops[0].inputs(), &[InputKind::Encrypted, InputKind::Encrypted]);
        assert_eq!(ops[0].returns(), ReturnKind::Encrypted);
    }

    #[test]
    fn test_grouped_params_and_default_arity() {
        let ops = extract(
            "func Mul(utype byte, lhs, rhs []byte, tp *TxParams) ([]byte, error) {\n}\n\nfunc Square(input interface{}) ([]byte, error) {\n}\n",
        )
        .unwrap();
        assert_eq!(ops[0].arity(), 2);
        assert_eq!(ops[1].name(), "square");
        assert_eq!(ops[1].inputs(), &[InputKind::Encrypted; 3]);
    }

    #[test]
    fn test_annotations_above_and_inside() {
        let text = r"
// Lt compares two ciphertexts.
// Return type: ebool
func Lt(utype byte, lhs []byte, rhs []byte, tp *TxParams) ([]byte, error) {
	return nil, nil
}

func Decrypt(utype byte, input []byte, tp *TxParams) (*big.Int, error) {
	// Plaintext output
	return nil, nil
}

// Boolean math
func And(utype byte, lhs []byte, rhs []byte, tp *TxParams) ([]byte, error) {
	return nil, nil
}
";
        let ops = extract(text).unwrap();
        assert_eq!(
            ops[0].returns(),
            ReturnKind::Explicit(EncryptedType::Ebool.into())
        );
        assert_eq!(ops[1].returns(), ReturnKind::Plaintext);
        assert!(ops[2].is_boolean_op());
        assert!(!ops[0].is_boolean_op());
    }

    #[test]
    fn test_blank_line_breaks_comment_block() {
        let text = "// Return type: ebool\n\nfunc Gt(utype byte, lhs []byte, rhs []byte, tp *TxParams) {\n}\n";
        let ops = extract(text).unwrap();
        assert_eq!(ops[0].returns(), ReturnKind::Encrypted);
    }

    #[test]
    fn test_input_type_and_same_type() {
        let text = r"
// Input1 type: ebool
// Same type
func Select(utype byte, control []byte, ifTrue []byte, ifFalse []byte, tp *TxParams) ([]byte, error) {
	return nil, nil
}
";
        let ops = extract(text).unwrap();
        assert_eq!(
            ops[0].inputs(),
            &[
                InputKind::Fixed(EncryptedType::Ebool.into()),
                InputKind::Encrypted,
                InputKind::Encrypted
            ]
        );
        assert!(ops[0].same_type_required());
    }

    #[test]
    fn test_plaintext_input_and_arity() {
        let text = r"
// plaintext input
func Shl(utype byte, lhs []byte, rhs []byte, tp *TxParams) ([]byte, error) {
}

// Arity: 1
func Not(utype byte, value []byte, extra []byte, tp *TxParams) ([]byte, error) {
}
";
        let ops = extract(text).unwrap();
        assert_eq!(ops[0].inputs(), &[InputKind::Encrypted, InputKind::Plaintext]);
        assert_eq!(ops[1].arity(), 1);
    }

    #[test]
    fn test_seal_aliases_normalize() {
        let text = r"
func SealOutput(utype byte, ctHash []byte, pk []byte, tp *TxParams) (string, error) {
}

func Reencrypt(utype byte, ctHash []byte, pk []byte, tp *TxParams) (string, error) {
}
";
        let ops = extract(text).unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name(), "sealoutput");
        assert_eq!(
            ops[0].inputs(),
            &[InputKind::Encrypted, InputKind::Fixed(FixedType::Bytes32.into())]
        );
        assert_eq!(ops[0].returns(), ReturnKind::Explicit(FixedType::Bytes.into()));
    }

    #[test]
    fn test_ignored_declarations() {
        let text = r"
func (s *Server) Add(utype byte, lhs []byte, rhs []byte) {
}

func helper(utype byte, lhs []byte) {
}

func TrivialEncrypt(input []byte, toType byte, securityZone int32, tp *TxParams) ([]byte, error) {
}

type TxParams struct {
	Commit bool
}
";
        assert!(matches!(extract(text), Err(CatalogError::NoOperations)));
    }

    #[test]
    fn test_random_params() {
        let text = "// Return type: encrypted\nfunc Random(utype byte, seed uint64, securityZone int32, tp *TxParams) ([]byte, error) {\n}\n";
        let ops = extract(text).unwrap();
        assert_eq!(
            ops[0].inputs(),
            &[
                InputKind::Fixed(FixedType::Uint64.into()),
                InputKind::Fixed(FixedType::Int32.into())
            ]
        );
    }

    #[test]
    fn test_unknown_annotation_type_is_fatal() {
        let text = "// Return type: float\nfunc Lte(utype byte, lhs []byte, rhs []byte, tp *TxParams) {\n}\n";
        assert!(matches!(
            extract(text),
            Err(CatalogError::UnknownType { ref name, .. }) if name == "float"
        ));
    }

    #[test]
    fn test_zero_arity_with_explicit_return() {
        let text = "// Arity: 0\n// Return type: bytes\nfunc GetNetworkKey(utype byte, tp *TxParams) ([]byte, error) {\n}\n";
        let ops = extract(text).unwrap();
        assert_eq!(ops[0].name(), "getNetworkKey");
        assert_eq!(ops[0].arity(), 0);
        assert_eq!(ops[0].returns(), ReturnKind::Explicit(FixedType::Bytes.into()));
    }

    #[test]
    fn test_input_position_zero_is_fatal() {
        let text = "// Input0 type: ebool\nfunc Cmux(utype byte, a []byte, b []byte, tp *TxParams) {\n}\n";
        assert!(matches!(
            extract(text),
            Err(CatalogError::InvalidArity { arity: 0, .. })
        ));
    }

    #[test]
    fn test_multiline_params() {
        let text = "func Max(\n\tutype byte,\n\tlhs []byte,\n\trhs []byte,\n\ttp *TxParams,\n) ([]byte, error) {\n\treturn nil, nil\n}\n";
        let ops = extract(text).unwrap();
        assert_eq!(ops[0].arity(), 2);
    }
}
