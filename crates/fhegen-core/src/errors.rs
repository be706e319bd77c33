//! # Error Types
//!
//! Every error here is fatal: the run stops and nothing further is written.
//! Combinations the rules exclude (cross-type operands, disallowed casts)
//! are not errors and never surface here.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// CATALOG ERRORS
// =============================================================================

/// Errors raised while reading or interpreting the operation catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog contained no recognizable operation.
    #[error("no operations recognized in catalog")]
    NoOperations,

    /// An annotation named a type or kind that does not exist.
    #[error("operation {operation}: unknown type or kind '{name}'")]
    UnknownType {
        /// Operation carrying the annotation.
        operation: String,
        /// Unrecognized name as written.
        name: String,
    },

    /// An arity or input position outside the supported range.
    #[error("operation {operation}: arity or input position {arity} out of range (max 3)")]
    InvalidArity {
        /// Offending operation.
        operation: String,
        /// Declared value.
        arity: usize,
    },

    /// The catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Read {
        /// Catalog path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A built-in extraction pattern failed to compile.
    #[error("invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),
}

// =============================================================================
// EXPANSION ERRORS
// =============================================================================

/// Catalog/annotation mismatches detected while expanding an operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpansionError {
    /// Plaintext return declared on an operation that is not unary.
    #[error("operation {operation}: plaintext return requires arity 1, found {arity}")]
    PlaintextReturnArity {
        /// Offending operation.
        operation: String,
        /// Declared arity.
        arity: usize,
    },

    /// Plaintext return declared on a unary operation over a non-encrypted input.
    #[error("operation {operation}: plaintext return requires an encrypted input, found {input}")]
    PlaintextReturnInput {
        /// Offending operation.
        operation: String,
        /// Input kind or type found.
        input: String,
    },

    /// Encrypted return declared but no input carries a rank to promote from.
    #[error("operation {operation}: cannot resolve an encrypted return type")]
    UnresolvableReturn {
        /// Offending operation.
        operation: String,
    },
}

// =============================================================================
// TEMPLATE ERRORS
// =============================================================================

/// Errors raised while choosing or rendering a body shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// No shape template covers this (kind, arity) combination.
    #[error("no template for {symbol}: arity {arity} with inputs ({kinds}) -> {returns}")]
    UnsupportedShape {
        /// Solidity function name.
        symbol: String,
        /// Number of inputs.
        arity: usize,
        /// Comma-separated input types.
        kinds: String,
        /// Return type.
        returns: String,
    },

    /// The operation has no entry in the dispatcher's function-id table.
    #[error("operation {operation} has no function id")]
    UnknownFunctionId {
        /// Operation without an id.
        operation: String,
    },
}

// =============================================================================
// EMIT ERRORS
// =============================================================================

/// Filesystem failures while writing artifacts.
#[derive(Debug, Error)]
pub enum EmitError {
    /// An output directory could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An artifact could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Artifact path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// CONFIG ERRORS
// =============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Config path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`crate::config::GeneratorConfig`].
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Config path.
        path: PathBuf,
        /// JSON decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// A field holds an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// GENERATOR ERRORS
// =============================================================================

/// Top-level error of a generation run.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Catalog stage failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Expansion stage failed.
    #[error(transparent)]
    Expansion(#[from] ExpansionError),

    /// Template stage failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Emit stage failed.
    #[error(transparent)]
    Emit(#[from] EmitError),

    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Two expanded signatures collapsed to the same Solidity overload.
    #[error("duplicate overload {symbol}({})", .inputs.join(","))]
    DuplicateSignature {
        /// Solidity function name.
        symbol: String,
        /// Solidity input types of the colliding overload.
        inputs: Vec<String>,
    },
}

impl GeneratorError {
    /// Pipeline stage that produced the error, for log fields.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Catalog(_) => "catalog",
            Self::Expansion(_) | Self::DuplicateSignature { .. } => "expansion",
            Self::Template(_) => "template",
            Self::Emit(_) => "emit",
            Self::Config(_) => "config",
        }
    }
}

/// Result alias for generation runs.
pub type GeneratorResult<T> = Result<T, GeneratorError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        assert_eq!(
            CatalogError::NoOperations.to_string(),
            "no operations recognized in catalog"
        );
        let err = CatalogError::UnknownType {
            operation: "lte".to_string(),
            name: "float".to_string(),
        };
        assert!(err.to_string().contains("'float'"));

        let err = CatalogError::InvalidArity {
            operation: "not".to_string(),
            arity: 4,
        };
        assert_eq!(
            err.to_string(),
            "operation not: arity or input position 4 out of range (max 3)"
        );
    }

    #[test]
    fn test_expansion_error_display() {
        let err = ExpansionError::PlaintextReturnArity {
            operation: "decrypt".to_string(),
            arity: 2,
        };
        assert_eq!(
            err.to_string(),
            "operation decrypt: plaintext return requires arity 1, found 2"
        );
    }

    #[test]
    fn test_generator_error_stage() {
        let err: GeneratorError = CatalogError::NoOperations.into();
        assert_eq!(err.stage(), "catalog");

        let err: GeneratorError = TemplateError::UnknownFunctionId {
            operation: "teleport".to_string(),
        }
        .into();
        assert_eq!(err.stage(), "template");
        assert!(err.to_string().contains("teleport"));
    }

    #[test]
    fn test_duplicate_display() {
        let err = GeneratorError::DuplicateSignature {
            symbol: "add".to_string(),
            inputs: vec!["euint8".to_string(), "euint8".to_string()],
        };
        assert_eq!(err.to_string(), "duplicate overload add(euint8,euint8)");
    }
}
