//! Generator configuration.
//!
//! Resolution order: [`GeneratorConfig::default`], then an optional JSON file
//! ([`GeneratorConfig::from_file`]), then environment overrides
//! ([`GeneratorConfig::apply_env`]). The CLI applies its flags last.
//!
//! # Example
//!
//! ```ignore
//! use fhegen_core::config::GeneratorConfig;
//!
//! let config = GeneratorConfig::default()
//!     .with_output_dir("build/solidity")
//!     .with_bench_operations(vec!["add".into(), "mul".into()]);
//! config.validate()?;
//! ```

use crate::domain::catalog::Catalog;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the catalog path.
pub const ENV_CATALOG: &str = "FHEGEN_CATALOG";

/// Environment variable overriding the output directory.
pub const ENV_OUT_DIR: &str = "FHEGEN_OUT_DIR";

/// Generator configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Go source holding the annotated operation catalog.
    pub catalog_path: PathBuf,
    /// Root directory every artifact is written under.
    pub output_dir: PathBuf,
    /// Library file name.
    pub library_file: String,
    /// Sub-directory for test contracts.
    pub tests_dir: String,
    /// Sub-directory for benchmark contracts.
    pub bench_dir: String,
    /// TypeScript declaration file name.
    pub abi_file: String,
    /// SPDX license identifier.
    pub license: String,
    /// Solidity version pragma.
    pub pragma: String,
    /// Import path of the precompile bindings.
    pub precompile_import: String,
    /// Operations that get a benchmark contract. `None` benchmarks every
    /// operation with a unary, binary or ternary body.
    pub bench_operations: Option<Vec<String>>,
    /// Emit `sealoutputTyped`.
    pub typed_seal: bool,
    /// Render operations on the rayon pool.
    pub parallel: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("catalog/fheops.go"),
            output_dir: PathBuf::from("solidity"),
            library_file: "FHE.sol".to_string(),
            tests_dir: "tests".to_string(),
            bench_dir: "benchmarks".to_string(),
            abi_file: "abis.ts".to_string(),
            license: "MIT".to_string(),
            pragma: ">=0.8.19 <0.9.0".to_string(),
            precompile_import: "./FheOS.sol".to_string(),
            bench_operations: None,
            typed_seal: true,
            parallel: true,
        }
    }
}

impl GeneratorConfig {
    /// Load from a JSON file; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Apply `FHEGEN_CATALOG` / `FHEGEN_OUT_DIR` from the process environment.
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup.
    #[must_use]
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_CATALOG).filter(|v| !v.is_empty()) {
            debug!(catalog = %path, "catalog path from environment");
            self.catalog_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup(ENV_OUT_DIR).filter(|v| !v.is_empty()) {
            debug!(output_dir = %dir, "output directory from environment");
            self.output_dir = PathBuf::from(dir);
        }
        self
    }

    /// Reject unusable values.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("library_file", &self.library_file),
            ("abi_file", &self.abi_file),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!("{field} cannot be empty")));
            }
            if value.contains(['/', '\\']) {
                return Err(ConfigError::Invalid(format!(
                    "{field} must be a file name, got '{value}'"
                )));
            }
        }
        for (field, value) in [("tests_dir", &self.tests_dir), ("bench_dir", &self.bench_dir)] {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!("{field} cannot be empty")));
            }
        }
        if self.pragma.trim().is_empty() {
            return Err(ConfigError::Invalid("pragma cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Rule tables adjusted by this configuration.
    #[must_use]
    pub fn catalog(&self) -> Catalog {
        Catalog::standard().with_typed_seal(self.typed_seal)
    }

    /// Whether `operation` gets a benchmark contract.
    #[must_use]
    pub fn benchmarks(&self, operation: &str) -> bool {
        self.bench_operations
            .as_ref()
            .map_or(true, |ops| ops.iter().any(|o| o == operation))
    }

    /// Builder-style method to set the catalog path
    #[must_use]
    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = path.into();
        self
    }

    /// Builder-style method to set the output directory
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Builder-style method to restrict benchmarks
    #[must_use]
    pub fn with_bench_operations(mut self, ops: Vec<String>) -> Self {
        self.bench_operations = Some(ops);
        self
    }

    /// Builder-style method to toggle the typed seal variant
    #[must_use]
    pub fn with_typed_seal(mut self, enabled: bool) -> Self {
        self.typed_seal = enabled;
        self
    }

    /// Builder-style method to toggle parallel rendering
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }
}
