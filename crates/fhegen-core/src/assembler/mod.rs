//! # Artifact Assembler
//!
//! Concatenates rendered functions into complete files: the FHE library,
//! one test contract and (optionally) one benchmark contract per operation,
//! and the TypeScript ABI declarations.
//!
//! Assembly is a pure function of its inputs; writing is left to an
//! [`crate::ports::ArtifactSink`].

pub mod abi;
pub mod bench;
pub mod library;
pub mod preamble;
pub mod test_contract;

use crate::config::GeneratorConfig;
use crate::domain::catalog::Catalog;
use crate::domain::naming::{bench_contract, test_contract};
use crate::domain::operation::OperationSpec;
use crate::domain::signature::{ConcreteSignature, ReturnType};
use crate::template::render::header;
use crate::template::GeneratedFunction;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

// =============================================================================
// RENDERED SURFACE
// =============================================================================

/// One catalog operation and every function rendered for it.
#[derive(Debug, Clone)]
pub struct RenderedOperation {
    /// The catalog entry.
    pub spec: OperationSpec,
    /// Rendered overloads in expansion order.
    pub functions: Vec<GeneratedFunction>,
}

/// Everything the assembler places in the output.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    /// Operations in catalog order.
    pub operations: Vec<RenderedOperation>,
    /// Cast overloads in target-type order.
    pub casts: Vec<GeneratedFunction>,
}

impl Surface {
    /// Every signature on the surface, operations first.
    pub fn signatures(&self) -> impl Iterator<Item = &ConcreteSignature> {
        self.operations
            .iter()
            .flat_map(|op| op.functions.iter())
            .chain(self.casts.iter())
            .map(|f| &f.signature)
    }

    /// Number of generated library functions.
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.signatures().count()
    }
}

// =============================================================================
// ARTIFACTS
// =============================================================================

/// What an artifact contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArtifactKind {
    /// The FHE library.
    Library,
    /// A per-operation test contract.
    TestContract,
    /// A per-operation benchmark contract.
    Benchmark,
    /// TypeScript declarations of the test contracts.
    AbiDeclarations,
}

/// A file ready to be written, with a path relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Content category.
    pub kind: ArtifactKind,
    /// Path relative to the output directory.
    pub path: PathBuf,
    /// Full file contents.
    pub contents: String,
}

impl Artifact {
    /// Size of the contents in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Whether the contents are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

// =============================================================================
// ASSEMBLER
// =============================================================================

/// Builds [`Artifact`]s from a [`Surface`].
#[derive(Debug, Clone, Copy)]
pub struct Assembler<'a> {
    catalog: &'a Catalog,
    config: &'a GeneratorConfig,
}

impl<'a> Assembler<'a> {
    /// Create an assembler.
    #[must_use]
    pub fn new(catalog: &'a Catalog, config: &'a GeneratorConfig) -> Self {
        Self { catalog, config }
    }

    /// All artifacts: library, test contracts, benchmarks, ABI declarations.
    #[must_use]
    pub fn assemble(&self, surface: &Surface) -> Vec<Artifact> {
        let mut artifacts = vec![Artifact {
            kind: ArtifactKind::Library,
            path: PathBuf::from(&self.config.library_file),
            contents: library::render(self.catalog, self.config, surface),
        }];

        for op in &surface.operations {
            if op.functions.is_empty() {
                debug!(operation = op.spec.name(), "no signatures, skipping test contract");
                continue;
            }
            artifacts.push(Artifact {
                kind: ArtifactKind::TestContract,
                path: PathBuf::from(&self.config.tests_dir)
                    .join(format!("{}.sol", test_contract(op.spec.name()))),
                contents: test_contract::render(self.catalog, self.config, op),
            });
        }

        for op in &surface.operations {
            if !self.config.benchmarks(op.spec.name()) {
                continue;
            }
            if let Some(contents) = bench::render(self.config, op) {
                artifacts.push(Artifact {
                    kind: ArtifactKind::Benchmark,
                    path: PathBuf::from(&self.config.bench_dir)
                        .join(format!("{}.sol", bench_contract(op.spec.name()))),
                    contents,
                });
            }
        }

        artifacts.push(Artifact {
            kind: ArtifactKind::AbiDeclarations,
            path: PathBuf::from(&self.config.abi_file),
            contents: abi::render(&surface.operations),
        });

        debug!(artifacts = artifacts.len(), "assembled");
        artifacts
    }
}

/// A function that forwards its arguments to `target`.
///
/// `visibility` is `None` for free functions. `indent` prefixes every line.
pub(crate) fn forwarder(
    name: &str,
    function: &GeneratedFunction,
    target: &str,
    visibility: Option<&str>,
    indent: &str,
) -> String {
    let sig = &function.signature;
    let names = function.param_names();
    let call = format!("{target}({})", names.join(", "));
    let statement = match sig.returns {
        ReturnType::Value(_) => format!("return {call};"),
        ReturnType::Nothing => format!("{call};"),
    };
    format!(
        "{indent}{} {{\n{indent}    {statement}\n{indent}}}\n",
        header(
            name,
            &sig.inputs,
            &names,
            visibility,
            function.shape.is_pure(),
            sig.returns
        )
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::operation::InputKind;
    use crate::expander::Expander;
    use crate::template::TemplateEngine;

    pub(crate) fn surface(ops: Vec<OperationSpec>) -> Surface {
        let catalog = Catalog::standard();
        let expander = Expander::new(&catalog);
        let engine = TemplateEngine::new(&catalog);
        let operations = ops
            .into_iter()
            .map(|spec| {
                let sigs = expander.expand(&spec).unwrap();
                RenderedOperation {
                    functions: engine.render_all(&sigs).unwrap(),
                    spec,
                }
            })
            .collect();
        Surface {
            operations,
            casts: engine.render_all(&expander.expand_casts()).unwrap(),
        }
    }

    pub(crate) fn add_spec() -> OperationSpec {
        OperationSpec::new("add", vec![InputKind::Encrypted, InputKind::Encrypted]).unwrap()
    }

    #[test]
    fn test_artifact_paths() {
        let catalog = Catalog::standard();
        let config = GeneratorConfig::default();
        let artifacts = Assembler::new(&catalog, &config).assemble(&surface(vec![add_spec()]));

        let paths: Vec<String> = artifacts
            .iter()
            .map(|a| a.path.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            paths,
            vec!["FHE.sol", "tests/AddTest.sol", "benchmarks/AddBench.sol", "abis.ts"]
        );
        assert!(artifacts.iter().all(|a| !a.is_empty()));
    }

    #[test]
    fn test_bench_filter_from_config() {
        let catalog = Catalog::standard();
        let config = GeneratorConfig::default().with_bench_operations(vec!["mul".to_string()]);
        let artifacts = Assembler::new(&catalog, &config).assemble(&surface(vec![add_spec()]));
        assert!(!artifacts.iter().any(|a| a.kind == ArtifactKind::Benchmark));
    }

    #[test]
    fn test_surface_counts() {
        let s = surface(vec![add_spec()]);
        assert_eq!(s.function_count(), s.operations[0].functions.len() + s.casts.len());
    }

    #[test]
    fn test_forwarder() {
        let s = surface(vec![add_spec()]);
        let text = forwarder("add", &s.operations[0].functions[0], "FHE.add", Some("internal"), "    ");
        assert_eq!(
            text,
            "    function add(euint8 lhs, euint8 rhs) internal pure returns (euint8) {\n        return FHE.add(lhs, rhs);\n    }\n"
        );
    }
}
