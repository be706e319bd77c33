//! Generator Service
//!
//! Orchestrates the pipeline: load catalog → extract operations → expand and
//! render per operation → casts → duplicate check → assemble → emit.
//!
//! Every stage before emission is pure, so a failing run writes nothing.

use crate::adapters::GoCatalogExtractor;
use crate::assembler::{Artifact, Assembler, RenderedOperation, Surface};
use crate::config::GeneratorConfig;
use crate::domain::catalog::Catalog;
use crate::domain::operation::OperationSpec;
use crate::domain::signature::duplicate_overloads;
use crate::errors::{GeneratorError, GeneratorResult};
use crate::expander::Expander;
use crate::ports::{
    ArtifactSink, CatalogSource, CodeGenerator, GenerationReport, OperationExtractor, WrittenFile,
};
use crate::template::TemplateEngine;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Generator service implementation
///
/// Implements the `CodeGenerator` port using injected dependencies.
pub struct GeneratorService<C: CatalogSource, S: ArtifactSink> {
    /// Catalog text source (driven port)
    source: Arc<C>,
    /// Artifact destination (driven port)
    sink: Arc<S>,
    /// Catalog parser (driven port)
    extractor: Box<dyn OperationExtractor>,
    config: GeneratorConfig,
    catalog: Catalog,
}

impl<C: CatalogSource, S: ArtifactSink> GeneratorService<C, S> {
    /// Create a service parsing the catalog as annotated Go source.
    ///
    /// # Errors
    ///
    /// [`GeneratorError::Config`] when `config` fails validation.
    pub fn new(source: Arc<C>, sink: Arc<S>, config: GeneratorConfig) -> GeneratorResult<Self> {
        config.validate()?;
        let catalog = config.catalog();
        let extractor = GoCatalogExtractor::new(catalog.clone())?;
        Ok(Self {
            source,
            sink,
            extractor: Box::new(extractor),
            config,
            catalog,
        })
    }

    /// Builder-style method to replace the catalog parser
    #[must_use]
    pub fn with_extractor<E: OperationExtractor + 'static>(mut self, extractor: E) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Active rule tables.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Load and parse the catalog.
    ///
    /// # Errors
    ///
    /// Any [`crate::errors::CatalogError`].
    #[instrument(skip(self), fields(source = %self.source.describe()))]
    pub fn extract(&self) -> GeneratorResult<Vec<OperationSpec>> {
        let text = self.source.load()?;
        let ops = self.extractor.extract(&text)?;
        info!(operations = ops.len(), "catalog loaded");
        Ok(ops)
    }

    /// Expand and render every operation plus the casts.
    ///
    /// # Errors
    ///
    /// The first expansion or template error, or
    /// [`GeneratorError::DuplicateSignature`] when two overloads collide.
    #[instrument(skip(self, ops), fields(operations = ops.len()))]
    pub fn build_surface(&self, ops: &[OperationSpec]) -> GeneratorResult<Surface> {
        let expander = Expander::new(&self.catalog);
        let engine = TemplateEngine::new(&self.catalog);

        let operations = self.render_operations(&expander, &engine, ops)?;
        let casts = engine.render_all(&expander.expand_casts())?;
        let surface = Surface { operations, casts };

        let duplicates = duplicate_overloads(surface.signatures());
        if let Some((symbol, inputs)) = duplicates.into_iter().next() {
            return Err(GeneratorError::DuplicateSignature { symbol, inputs });
        }

        info!(
            functions = surface.function_count(),
            casts = surface.casts.len(),
            "surface rendered"
        );
        Ok(surface)
    }

    #[cfg(feature = "parallel")]
    fn render_operations(
        &self,
        expander: &Expander<'_>,
        engine: &TemplateEngine<'_>,
        ops: &[OperationSpec],
    ) -> GeneratorResult<Vec<RenderedOperation>> {
        if !self.config.parallel {
            return ops.iter().map(|op| render_operation(expander, engine, op)).collect();
        }
        ops.par_iter()
            .map(|op| render_operation(expander, engine, op))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn render_operations(
        &self,
        expander: &Expander<'_>,
        engine: &TemplateEngine<'_>,
        ops: &[OperationSpec],
    ) -> GeneratorResult<Vec<RenderedOperation>> {
        ops.iter().map(|op| render_operation(expander, engine, op)).collect()
    }

    /// Run the pipeline and return the report without writing anything.
    ///
    /// # Errors
    ///
    /// Any fatal stage error.
    pub fn dry_run(&self) -> GeneratorResult<GenerationReport> {
        let ops = self.extract()?;
        let surface = self.build_surface(&ops)?;
        let artifacts = Assembler::new(&self.catalog, &self.config).assemble(&surface);
        Ok(summarize(ops.len(), &surface, &artifacts, true))
    }
}

fn summarize(
    operations: usize,
    surface: &Surface,
    artifacts: &[Artifact],
    dry_run: bool,
) -> GenerationReport {
    GenerationReport {
        operations,
        functions: surface.function_count(),
        files: artifacts.iter().map(WrittenFile::from).collect(),
        dry_run,
    }
}

fn render_operation(
    expander: &Expander<'_>,
    engine: &TemplateEngine<'_>,
    spec: &OperationSpec,
) -> GeneratorResult<RenderedOperation> {
    let signatures = expander.expand(spec)?;
    let functions = engine.render_all(&signatures)?;
    debug!(operation = spec.name(), functions = functions.len(), "rendered operation");
    Ok(RenderedOperation {
        spec: spec.clone(),
        functions,
    })
}

impl<C: CatalogSource, S: ArtifactSink> CodeGenerator for GeneratorService<C, S> {
    #[instrument(skip(self))]
    fn generate(&self) -> GeneratorResult<GenerationReport> {
        let ops = self.extract()?;
        let surface = self.build_surface(&ops)?;
        let artifacts = Assembler::new(&self.catalog, &self.config).assemble(&surface);

        for artifact in &artifacts {
            self.sink.write(artifact)?;
        }

        let report = summarize(ops.len(), &surface, &artifacts, false);
        info!(
            files = report.files.len(),
            bytes = report.total_bytes(),
            "generation complete"
        );
        Ok(report)
    }

    fn plan(&self) -> GeneratorResult<Vec<Artifact>> {
        let ops = self.extract()?;
        let surface = self.build_surface(&ops)?;
        Ok(Assembler::new(&self.catalog, &self.config).assemble(&surface))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryCatalog, InMemorySink};
    use crate::domain::operation::InputKind;
    use crate::errors::{CatalogError, ConfigError};

    const CATALOG: &str = r#"
func Add(utype byte, lhsHash []byte, rhsHash []byte, tp *TxParams) ([]byte, uint64, error) {
	return nil, 0, nil
}

// Return type: ebool
func Lt(utype byte, lhsHash []byte, rhsHash []byte, tp *TxParams) ([]byte, uint64, error) {
	return nil, 0, nil
}

func SealOutput(utype byte, ctHash []byte, pk []byte, tp *TxParams) (string, uint64, error) {
	return "", 0, nil
}
"#;

    fn service(
        text: &str,
        config: GeneratorConfig,
    ) -> (GeneratorService<InMemoryCatalog, InMemorySink>, Arc<InMemorySink>) {
        let sink = Arc::new(InMemorySink::new());
        let service =
            GeneratorService::new(Arc::new(InMemoryCatalog::new(text)), sink.clone(), config)
                .unwrap();
        (service, sink)
    }

    /// Extractor that always returns the same duplicated operation.
    struct Duplicating;

    impl OperationExtractor for Duplicating {
        fn extract(&self, _text: &str) -> Result<Vec<OperationSpec>, CatalogError> {
            let add = OperationSpec::new("add", vec![InputKind::Encrypted, InputKind::Encrypted])?;
            Ok(vec![add.clone(), add])
        }
    }

    #[test]
    fn test_generate_writes_every_artifact() {
        let (service, sink) = service(CATALOG, GeneratorConfig::default());
        let report = service.generate().unwrap();

        assert_eq!(report.operations, 3);
        assert!(!report.dry_run);
        assert_eq!(sink.len(), report.files.len());
        assert!(sink.get("FHE.sol").unwrap().contains("library FHE {"));
        assert!(sink.get("tests/LtTest.sol").is_some());
        assert!(sink.get("tests/SealoutputTest.sol").is_some());
        assert!(sink.get("abis.ts").is_some());
        assert_eq!(report.total_bytes(), report.files.iter().map(|f| f.bytes).sum::<usize>());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let (service, sink) = service(CATALOG, GeneratorConfig::default());
        let report = service.dry_run().unwrap();
        assert!(report.dry_run);
        assert!(!report.files.is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (parallel, _) = service(CATALOG, GeneratorConfig::default());
        let (sequential, _) = service(CATALOG, GeneratorConfig::default().with_parallel(false));
        assert_eq!(parallel.plan().unwrap(), sequential.plan().unwrap());
    }

    #[test]
    fn test_empty_catalog_fails_before_writing() {
        let (service, sink) = service("package fheos\n", GeneratorConfig::default());
        let err = service.generate().unwrap_err();
        assert!(matches!(err, GeneratorError::Catalog(CatalogError::NoOperations)));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_duplicate_overloads_are_fatal() {
        let (service, sink) = service(CATALOG, GeneratorConfig::default());
        let err = service.with_extractor(Duplicating).generate().unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::DuplicateSignature { ref symbol, .. } if symbol == "add"
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GeneratorConfig::default();
        config.library_file = String::new();
        let result = GeneratorService::new(
            Arc::new(InMemoryCatalog::new(CATALOG)),
            Arc::new(InMemorySink::new()),
            config,
        );
        assert!(matches!(result, Err(GeneratorError::Config(ConfigError::Invalid(_)))));
    }

    #[test]
    fn test_typed_seal_toggle() {
        let (service, _) = service(CATALOG, GeneratorConfig::default().with_typed_seal(false));
        let ops = service.extract().unwrap();
        let surface = service.build_surface(&ops).unwrap();
        assert!(!surface
            .signatures()
            .any(|sig| sig.symbol == crate::domain::catalog::SEAL_TYPED_SYMBOL));
    }
}
