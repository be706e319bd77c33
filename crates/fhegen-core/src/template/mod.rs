//! # Template Engine
//!
//! Renders each [`ConcreteSignature`] into a Solidity function. Rendering is
//! two steps: [`shape::plan`] picks the body template, [`render`] writes it.

pub mod render;
pub mod shape;

pub use shape::{BodyShape, CastSource, FunctionRef, Output};

use crate::domain::catalog::Catalog;
use crate::domain::signature::ConcreteSignature;
use crate::errors::TemplateError;
use tracing::trace;

/// One rendered library function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFunction {
    /// Signature the function implements.
    pub signature: ConcreteSignature,
    /// Body template that produced it.
    pub shape: BodyShape,
    /// NatSpec block.
    pub doc: String,
    /// Header and body.
    pub code: String,
}

impl GeneratedFunction {
    /// Documentation followed by code.
    #[must_use]
    pub fn text(&self) -> String {
        format!("{}{}", self.doc, self.code)
    }

    /// Parameter names in input order.
    #[must_use]
    pub fn param_names(&self) -> Vec<&'static str> {
        self.shape.param_names()
    }
}

/// Renders signatures against a [`Catalog`].
#[derive(Debug, Clone, Copy)]
pub struct TemplateEngine<'a> {
    catalog: &'a Catalog,
}

impl<'a> TemplateEngine<'a> {
    /// Create an engine over `catalog`.
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Render one signature.
    ///
    /// # Errors
    ///
    /// Propagates [`TemplateError`] from shape planning.
    pub fn render(&self, sig: &ConcreteSignature) -> Result<GeneratedFunction, TemplateError> {
        let shape = shape::plan(sig, self.catalog)?;
        trace!(signature = %sig, shape = shape.label(), "rendering");
        Ok(GeneratedFunction {
            doc: render::doc(sig, &shape),
            code: render::function(sig, &shape),
            signature: sig.clone(),
            shape,
        })
    }

    /// Render signatures in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// The first [`TemplateError`] encountered.
    pub fn render_all(
        &self,
        sigs: &[ConcreteSignature],
    ) -> Result<Vec<GeneratedFunction>, TemplateError> {
        sigs.iter().map(|sig| self.render(sig)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::operation::{InputKind, OperationSpec};
    use crate::expander::Expander;

    #[test]
    fn test_render_expanded_operation() {
        let catalog = Catalog::standard();
        let op = OperationSpec::new("mul", vec![InputKind::Encrypted, InputKind::Encrypted]).unwrap();
        let sigs = Expander::new(&catalog).expand(&op).unwrap();
        let functions = TemplateEngine::new(&catalog).render_all(&sigs).unwrap();

        assert_eq!(functions.len(), sigs.len());
        assert!(functions
            .iter()
            .all(|f| matches!(f.shape, BodyShape::Binary { .. })));
        assert!(functions[0].text().starts_with("    /// @notice"));
    }

    #[test]
    fn test_render_all_casts() {
        let catalog = Catalog::standard();
        let sigs = Expander::new(&catalog).expand_casts();
        let functions = TemplateEngine::new(&catalog).render_all(&sigs).unwrap();
        assert!(functions
            .iter()
            .all(|f| matches!(f.shape, BodyShape::Cast { .. })));
        assert!(functions
            .iter()
            .any(|f| f.code.contains("function asEaddress(address value) internal pure returns (eaddress)")));
    }
}
