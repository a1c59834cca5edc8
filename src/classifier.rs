//! Classifies invocations as Moq Setup/Verify/Callback/Returns calls.
//!
//! Every query is a pure function of the call and the model's current
//! answers. Malformed input (no reference, wrong argument count, broken
//! reference) is never an error: it is simply "no match".

use tracing::trace;

use crate::catalog::{Category, MOQ_CATALOG, SignatureCatalog};
use crate::semantic::{CallExpression, Resolution, SemanticModel};

pub struct CallClassifier<'c, M> {
    model: M,
    catalog: &'c SignatureCatalog,
}

impl<M: SemanticModel> CallClassifier<'static, M> {
    /// Classifier over the built-in Moq catalog.
    pub fn new(model: M) -> Self {
        Self::with_catalog(model, &MOQ_CATALOG)
    }
}

impl<'c, M: SemanticModel> CallClassifier<'c, M> {
    pub fn with_catalog(model: M, catalog: &'c SignatureCatalog) -> Self {
        Self { model, catalog }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// The single category of `call`, checked in [`Category::ALL`] order.
    pub fn classify(&self, call: Option<&CallExpression>) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|&category| self.is_category(call, category))
    }

    pub fn is_setup(&self, call: Option<&CallExpression>) -> bool {
        self.is_category(call, Category::Setup)
    }

    pub fn is_verify(&self, call: Option<&CallExpression>) -> bool {
        self.is_category(call, Category::Verify)
    }

    pub fn is_callback(&self, call: Option<&CallExpression>) -> bool {
        self.is_category(call, Category::Callback)
    }

    pub fn is_return(&self, call: Option<&CallExpression>) -> bool {
        self.is_category(call, Category::Return)
    }

    /// Whether the callee of `call` is a known signature of `category`.
    ///
    /// An ambiguous callee matches when any one of its candidates does.
    pub fn is_category(&self, call: Option<&CallExpression>, category: Category) -> bool {
        let Some(reference) = call.and_then(|c| c.reference.as_ref()) else {
            return false;
        };

        match self.model.resolve(reference) {
            Resolution::Resolved(symbol) => self.symbol_matches(&symbol, category),
            Resolution::Ambiguous(candidates) => {
                candidates.iter().any(|symbol| self.symbol_matches(symbol, category))
            }
            Resolution::Unresolved => {
                trace!(name = %reference.name, %category, "callee unresolved");
                false
            }
        }
    }

    fn symbol_matches(&self, symbol: &M::Symbol, category: Category) -> bool {
        self.model
            .canonical_signature(symbol)
            .is_some_and(|signature| self.catalog.is_known_signature(category, &signature))
    }

    /// The member mocked by a Setup call: `DoThing` in `mock.Setup(m => m.DoThing())`.
    ///
    /// Unlike classification, the inner reference must resolve to exactly
    /// one member.
    pub fn mocked_method_from_setup(&self, call: Option<&CallExpression>) -> Option<M::Symbol> {
        let call = call?;
        if !self.is_setup(Some(call)) {
            return None;
        }

        if call.argument_count() != 1 {
            trace!(line = call.line, args = call.argument_count(), "setup call does not take a single argument");
            return None;
        }

        let Some(lambda) = call.arguments[0].lambda() else {
            trace!(line = call.line, "setup argument is not a lambda");
            return None;
        };

        let inner = lambda.body_invocation()?;
        let reference = inner.reference.as_ref()?;

        match self.model.resolve(reference) {
            Resolution::Resolved(symbol) => Some(symbol),
            other => {
                trace!(
                    name = %reference.name,
                    candidates = other.candidates().len(),
                    "mocked member did not resolve uniquely"
                );
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
