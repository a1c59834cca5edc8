//! Completion text derived from the mocked member of a Setup call.
//!
//! Inside `mock.Setup(m => m.Send(|))` an editor offers one `It.IsAny<T>()`
//! matcher per parameter of `Send`. Inside `.Callback(|)` or `.Returns(|)`
//! chained after that Setup it offers a lambda with the same parameters.

use serde::Serialize;

use crate::catalog::Category;
use crate::classifier::CallClassifier;
use crate::semantic::{CallExpression, SemanticModel};

/// One declared parameter of a mocked member, type as written in source.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ParameterHint {
    pub type_name: String,
    pub name: String,
}

/// A [`SemanticModel`] that can also list a member's parameters.
pub trait ParameterSource: SemanticModel {
    fn parameters(&self, symbol: &Self::Symbol) -> Vec<ParameterHint>;
}

impl<M: ParameterSource + ?Sized> ParameterSource for &M {
    fn parameters(&self, symbol: &Self::Symbol) -> Vec<ParameterHint> {
        (**self).parameters(symbol)
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HintKind {
    /// `It.IsAny<string>(), It.IsAny<int>()`
    Matchers,
    /// `(string name, int count) => `
    Lambda,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CompletionHint {
    pub kind: HintKind,
    pub text: String,
}

/// Completion for `call`, if it is a Setup, Callback or Returns call whose
/// mocked member resolves. Verify calls get none.
pub fn completion_hint<M: ParameterSource>(
    classifier: &CallClassifier<'_, M>,
    call: &CallExpression,
) -> Option<CompletionHint> {
    match classifier.classify(Some(call))? {
        Category::Setup => {
            let parameters = mocked_parameters(classifier, call)?;
            if parameters.is_empty() {
                return None;
            }
            Some(CompletionHint { kind: HintKind::Matchers, text: matcher_list(&parameters) })
        }
        Category::Callback | Category::Return => {
            let setup = originating_setup(classifier, call)?;
            let parameters = mocked_parameters(classifier, setup)?;
            Some(CompletionHint { kind: HintKind::Lambda, text: lambda_prefix(&parameters) })
        }
        Category::Verify => None,
    }
}

fn mocked_parameters<M: ParameterSource>(
    classifier: &CallClassifier<'_, M>,
    setup: &CallExpression,
) -> Option<Vec<ParameterHint>> {
    let symbol = classifier.mocked_method_from_setup(Some(setup))?;
    Some(classifier.model().parameters(&symbol))
}

/// Walks the qualifier chain of a fluent call back to its Setup call:
/// `mock.Setup(...).Callback(...).Returns(...)` from `Returns` to `Setup`.
pub fn originating_setup<'e, M: SemanticModel>(
    classifier: &CallClassifier<'_, M>,
    call: &'e CallExpression,
) -> Option<&'e CallExpression> {
    let mut current = call.receiver_call();
    while let Some(candidate) = current {
        if classifier.is_setup(Some(candidate)) {
            return Some(candidate);
        }
        current = candidate.receiver_call();
    }
    None
}

pub fn matcher_list(parameters: &[ParameterHint]) -> String {
    parameters
        .iter()
        .map(|p| format!("It.IsAny<{}>()", p.type_name))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn lambda_prefix(parameters: &[ParameterHint]) -> String {
    let list = parameters
        .iter()
        .map(|p| format!("{} {}", p.type_name, p.name))
        .collect::<Vec<_>>()
        .join(", ");
    format!("({}) => ", list)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hint(type_name: &str, name: &str) -> ParameterHint {
        ParameterHint { type_name: type_name.to_string(), name: name.to_string() }
    }

    #[test]
    fn test_matcher_list() {
        let parameters = [hint("string", "name"), hint("List<int>", "ids")];
        assert_eq!(matcher_list(&parameters), "It.IsAny<string>(), It.IsAny<List<int>>()");
    }

    #[test]
    fn test_lambda_prefix() {
        let parameters = [hint("string", "name"), hint("int", "count")];
        assert_eq!(lambda_prefix(&parameters), "(string name, int count) => ");
        assert_eq!(lambda_prefix(&[]), "() => ");
    }
}
