//! Known Moq API signatures, keyed by category.

use serde::Serialize;

// ─── Category ────────────────────────────────────────────────────────

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Setup,
    Verify,
    Callback,
    Return,
}

impl Category {
    /// Classification order: a call takes the first category that matches.
    pub const ALL: [Category; 4] = [Self::Setup, Self::Verify, Self::Callback, Self::Return];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Verify => "verify",
            Self::Callback => "callback",
            Self::Return => "return",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "setup" => Ok(Self::Setup),
            "verify" => Ok(Self::Verify),
            "callback" => Ok(Self::Callback),
            "return" | "returns" => Ok(Self::Return),
            other => Err(format!("Unknown category: '{}'", other)),
        }
    }
}

// ─── Catalog ─────────────────────────────────────────────────────────

/// How a catalog entry is compared with a canonical signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureRule {
    Exact(&'static str),
    /// `Returns` and `Callback` have many generic-arity overloads sharing a
    /// name prefix; they are matched on the prefix alone.
    Prefix(&'static str),
}

impl SignatureRule {
    pub fn matches(&self, signature: &str) -> bool {
        match self {
            Self::Exact(expected) => signature == *expected,
            Self::Prefix(prefix) => signature.starts_with(prefix),
        }
    }
}

#[derive(Debug)]
pub struct SignatureCatalog {
    setup: &'static [SignatureRule],
    verify: &'static [SignatureRule],
    callback: &'static [SignatureRule],
    returns: &'static [SignatureRule],
}

impl SignatureCatalog {
    pub const fn new(
        setup: &'static [SignatureRule],
        verify: &'static [SignatureRule],
        callback: &'static [SignatureRule],
        returns: &'static [SignatureRule],
    ) -> Self {
        Self { setup, verify, callback, returns }
    }

    pub fn rules(&self, category: Category) -> &'static [SignatureRule] {
        match category {
            Category::Setup => self.setup,
            Category::Verify => self.verify,
            Category::Callback => self.callback,
            Category::Return => self.returns,
        }
    }

    pub fn is_known_signature(&self, category: Category, signature: &str) -> bool {
        self.rules(category).iter().any(|rule| rule.matches(signature))
    }
}

pub const SETUP_ACTION: &str = "Method:Moq.Mock`1.Setup(System.Linq.Expressions.Expression`1[TDelegate -> System.Action`1[T -> T]] expression)";
pub const SETUP_FUNC: &str = "Method:Moq.Mock`1.Setup(System.Linq.Expressions.Expression`1[TDelegate -> System.Func`2[T -> T, TResult -> TResult]] expression)";
pub const VERIFY_ACTION: &str = "Method:Moq.Mock`1.Verify(System.Linq.Expressions.Expression`1[TDelegate -> System.Action`1[T -> T]] expression)";
pub const VERIFY_FUNC: &str = "Method:Moq.Mock`1.Verify(System.Linq.Expressions.Expression`1[TDelegate -> System.Func`2[T -> T, TResult -> TResult]] expression)";

/// The Moq signatures recognized by [`crate::CallClassifier`].
pub static MOQ_CATALOG: SignatureCatalog = SignatureCatalog::new(
    &[SignatureRule::Exact(SETUP_ACTION), SignatureRule::Exact(SETUP_FUNC)],
    &[SignatureRule::Exact(VERIFY_ACTION), SignatureRule::Exact(VERIFY_FUNC)],
    &[
        SignatureRule::Prefix("Method:Moq.Language.ICallback.Callback(System.Action"),
        SignatureRule::Prefix("Method:Moq.Language.ICallback`2.Callback(System.Action"),
    ],
    &[
        SignatureRule::Prefix("Method:Moq.Language.IReturns`2.Returns"),
        SignatureRule::Prefix("Method:Moq.Language.IReturns`1.Returns"),
    ],
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_overloads_are_exact() {
        assert!(MOQ_CATALOG.is_known_signature(Category::Setup, SETUP_ACTION));
        assert!(MOQ_CATALOG.is_known_signature(Category::Setup, SETUP_FUNC));
        let trailing = format!("{} ", SETUP_ACTION);
        assert!(!MOQ_CATALOG.is_known_signature(Category::Setup, &trailing));
        assert!(!MOQ_CATALOG.is_known_signature(Category::Setup, "Method:Moq.Mock`1.Setup"));
    }

    #[test]
    fn test_verify_with_times_is_not_listed() {
        let with_times = "Method:Moq.Mock`1.Verify(System.Linq.Expressions.Expression`1[TDelegate -> System.Action`1[T -> T]] expression, Moq.Times times)";
        assert!(!MOQ_CATALOG.is_known_signature(Category::Verify, with_times));
        assert!(MOQ_CATALOG.is_known_signature(Category::Verify, VERIFY_FUNC));
    }

    #[test]
    fn test_returns_matches_by_prefix() {
        assert!(MOQ_CATALOG.is_known_signature(
            Category::Return,
            "Method:Moq.Language.IReturns`2.Returns(TResult value)"
        ));
        assert!(MOQ_CATALOG.is_known_signature(
            Category::Return,
            "Method:Moq.Language.IReturns`2.Returns(System.Func`1[TResult -> TResult] valueFunction)"
        ));
        assert!(MOQ_CATALOG.is_known_signature(
            Category::Return,
            "Method:Moq.Language.IReturns`1.Returns(System.Int32 value)"
        ));
        assert!(!MOQ_CATALOG.is_known_signature(
            Category::Return,
            "Method:Moq.Language.IReturnsThrows`2.Returns(TResult value)"
        ));
    }

    #[test]
    fn test_callback_requires_action_parameter() {
        assert!(MOQ_CATALOG.is_known_signature(
            Category::Callback,
            "Method:Moq.Language.ICallback.Callback(System.Action action)"
        ));
        assert!(MOQ_CATALOG.is_known_signature(
            Category::Callback,
            "Method:Moq.Language.ICallback`2.Callback(System.Action`2[T1 -> T1, T2 -> T2] action)"
        ));
        assert!(!MOQ_CATALOG.is_known_signature(
            Category::Callback,
            "Method:Moq.Language.ICallback.Callback(System.Delegate callback)"
        ));
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Setup".parse::<Category>(), Ok(Category::Setup));
        assert_eq!("returns".parse::<Category>(), Ok(Category::Return));
        assert!("throws".parse::<Category>().is_err());
    }
}
