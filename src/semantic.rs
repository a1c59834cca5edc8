//! Syntax shapes the classifier reads and the resolution service it consumes.
//!
//! The classifier never parses source text. A host (an editor, or the
//! tree-sitter backed [`crate::csharp::CSharpModel`]) lowers invocations into
//! [`CallExpression`] values and answers [`SemanticModel`] queries about the
//! references inside them.

use serde::Serialize;

// ─── Syntax ──────────────────────────────────────────────────────────

/// Opaque handle to a name occurrence that the semantic model can resolve.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    /// Model-assigned key, meaningful only to the model that issued it.
    pub id: u32,
    /// Referenced name as written, without type arguments.
    pub name: String,
}

/// An invocation: callee reference plus ordered arguments.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CallExpression {
    /// `None` when the callee is not a plain name (e.g. `getHandler()()`).
    pub reference: Option<Reference>,
    /// Qualifier of the callee: `mock` in `mock.Setup(...)`.
    pub receiver: Option<Box<Expression>>,
    pub arguments: Vec<Argument>,
    /// 1-based line of the invocation.
    pub line: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Argument {
    /// Argument value; `None` when the host could not lower it.
    pub value: Option<Expression>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum Expression {
    Invocation(CallExpression),
    Lambda(LambdaExpression),
    /// Any other expression, kept only as source text.
    Other(String),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LambdaExpression {
    pub parameters: Vec<String>,
    pub body: LambdaBody,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum LambdaBody {
    /// `x => expr`
    Expression(Box<Expression>),
    /// `x => { ... }`
    Block,
}

impl CallExpression {
    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    /// The receiver as an invocation, for walking fluent chains right to left.
    pub fn receiver_call(&self) -> Option<&CallExpression> {
        match self.receiver.as_deref() {
            Some(Expression::Invocation(call)) => Some(call),
            _ => None,
        }
    }
}

impl Argument {
    pub fn lambda(&self) -> Option<&LambdaExpression> {
        match &self.value {
            Some(Expression::Lambda(lambda)) => Some(lambda),
            _ => None,
        }
    }
}

impl LambdaExpression {
    /// The body when it is a single invocation expression.
    pub fn body_invocation(&self) -> Option<&CallExpression> {
        match &self.body {
            LambdaBody::Expression(expr) => match expr.as_ref() {
                Expression::Invocation(call) => Some(call),
                _ => None,
            },
            LambdaBody::Block => None,
        }
    }
}

// ─── Resolution service ──────────────────────────────────────────────

/// Outcome of resolving a [`Reference`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<S> {
    /// Exactly one declared member.
    Resolved(S),
    /// Several members fit and none could be preferred.
    Ambiguous(Vec<S>),
    /// Nothing fits, or the reference is broken.
    Unresolved,
}

impl<S> Resolution<S> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Every member the resolution names, in candidate order.
    pub fn candidates(&self) -> Vec<&S> {
        match self {
            Self::Resolved(symbol) => vec![symbol],
            Self::Ambiguous(symbols) => symbols.iter().collect(),
            Self::Unresolved => Vec::new(),
        }
    }
}

/// Host-provided symbol resolution.
///
/// Both queries must be side-effect free: the classifier may ask the same
/// question any number of times and expects the same answer.
pub trait SemanticModel {
    type Symbol: Clone;

    fn resolve(&self, reference: &Reference) -> Resolution<Self::Symbol>;

    /// Canonical signature key of a declared member, or `None` when the
    /// member cannot be rendered (it then never matches the catalog).
    fn canonical_signature(&self, symbol: &Self::Symbol) -> Option<String>;
}

impl<M: SemanticModel + ?Sized> SemanticModel for &M {
    type Symbol = M::Symbol;

    fn resolve(&self, reference: &Reference) -> Resolution<Self::Symbol> {
        (**self).resolve(reference)
    }

    fn canonical_signature(&self, symbol: &Self::Symbol) -> Option<String> {
        (**self).canonical_signature(symbol)
    }
}
