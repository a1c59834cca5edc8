//! # moq-complete — Moq fluent-call classification
//!
//! Recognizes which calls in C# test code are Moq `Setup`, `Verify`,
//! `Callback` or `Returns` calls by comparing the resolved callee's canonical
//! signature with a fixed catalog, and extracts the member a Setup call mocks.
//!
//! ## Library usage
//!
//! The classifier works over any [`SemanticModel`]. [`csharp::CSharpModel`]
//! is a tree-sitter backed model for plain source files:
//!
//! ```no_run
//! use moq_complete::{CallClassifier, csharp::CSharpModel};
//!
//! let model = CSharpModel::from_source("FooTests.cs", "class FooTests { }")?;
//! let classifier = CallClassifier::new(&model);
//! for site in model.call_sites() {
//!     println!("{:?}", classifier.classify(Some(&site.call)));
//! }
//! # Ok::<(), moq_complete::MoqError>(())
//! ```

pub mod catalog;
pub mod classifier;
pub mod csharp;
pub mod error;
pub mod hints;
pub mod semantic;

pub use catalog::{Category, MOQ_CATALOG, SignatureCatalog, SignatureRule};
pub use classifier::CallClassifier;
pub use error::MoqError;
pub use hints::{CompletionHint, HintKind, ParameterHint, ParameterSource, completion_hint};
pub use semantic::{Argument, CallExpression, Expression, LambdaBody, LambdaExpression, Reference, Resolution, SemanticModel};
