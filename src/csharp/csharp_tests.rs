//! End-to-end tests: C# source -> model -> classifier.

use super::*;
use crate::catalog::{Category, SETUP_ACTION, SETUP_FUNC, VERIFY_ACTION, VERIFY_FUNC};
use crate::classifier::CallClassifier;
use crate::hints::{HintKind, completion_hint};
use crate::semantic::Expression;

const SERVICE_TESTS: &str = r#"
using System;
using Moq;

namespace Tests
{
    public interface IService
    {
        void Send(string name, int count);
        string Describe(int id);
        int Count { get; }
    }

    public class ServiceTests
    {
        private readonly Mock<IService> _mock = new Mock<IService>();

        public void Run()
        {
            var mock = new Mock<IService>();
            mock.Setup(m => m.Send(It.IsAny<string>(), It.IsAny<int>())).Callback(() => { });
            mock.Setup(m => m.Describe(It.IsAny<int>())).Returns("x");
            mock.Verify(m => m.Send("a", 1));
            mock.Verify(m => m.Send("a", 1), Times.Once());
            mock.Verify(m => m.Describe(2));
            _mock.Setup(m => m.Describe(1)).Returns(() => "y");
            mock.SetupGet(m => m.Count).Returns(3);
            mock.Setup(m => m.Missing());
            other.Setup(m => m.Send("a", 1));
            Helper();
        }

        private void Helper() { }
    }
}
"#;

fn model() -> CSharpModel {
    CSharpModel::from_source("ServiceTests.cs", SERVICE_TESTS).unwrap()
}

fn line_containing(source: &str, needle: &str) -> u32 {
    source.lines().position(|l| l.contains(needle)).unwrap() as u32 + 1
}

/// Calls to `name` in source order.
fn calls_named<'m>(model: &'m CSharpModel, name: &str) -> Vec<&'m CallExpression> {
    model
        .call_sites()
        .iter()
        .map(|s| &s.call)
        .filter(|c| c.reference.as_ref().is_some_and(|r| r.name == name))
        .collect()
}

fn call_on_line<'m>(model: &'m CSharpModel, name: &str, needle: &str) -> &'m CallExpression {
    let line = line_containing(SERVICE_TESTS, needle);
    calls_named(model, name).into_iter().find(|c| c.line == line).unwrap()
}

fn signature_of(model: &CSharpModel, call: &CallExpression) -> Option<String> {
    match model.resolve(call.reference.as_ref()?) {
        Resolution::Resolved(id) => model.canonical_signature(&id),
        _ => None,
    }
}

// ─── Stub ────────────────────────────────────────────────────────────

#[test]
fn test_stub_renders_catalog_signatures() {
    let model = CSharpModel::build(&[]).unwrap();
    let table = model.symbols();
    let mock = table.find_qualified("Moq", "Mock", 1).unwrap();
    let signatures: Vec<String> = table
        .ty(mock)
        .members
        .iter()
        .filter_map(|&id| table.canonical_signature(id))
        .collect();

    for expected in [SETUP_ACTION, SETUP_FUNC, VERIFY_ACTION, VERIFY_FUNC] {
        assert!(signatures.iter().any(|s| s == expected), "missing {}", expected);
    }
    assert!(model.call_sites().is_empty());
}

#[test]
fn test_stub_fluent_signatures() {
    let model = CSharpModel::build(&[]).unwrap();
    let table = model.symbols();
    let returns = table.find_qualified("Moq.Language", "IReturns", 2).unwrap();
    let signatures: Vec<String> = table
        .ty(returns)
        .members
        .iter()
        .filter_map(|&id| table.canonical_signature(id))
        .collect();
    assert!(signatures.contains(&"Method:Moq.Language.IReturns`2.Returns(TResult value)".to_string()));
    assert!(signatures.contains(
        &"Method:Moq.Language.IReturns`2.Returns(System.Func`1[TResult -> TResult] valueFunction)".to_string()
    ));
}

// ─── Resolution ──────────────────────────────────────────────────────

#[test]
fn test_setup_overload_follows_lambda_body() {
    let model = model();
    let void_setup = call_on_line(&model, "Setup", "m.Send(It.IsAny<string>()");
    let value_setup = call_on_line(&model, "Setup", "m.Describe(It.IsAny<int>())");
    assert_eq!(signature_of(&model, void_setup).as_deref(), Some(SETUP_ACTION));
    assert_eq!(signature_of(&model, value_setup).as_deref(), Some(SETUP_FUNC));
}

#[test]
fn test_fluent_chain_resolves() {
    let model = model();
    let callback = call_on_line(&model, "Callback", "Callback(() => { })");
    assert_eq!(
        signature_of(&model, callback).as_deref(),
        Some("Method:Moq.Language.ICallback.Callback(System.Action action)")
    );

    let returns_value = call_on_line(&model, "Returns", "Returns(\"x\")");
    assert_eq!(
        signature_of(&model, returns_value).as_deref(),
        Some("Method:Moq.Language.IReturns`2.Returns(TResult value)")
    );

    let returns_func = call_on_line(&model, "Returns", "Returns(() => \"y\")");
    assert_eq!(
        signature_of(&model, returns_func).as_deref(),
        Some("Method:Moq.Language.IReturns`2.Returns(System.Func`1[TResult -> TResult] valueFunction)")
    );
}

#[test]
fn test_field_receiver_resolves() {
    let model = model();
    let setup = call_on_line(&model, "Setup", "_mock.Setup");
    assert_eq!(signature_of(&model, setup).as_deref(), Some(SETUP_FUNC));
}

#[test]
fn test_unknown_body_is_ambiguous() {
    let model = model();
    let setup = call_on_line(&model, "Setup", "m.Missing()");
    let resolution = model.resolve(setup.reference.as_ref().unwrap());
    assert!(matches!(resolution, Resolution::Ambiguous(ref c) if c.len() == 2));
}

#[test]
fn test_undeclared_receiver_is_unresolved() {
    let model = model();
    let setup = call_on_line(&model, "Setup", "other.Setup");
    assert_eq!(model.resolve(setup.reference.as_ref().unwrap()), Resolution::Unresolved);
}

// ─── Classification ──────────────────────────────────────────────────

#[test]
fn test_classifies_every_fluent_call() {
    let model = model();
    let classifier = CallClassifier::new(&model);
    let classify = |name: &str, needle: &str| classifier.classify(Some(call_on_line(&model, name, needle)));

    assert_eq!(classify("Setup", "m.Send(It.IsAny<string>()"), Some(Category::Setup));
    assert_eq!(classify("Callback", "Callback(() => { })"), Some(Category::Callback));
    assert_eq!(classify("Setup", "m.Describe(It.IsAny<int>())"), Some(Category::Setup));
    assert_eq!(classify("Returns", "Returns(\"x\")"), Some(Category::Return));
    assert_eq!(classify("Verify", "mock.Verify(m => m.Send(\"a\", 1));"), Some(Category::Verify));
    assert_eq!(classify("Verify", "m.Describe(2)"), Some(Category::Verify));
    assert_eq!(classify("Returns", "Returns(() => \"y\")"), Some(Category::Return));
    assert_eq!(classify("Helper", "Helper();"), None);
    assert_eq!(classify("IsAny", "m.Send(It.IsAny<string>()"), None);
}

#[test]
fn test_verify_with_times_is_not_classified() {
    let model = model();
    let classifier = CallClassifier::new(&model);
    let verify = call_on_line(&model, "Verify", "Times.Once()");
    assert!(!classifier.is_verify(Some(verify)));
    assert!(signature_of(&model, verify).unwrap().ends_with("Moq.Times times)"));
}

#[test]
fn test_setup_get_is_not_setup() {
    let model = model();
    let classifier = CallClassifier::new(&model);
    assert_eq!(classifier.classify(Some(call_on_line(&model, "SetupGet", "SetupGet"))), None);
    assert_eq!(classifier.classify(Some(call_on_line(&model, "Returns", "Returns(3)"))), None);
}

#[test]
fn test_ambiguous_setup_still_classifies() {
    let model = model();
    let classifier = CallClassifier::new(&model);
    let setup = call_on_line(&model, "Setup", "m.Missing()");
    assert!(classifier.is_setup(Some(setup)));
    assert_eq!(classifier.mocked_method_from_setup(Some(setup)), None);
}

#[test]
fn test_mocked_member() {
    let model = model();
    let classifier = CallClassifier::new(&model);
    let setup = call_on_line(&model, "Setup", "m.Send(It.IsAny<string>()");
    let mocked = classifier.mocked_method_from_setup(Some(setup)).unwrap();
    assert_eq!(model.display_name(mocked).as_deref(), Some("Tests.IService.Send"));
    assert_eq!(model.member(mocked).unwrap().kind, MemberKind::Method);

    let verify = call_on_line(&model, "Verify", "m.Describe(2)");
    assert_eq!(classifier.mocked_method_from_setup(Some(verify)), None);
}

// ─── Hints ───────────────────────────────────────────────────────────

#[test]
fn test_setup_hint_lists_matchers() {
    let model = model();
    let classifier = CallClassifier::new(&model);
    let setup = call_on_line(&model, "Setup", "m.Send(It.IsAny<string>()");
    let hint = completion_hint(&classifier, setup).unwrap();
    assert_eq!(hint.kind, HintKind::Matchers);
    assert_eq!(hint.text, "It.IsAny<string>(), It.IsAny<int>()");
}

#[test]
fn test_callback_and_returns_hints_use_setup_parameters() {
    let model = model();
    let classifier = CallClassifier::new(&model);

    let callback = call_on_line(&model, "Callback", "Callback(() => { })");
    let hint = completion_hint(&classifier, callback).unwrap();
    assert_eq!(hint.kind, HintKind::Lambda);
    assert_eq!(hint.text, "(string name, int count) => ");

    let returns = call_on_line(&model, "Returns", "Returns(\"x\")");
    assert_eq!(completion_hint(&classifier, returns).unwrap().text, "(int id) => ");

    let verify = call_on_line(&model, "Verify", "m.Describe(2)");
    assert_eq!(completion_hint(&classifier, verify), None);
}

// ─── Undeclared return types ─────────────────────────────────────────

const STORE_TESTS: &str = r#"
using System.Collections.Generic;
using System.Threading.Tasks;
using Moq;

namespace Shop
{
    public interface IStore
    {
        Task<int> GetAsync(string key);
        List<string> Names { get; }
    }

    public class StoreTests
    {
        public void Run()
        {
            var store = new Mock<IStore>();
            store.Setup(s => s.GetAsync(It.IsAny<string>())).Returns(Task.FromResult(1));
            store.Setup(s => s.GetAsync("k")).Callback(() => { });
            store.Setup(s => s.Names).Returns(() => null);
            var joined = string.Join(",", store.Object.Names);
        }
    }
}
"#;

fn store_call<'m>(model: &'m CSharpModel, name: &str, needle: &str) -> &'m CallExpression {
    let line = line_containing(STORE_TESTS, needle);
    calls_named(model, name).into_iter().find(|c| c.line == line).unwrap()
}

#[test]
fn test_setup_of_undeclared_return_type_prefers_func() {
    let model = CSharpModel::from_source("StoreTests.cs", STORE_TESTS).unwrap();
    let method = store_call(&model, "Setup", "It.IsAny<string>()");
    let property = store_call(&model, "Setup", "s.Names");
    assert_eq!(signature_of(&model, method).as_deref(), Some(SETUP_FUNC));
    assert_eq!(signature_of(&model, property).as_deref(), Some(SETUP_FUNC));
}

#[test]
fn test_chain_after_undeclared_return_type_classifies() {
    let model = CSharpModel::from_source("StoreTests.cs", STORE_TESTS).unwrap();
    let classifier = CallClassifier::new(&model);

    let returns = store_call(&model, "Returns", "Task.FromResult(1)");
    assert!(classifier.is_return(Some(returns)));
    assert_eq!(completion_hint(&classifier, returns).unwrap().text, "(string key) => ");

    let callback = store_call(&model, "Callback", "Callback(() => { })");
    assert_eq!(
        signature_of(&model, callback).as_deref(),
        Some("Method:Moq.Language.ICallback`2.Callback(System.Action action)")
    );
    assert!(classifier.is_callback(Some(callback)));

    let returns_func = store_call(&model, "Returns", "Returns(() => null)");
    assert_eq!(
        signature_of(&model, returns_func).as_deref(),
        Some("Method:Moq.Language.IReturns`2.Returns(System.Func`1[TResult -> TResult] valueFunction)")
    );
}

#[test]
fn test_predefined_type_receiver() {
    let model = CSharpModel::from_source("StoreTests.cs", STORE_TESTS).unwrap();
    let join = store_call(&model, "Join", "string.Join");
    assert_eq!(join.receiver.as_deref(), Some(&Expression::Other("string".to_string())));
    assert_eq!(model.resolve(join.reference.as_ref().unwrap()), Resolution::Unresolved);
}

// ─── Multiple files ──────────────────────────────────────────────────

#[test]
fn test_types_resolve_across_files() {
    let service = SourceFile::new(
        "IRepository.cs",
        "namespace App.Data;\n\npublic interface IRepository\n{\n    bool Save(string key, byte[] payload);\n}\n",
    );
    let tests = SourceFile::new(
        "RepositoryTests.cs",
        "using App.Data;\nusing Moq;\n\nnamespace App.Tests;\n\npublic class RepositoryTests\n{\n    public void Saves()\n    {\n        Mock<IRepository> repo = new Mock<IRepository>();\n        repo.Setup(r => r.Save(\"k\", null)).Returns(true);\n    }\n}\n",
    );
    let model = CSharpModel::build(&[service, tests]).unwrap();
    let classifier = CallClassifier::new(&model);

    let setup = calls_named(&model, "Setup")[0];
    assert_eq!(classifier.classify(Some(setup)), Some(Category::Setup));
    assert_eq!(setup.line, 11);
    let site = model.call_sites().iter().find(|s| std::ptr::eq(&s.call, setup)).unwrap();
    assert_eq!(model.file_path(site.file), Some(Path::new("RepositoryTests.cs")));

    let mocked = classifier.mocked_method_from_setup(Some(setup)).unwrap();
    assert_eq!(model.display_name(mocked).as_deref(), Some("App.Data.IRepository.Save"));

    let returns = calls_named(&model, "Returns")[0];
    assert!(classifier.is_return(Some(returns)));
    assert_eq!(completion_hint(&classifier, returns).unwrap().text, "(string key, byte[] payload) => ");
}

#[test]
fn test_read_lossy_reports_invalid_utf8() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Bad.cs");
    std::fs::write(&path, b"class Bad { } // \xff").unwrap();
    let (source, lossy) = SourceFile::read_lossy(&path).unwrap();
    assert!(lossy);
    assert!(source.text.starts_with("class Bad"));
}

#[test]
fn test_model_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CSharpModel>();
}
