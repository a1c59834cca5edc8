//! Body pass: lowers every invocation in member bodies into a
//! [`CallExpression`] and resolves its callee.
//!
//! Expressions are typed just far enough to pick overloads: locals, fields,
//! properties, parameters, lambda parameters, literals, object creation and
//! invocation return types (with method type-argument inference).

use std::collections::HashMap;

use tracing::trace;
use tree_sitter::Node;

use super::declarations::{TypeScope, TypeSite, is_implicit_type, parse_type, parameters_of, predefined_type};
use super::symbols::*;
use super::syntax::*;
use super::CallSite;
use crate::semantic::{Argument, CallExpression, Expression, LambdaBody, LambdaExpression, Reference, Resolution};

type Locals = HashMap<String, TypeRef>;

/// Nodes that [`Lowering::walk_statement`] hands to [`Lowering::lower_expression`].
const EXPRESSION_ROOTS: &[&str] = &[
    "invocation_expression",
    "lambda_expression",
    "object_creation_expression",
    "member_access_expression",
    "conditional_access_expression",
];

const CALLABLE_MEMBERS: &[&str] = &[
    "method_declaration",
    "constructor_declaration",
    "destructor_declaration",
    "operator_declaration",
    "conversion_operator_declaration",
];

/// What overload resolution needs to know about one argument.
#[derive(Debug, Clone)]
enum ArgShape {
    Value(TypeRef),
    Lambda { parameters: Vec<TypeRef>, body: BodyShape },
}

#[derive(Debug, Clone)]
enum BodyShape {
    Expression(TypeRef),
    Block { returns_value: bool },
}

/// A method found by name lookup, with its declaring type's substitution.
struct Candidate<'t> {
    id: MemberId,
    member: &'t MemberDecl,
    subst: Subst,
}

pub(crate) struct Lowering<'a> {
    table: &'a SymbolTable,
    source: &'a [u8],
    file: usize,
    scope: TypeScope,
    resolutions: &'a mut Vec<Resolution<MemberId>>,
    sites: &'a mut Vec<CallSite>,
}

/// Lowers the member bodies of one type declaration.
pub(crate) fn lower_type_bodies(
    table: &SymbolTable,
    site: &TypeSite,
    source: &[u8],
    file: usize,
    usings: &[String],
    resolutions: &mut Vec<Resolution<MemberId>>,
    sites: &mut Vec<CallSite>,
) {
    let body = find_child_by_field(site.node, "body")
        .or_else(|| find_child_by_kind(site.node, "declaration_list"));
    let Some(body) = body else {
        return;
    };

    let mut lowering = Lowering {
        table,
        source,
        file,
        scope: TypeScope::for_type(table, site.id, usings),
        resolutions,
        sites,
    };

    for member in named_children(body) {
        match member.kind() {
            kind if CALLABLE_MEMBERS.contains(&kind) => lowering.lower_callable(member, &Locals::new()),
            "property_declaration" | "indexer_declaration" | "event_declaration"
            | "field_declaration" | "event_field_declaration" => {
                lowering.walk_statement(member, &mut Locals::new());
            }
            // Nested types are lowered from their own site.
            _ => {}
        }
    }
}

impl<'a> Lowering<'a> {
    fn text(&self, node: Node) -> &'a str {
        node_text(node, self.source)
    }

    fn parse_type(&self, node: Node) -> TypeRef {
        parse_type(self.table, &self.scope, node, self.source)
    }

    fn this_type(&self) -> TypeRef {
        match self.scope.enclosing {
            Some(id) => self.table.self_type(id),
            None => TypeRef::Unknown,
        }
    }

    // ─── Statements ──────────────────────────────────────────────────

    /// Methods, constructors and local functions: parameters become locals.
    fn lower_callable(&mut self, node: Node, outer: &Locals) {
        let type_params = type_parameter_names(node, self.source);
        let saved = self.scope.type_params.len();
        self.scope.type_params.extend(type_params);

        let mut locals = outer.clone();
        for parameter in parameters_of(self.table, &self.scope, node, self.source) {
            locals.insert(parameter.name, parameter.ty);
        }
        for child in named_children(node) {
            if matches!(child.kind(), "block" | "arrow_expression_clause" | "constructor_initializer") {
                self.walk_statement(child, &mut locals);
            }
        }

        self.scope.type_params.truncate(saved);
    }

    fn walk_statement(&mut self, node: Node, locals: &mut Locals) {
        match node.kind() {
            "variable_declaration" => self.declare_variables(node, locals),
            "local_function_statement" => self.lower_callable(node, locals),
            "foreach_statement" => self.lower_foreach(node, locals),
            kind if EXPRESSION_ROOTS.contains(&kind) => {
                self.lower_expression(node, locals);
            }
            _ => {
                for child in named_children(node) {
                    self.walk_statement(child, locals);
                }
            }
        }
    }

    fn declare_variables(&mut self, declaration: Node, locals: &mut Locals) {
        let type_node = find_child_by_field(declaration, "type").or_else(|| declaration.named_child(0));
        let declared = type_node
            .filter(|t| !is_implicit_type(*t, self.source))
            .map(|t| self.parse_type(t));

        for declarator in named_children(declaration) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let initialized = initializer_of(declarator).map(|init| self.lower_expression(init, locals).1);
            let Some(name) = name_node(declarator) else {
                continue;
            };
            let ty = declared.clone().or(initialized).unwrap_or(TypeRef::Unknown);
            locals.insert(self.text(name).trim().to_string(), ty);
        }
    }

    fn lower_foreach(&mut self, node: Node, locals: &mut Locals) {
        let left = find_child_by_field(node, "left");
        let declared = find_child_by_field(node, "type")
            .filter(|t| !is_implicit_type(*t, self.source))
            .map(|t| self.parse_type(t));

        let mut inner = locals.clone();
        if let Some(left) = left.filter(|l| l.kind() == "identifier") {
            inner.insert(self.text(left).trim().to_string(), declared.unwrap_or(TypeRef::Unknown));
        }
        for child in named_children(node) {
            if Some(child) == left || Some(child) == find_child_by_field(node, "type") {
                continue;
            }
            // The collection is evaluated outside the loop variable's scope.
            if Some(child) == find_child_by_field(node, "right") {
                self.walk_statement(child, locals);
            } else {
                self.walk_statement(child, &mut inner);
            }
        }
    }

    // ─── Expressions ─────────────────────────────────────────────────

    /// Lowers an expression and every invocation inside it, exactly once.
    fn lower_expression(&mut self, node: Node, locals: &mut Locals) -> (Expression, TypeRef) {
        let source = self.source;
        let other = || Expression::Other(squash_whitespace(node_text(node, source)));

        match node.kind() {
            "invocation_expression" => {
                let (call, ty) = self.lower_invocation(node, locals);
                (Expression::Invocation(call), ty)
            }
            "lambda_expression" => {
                let (lambda, _) = self.lower_lambda(node, locals, &[]);
                (Expression::Lambda(lambda), TypeRef::Unknown)
            }
            "parenthesized_expression" => match named_children(node).into_iter().next() {
                Some(inner) => self.lower_expression(inner, locals),
                None => (other(), TypeRef::Unknown),
            },
            "identifier" => {
                let ty = self.identifier_type(self.text(node).trim(), locals).unwrap_or(TypeRef::Unknown);
                (other(), ty)
            }
            "this_expression" | "this" => (other(), self.this_type()),
            "member_access_expression" => {
                let ty = self.lower_member_access(node, locals);
                (other(), ty)
            }
            "object_creation_expression" => {
                let ty = find_child_by_field(node, "type")
                    .map(|t| self.parse_type(t))
                    .unwrap_or(TypeRef::Unknown);
                for child in named_children(node) {
                    if matches!(child.kind(), "argument_list" | "initializer_expression") {
                        self.walk_statement(child, locals);
                    }
                }
                (other(), ty)
            }
            "cast_expression" => {
                let ty = find_child_by_field(node, "type")
                    .map(|t| self.parse_type(t))
                    .unwrap_or(TypeRef::Unknown);
                if let Some(value) = find_child_by_field(node, "value") {
                    self.lower_expression(value, locals);
                }
                (other(), ty)
            }
            "integer_literal" => (other(), self.table.system_type(integer_literal_type(self.text(node)))),
            "real_literal" => (other(), self.table.system_type(real_literal_type(self.text(node)))),
            "boolean_literal" => (other(), self.table.system_type("Boolean")),
            "character_literal" => (other(), self.table.system_type("Char")),
            "null_literal" => (other(), TypeRef::Null),
            "string_literal" | "verbatim_string_literal" | "raw_string_literal" => {
                (other(), self.table.system_type("String"))
            }
            "interpolated_string_expression" => {
                for child in named_children(node) {
                    self.walk_statement(child, locals);
                }
                (other(), self.table.system_type("String"))
            }
            _ => {
                for child in named_children(node) {
                    self.walk_statement(child, locals);
                }
                (other(), TypeRef::Unknown)
            }
        }
    }

    /// Type of a bare name: a local, or a field/property of the enclosing type.
    fn identifier_type(&self, name: &str, locals: &Locals) -> Option<TypeRef> {
        if let Some(ty) = locals.get(name) {
            return Some(ty.clone());
        }
        self.value_member_type(&self.this_type(), name)
    }

    fn value_member_type(&self, receiver: &TypeRef, name: &str) -> Option<TypeRef> {
        self.table
            .lookup_members(receiver, name)
            .into_iter()
            .find_map(|(id, subst)| {
                let member = self.table.member(id)?;
                matches!(member.kind, MemberKind::Property | MemberKind::Field)
                    .then(|| opaque_if_unknown(member.ty.substitute(&subst)))
            })
    }

    /// `receiver.Name` used as a value (property or field access).
    fn lower_member_access(&mut self, node: Node, locals: &mut Locals) -> TypeRef {
        let receiver = find_child_by_field(node, "expression").or_else(|| node.named_child(0));
        let name = find_child_by_field(node, "name");
        let receiver_type = match receiver {
            Some(r) => self.lower_receiver(r, locals).1,
            None => TypeRef::Unknown,
        };
        name.and_then(|n| self.value_member_type(&receiver_type, self.text(n).trim()))
            .unwrap_or(TypeRef::Unknown)
    }

    /// Lowers the qualifier of a member access. Type names (`It`, `Moq.Times`,
    /// `int`) yield the named type so static members can be looked up.
    fn lower_receiver(&mut self, node: Node, locals: &mut Locals) -> (Expression, TypeRef) {
        let text = squash_whitespace(self.text(node));
        match node.kind() {
            "identifier" | "generic_name" => {
                let name = self.member_name(node).0;
                if let Some(ty) = self.identifier_type(&name, locals) {
                    return (Expression::Other(text), ty);
                }
                (Expression::Other(text), self.parse_type(node))
            }
            "predefined_type" => {
                let ty = predefined_type(self.table, text.trim());
                (Expression::Other(text), ty)
            }
            "member_access_expression" => {
                if let Some(ty) = self.qualified_type(&text) {
                    return (Expression::Other(text), ty);
                }
                self.lower_expression(node, locals)
            }
            _ => self.lower_expression(node, locals),
        }
    }

    /// `Namespace.Type` written as a member access chain.
    fn qualified_type(&self, text: &str) -> Option<TypeRef> {
        let compact = text.replace(' ', "");
        let (namespace, name) = compact.rsplit_once('.')?;
        let id = self.table.find_qualified(namespace, name, 0)?;
        Some(TypeRef::Named { id, args: Vec::new() })
    }

    /// Name and explicit type arguments of `Name` or `Name<T1, T2>`.
    fn member_name(&self, node: Node) -> (String, Vec<TypeRef>) {
        if node.kind() != "generic_name" {
            return (self.text(node).trim().to_string(), Vec::new());
        }
        let name = find_child_by_kind(node, "identifier")
            .map(|n| self.text(n).trim().to_string())
            .unwrap_or_else(|| self.text(node).split('<').next().unwrap_or("").trim().to_string());
        let args = find_child_by_kind(node, "type_argument_list")
            .map(|list| named_children(list).into_iter().map(|t| self.parse_type(t)).collect())
            .unwrap_or_default();
        (name, args)
    }

    // ─── Lambdas ─────────────────────────────────────────────────────

    /// Lowers a lambda, typing its parameters from `bindings` where they are
    /// not declared explicitly.
    fn lower_lambda(&mut self, node: Node, locals: &Locals, bindings: &[Option<TypeRef>]) -> (LambdaExpression, ArgShape) {
        let parameters = self.lambda_parameters(node);
        let mut inner = locals.clone();
        let mut declared_types = Vec::with_capacity(parameters.len());

        for (index, (name, type_node)) in parameters.iter().enumerate() {
            let declared = type_node.map(|t| self.parse_type(t));
            let bound = bindings.get(index).cloned().flatten();
            let ty = declared.clone().or(bound).unwrap_or(TypeRef::Unknown);
            inner.insert(name.clone(), ty);
            declared_types.push(declared.unwrap_or(TypeRef::Unknown));
        }

        let body_node = find_child_by_field(node, "body").or_else(|| named_children(node).into_iter().last());
        let (body, shape) = match body_node {
            Some(b) if b.kind() == "block" => {
                let returns_value = returns_value(b);
                self.walk_statement(b, &mut inner);
                (LambdaBody::Block, BodyShape::Block { returns_value })
            }
            Some(b) => {
                let (expr, ty) = self.lower_expression(b, &mut inner);
                (LambdaBody::Expression(Box::new(expr)), BodyShape::Expression(ty))
            }
            None => (LambdaBody::Block, BodyShape::Block { returns_value: false }),
        };

        let lambda = LambdaExpression {
            parameters: parameters.into_iter().map(|(name, _)| name).collect(),
            body,
        };
        (lambda, ArgShape::Lambda { parameters: declared_types, body: shape })
    }

    fn lambda_parameters<'t>(&self, node: Node<'t>) -> Vec<(String, Option<Node<'t>>)> {
        let list = find_child_by_field(node, "parameters").or_else(|| {
            named_children(node)
                .into_iter()
                .find(|c| matches!(c.kind(), "parameter_list" | "implicit_parameter" | "identifier"))
        });
        let Some(list) = list else {
            return Vec::new();
        };

        if list.kind() != "parameter_list" {
            return vec![(self.text(list).trim().to_string(), None)];
        }
        named_children(list)
            .into_iter()
            .filter(|p| p.kind() == "parameter")
            .filter_map(|p| {
                let name = find_child_by_field(p, "name")
                    .or_else(|| named_children(p).into_iter().rev().find(|c| c.kind() == "identifier"))?;
                Some((self.text(name).trim().to_string(), find_child_by_field(p, "type")))
            })
            .collect()
    }

    // ─── Invocations ─────────────────────────────────────────────────

    fn lower_invocation(&mut self, node: Node, locals: &mut Locals) -> (CallExpression, TypeRef) {
        let line = line_of(node);
        let function = find_child_by_field(node, "function").or_else(|| node.named_child(0));
        let argument_nodes: Vec<Node> = find_child_by_field(node, "arguments")
            .or_else(|| find_child_by_kind(node, "argument_list"))
            .map(|list| named_children(list).into_iter().filter(|a| a.kind() == "argument").collect())
            .unwrap_or_default();

        let mut receiver = None;
        let target = match function {
            Some(f) if f.kind() == "member_access_expression" => {
                let qualifier = find_child_by_field(f, "expression").or_else(|| f.named_child(0));
                let (receiver_expr, receiver_type) = match qualifier {
                    Some(q) => self.lower_receiver(q, locals),
                    None => (Expression::Other(String::new()), TypeRef::Unknown),
                };
                receiver = Some(Box::new(receiver_expr));
                find_child_by_field(f, "name").map(|n| (self.member_name(n), receiver_type))
            }
            Some(f) if matches!(f.kind(), "identifier" | "generic_name") => {
                Some((self.member_name(f), self.this_type()))
            }
            Some(f) => {
                self.lower_expression(f, locals);
                None
            }
            None => None,
        };

        let Some(((name, type_args), receiver_type)) = target else {
            let arguments = argument_nodes
                .iter()
                .map(|&a| Argument { value: argument_value(a).map(|v| self.lower_expression(v, locals).0) })
                .collect();
            let call = CallExpression { reference: None, receiver, arguments, line };
            self.record(call.clone());
            return (call, TypeRef::Unknown);
        };

        let table = self.table;
        let candidates: Vec<Candidate> = table
            .lookup_members(&receiver_type, &name)
            .into_iter()
            .filter_map(|(id, subst)| {
                let member = table.member(id)?;
                let fits = member.kind == MemberKind::Method
                    && member.accepts_argument_count(argument_nodes.len())
                    && (type_args.is_empty() || member.type_params.len() == type_args.len());
                fits.then_some(Candidate { id, member, subst })
            })
            .collect();

        let mut arguments = Vec::with_capacity(argument_nodes.len());
        let mut shapes = Vec::with_capacity(argument_nodes.len());
        for (index, &argument) in argument_nodes.iter().enumerate() {
            let (value, shape) = match argument_value(argument) {
                Some(v) if v.kind() == "lambda_expression" => {
                    let bindings = self.lambda_bindings(&candidates, index);
                    let (lambda, shape) = self.lower_lambda(v, locals, &bindings);
                    (Some(Expression::Lambda(lambda)), shape)
                }
                Some(v) => {
                    let (expr, ty) = self.lower_expression(v, locals);
                    (Some(expr), ArgShape::Value(ty))
                }
                None => (None, ArgShape::Value(TypeRef::Unknown)),
            };
            arguments.push(Argument { value });
            shapes.push(shape);
        }

        let resolution = self.pick_overload(&candidates, &shapes);
        trace!(%name, line, candidates = candidates.len(), resolved = resolution.is_resolved(), "invocation");

        let return_type = match &resolution {
            Resolution::Resolved(id) => candidates
                .iter()
                .find(|c| c.id == *id)
                .map(|c| self.return_type(c, &type_args, &shapes))
                .unwrap_or(TypeRef::Unknown),
            _ => TypeRef::Unknown,
        };

        let reference = self.register(name, resolution);
        let call = CallExpression { reference: Some(reference), receiver, arguments, line };
        self.record(call.clone());
        (call, return_type)
    }

    fn register(&mut self, name: String, resolution: Resolution<MemberId>) -> Reference {
        let id = self.resolutions.len() as u32;
        self.resolutions.push(resolution);
        Reference { id, name }
    }

    fn record(&mut self, call: CallExpression) {
        self.sites.push(CallSite { file: self.file, call });
    }

    /// Lambda parameter types at argument `index`, where every candidate
    /// agrees on them.
    fn lambda_bindings(&self, candidates: &[Candidate], index: usize) -> Vec<Option<TypeRef>> {
        let signatures: Vec<Vec<TypeRef>> = candidates
            .iter()
            .filter_map(|c| {
                let declared = c.member.parameter_type(index)?.substitute(&c.subst);
                let (parameters, _) = self.table.delegate_signature(&declared)?;
                Some(
                    parameters
                        .into_iter()
                        .map(|p| if p.mentions_any(&c.member.type_params) { TypeRef::Unknown } else { p })
                        .collect(),
                )
            })
            .collect();

        let width = signatures.iter().map(Vec::len).max().unwrap_or(0);
        (0..width)
            .map(|position| {
                let mut agreed: Option<&TypeRef> = None;
                for ty in signatures.iter().filter_map(|s| s.get(position)).filter(|t| t.is_known()) {
                    match agreed {
                        None => agreed = Some(ty),
                        Some(previous) if previous == ty => {}
                        Some(_) => return None,
                    }
                }
                agreed.cloned()
            })
            .collect()
    }

    // ─── Overload resolution ─────────────────────────────────────────

    fn pick_overload(&self, candidates: &[Candidate], shapes: &[ArgShape]) -> Resolution<MemberId> {
        let applicable: Vec<&Candidate> = candidates.iter().filter(|c| self.is_applicable(c, shapes)).collect();
        if applicable.len() <= 1 {
            return match applicable.first() {
                Some(c) => Resolution::Resolved(c.id),
                None => Resolution::Unresolved,
            };
        }

        let preferred = self.prefer_value_returning(applicable, shapes);
        let preferred = self.prefer_exact(preferred, shapes);
        match preferred.as_slice() {
            [only] => Resolution::Resolved(only.id),
            many => Resolution::Ambiguous(many.iter().map(|c| c.id).collect()),
        }
    }

    fn is_applicable(&self, candidate: &Candidate, shapes: &[ArgShape]) -> bool {
        shapes.iter().enumerate().all(|(index, shape)| {
            let Some(declared) = candidate.member.parameter_type(index) else {
                return false;
            };
            let declared = declared.substitute(&candidate.subst);
            match shape {
                ArgShape::Value(actual) => self.table.is_assignable(actual, &declared),
                ArgShape::Lambda { parameters, body } => {
                    if matches!(declared, TypeRef::Param(_)) {
                        return true;
                    }
                    let Some((delegate_params, delegate_return)) = self.table.delegate_signature(&declared) else {
                        return false;
                    };
                    if delegate_params.len() != parameters.len() {
                        return false;
                    }
                    let returns_void = delegate_return == TypeRef::Void;
                    match body {
                        BodyShape::Expression(TypeRef::Void) => returns_void,
                        BodyShape::Expression(_) => true,
                        BodyShape::Block { returns_value } => *returns_value != returns_void,
                    }
                }
            }
        })
    }

    fn delegate_return(&self, candidate: &Candidate, index: usize) -> Option<TypeRef> {
        let declared = candidate.member.parameter_type(index)?.substitute(&candidate.subst);
        self.table.delegate_signature(&declared).map(|(_, ret)| ret)
    }

    /// A lambda whose body has a value converts better to a `Func` than to an
    /// `Action`.
    fn prefer_value_returning<'c, 't>(&self, applicable: Vec<&'c Candidate<'t>>, shapes: &[ArgShape]) -> Vec<&'c Candidate<'t>> {
        let mut current = applicable;
        for (index, shape) in shapes.iter().enumerate() {
            let ArgShape::Lambda { body: BodyShape::Expression(ty), .. } = shape else {
                continue;
            };
            if !ty.is_value() {
                continue;
            }
            let returning: Vec<_> = current
                .iter()
                .copied()
                .filter(|c| self.delegate_return(c, index).is_some_and(|r| r != TypeRef::Void))
                .collect();
            if !returning.is_empty() {
                current = returning;
            }
        }
        current
    }

    /// Prefers the single candidate whose parameter types equal the argument types.
    fn prefer_exact<'c, 't>(&self, applicable: Vec<&'c Candidate<'t>>, shapes: &[ArgShape]) -> Vec<&'c Candidate<'t>> {
        let exact: Vec<_> = applicable
            .iter()
            .copied()
            .filter(|c| {
                shapes.iter().enumerate().all(|(index, shape)| match shape {
                    ArgShape::Value(actual @ TypeRef::Named { .. }) => c
                        .member
                        .parameter_type(index)
                        .map(|p| p.substitute(&c.subst))
                        .is_some_and(|p| p.head() == actual.head()),
                    _ => true,
                })
            })
            .collect();
        if exact.len() == 1 { exact } else { applicable }
    }

    /// Declared return type with the receiver's and the inferred (or
    /// explicit) method type arguments substituted.
    fn return_type(&self, candidate: &Candidate, type_args: &[TypeRef], shapes: &[ArgShape]) -> TypeRef {
        let member = candidate.member;
        let mut inferred: Subst = HashMap::new();

        if !type_args.is_empty() {
            inferred.extend(member.type_params.iter().cloned().zip(type_args.iter().cloned()));
        } else if !member.type_params.is_empty() {
            for (index, shape) in shapes.iter().enumerate() {
                let Some(declared) = member.parameter_type(index) else {
                    continue;
                };
                let declared = declared.substitute(&candidate.subst);
                match shape {
                    ArgShape::Value(actual) => unify(&declared, actual, &member.type_params, &mut inferred),
                    ArgShape::Lambda { parameters, body } => {
                        let Some((delegate_params, delegate_return)) = self.table.delegate_signature(&declared) else {
                            continue;
                        };
                        for (d, p) in delegate_params.iter().zip(parameters) {
                            unify(d, p, &member.type_params, &mut inferred);
                        }
                        if let BodyShape::Expression(body_type) = body {
                            unify(&delegate_return, body_type, &member.type_params, &mut inferred);
                        }
                    }
                }
            }
        }

        let ty = member.ty.substitute(&candidate.subst).substitute(&inferred);
        if member.ty == TypeRef::Void { ty } else { opaque_if_unknown(ty) }
    }
}

/// A declared member always yields a value, even when its type is not one
/// the model knows.
fn opaque_if_unknown(ty: TypeRef) -> TypeRef {
    if ty == TypeRef::Unknown { TypeRef::Opaque } else { ty }
}

/// `System` type of an integer literal, by suffix. Unsigned suffixes map to
/// the signed types of the same width.
fn integer_literal_type(text: &str) -> &'static str {
    if text.trim().to_ascii_lowercase().ends_with('l') { "Int64" } else { "Int32" }
}

fn real_literal_type(text: &str) -> &'static str {
    match text.trim().chars().last().map(|c| c.to_ascii_lowercase()) {
        Some('m') => "Decimal",
        Some('f') => "Single",
        _ => "Double",
    }
}

/// The value expression of an `argument` node (skips `name:` and `ref`/`out`).
fn argument_value(argument: Node) -> Option<Node> {
    named_children(argument).into_iter().last()
}

/// Whether a block returns a value, ignoring nested lambdas and local functions.
fn returns_value(node: Node) -> bool {
    named_children(node).into_iter().any(|child| match child.kind() {
        "return_statement" => !named_children(child).is_empty(),
        "lambda_expression" | "anonymous_method_expression" | "local_function_statement" => false,
        _ => returns_value(child),
    })
}
