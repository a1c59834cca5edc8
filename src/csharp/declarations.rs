//! Declaration passes: register every type, then fill in bases and members.
//!
//! Types are registered before any type reference is resolved so that
//! declarations may refer to types declared later or in other files.

use tree_sitter::Node;

use super::symbols::*;
use super::syntax::*;

/// A type declaration node kept between passes.
pub(crate) struct TypeSite<'t> {
    pub id: TypeId,
    pub node: Node<'t>,
    /// Index of the compilation unit the node belongs to.
    pub unit: usize,
}

/// Where type names are looked up from.
#[derive(Debug, Clone, Default)]
pub(crate) struct TypeScope {
    pub namespace: String,
    pub usings: Vec<String>,
    pub enclosing: Option<TypeId>,
    /// Type parameters in scope: the enclosing types' and the current method's.
    pub type_params: Vec<String>,
}

impl TypeScope {
    pub fn for_type(table: &SymbolTable, id: TypeId, usings: &[String]) -> Self {
        let mut type_params = Vec::new();
        let mut current = Some(id);
        while let Some(t) = current {
            type_params.extend(table.ty(t).type_params.iter().cloned());
            current = table.ty(t).outer;
        }
        let mut outermost = id;
        while let Some(outer) = table.ty(outermost).outer {
            outermost = outer;
        }
        Self {
            namespace: table.ty(outermost).namespace.clone(),
            usings: usings.to_vec(),
            enclosing: Some(id),
            type_params,
        }
    }
}

const TYPE_DECLARATIONS: &[(&str, TypeKind)] = &[
    ("class_declaration", TypeKind::Class),
    ("interface_declaration", TypeKind::Interface),
    ("struct_declaration", TypeKind::Struct),
    ("record_declaration", TypeKind::Record),
    ("record_struct_declaration", TypeKind::Struct),
    ("enum_declaration", TypeKind::Enum),
    ("delegate_declaration", TypeKind::Delegate),
];

fn type_kind(kind: &str) -> Option<TypeKind> {
    TYPE_DECLARATIONS.iter().find(|(k, _)| *k == kind).map(|(_, t)| *t)
}

fn join_namespace(outer: &str, inner: &str) -> String {
    if outer.is_empty() { inner.to_string() } else { format!("{}.{}", outer, inner) }
}

// ─── Pass 1: types ───────────────────────────────────────────────────

/// Registers every type declared under `root` and returns the file's
/// `using` namespaces.
pub(crate) fn declare_types<'t>(
    table: &mut SymbolTable,
    root: Node<'t>,
    source: &[u8],
    unit: usize,
    sites: &mut Vec<TypeSite<'t>>,
) -> Vec<String> {
    let mut usings = Vec::new();
    walk_declarations(table, root, source, unit, "", None, sites, &mut usings);
    usings
}

#[allow(clippy::too_many_arguments)]
fn walk_declarations<'t>(
    table: &mut SymbolTable,
    node: Node<'t>,
    source: &[u8],
    unit: usize,
    namespace: &str,
    outer: Option<TypeId>,
    sites: &mut Vec<TypeSite<'t>>,
    usings: &mut Vec<String>,
) {
    // A file-scoped namespace applies to every declaration after it.
    let mut current_namespace = namespace.to_string();

    for child in named_children(node) {
        match child.kind() {
            "using_directive" => {
                let is_alias = children(child).iter().any(|c| c.kind() == "=" || c.kind() == "name_equals");
                if !is_alias
                    && let Some(name) = named_children(child).into_iter().last()
                {
                    usings.push(node_text(name, source).trim().to_string());
                }
            }
            "namespace_declaration" => {
                let name = name_node(child).map(|n| node_text(n, source).trim()).unwrap_or("");
                let nested = join_namespace(&current_namespace, name);
                let body = find_child_by_field(child, "body")
                    .or_else(|| find_child_by_kind(child, "declaration_list"));
                if let Some(body) = body {
                    walk_declarations(table, body, source, unit, &nested, None, sites, usings);
                }
            }
            "file_scoped_namespace_declaration" => {
                let name = name_node(child).map(|n| node_text(n, source).trim()).unwrap_or("");
                current_namespace = join_namespace(namespace, name);
                walk_declarations(table, child, source, unit, &current_namespace, None, sites, usings);
            }
            kind => {
                if let Some(type_kind) = type_kind(kind) {
                    declare_type(table, child, source, unit, &current_namespace, outer, type_kind, sites, usings);
                } else if kind == "declaration_list" {
                    walk_declarations(table, child, source, unit, &current_namespace, outer, sites, usings);
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn declare_type<'t>(
    table: &mut SymbolTable,
    node: Node<'t>,
    source: &[u8],
    unit: usize,
    namespace: &str,
    outer: Option<TypeId>,
    kind: TypeKind,
    sites: &mut Vec<TypeSite<'t>>,
    usings: &mut Vec<String>,
) {
    let Some(name) = name_node(node).map(|n| node_text(n, source).trim().to_string()) else {
        return;
    };
    let id = table.add_type(TypeDecl {
        namespace: namespace.to_string(),
        outer,
        name,
        kind,
        type_params: type_parameter_names(node, source),
        bases: Vec::new(),
        members: Vec::new(),
    });
    sites.push(TypeSite { id, node, unit });

    let body = find_child_by_field(node, "body")
        .or_else(|| find_child_by_kind(node, "declaration_list"));
    if let Some(body) = body {
        walk_declarations(table, body, source, unit, namespace, Some(id), sites, usings);
    }
}

// ─── Type references ─────────────────────────────────────────────────

/// C# keyword types and the `System` structs they alias.
pub(crate) const PREDEFINED_TYPES: &[(&str, &str)] = &[
    ("bool", "Boolean"),
    ("byte", "Byte"),
    ("char", "Char"),
    ("decimal", "Decimal"),
    ("double", "Double"),
    ("float", "Single"),
    ("int", "Int32"),
    ("long", "Int64"),
    ("object", "Object"),
    ("short", "Int16"),
    ("string", "String"),
];

fn namespace_chain(namespace: &str) -> Vec<&str> {
    let mut chain = Vec::new();
    let mut current = namespace;
    while !current.is_empty() {
        chain.push(current);
        current = current.rfind('.').map(|i| &current[..i]).unwrap_or("");
    }
    chain.push("");
    chain
}

/// Resolves a simple type name the way C# scopes do: nested types of the
/// enclosing types, then enclosing namespaces, then `using` namespaces.
pub(crate) fn resolve_type_name(table: &SymbolTable, scope: &TypeScope, name: &str, arity: usize) -> Option<TypeId> {
    let candidates = table.types_named(name, arity);
    if candidates.is_empty() {
        return None;
    }

    let mut enclosing = scope.enclosing;
    while let Some(outer) = enclosing {
        if let Some(&id) = candidates.iter().find(|&&c| table.ty(c).outer == Some(outer)) {
            return Some(id);
        }
        enclosing = table.ty(outer).outer;
    }

    for namespace in namespace_chain(&scope.namespace) {
        if let Some(id) = table.find_qualified(namespace, name, arity) {
            return Some(id);
        }
    }
    for namespace in &scope.usings {
        if let Some(id) = table.find_qualified(namespace, name, arity) {
            return Some(id);
        }
    }

    // Missing using directive: still better to name the one candidate there is.
    candidates.first().copied()
}

/// Resolves a type syntax node to a [`TypeRef`].
pub(crate) fn parse_type(table: &SymbolTable, scope: &TypeScope, node: Node, source: &[u8]) -> TypeRef {
    match node.kind() {
        "predefined_type" => predefined_type(table, node_text(node, source).trim()),
        "identifier" => {
            let name = node_text(node, source).trim();
            if scope.type_params.iter().any(|p| p == name) {
                return TypeRef::Param(name.to_string());
            }
            match resolve_type_name(table, scope, name, 0) {
                Some(id) => TypeRef::Named { id, args: Vec::new() },
                None => TypeRef::Unknown,
            }
        }
        "generic_name" => {
            let (name, args) = generic_parts(table, scope, node, source);
            match resolve_type_name(table, scope, &name, args.len()) {
                Some(id) => TypeRef::Named { id, args },
                None => TypeRef::Unknown,
            }
        }
        "qualified_name" => {
            let qualifier = find_child_by_field(node, "qualifier").or_else(|| node.named_child(0));
            let last = find_child_by_field(node, "name").or_else(|| named_children(node).into_iter().last());
            let (Some(qualifier), Some(last)) = (qualifier, last) else {
                return TypeRef::Unknown;
            };
            let namespace = squash_whitespace(node_text(qualifier, source)).replace(' ', "");
            let (name, args) = match last.kind() {
                "generic_name" => generic_parts(table, scope, last, source),
                _ => (node_text(last, source).trim().to_string(), Vec::new()),
            };
            let found = table
                .find_qualified(&namespace, &name, args.len())
                .or_else(|| resolve_type_name(table, scope, &name, args.len()));
            match found {
                Some(id) => TypeRef::Named { id, args },
                None => TypeRef::Unknown,
            }
        }
        _ => TypeRef::Unknown,
    }
}

fn generic_parts(table: &SymbolTable, scope: &TypeScope, node: Node, source: &[u8]) -> (String, Vec<TypeRef>) {
    let name = find_child_by_kind(node, "identifier")
        .map(|n| node_text(n, source).trim().to_string())
        .unwrap_or_else(|| {
            let text = node_text(node, source);
            text.split('<').next().unwrap_or(text).trim().to_string()
        });
    let args = find_child_by_kind(node, "type_argument_list")
        .map(|list| {
            named_children(list)
                .into_iter()
                .map(|arg| parse_type(table, scope, arg, source))
                .collect()
        })
        .unwrap_or_default();
    (name, args)
}

pub(crate) fn predefined_type(table: &SymbolTable, keyword: &str) -> TypeRef {
    if keyword == "void" {
        return TypeRef::Void;
    }
    PREDEFINED_TYPES
        .iter()
        .find(|(k, _)| *k == keyword)
        .map(|(_, system)| table.system_type(system))
        .unwrap_or(TypeRef::Unknown)
}

pub(crate) fn is_implicit_type(node: Node, source: &[u8]) -> bool {
    node.kind() == "implicit_type" || node_text(node, source).trim() == "var"
}

// ─── Pass 2: members ─────────────────────────────────────────────────

/// Fills in the bases and members of one registered type.
pub(crate) fn declare_members(table: &mut SymbolTable, site: &TypeSite, source: &[u8], usings: &[String]) {
    let scope = TypeScope::for_type(table, site.id, usings);
    let node = site.node;

    match table.ty(site.id).kind {
        TypeKind::Delegate => {
            if let Some(invoke) = method_member(table, &scope, site.id, node, source, Some("Invoke")) {
                table.add_member(invoke);
            }
            return;
        }
        TypeKind::Enum => {
            declare_enum_members(table, site.id, node, source);
            return;
        }
        _ => {}
    }

    if let Some(base_list) = find_child_by_kind(node, "base_list") {
        let bases = named_children(base_list)
            .into_iter()
            .filter(|b| b.kind() != "argument_list")
            .map(|b| parse_type(table, &scope, b, source))
            .filter(TypeRef::is_known)
            .collect();
        table.set_bases(site.id, bases);
    }

    let body = find_child_by_field(node, "body")
        .or_else(|| find_child_by_kind(node, "declaration_list"));
    let Some(body) = body else {
        return;
    };

    for child in named_children(body) {
        match child.kind() {
            "method_declaration" => {
                if let Some(method) = method_member(table, &scope, site.id, child, source, None) {
                    table.add_member(method);
                }
            }
            "property_declaration" => {
                let name = name_node(child).map(|n| node_text(n, source).trim().to_string());
                let ty = find_child_by_field(child, "type")
                    .map(|t| parse_type(table, &scope, t, source))
                    .unwrap_or(TypeRef::Unknown);
                if let Some(name) = name {
                    table.add_member(MemberDecl {
                        owner: site.id,
                        name,
                        kind: MemberKind::Property,
                        type_params: Vec::new(),
                        parameters: Vec::new(),
                        ty,
                        line: line_of(child),
                    });
                }
            }
            "field_declaration" => {
                for (name, ty) in variables_of(table, &scope, child, source) {
                    table.add_member(MemberDecl {
                        owner: site.id,
                        name,
                        kind: MemberKind::Field,
                        type_params: Vec::new(),
                        parameters: Vec::new(),
                        ty,
                        line: line_of(child),
                    });
                }
            }
            _ => {}
        }
    }
}

fn declare_enum_members(table: &mut SymbolTable, id: TypeId, node: Node, source: &[u8]) {
    let Some(list) = find_child_by_kind(node, "enum_member_declaration_list") else {
        return;
    };
    for member in named_children(list) {
        if member.kind() != "enum_member_declaration" {
            continue;
        }
        if let Some(name) = name_node(member) {
            table.add_member(MemberDecl {
                owner: id,
                name: node_text(name, source).trim().to_string(),
                kind: MemberKind::Field,
                type_params: Vec::new(),
                parameters: Vec::new(),
                ty: TypeRef::Named { id, args: Vec::new() },
                line: line_of(member),
            });
        }
    }
}

/// Declared variables of a field declaration: `(name, type)` per declarator.
fn variables_of(table: &SymbolTable, scope: &TypeScope, node: Node, source: &[u8]) -> Vec<(String, TypeRef)> {
    let Some(declaration) = find_child_by_kind(node, "variable_declaration") else {
        return Vec::new();
    };
    let ty = find_child_by_field(declaration, "type")
        .or_else(|| declaration.named_child(0))
        .map(|t| parse_type(table, scope, t, source))
        .unwrap_or(TypeRef::Unknown);
    named_children(declaration)
        .into_iter()
        .filter(|d| d.kind() == "variable_declarator")
        .filter_map(|d| name_node(d).map(|n| (node_text(n, source).trim().to_string(), ty.clone())))
        .collect()
}

/// Return type node of a method-like declaration.
pub(crate) fn return_type_node<'a>(node: Node<'a>) -> Option<Node<'a>> {
    if let Some(ty) = find_child_by_field(node, "returns").or_else(|| find_child_by_field(node, "type")) {
        return Some(ty);
    }
    let mut previous = name_node(node)?.prev_named_sibling();
    while let Some(candidate) = previous {
        match candidate.kind() {
            "explicit_interface_specifier" | "comment" => previous = candidate.prev_named_sibling(),
            "modifier" | "attribute_list" => return None,
            _ => return Some(candidate),
        }
    }
    None
}

/// Builds a method member; `name_override` names delegate `Invoke` methods.
pub(crate) fn method_member(
    table: &SymbolTable,
    scope: &TypeScope,
    owner: TypeId,
    node: Node,
    source: &[u8],
    name_override: Option<&str>,
) -> Option<MemberDecl> {
    let name = match name_override {
        Some(name) => name.to_string(),
        None => node_text(name_node(node)?, source).trim().to_string(),
    };

    // A delegate's type parameters belong to the delegate type, already in scope.
    let type_params = if name_override.is_some() { Vec::new() } else { type_parameter_names(node, source) };
    let mut method_scope = scope.clone();
    method_scope.type_params.extend(type_params.iter().cloned());

    let ty = return_type_node(node)
        .map(|t| parse_type(table, &method_scope, t, source))
        .unwrap_or(TypeRef::Unknown);
    let parameters = parameters_of(table, &method_scope, node, source);

    Some(MemberDecl {
        owner,
        name,
        kind: MemberKind::Method,
        type_params,
        parameters,
        ty,
        line: line_of(node),
    })
}

pub(crate) fn parameters_of(table: &SymbolTable, scope: &TypeScope, node: Node, source: &[u8]) -> Vec<Parameter> {
    let list = find_child_by_field(node, "parameters")
        .or_else(|| find_child_by_kind(node, "parameter_list"));
    let Some(list) = list else {
        return Vec::new();
    };

    named_children(list)
        .into_iter()
        .filter(|p| matches!(p.kind(), "parameter" | "parameter_array"))
        .filter_map(|p| {
            let name = find_child_by_field(p, "name")
                .or_else(|| named_children(p).into_iter().rev().find(|c| c.kind() == "identifier"))?;
            let type_node = find_child_by_field(p, "type").or_else(|| {
                name.prev_named_sibling()
                    .filter(|t| !matches!(t.kind(), "modifier" | "parameter_modifier" | "attribute_list"))
            });
            let text = node_text(p, source).trim_start();
            Some(Parameter {
                name: node_text(name, source).trim().to_string(),
                ty: type_node
                    .map(|t| parse_type(table, scope, t, source))
                    .unwrap_or(TypeRef::Unknown),
                type_text: type_node
                    .map(|t| squash_whitespace(node_text(t, source)))
                    .unwrap_or_default(),
                optional: initializer_of(p).is_some(),
                is_params: p.kind() == "parameter_array" || text.starts_with("params "),
            })
        })
        .collect()
}
