//! Declared types and members of a C# compilation, plus the type algebra
//! resolution runs on: generic substitution, member lookup through base
//! types, delegate shapes and assignability.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

pub type TypeId = usize;

/// Handle to a declared member; the symbol type of [`super::CSharpModel`].
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(pub u32);

// ─── Types ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Named { id: TypeId, args: Vec<TypeRef> },
    /// A generic type parameter, by name.
    Param(String),
    Void,
    /// Type of the `null` literal.
    Null,
    /// A value whose type the model cannot name, e.g. a `Task<int>` return.
    /// Never `void`.
    Opaque,
    Unknown,
}

/// Type parameter name -> argument.
pub type Subst = HashMap<String, TypeRef>;

impl TypeRef {
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown | Self::Opaque)
    }

    /// Whether an expression of this type yields a value.
    pub fn is_value(&self) -> bool {
        !matches!(self, Self::Void | Self::Unknown)
    }

    pub fn head(&self) -> Option<TypeId> {
        match self {
            Self::Named { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn substitute(&self, subst: &Subst) -> TypeRef {
        match self {
            Self::Param(name) => subst.get(name).cloned().unwrap_or_else(|| self.clone()),
            Self::Named { id, args } => Self::Named {
                id: *id,
                args: args.iter().map(|a| a.substitute(subst)).collect(),
            },
            other => other.clone(),
        }
    }

    /// Whether any of `params` occurs in this type.
    pub fn mentions_any(&self, params: &[String]) -> bool {
        match self {
            Self::Param(name) => params.contains(name),
            Self::Named { args, .. } => args.iter().any(|a| a.mentions_any(params)),
            _ => false,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Struct,
    Record,
    Enum,
    Delegate,
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub namespace: String,
    /// Enclosing type of a nested declaration.
    pub outer: Option<TypeId>,
    pub name: String,
    pub kind: TypeKind,
    pub type_params: Vec<String>,
    pub bases: Vec<TypeRef>,
    pub members: Vec<MemberId>,
}

// ─── Members ─────────────────────────────────────────────────────────

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Method,
    Property,
    Field,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
    /// Declared type as written, whitespace collapsed.
    pub type_text: String,
    pub optional: bool,
    pub is_params: bool,
}

#[derive(Debug, Clone)]
pub struct MemberDecl {
    pub owner: TypeId,
    pub name: String,
    pub kind: MemberKind,
    pub type_params: Vec<String>,
    pub parameters: Vec<Parameter>,
    /// Return type of a method, declared type of a property or field.
    pub ty: TypeRef,
    pub line: u32,
}

impl MemberDecl {
    pub fn accepts_argument_count(&self, count: usize) -> bool {
        let required = self.parameters.iter().filter(|p| !p.optional && !p.is_params).count();
        let variadic = self.parameters.last().is_some_and(|p| p.is_params);
        count >= required && (variadic || count <= self.parameters.len())
    }

    /// Declared type of the parameter receiving argument `index`.
    pub fn parameter_type(&self, index: usize) -> Option<&TypeRef> {
        match self.parameters.get(index) {
            Some(p) => Some(&p.ty),
            None => self.parameters.last().filter(|p| p.is_params).map(|p| &p.ty),
        }
    }
}

// ─── Symbol table ────────────────────────────────────────────────────

/// Widening conversions between the predefined numeric types.
const IMPLICIT_NUMERIC: &[(&str, &[&str])] = &[
    ("Byte", &["Int16", "Int32", "Int64", "Single", "Double", "Decimal"]),
    ("Char", &["Int32", "Int64", "Single", "Double", "Decimal"]),
    ("Int16", &["Int32", "Int64", "Single", "Double", "Decimal"]),
    ("Int32", &["Int64", "Single", "Double", "Decimal"]),
    ("Int64", &["Single", "Double", "Decimal"]),
    ("Single", &["Double"]),
];

#[derive(Debug, Default)]
pub struct SymbolTable {
    types: Vec<TypeDecl>,
    members: Vec<MemberDecl>,
    /// (simple name, generic arity) -> declarations
    by_name: HashMap<(String, usize), Vec<TypeId>>,
}

impl SymbolTable {
    pub fn add_type(&mut self, decl: TypeDecl) -> TypeId {
        let id = self.types.len();
        self.by_name
            .entry((decl.name.clone(), decl.type_params.len()))
            .or_default()
            .push(id);
        self.types.push(decl);
        id
    }

    pub fn add_member(&mut self, member: MemberDecl) -> MemberId {
        let id = MemberId(self.members.len() as u32);
        self.types[member.owner].members.push(id);
        self.members.push(member);
        id
    }

    pub fn set_bases(&mut self, id: TypeId, bases: Vec<TypeRef>) {
        self.types[id].bases = bases;
    }

    pub fn ty(&self, id: TypeId) -> &TypeDecl {
        &self.types[id]
    }

    pub fn member(&self, id: MemberId) -> Option<&MemberDecl> {
        self.members.get(id.0 as usize)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn types_named(&self, name: &str, arity: usize) -> &[TypeId] {
        self.by_name
            .get(&(name.to_string(), arity))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Top-level type `namespace.name` with the given arity.
    pub fn find_qualified(&self, namespace: &str, name: &str, arity: usize) -> Option<TypeId> {
        self.types_named(name, arity)
            .iter()
            .copied()
            .find(|&id| self.types[id].outer.is_none() && self.types[id].namespace == namespace)
    }

    pub fn system_type(&self, name: &str) -> TypeRef {
        match self.find_qualified("System", name, 0) {
            Some(id) => TypeRef::Named { id, args: Vec::new() },
            None => TypeRef::Unknown,
        }
    }

    /// `Outer.Name` qualified by namespace, without arity suffixes.
    pub fn full_name(&self, id: TypeId) -> String {
        let decl = &self.types[id];
        let prefix = match decl.outer {
            Some(outer) => self.full_name(outer),
            None => decl.namespace.clone(),
        };
        if prefix.is_empty() { decl.name.clone() } else { format!("{}.{}", prefix, decl.name) }
    }

    /// Like [`Self::full_name`] with a `` `N `` generic arity suffix per level.
    pub fn metadata_name(&self, id: TypeId) -> String {
        let decl = &self.types[id];
        let prefix = match decl.outer {
            Some(outer) => self.metadata_name(outer),
            None => decl.namespace.clone(),
        };
        let mut name = if prefix.is_empty() { decl.name.clone() } else { format!("{}.{}", prefix, decl.name) };
        if !decl.type_params.is_empty() {
            name.push_str(&format!("`{}", decl.type_params.len()));
        }
        name
    }

    /// The type as seen from inside its own declaration.
    pub fn self_type(&self, id: TypeId) -> TypeRef {
        TypeRef::Named {
            id,
            args: self.types[id].type_params.iter().cloned().map(TypeRef::Param).collect(),
        }
    }

    fn instantiation(&self, ty: &TypeRef) -> Option<(TypeId, Subst)> {
        let TypeRef::Named { id, args } = ty else {
            return None;
        };
        let subst = self.types[*id]
            .type_params
            .iter()
            .cloned()
            .zip(args.iter().cloned())
            .collect();
        Some((*id, subst))
    }

    // ─── Lookup ──────────────────────────────────────────────────────

    /// Members named `name` visible on `ty`, each with the substitution of
    /// its declaring type. Members found on a type hide those of its bases.
    pub fn lookup_members(&self, ty: &TypeRef, name: &str) -> Vec<(MemberId, Subst)> {
        let mut found = Vec::new();
        let mut visited = HashSet::new();
        self.collect_members(ty, name, &mut visited, &mut found);
        found
    }

    fn collect_members(
        &self,
        ty: &TypeRef,
        name: &str,
        visited: &mut HashSet<TypeId>,
        found: &mut Vec<(MemberId, Subst)>,
    ) {
        let Some((id, subst)) = self.instantiation(ty) else {
            return;
        };
        if !visited.insert(id) {
            return;
        }

        let decl = &self.types[id];
        let before = found.len();
        for &member in &decl.members {
            if self.members[member.0 as usize].name == name {
                found.push((member, subst.clone()));
            }
        }
        if found.len() > before {
            return;
        }

        for base in &decl.bases {
            self.collect_members(&base.substitute(&subst), name, visited, found);
        }
    }

    /// Parameter types and return type of a delegate-typed value.
    ///
    /// `Expression<D>` is seen through to `D`, the way lambdas convert to
    /// expression trees.
    pub fn delegate_signature(&self, ty: &TypeRef) -> Option<(Vec<TypeRef>, TypeRef)> {
        let (id, subst) = self.instantiation(ty)?;
        let decl = &self.types[id];

        if decl.kind == TypeKind::Delegate {
            let invoke = decl
                .members
                .iter()
                .filter_map(|&m| self.member(m))
                .find(|m| m.name == "Invoke")?;
            let params = invoke.parameters.iter().map(|p| p.ty.substitute(&subst)).collect();
            return Some((params, invoke.ty.substitute(&subst)));
        }

        if decl.type_params.len() == 1 && self.full_name(id) == "System.Linq.Expressions.Expression" {
            let TypeRef::Named { args, .. } = ty else {
                return None;
            };
            return self.delegate_signature(args.first()?);
        }

        None
    }

    fn derives_from(&self, from: TypeId, to: TypeId, visited: &mut HashSet<TypeId>) -> bool {
        if from == to {
            return true;
        }
        if !visited.insert(from) {
            return false;
        }
        self.types[from]
            .bases
            .iter()
            .filter_map(TypeRef::head)
            .any(|base| self.derives_from(base, to, visited))
    }

    fn widens_to(&self, from: TypeId, to: TypeId) -> bool {
        let (from, to) = (&self.types[from], &self.types[to]);
        if from.namespace != "System" || to.namespace != "System" {
            return false;
        }
        IMPLICIT_NUMERIC
            .iter()
            .any(|(source, targets)| *source == from.name && targets.contains(&to.name.as_str()))
    }

    /// Whether a value of type `from` can be passed where `to` is expected.
    /// Type arguments are not compared; unknown or generic types are accepted.
    pub fn is_assignable(&self, from: &TypeRef, to: &TypeRef) -> bool {
        match (from, to) {
            (TypeRef::Void, _) | (_, TypeRef::Void) => false,
            (TypeRef::Unknown | TypeRef::Opaque, _) | (_, TypeRef::Unknown | TypeRef::Opaque) => true,
            (_, TypeRef::Param(_)) | (TypeRef::Param(_), _) => true,
            (TypeRef::Null, TypeRef::Named { id, .. }) => {
                !matches!(self.types[*id].kind, TypeKind::Struct | TypeKind::Enum)
            }
            (TypeRef::Named { id: a, .. }, TypeRef::Named { id: b, .. }) => {
                self.full_name(*b) == "System.Object"
                    || self.derives_from(*a, *b, &mut HashSet::new())
                    || self.widens_to(*a, *b)
            }
            (TypeRef::Null, _) | (_, TypeRef::Null) => true,
        }
    }

    // ─── Canonical signatures ────────────────────────────────────────

    fn render_type(&self, ty: &TypeRef) -> Option<String> {
        match ty {
            TypeRef::Named { id, args } => {
                let mut text = self.metadata_name(*id);
                if !args.is_empty() {
                    let substitutions = self.types[*id]
                        .type_params
                        .iter()
                        .zip(args)
                        .map(|(param, arg)| self.render_type(arg).map(|a| format!("{} -> {}", param, a)))
                        .collect::<Option<Vec<_>>>()?;
                    text.push('[');
                    text.push_str(&substitutions.join(", "));
                    text.push(']');
                }
                Some(text)
            }
            TypeRef::Param(name) => Some(name.clone()),
            TypeRef::Void => Some("System.Void".to_string()),
            TypeRef::Null | TypeRef::Opaque | TypeRef::Unknown => None,
        }
    }

    /// Canonical key of a member, e.g.
    /// ``Method:Moq.Mock`1.Verify(System.Linq.Expressions.Expression`1[TDelegate -> System.Action`1[T -> T]] expression)``.
    ///
    /// `None` when a parameter type could not be resolved.
    pub fn canonical_signature(&self, id: MemberId) -> Option<String> {
        let member = self.member(id)?;
        let owner = self.metadata_name(member.owner);
        match member.kind {
            MemberKind::Method => {
                let parameters = member
                    .parameters
                    .iter()
                    .map(|p| self.render_type(&p.ty).map(|t| format!("{} {}", t, p.name)))
                    .collect::<Option<Vec<_>>>()?;
                Some(format!("Method:{}.{}({})", owner, member.name, parameters.join(", ")))
            }
            MemberKind::Property => Some(format!("Property:{}.{}", owner, member.name)),
            MemberKind::Field => Some(format!("Field:{}.{}", owner, member.name)),
        }
    }
}

/// Unifies a declared type against an actual one, binding any of `params`.
pub(crate) fn unify(declared: &TypeRef, actual: &TypeRef, params: &[String], bindings: &mut Subst) {
    match (declared, actual) {
        (TypeRef::Param(name), actual) if params.contains(name) => {
            if matches!(actual, TypeRef::Named { .. } | TypeRef::Param(_)) {
                bindings.entry(name.clone()).or_insert_with(|| actual.clone());
            }
        }
        (TypeRef::Named { id: a, args: declared_args }, TypeRef::Named { id: b, args: actual_args }) if a == b => {
            for (d, x) in declared_args.iter().zip(actual_args) {
                unify(d, x, params, bindings);
            }
        }
        _ => {}
    }
}
