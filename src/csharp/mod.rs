//! Tree-sitter backed [`SemanticModel`] for C# sources.
//!
//! [`CSharpModel::build`] parses every source together with a declaration
//! stub of the Moq API, builds a symbol table in two declaration passes and
//! then lowers every invocation in member bodies, resolving its callee as it
//! goes. Afterwards the model is immutable: `resolve` is a table lookup.

mod declarations;
mod lowering;
mod symbols;
mod syntax;

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::error::MoqError;
use crate::hints::{ParameterHint, ParameterSource};
use crate::semantic::{CallExpression, Reference, Resolution, SemanticModel};

use declarations::{TypeSite, declare_members, declare_types};
use lowering::lower_type_bodies;
pub use symbols::{MemberDecl, MemberId, MemberKind, Parameter, SymbolTable, TypeRef};

/// Declarations of the Moq surface that user code is resolved against.
pub const MOQ_API_STUB: &str = include_str!("moq_api.cs");

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self { path: path.into(), text: text.into() }
    }

    /// Reads a file, replacing invalid UTF-8. The flag reports whether any
    /// replacement happened.
    pub fn read_lossy(path: &Path) -> std::io::Result<(Self, bool)> {
        let raw = std::fs::read(path)?;
        let (text, lossy) = match String::from_utf8(raw) {
            Ok(s) => (s, false),
            Err(e) => (String::from_utf8_lossy(e.as_bytes()).into_owned(), true),
        };
        Ok((Self::new(path, text), lossy))
    }
}

/// A lowered invocation and the file it came from.
#[derive(Serialize, Debug, Clone)]
pub struct CallSite {
    /// Index into the model's source files.
    pub file: usize,
    pub call: CallExpression,
}

#[derive(Debug)]
pub struct CSharpModel {
    table: SymbolTable,
    /// Indexed by [`Reference::id`].
    resolutions: Vec<Resolution<MemberId>>,
    sites: Vec<CallSite>,
    files: Vec<PathBuf>,
}

impl CSharpModel {
    pub fn build(sources: &[SourceFile]) -> Result<Self, MoqError> {
        let start = Instant::now();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_c_sharp::LANGUAGE.into())?;

        // Unit 0 is the stub; unit i + 1 is sources[i].
        let texts: Vec<&str> = std::iter::once(MOQ_API_STUB)
            .chain(sources.iter().map(|s| s.text.as_str()))
            .collect();
        let mut trees = Vec::with_capacity(texts.len());
        for (unit, text) in texts.iter().enumerate() {
            let Some(tree) = parser.parse(text, None) else {
                let path = match unit {
                    0 => "<moq api stub>".to_string(),
                    _ => sources[unit - 1].path.display().to_string(),
                };
                return Err(MoqError::ParseFailed { path });
            };
            trees.push(tree);
        }

        let mut table = SymbolTable::default();
        let mut type_sites: Vec<TypeSite> = Vec::new();
        let usings: Vec<Vec<String>> = trees
            .iter()
            .enumerate()
            .map(|(unit, tree)| declare_types(&mut table, tree.root_node(), texts[unit].as_bytes(), unit, &mut type_sites))
            .collect();

        for site in &type_sites {
            declare_members(&mut table, site, texts[site.unit].as_bytes(), &usings[site.unit]);
        }

        let mut resolutions = Vec::new();
        let mut sites = Vec::new();
        for site in type_sites.iter().filter(|s| s.unit > 0) {
            lower_type_bodies(
                &table,
                site,
                texts[site.unit].as_bytes(),
                site.unit - 1,
                &usings[site.unit],
                &mut resolutions,
                &mut sites,
            );
        }
        sites.sort_by_key(|s: &CallSite| (s.file, s.call.line));

        debug!(
            files = sources.len(),
            types = table.type_count(),
            members = table.member_count(),
            calls = sites.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "C# model built"
        );

        Ok(Self {
            table,
            resolutions,
            sites,
            files: sources.iter().map(|s| s.path.clone()).collect(),
        })
    }

    /// Model over a single in-memory source.
    pub fn from_source(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self, MoqError> {
        Self::build(&[SourceFile::new(path, text)])
    }

    /// Every lowered invocation, ordered by file then line. Nested calls
    /// (fluent receivers, lambda bodies, arguments) appear as sites of their own.
    pub fn call_sites(&self) -> &[CallSite] {
        &self.sites
    }

    pub fn file_path(&self, file: usize) -> Option<&Path> {
        self.files.get(file).map(PathBuf::as_path)
    }

    pub fn member(&self, id: MemberId) -> Option<&MemberDecl> {
        self.table.member(id)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.table
    }

    /// `Namespace.Type.Member`, for reports.
    pub fn display_name(&self, id: MemberId) -> Option<String> {
        let member = self.table.member(id)?;
        Some(format!("{}.{}", self.table.full_name(member.owner), member.name))
    }
}

impl SemanticModel for CSharpModel {
    type Symbol = MemberId;

    fn resolve(&self, reference: &Reference) -> Resolution<MemberId> {
        self.resolutions
            .get(reference.id as usize)
            .cloned()
            .unwrap_or(Resolution::Unresolved)
    }

    fn canonical_signature(&self, symbol: &MemberId) -> Option<String> {
        self.table.canonical_signature(*symbol)
    }
}

impl ParameterSource for CSharpModel {
    fn parameters(&self, symbol: &MemberId) -> Vec<ParameterHint> {
        self.table
            .member(*symbol)
            .map(|member| {
                member
                    .parameters
                    .iter()
                    .map(|p| ParameterHint { type_name: p.type_text.clone(), name: p.name.clone() })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "csharp_tests.rs"]
mod tests;
