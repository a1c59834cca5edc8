//! `scan`: classify every call in a set of C# files.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use ignore::WalkBuilder;
use serde::Serialize;
use tracing::{debug, info, warn};

use moq_complete::csharp::{CSharpModel, SourceFile};
use moq_complete::{CallClassifier, Category, CompletionHint, MoqError, Resolution, SemanticModel, completion_hint};

use super::args::{OutputFormat, ScanArgs};

/// One reported call.
#[derive(Serialize, Debug, Clone)]
pub struct ScanEntry {
    pub path: String,
    pub line: u32,
    pub category: Option<Category>,
    /// Callee name as written.
    pub callee: String,
    /// Canonical signature when the callee resolved to exactly one member.
    pub signature: Option<String>,
    /// Member mocked by a Setup call, e.g. `Tests.IService.Send`.
    pub mocked_member: Option<String>,
    pub hint: Option<CompletionHint>,
}

#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub files: usize,
    pub unreadable: usize,
    pub lossy: usize,
    pub calls: usize,
    pub setup: usize,
    pub verify: usize,
    pub callback: usize,
    pub returns: usize,
}

impl ScanSummary {
    fn count(&mut self, category: Category) {
        match category {
            Category::Setup => self.setup += 1,
            Category::Verify => self.verify += 1,
            Category::Callback => self.callback += 1,
            Category::Return => self.returns += 1,
        }
    }
}

#[derive(Debug)]
pub struct ScanReport {
    pub entries: Vec<ScanEntry>,
    pub summary: ScanSummary,
}

// ─── File discovery ─────────────────────────────────────────────────

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

/// Files named directly are taken as-is; directories are walked honouring
/// `.gitignore` unless `--no-ignore` is set.
pub fn collect_files(args: &ScanArgs) -> Result<Vec<PathBuf>, MoqError> {
    let extensions = args.extensions();
    if extensions.is_empty() {
        return Err(MoqError::InvalidArgs("--ext must name at least one extension".to_string()));
    }

    let mut files = Vec::new();
    for root in &args.paths {
        let root_path = Path::new(root);
        if !root_path.exists() {
            return Err(MoqError::PathNotFound(root.clone()));
        }
        if root_path.is_file() {
            files.push(root_path.to_path_buf());
            continue;
        }

        let mut builder = WalkBuilder::new(root_path);
        builder.hidden(!args.hidden);
        builder.git_ignore(!args.no_ignore);
        builder.git_global(!args.no_ignore);
        builder.git_exclude(!args.no_ignore);
        // .gitignore applies even outside a git checkout
        builder.require_git(false);

        for entry in builder.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };
            if entry.file_type().is_some_and(|t| t.is_file()) && has_extension(entry.path(), &extensions) {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

// ─── Scan ───────────────────────────────────────────────────────────

pub fn scan(args: &ScanArgs) -> Result<ScanReport, MoqError> {
    let start = Instant::now();
    let files = collect_files(args)?;
    let mut summary = ScanSummary::default();

    let mut sources = Vec::with_capacity(files.len());
    for path in &files {
        match SourceFile::read_lossy(path) {
            Ok((source, lossy)) => {
                if lossy {
                    warn!(path = %path.display(), "File is not valid UTF-8, decoded lossily");
                    summary.lossy += 1;
                }
                sources.push(source);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read file");
                summary.unreadable += 1;
            }
        }
    }
    summary.files = sources.len();
    debug!(files = sources.len(), "Building C# model");

    let model = CSharpModel::build(&sources)?;
    let classifier = CallClassifier::new(&model);

    let mut entries = Vec::new();
    for site in model.call_sites() {
        summary.calls += 1;
        let call = &site.call;
        let category = classifier.classify(Some(call));
        if let Some(category) = category {
            summary.count(category);
        } else if !args.all {
            continue;
        }

        let signature = match call.reference.as_ref().map(|r| model.resolve(r)) {
            Some(Resolution::Resolved(id)) => model.canonical_signature(&id),
            _ => None,
        };
        let mocked_member = classifier
            .mocked_method_from_setup(Some(call))
            .and_then(|id| model.display_name(id));

        entries.push(ScanEntry {
            path: model
                .file_path(site.file)
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            line: call.line,
            category,
            callee: call.reference.as_ref().map(|r| r.name.clone()).unwrap_or_default(),
            signature,
            mocked_member,
            hint: completion_hint(&classifier, call),
        });
    }

    info!(
        files = summary.files,
        calls = summary.calls,
        reported = entries.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Scan finished"
    );
    Ok(ScanReport { entries, summary })
}

// ─── Output ─────────────────────────────────────────────────────────

pub fn write_text(out: &mut impl Write, entries: &[ScanEntry]) -> std::io::Result<()> {
    for entry in entries {
        let category = entry.category.map(|c| c.as_str()).unwrap_or("-");
        write!(out, "{}:{}  {:<8}  {}", entry.path, entry.line, category, entry.callee)?;
        if let Some(member) = &entry.mocked_member {
            write!(out, "  -> {}", member)?;
        }
        if let Some(hint) = &entry.hint {
            write!(out, "  {}", hint.text.trim_end())?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_json(out: &mut impl Write, entries: &[ScanEntry]) -> Result<(), MoqError> {
    serde_json::to_writer_pretty(&mut *out, entries)?;
    writeln!(out)?;
    Ok(())
}

pub fn cmd_scan(args: ScanArgs) -> Result<(), MoqError> {
    let report = scan(&args)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Text => write_text(&mut out, &report.entries)?,
        OutputFormat::Json => write_json(&mut out, &report.entries)?,
    }

    let s = &report.summary;
    eprintln!(
        "[scan] {} files, {} calls: {} setup, {} verify, {} callback, {} returns",
        s.files, s.calls, s.setup, s.verify, s.callback, s.returns
    );
    if s.unreadable > 0 || s.lossy > 0 {
        eprintln!("[scan] {} unreadable, {} lossy-UTF8 files", s.unreadable, s.lossy);
    }
    Ok(())
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;
