//! Repo-local architectural lint for enforcing hexagonal boundaries.
//!
//! The discovery crate keeps its core in `domain` (services plus driven
//! ports) and its infrastructure in `outbound` adapters; configuration and
//! the command-line binary sit outside both. This lint:
//!
//! - forbids `domain` code from depending on `outbound`, `config`, or `bin`,
//!   or on transport, filesystem, and process-setup crates
//! - forbids `outbound` adapters from depending on `config` or `bin`, or on
//!   process-setup crates
//!
//! Run it with `cargo run -p architecture-lint`.

use std::collections::BTreeSet;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};
use syn::visit::Visit;
use thiserror::Error;

/// Name the linted crate uses for itself in absolute paths.
const CRATE_NAME: &str = "discovery";

/// One forbidden dependency found in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}: {message}")]
pub struct Violation {
    /// File path relative to `discovery/src`.
    pub file: Utf8PathBuf,
    /// Which boundary the file crosses.
    pub message: String,
}

/// Why a lint run did not pass.
#[derive(Debug, Error)]
pub enum ArchitectureLintError {
    /// The source tree could not be opened or read.
    #[error("could not read crate sources: {0}")]
    Io(#[from] io::Error),
    /// A directory entry name is not UTF-8; holds the lossy rendering.
    #[error("source path is not valid UTF-8: {0}")]
    NonUtf8Path(String),
    /// A file sits outside the linted layers or is not valid Rust.
    #[error("cannot lint {file}: {message}")]
    Parse {
        /// File path relative to `discovery/src`.
        file: Utf8PathBuf,
        /// Parser or layer-inference failure.
        message: String,
    },
    /// Every boundary crossing found across the linted files.
    #[error("{}", render_violations(.0))]
    Violations(Vec<Violation>),
}

fn render_violations(violations: &[Violation]) -> String {
    violations.iter().fold(
        String::from("Architecture boundary violations:\n"),
        |mut out, violation| {
            out.push_str("- ");
            out.push_str(&violation.to_string());
            out.push('\n');
            out
        },
    )
}

/// Lint the discovery crate sources on disk.
///
/// `crate_dir` must be the `discovery/` directory at the repository root.
pub fn lint_crate_sources(crate_dir: &Utf8Path) -> Result<(), ArchitectureLintError> {
    let src_dir = Dir::open_ambient_dir(crate_dir.join("src"), ambient_authority())?;
    let sources = collect_lint_sources(&src_dir)?;
    lint_sources(&sources)
}

/// Lint already-loaded sources; paths are relative to `discovery/src`.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();
    for source in sources {
        violations.extend(source.violations()?);
    }
    if violations.is_empty() {
        return Ok(());
    }
    Err(ArchitectureLintError::Violations(violations))
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `discovery/src`.
    pub file: Utf8PathBuf,
    /// Full Rust source text of the file.
    pub contents: String,
}

impl LintSource {
    fn violations(&self) -> Result<Vec<Violation>, ArchitectureLintError> {
        let parse_error = |message: String| ArchitectureLintError::Parse {
            file: self.file.clone(),
            message,
        };
        let layer = ModuleLayer::infer_from_path(&self.file)
            .ok_or_else(|| parse_error("file is outside the domain and outbound layers".to_owned()))?;
        let parsed = syn::parse_file(&self.contents).map_err(|err| parse_error(err.to_string()))?;
        Ok(lint_parsed_source(&self.file, layer, &parsed))
    }
}

/// The architectural layer inferred from a file path under `discovery/src`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModuleLayer {
    Domain,
    Outbound,
}

impl ModuleLayer {
    const ROOTS: [&'static str; 2] = ["domain", "outbound"];

    fn infer_from_path(relative_path: &Utf8Path) -> Option<Self> {
        match relative_path.components().next()?.as_str() {
            "domain" => Some(Self::Domain),
            "outbound" => Some(Self::Outbound),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Outbound => "outbound",
        }
    }

    fn forbidden_module_roots(self) -> BTreeSet<&'static str> {
        match self {
            Self::Domain => BTreeSet::from(["bin", "config", "outbound"]),
            Self::Outbound => BTreeSet::from(["bin", "config"]),
        }
    }

    fn forbidden_crate_roots(self) -> BTreeSet<&'static str> {
        match self {
            Self::Domain => BTreeSet::from([
                "cap_std",
                "clap",
                "color_eyre",
                "ortho_config",
                "reqwest",
                "tracing_subscriber",
            ]),
            Self::Outbound => {
                BTreeSet::from(["clap", "color_eyre", "ortho_config", "tracing_subscriber"])
            }
        }
    }
}

fn lint_parsed_source(
    file: &Utf8Path,
    layer: ModuleLayer,
    parsed: &syn::File,
) -> Vec<Violation> {
    let forbidden_modules = layer.forbidden_module_roots();
    let forbidden_crates = layer.forbidden_crate_roots();
    let layer_name = layer.name();

    let mut collector = PathCollector::default();
    collector.visit_file(parsed);

    let mut messages = BTreeSet::new();
    for segments in &collector.paths {
        if let Some(root) = internal_module_root(segments)
            .and_then(|root| forbidden_modules.get(root).copied())
        {
            messages.insert(format!(
                "{layer_name} module must not depend on crate::{root}"
            ));
        }

        if let Some(root) =
            external_crate_root(segments).and_then(|root| forbidden_crates.get(root).copied())
        {
            messages.insert(format!(
                "{layer_name} module must not depend on external crate `{root}`"
            ));
        }
    }

    messages
        .into_iter()
        .map(|message| Violation {
            file: file.to_path_buf(),
            message,
        })
        .collect()
}

fn is_relative_module_segment(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super")
}

fn internal_module_root(segments: &[String]) -> Option<&str> {
    let first = segments.first()?.as_str();
    let start_index = match first {
        "crate" | "self" | "super" => segments
            .iter()
            .position(|segment| !is_relative_module_segment(segment.as_str()))?,
        CRATE_NAME => 1,
        _ => return None,
    };
    segments.get(start_index).map(String::as_str)
}

fn external_crate_root(segments: &[String]) -> Option<&str> {
    let root = segments.first()?.as_str();
    if is_relative_module_segment(root) || root == CRATE_NAME {
        return None;
    }
    Some(root)
}

#[derive(Default)]
struct PathCollector {
    paths: BTreeSet<Vec<String>>,
}

impl PathCollector {
    fn record_path(&mut self, path: &syn::Path) {
        let segments = path
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect::<Vec<_>>();
        if !segments.is_empty() {
            self.paths.insert(segments);
        }
    }

    fn record_use_tree(&mut self, tree: &syn::UseTree, prefix: Vec<String>) {
        let leaf = |mut segments: Vec<String>, last: String| {
            segments.push(last);
            segments
        };
        match tree {
            syn::UseTree::Path(path) => {
                self.record_use_tree(&path.tree, leaf(prefix, path.ident.to_string()));
            }
            syn::UseTree::Name(name) => {
                self.paths.insert(leaf(prefix, name.ident.to_string()));
            }
            syn::UseTree::Rename(rename) => {
                self.paths.insert(leaf(prefix, rename.ident.to_string()));
            }
            syn::UseTree::Glob(_) => {
                self.paths.insert(leaf(prefix, "*".to_owned()));
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.record_use_tree(item, prefix.clone());
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for PathCollector {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        self.record_path(node);
        syn::visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.record_use_tree(&node.tree, Vec::new());
    }
}

fn collect_lint_sources(src_dir: &Dir) -> Result<Vec<LintSource>, ArchitectureLintError> {
    let mut sources = Vec::new();
    for layer_root in ModuleLayer::ROOTS {
        if !src_dir.is_dir(layer_root) {
            continue;
        }
        let layer_dir = src_dir.open_dir(layer_root)?;
        collect_sources_under(&layer_dir, Utf8Path::new(layer_root), &mut sources)?;
    }
    sources.sort_by(|a, b| a.file.cmp(&b.file));
    Ok(sources)
}

fn collect_sources_under(
    dir: &Dir,
    relative: &Utf8Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), ArchitectureLintError> {
    for entry in dir.entries()? {
        let entry = entry?;
        let name = entry
            .file_name()
            .into_string()
            .map_err(|raw| ArchitectureLintError::NonUtf8Path(raw.to_string_lossy().into_owned()))?;
        let path = relative.join(&name);

        if entry.file_type()?.is_dir() {
            collect_sources_under(&entry.open_dir()?, &path, sources)?;
            continue;
        }
        if path.extension() != Some("rs") {
            continue;
        }

        let contents = dir.read_to_string(&name)?;
        sources.push(LintSource {
            file: path,
            contents,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests;
