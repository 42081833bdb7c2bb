//! Project location and namespace derivation
//!
//! Finds the hosting project directory by walking up from the working
//! directory until a `Program.cs` entry point is found, then derives the
//! namespace for generated code from the project's `Startup.cs` (parsed
//! statically from source text) or, failing that, from the project folder
//! name.

use regex_lite::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Errors for project location
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("No directory containing Program.cs found between {0} and the filesystem root")]
    ProjectNotFound(PathBuf),
}

/// Filename suffix identifying the project entry point
const ENTRY_POINT_SUFFIX: &str = "Program.cs";

/// Filename suffix identifying the startup module
const STARTUP_SUFFIX: &str = "Startup.cs";

/// Suffix appended to the derived namespace
const NAMESPACE_SUFFIX: &str = ".Options";

/// Find the project directory by ascending from `start`.
///
/// Returns the first ancestor directory (including `start` itself) that
/// directly contains a file ending in `Program.cs`. Reaching the filesystem
/// root without a hit is fatal: it means the working directory is not inside
/// a project.
pub fn find_project_dir(start: &Path) -> Result<PathBuf, LocateError> {
    // Relative starts (the CLI default ".") have no parent chain to ascend
    let mut dir = if start.is_absolute() {
        start.to_path_buf()
    } else {
        start.canonicalize()?
    };

    loop {
        if contains_file_with_suffix(&dir, ENTRY_POINT_SUFFIX)? {
            return Ok(dir);
        }

        match dir.parent() {
            Some(parent) => dir = parent.to_path_buf(),
            None => return Err(LocateError::ProjectNotFound(start.to_path_buf())),
        }
    }
}

/// Derive the namespace for generated code from the project directory.
///
/// If the project directory contains a startup module (a file ending in
/// `Startup.cs`), its declared namespace is parsed from source text and the
/// result is `<namespace>.Options`. A missing startup module, or one with no
/// parseable namespace declaration, is not an error: the namespace falls back
/// to `<project folder name>.Options`.
///
/// Folder names are assumed to already be valid identifiers in the target
/// language; no sanitization is performed.
pub fn derive_namespace(project_dir: &Path) -> String {
    if let Some(ns) = startup_namespace(project_dir) {
        return format!("{}{}", ns, NAMESPACE_SUFFIX);
    }

    let folder = project_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    format!("{}{}", folder, NAMESPACE_SUFFIX)
}

/// Best-effort namespace lookup from the startup module's source text.
///
/// Matches both file-scoped (`namespace Foo.Bar;`) and block
/// (`namespace Foo.Bar {`) declarations; the first declaration wins.
fn startup_namespace(project_dir: &Path) -> Option<String> {
    static NAMESPACE: OnceLock<Regex> = OnceLock::new();

    let startup = find_file_with_suffix(project_dir, STARTUP_SUFFIX)?;
    let source = fs::read_to_string(&startup).ok()?;

    let re = NAMESPACE.get_or_init(|| Regex::new(r"namespace\s+([A-Za-z_][A-Za-z0-9_.]*)").unwrap());
    let ns = re.captures(&source)?.get(1)?.as_str();

    if ns.is_empty() {
        None
    } else {
        Some(ns.to_string())
    }
}

/// Whether `dir` directly contains a file whose name ends with `suffix`
fn contains_file_with_suffix(dir: &Path, suffix: &str) -> Result<bool, io::Error> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        // An unreadable ancestor just means the search continues upward
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => return Ok(false),
        Err(e) => return Err(e),
    };

    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() && entry.file_name().to_string_lossy().ends_with(suffix) {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Find the lexicographically first file in `dir` whose name ends with `suffix`
fn find_file_with_suffix(dir: &Path, suffix: &str) -> Option<PathBuf> {
    let mut matches: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().map(|t| t.is_file()).unwrap_or(false)
                && entry.file_name().to_string_lossy().ends_with(suffix)
        })
        .map(|entry| entry.path())
        .collect();

    matches.sort();
    matches.into_iter().next()
}
