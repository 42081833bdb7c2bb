//! Generation pipeline
//!
//! Sequences the stages: locate the project, merge the settings layers,
//! infer a schema, emit C# classes, tidy the text. Computing the generated
//! unit and writing it to disk are separate steps so the pipeline can be
//! exercised without filesystem side effects.

use regex_lite::Regex;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::codegen::{CSharpGenerator, CSharpGeneratorSettings, OptionTypeNamer};
use crate::locate::{self, LocateError};
use crate::schema::Schema;
use crate::settings::{EffectiveSettings, SettingsError};

/// Default root class name
pub const DEFAULT_CLASS_NAME: &str = "ServiceOptions";

/// Folder under the project directory receiving the generated file
pub const OPTIONS_FOLDER: &str = "Options";

/// Errors for the generation pipeline
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Inputs to a generation run
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Directory holding the base appsettings.json (and optionsgen.toml)
    pub working_dir: PathBuf,

    /// Project directory; located by ascending from `working_dir` when None
    pub project_dir: Option<PathBuf>,

    /// Top-level sections removed from the merged document before inference
    pub exclude_sections: Vec<String>,

    /// Root class name; defaults to [`DEFAULT_CLASS_NAME`]
    pub class_name: Option<String>,

    /// Namespace; derived from the project when None
    pub namespace: Option<String>,
}

impl GenerateRequest {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            project_dir: None,
            exclude_sections: Vec::new(),
            class_name: None,
            namespace: None,
        }
    }
}

/// A generated source unit, not yet written to disk
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    /// Namespace the classes live in
    pub namespace: String,

    /// Root class name
    pub class_name: String,

    /// Full source text
    pub text: String,

    /// Where [`write`](Self::write) will put the file
    pub output_path: PathBuf,
}

impl GeneratedUnit {
    /// Write the unit to its output path.
    ///
    /// Creates the options folder if missing and overwrites any existing
    /// file unconditionally.
    pub fn write(&self) -> io::Result<()> {
        if let Some(parent) = self.output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.output_path, &self.text)
    }
}

/// Run the generation pipeline.
///
/// Pure computation: nothing is written, so a failure at any stage leaves
/// the filesystem untouched. Callers persist the result with
/// [`GeneratedUnit::write`].
pub fn generate(request: &GenerateRequest) -> Result<GeneratedUnit, GenerateError> {
    let project_dir = match &request.project_dir {
        Some(dir) => dir.clone(),
        None => locate::find_project_dir(&request.working_dir)?,
    };

    let namespace = request
        .namespace
        .clone()
        .unwrap_or_else(|| locate::derive_namespace(&project_dir));
    let class_name = request
        .class_name
        .clone()
        .unwrap_or_else(|| DEFAULT_CLASS_NAME.to_string());

    let settings = EffectiveSettings::build(
        &request.working_dir,
        &project_dir,
        &request.exclude_sections,
    )?;

    let mut schema = Schema::infer(&settings.document, &class_name);

    let generator = CSharpGenerator::new(
        CSharpGeneratorSettings {
            namespace: namespace.clone(),
        },
        &OptionTypeNamer,
    );
    let text = collapse_blank_lines(&generator.generate_file(&mut schema));

    let output_path = project_dir
        .join(OPTIONS_FOLDER)
        .join(format!("{}.cs", class_name));

    Ok(GeneratedUnit {
        namespace,
        class_name,
        text,
        output_path,
    })
}

/// Build the merged-and-filtered settings document without generating code
pub fn merged_settings(request: &GenerateRequest) -> Result<EffectiveSettings, GenerateError> {
    let project_dir = match &request.project_dir {
        Some(dir) => dir.clone(),
        None => locate::find_project_dir(&request.working_dir)?,
    };

    Ok(EffectiveSettings::build(
        &request.working_dir,
        &project_dir,
        &request.exclude_sections,
    )?)
}

/// Collapse any run of three or more newlines down to exactly two.
///
/// Cosmetic only: all other text is unchanged.
pub fn collapse_blank_lines(text: &str) -> String {
    static BLANK_RUN: OnceLock<Regex> = OnceLock::new();
    let re = BLANK_RUN.get_or_init(|| Regex::new(r"\n{3,}").unwrap());
    re.replace_all(text, "\n\n").into_owned()
}
