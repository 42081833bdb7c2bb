//! optionsgen CLI
//!
//! Entry point for the `optionsgen` command-line tool.

use clap::{Args, Parser, Subcommand};
use optionsgen::{generate, merged_settings, GenerateRequest, ToolConfig};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "optionsgen")]
#[command(about = "Generate typed option classes from layered appsettings files", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by all pipeline commands; values from optionsgen.toml fill
/// in anything left unset
#[derive(Args)]
struct PipelineArgs {
    /// Working directory holding appsettings.json (default: current dir)
    #[arg(long, short = 'd')]
    dir: Option<PathBuf>,

    /// Project directory (default: located by ascending from the working dir)
    #[arg(long, short = 'p')]
    project_dir: Option<PathBuf>,

    /// Top-level section to exclude from generation (repeatable)
    #[arg(long, short = 'x')]
    exclude: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the options source file
    Generate {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Root class name (default: ServiceOptions)
        #[arg(long)]
        class_name: Option<String>,

        /// Namespace for generated classes (default: derived from the project)
        #[arg(long)]
        namespace: Option<String>,

        /// Print the generated text instead of writing the output file
        #[arg(long)]
        stdout: bool,
    },

    /// Print the merged-and-filtered settings document
    Merged {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Also print the contributing files with digests
        #[arg(long)]
        sources: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            pipeline,
            class_name,
            namespace,
            stdout,
        } => run_generate(pipeline, class_name, namespace, stdout),
        Commands::Merged { pipeline, sources } => run_merged(pipeline, sources),
    }
}

/// Build a request from CLI flags plus optionsgen.toml, flags winning
fn build_request(
    pipeline: PipelineArgs,
    class_name: Option<String>,
    namespace: Option<String>,
) -> GenerateRequest {
    let working_dir = pipeline.dir.unwrap_or_else(|| PathBuf::from("."));

    let config = match ToolConfig::load(&working_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading optionsgen.toml: {}", e);
            process::exit(1);
        }
    };

    // A relative project_dir from the file is anchored to the working dir it
    // was loaded from; the CLI flag resolves as the shell gave it
    let project_dir = pipeline
        .project_dir
        .or_else(|| config.resolved_project_dir(&working_dir));

    let mut exclude = config.exclude;
    exclude.extend(pipeline.exclude);

    let mut request = GenerateRequest::new(working_dir);
    request.project_dir = project_dir;
    request.exclude_sections = exclude;
    request.class_name = class_name.or(config.class_name);
    request.namespace = namespace.or(config.namespace);
    request
}

fn run_generate(
    pipeline: PipelineArgs,
    class_name: Option<String>,
    namespace: Option<String>,
    stdout: bool,
) {
    let request = build_request(pipeline, class_name, namespace);

    let unit = match generate(&request) {
        Ok(unit) => unit,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if stdout {
        print!("{}", unit.text);
        return;
    }

    if let Err(e) = unit.write() {
        eprintln!("Error writing {}: {}", unit.output_path.display(), e);
        process::exit(1);
    }

    println!("Generated {}", unit.output_path.display());
}

fn run_merged(pipeline: PipelineArgs, sources: bool) {
    let request = build_request(pipeline, None, None);

    let settings = match merged_settings(&request) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    match settings.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }

    if sources {
        eprintln!();
        for source in &settings.sources {
            eprintln!("{:?}: {} ({})", source.origin, source.path, source.digest);
        }
    }
}
