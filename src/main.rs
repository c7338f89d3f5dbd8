//! SAGC CLI - compile saved agent graph projects to SPADE code.

use clap::{Args, Parser, Subcommand};
use sagc::{generate_project, GeneratorConfig, Project, SagcError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// SAGC: SPADE Agent Graph Compiler
///
/// Turns agent graphs saved by the editor into runnable SPADE Python programs.
#[derive(Debug, Parser)]
#[command(name = "sagc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output (can be repeated: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Generator configuration file (TOML).
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate code from a project file and package it as a zip archive.
    #[command(visible_alias = "g")]
    Generate(GenerateArgs),

    /// Validate a project file without writing anything.
    Check {
        /// Saved project file.
        #[arg(value_name = "PROJECT")]
        input: PathBuf,
    },

    /// Show version information.
    Version,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Saved project file.
    #[arg(value_name = "PROJECT")]
    input: PathBuf,

    /// Archive path (defaults to the project name with a .zip extension).
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the main document to stdout instead of writing an archive.
    #[arg(long)]
    print: bool,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<GeneratorConfig, SagcError> {
    match path {
        Some(path) => GeneratorConfig::from_file(path),
        None => Ok(GeneratorConfig::default()),
    }
}

fn execute_generate(args: GenerateArgs, config: &GeneratorConfig) -> Result<(), SagcError> {
    let project = Project::load(&args.input)?;
    let generated = generate_project(&project, config)?;

    if args.print {
        print!("{}", generated.main.content);
        return Ok(());
    }

    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension("zip"));
    std::fs::write(&output, generated.to_archive()?)?;
    tracing::info!("[SAGC] Wrote {}", output.display());
    println!(
        "Generated {} (+{} reasoning file(s)) -> {}",
        generated.main.name,
        generated.auxiliary.len(),
        output.display()
    );
    Ok(())
}

fn execute_check(input: &Path, config: &GeneratorConfig) -> Result<(), SagcError> {
    let project = Project::load(input)?;
    generate_project(&project, config)?;
    println!(
        "{}: ok ({} nodes, {} edges)",
        input.display(),
        project.nodes.len(),
        project.edges.len()
    );
    Ok(())
}

fn print_version() {
    println!("sagc {}", env!("CARGO_PKG_VERSION"));
    println!("project format {}", sagc::PROJECT_VERSION);
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::Generate(args) => execute_generate(args, &config),
        Command::Check { input } => execute_check(&input, &config),
        Command::Version => {
            print_version();
            Ok(())
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(SagcError::Validation(failure)) => {
            eprintln!("{}", failure);
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}
