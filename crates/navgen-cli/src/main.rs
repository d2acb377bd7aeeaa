//! navgen CLI - generate hybrid automaton benchmark instances.
//!
//! Builds the Navigation benchmark from a feedback matrix and a grid of
//! heading codes, then prints a summary or a JSON dump of the model.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

mod commands;
mod config;

use commands::{generate, presets, OutputFormat};

/// navgen - Hybrid automaton benchmark generator.
///
/// Run `navgen generate nav --preset fig1b` for a quick look at the
/// classic 3x3 instance.
#[derive(Parser, Debug)]
#[command(
    name = "navgen",
    author,
    version,
    about = "navgen: Generate hybrid automaton benchmark models",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a model with one of the registered generators.
    #[command(subcommand)]
    Generate(GenerateCommands),

    /// List the built-in benchmark presets.
    Presets,

    /// List the registered generators.
    Generators,
}

/// One subcommand per generator flag.
#[derive(Subcommand, Debug)]
pub enum GenerateCommands {
    /// Navigation benchmark (Fehnker et al., HSCC 2004).
    Nav(NavArgs),
}

/// Options of the navigation generator.
///
/// Flags override values from `--config`, which override `--preset`.
#[derive(Args, Debug, Clone, Default)]
pub struct NavArgs {
    /// Start from a named preset (fig1b, fig2a, fig2b).
    #[arg(long)]
    pub preset: Option<String>,

    /// JSON file with generator options.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Feedback matrix entries a11 a12 a21 a22.
    #[arg(
        long,
        num_args = 4,
        allow_negative_numbers = true,
        value_names = ["A11", "A12", "A21", "A22"]
    )]
    pub matrix: Option<Vec<f64>>,

    /// Cell codes in row-major order: 0-8 (heading), A (goal), B (forbidden).
    #[arg(long = "i-list", num_args = 1.., value_name = "CODE")]
    pub i_list: Option<Vec<String>>,

    /// Grid width in cells.
    #[arg(long, allow_negative_numbers = true)]
    pub width: Option<i64>,

    /// Initial x position.
    #[arg(long, allow_negative_numbers = true)]
    pub startx: Option<f64>,

    /// Initial y position.
    #[arg(long, allow_negative_numbers = true)]
    pub starty: Option<f64>,

    /// Bound k of the velocity disturbance [-k, k].
    #[arg(long, allow_negative_numbers = true)]
    pub noise: Option<f64>,

    /// Mode name prefix.
    #[arg(long)]
    pub prefix: Option<String>,

    /// Analysis time horizon stored in the export settings.
    #[arg(long, allow_negative_numbers = true)]
    pub time_horizon: Option<f64>,

    /// Output format: summary or json.
    #[arg(short, long, default_value = "summary")]
    pub format: String,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate(GenerateCommands::Nav(args)) => {
            let format: OutputFormat = args.format.parse()?;
            generate::execute_nav(&args, format)
        }
        Commands::Presets => presets::execute(),
        Commands::Generators => presets::list_generators(),
    }
}
