//! jsxgrade CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "jsxgrade", version, about = "Grade JSX/TypeScript submissions against test suites")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a source file against a suite
    Check {
        /// Source file to grade
        #[arg(long)]
        code: PathBuf,

        /// Suite file (.toml or .json)
        #[arg(long)]
        suite: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the feature context, validation, and quality metrics of a file
    Analyze {
        /// Source file to analyze
        #[arg(long)]
        code: PathBuf,
    },

    /// Validate suite files
    Validate {
        /// Path to suite file or directory (default: the configured suite_dir)
        #[arg(long)]
        suite: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Answer host protocol requests on stdin/stdout, one JSON object per line
    Serve {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example suite
    Init,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays machine-readable.
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "jsxgrade=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            code,
            suite,
            format,
            config,
        } => commands::check::execute(code, suite, format, config),
        Commands::Analyze { code } => commands::analyze::execute(code),
        Commands::Validate { suite, config } => commands::validate::execute(suite, config),
        Commands::Serve { config } => commands::serve::execute(config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
