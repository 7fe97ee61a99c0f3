use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use porotos::ai::{ModelSpeed, ProviderKind};
use porotos::cli::ClassifyOptions;

/// Parse provider name from string
fn parse_provider(s: &str) -> Result<ProviderKind, String> {
    s.parse::<ProviderKind>().map_err(|e| e.to_string())
}

#[derive(Parser)]
#[command(name = "porotos")]
#[command(
    version,
    about = "Classifies quarterly porotos with an LLM, enriched from Jira"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every ticket key found in an input table
    Classify {
        #[arg(help = "Input table (CSV; `;`, `,` or tab separated)")]
        input: PathBuf,
        #[arg(
            long,
            short,
            help = "Output table (default: Resultado_Clasificado_Q<q>-<year>.csv)"
        )]
        output: Option<PathBuf>,
        #[arg(long, value_parser = parse_provider, help = "LLM provider (groq, gemini, openai)")]
        provider: Option<ProviderKind>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
        #[arg(long, help = "Groq model preset: fast, accurate")]
        speed: Option<ModelSpeed>,
        #[arg(long, help = "Ticket key prefix (default: SMPR)")]
        prefix: Option<String>,
        #[arg(long = "no-tracker", help = "Skip Jira enrichment")]
        no_tracker: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths and credential status
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mporotos encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Classify {
            input,
            output,
            provider,
            model,
            speed,
            prefix,
            no_tracker,
        } => {
            porotos::cli::commands::classify::run(ClassifyOptions {
                input,
                output,
                provider,
                model,
                speed,
                prefix,
                no_tracker,
                quiet: cli.quiet,
            })?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                porotos::cli::commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                porotos::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                porotos::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
