use std::path::Path;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dmf_cli::confirm::ReadlineConfirm;
use dmf_cli::orchestrator::{Orchestrator, RunOutcome};
use dmf_cli::{ingest, load_config, scan};
use dmf_domain::config::Config;
use dmf_domain::counter::HeuristicCounter;
use dmf_domain::prompt::PromptTable;
use dmf_providers::OpenAiCompatClient;

/// docmyfiles — generate a project README with a language model.
#[derive(Debug, Parser)]
#[command(name = "docmyfiles", version, about)]
struct Cli {
    /// Path to the config file (falls back to DMF_CONFIG, then
    /// docmyfiles.toml).
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan the project and generate the README (default when no
    /// subcommand is given).
    Generate,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Parse the config file and report any issues.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let (config, config_path) = load_config(cli.config.as_deref())?;

    match cli.command {
        None | Some(Command::Generate) => generate(config).await,
        Some(Command::Config(ConfigCommand::Validate)) => {
            let issues = config.validate();
            if issues.is_empty() {
                eprintln!("{config_path}: OK");
                Ok(())
            } else {
                for issue in &issues {
                    eprintln!("{config_path}: {issue}");
                }
                std::process::exit(1);
            }
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Some(Command::Version) => {
            println!("docmyfiles {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Compact stderr-only tracing so diagnostics never pollute stdout.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// The full flow: scan, ingest, plan, confirm, send, write.
async fn generate(config: Config) -> anyhow::Result<()> {
    let budget = config.budget.resolve()?;
    let counter = HeuristicCounter::default();
    let prompts = PromptTable::build(&config.project.description, &counter)?;
    let client = OpenAiCompatClient::from_config(&config.llm)?;
    let mut confirm = ReadlineConfirm::new()?;

    let root = Path::new(&config.project.root);
    let files = scan::collect_files(root, &config.project.exclude)?;
    tracing::info!(files = files.len(), root = %root.display(), "project scanned");

    let messages = ingest::ingest(&files).await;

    let mut orchestrator =
        Orchestrator::new(&config, budget, &prompts, &counter, &client, &mut confirm);

    match orchestrator.run(messages).await? {
        RunOutcome::Completed(summary) => {
            println!("README.md written to {}", root.join("README.md").display());
            println!(
                "  requests: {}   messages sent: {}   files ignored: {}",
                summary.batch_count, summary.total_messages, summary.ignored
            );
            println!(
                "  tokens used: {}   estimated cost: ${:.4}",
                summary.tokens_used, summary.estimated_cost
            );
            Ok(())
        }
        RunOutcome::Declined => {
            println!("Run cancelled, nothing was sent.");
            Ok(())
        }
    }
}
