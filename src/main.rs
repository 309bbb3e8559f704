use std::fs::OpenOptions;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use llm_comp::config::{self, UiMode};
use llm_comp::{cli, env, init, tui, ReqwestTransport};

/// Log directory used by `--verbose` in interactive mode
const LOG_DIR: &str = ".llm-comp";
const LOG_FILE: &str = "debug.log";

#[derive(Parser)]
#[command(name = "llm-comp")]
#[command(author, about = "Compare LLM responses side by side", long_about = None)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), env!("LLM_COMP_VERSION_SUFFIX")))]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Prompt sent to every selected model (read from stdin when omitted)
    prompt: Vec<String>,

    /// Print results as JSON instead of opening the comparison screen
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding llm-comp.toml, .env and the result files
    #[arg(long, global = true)]
    cwd: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create llm-comp.toml and .env templates
    Init,
}

/// Where log lines go
enum LogTarget<'a> {
    Stderr,
    /// Interactive screens own the terminal; logs go to a file or nowhere
    File(&'a Path),
    Discard,
}

fn init_logging(target: LogTarget<'_>, verbose: bool) -> Result<()> {
    let filter = if verbose { "llm_comp=debug" } else { "llm_comp=info" };
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    match target {
        LogTarget::Stderr => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init(),
        LogTarget::File(cwd) => {
            let dir = cwd.join(LOG_DIR);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join(LOG_FILE))
                .with_context(|| format!("Failed to open {}", dir.join(LOG_FILE).display()))?;
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init()
        }
        LogTarget::Discard => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::sink))
            .init(),
    }
    Ok(())
}

fn read_stdin_prompt() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read prompt from stdin")?;
    Ok(buf.trim().to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine working directory")?,
    };

    if !env::dotenv_disabled() {
        env::load_dotenv(&cwd)?;
    }

    if let Some(Commands::Init) = cli.command {
        init_logging(LogTarget::Stderr, cli.verbose)?;
        let report = init::init_project_files(&cwd)?;
        print!("{}", cli::init_summary(&report));
        return Ok(());
    }

    let mut prompt = cli.prompt.join(" ").trim().to_string();
    if prompt.is_empty() && !io::stdin().is_terminal() {
        prompt = read_stdin_prompt()?;
    }
    if prompt.is_empty() {
        println!("{}", cli::help_text());
        std::process::exit(1);
    }

    let resolved = config::resolve_config(&cwd)?;
    let json_mode =
        cli.json || resolved.config.ui.mode == UiMode::Json || !tui::terminal::is_interactive();

    let target = if json_mode {
        LogTarget::Stderr
    } else if cli.verbose {
        LogTarget::File(&cwd)
    } else {
        LogTarget::Discard
    };
    init_logging(target, cli.verbose)?;
    tracing::info!("{}", resolved.help_text());

    let transport = Arc::new(ReqwestTransport::new());
    if json_mode {
        cli::run_json(&prompt, &resolved.config, transport.as_ref(), &mut io::stdout()).await
    } else {
        cli::run_interactive(&cwd, &prompt, &resolved.config, transport).await
    }
}
