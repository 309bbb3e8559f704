//! Command runners behind the `llm-comp` binary

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc::unbounded_channel;

use crate::catalog::MODEL_CATALOG;
use crate::config::Config;
use crate::init::InitReport;
use crate::llm::{self, ConfiguredInvoker, ModelInvoker, Transport};
use crate::persistence;
use crate::tui::tabbed::spawn_invocations;
use crate::tui::{
    json, terminal, EventHandler, ModelSelector, SystemClipboard, TabbedSession, TabbedState,
    TerminalGuard,
};

/// How often the input thread gives up waiting for a key to check whether
/// the session is still listening.
const INPUT_POLL_RATE: Duration = Duration::from_millis(100);

pub fn help_text() -> String {
    format!(
        "llm-comp - Compare LLM responses in a tabbed UI\n\
         \n\
         Usage:\n  \
           llm-comp \"your prompt\"\n  \
           echo \"your prompt\" | llm-comp\n  \
           llm-comp init\n\
         \n\
         Notes:\n  \
           - Config: ./{config} or the user config directory ({env} overrides)\n  \
           - API keys: ./.env (auto-loaded) or environment variables\n  \
           - UI: Select models, confirm, then view results in tabs\n  \
           - Piped output or --json prints results as JSON",
        config = crate::config::CONFIG_FILE_NAME,
        env = crate::config::ENV_CONFIG_PATH,
    )
}

/// Human-readable summary of `llm-comp init`.
pub fn init_summary(report: &InitReport) -> String {
    let mut out = String::new();
    if !report.created.is_empty() {
        out.push_str("Created:\n");
        for path in &report.created {
            out.push_str(&format!("  - {}\n", path));
        }
    }
    if !report.skipped.is_empty() {
        out.push_str("Skipped (already exists):\n");
        for path in &report.skipped {
            out.push_str(&format!("  - {}\n", path));
        }
    }
    out.push_str("\nNext: Add your API keys to .env\n");
    out
}

/// Run every enabled provider with its configured models and print the
/// outcomes as JSON.
pub async fn run_json(
    prompt: &str,
    config: &Config,
    transport: &dyn Transport,
    out: &mut impl Write,
) -> Result<()> {
    tracing::info!("Running all providers in JSON mode");
    let outcomes = llm::run_all(prompt, &config.providers, transport).await;
    json::write_json(out, &outcomes)
}

/// Selector, confirm step and comparison screen on one raw-mode terminal.
///
/// The selection is saved when confirmed; results are saved once every tab
/// has settled. Quitting early leaves the previous results file alone.
pub async fn run_interactive(
    cwd: &Path,
    prompt: &str,
    config: &Config,
    transport: Arc<dyn Transport>,
) -> Result<()> {
    let defaults = persistence::load_selection(cwd);

    let _guard = TerminalGuard::acquire().context("Failed to enter raw mode")?;
    let (tx, mut rx) = unbounded_channel();
    let _input = EventHandler::with_poll_rate(INPUT_POLL_RATE).spawn(tx.clone());
    let mut stdout = io::stdout();

    let mut selector = ModelSelector::new(&MODEL_CATALOG, &defaults);
    let selection = selector.run(&mut rx, &mut stdout).await?;
    if !selection.confirmed || selection.models.is_empty() {
        tracing::info!("Selection aborted");
        return Ok(());
    }

    if let Err(e) = persistence::save_selection(cwd, &selection.models) {
        tracing::warn!("Failed to save selection: {}", e);
    }

    let mut state = TabbedState::new(config.app.title.clone(), prompt, &selection.models);
    state.relabel_groups(|p| config.ui.tab_label(p));

    let invoker: Arc<dyn ModelInvoker> =
        Arc::new(ConfiguredInvoker::new(config.providers.clone(), transport));
    let _tasks = spawn_invocations(invoker, &selection.models, prompt, &tx);
    drop(tx);

    let mut session = TabbedSession::new(state, SystemClipboard::new(), terminal::size());
    session
        .run(&mut rx, &mut stdout, |state| {
            if let Err(e) = persistence::save_results(cwd, prompt, state) {
                tracing::error!("Failed to save results: {}", e);
            }
        })
        .await
}
