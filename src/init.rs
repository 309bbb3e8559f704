//! `llm-comp init`: write starter config and `.env` files

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::catalog::{self, ProviderId};
use crate::config::{
    CONFIG_FILE_NAME, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE,
    DEFAULT_TIMEOUT_MS,
};
use crate::env::{DOTENV_FILE, ENV_SKIP_DOTENV};

/// Files created and files left alone because they already existed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InitReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

pub fn config_template() -> String {
    let mut out = format!(
        "# {file}\n\
         # Edit this file to customize llm-comp.\n\
         \n\
         [app]\n\
         title = \"llm-comp\"\n\
         system = \"{system}\"\n\
         timeout_ms = {timeout}\n",
        file = CONFIG_FILE_NAME,
        system = DEFAULT_SYSTEM_PROMPT,
        timeout = DEFAULT_TIMEOUT_MS,
    );

    for (i, provider) in ProviderId::ALL.iter().enumerate() {
        let models = catalog::default_models(*provider)
            .iter()
            .map(|m| format!("\"{}\"", m))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("\n[providers.{}]\nenabled = true\n", provider));
        if i == 0 {
            out.push_str("# Models are tried in order until one is accepted\n");
        }
        out.push_str(&format!(
            "model = [{}]\ntemperature = {}\nmax_output_tokens = {}\n",
            models, DEFAULT_TEMPERATURE, DEFAULT_MAX_OUTPUT_TOKENS
        ));
    }

    out.push_str("\n[ui]\nmode = \"tabbed\" # tabbed | json\n\n[ui.tab_labels]\n");
    for provider in ProviderId::ALL {
        out.push_str(&format!("{} = \"{}\"\n", provider, provider.display_name()));
    }
    out
}

pub fn env_template() -> String {
    format!(
        "# {file}\n\
         # Auto-loaded from the current directory. Set {skip}=1 to disable.\n\
         OPENAI_API_KEY=\n\
         ANTHROPIC_API_KEY=\n\
         GEMINI_API_KEY=\n",
        file = DOTENV_FILE,
        skip = ENV_SKIP_DOTENV,
    )
}

/// Create `llm-comp.toml` and `.env` in `dir` unless they already exist.
pub fn init_project_files(dir: &Path) -> Result<InitReport> {
    let mut report = InitReport::default();

    let config_path = dir.join(CONFIG_FILE_NAME);
    let config_label = format!("./{}", CONFIG_FILE_NAME);
    if config_path.exists() {
        report.skipped.push(config_label);
    } else {
        std::fs::write(&config_path, config_template())
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        report.created.push(config_label);
    }

    let env_path = dir.join(DOTENV_FILE);
    let env_label = format!("./{}", DOTENV_FILE);
    if env_path.exists() {
        report.skipped.push(env_label);
    } else {
        write_private(&env_path, &env_template())
            .with_context(|| format!("Failed to write {}", env_path.display()))?;
        report.created.push(env_label);
    }

    tracing::info!(
        "init: created {:?}, skipped {:?}",
        report.created,
        report.skipped
    );
    Ok(report)
}

/// Write a file readable only by the owner.
fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(content.as_bytes())
}
