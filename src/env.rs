//! `.env` loading
//!
//! API keys are usually kept in a `.env` file next to `llm-comp.toml`. Values
//! from the file never override variables already set in the environment.

use std::path::Path;

use anyhow::{Context, Result};

pub const DOTENV_FILE: &str = ".env";
/// Set to a truthy value to skip loading `.env`.
pub const ENV_SKIP_DOTENV: &str = "LLM_COMP_SKIP_DOTENV";

/// Parse `KEY=VALUE` lines. Blank lines, `#` comments and lines without a key
/// are skipped; one pair of matching surrounding quotes is removed.
pub fn parse_dotenv(text: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        pairs.push((key.to_string(), unquote(value.trim()).to_string()));
    }
    pairs
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

pub fn dotenv_disabled() -> bool {
    std::env::var(ENV_SKIP_DOTENV)
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

/// Load `<dir>/.env` into the process environment.
///
/// Returns the number of variables that were set. A missing file is not an
/// error.
pub fn load_dotenv(dir: &Path) -> Result<usize> {
    let path = dir.join(DOTENV_FILE);
    if !path.is_file() {
        return Ok(0);
    }
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut applied = 0;
    for (key, value) in parse_dotenv(&text) {
        if std::env::var_os(&key).is_none() {
            std::env::set_var(&key, value);
            applied += 1;
        }
    }
    tracing::debug!("Loaded {} variables from {}", applied, path.display());
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_pairs_and_strips_quotes() {
        let pairs = parse_dotenv(
            "# keys\nOPENAI_API_KEY=sk-1\n\nANTHROPIC_API_KEY = \"sk-ant-2\"\r\nGEMINI_API_KEY='AI3'\n=novalue\nbroken line\n",
        );
        assert_eq!(
            pairs,
            vec![
                ("OPENAI_API_KEY".to_string(), "sk-1".to_string()),
                ("ANTHROPIC_API_KEY".to_string(), "sk-ant-2".to_string()),
                ("GEMINI_API_KEY".to_string(), "AI3".to_string()),
            ]
        );
    }

    #[test]
    fn keeps_unbalanced_quotes_and_inner_equals() {
        let pairs = parse_dotenv("A=\"open\nB=x=y\nC=\"\n");
        assert_eq!(pairs[0].1, "\"open");
        assert_eq!(pairs[1].1, "x=y");
        assert_eq!(pairs[2].1, "\"");
    }

    #[test]
    fn truthy_values() {
        for v in ["1", "true", "YES", " y ", "On"] {
            assert!(is_truthy(v), "{v}");
        }
        for v in ["0", "false", "", "off", "nah"] {
            assert!(!is_truthy(v), "{v}");
        }
    }

    #[test]
    fn load_does_not_override_existing_environment() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(DOTENV_FILE),
            "LLM_COMP_TEST_DOTENV_NEW=from-file\nLLM_COMP_TEST_DOTENV_SET=from-file\n",
        )
        .unwrap();
        std::env::set_var("LLM_COMP_TEST_DOTENV_SET", "from-env");

        let applied = load_dotenv(dir.path()).unwrap();

        assert_eq!(applied, 1);
        assert_eq!(
            std::env::var("LLM_COMP_TEST_DOTENV_NEW").unwrap(),
            "from-file"
        );
        assert_eq!(
            std::env::var("LLM_COMP_TEST_DOTENV_SET").unwrap(),
            "from-env"
        );
    }

    #[test]
    fn missing_file_is_fine() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load_dotenv(dir.path()).unwrap(), 0);
    }
}
