//! Non-interactive output
//!
//! Used when stdout is not a terminal or `ui.mode = "json"`: every outcome is
//! reduced to a flat record and printed as one pretty JSON array.

use std::io::Write;

use serde::Serialize;

use crate::catalog::ProviderId;
use crate::llm::ProviderOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum JsonRecord {
    Success {
        provider: ProviderId,
        model: String,
        elapsed_ms: u64,
        text: String,
    },
    Failure {
        provider: ProviderId,
        #[serde(skip_serializing_if = "Option::is_none")]
        model: Option<String>,
        elapsed_ms: u64,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
    },
}

impl From<&ProviderOutcome> for JsonRecord {
    fn from(outcome: &ProviderOutcome) -> Self {
        match outcome {
            ProviderOutcome::Success(s) => JsonRecord::Success {
                provider: s.provider,
                model: s.model.clone(),
                elapsed_ms: s.elapsed_ms,
                text: s.text.clone(),
            },
            ProviderOutcome::Failure(f) => JsonRecord::Failure {
                provider: f.provider,
                model: f.model.clone(),
                elapsed_ms: f.elapsed_ms,
                error: f.message.clone(),
                status: f.status,
            },
        }
    }
}

/// Write `outcomes` as a pretty JSON array followed by a newline.
pub fn write_json(out: &mut impl Write, outcomes: &[ProviderOutcome]) -> anyhow::Result<()> {
    let records: Vec<JsonRecord> = outcomes.iter().map(JsonRecord::from).collect();
    serde_json::to_writer_pretty(&mut *out, &records)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
