//! Clipboard access for copying responses
//!
//! The comparison controller only sees [`ClipboardService`]. The system
//! implementation tries the native clipboard through `arboard` and falls back
//! to an OSC 52 escape sequence, which the local terminal interprets even
//! when llm-comp runs over SSH.

use std::io::{self, Write};

use arboard::Clipboard;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Outcome of a copy attempt, shown to the user as a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyResult {
    pub success: bool,
    pub message: String,
}

impl CopyResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

pub trait ClipboardService {
    fn copy(&mut self, text: &str) -> CopyResult;
}

/// Native clipboard with an OSC 52 fallback.
pub struct SystemClipboard {
    native: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let native = match Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                tracing::debug!("Native clipboard unavailable, using OSC 52: {}", e);
                None
            }
        };
        Self { native }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardService for SystemClipboard {
    fn copy(&mut self, text: &str) -> CopyResult {
        if let Some(clipboard) = self.native.as_mut() {
            match clipboard.set_text(text.to_string()) {
                Ok(()) => return CopyResult::ok(copied_message(text)),
                Err(e) => tracing::debug!("Native clipboard write failed: {}", e),
            }
        }

        match write_osc52(&mut io::stdout(), text) {
            Ok(()) => CopyResult::ok(format!("{} (via terminal)", copied_message(text))),
            Err(e) => CopyResult::failed(format!("Copy failed: {}", e)),
        }
    }
}

fn copied_message(text: &str) -> String {
    format!("Copied {} chars!", text.chars().count())
}

/// OSC 52 "set clipboard" sequence for `text`.
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

fn write_osc52<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    out.write_all(osc52_sequence(text).as_bytes())?;
    out.flush()
}
