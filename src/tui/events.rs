//! Event handling for the interactive screens
//!
//! Terminal input is read on a dedicated thread and forwarded over a tokio
//! channel, together with provider results, so each screen has exactly one
//! event source to drain.

use std::thread;
use std::time::Duration;

use crossterm::event::{self, KeyEventKind};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use super::keys::{decode_event, Key};
use super::selector::SelectedModel;
use crate::llm::ProviderOutcome;

/// Events that drive a screen
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// A key was pressed
    Key(Key),
    /// Terminal was resized
    Resize(u16, u16),
    /// A provider invocation finished; `Err` carries the message of an
    /// invocation that failed without producing an outcome
    Outcome {
        model: SelectedModel,
        result: Result<ProviderOutcome, String>,
    },
}

pub type EventSender = UnboundedSender<UiEvent>;
pub type EventReceiver = UnboundedReceiver<UiEvent>;

/// Polls crossterm for terminal events
#[derive(Debug)]
pub struct EventHandler {
    /// How long one poll waits before giving the caller control back
    poll_rate: Duration,
}

impl EventHandler {
    pub fn with_poll_rate(poll_rate: Duration) -> Self {
        Self { poll_rate }
    }

    /// Poll for the next event
    ///
    /// Returns `None` if the poll rate elapsed or the event is not one the
    /// screens react to.
    pub fn poll(&self) -> anyhow::Result<Option<UiEvent>> {
        if event::poll(self.poll_rate)? {
            Ok(convert_event(event::read()?))
        } else {
            Ok(None)
        }
    }

    /// Forward terminal events to `tx` from a background thread until the
    /// receiving side is dropped.
    pub fn spawn(self, tx: EventSender) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            while !tx.is_closed() {
                match self.poll() {
                    Ok(Some(ev)) => {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!("Terminal input failed: {}", e);
                        break;
                    }
                }
            }
        })
    }
}

/// Convert a crossterm event to a [`UiEvent`]
fn convert_event(event: event::Event) -> Option<UiEvent> {
    match event {
        // Release/repeat reports would otherwise count as extra presses
        event::Event::Key(key) if key.kind != KeyEventKind::Press => None,
        event::Event::Key(key) => Some(UiEvent::Key(decode_event(&key))),
        event::Event::Resize(cols, rows) => Some(UiEvent::Resize(cols, rows)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    fn key_event(code: KeyCode, kind: KeyEventKind) -> event::Event {
        event::Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_press_is_decoded() {
        let ev = convert_event(key_event(KeyCode::Char('q'), KeyEventKind::Press)).unwrap();
        assert!(matches!(ev, UiEvent::Key(Key::Q)));
    }

    #[test]
    fn test_release_is_dropped() {
        assert!(convert_event(key_event(KeyCode::Char('q'), KeyEventKind::Release)).is_none());
    }

    #[test]
    fn test_resize_event() {
        let ev = convert_event(event::Event::Resize(100, 40)).unwrap();
        assert!(matches!(ev, UiEvent::Resize(100, 40)));
    }

    #[test]
    fn test_focus_events_are_ignored() {
        assert!(convert_event(event::Event::FocusGained).is_none());
    }

    #[test]
    fn test_event_handler_custom_poll_rate() {
        let handler = EventHandler::with_poll_rate(Duration::from_millis(100));
        assert_eq!(handler.poll_rate, Duration::from_millis(100));
    }
}
