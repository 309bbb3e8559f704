//! Terminal user interface for llm-comp
//!
//! Two interactive screens share one raw-mode terminal and one event channel:
//! the model selector (with its confirm step) and the tabbed comparison view.
//! Both render whole frames as strings; [`json`] covers the non-interactive
//! output.

pub mod clipboard;
pub mod events;
pub mod json;
pub mod keys;
pub mod selector;
pub mod style;
pub mod tabbed;
pub mod terminal;
pub mod text;
pub mod width;

pub use clipboard::{ClipboardService, CopyResult, SystemClipboard};
pub use events::{EventHandler, EventReceiver, EventSender, UiEvent};
pub use keys::Key;
pub use selector::{ModelSelector, SelectedModel, SelectionResult};
pub use tabbed::{TabbedSession, TabbedState};
pub use terminal::TerminalGuard;
