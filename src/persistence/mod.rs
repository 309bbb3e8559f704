//! Files llm-comp keeps in the working directory
//!
//! ```text
//! <cwd>/
//! ├── .llm-comp-selection.json   # models picked in the selector last time
//! └── .latest-results.json       # outcome of the last finished comparison
//! ```

mod results;
mod selection;

pub use results::{save_results, ResultEntry, SavedResults, ResultTokens, RESULTS_FILE};
pub use selection::{load_selection, save_selection, SavedSelection, SelectionEntry, SELECTION_FILE};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
