//! Side-by-side comparison screen
//!
//! [`TabbedSession`] owns the single [`TabbedState`] for a run. Key presses,
//! resizes and provider outcomes all arrive on one channel and are applied
//! in order from the session loop, so the state is never shared.

mod controller;
mod help;
mod render;
mod state;

pub use controller::{clamp_focused_scroll, ControllerAction, TabbedController, MAX_PANELS};
pub use help::render_help_screen;
pub use render::{compose_frame, content_lines, fullscreen_viewport_lines, MIN_HEIGHT, MIN_WIDTH};
pub use state::{
    Notification, ProviderGroup, ProviderState, ProviderStatus, TabInfo, TabbedState, NOTIFICATION_TTL,
};

use std::any::Any;
use std::io::Write;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::clipboard::ClipboardService;
use super::events::{EventReceiver, EventSender, UiEvent};
use super::selector::SelectedModel;
use super::terminal::{contain_panics, write_frame};
use crate::llm::ModelInvoker;

/// Spinner frame rate while anything is still loading.
pub const SPINNER_INTERVAL: Duration = Duration::from_millis(80);

/// Start one invocation per model. Each result, or the error or panic that
/// replaced it, is sent back as [`UiEvent::Outcome`].
pub fn spawn_invocations(
    invoker: Arc<dyn ModelInvoker>,
    models: &[SelectedModel],
    prompt: &str,
    tx: &EventSender,
) -> Vec<JoinHandle<()>> {
    models
        .iter()
        .cloned()
        .map(|model| {
            let invoker = Arc::clone(&invoker);
            let prompt = prompt.to_string();
            let tx = tx.clone();
            tokio::spawn(async move {
                tracing::info!("Invoking {}", model.tab_id());
                let call = invoker.invoke(model.provider, &model.model_id, &prompt);

                let result = match AssertUnwindSafe(contain_panics(call)).catch_unwind().await {
                    Ok(Ok(outcome)) => Ok(outcome),
                    Ok(Err(e)) => Err(format!("{:#}", e)),
                    Err(payload) => Err(panic_message(payload.as_ref())),
                };
                if let Err(e) = &result {
                    tracing::warn!("Invocation of {} failed: {}", model.tab_id(), e);
                }
                let _ = tx.send(UiEvent::Outcome { model, result });
            })
        })
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("Provider panicked: {}", detail)
}

/// Event loop for the comparison screen
pub struct TabbedSession<C: ClipboardService> {
    state: TabbedState,
    controller: TabbedController<C>,
    size: (u16, u16),
}

impl<C: ClipboardService> TabbedSession<C> {
    pub fn new(state: TabbedState, clipboard: C, size: (u16, u16)) -> Self {
        Self {
            state,
            controller: TabbedController::new(clipboard),
            size,
        }
    }

    #[cfg(test)]
    fn state(&self) -> &TabbedState {
        &self.state
    }

    /// Run until the user quits or every sender is gone.
    ///
    /// `on_settled` is called once, right after the update that settles the
    /// last pending tab.
    pub async fn run<F>(
        &mut self,
        events: &mut EventReceiver,
        out: &mut impl Write,
        on_settled: F,
    ) -> anyhow::Result<()>
    where
        F: FnOnce(&TabbedState),
    {
        let mut on_settled = Some(on_settled);
        let mut spinner = tokio::time::interval(SPINNER_INTERVAL);
        spinner.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.render(out)?;

        loop {
            let expiry = self.state.notification.as_ref().map(|n| n.until);
            let deadline = tokio::time::Instant::from_std(expiry.unwrap_or_else(Instant::now));
            let loading = !self.state.is_settled();

            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        tracing::debug!("Event channel closed");
                        return Ok(());
                    };
                    match event {
                        UiEvent::Key(key) => {
                            match self.controller.handle_key(&mut self.state, key, self.size) {
                                ControllerAction::Quit => {
                                    tracing::info!("Quit requested");
                                    return Ok(());
                                }
                                ControllerAction::Render => self.render(out)?,
                                ControllerAction::Notify(message) => {
                                    self.state.notify(message, Instant::now());
                                    self.render(out)?;
                                }
                                ControllerAction::None => {}
                            }
                        }
                        UiEvent::Resize(width, height) => {
                            self.size = (width, height);
                            clamp_focused_scroll(&mut self.state, self.size);
                            self.render(out)?;
                        }
                        UiEvent::Outcome { model, result } => {
                            match result {
                                Ok(outcome) => self.state.record_success(&model, outcome),
                                Err(e) => self.state.record_failure(&model, e),
                            }
                            self.render(out)?;
                            if self.state.take_settlement() {
                                tracing::info!("All {} tabs settled", self.state.states.len());
                                if let Some(callback) = on_settled.take() {
                                    callback(&self.state);
                                }
                                self.render(out)?;
                            }
                        }
                    }
                }
                _ = spinner.tick(), if loading => {
                    self.state.advance_spinner();
                    self.render(out)?;
                }
                _ = tokio::time::sleep_until(deadline), if expiry.is_some() => {
                    if self.state.expire_notification(Instant::now()) {
                        self.render(out)?;
                    }
                }
            }
        }
    }

    fn render(&self, out: &mut impl Write) -> anyhow::Result<()> {
        let (width, height) = self.size;
        let frame = compose_frame(&self.state, width, height, Instant::now());
        write_frame(out, &frame)?;
        Ok(())
    }
}
