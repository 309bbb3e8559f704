//! Raw-mode terminal lifetime
//!
//! [`TerminalGuard`] puts the terminal in raw mode with a hidden cursor and
//! restores it on drop. A panic hook restores it too, so a panic inside a
//! session never leaves the user's shell in raw mode.
//!
//! Panics raised while polling a future wrapped in [`contain_panics`] are
//! expected to be caught by the caller. The hook only logs those and leaves
//! the terminal alone, so the session keeps its raw-mode screen.

use std::cell::Cell;
use std::future::Future;
use std::io::{self, IsTerminal, Write};
use std::panic;
use std::pin::Pin;
use std::sync::Once;
use std::task::{Context, Poll};

use crossterm::{
    cursor, execute,
    terminal::{self, disable_raw_mode, enable_raw_mode},
};

use super::style::ansi;

/// Fallback size when the terminal cannot report one.
pub const DEFAULT_SIZE: (u16, u16) = (80, 24);

static PANIC_HOOK: Once = Once::new();

thread_local! {
    static CONTAINED_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Whether the current thread is polling a [`ContainedPanics`] future.
pub fn panics_contained() -> bool {
    CONTAINED_DEPTH.with(|depth| depth.get() > 0)
}

/// Mark panics raised while polling `future` as caught by the caller.
///
/// Pair with `FutureExt::catch_unwind`; this only tells the panic hook not
/// to tear down the terminal.
pub fn contain_panics<F: Future>(future: F) -> ContainedPanics<F> {
    ContainedPanics {
        inner: Box::pin(future),
    }
}

pub struct ContainedPanics<F> {
    inner: Pin<Box<F>>,
}

impl<F: Future> Future for ContainedPanics<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let _scope = ContainedScope::enter();
        self.get_mut().inner.as_mut().poll(cx)
    }
}

/// Depth counter that also unwinds correctly when the inner poll panics.
struct ContainedScope;

impl ContainedScope {
    fn enter() -> Self {
        CONTAINED_DEPTH.with(|depth| depth.set(depth.get() + 1));
        ContainedScope
    }
}

impl Drop for ContainedScope {
    fn drop(&mut self) {
        CONTAINED_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Whether both stdin and stdout are attached to a terminal.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

/// Current `(width, height)` in cells.
pub fn size() -> (u16, u16) {
    terminal::size()
        .ok()
        .filter(|&(w, h)| w > 0 && h > 0)
        .unwrap_or(DEFAULT_SIZE)
}

/// Write a frame and flush.
pub fn write_frame(out: &mut impl Write, frame: &str) -> io::Result<()> {
    out.write_all(frame.as_bytes())?;
    out.flush()
}

/// Raw mode for the lifetime of the value
#[derive(Debug)]
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    /// Enter raw mode and hide the cursor.
    pub fn acquire() -> anyhow::Result<Self> {
        install_panic_hook();
        enable_raw_mode()?;
        execute!(io::stdout(), cursor::Hide)?;
        tracing::debug!("Terminal in raw mode");
        Ok(Self { _private: () })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
        tracing::debug!("Terminal restored");
    }
}

/// Install a panic hook that restores the terminal before panicking
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            if panics_contained() {
                tracing::error!("Caught panic: {}", panic_info);
                return;
            }
            let _ = restore_terminal();
            original_hook(panic_info);
        }));
    });
}

fn restore_terminal() -> anyhow::Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Show)?;
    stdout.write_all(ansi::RESET.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
