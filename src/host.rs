//! The OS integration boundary.
//!
//! Everything that touches the desktop (global hotkey registration, key
//! injection, windows, the clipboard) goes through [`Host`]. The language
//! core never talks to the operating system directly.
//!
//! [`RecordingHost`] is an in-memory implementation: it keeps a simulated
//! clipboard and window list and records every effect, which makes it the
//! host of choice for tests and for running scripts from the command line.

use std::{
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use crate::error::RuntimeError;

/// Desktop services consumed by the standard library.
///
/// Implementations must be shareable across threads; the core itself never
/// dispatches two actions at once.
pub trait Host: Send + Sync {
    /// Called once per binding so the host can register the combination
    /// globally. `hotkey` is already normalized.
    fn register_hotkey(&self, hotkey: &str) {
        let _ = hotkey;
    }

    /// Called when a binding is removed.
    fn unregister_hotkey(&self, hotkey: &str) {
        let _ = hotkey;
    }

    fn clipboard_get(&self) -> Result<String, RuntimeError>;

    fn clipboard_set(&self, text: &str) -> Result<(), RuntimeError>;

    /// Injects `text` as keystrokes into the focused window.
    fn send_keys(&self, text: &str) -> Result<(), RuntimeError>;

    /// Activates the first window whose title matches. Returns whether one
    /// was found.
    fn focus_window(&self, title: &str) -> Result<bool, RuntimeError>;

    fn next_window(&self) -> Result<(), RuntimeError>;

    fn prev_window(&self) -> Result<(), RuntimeError>;

    fn list_windows(&self) -> Result<Vec<String>, RuntimeError>;

    fn sleep(&self, duration: Duration) -> Result<(), RuntimeError> {
        std::thread::sleep(duration);
        Ok(())
    }

    fn log(&self, message: &str) {
        log::info!(target: "hotkey::script", "{}", message);
    }
}

#[derive(Debug, Default)]
struct HostState {
    clipboard: String,
    windows: Vec<String>,
    focused: Option<usize>,
    sent: Vec<String>,
    logs: Vec<String>,
    registered: Vec<String>,
    slept: Vec<Duration>,
}

/// In-memory host that records every effect.
#[derive(Debug, Default)]
pub struct RecordingHost {
    state: Mutex<HostState>,
    echo: bool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clipboard(self, text: impl Into<String>) -> Self {
        self.state().clipboard = text.into();
        self
    }

    pub fn with_windows<I, S>(self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut state = self.state();
            state.windows = titles.into_iter().map(Into::into).collect();
            state.focused = if state.windows.is_empty() { None } else { Some(0) };
        }
        self
    }

    /// Print injected keystrokes to stdout as well as recording them.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every string passed to `send`, in order.
    pub fn sent(&self) -> Vec<String> {
        self.state().sent.clone()
    }

    pub fn clipboard(&self) -> String {
        self.state().clipboard.clone()
    }

    /// Messages written through `system.log`.
    pub fn logs(&self) -> Vec<String> {
        self.state().logs.clone()
    }

    /// Normalized hotkeys announced through [`Host::register_hotkey`],
    /// including repeats.
    pub fn registered(&self) -> Vec<String> {
        self.state().registered.clone()
    }

    pub fn focused_window(&self) -> Option<String> {
        let state = self.state();
        state.focused.and_then(|i| state.windows.get(i).cloned())
    }

    pub fn slept(&self) -> Vec<Duration> {
        self.state().slept.clone()
    }

    fn cycle(&self, forward: bool) {
        let mut state = self.state();
        let count = state.windows.len();
        if count == 0 {
            return;
        }
        let current = state.focused.unwrap_or(0);
        state.focused = Some(if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        });
    }
}

impl Host for RecordingHost {
    fn register_hotkey(&self, hotkey: &str) {
        self.state().registered.push(hotkey.to_string());
    }

    fn unregister_hotkey(&self, hotkey: &str) {
        self.state().registered.retain(|h| h != hotkey);
    }

    fn clipboard_get(&self) -> Result<String, RuntimeError> {
        Ok(self.state().clipboard.clone())
    }

    fn clipboard_set(&self, text: &str) -> Result<(), RuntimeError> {
        self.state().clipboard = text.to_string();
        Ok(())
    }

    fn send_keys(&self, text: &str) -> Result<(), RuntimeError> {
        if self.echo {
            println!("{}", text);
        }
        self.state().sent.push(text.to_string());
        Ok(())
    }

    fn focus_window(&self, title: &str) -> Result<bool, RuntimeError> {
        let mut state = self.state();
        let needle = title.to_lowercase();
        match state
            .windows
            .iter()
            .position(|w| w.to_lowercase().contains(&needle))
        {
            Some(index) => {
                state.focused = Some(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn next_window(&self) -> Result<(), RuntimeError> {
        self.cycle(true);
        Ok(())
    }

    fn prev_window(&self) -> Result<(), RuntimeError> {
        self.cycle(false);
        Ok(())
    }

    fn list_windows(&self) -> Result<Vec<String>, RuntimeError> {
        Ok(self.state().windows.clone())
    }

    fn sleep(&self, duration: Duration) -> Result<(), RuntimeError> {
        self.state().slept.push(duration);
        Ok(())
    }

    fn log(&self, message: &str) {
        log::info!(target: "hotkey::script", "{}", message);
        self.state().logs.push(message.to_string());
    }
}
