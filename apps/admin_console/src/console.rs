//! Terminal rendition of the UI surfaces.

use std::{
    io::{self, BufRead, Write},
    sync::{Arc, Mutex, PoisonError},
};

use client_core::{
    dialog::{DialogContent, DialogControl, DialogVariant},
    loading::{LoadingOverlay, OverlayId},
    notifications::{Notification, NotificationId, Position},
    surface::{DialogSurface, FormSurface, LoadingSurface, NotificationSurface},
    DialogController, DialogInput, DialogState,
};
use tokio::{
    runtime::{Handle, RuntimeFlavor},
    task,
};
use tracing::{debug, warn};

/// Writes every surface instruction as a line of text.
pub struct ConsoleSurface {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSurface {
    pub fn stdout() -> Arc<Self> {
        Self::with_writer(io::stdout())
    }

    pub fn with_writer(writer: impl Write + Send + 'static) -> Arc<Self> {
        Arc::new(Self {
            out: Mutex::new(Box::new(writer)),
        })
    }

    fn line(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writeln!(out, "{text}").and_then(|()| out.flush()) {
            warn!(error = %err, "console write failed");
        }
    }
}

impl LoadingSurface for ConsoleSurface {
    fn mount_overlay(&self, overlay: &LoadingOverlay) {
        self.line(&overlay.message);
    }

    fn deactivate_overlay(&self, overlay: OverlayId) {
        debug!(overlay = overlay.0, "loading finished");
    }

    fn detach_overlay(&self, _overlay: OverlayId) {}
}

impl NotificationSurface for ConsoleSurface {
    fn create_container(&self, position: Position) {
        debug!(position = position.as_str(), "notification area ready");
    }

    fn append(&self, notification: &Notification) {
        self.line(&format!(
            "[{}] {}",
            notification.variant.as_str(),
            notification.message
        ));
    }

    fn begin_exit(&self, _id: NotificationId) {}

    fn detach(&self, _id: NotificationId) {}
}

impl DialogSurface for ConsoleSurface {
    fn has_template(&self, _variant: DialogVariant) -> bool {
        true
    }

    fn render(&self, variant: DialogVariant, content: &DialogContent) {
        self.line(&format!("== {} ({variant}) ==", content.title));
        self.line(&content.message);
        match &content.confirm_label {
            Some(confirm) => self.line(&format!("[{confirm}] / [{}]", content.close_label)),
            None => self.line(&format!("[{}]", content.close_label)),
        }
    }

    fn reveal(&self, _variant: DialogVariant) {}

    fn conceal(&self, _variant: DialogVariant) {}

    fn focus(&self, _variant: DialogVariant, _control: DialogControl) {}
}

impl FormSurface for ConsoleSurface {
    fn show_field_error(&self, field: &str, message: &str) {
        self.line(&format!("  {field}: {message}"));
    }

    fn clear_field_error(&self, _field: &str) {}
}

/// Plays the user's part once a dialog is on screen.
pub trait DialogResponder: Send + Sync {
    fn respond(&self, dialogs: &DialogController);
}

/// Confirms every confirm dialog and dismisses everything else.
pub struct AutoConfirm;

impl DialogResponder for AutoConfirm {
    fn respond(&self, dialogs: &DialogController) {
        let input = match dialogs.state() {
            DialogState::Open(DialogVariant::Confirm) => DialogInput::ConfirmClicked,
            DialogState::Open(_) => DialogInput::CloseClicked,
            DialogState::Closed => return,
        };
        dialogs.handle_input(input);
    }
}

/// Asks on a line-oriented reader; only `y`/`yes` confirms.
pub struct PromptResponder<R> {
    input: Mutex<R>,
}

impl PromptResponder<io::BufReader<io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(io::BufReader::new(io::stdin()))
    }
}

impl<R: BufRead> PromptResponder<R> {
    pub fn new(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }
}

impl<R: BufRead> PromptResponder<R> {
    fn read_answer(&self) -> io::Result<String> {
        let mut answer = String::new();
        self.input
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .read_line(&mut answer)?;
        Ok(answer)
    }
}

/// Runs blocking `work` without stalling other tasks on a multi-threaded
/// runtime. Single-threaded runtimes cannot hand the worker off, so there
/// the call just blocks.
fn off_the_event_loop<T>(work: impl FnOnce() -> T) -> T {
    match Handle::try_current().map(|handle| handle.runtime_flavor()) {
        Ok(RuntimeFlavor::MultiThread) => task::block_in_place(work),
        _ => work(),
    }
}

impl<R: BufRead + Send> DialogResponder for PromptResponder<R> {
    fn respond(&self, dialogs: &DialogController) {
        match dialogs.state() {
            DialogState::Open(DialogVariant::Confirm) => {
                let confirmed = match off_the_event_loop(|| self.read_answer()) {
                    Ok(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
                    Err(err) => {
                        warn!(error = %err, "could not read confirmation");
                        false
                    }
                };
                dialogs.handle_input(if confirmed {
                    DialogInput::ConfirmClicked
                } else {
                    DialogInput::CancelClicked
                });
            }
            DialogState::Open(_) => {
                dialogs.handle_input(DialogInput::CloseClicked);
            }
            DialogState::Closed => {}
        }
    }
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
