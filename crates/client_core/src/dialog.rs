//! Single-active modal dialog.
//!
//! The controller is either closed or showing exactly one dialog. Opening a
//! new dialog while one is visible conceals the old one and discards its
//! callbacks; nothing is queued.

use std::{
    fmt,
    str::FromStr,
    sync::{Arc, Mutex, Weak},
    time::Duration,
};

use tracing::{debug, error};

use crate::{config::UiConfig, error::DialogError, lock_state, surface::DialogSurface, timer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogVariant {
    Confirm,
    Info,
    Success,
    Error,
    Warning,
}

impl DialogVariant {
    pub const ALL: [DialogVariant; 5] = [
        DialogVariant::Confirm,
        DialogVariant::Info,
        DialogVariant::Success,
        DialogVariant::Error,
        DialogVariant::Warning,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DialogVariant::Confirm => "confirm",
            DialogVariant::Info => "info",
            DialogVariant::Success => "success",
            DialogVariant::Error => "error",
            DialogVariant::Warning => "warning",
        }
    }

    /// The control that receives focus once the dialog is revealed.
    pub fn primary_control(self) -> DialogControl {
        match self {
            DialogVariant::Confirm => DialogControl::Cancel,
            _ => DialogControl::Close,
        }
    }
}

impl fmt::Display for DialogVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialogVariant {
    type Err = DialogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DialogVariant::ALL
            .into_iter()
            .find(|variant| variant.as_str() == s)
            .ok_or_else(|| DialogError::UnknownVariant(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogControl {
    Cancel,
    Confirm,
    Close,
}

/// Text bound into a variant's template. Surfaces insert it as text, never
/// as markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogContent {
    pub title: String,
    pub message: String,
    pub close_label: String,
    /// Only set for the confirm variant.
    pub confirm_label: Option<String>,
}

pub type DialogCallback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
pub struct DialogRequest {
    pub title: String,
    pub message: String,
    pub close_label: Option<String>,
    pub confirm_label: Option<String>,
    on_confirm: Option<DialogCallback>,
    on_close: Option<DialogCallback>,
}

impl fmt::Debug for DialogRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogRequest")
            .field("title", &self.title)
            .field("message", &self.message)
            .field("close_label", &self.close_label)
            .field("confirm_label", &self.confirm_label)
            .field("on_confirm", &self.on_confirm.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

impl DialogRequest {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn close_label(mut self, label: impl Into<String>) -> Self {
        self.close_label = Some(label.into());
        self
    }

    pub fn confirm_label(mut self, label: impl Into<String>) -> Self {
        self.confirm_label = Some(label.into());
        self
    }

    /// Runs when the user confirms. Ignored by every variant but confirm.
    pub fn on_confirm(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_confirm = Some(Box::new(callback));
        self
    }

    /// Runs once when the dialog closes, whatever closed it, unless the
    /// dialog is superseded by another one first.
    pub fn on_close(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(callback));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    Open(DialogVariant),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The backdrop around the dialog.
    Backdrop,
    /// Anything inside the dialog box.
    Dialog,
}

/// User interaction routed from the host to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogInput {
    ConfirmClicked,
    CancelClicked,
    CloseClicked,
    Clicked(ClickTarget),
    KeyPressed(String),
}

pub const CANCEL_KEY: &str = "Escape";

struct OpenDialog {
    variant: DialogVariant,
    generation: u64,
    on_confirm: Option<DialogCallback>,
    on_close: Option<DialogCallback>,
}

#[derive(Default)]
struct DialogInner {
    current: Option<OpenDialog>,
    generation: u64,
}

pub struct DialogController {
    surface: Arc<dyn DialogSurface>,
    close_label: String,
    confirm_label: String,
    focus_delay: Duration,
    state: Mutex<DialogInner>,
    this: Weak<Self>,
}

impl DialogController {
    pub fn new(surface: Arc<dyn DialogSurface>) -> Arc<Self> {
        Self::with_config(surface, &UiConfig::default())
    }

    pub fn with_config(surface: Arc<dyn DialogSurface>, config: &UiConfig) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            surface,
            close_label: config.dialog_close_label.clone(),
            confirm_label: config.dialog_confirm_label.clone(),
            focus_delay: config.dialog_focus_delay(),
            state: Mutex::new(DialogInner::default()),
            this: this.clone(),
        })
    }

    pub fn state(&self) -> DialogState {
        match &lock_state(&self.state).current {
            Some(open) => DialogState::Open(open.variant),
            None => DialogState::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() != DialogState::Closed
    }

    /// Opens a dialog of `variant`, replacing whatever is on screen.
    ///
    /// When the surface has no template for the variant the call is logged
    /// and rejected without touching the current dialog.
    pub fn show(&self, variant: DialogVariant, request: DialogRequest) -> Result<(), DialogError> {
        if !self.surface.has_template(variant) {
            error!(variant = variant.as_str(), "dialog template not found");
            return Err(DialogError::TemplateMissing(variant));
        }

        let content = DialogContent {
            title: request.title,
            message: request.message,
            close_label: request
                .close_label
                .unwrap_or_else(|| self.close_label.clone()),
            confirm_label: (variant == DialogVariant::Confirm).then(|| {
                request
                    .confirm_label
                    .unwrap_or_else(|| self.confirm_label.clone())
            }),
        };
        let on_confirm = match variant {
            DialogVariant::Confirm => request.on_confirm,
            _ => None,
        };

        let (generation, superseded) = {
            let mut inner = lock_state(&self.state);
            let superseded = inner.current.take();
            inner.generation += 1;
            let generation = inner.generation;
            inner.current = Some(OpenDialog {
                variant,
                generation,
                on_confirm,
                on_close: request.on_close,
            });
            (generation, superseded)
        };
        if let Some(previous) = superseded {
            debug!(
                previous = previous.variant.as_str(),
                next = variant.as_str(),
                "dialog superseded; its callbacks are discarded"
            );
            self.surface.conceal(previous.variant);
        }
        self.surface.render(variant, &content);
        self.surface.reveal(variant);
        debug!(variant = variant.as_str(), generation, "dialog opened");

        let this = self.this.clone();
        timer::schedule(self.focus_delay, move || {
            if let Some(controller) = this.upgrade() {
                controller.focus_primary(generation);
            }
        });
        Ok(())
    }

    /// Opens a dialog whose variant is given by name.
    pub fn show_named(&self, kind: &str, request: DialogRequest) -> Result<(), DialogError> {
        let variant = kind.parse::<DialogVariant>().inspect_err(|err| {
            error!(kind, "{err}");
        })?;
        self.show(variant, request)
    }

    pub fn confirm(&self, request: DialogRequest) -> Result<(), DialogError> {
        self.show(DialogVariant::Confirm, request)
    }

    pub fn info(&self, request: DialogRequest) -> Result<(), DialogError> {
        self.show(DialogVariant::Info, request)
    }

    pub fn success(&self, request: DialogRequest) -> Result<(), DialogError> {
        self.show(DialogVariant::Success, request)
    }

    pub fn error(&self, request: DialogRequest) -> Result<(), DialogError> {
        self.show(DialogVariant::Error, request)
    }

    pub fn warning(&self, request: DialogRequest) -> Result<(), DialogError> {
        self.show(DialogVariant::Warning, request)
    }

    /// Closes the open dialog and runs its close callback. No-op when closed.
    pub fn hide(&self) {
        self.close(None);
    }

    /// Routes one user interaction. Returns whether it changed anything.
    pub fn handle_input(&self, input: DialogInput) -> bool {
        match input {
            DialogInput::ConfirmClicked => self.accept(),
            DialogInput::CancelClicked | DialogInput::CloseClicked => self.close(None),
            DialogInput::Clicked(ClickTarget::Backdrop) => self.close(None),
            DialogInput::Clicked(ClickTarget::Dialog) => false,
            DialogInput::KeyPressed(key) if key == CANCEL_KEY => self.close(None),
            DialogInput::KeyPressed(_) => false,
        }
    }

    /// Closes without running any callback; used when the page goes away.
    pub fn reset(&self) {
        let discarded = lock_state(&self.state).current.take();
        if let Some(open) = discarded {
            self.surface.conceal(open.variant);
        }
    }

    fn accept(&self) -> bool {
        let (generation, on_confirm) = {
            let mut inner = lock_state(&self.state);
            match inner.current.as_mut() {
                Some(open) if open.variant == DialogVariant::Confirm => {
                    (open.generation, open.on_confirm.take())
                }
                _ => return false,
            }
        };
        if let Some(callback) = on_confirm {
            callback();
        }
        // The confirm callback may already have replaced this dialog.
        self.close(Some(generation));
        true
    }

    fn close(&self, only_generation: Option<u64>) -> bool {
        let closed = lock_state(&self.state).current.take_if(|open| {
            only_generation.map_or(true, |generation| open.generation == generation)
        });
        let Some(closed) = closed else {
            return false;
        };
        self.surface.conceal(closed.variant);
        debug!(variant = closed.variant.as_str(), "dialog closed");
        if let Some(callback) = closed.on_close {
            callback();
        }
        true
    }

    fn focus_primary(&self, generation: u64) {
        let variant = lock_state(&self.state)
            .current
            .as_ref()
            .filter(|open| open.generation == generation)
            .map(|open| open.variant);
        if let Some(variant) = variant {
            self.surface.focus(variant, variant.primary_control());
        }
    }
}

#[cfg(test)]
#[path = "tests/dialog_tests.rs"]
mod tests;
