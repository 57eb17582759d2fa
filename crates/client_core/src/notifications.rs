//! Transient, stacked notifications.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::{Arc, Mutex, Weak},
    time::Duration,
};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::{config::UiConfig, lock_state, markup, surface::NotificationSurface, timer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(pub u64);

impl NotificationId {
    pub fn dom_id(&self) -> String {
        format!("notification-{}", self.0)
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    TopRight,
    TopLeft,
    TopCenter,
    BottomRight,
    BottomLeft,
    BottomCenter,
}

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Position::TopRight => "top-right",
            Position::TopLeft => "top-left",
            Position::TopCenter => "top-center",
            Position::BottomRight => "bottom-right",
            Position::BottomLeft => "bottom-left",
            Position::BottomCenter => "bottom-center",
        }
    }

    pub fn container_class(self) -> String {
        format!("notification-container-{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationVariant {
    Success,
    Error,
    Info,
    Warning,
}

impl NotificationVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationVariant::Success => "success",
            NotificationVariant::Error => "error",
            NotificationVariant::Info => "info",
            NotificationVariant::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationOptions {
    /// `None` uses the toaster default; `Some(0)` keeps the notification
    /// until it is removed explicitly.
    pub auto_dismiss_ms: Option<u64>,
    pub position: Option<Position>,
    pub closeable: bool,
}

impl Default for NotificationOptions {
    fn default() -> Self {
        Self {
            auto_dismiss_ms: None,
            position: None,
            closeable: true,
        }
    }
}

impl NotificationOptions {
    pub fn sticky() -> Self {
        Self::dismiss_after_ms(0)
    }

    pub fn dismiss_after_ms(ms: u64) -> Self {
        Self {
            auto_dismiss_ms: Some(ms),
            ..Self::default()
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn not_closeable(mut self) -> Self {
        self.closeable = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    /// Raw text; escape before interpolating into markup.
    pub message: String,
    pub variant: NotificationVariant,
    pub position: Position,
    pub auto_dismiss_ms: u64,
    pub closeable: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn to_html(&self) -> String {
        markup::notification_html(self)
    }
}

struct LiveEntry {
    exiting: bool,
}

#[derive(Default)]
struct ToasterState {
    next_id: u64,
    containers: HashSet<Position>,
    live: HashMap<NotificationId, LiveEntry>,
}

pub struct NotificationToaster {
    surface: Arc<dyn NotificationSurface>,
    default_duration_ms: u64,
    default_position: Position,
    exit_window: Duration,
    state: Mutex<ToasterState>,
    this: Weak<Self>,
}

impl NotificationToaster {
    pub fn new(surface: Arc<dyn NotificationSurface>) -> Arc<Self> {
        Self::with_config(surface, &UiConfig::default())
    }

    pub fn with_config(surface: Arc<dyn NotificationSurface>, config: &UiConfig) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            surface,
            default_duration_ms: config.notification_duration_ms,
            default_position: config.notification_position,
            exit_window: config.notification_exit(),
            state: Mutex::new(ToasterState::default()),
            this: this.clone(),
        })
    }

    pub fn show(
        &self,
        message: impl Into<String>,
        variant: NotificationVariant,
        options: NotificationOptions,
    ) -> NotificationId {
        let position = options.position.unwrap_or(self.default_position);
        let auto_dismiss_ms = options.auto_dismiss_ms.unwrap_or(self.default_duration_ms);

        let (notification, new_container) = {
            let mut state = lock_state(&self.state);
            state.next_id += 1;
            let notification = Notification {
                id: NotificationId(state.next_id),
                message: message.into(),
                variant,
                position,
                auto_dismiss_ms,
                closeable: options.closeable,
                created_at: Utc::now(),
            };
            let new_container = state.containers.insert(position);
            state
                .live
                .insert(notification.id, LiveEntry { exiting: false });
            (notification, new_container)
        };
        if new_container {
            trace!(position = position.as_str(), "creating notification container");
            self.surface.create_container(position);
        }
        self.surface.append(&notification);
        debug!(
            id = notification.id.0,
            variant = variant.as_str(),
            auto_dismiss_ms,
            "notification shown"
        );

        if auto_dismiss_ms > 0 {
            let id = notification.id;
            let this = self.this.clone();
            let scheduled = timer::spawn_after(Duration::from_millis(auto_dismiss_ms), move || {
                if let Some(toaster) = this.upgrade() {
                    toaster.remove(id);
                }
            });
            if scheduled.is_err() {
                warn!(id = id.0, "no runtime for auto-dismiss; notification stays");
            }
        }

        notification.id
    }

    pub fn success(&self, message: impl Into<String>, options: NotificationOptions) -> NotificationId {
        self.show(message, NotificationVariant::Success, options)
    }

    pub fn error(&self, message: impl Into<String>, options: NotificationOptions) -> NotificationId {
        self.show(message, NotificationVariant::Error, options)
    }

    pub fn info(&self, message: impl Into<String>, options: NotificationOptions) -> NotificationId {
        self.show(message, NotificationVariant::Info, options)
    }

    pub fn warning(&self, message: impl Into<String>, options: NotificationOptions) -> NotificationId {
        self.show(message, NotificationVariant::Warning, options)
    }

    /// Animates the notification out and detaches it after the exit window.
    ///
    /// Unknown ids and ids already on their way out are ignored.
    pub fn remove(&self, id: NotificationId) {
        {
            let mut state = lock_state(&self.state);
            match state.live.get_mut(&id) {
                Some(entry) if !entry.exiting => entry.exiting = true,
                _ => {
                    trace!(id = id.0, "notification already removed");
                    return;
                }
            }
        }
        self.surface.begin_exit(id);

        let this = self.this.clone();
        timer::schedule(self.exit_window, move || {
            if let Some(toaster) = this.upgrade() {
                toaster.detach(id);
            }
        });
    }

    pub fn clear_all(&self) {
        let ids: Vec<NotificationId> = {
            let state = lock_state(&self.state);
            let mut ids: Vec<_> = state
                .live
                .iter()
                .filter(|(_, entry)| !entry.exiting)
                .map(|(id, _)| *id)
                .collect();
            ids.sort();
            ids
        };
        for id in ids {
            self.remove(id);
        }
    }

    /// True until the notification is detached from its container.
    pub fn is_live(&self, id: NotificationId) -> bool {
        lock_state(&self.state).live.contains_key(&id)
    }

    pub fn live_count(&self) -> usize {
        lock_state(&self.state).live.len()
    }

    fn detach(&self, id: NotificationId) {
        let removed = lock_state(&self.state).live.remove(&id).is_some();
        if removed {
            self.surface.detach(id);
        }
    }
}

#[cfg(test)]
#[path = "tests/notifications_tests.rs"]
mod tests;
