use std::{
    sync::{mpsc, Arc, Mutex, OnceLock},
    thread,
    time::Duration,
};

use crate::{
    dialog::{DialogContent, DialogControl, DialogVariant},
    loading::{LoadingOverlay, OverlayId},
    notifications::{Notification, NotificationId, Position},
    surface::{DialogSurface, FormSurface, LoadingSurface, NotificationSurface},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SurfaceEvent {
    OverlayMounted { id: u64, message: String },
    OverlayDeactivated(u64),
    OverlayDetached(u64),
    ContainerCreated(Position),
    NotificationAppended(NotificationId),
    NotificationExiting(NotificationId),
    NotificationDetached(NotificationId),
    DialogRendered(DialogVariant, DialogContent),
    DialogRevealed(DialogVariant),
    DialogConcealed(DialogVariant),
    DialogFocused(DialogVariant, DialogControl),
    FieldError(String, String),
    FieldErrorCleared(String),
    FieldValue(String, String),
}

type EventHook = Box<dyn Fn(&SurfaceEvent) + Send + Sync>;

/// Surface that records every instruction it receives.
pub(crate) struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
    missing_templates: Vec<DialogVariant>,
    hook: OnceLock<EventHook>,
}

impl RecordingSurface {
    pub(crate) fn new() -> Arc<Self> {
        Self::without_templates(&[])
    }

    pub(crate) fn without_templates(missing: &[DialogVariant]) -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            missing_templates: missing.to_vec(),
            hook: OnceLock::new(),
        })
    }

    pub(crate) fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().expect("events lock").clone()
    }

    pub(crate) fn clear(&self) {
        self.events.lock().expect("events lock").clear();
    }

    pub(crate) fn count(&self, matches: impl Fn(&SurfaceEvent) -> bool) -> usize {
        self.events().iter().filter(|event| matches(event)).count()
    }

    /// Runs `hook` on every instruction after it is recorded, the way a
    /// host binding might query component state while rendering.
    pub(crate) fn on_event(&self, hook: impl Fn(&SurfaceEvent) + Send + Sync + 'static) {
        assert!(self.hook.set(Box::new(hook)).is_ok(), "hook already set");
    }

    fn push(&self, event: SurfaceEvent) {
        self.events.lock().expect("events lock").push(event.clone());
        if let Some(hook) = self.hook.get() {
            hook(&event);
        }
    }
}

impl LoadingSurface for RecordingSurface {
    fn mount_overlay(&self, overlay: &LoadingOverlay) {
        self.push(SurfaceEvent::OverlayMounted {
            id: overlay.id.0,
            message: overlay.message.clone(),
        });
    }

    fn deactivate_overlay(&self, overlay: OverlayId) {
        self.push(SurfaceEvent::OverlayDeactivated(overlay.0));
    }

    fn detach_overlay(&self, overlay: OverlayId) {
        self.push(SurfaceEvent::OverlayDetached(overlay.0));
    }
}

impl NotificationSurface for RecordingSurface {
    fn create_container(&self, position: Position) {
        self.push(SurfaceEvent::ContainerCreated(position));
    }

    fn append(&self, notification: &Notification) {
        self.push(SurfaceEvent::NotificationAppended(notification.id));
    }

    fn begin_exit(&self, id: NotificationId) {
        self.push(SurfaceEvent::NotificationExiting(id));
    }

    fn detach(&self, id: NotificationId) {
        self.push(SurfaceEvent::NotificationDetached(id));
    }
}

impl DialogSurface for RecordingSurface {
    fn has_template(&self, variant: DialogVariant) -> bool {
        !self.missing_templates.contains(&variant)
    }

    fn render(&self, variant: DialogVariant, content: &DialogContent) {
        self.push(SurfaceEvent::DialogRendered(variant, content.clone()));
    }

    fn reveal(&self, variant: DialogVariant) {
        self.push(SurfaceEvent::DialogRevealed(variant));
    }

    fn conceal(&self, variant: DialogVariant) {
        self.push(SurfaceEvent::DialogConcealed(variant));
    }

    fn focus(&self, variant: DialogVariant, control: DialogControl) {
        self.push(SurfaceEvent::DialogFocused(variant, control));
    }
}

impl FormSurface for RecordingSurface {
    fn show_field_error(&self, field: &str, message: &str) {
        self.push(SurfaceEvent::FieldError(field.to_string(), message.to_string()));
    }

    fn clear_field_error(&self, field: &str) {
        self.push(SurfaceEvent::FieldErrorCleared(field.to_string()));
    }

    fn set_field_value(&self, field: &str, value: &str) {
        self.push(SurfaceEvent::FieldValue(field.to_string(), value.to_string()));
    }
}

/// Runs `work` on a helper thread and fails the test if it does not finish
/// within a few seconds, so a lock cycle reports instead of hanging.
pub(crate) fn finishes_in_time<T: Send + 'static>(
    work: impl FnOnce() -> T + Send + 'static,
) -> T {
    let (done, result) = mpsc::channel();
    thread::spawn(move || {
        let _ = done.send(work());
    });
    result
        .recv_timeout(Duration::from_secs(3))
        .expect("call did not finish; a surface callback blocked on component state")
}
