//! Rendering seams.
//!
//! The components below never touch a rendering technology directly; they
//! tell a surface what to mount, reveal, focus or detach. A browser binding,
//! a terminal front end and the test recorders all implement these traits.

use std::sync::Arc;

use crate::{
    dialog::{DialogContent, DialogControl, DialogVariant},
    loading::{LoadingOverlay, OverlayId},
    notifications::{Notification, NotificationId, Position},
};

pub trait LoadingSurface: Send + Sync {
    /// Mounts and activates a new overlay.
    fn mount_overlay(&self, overlay: &LoadingOverlay);
    /// Starts the fade-out of a mounted overlay.
    fn deactivate_overlay(&self, overlay: OverlayId);
    /// Removes the overlay once its fade-out window elapsed.
    fn detach_overlay(&self, overlay: OverlayId);
}

pub trait NotificationSurface: Send + Sync {
    /// Called once per position, before the first notification lands there.
    fn create_container(&self, position: Position);
    fn append(&self, notification: &Notification);
    /// Starts the slide-out/fade-out of a notification.
    fn begin_exit(&self, id: NotificationId);
    fn detach(&self, id: NotificationId);
}

pub trait DialogSurface: Send + Sync {
    fn has_template(&self, variant: DialogVariant) -> bool;
    fn render(&self, variant: DialogVariant, content: &DialogContent);
    fn reveal(&self, variant: DialogVariant);
    fn conceal(&self, variant: DialogVariant);
    fn focus(&self, variant: DialogVariant, control: DialogControl);
}

pub trait FormSurface: Send + Sync {
    fn show_field_error(&self, field: &str, message: &str);
    fn clear_field_error(&self, field: &str);
    /// Reflects a value changed by the controller rather than by the user.
    fn set_field_value(&self, _field: &str, _value: &str) {}
}

/// Surface for a page that lacks the expected mount points.
///
/// Every call is a no-op and no dialog template is available, so dialog
/// opens are rejected with a logged error instead of failing later.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedSurface;

impl LoadingSurface for DetachedSurface {
    fn mount_overlay(&self, _overlay: &LoadingOverlay) {}
    fn deactivate_overlay(&self, _overlay: OverlayId) {}
    fn detach_overlay(&self, _overlay: OverlayId) {}
}

impl NotificationSurface for DetachedSurface {
    fn create_container(&self, _position: Position) {}
    fn append(&self, _notification: &Notification) {}
    fn begin_exit(&self, _id: NotificationId) {}
    fn detach(&self, _id: NotificationId) {}
}

impl DialogSurface for DetachedSurface {
    fn has_template(&self, _variant: DialogVariant) -> bool {
        false
    }
    fn render(&self, _variant: DialogVariant, _content: &DialogContent) {}
    fn reveal(&self, _variant: DialogVariant) {}
    fn conceal(&self, _variant: DialogVariant) {}
    fn focus(&self, _variant: DialogVariant, _control: DialogControl) {}
}

impl FormSurface for DetachedSurface {
    fn show_field_error(&self, _field: &str, _message: &str) {}
    fn clear_field_error(&self, _field: &str) {}
}

/// The three page-level mount points handed to [`crate::UiServices::init`].
#[derive(Clone)]
pub struct Surfaces {
    pub loading: Arc<dyn LoadingSurface>,
    pub notifications: Arc<dyn NotificationSurface>,
    pub dialogs: Arc<dyn DialogSurface>,
}

impl Surfaces {
    pub fn detached() -> Self {
        Self {
            loading: Arc::new(DetachedSurface),
            notifications: Arc::new(DetachedSurface),
            dialogs: Arc::new(DetachedSurface),
        }
    }

    /// Uses one object for all three mount points.
    pub fn uniform<S>(surface: Arc<S>) -> Self
    where
        S: LoadingSurface + NotificationSurface + DialogSurface + 'static,
    {
        Self {
            loading: surface.clone(),
            notifications: surface.clone(),
            dialogs: surface,
        }
    }
}
