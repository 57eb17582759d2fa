//! Reference-counted loading overlay.
//!
//! Nested or concurrent loading regions share one overlay: only the 0→1
//! transition mounts it and only the 1→0 transition removes it.

use std::{
    future::Future,
    sync::{Arc, Mutex},
    time::Duration,
};

use futures::future::BoxFuture;
use tracing::{debug, trace};

use crate::{config::UiConfig, lock_state, markup, surface::LoadingSurface, timer};

pub const OVERLAY_DOM_ID: &str = "global-loading-overlay";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(pub u64);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MountTarget {
    #[default]
    Body,
    Element(String),
}

#[derive(Debug, Clone)]
pub struct LoadingOptions {
    /// Falls back to the indicator's configured message.
    pub message: Option<String>,
    pub spinner: bool,
    pub backdrop: bool,
    pub target: MountTarget,
}

impl Default for LoadingOptions {
    fn default() -> Self {
        Self {
            message: None,
            spinner: true,
            backdrop: true,
            target: MountTarget::Body,
        }
    }
}

impl LoadingOptions {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn without_backdrop(mut self) -> Self {
        self.backdrop = false;
        self
    }

    pub fn without_spinner(mut self) -> Self {
        self.spinner = false;
        self
    }

    pub fn mounted_in(mut self, element_id: impl Into<String>) -> Self {
        self.target = MountTarget::Element(element_id.into());
        self
    }
}

/// What a surface mounts on the 0→1 transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingOverlay {
    pub id: OverlayId,
    /// Raw text; escape before interpolating into markup.
    pub message: String,
    pub spinner: bool,
    pub backdrop: bool,
    pub target: MountTarget,
}

impl LoadingOverlay {
    pub fn dom_id(&self) -> &'static str {
        OVERLAY_DOM_ID
    }

    pub fn to_html(&self) -> String {
        markup::loading_overlay_html(self)
    }
}

#[derive(Default)]
struct LoadingState {
    depth: usize,
    mounted: Option<OverlayId>,
    next_overlay: u64,
}

pub struct LoadingIndicator {
    surface: Arc<dyn LoadingSurface>,
    default_message: String,
    fade_out: Duration,
    state: Mutex<LoadingState>,
}

impl LoadingIndicator {
    pub fn new(surface: Arc<dyn LoadingSurface>) -> Arc<Self> {
        Self::with_config(surface, &UiConfig::default())
    }

    pub fn with_config(surface: Arc<dyn LoadingSurface>, config: &UiConfig) -> Arc<Self> {
        Arc::new(Self {
            surface,
            default_message: config.loading_message.clone(),
            fade_out: config.overlay_fade(),
            state: Mutex::new(LoadingState::default()),
        })
    }

    /// Increments the depth, mounting the overlay on the first call.
    ///
    /// `options` only matter for that first call; nested shows reuse the
    /// overlay already on screen.
    pub fn show(&self, options: LoadingOptions) -> usize {
        let (depth, mount) = {
            let mut state = lock_state(&self.state);
            state.depth += 1;
            let mut mount = None;
            if state.depth == 1 {
                state.next_overlay += 1;
                let overlay = LoadingOverlay {
                    id: OverlayId(state.next_overlay),
                    message: options
                        .message
                        .unwrap_or_else(|| self.default_message.clone()),
                    spinner: options.spinner,
                    backdrop: options.backdrop,
                    target: options.target,
                };
                state.mounted = Some(overlay.id);
                mount = Some(overlay);
            }
            (state.depth, mount)
        };
        if let Some(overlay) = mount {
            debug!(overlay = overlay.id.0, "mounting loading overlay");
            self.surface.mount_overlay(&overlay);
        }
        trace!(depth, "loading show");
        depth
    }

    /// Decrements the depth (never below zero), removing the overlay when it
    /// reaches zero.
    pub fn hide(&self) -> usize {
        let (depth, unmount) = {
            let mut state = lock_state(&self.state);
            if state.depth == 0 {
                return 0;
            }
            state.depth -= 1;
            let unmount = if state.depth == 0 {
                state.mounted.take()
            } else {
                None
            };
            (state.depth, unmount)
        };
        if let Some(id) = unmount {
            self.remove_overlay(id, self.fade_out);
        }
        trace!(depth, "loading hide");
        depth
    }

    pub fn depth(&self) -> usize {
        lock_state(&self.state).depth
    }

    pub fn is_visible(&self) -> bool {
        self.depth() > 0
    }

    /// Drops every outstanding show and removes the overlay without a fade.
    pub fn reset(&self) {
        let unmount = {
            let mut state = lock_state(&self.state);
            state.depth = 0;
            state.mounted.take()
        };
        if let Some(id) = unmount {
            self.remove_overlay(id, Duration::ZERO);
        }
    }

    /// Shows the overlay until the returned guard is dropped.
    pub fn acquire(&self, options: LoadingOptions) -> LoadingGuard<'_> {
        self.show(options);
        LoadingGuard { indicator: self }
    }

    /// Awaits `future` with the overlay shown; hides again however it ends.
    pub async fn run<Fut>(&self, options: LoadingOptions, future: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        let _guard = self.acquire(options);
        future.await
    }

    /// Turns `op` into an operation that shows the overlay before it starts
    /// and hides it once it settles.
    pub fn wrap<F, Fut>(
        self: &Arc<Self>,
        op: F,
        options: LoadingOptions,
    ) -> impl FnOnce() -> BoxFuture<'static, Fut::Output>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        let indicator = Arc::clone(self);
        move || {
            Box::pin(async move {
                let _guard = indicator.acquire(options);
                op().await
            })
        }
    }

    fn remove_overlay(&self, id: OverlayId, fade_out: Duration) {
        debug!(overlay = id.0, "removing loading overlay");
        self.surface.deactivate_overlay(id);
        let surface = Arc::clone(&self.surface);
        timer::schedule(fade_out, move || surface.detach_overlay(id));
    }
}

/// Keeps the overlay shown while alive.
#[must_use = "the overlay hides as soon as the guard is dropped"]
pub struct LoadingGuard<'a> {
    indicator: &'a LoadingIndicator,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.indicator.hide();
    }
}

#[cfg(test)]
#[path = "tests/loading_tests.rs"]
mod tests;
