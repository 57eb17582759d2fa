use std::time::Duration;

use serde::Deserialize;
use shared::protocol::API_PREFIX;

use crate::notifications::Position;

/// Tunables for one page's worth of UI services.
///
/// Every field has a default, so a partial TOML table deserializes cleanly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub request_timeout_ms: u64,
    pub notification_duration_ms: u64,
    pub notification_position: Position,
    pub notification_exit_ms: u64,
    pub overlay_fade_ms: u64,
    pub dialog_focus_delay_ms: u64,
    pub dialog_close_label: String,
    pub dialog_confirm_label: String,
    pub loading_message: String,
    pub unload_prompt: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".into(),
            api_prefix: API_PREFIX.into(),
            request_timeout_ms: 30_000,
            notification_duration_ms: 5_000,
            notification_position: Position::TopRight,
            notification_exit_ms: 300,
            overlay_fade_ms: 300,
            dialog_focus_delay_ms: 100,
            dialog_close_label: "Close".into(),
            dialog_confirm_label: "Confirm".into(),
            loading_message: "Loading...".into(),
            unload_prompt: "You have unsaved changes. Leave this page?".into(),
        }
    }
}

impl UiConfig {
    /// Base URL with the API prefix appended, without a trailing slash.
    pub fn api_root(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{prefix}")
        }
    }

    /// A zero timeout disables the client-side request deadline.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    pub fn notification_exit(&self) -> Duration {
        Duration::from_millis(self.notification_exit_ms)
    }

    pub fn overlay_fade(&self) -> Duration {
        Duration::from_millis(self.overlay_fade_ms)
    }

    pub fn dialog_focus_delay(&self) -> Duration {
        Duration::from_millis(self.dialog_focus_delay_ms)
    }
}
