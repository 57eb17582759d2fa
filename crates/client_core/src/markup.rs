//! HTML fragments for hosts that render into a DOM.
//!
//! Any caller-provided text passes through [`escape_html`] before it is
//! interpolated.

use crate::{loading::LoadingOverlay, notifications::Notification};

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn loading_overlay_html(overlay: &LoadingOverlay) -> String {
    let backdrop = if overlay.backdrop {
        r#"<div class="loading-backdrop"></div>"#
    } else {
        ""
    };
    let spinner = if overlay.spinner {
        r#"<div class="loading-spinner"></div>"#
    } else {
        ""
    };
    format!(
        r#"<div class="loading-overlay" id="{}">{backdrop}<div class="loading-content">{spinner}<p class="loading-message">{}</p></div></div>"#,
        overlay.dom_id(),
        escape_html(&overlay.message),
    )
}

pub fn notification_html(notification: &Notification) -> String {
    let close = if notification.closeable {
        r#"<button class="notification-close" aria-label="Close">&times;</button>"#
    } else {
        ""
    };
    format!(
        r#"<div id="{}" class="notification notification-{}"><div class="notification-content"><span class="notification-message">{}</span></div>{close}</div>"#,
        notification.id.dom_id(),
        notification.variant.as_str(),
        escape_html(&notification.message),
    )
}
