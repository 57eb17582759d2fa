//! Client support layer for the admin panel: request client, loading
//! overlay, notification toaster, dialog controller and form controller.
//!
//! The page-level services are plain objects bundled in [`UiServices`];
//! create one bundle when a page loads and tear it down when it goes away.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use shared::protocol::Resource;
use tracing::{debug, info};

pub mod config;
pub mod dialog;
pub mod entity_service;
pub mod error;
pub mod form;
pub mod http;
pub mod loading;
pub mod markup;
pub mod notifications;
pub mod surface;
mod timer;

pub use config::UiConfig;
pub use dialog::{DialogController, DialogInput, DialogRequest, DialogState, DialogVariant};
pub use entity_service::{CategoryService, EntityService, ProductService, UserService};
pub use error::{DialogError, FailureKind, FormError, RequestFailure};
pub use form::{FieldSpec, FormController, FormOptions, FormValues, SubmitOutcome};
pub use http::{RequestClient, RequestOptions, ResponseBody};
pub use loading::{LoadingIndicator, LoadingOptions};
pub use notifications::{NotificationId, NotificationOptions, NotificationToaster};
pub use surface::Surfaces;

/// Locks component state, recovering the data if a holder panicked.
pub(crate) fn lock_state<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The services one page shares: exactly one of each.
#[derive(Clone)]
pub struct UiServices {
    pub config: UiConfig,
    pub requests: Arc<RequestClient>,
    pub loading: Arc<LoadingIndicator>,
    pub notifications: Arc<NotificationToaster>,
    pub dialogs: Arc<DialogController>,
}

impl UiServices {
    pub fn init(config: UiConfig, surfaces: Surfaces) -> Result<Self> {
        let requests = RequestClient::from_config(&config)
            .context("failed to build HTTP client for the admin API")?;
        info!(api_root = %requests.base_url(), "ui services initialised");
        Ok(Self {
            requests: Arc::new(requests),
            loading: LoadingIndicator::with_config(surfaces.loading, &config),
            notifications: NotificationToaster::with_config(surfaces.notifications, &config),
            dialogs: DialogController::with_config(surfaces.dialogs, &config),
            config,
        })
    }

    pub fn service<R: Resource>(&self) -> EntityService<R> {
        EntityService::new(Arc::clone(&self.requests))
    }

    /// A form controller using this page's unload prompt.
    pub fn form(&self, specs: Vec<FieldSpec>) -> Result<FormController, FormError> {
        FormController::new(specs, FormOptions::from_config(&self.config))
    }

    /// Leaves no overlay, notification or dialog behind. Pending dialog
    /// callbacks are dropped without running.
    pub fn teardown(&self) {
        self.loading.reset();
        self.notifications.clear_all();
        self.dialogs.reset();
        debug!("ui services torn down");
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
