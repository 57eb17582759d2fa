//! One generic CRUD screen shared by every entity.
//!
//! The delete flow is confirm dialog, loading-wrapped delete, then a
//! success dialog whose close redirects, or an error dialog. The save flow
//! runs the entity form and hands valid values to a loading-wrapped
//! create/update.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use anyhow::{Context, Result};
use client_core::{
    form::submit_fn,
    surface::FormSurface,
    DialogRequest, EntityService, FormValues, LoadingOptions, NotificationOptions, RequestFailure,
    SubmitOutcome, UiServices,
};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::{console::DialogResponder, resources::ScreenResource};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ordered page fields that may hold the record id; the first non-empty
/// one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdLookup {
    candidates: Vec<&'static str>,
}

impl IdLookup {
    pub fn new(candidates: &[&'static str]) -> Self {
        Self {
            candidates: candidates.to_vec(),
        }
    }

    pub fn resolve<'a>(&self, page: &'a FormValues) -> Option<&'a str> {
        self.candidates
            .iter()
            .filter_map(|name| page.get(*name))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    MissingId,
    Cancelled,
    Deleted { redirect: Option<String> },
    Failed(RequestFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome<T> {
    /// `redirect` is the page to return to, when the resource leaves the
    /// form after saving.
    Saved { record: T, redirect: Option<String> },
    Invalid(BTreeMap<String, String>),
}

pub struct CrudScreen<R: ScreenResource> {
    services: UiServices,
    entity: EntityService<R>,
    form_surface: Arc<dyn FormSurface>,
    responder: Arc<dyn DialogResponder>,
}

impl<R: ScreenResource> CrudScreen<R> {
    pub fn new(
        services: UiServices,
        form_surface: Arc<dyn FormSurface>,
        responder: Arc<dyn DialogResponder>,
    ) -> Self {
        Self {
            entity: services.service::<R>(),
            services,
            form_surface,
            responder,
        }
    }

    pub async fn list(&self, search: Option<&str>) -> Result<Vec<R::Record>, RequestFailure> {
        let noun = R::COLLECTION.trim_start_matches('/');
        let options = LoadingOptions::message(format!("Loading {noun}..."));
        self.services.loading.run(options, self.entity.list(search)).await
    }

    pub async fn show(&self, page: &FormValues) -> Result<R::Record> {
        let id = self.resolve_id(page).with_context(|| format!("{} id not found", R::TITLE))?;
        let options = LoadingOptions::message(format!("Loading {}...", R::NOUN));
        let record = self.services.loading.run(options, self.entity.get(&id)).await?;
        Ok(record)
    }

    pub async fn delete_flow(&self, page: &FormValues) -> Result<DeleteOutcome> {
        let Some(id) = self.resolve_id(page) else {
            self.services.notifications.error(
                format!("{} id not found", R::TITLE),
                NotificationOptions::default(),
            );
            return Ok(DeleteOutcome::MissingId);
        };

        let (decided, decision) = oneshot::channel();
        let decided = Arc::new(Mutex::new(Some(decided)));
        let settle = move |confirmed: bool| {
            let decided = Arc::clone(&decided);
            move || {
                if let Some(sender) = lock(&decided).take() {
                    let _ = sender.send(confirmed);
                }
            }
        };
        self.services.dialogs.confirm(
            DialogRequest::new(
                format!("Remove {}", R::TITLE),
                format!("Are you sure you want to remove this {}?", R::NOUN),
            )
            .close_label("Cancel")
            .confirm_label("Yes, remove")
            .on_confirm(settle(true))
            .on_close(settle(false)),
        )?;
        self.responder.respond(&self.services.dialogs);

        // A superseded dialog drops both callbacks, which reads as cancel.
        if !decision.await.unwrap_or(false) {
            debug!(noun = R::NOUN, %id, "delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }

        let entity = self.entity.clone();
        let target = id.clone();
        let delete = self.services.loading.wrap(
            move || async move { entity.delete(&target).await },
            LoadingOptions::message(format!("Deleting {}...", R::NOUN)),
        );

        match delete().await {
            Ok(()) => {
                info!(noun = R::NOUN, %id, "record deleted");
                let redirect = Arc::new(Mutex::new(None));
                let slot = Arc::clone(&redirect);
                self.services.dialogs.success(
                    DialogRequest::new("Success", format!("{} removed successfully.", R::TITLE))
                        .close_label("Ok")
                        .on_close(move || *lock(&slot) = Some(R::LIST_PAGE.to_string())),
                )?;
                self.responder.respond(&self.services.dialogs);
                let redirect = lock(&redirect).take();
                Ok(DeleteOutcome::Deleted { redirect })
            }
            Err(failure) => {
                warn!(noun = R::NOUN, %id, error = %failure, "delete failed");
                let fallback = format!("Error removing {}. Try again.", R::NOUN);
                self.services.dialogs.error(
                    DialogRequest::new("Error", failure.user_message(&fallback)).close_label("Close"),
                )?;
                self.responder.respond(&self.services.dialogs);
                Ok(DeleteOutcome::Failed(failure))
            }
        }
    }

    /// Creates (`editing == None`) or updates a record from `input`, which
    /// is applied to the form as if typed by the user.
    ///
    /// Validation failures come back as [`SaveOutcome::Invalid`]; request
    /// failures are notified and then returned as errors.
    pub async fn save_flow(
        &self,
        editing: Option<R::Id>,
        input: &FormValues,
    ) -> Result<SaveOutcome<R::Record>> {
        let mut form = self
            .services
            .form(R::field_specs())?
            .with_surface(Arc::clone(&self.form_surface))
            .with_validators(R::validators(&self.services, editing.as_ref()));

        if let Some(id) = &editing {
            let options = LoadingOptions::message(format!("Loading {}...", R::NOUN));
            let current = self
                .services
                .loading
                .run(options, self.entity.get(id))
                .await
                .with_context(|| format!("failed to load {} {id}", R::NOUN))?;
            form.set_values(R::values_of(&current));
            form.mark_saved();
        }
        for (name, value) in input {
            form.on_input(name, value)?;
        }

        let saved = Arc::new(Mutex::new(None));
        let handler = {
            let services = self.services.clone();
            let entity = self.entity.clone();
            let editing = editing.clone();
            let saved = Arc::clone(&saved);
            submit_fn(move |values: FormValues| {
                let services = services.clone();
                let entity = entity.clone();
                let editing = editing.clone();
                let saved = Arc::clone(&saved);
                async move { persist(&services, &entity, editing.as_ref(), &values, &saved).await }
            })
        };
        let mut form = form.with_submit_handler(handler);

        match form.submit().await? {
            SubmitOutcome::Submitted { .. } => {
                form.mark_saved();
                let record = lock(&saved)
                    .take()
                    .context("save finished without a record")?;
                let redirect = R::redirect_after_save(editing.is_some()).map(str::to_string);
                Ok(SaveOutcome::Saved { record, redirect })
            }
            SubmitOutcome::Rejected { invalid_fields } => {
                debug!(noun = R::NOUN, ?invalid_fields, "save blocked by validation");
                Ok(SaveOutcome::Invalid(form.errors().clone()))
            }
        }
    }

    fn resolve_id(&self, page: &FormValues) -> Option<R::Id> {
        R::id_lookup().resolve(page).and_then(R::parse_id)
    }
}

async fn persist<R: ScreenResource>(
    services: &UiServices,
    entity: &EntityService<R>,
    editing: Option<&R::Id>,
    values: &FormValues,
    saved: &Mutex<Option<R::Record>>,
) -> Result<()> {
    let draft = R::draft(values)?;
    let result = match editing {
        Some(id) => {
            let options = LoadingOptions::message(format!("Updating {}...", R::NOUN));
            services.loading.run(options, entity.update(id, &draft)).await
        }
        None => {
            let options = LoadingOptions::message(format!("Creating {}...", R::NOUN));
            services.loading.run(options, entity.create(&draft)).await
        }
    };

    let verb = if editing.is_some() { "updated" } else { "created" };
    match result {
        Ok(record) => {
            services.notifications.success(
                format!("{} {verb} successfully!", R::TITLE),
                NotificationOptions::default(),
            );
            *lock(saved) = Some(record);
            Ok(())
        }
        Err(failure) => {
            let action = if editing.is_some() { "updating" } else { "creating" };
            services.notifications.error(
                failure.user_message(&format!("Error {action} {}", R::NOUN)),
                NotificationOptions::default(),
            );
            Err(failure.into())
        }
    }
}

#[cfg(test)]
#[path = "tests/screen_tests.rs"]
mod tests;
