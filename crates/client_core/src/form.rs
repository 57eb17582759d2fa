//! Form lifecycle: field validation, dirty tracking, the unsaved-changes
//! guard and submit orchestration.
//!
//! The controller owns a field model declared by the caller. Hosts forward
//! `input` and `blur` events to it, ask it whether navigation must be
//! guarded, and call [`FormController::submit`] on form submission.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    future::Future,
    sync::{Arc, LazyLock},
};

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use crate::{
    config::UiConfig,
    error::FormError,
    surface::{DetachedSurface, FormSurface},
};

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const INVALID_EMAIL_MESSAGE: &str = "Invalid email";
/// Value a checked checkbox contributes to the submitted values.
pub const CHECKBOX_ON: &str = "on";

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub type FormValues = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Password,
    Number,
    TextArea,
    Select,
    Checkbox,
    Hidden,
}

/// Declarative description of one form control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub default_value: String,
    /// Name of a custom validator looked up in the [`ValidatorRegistry`].
    pub validator: Option<String>,
    pub disabled: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default_value: String::new(),
            validator: None,
            disabled: false,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn email(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Email)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn validator(mut self, name: impl Into<String>) -> Self {
        self.validator = Some(name.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// A field's declaration together with its current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    spec: FieldSpec,
    value: String,
}

impl FormField {
    fn new(spec: FieldSpec) -> Self {
        let value = normalize(spec.kind, &spec.default_value);
        Self { spec, value }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn kind(&self) -> FieldKind {
        self.spec.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_required(&self) -> bool {
        self.spec.required
    }

    pub fn is_disabled(&self) -> bool {
        self.spec.disabled
    }

    pub fn is_checked(&self) -> bool {
        self.spec.kind == FieldKind::Checkbox && !self.value.is_empty()
    }

    fn set_value(&mut self, value: &str) {
        self.value = normalize(self.spec.kind, value);
    }

    fn reset(&mut self) {
        self.value = normalize(self.spec.kind, &self.spec.default_value);
    }
}

fn normalize(kind: FieldKind, value: &str) -> String {
    match kind {
        FieldKind::Checkbox => {
            let unchecked = matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "" | "false" | "off" | "0"
            );
            if unchecked {
                String::new()
            } else {
                CHECKBOX_ON.to_string()
            }
        }
        _ => value.to_string(),
    }
}

/// One link of a field's validator chain.
///
/// Returns the message to show, or `None` when the field passes.
#[async_trait]
pub trait FieldValidator: Send + Sync {
    async fn validate(&self, field: &FormField) -> Option<String>;
}

pub struct RequiredValidator;

#[async_trait]
impl FieldValidator for RequiredValidator {
    async fn validate(&self, field: &FormField) -> Option<String> {
        let missing = match field.kind() {
            FieldKind::Checkbox => !field.is_checked(),
            _ => field.value().trim().is_empty(),
        };
        missing.then(|| REQUIRED_MESSAGE.to_string())
    }
}

/// Rejects non-empty values that do not look like an email address.
pub struct EmailValidator;

#[async_trait]
impl FieldValidator for EmailValidator {
    async fn validate(&self, field: &FormField) -> Option<String> {
        let value = field.value();
        (!value.is_empty() && !EMAIL_SHAPE.is_match(value))
            .then(|| INVALID_EMAIL_MESSAGE.to_string())
    }
}

pub struct FnValidator<F>(F);

/// Adapts a synchronous closure into a [`FieldValidator`].
pub fn validator_fn<F>(check: F) -> FnValidator<F>
where
    F: Fn(&FormField) -> Option<String> + Send + Sync,
{
    FnValidator(check)
}

#[async_trait]
impl<F> FieldValidator for FnValidator<F>
where
    F: Fn(&FormField) -> Option<String> + Send + Sync,
{
    async fn validate(&self, field: &FormField) -> Option<String> {
        (self.0)(field)
    }
}

/// Named custom validators available to a form.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, Arc<dyn FieldValidator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, name: impl Into<String>, validator: impl FieldValidator + 'static) -> Self {
        self.validators.insert(name.into(), Arc::new(validator));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn FieldValidator>> {
        self.validators.get(name).cloned()
    }
}

/// Receives the collected values of a valid form.
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    async fn submit(&self, values: FormValues) -> anyhow::Result<()>;
}

pub struct FnSubmitHandler<F>(F);

pub fn submit_fn<F, Fut>(handler: F) -> FnSubmitHandler<F>
where
    F: Fn(FormValues) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    FnSubmitHandler(handler)
}

#[async_trait]
impl<F, Fut> SubmitHandler for FnSubmitHandler<F>
where
    F: Fn(FormValues) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn submit(&self, values: FormValues) -> anyhow::Result<()> {
        (self.0)(values).await
    }
}

#[derive(Debug, Clone)]
pub struct FormOptions {
    /// Validate on blur and clear a field's error on input.
    pub validate_real_time: bool,
    /// Track input changes and guard navigation while dirty.
    pub confirm_unsaved_changes: bool,
    pub unload_prompt: String,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self::from_config(&UiConfig::default())
    }
}

impl FormOptions {
    pub fn from_config(config: &UiConfig) -> Self {
        Self {
            validate_real_time: true,
            confirm_unsaved_changes: true,
            unload_prompt: config.unload_prompt.clone(),
        }
    }
}

/// Answer to a page-unload attempt while the form holds unsaved changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationGuard {
    pub prevent_default: bool,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted { values: FormValues },
    Rejected { invalid_fields: Vec<String> },
}

pub struct FormController {
    fields: Vec<FormField>,
    snapshot: FormValues,
    dirty: bool,
    errors: BTreeMap<String, String>,
    registry: ValidatorRegistry,
    handler: Option<Arc<dyn SubmitHandler>>,
    surface: Arc<dyn FormSurface>,
    options: FormOptions,
}

impl FormController {
    pub fn new(specs: Vec<FieldSpec>, options: FormOptions) -> Result<Self, FormError> {
        let mut seen = HashSet::new();
        for spec in &specs {
            if !seen.insert(spec.name.as_str()) {
                return Err(FormError::DuplicateField(spec.name.clone()));
            }
        }
        let fields: Vec<FormField> = specs.into_iter().map(FormField::new).collect();
        let mut form = Self {
            fields,
            snapshot: FormValues::new(),
            dirty: false,
            errors: BTreeMap::new(),
            registry: ValidatorRegistry::default(),
            handler: None,
            surface: Arc::new(DetachedSurface),
            options,
        };
        form.snapshot = form.values();
        Ok(form)
    }

    pub fn with_surface(mut self, surface: Arc<dyn FormSurface>) -> Self {
        self.surface = surface;
        self
    }

    pub fn with_validators(mut self, registry: ValidatorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_submit_handler(mut self, handler: impl SubmitHandler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Values captured at construction or at the last save/reset.
    pub fn snapshot(&self) -> &FormValues {
        &self.snapshot
    }

    pub fn field_error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Current values as a submission would carry them: disabled fields and
    /// unchecked checkboxes are left out.
    pub fn values(&self) -> FormValues {
        self.fields
            .iter()
            .filter(|field| !field.is_disabled())
            .filter(|field| field.kind() != FieldKind::Checkbox || field.is_checked())
            .map(|field| (field.name().to_string(), field.value().to_string()))
            .collect()
    }

    /// A user edit of one field.
    pub fn on_input(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        self.field_mut(name)?.set_value(value);
        if self.options.validate_real_time {
            self.clear_error(name);
        }
        if self.options.confirm_unsaved_changes {
            self.dirty = true;
        }
        Ok(())
    }

    /// Focus left a field. Validates it when real-time validation is on;
    /// otherwise reports it as valid without checking.
    pub async fn on_blur(&mut self, name: &str) -> Result<bool, FormError> {
        if !self.options.validate_real_time {
            self.field_mut(name)?;
            return Ok(true);
        }
        self.validate_field(name).await
    }

    /// Runs the field's validator chain; the first failure is shown inline.
    pub async fn validate_field(&mut self, name: &str) -> Result<bool, FormError> {
        let field = self
            .field(name)
            .cloned()
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        if field.is_disabled() {
            self.clear_error(name);
            return Ok(true);
        }

        for validator in self.chain_for(&field) {
            if let Some(message) = validator.validate(&field).await {
                self.show_error(name, message);
                return Ok(false);
            }
        }
        self.clear_error(name);
        Ok(true)
    }

    /// Validates every field and returns the names of those that failed.
    pub async fn validate_all(&mut self) -> Vec<String> {
        let names: Vec<String> = self
            .fields
            .iter()
            .map(|field| field.name().to_string())
            .collect();
        let mut invalid = Vec::new();
        for name in names {
            if !matches!(self.validate_field(&name).await, Ok(true)) {
                invalid.push(name);
            }
        }
        invalid
    }

    /// Validates the whole form and hands its values to the submit handler.
    ///
    /// Validation failures stay inside the form. A handler failure is
    /// returned unchanged and leaves the dirty flag alone.
    pub async fn submit(&mut self) -> anyhow::Result<SubmitOutcome> {
        let invalid_fields = self.validate_all().await;
        if !invalid_fields.is_empty() {
            debug!(?invalid_fields, "form submission blocked by validation");
            return Ok(SubmitOutcome::Rejected { invalid_fields });
        }

        let values = self.values();
        match &self.handler {
            Some(handler) => handler.submit(values.clone()).await?,
            None => debug!("form submitted without a handler"),
        }
        Ok(SubmitOutcome::Submitted { values })
    }

    /// Page-unload hook: a guard while unsaved changes exist.
    pub fn before_unload(&self) -> Option<NavigationGuard> {
        (self.options.confirm_unsaved_changes && self.dirty).then(|| NavigationGuard {
            prevent_default: true,
            prompt: self.options.unload_prompt.clone(),
        })
    }

    /// Sets values programmatically. Unknown names are ignored and the form
    /// does not become dirty.
    pub fn set_values<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in values {
            let name = name.as_ref();
            match self.fields.iter_mut().find(|field| field.name() == name) {
                Some(field) => {
                    field.set_value(value.as_ref());
                    self.surface.set_field_value(name, field.value());
                }
                None => debug!(field = name, "ignoring value for unknown field"),
            }
        }
    }

    /// Restores defaults, clears errors and starts a fresh snapshot.
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.reset();
            self.surface.set_field_value(field.name(), field.value());
        }
        for name in std::mem::take(&mut self.errors).into_keys() {
            self.surface.clear_field_error(&name);
        }
        self.snapshot = self.values();
        self.dirty = false;
    }

    /// Accepts the current values as persisted.
    pub fn mark_saved(&mut self) {
        self.snapshot = self.values();
        self.dirty = false;
    }

    fn chain_for(&self, field: &FormField) -> Vec<Arc<dyn FieldValidator>> {
        let mut chain: Vec<Arc<dyn FieldValidator>> = Vec::new();
        if field.is_required() {
            chain.push(Arc::new(RequiredValidator));
        }
        if field.kind() == FieldKind::Email {
            chain.push(Arc::new(EmailValidator));
        }
        if let Some(name) = &field.spec.validator {
            match self.registry.get(name) {
                Some(validator) => chain.push(validator),
                None => warn!(field = field.name(), validator = %name, "custom validator not registered"),
            }
        }
        chain
    }

    fn field_mut(&mut self, name: &str) -> Result<&mut FormField, FormError> {
        self.fields
            .iter_mut()
            .find(|field| field.name() == name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    fn show_error(&mut self, name: &str, message: String) {
        self.surface.show_field_error(name, &message);
        self.errors.insert(name.to_string(), message);
    }

    fn clear_error(&mut self, name: &str) {
        if self.errors.remove(name).is_some() {
            self.surface.clear_field_error(name);
        }
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
