//! Per-entity screen definitions: form fields, id lookup, payloads.

use anyhow::{Context, Result};
use client_core::{
    entity_service::UniqueCategoryName,
    form::{validator_fn, FieldKind, FieldSpec, ValidatorRegistry},
    FormValues, UiServices,
};
use serde_json::{json, Value};
use shared::{
    domain::{Category, CategoryId, Product, ProductId, User, UserId, UserRole},
    protocol::{Categories, Products, Resource, Users},
};

use crate::screen::IdLookup;

/// What a [`crate::screen::CrudScreen`] needs to know about an entity.
pub trait ScreenResource: Resource {
    /// Capitalised noun for titles and messages.
    const TITLE: &'static str;
    /// Where the user lands after a delete.
    const LIST_PAGE: &'static str;

    fn id_lookup() -> IdLookup;
    fn parse_id(raw: &str) -> Option<Self::Id>;
    fn field_specs() -> Vec<FieldSpec>;

    fn validators(_services: &UiServices, _editing: Option<&Self::Id>) -> ValidatorRegistry {
        ValidatorRegistry::new()
    }

    /// Page to leave for once a save went through.
    fn redirect_after_save(_editing: bool) -> Option<&'static str> {
        Some(Self::LIST_PAGE)
    }

    /// Request body for create/update built from submitted form values.
    fn draft(values: &FormValues) -> Result<Value>;
    /// Form values describing an existing record.
    fn values_of(record: &Self::Record) -> FormValues;
    fn summary(record: &Self::Record) -> String;
}

fn text(values: &FormValues, name: &str) -> Option<String> {
    values
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn checked(values: &FormValues, name: &str) -> bool {
    values.contains_key(name)
}

fn checkbox(on: bool) -> String {
    if on {
        client_core::form::CHECKBOX_ON.to_string()
    } else {
        String::new()
    }
}

fn active_field() -> FieldSpec {
    FieldSpec::new("active", FieldKind::Checkbox).default_value(client_core::form::CHECKBOX_ON)
}

fn form_values<const N: usize>(pairs: [(&str, String); N]) -> FormValues {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

impl ScreenResource for Categories {
    const TITLE: &'static str = "Category";
    const LIST_PAGE: &'static str = "/categories";

    fn id_lookup() -> IdLookup {
        IdLookup::new(&["categoryId", "categoria-id", "id"])
    }

    fn parse_id(raw: &str) -> Option<CategoryId> {
        raw.parse().ok()
    }

    fn field_specs() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("name").required().validator("uniqueCategoryName"),
            FieldSpec::new("description", FieldKind::TextArea),
            active_field(),
        ]
    }

    fn validators(services: &UiServices, editing: Option<&CategoryId>) -> ValidatorRegistry {
        ValidatorRegistry::new().register(
            "uniqueCategoryName",
            UniqueCategoryName::new(services.service::<Categories>(), editing.copied()),
        )
    }

    /// New categories stay on the form so the next one can be entered.
    fn redirect_after_save(editing: bool) -> Option<&'static str> {
        editing.then_some(Self::LIST_PAGE)
    }

    fn draft(values: &FormValues) -> Result<Value> {
        Ok(json!({
            "name": text(values, "name"),
            "description": text(values, "description"),
            "active": checked(values, "active"),
        }))
    }

    fn values_of(record: &Category) -> FormValues {
        form_values([
            ("name", record.name.clone()),
            ("description", record.description.clone().unwrap_or_default()),
            ("active", checkbox(record.active)),
        ])
    }

    fn summary(record: &Category) -> String {
        let state = if record.active { "active" } else { "inactive" };
        format!("#{} {} ({state})", record.id, record.name)
    }
}

impl ScreenResource for Products {
    const TITLE: &'static str = "Product";
    const LIST_PAGE: &'static str = "/products";

    fn id_lookup() -> IdLookup {
        IdLookup::new(&["productId", "produto-id", "id"])
    }

    fn parse_id(raw: &str) -> Option<ProductId> {
        raw.parse().ok()
    }

    fn field_specs() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("name").required(),
            FieldSpec::new("description", FieldKind::TextArea),
            FieldSpec::new("price", FieldKind::Number)
                .required()
                .validator("positivePrice"),
            FieldSpec::new("stock", FieldKind::Number)
                .default_value("0")
                .validator("stockCount"),
            FieldSpec::new("categoryId", FieldKind::Select).validator("categoryRef"),
            FieldSpec::text("imageUrl"),
            active_field(),
        ]
    }

    fn validators(_services: &UiServices, _editing: Option<&ProductId>) -> ValidatorRegistry {
        ValidatorRegistry::new()
            .register(
                "positivePrice",
                validator_fn(|field| match field.value().trim().parse::<f64>() {
                    Ok(price) if price > 0.0 => None,
                    _ if field.value().trim().is_empty() => None,
                    _ => Some("Price must be a positive number".to_string()),
                }),
            )
            .register(
                "stockCount",
                validator_fn(|field| {
                    let value = field.value().trim();
                    (!value.is_empty() && value.parse::<u32>().is_err())
                        .then(|| "Stock must be a whole number of zero or more".to_string())
                }),
            )
            .register(
                "categoryRef",
                validator_fn(|field| {
                    let value = field.value().trim();
                    (!value.is_empty() && value.parse::<CategoryId>().is_err())
                        .then(|| "Select a valid category".to_string())
                }),
            )
    }

    fn draft(values: &FormValues) -> Result<Value> {
        let price = text(values, "price")
            .map(|raw| raw.parse::<f64>().with_context(|| format!("invalid price '{raw}'")))
            .transpose()?;
        let stock = text(values, "stock")
            .map(|raw| raw.parse::<i32>().with_context(|| format!("invalid stock '{raw}'")))
            .transpose()?
            .unwrap_or(0);
        let category = text(values, "categoryId")
            .map(|raw| {
                raw.parse::<CategoryId>()
                    .with_context(|| format!("invalid category id '{raw}'"))
            })
            .transpose()?
            .map(|id| json!({ "id": id }));

        Ok(json!({
            "name": text(values, "name"),
            "description": text(values, "description"),
            "price": price,
            "stock": stock,
            "imageUrl": text(values, "imageUrl"),
            "category": category,
            "active": checked(values, "active"),
        }))
    }

    fn values_of(record: &Product) -> FormValues {
        form_values([
            ("name", record.name.clone()),
            ("description", record.description.clone().unwrap_or_default()),
            (
                "price",
                record.price.map(|price| price.to_string()).unwrap_or_default(),
            ),
            ("stock", record.stock.to_string()),
            (
                "categoryId",
                record
                    .category
                    .as_ref()
                    .map(|category| category.id.to_string())
                    .unwrap_or_default(),
            ),
            ("imageUrl", record.image_url.clone().unwrap_or_default()),
            ("active", checkbox(record.active)),
        ])
    }

    fn summary(record: &Product) -> String {
        let price = record
            .price
            .map(|price| format!("{price:.2}"))
            .unwrap_or_else(|| "-".into());
        let category = record
            .category
            .as_ref()
            .map(|category| category.name.as_str())
            .unwrap_or("uncategorised");
        format!(
            "#{} {} | {price} | stock {} | {category}",
            record.id, record.name, record.stock
        )
    }
}

impl ScreenResource for Users {
    const TITLE: &'static str = "User";
    const LIST_PAGE: &'static str = "/users";

    fn id_lookup() -> IdLookup {
        IdLookup::new(&["userId", "usuario-id", "id"])
    }

    fn parse_id(raw: &str) -> Option<UserId> {
        raw.parse().ok()
    }

    fn field_specs() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("name").required(),
            FieldSpec::email("email").required(),
            FieldSpec::new("role", FieldKind::Select)
                .required()
                .default_value(UserRole::Manager.as_str())
                .validator("knownRole"),
            FieldSpec::text("phone"),
            FieldSpec::new("password", FieldKind::Password),
            active_field(),
        ]
    }

    fn validators(_services: &UiServices, _editing: Option<&UserId>) -> ValidatorRegistry {
        ValidatorRegistry::new().register(
            "knownRole",
            validator_fn(|field| {
                let value = field.value().trim();
                (!value.is_empty() && value.parse::<UserRole>().is_err())
                    .then(|| "Role must be ADMIN or MANAGER".to_string())
            }),
        )
    }

    fn draft(values: &FormValues) -> Result<Value> {
        let role = text(values, "role")
            .map(|raw| raw.parse::<UserRole>())
            .transpose()?;
        let mut draft = json!({
            "name": text(values, "name"),
            "email": text(values, "email"),
            "role": role,
            "phone": text(values, "phone"),
            "active": checked(values, "active"),
        });
        if let Some(password) = text(values, "password") {
            draft["password"] = Value::String(password);
        }
        Ok(draft)
    }

    fn values_of(record: &User) -> FormValues {
        form_values([
            ("name", record.name.clone()),
            ("email", record.email.clone()),
            (
                "role",
                record
                    .role
                    .map(|role| role.as_str().to_string())
                    .unwrap_or_default(),
            ),
            ("phone", record.phone.clone().unwrap_or_default()),
            ("active", checkbox(record.active)),
        ])
    }

    fn summary(record: &User) -> String {
        let role = record.role.map(UserRole::as_str).unwrap_or("-");
        format!("#{} {} <{}> {role}", record.id, record.name, record.email)
    }
}

#[cfg(test)]
#[path = "tests/resources_tests.rs"]
mod tests;
