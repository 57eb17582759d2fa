//! Typed access to the admin API's entity collections.

use std::{marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use serde::Serialize;
use shared::{
    domain::CategoryId,
    protocol::{Categories, Listing, Products, Resource, Users},
};
use tracing::warn;

use crate::{
    error::RequestFailure,
    form::{FieldValidator, FormField},
    http::RequestClient,
};

pub const DUPLICATE_CATEGORY_MESSAGE: &str = "A category with this name already exists";

pub struct EntityService<R: Resource> {
    client: Arc<RequestClient>,
    _resource: PhantomData<fn() -> R>,
}

pub type CategoryService = EntityService<Categories>;
pub type ProductService = EntityService<Products>;
pub type UserService = EntityService<Users>;

impl<R: Resource> Clone for EntityService<R> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.client))
    }
}

impl<R: Resource> EntityService<R> {
    pub fn new(client: Arc<RequestClient>) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    /// Collection path, with `?search=` when a non-empty term is given.
    pub fn collection_path(search: Option<&str>) -> String {
        match search.map(str::trim).filter(|term| !term.is_empty()) {
            Some(term) => {
                let encoded: String = url::form_urlencoded::byte_serialize(term.as_bytes()).collect();
                format!("{}?search={encoded}", R::COLLECTION)
            }
            None => R::COLLECTION.to_string(),
        }
    }

    pub async fn list(&self, search: Option<&str>) -> Result<Vec<R::Record>, RequestFailure> {
        let listing: Listing<R::Record> = self
            .client
            .get_json(&Self::collection_path(search))
            .await?;
        Ok(listing.into_items())
    }

    pub async fn get(&self, id: &R::Id) -> Result<R::Record, RequestFailure> {
        self.client.get_json(&R::item_path(id)).await
    }

    pub async fn create<D>(&self, draft: &D) -> Result<R::Record, RequestFailure>
    where
        D: Serialize + ?Sized,
    {
        self.client.post_json(R::COLLECTION, draft).await
    }

    pub async fn update<D>(&self, id: &R::Id, draft: &D) -> Result<R::Record, RequestFailure>
    where
        D: Serialize + ?Sized,
    {
        self.client.put_json(&R::item_path(id), draft).await
    }

    pub async fn delete(&self, id: &R::Id) -> Result<(), RequestFailure> {
        self.client.delete(&R::item_path(id)).await.map(|_| ())
    }
}

impl CategoryService {
    /// Whether no other category already uses `name` (case-insensitive).
    ///
    /// The category being edited is excluded. When the listing cannot be
    /// fetched the name is reported as available and the server gets the
    /// final word.
    pub async fn is_name_available(&self, name: &str, current_id: Option<CategoryId>) -> bool {
        match self.list(None).await {
            Ok(categories) => !categories.iter().any(|category| {
                category.name.to_lowercase() == name.to_lowercase()
                    && Some(category.id) != current_id
            }),
            Err(err) => {
                warn!(error = %err, "category name check failed; assuming available");
                true
            }
        }
    }
}

/// Form validator backed by [`CategoryService::is_name_available`].
pub struct UniqueCategoryName {
    service: CategoryService,
    current_id: Option<CategoryId>,
}

impl UniqueCategoryName {
    pub fn new(service: CategoryService, current_id: Option<CategoryId>) -> Self {
        Self {
            service,
            current_id,
        }
    }
}

#[async_trait]
impl FieldValidator for UniqueCategoryName {
    async fn validate(&self, field: &FormField) -> Option<String> {
        let name = field.value().trim();
        if name.is_empty() {
            return None;
        }
        let available = self.service.is_name_available(name, self.current_id).await;
        (!available).then(|| DUPLICATE_CATEGORY_MESSAGE.to_string())
    }
}

#[cfg(test)]
#[path = "tests/entity_service_tests.rs"]
mod tests;
