use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::domain::{Category, CategoryId, Product, ProductId, User, UserId};

/// Path prefix every admin API route lives under.
pub const API_PREFIX: &str = "/api/v1";

/// A REST collection exposed by the admin API.
pub trait Resource: Send + Sync + 'static {
    /// Pluralized collection path, e.g. `/categories`.
    const COLLECTION: &'static str;
    /// Human-readable singular noun used in user-facing messages.
    const NOUN: &'static str;

    type Id: fmt::Display + Clone + Send + Sync + 'static;
    type Record: DeserializeOwned + Send + 'static;

    fn item_path(id: &Self::Id) -> String {
        format!("{}/{id}", Self::COLLECTION)
    }
}

pub struct Categories;
pub struct Products;
pub struct Users;

impl Resource for Categories {
    const COLLECTION: &'static str = "/categories";
    const NOUN: &'static str = "category";
    type Id = CategoryId;
    type Record = Category;
}

impl Resource for Products {
    const COLLECTION: &'static str = "/products";
    const NOUN: &'static str = "product";
    type Id = ProductId;
    type Record = Product;
}

impl Resource for Users {
    const COLLECTION: &'static str = "/users";
    const NOUN: &'static str = "user";
    type Id = UserId;
    type Record = User;
}

/// List endpoints answer either with a bare array or with a page envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page {
        content: Vec<T>,
        #[serde(default, rename = "totalElements")]
        total_elements: Option<u64>,
    },
    Items(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Page { content, .. } => content,
            Listing::Items(items) => items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listing_accepts_bare_array() {
        let listing: Listing<Category> =
            serde_json::from_value(json!([{ "id": 1, "name": "A" }])).expect("listing");
        assert_eq!(listing.into_items().len(), 1);
    }

    #[test]
    fn listing_accepts_page_envelope() {
        let listing: Listing<Category> = serde_json::from_value(json!({
            "content": [{ "id": 1, "name": "A" }, { "id": 2, "name": "B" }],
            "totalElements": 2,
            "number": 0
        }))
        .expect("listing");
        let items = listing.into_items();
        assert_eq!(items[1].id, CategoryId(2));
    }

    #[test]
    fn item_path_joins_collection_and_id() {
        assert_eq!(Products::item_path(&ProductId(12)), "/products/12");
        assert_eq!(Users::item_path(&UserId(4)), "/users/4");
    }
}
