//! Core types shared across Storefront Search: catalog documents, product
//! projections, image references, view items, and user-facing messages.

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Image path rendered for products that carry no image reference.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Document type every searchable product carries in the content store.
pub const PRODUCT_TYPE: &str = "product";

pub const MSG_EMPTY_INPUT: &str = "Please enter a search term";
pub const MSG_FETCH_FAILED: &str = "An error occurred while searching";
pub const MSG_NO_PRODUCTS: &str = "No products found";
pub const MSG_LOADING: &str = "Loading...";

/// Message shown when a valid query matched nothing.
pub fn no_results_message(query: &str) -> String {
    format!("No results found for \"{query}\"")
}

// ---------------------------------------------------------------------------
// Image references
// ---------------------------------------------------------------------------

/// Asset pointer inside an image object. Either a `_ref` to an uploaded asset
/// (`image-<id>-<w>x<h>-<fmt>`) or, when the query dereferenced it, a `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// An image field as stored on a product document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub asset: Option<AssetRef>,
}

impl ImageRef {
    /// Image object pointing at an uploaded asset by reference.
    pub fn from_ref(reference: impl Into<String>) -> Self {
        Self {
            kind: Some("image".to_string()),
            asset: Some(AssetRef { reference: Some(reference.into()), url: None }),
        }
    }
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// The content lake projects absent attributes as `null`; read those as the
/// field's default like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The projection the search query selects: `{ _id, name, price, image, category }`.
/// Fields are taken verbatim from the content store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// A full product document as held by a catalog. Only the in-memory catalog
/// sees these; remote backends return [`Product`] projections directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CatalogDocument {
    /// Project the document down to the fields a search returns.
    pub fn project(&self) -> Product {
        Product {
            id: self.id.clone(),
            name: self.name.clone().unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            image: self.image.clone(),
            category: self.category.clone(),
        }
    }
}

/// Everything one product card needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewItem {
    pub id: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub title: String,
    pub price: f64,
}

impl ViewItem {
    /// Price as shown on a card, e.g. `$24.50`.
    pub fn display_price(&self) -> String {
        format!("${:.2}", self.price)
    }
}
