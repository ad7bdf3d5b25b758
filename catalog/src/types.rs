//! Domain types for the product catalog.
//!
//! Wire types mirror the catalog service's JSON: products are keyed by `_id`
//! and list responses use camelCase pagination fields. Any server fields the
//! client does not model are kept verbatim in [`Product::extra`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Opaque product identity assigned by the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Wrap a service-assigned id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Service identity (`_id` on the wire)
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Unit price
    #[serde(default)]
    pub price: f64,
    /// Image references, in display order
    #[serde(default)]
    pub images: Vec<String>,
    /// Ranking score
    #[serde(default)]
    pub score: f64,
    /// Server fields not modelled above, preserved as received
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Minimal product with the given identity and name.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: 0.0,
            images: Vec::new(),
            score: 0.0,
            extra: Map::new(),
        }
    }

    /// Builder-style score setter.
    #[must_use]
    pub const fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}

/// Category identity, used only as a filter key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Wrap a category id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category selection made by the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    /// No filter: the unfiltered product list
    All,
    /// Products of one category
    Category(CategoryId),
}

impl CategoryFilter {
    /// Parse the view's selector value, where `"all"` means no filter.
    #[must_use]
    pub fn from_selector(value: &str) -> Self {
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Category(CategoryId::new(value))
        }
    }
}

/// Pagination window over the product list.
///
/// Every field except `page_size` is produced by the service; the client never
/// computes `total_pages` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page, starting at 1
    pub current_page: u32,
    /// Total number of pages reported by the service
    pub total_pages: u32,
    /// Total number of products reported by the service
    pub total_products: u64,
    /// Products requested per page
    pub page_size: u32,
}

impl Pagination {
    /// Highest page a local page change may select.
    #[must_use]
    pub fn last_page(&self) -> u32 {
        self.total_pages.max(1)
    }

    /// Whether `page` lies within `1..=last_page()`.
    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        (1..=self.last_page()).contains(&page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            total_products: 0,
            page_size: 10,
        }
    }
}

/// One page of products as returned by `GET /products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    /// Products on this page
    #[serde(default)]
    pub products: Vec<Product>,
    /// Total number of matching products
    #[serde(default)]
    pub total_products: u64,
    /// Total number of pages
    #[serde(default)]
    pub total_pages: u32,
    /// Page the service actually returned
    #[serde(default = "first_page")]
    pub current_page: u32,
}

const fn first_page() -> u32 {
    1
}

/// A recommended product with its recommendation score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEntry {
    /// The recommended product
    pub product: Product,
    /// Recommendation score
    #[serde(default)]
    pub score: f64,
}

/// Opaque per-product score projection computed by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreIncrease(pub Value);

/// Not-yet-uploaded image attached to a product draft.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageHandle {
    /// File name sent with the multipart part
    pub file_name: String,
    /// MIME type, when known
    pub content_type: Option<String>,
    /// Raw file contents
    pub data: Vec<u8>,
}

impl ImageHandle {
    /// Image with unknown content type.
    #[must_use]
    pub fn new(file_name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    /// Builder-style content type setter.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl std::fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHandle")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Scalar fields of a product create/update form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    /// Product name
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Free-form description
    pub description: Option<String>,
    /// Category the product belongs to
    pub category: Option<CategoryId>,
    /// Additional form fields sent as-is
    pub fields: BTreeMap<String, String>,
}

impl ProductDraft {
    /// Draft with a name and price.
    #[must_use]
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            ..Self::default()
        }
    }

    /// Builder-style description setter.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder-style category setter.
    #[must_use]
    pub fn with_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    /// Builder-style extra field setter.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Flatten into multipart text fields.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("name".to_string(), self.name.clone()),
            ("price".to_string(), self.price.to_string()),
        ];
        if let Some(description) = &self.description {
            fields.push(("description".to_string(), description.clone()));
        }
        if let Some(category) = &self.category {
            fields.push(("category".to_string(), category.to_string()));
        }
        fields.extend(self.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        fields
    }
}

/// A draft together with the images captured from the draft buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSubmission {
    /// Scalar form fields
    pub draft: ProductDraft,
    /// Images sent as repeated `images` parts
    pub images: Vec<ImageHandle>,
}

/// Requested page window. Both values are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Page request with both values clamped to at least 1.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// 1-based page number
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }
}

/// Query parameters of `GET /products`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Page window
    pub page: PageRequest,
    /// Category filter, if any
    pub category: Option<CategoryId>,
}

impl ListQuery {
    /// Query-string pairs in wire order.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.page().to_string()),
            ("limit", self.page.limit().to_string()),
        ];
        if let Some(category) = &self.category {
            pairs.push(("category", category.to_string()));
        }
        pairs
    }
}

/// Bearer token supplied by the caller for authorized endpoints.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a bearer token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.0
    }

    /// Whether the token is empty or whitespace.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Correlates a dispatched command with its terminal action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a new request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap

    use super::*;
    use serde_json::json;

    #[test]
    fn product_keeps_unknown_fields() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p1",
            "name": "Lamp",
            "price": 20,
            "views": 7,
            "category": {"_id": "c1", "name": "Lighting"}
        }))
        .unwrap();

        assert_eq!(product.id, ProductId::new("p1"));
        assert!((product.price - 20.0).abs() < f64::EPSILON);
        assert!(product.images.is_empty());
        assert_eq!(product.extra.get("views"), Some(&json!(7)));

        let back = serde_json::to_value(&product).unwrap();
        assert_eq!(back["_id"], json!("p1"));
        assert_eq!(back["category"]["name"], json!("Lighting"));
    }

    #[test]
    fn page_defaults_missing_totals() {
        let page: ProductPage = serde_json::from_value(json!({"products": []})).unwrap();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn pagination_bounds_allow_first_page_when_empty() {
        let pagination = Pagination::default();
        assert!(pagination.contains(1));
        assert!(!pagination.contains(0));
        assert!(!pagination.contains(2));
    }

    #[test]
    fn selector_all_means_unfiltered() {
        assert_eq!(CategoryFilter::from_selector("all"), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::from_selector("c9"),
            CategoryFilter::Category(CategoryId::new("c9"))
        );
    }

    #[test]
    fn credential_debug_is_redacted() {
        let credential = Credential::new("secret");
        assert_eq!(format!("{credential:?}"), "Credential(***)");
        assert!(Credential::new("  ").is_empty());
    }

    #[test]
    fn draft_form_fields_include_optional_values() {
        let draft = ProductDraft::new("Chair", 49.5)
            .with_category(CategoryId::new("c1"))
            .with_field("stock", "3");

        let fields = draft.form_fields();
        assert!(fields.contains(&("price".to_string(), "49.5".to_string())));
        assert!(fields.contains(&("category".to_string(), "c1".to_string())));
        assert!(fields.contains(&("stock".to_string(), "3".to_string())));
        assert!(!fields.iter().any(|(k, _)| k == "description"));
    }
}
