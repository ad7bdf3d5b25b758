//! Abstract catalog service client.
//!
//! The engine depends only on this trait. [`HttpCatalogClient`](crate::http::HttpCatalogClient)
//! talks to the real service; [`MockCatalogClient`](crate::mock::MockCatalogClient)
//! scripts responses for tests.

use crate::error::ClientError;
use crate::types::{
    Credential, ListQuery, Product, ProductId, ProductPage, ProductSubmission, RecommendationEntry,
    ScoreIncrease,
};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

/// Result of a single client call
pub type ClientResult<T> = Result<T, ClientError>;

/// Boxed future returned by every client call
pub type ClientFuture<T> = Pin<Box<dyn Future<Output = ClientResult<T>> + Send>>;

/// Catalog service operations.
///
/// Every method makes at most one transport call. Implementations never retry.
pub trait CatalogClient: Send + Sync {
    /// List one page of products, optionally filtered by category
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the page cannot be decoded
    fn list_products(&self, query: ListQuery) -> ClientFuture<ProductPage>;

    /// Fetch one product without counting a view
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the product cannot be decoded
    fn get_product(&self, id: ProductId) -> ClientFuture<Product>;

    /// Create a product from a multipart form
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the service rejects the form
    fn create_product(&self, submission: ProductSubmission) -> ClientFuture<Product>;

    /// Replace a product's fields and images
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the credential is refused
    fn update_product(
        &self,
        id: ProductId,
        submission: ProductSubmission,
        credential: Credential,
    ) -> ClientFuture<Product>;

    /// Delete a product
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the credential is refused
    fn delete_product(&self, id: ProductId, credential: Credential) -> ClientFuture<()>;

    /// Fetch general recommendations
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the entries cannot be decoded
    fn recommendations(&self) -> ClientFuture<Vec<RecommendationEntry>>;

    /// Add `increment` to a product's score
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the credential is refused
    fn increase_score(&self, product_id: ProductId, increment: f64, credential: Credential) -> ClientFuture<Value>;

    /// Compute score-increase projections for all products
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the credential is refused
    fn calculate_score_increases(&self, credential: Credential) -> ClientFuture<Vec<ScoreIncrease>>;
}
