//! # Catalog Sync
//!
//! Asynchronous state synchronization engine for a paginated, filterable
//! product catalog.
//!
//! The view layer dispatches commands ("load page 2", "filter by category",
//! "delete product P") to a [`CatalogEngine`]. Each command runs through a
//! three-phase lifecycle (`pending → fulfilled | rejected`) and its outcome is
//! merged into [`CatalogState`] by the [`CatalogReducer`]:
//!
//! - [`executor`]: one command, one outbound call, one normalized outcome
//! - [`lifecycle`]: shared and per-operation `{loading, error}` tracking
//! - [`state`]: the catalog cache and its list merge rules
//! - [`reconcile`]: create/update/delete applied to the product list
//! - [`drafts`]: images staged for the next create/update
//!
//! The engine runs on the generic [`catalog_sync_runtime::Store`]: the
//! reducer is the only writer and request effects run on spawned tasks.
//!
//! ## Example
//!
//! ```ignore
//! use catalog_sync::{CatalogEngine, CategoryFilter, HttpCatalogClient, config::CatalogConfig};
//! use std::sync::Arc;
//!
//! let config = CatalogConfig::from_env();
//! let client = HttpCatalogClient::new(&config.service)?;
//! let engine = CatalogEngine::with_client(Arc::new(client), config.engine);
//!
//! engine.select_category(CategoryFilter::All).await?;
//! let products = engine.state(|s| s.products.len()).await;
//! ```

pub mod action;
pub mod client;
pub mod config;
pub mod drafts;
pub mod engine;
pub mod error;
pub mod executor;
pub mod http;
pub mod lifecycle;
pub mod metrics;
pub mod mock;
pub mod reconcile;
pub mod reducer;
pub mod state;
pub mod types;

pub use action::{CatalogAction, Command, Fulfillment};
pub use client::CatalogClient;
pub use engine::CatalogEngine;
pub use error::{ClientError, DispatchError, ErrorPayload};
pub use http::HttpCatalogClient;
pub use lifecycle::{OperationKind, RequestStatus};
pub use mock::MockCatalogClient;
pub use reducer::{CatalogEnvironment, CatalogReducer};
pub use state::CatalogState;
pub use types::{
    CategoryFilter, CategoryId, Credential, ImageHandle, PageRequest, Pagination, Product,
    ProductDraft, ProductId, ProductPage, RecommendationEntry, ScoreIncrease,
};
