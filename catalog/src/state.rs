//! Catalog state owned by the store.

use crate::drafts::DraftImageBuffer;
use crate::error::ErrorPayload;
use crate::lifecycle::{LifecycleTracker, OperationKind, RequestStatus};
use crate::types::{CategoryId, Pagination, Product, ProductPage, RecommendationEntry, ScoreIncrease};

/// Authoritative in-memory catalog.
///
/// The view reads snapshots of this state; only the reducer mutates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    /// Unfiltered product list
    pub products: Vec<Product>,
    /// Result of the last category-filtered list
    pub featured_products: Vec<Product>,
    /// Last fetched single product
    pub product: Option<Product>,
    /// Pagination window of the last list response
    pub pagination: Pagination,
    /// Category of the last fulfilled list (`None` after an unfiltered list)
    pub active_category: Option<CategoryId>,
    /// General recommendations, never merged into `products`
    pub general_recommendations: Vec<RecommendationEntry>,
    /// Score-increase projections
    pub score_increases: Vec<ScoreIncrease>,
    /// Images staged for the next create/update
    pub drafts: DraftImageBuffer,
    /// Request lifecycle
    pub lifecycle: LifecycleTracker,
}

impl CatalogState {
    /// Empty catalog with the given page size.
    #[must_use]
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            pagination: Pagination {
                page_size: page_size.max(1),
                ..Pagination::default()
            },
            ..Self::default()
        }
    }

    /// Shared loading flag.
    #[must_use]
    pub const fn loading(&self) -> bool {
        self.lifecycle.shared().loading
    }

    /// Shared error.
    #[must_use]
    pub const fn error(&self) -> Option<&ErrorPayload> {
        self.lifecycle.shared().error.as_ref()
    }

    /// Status of one operation kind.
    #[must_use]
    pub fn operation(&self, kind: OperationKind) -> RequestStatus {
        self.lifecycle.operation(kind)
    }

    /// Merge an unfiltered list response.
    pub(crate) fn merge_listing(&mut self, page: ProductPage) {
        self.products = page.products;
        self.apply_page_window(page.total_products, page.total_pages, page.current_page);
        self.active_category = None;
    }

    /// Merge a category-filtered list response.
    pub(crate) fn merge_filtered(&mut self, category: CategoryId, page: ProductPage) {
        self.featured_products = page.products;
        self.apply_page_window(page.total_products, page.total_pages, page.current_page);
        self.active_category = Some(category);
    }

    const fn apply_page_window(&mut self, total_products: u64, total_pages: u32, current_page: u32) {
        self.pagination.total_products = total_products;
        self.pagination.total_pages = total_pages;
        self.pagination.current_page = current_page;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(ids: &[&str], current_page: u32) -> ProductPage {
        ProductPage {
            products: ids.iter().map(|id| Product::new(*id, *id)).collect(),
            total_products: 42,
            total_pages: 5,
            current_page,
        }
    }

    #[test]
    fn initial_state() {
        let state = CatalogState::default();
        assert_eq!(state.pagination, Pagination {
            current_page: 1,
            total_pages: 0,
            total_products: 0,
            page_size: 10,
        });
        assert!(!state.loading());
        assert!(state.error().is_none());
        assert!(state.product.is_none());
    }

    #[test]
    fn filtered_merge_leaves_products_alone() {
        let mut state = CatalogState::default();
        state.merge_listing(page(&["a", "b"], 1));

        state.merge_filtered(CategoryId::new("shoes"), page(&["c"], 3));

        assert_eq!(state.products.len(), 2);
        assert_eq!(state.featured_products.len(), 1);
        assert_eq!(state.pagination.current_page, 3);
        assert_eq!(state.active_category, Some(CategoryId::new("shoes")));
    }

    #[test]
    fn listing_clears_active_category() {
        let mut state = CatalogState::with_page_size(25);
        state.merge_filtered(CategoryId::new("shoes"), page(&["c"], 1));

        state.merge_listing(page(&["a"], 2));

        assert!(state.active_category.is_none());
        assert_eq!(state.pagination.page_size, 25);
        assert_eq!(state.pagination.total_products, 42);
    }
}
