//! Catalog reducer: lifecycle transitions and per-operation merge rules.

use crate::action::{CatalogAction, Command, Fulfillment};
use crate::client::CatalogClient;
use crate::executor::{self, Request};
use crate::reconcile;
use crate::state::CatalogState;
use catalog_sync_core::environment::{Clock, SystemClock};
use catalog_sync_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use std::sync::Arc;

/// Dependencies injected into the catalog reducer.
#[derive(Clone)]
pub struct CatalogEnvironment {
    /// Catalog service client
    pub client: Arc<dyn CatalogClient>,
    /// Timestamps for lifecycle slots
    pub clock: Arc<dyn Clock>,
}

impl CatalogEnvironment {
    /// Environment with an explicit clock.
    #[must_use]
    pub fn new(client: Arc<dyn CatalogClient>, clock: Arc<dyn Clock>) -> Self {
        Self { client, clock }
    }

    /// Environment using wall-clock time.
    #[must_use]
    pub fn live(client: Arc<dyn CatalogClient>) -> Self {
        Self::new(client, Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for CatalogEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEnvironment").finish_non_exhaustive()
    }
}

/// Reducer for [`CatalogState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogReducer;

impl CatalogReducer {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Merge a fulfilled payload according to its operation's rule.
    fn merge(state: &mut CatalogState, payload: Fulfillment) {
        match payload {
            Fulfillment::ProductsListed(page) => state.merge_listing(page),
            Fulfillment::ProductsFiltered { category, page } => state.merge_filtered(category, page),
            Fulfillment::ProductFetched(product) => state.product = Some(product),
            Fulfillment::ProductCreated(product) => {
                reconcile::apply_created(&mut state.products, &mut state.drafts, product);
            },
            Fulfillment::ProductUpdated(product) => {
                let id = product.id.clone();
                if !reconcile::apply_updated(&mut state.products, product) {
                    tracing::warn!(product_id = %id, "Updated product not in list; left unchanged");
                }
            },
            Fulfillment::ProductDeleted(id) => {
                if !reconcile::apply_deleted(&mut state.products, &id) {
                    tracing::warn!(product_id = %id, "Deleted product not in list; left unchanged");
                }
            },
            Fulfillment::RecommendationsFetched(entries) => state.general_recommendations = entries,
            Fulfillment::ScoreIncreased(_) => {},
            Fulfillment::ScoreIncreasesCalculated(increases) => state.score_increases = increases,
        }
    }
}

impl Reducer for CatalogReducer {
    type State = CatalogState;
    type Action = CatalogAction;
    type Environment = CatalogEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CatalogAction::Dispatch { request_id, command } => {
                let kind = command.kind();
                tracing::debug!(operation = %kind, %request_id, "Dispatching command");

                state.lifecycle.begin(kind, request_id, env.clock.now());
                if let Command::ListProducts(page) | Command::FilterProducts { page, .. } = &command {
                    state.pagination.page_size = page.limit();
                }

                let request = if command.submits_drafts() {
                    Request::with_images(command, state.drafts.images().to_vec())
                } else {
                    Request::new(command)
                };

                let client = Arc::clone(&env.client);
                smallvec![Effect::future(async move {
                    let action = match executor::execute(client.as_ref(), request).await {
                        Ok(payload) => CatalogAction::Fulfilled { request_id, payload },
                        Err(error) => CatalogAction::Rejected {
                            request_id,
                            kind,
                            error,
                        },
                    };
                    Some(action)
                })]
            },

            CatalogAction::Fulfilled { request_id, payload } => {
                let kind = payload.kind();
                tracing::debug!(operation = %kind, %request_id, "Merging fulfilled payload");

                Self::merge(state, payload);
                state.lifecycle.fulfil(kind, request_id, env.clock.now());
                smallvec![Effect::None]
            },

            CatalogAction::Rejected {
                request_id,
                kind,
                error,
            } => {
                tracing::warn!(operation = %kind, %request_id, %error, "Command rejected");
                state.lifecycle.reject(kind, request_id, error, env.clock.now());
                smallvec![Effect::None]
            },

            CatalogAction::SetPage(page) => {
                if state.pagination.contains(page) {
                    state.pagination.current_page = page;
                } else {
                    tracing::warn!(
                        page,
                        last_page = state.pagination.last_page(),
                        "Ignoring page change outside the known page range"
                    );
                }
                smallvec![Effect::None]
            },

            CatalogAction::AttachImage(image) => {
                state.drafts.attach(image);
                smallvec![Effect::None]
            },

            CatalogAction::DetachImage(index) => {
                if state.drafts.detach(index).is_none() {
                    tracing::debug!(index, "Draft image index out of range");
                }
                smallvec![Effect::None]
            },

            CatalogAction::ClearImages => {
                state.drafts.reset();
                smallvec![Effect::None]
            },

            CatalogAction::DismissError => {
                state.lifecycle.dismiss_error();
                smallvec![Effect::None]
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorPayload;
    use crate::lifecycle::OperationKind;
    use crate::mock::MockCatalogClient;
    use crate::types::{
        CategoryId, Credential, ImageHandle, PageRequest, Product, ProductDraft, ProductId, ProductPage,
        RequestId,
    };
    use catalog_sync_testing::{ReducerTest, assertions, test_clock};

    fn test_env() -> CatalogEnvironment {
        CatalogEnvironment::new(Arc::new(MockCatalogClient::new()), Arc::new(test_clock()))
    }

    fn product(id: &str, score: f64) -> Product {
        Product::new(id, format!("product {id}")).with_score(score)
    }

    fn state_with(products: Vec<Product>) -> CatalogState {
        let mut state = CatalogState::default();
        state.products = products;
        state.pagination.total_products = 2;
        state.pagination.total_pages = 1;
        state
    }

    fn page(ids: &[&str], current_page: u32, total_pages: u32) -> ProductPage {
        ProductPage {
            products: ids.iter().map(|id| product(id, 0.0)).collect(),
            total_products: u64::from(total_pages) * 10,
            total_pages,
            current_page,
        }
    }

    #[test]
    fn dispatch_marks_pending_and_returns_request_effect() {
        let request_id = RequestId::new();
        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(CatalogState::default())
            .when_action(CatalogAction::Dispatch {
                request_id,
                command: Command::ListProducts(PageRequest::new(2, 25)),
            })
            .then_state(move |state| {
                assert!(state.loading());
                assert!(state.error().is_none());
                assert!(state.operation(OperationKind::ListProducts).loading);
                assert_eq!(state.pagination.page_size, 25);
                assert_eq!(
                    state.lifecycle.slot(OperationKind::ListProducts).and_then(|s| s.latest),
                    Some(request_id)
                );
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn zero_page_size_request_keeps_page_size_positive() {
        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(CatalogState::default())
            .when_action(CatalogAction::Dispatch {
                request_id: RequestId::new(),
                command: Command::FilterProducts {
                    category: CategoryId::new("garden"),
                    page: PageRequest::new(0, 0),
                },
            })
            .then_state(|state| {
                assert_eq!(state.pagination.page_size, 1);
                assert_eq!(state.pagination.current_page, 1);
            })
            .run();
    }

    #[test]
    fn delete_fulfilment_keeps_totals() {
        let request_id = RequestId::new();
        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(state_with(vec![product("1", 5.0), product("2", 3.0)]))
            .when_actions([
                CatalogAction::Dispatch {
                    request_id,
                    command: Command::DeleteProduct {
                        id: ProductId::new("2"),
                        credential: Credential::new("token"),
                    },
                },
                CatalogAction::Fulfilled {
                    request_id,
                    payload: Fulfillment::ProductDeleted(ProductId::new("2")),
                },
            ])
            .then_state(|state| {
                assert_eq!(state.products, vec![product("1", 5.0)]);
                assert_eq!(state.pagination.total_products, 2);
                assert!(!state.loading());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn delete_of_absent_product_is_not_an_error() {
        let request_id = RequestId::new();
        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(state_with(vec![product("1", 5.0)]))
            .when_action(CatalogAction::Fulfilled {
                request_id,
                payload: Fulfillment::ProductDeleted(ProductId::new("404")),
            })
            .then_state(|state| {
                assert_eq!(state.products, vec![product("1", 5.0)]);
                assert!(state.error().is_none());
            })
            .run();
    }

    #[test]
    fn create_appends_and_clears_drafts() {
        let request_id = RequestId::new();
        let mut given = state_with(vec![product("1", 5.0)]);
        given.drafts.attach(ImageHandle::new("a.png", vec![1]));

        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(given)
            .when_action(CatalogAction::Fulfilled {
                request_id,
                payload: Fulfillment::ProductCreated(product("3", 0.0)),
            })
            .then_state(|state| {
                assert_eq!(state.products.len(), 2);
                assert!(state.drafts.is_empty());
                // Totals are not recomputed locally
                assert_eq!(state.pagination.total_products, 2);
            })
            .run();
    }

    #[test]
    fn update_failure_keeps_drafts() {
        let request_id = RequestId::new();
        let mut given = state_with(vec![product("1", 5.0)]);
        given.drafts.attach(ImageHandle::new("a.png", vec![1]));

        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(given)
            .when_actions([
                CatalogAction::Dispatch {
                    request_id,
                    command: Command::UpdateProduct {
                        id: ProductId::new("1"),
                        draft: ProductDraft::new("Renamed", 1.0),
                        credential: Credential::new("token"),
                    },
                },
                CatalogAction::Rejected {
                    request_id,
                    kind: OperationKind::UpdateProduct,
                    error: ErrorPayload::Message("Forbidden".to_string()),
                },
            ])
            .then_state(|state| {
                assert_eq!(state.drafts.len(), 1);
                assert_eq!(state.error().map(ErrorPayload::message), Some("Forbidden".to_string()));
                assert_eq!(state.products, vec![product("1", 5.0)]);
            })
            .run();
    }

    #[test]
    fn filtered_list_only_touches_featured_products() {
        let request_id = RequestId::new();
        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(state_with(vec![product("1", 5.0), product("2", 3.0)]))
            .when_action(CatalogAction::Fulfilled {
                request_id,
                payload: Fulfillment::ProductsFiltered {
                    category: CategoryId::new("lamps"),
                    page: page(&["9"], 3, 4),
                },
            })
            .then_state(|state| {
                assert_eq!(state.products.len(), 2);
                assert_eq!(state.featured_products, vec![product("9", 0.0)]);
                assert_eq!(state.pagination.current_page, 3);
                assert_eq!(state.pagination.total_pages, 4);
                assert_eq!(state.active_category, Some(CategoryId::new("lamps")));
            })
            .run();
    }

    #[test]
    fn set_page_respects_known_range() {
        let mut given = CatalogState::default();
        given.pagination.total_pages = 3;

        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(given)
            .when_actions([CatalogAction::SetPage(3), CatalogAction::SetPage(4), CatalogAction::SetPage(0)])
            .then_state(|state| assert_eq!(state.pagination.current_page, 3))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn set_page_one_allowed_before_first_list() {
        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(CatalogState::default())
            .when_actions([CatalogAction::SetPage(2), CatalogAction::SetPage(1)])
            .then_state(|state| assert_eq!(state.pagination.current_page, 1))
            .run();
    }

    #[test]
    fn draft_attach_detach_reset() {
        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(CatalogState::default())
            .when_actions([
                CatalogAction::AttachImage(ImageHandle::new("first.png", vec![1])),
                CatalogAction::AttachImage(ImageHandle::new("second.png", vec![2])),
                CatalogAction::DetachImage(0),
                CatalogAction::DetachImage(5),
            ])
            .then_state(|state| {
                assert_eq!(state.drafts.images(), &[ImageHandle::new("second.png", vec![2])]);
            })
            .run();

        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(CatalogState::default())
            .when_actions([
                CatalogAction::AttachImage(ImageHandle::new("a.png", vec![1])),
                CatalogAction::ClearImages,
            ])
            .then_state(|state| assert!(state.drafts.is_empty()))
            .run();
    }

    #[test]
    fn dismiss_error_clears_shared_error() {
        let request_id = RequestId::new();
        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(CatalogState::default())
            .when_actions([
                CatalogAction::Rejected {
                    request_id,
                    kind: OperationKind::FetchRecommendations,
                    error: ErrorPayload::Message("offline".to_string()),
                },
                CatalogAction::DismissError,
            ])
            .then_state(|state| assert!(state.error().is_none()))
            .run();
    }

    #[test]
    fn lifecycle_slots_are_stamped_with_clock() {
        let request_id = RequestId::new();
        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(CatalogState::default())
            .when_action(CatalogAction::Dispatch {
                request_id,
                command: Command::FetchRecommendations,
            })
            .then_state(|state| {
                let slot = state.lifecycle.slot(OperationKind::FetchRecommendations);
                assert_eq!(slot.and_then(|s| s.updated_at), Some(test_clock().now()));
            })
            .run();
    }
}
