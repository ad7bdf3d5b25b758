//! The catalog engine: the surface the view layer talks to.
//!
//! The view dispatches commands and reads snapshots. It never mutates state
//! directly; every change goes through the store's single writer.

use crate::action::{CatalogAction, Command, Fulfillment};
use crate::client::CatalogClient;
use crate::config::EngineConfig;
use crate::error::DispatchError;
use crate::lifecycle::OperationKind;
use crate::reducer::{CatalogEnvironment, CatalogReducer};
use crate::state::CatalogState;
use crate::types::{CategoryFilter, ImageHandle, PageRequest, RequestId};
use catalog_sync_runtime::{Store, StoreConfig, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Store specialised to the catalog
pub type CatalogStore = Store<CatalogState, CatalogAction, CatalogEnvironment, CatalogReducer>;

/// Async state synchronization engine for the product catalog.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct CatalogEngine {
    store: CatalogStore,
    config: EngineConfig,
}

impl CatalogEngine {
    /// Create an engine with an empty catalog.
    #[must_use]
    pub fn new(environment: CatalogEnvironment, config: EngineConfig) -> Self {
        let store = Store::with_config(
            CatalogState::with_page_size(config.page_size),
            CatalogReducer::new(),
            environment,
            StoreConfig::default().with_broadcast_capacity(config.broadcast_capacity),
        );
        Self { store, config }
    }

    /// Create an engine over `client` using wall-clock time.
    #[must_use]
    pub fn with_client(client: Arc<dyn CatalogClient>, config: EngineConfig) -> Self {
        Self::new(CatalogEnvironment::live(client), config)
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a command to completion.
    ///
    /// Resolves once the command's terminal action has been reduced, so the
    /// state read right after this returns already reflects the outcome.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Rejected`] if the command failed; the same error is
    ///   in the shared `error`
    /// - [`DispatchError::Store`] if the store is shutting down, the
    ///   outcome was not observed within the dispatch timeout, or the
    ///   outcome was applied but skipped by a lagging observer
    ///   ([`StoreError::Lagged`]; read the snapshot instead)
    #[tracing::instrument(skip_all, fields(operation = %command.kind()))]
    pub async fn dispatch(&self, command: Command) -> Result<Fulfillment, DispatchError> {
        let request_id = RequestId::new();
        let kind = command.kind();

        let terminal = self
            .store
            .send_and_wait_until(
                CatalogAction::Dispatch { request_id, command },
                move |action| action.settles(request_id),
                move |state: &CatalogState| !state.lifecycle.is_in_flight(request_id),
                self.config.dispatch_timeout(),
            )
            .await;

        match terminal {
            Ok(CatalogAction::Fulfilled { payload, .. }) => Ok(payload),
            Ok(CatalogAction::Rejected { kind, error, .. }) => Err(DispatchError::Rejected { kind, error }),
            // The predicate only admits terminal actions
            Ok(_) => Err(DispatchError::Store(StoreError::ChannelClosed)),
            Err(StoreError::Lagged(skipped)) => Err(self.missed_outcome(kind, request_id, skipped).await),
            Err(error) => Err(error.into()),
        }
    }

    /// Recover what state still knows about a settled request whose terminal
    /// action was skipped.
    async fn missed_outcome(&self, kind: OperationKind, request_id: RequestId, skipped: u64) -> DispatchError {
        let rejection = self
            .state(|s| s.lifecycle.rejection(kind, request_id).cloned())
            .await;
        tracing::warn!(operation = %kind, %request_id, skipped, "Dispatch outcome skipped by lagging observer");

        match rejection {
            Some(error) => DispatchError::Rejected { kind, error },
            None => DispatchError::Store(StoreError::Lagged(skipped)),
        }
    }

    /// Copy of the whole catalog state.
    pub async fn snapshot(&self) -> CatalogState {
        self.store.state(CatalogState::clone).await
    }

    /// Read part of the catalog state.
    ///
    /// ```ignore
    /// let loading = engine.state(|s| s.loading()).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&CatalogState) -> T,
    {
        self.store.state(f).await
    }

    /// Observe every outcome action after it has been applied.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogAction> {
        self.store.subscribe_actions()
    }

    /// Change the current page locally. Out-of-range pages are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the engine is shutting down.
    pub async fn set_page(&self, page: u32) -> Result<(), StoreError> {
        self.send_local(CatalogAction::SetPage(page)).await
    }

    /// Change page, then re-list the active category (unfiltered when none).
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn go_to_page(&self, page: u32) -> Result<Fulfillment, DispatchError> {
        self.set_page(page).await?;
        let filter = self
            .state(|s| {
                s.active_category
                    .clone()
                    .map_or(CategoryFilter::All, CategoryFilter::Category)
            })
            .await;
        self.select_category(filter).await
    }

    /// List the current page of a category, or of every product for
    /// [`CategoryFilter::All`].
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn select_category(&self, filter: CategoryFilter) -> Result<Fulfillment, DispatchError> {
        let current_page = self.state(|s| s.pagination.current_page).await;
        let page = PageRequest::new(current_page, self.config.page_size);

        let command = match filter {
            CategoryFilter::All => Command::ListProducts(page),
            CategoryFilter::Category(category) => Command::FilterProducts { category, page },
        };
        self.dispatch(command).await
    }

    /// Stage an image for the next create/update.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the engine is shutting down.
    pub async fn attach_image(&self, image: ImageHandle) -> Result<(), StoreError> {
        self.send_local(CatalogAction::AttachImage(image)).await
    }

    /// Remove a staged image by position; out-of-range indexes are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the engine is shutting down.
    pub async fn detach_image(&self, index: usize) -> Result<(), StoreError> {
        self.send_local(CatalogAction::DetachImage(index)).await
    }

    /// Remove every staged image.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the engine is shutting down.
    pub async fn clear_images(&self) -> Result<(), StoreError> {
        self.send_local(CatalogAction::ClearImages).await
    }

    /// Clear the shared error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the engine is shutting down.
    pub async fn dismiss_error(&self) -> Result<(), StoreError> {
        self.send_local(CatalogAction::DismissError).await
    }

    /// Stop accepting commands and wait for in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if requests are still running
    /// after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }

    async fn send_local(&self, action: CatalogAction) -> Result<(), StoreError> {
        self.store.send(action).await.map(|_| ())
    }
}

impl std::fmt::Debug for CatalogEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEngine")
            .field("config", &self.config)
            .field("pending_effects", &self.store.pending_effects())
            .finish_non_exhaustive()
    }
}
