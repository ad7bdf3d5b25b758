//! Request lifecycle tracking.
//!
//! Every dispatched command moves through `pending → fulfilled | rejected`.
//! The tracker keeps two views of that lifecycle:
//!
//! - a single shared `{loading, error}` cell for the whole catalog, where the
//!   last request to settle wins, and
//! - one slot per [`OperationKind`], which only the most recently dispatched
//!   request of that kind may settle.
//!
//! The shared cell is what the catalog snapshot reports as `loading`/`error`.

use crate::error::ErrorPayload;
use crate::types::RequestId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Named asynchronous operation against the catalog service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Unfiltered product list
    ListProducts,
    /// Product list filtered by category
    FilterProducts,
    /// Single product
    FetchProduct,
    /// Product creation
    CreateProduct,
    /// Product update
    UpdateProduct,
    /// Product deletion
    DeleteProduct,
    /// General recommendations
    FetchRecommendations,
    /// Manual score increase
    IncreaseScore,
    /// Score-increase projections
    CalculateScoreIncreases,
}

impl OperationKind {
    /// All operation kinds.
    pub const ALL: [Self; 9] = [
        Self::ListProducts,
        Self::FilterProducts,
        Self::FetchProduct,
        Self::CreateProduct,
        Self::UpdateProduct,
        Self::DeleteProduct,
        Self::FetchRecommendations,
        Self::IncreaseScore,
        Self::CalculateScoreIncreases,
    ];

    /// Stable snake-case name, used in logs and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListProducts => "list_products",
            Self::FilterProducts => "filter_products",
            Self::FetchProduct => "fetch_product",
            Self::CreateProduct => "create_product",
            Self::UpdateProduct => "update_product",
            Self::DeleteProduct => "delete_product",
            Self::FetchRecommendations => "fetch_recommendations",
            Self::IncreaseScore => "increase_score",
            Self::CalculateScoreIncreases => "calculate_score_increases",
        }
    }

    /// Human-readable phrase, e.g. "delete a product".
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::ListProducts => "list products",
            Self::FilterProducts => "filter products",
            Self::FetchProduct => "fetch a product",
            Self::CreateProduct => "create a product",
            Self::UpdateProduct => "update a product",
            Self::DeleteProduct => "delete a product",
            Self::FetchRecommendations => "fetch recommendations",
            Self::IncreaseScore => "increase a product score",
            Self::CalculateScoreIncreases => "calculate score increases",
        }
    }

    /// Whether the endpoint requires a bearer credential.
    #[must_use]
    pub const fn requires_credential(self) -> bool {
        matches!(
            self,
            Self::UpdateProduct | Self::DeleteProduct | Self::IncreaseScore | Self::CalculateScoreIncreases
        )
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{loading, error}` pair observed by the view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestStatus {
    /// A request is in flight
    pub loading: bool,
    /// Error of the last rejected request, until cleared
    pub error: Option<ErrorPayload>,
}

impl RequestStatus {
    const fn pending() -> Self {
        Self {
            loading: true,
            error: None,
        }
    }

    const fn settled(error: Option<ErrorPayload>) -> Self {
        Self { loading: false, error }
    }
}

/// Lifecycle slot of one operation kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationStatus {
    /// Current status of the kind's latest request
    pub status: RequestStatus,
    /// Request allowed to settle this slot
    pub latest: Option<RequestId>,
    /// When the slot last changed
    pub updated_at: Option<DateTime<Utc>>,
}

/// Shared and per-operation lifecycle state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LifecycleTracker {
    shared: RequestStatus,
    operations: HashMap<OperationKind, OperationStatus>,
    in_flight: HashSet<RequestId>,
}

impl LifecycleTracker {
    /// Idle tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared cell.
    #[must_use]
    pub const fn shared(&self) -> &RequestStatus {
        &self.shared
    }

    /// Status of one operation kind (idle if never dispatched).
    #[must_use]
    pub fn operation(&self, kind: OperationKind) -> RequestStatus {
        self.operations
            .get(&kind)
            .map(|slot| slot.status.clone())
            .unwrap_or_default()
    }

    /// Full slot of one operation kind.
    #[must_use]
    pub fn slot(&self, kind: OperationKind) -> Option<&OperationStatus> {
        self.operations.get(&kind)
    }

    /// Whether any operation kind still has its latest request in flight.
    #[must_use]
    pub fn any_pending(&self) -> bool {
        self.operations.values().any(|slot| slot.status.loading)
    }

    /// Whether `request_id` was dispatched and has not settled yet.
    #[must_use]
    pub fn is_in_flight(&self, request_id: RequestId) -> bool {
        self.in_flight.contains(&request_id)
    }

    /// Error `request_id` was rejected with, while it is still the latest
    /// request of its kind.
    #[must_use]
    pub fn rejection(&self, kind: OperationKind, request_id: RequestId) -> Option<&ErrorPayload> {
        self.operations
            .get(&kind)
            .filter(|slot| slot.latest == Some(request_id) && !slot.status.loading)
            .and_then(|slot| slot.status.error.as_ref())
    }

    /// Idle → Pending. Clears the shared error.
    pub fn begin(&mut self, kind: OperationKind, request_id: RequestId, now: DateTime<Utc>) {
        self.shared = RequestStatus::pending();
        self.in_flight.insert(request_id);

        let slot = self.operations.entry(kind).or_default();
        slot.status = RequestStatus::pending();
        slot.latest = Some(request_id);
        slot.updated_at = Some(now);
    }

    /// Pending → Fulfilled.
    pub fn fulfil(&mut self, kind: OperationKind, request_id: RequestId, now: DateTime<Utc>) {
        self.settle(kind, request_id, None, now);
    }

    /// Pending → Rejected.
    pub fn reject(&mut self, kind: OperationKind, request_id: RequestId, error: ErrorPayload, now: DateTime<Utc>) {
        self.settle(kind, request_id, Some(error), now);
    }

    /// Clear the shared error without touching `loading`.
    pub fn dismiss_error(&mut self) {
        self.shared.error = None;
    }

    fn settle(
        &mut self,
        kind: OperationKind,
        request_id: RequestId,
        error: Option<ErrorPayload>,
        now: DateTime<Utc>,
    ) {
        self.shared = RequestStatus::settled(error.clone());
        self.in_flight.remove(&request_id);

        match self.operations.get_mut(&kind) {
            Some(slot) if slot.latest == Some(request_id) => {
                slot.status = RequestStatus::settled(error);
                slot.updated_at = Some(now);
            },
            _ => {
                tracing::debug!(
                    operation = %kind,
                    %request_id,
                    "Superseded request settled; operation slot left unchanged"
                );
            },
        }
    }
}
