//! Actions processed by the catalog reducer.
//!
//! The view only ever sends [`CatalogAction::Dispatch`] (wrapping a
//! [`Command`]) or one of the local draft/page actions. `Fulfilled` and
//! `Rejected` are produced by the request effect and fed back by the store.

use crate::error::ErrorPayload;
use crate::lifecycle::OperationKind;
use crate::types::{
    CategoryId, Credential, ImageHandle, PageRequest, Product, ProductDraft, ProductId, ProductPage,
    RecommendationEntry, RequestId, ScoreIncrease,
};
use serde_json::Value;

/// Remote operation requested by the view.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `GET /products?page&limit`
    ListProducts(PageRequest),
    /// `GET /products?page&limit&category`
    FilterProducts {
        /// Category to filter by
        category: CategoryId,
        /// Page window
        page: PageRequest,
    },
    /// `GET /products/{id}?increaseViews=false`
    FetchProduct(ProductId),
    /// `POST /products` with the draft images captured at dispatch
    CreateProduct(ProductDraft),
    /// `PUT /products/{id}` with the draft images captured at dispatch
    UpdateProduct {
        /// Product to update
        id: ProductId,
        /// New scalar fields
        draft: ProductDraft,
        /// Bearer credential
        credential: Credential,
    },
    /// `DELETE /products/{id}`
    DeleteProduct {
        /// Product to delete
        id: ProductId,
        /// Bearer credential
        credential: Credential,
    },
    /// `GET /recommendations`
    FetchRecommendations,
    /// `POST /products/increase-score`
    IncreaseScore {
        /// Product whose score changes
        product_id: ProductId,
        /// Amount added to the score
        increment: f64,
        /// Bearer credential
        credential: Credential,
    },
    /// `POST /products/calculate-score-increase`
    CalculateScoreIncreases {
        /// Bearer credential
        credential: Credential,
    },
}

impl Command {
    /// Operation this command runs.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::ListProducts(_) => OperationKind::ListProducts,
            Self::FilterProducts { .. } => OperationKind::FilterProducts,
            Self::FetchProduct(_) => OperationKind::FetchProduct,
            Self::CreateProduct(_) => OperationKind::CreateProduct,
            Self::UpdateProduct { .. } => OperationKind::UpdateProduct,
            Self::DeleteProduct { .. } => OperationKind::DeleteProduct,
            Self::FetchRecommendations => OperationKind::FetchRecommendations,
            Self::IncreaseScore { .. } => OperationKind::IncreaseScore,
            Self::CalculateScoreIncreases { .. } => OperationKind::CalculateScoreIncreases,
        }
    }

    /// Whether the command submits the draft image buffer.
    #[must_use]
    pub const fn submits_drafts(&self) -> bool {
        matches!(self, Self::CreateProduct(_) | Self::UpdateProduct { .. })
    }

    /// Credential carried by the command, if any.
    #[must_use]
    pub const fn credential(&self) -> Option<&Credential> {
        match self {
            Self::UpdateProduct { credential, .. }
            | Self::DeleteProduct { credential, .. }
            | Self::IncreaseScore { credential, .. }
            | Self::CalculateScoreIncreases { credential } => Some(credential),
            _ => None,
        }
    }
}

/// Successful outcome of a command, merged into state on fulfilment.
#[derive(Debug, Clone, PartialEq)]
pub enum Fulfillment {
    /// Unfiltered page
    ProductsListed(ProductPage),
    /// Category-filtered page
    ProductsFiltered {
        /// Category that was requested
        category: CategoryId,
        /// Returned page
        page: ProductPage,
    },
    /// Single product
    ProductFetched(Product),
    /// Product returned by create
    ProductCreated(Product),
    /// Product returned by update
    ProductUpdated(Product),
    /// Identity the client asked to delete
    ProductDeleted(ProductId),
    /// General recommendations
    RecommendationsFetched(Vec<RecommendationEntry>),
    /// Acknowledgement of a score increase
    ScoreIncreased(Value),
    /// Score-increase projections
    ScoreIncreasesCalculated(Vec<ScoreIncrease>),
}

impl Fulfillment {
    /// Operation this outcome belongs to.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::ProductsListed(_) => OperationKind::ListProducts,
            Self::ProductsFiltered { .. } => OperationKind::FilterProducts,
            Self::ProductFetched(_) => OperationKind::FetchProduct,
            Self::ProductCreated(_) => OperationKind::CreateProduct,
            Self::ProductUpdated(_) => OperationKind::UpdateProduct,
            Self::ProductDeleted(_) => OperationKind::DeleteProduct,
            Self::RecommendationsFetched(_) => OperationKind::FetchRecommendations,
            Self::ScoreIncreased(_) => OperationKind::IncreaseScore,
            Self::ScoreIncreasesCalculated(_) => OperationKind::CalculateScoreIncreases,
        }
    }
}

/// Catalog reducer input.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogAction {
    /// Start a remote command (Idle → Pending)
    Dispatch {
        /// Correlates the command with its terminal action
        request_id: RequestId,
        /// The command
        command: Command,
    },
    /// Terminal action: the command succeeded
    Fulfilled {
        /// Request being settled
        request_id: RequestId,
        /// Result to merge
        payload: Fulfillment,
    },
    /// Terminal action: the command failed
    Rejected {
        /// Request being settled
        request_id: RequestId,
        /// Operation that failed
        kind: OperationKind,
        /// Normalized error
        error: ErrorPayload,
    },
    /// Local page change
    SetPage(u32),
    /// Append an image to the draft buffer
    AttachImage(ImageHandle),
    /// Remove a draft image by position
    DetachImage(usize),
    /// Empty the draft buffer
    ClearImages,
    /// Clear the shared error
    DismissError,
}

impl CatalogAction {
    /// Request settled by this action, if it is terminal.
    #[must_use]
    pub const fn settled_request(&self) -> Option<RequestId> {
        match self {
            Self::Fulfilled { request_id, .. } | Self::Rejected { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }

    /// Whether this is the terminal action of `request_id`.
    #[must_use]
    pub fn settles(&self, request_id: RequestId) -> bool {
        self.settled_request() == Some(request_id)
    }
}
