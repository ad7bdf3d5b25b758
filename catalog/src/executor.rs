//! Request executor: one command, one outbound call, one normalized outcome.

use crate::action::{Command, Fulfillment};
use crate::client::CatalogClient;
use crate::error::{ClientError, ErrorPayload};
use crate::types::{ImageHandle, ListQuery, ProductSubmission};
use std::time::Instant;

/// `Success(payload)` or `Failure(errorPayload)`
pub type Outcome = Result<Fulfillment, ErrorPayload>;

/// A command plus the draft images captured when it was dispatched.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Command to run
    pub command: Command,
    /// Images sent with create/update, empty otherwise
    pub images: Vec<ImageHandle>,
}

impl Request {
    /// Request without images.
    #[must_use]
    pub const fn new(command: Command) -> Self {
        Self {
            command,
            images: Vec::new(),
        }
    }

    /// Request carrying captured draft images.
    #[must_use]
    pub const fn with_images(command: Command, images: Vec<ImageHandle>) -> Self {
        Self { command, images }
    }
}

/// Run `request` against `client` and normalize the result.
///
/// Authorized commands with an empty credential fail with an authorization
/// error before anything reaches the network. No retries.
pub async fn execute(client: &dyn CatalogClient, request: Request) -> Outcome {
    let kind = request.command.kind();
    metrics::counter!("catalog.requests.total", "operation" => kind.as_str()).increment(1);

    let start = Instant::now();
    let result = call(client, request).await;
    metrics::histogram!("catalog.request.duration_seconds", "operation" => kind.as_str())
        .record(start.elapsed().as_secs_f64());

    match result {
        Ok(fulfillment) => {
            tracing::debug!(operation = %kind, "Request fulfilled");
            Ok(fulfillment)
        },
        Err(error) => {
            metrics::counter!("catalog.requests.failed", "operation" => kind.as_str()).increment(1);
            tracing::warn!(operation = %kind, %error, "Request failed");
            Err(error.into_payload())
        },
    }
}

async fn call(client: &dyn CatalogClient, request: Request) -> Result<Fulfillment, ClientError> {
    let Request { command, images } = request;
    let kind = command.kind();

    if command.credential().is_some_and(crate::types::Credential::is_empty) {
        return Err(ClientError::MissingCredential(kind));
    }

    let fulfillment = match command {
        Command::ListProducts(page) => {
            let page = client.list_products(ListQuery { page, category: None }).await?;
            Fulfillment::ProductsListed(page)
        },
        Command::FilterProducts { category, page } => {
            let query = ListQuery {
                page,
                category: Some(category.clone()),
            };
            let page = client.list_products(query).await?;
            Fulfillment::ProductsFiltered { category, page }
        },
        Command::FetchProduct(id) => Fulfillment::ProductFetched(client.get_product(id).await?),
        Command::CreateProduct(draft) => {
            let created = client.create_product(ProductSubmission { draft, images }).await?;
            Fulfillment::ProductCreated(created)
        },
        Command::UpdateProduct { id, draft, credential } => {
            let updated = client
                .update_product(id, ProductSubmission { draft, images }, credential)
                .await?;
            Fulfillment::ProductUpdated(updated)
        },
        Command::DeleteProduct { id, credential } => {
            client.delete_product(id.clone(), credential).await?;
            Fulfillment::ProductDeleted(id)
        },
        Command::FetchRecommendations => Fulfillment::RecommendationsFetched(client.recommendations().await?),
        Command::IncreaseScore {
            product_id,
            increment,
            credential,
        } => {
            let ack = client.increase_score(product_id, increment, credential).await?;
            Fulfillment::ScoreIncreased(ack)
        },
        Command::CalculateScoreIncreases { credential } => {
            Fulfillment::ScoreIncreasesCalculated(client.calculate_score_increases(credential).await?)
        },
    };

    Ok(fulfillment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::OperationKind;
    use crate::mock::MockCatalogClient;
    use crate::types::{CategoryId, Credential, PageRequest, ProductDraft, ProductId};
    use serde_json::json;

    #[tokio::test]
    async fn empty_credential_never_reaches_client() {
        let client = MockCatalogClient::new();

        let outcome = execute(
            &client,
            Request::new(Command::DeleteProduct {
                id: ProductId::new("p1"),
                credential: Credential::new(""),
            }),
        )
        .await;

        assert_eq!(
            outcome,
            Err(ErrorPayload::Message(
                "Authorization token is required to delete a product".to_string()
            ))
        );
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_requested_identity() {
        let client = MockCatalogClient::new();
        client.respond(OperationKind::DeleteProduct, json!({"message": "deleted"}));

        let outcome = execute(
            &client,
            Request::new(Command::DeleteProduct {
                id: ProductId::new("p7"),
                credential: Credential::new("token"),
            }),
        )
        .await;

        assert_eq!(outcome, Ok(Fulfillment::ProductDeleted(ProductId::new("p7"))));
    }

    #[tokio::test]
    async fn filter_carries_category_into_outcome() {
        let client = MockCatalogClient::new();
        client.respond(
            OperationKind::FilterProducts,
            json!({"products": [], "totalProducts": 0, "totalPages": 0, "currentPage": 1}),
        );

        let outcome = execute(
            &client,
            Request::new(Command::FilterProducts {
                category: CategoryId::new("garden"),
                page: PageRequest::new(1, 10),
            }),
        )
        .await;

        assert!(matches!(
            outcome,
            Ok(Fulfillment::ProductsFiltered { ref category, .. }) if category.as_str() == "garden"
        ));
        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].query.as_ref().and_then(|q| q.category.clone()), Some(CategoryId::new("garden")));
    }

    #[tokio::test]
    async fn create_sends_captured_images() {
        let client = MockCatalogClient::new();
        client.respond(OperationKind::CreateProduct, json!({"_id": "new", "name": "Desk", "price": 120}));

        let outcome = execute(
            &client,
            Request::with_images(
                Command::CreateProduct(ProductDraft::new("Desk", 120.0)),
                vec![ImageHandle::new("a.png", vec![0]), ImageHandle::new("b.png", vec![1])],
            ),
        )
        .await;

        assert!(matches!(outcome, Ok(Fulfillment::ProductCreated(ref p)) if p.id.as_str() == "new"));
        assert_eq!(client.calls()[0].images, 2);
    }

    #[tokio::test]
    async fn service_error_body_is_propagated() {
        let client = MockCatalogClient::new();
        client.fail(
            OperationKind::FetchRecommendations,
            ClientError::Service {
                status: 500,
                payload: ErrorPayload::from_body(500, r#"{"message":"db down"}"#),
            },
        );

        let outcome = execute(&client, Request::new(Command::FetchRecommendations)).await;

        assert_eq!(outcome.map_err(|e| e.message()), Err("db down".to_string()));
    }
}
