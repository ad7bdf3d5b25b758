//! Scripted catalog client for tests and demos.
//!
//! Responses are queued per [`OperationKind`] as JSON and decoded into the
//! call's return type, so scripts look like what the service sends. Gates let
//! a test hold calls of one kind in flight and release them one by one, which
//! is how completion order is controlled in race tests.

use crate::client::{CatalogClient, ClientFuture};
use crate::error::ClientError;
use crate::lifecycle::OperationKind;
use crate::types::{Credential, ListQuery, ProductId, ProductSubmission};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

/// One recorded client call.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    /// Operation invoked
    pub kind: OperationKind,
    /// Product the call targeted
    pub product_id: Option<ProductId>,
    /// Credential passed with the call
    pub credential: Option<Credential>,
    /// List query, for list calls
    pub query: Option<ListQuery>,
    /// Number of images submitted
    pub images: usize,
    /// JSON body, for score calls
    pub body: Option<Value>,
}

impl MockCall {
    fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            product_id: None,
            credential: None,
            query: None,
            images: 0,
            body: None,
        }
    }
}

#[derive(Default)]
struct Script {
    responses: HashMap<OperationKind, VecDeque<Result<Value, ClientError>>>,
    gates: HashMap<OperationKind, Arc<Semaphore>>,
    calls: Vec<MockCall>,
}

/// In-memory [`CatalogClient`] with scripted responses.
///
/// Unscripted calls fail with a transport error naming the operation.
#[derive(Clone, Default)]
pub struct MockCatalogClient {
    script: Arc<Mutex<Script>>,
}

impl MockCatalogClient {
    /// Client with nothing scripted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful JSON response for the next call of `kind`.
    pub fn respond(&self, kind: OperationKind, body: Value) -> &Self {
        self.lock().responses.entry(kind).or_default().push_back(Ok(body));
        self
    }

    /// Queue a failure for the next call of `kind`.
    pub fn fail(&self, kind: OperationKind, error: ClientError) -> &Self {
        self.lock().responses.entry(kind).or_default().push_back(Err(error));
        self
    }

    /// Hold calls of `kind` until [`release`](Self::release) is called.
    pub fn hold(&self, kind: OperationKind) -> &Self {
        self.lock().gates.entry(kind).or_insert_with(|| Arc::new(Semaphore::new(0)));
        self
    }

    /// Let one held call of `kind` proceed.
    pub fn release(&self, kind: OperationKind) {
        if let Some(gate) = self.lock().gates.get(&kind) {
            gate.add_permits(1);
        }
    }

    /// Every call made so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Number of calls of `kind` made so far.
    #[must_use]
    pub fn call_count(&self, kind: OperationKind) -> usize {
        self.lock().calls.iter().filter(|call| call.kind == kind).count()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call, then answer it with the next scripted response.
    fn answer<T>(&self, call: MockCall) -> ClientFuture<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let kind = call.kind;
        let (gate, scripted) = {
            let mut script = self.lock();
            script.calls.push(call);
            let scripted = script.responses.get_mut(&kind).and_then(VecDeque::pop_front);
            (script.gates.get(&kind).cloned(), scripted)
        };

        Box::pin(async move {
            if let Some(gate) = gate {
                if let Ok(permit) = gate.acquire_owned().await {
                    permit.forget();
                }
            }

            let body = scripted.unwrap_or_else(|| {
                Err(ClientError::Transport(format!("no scripted response for {kind}")))
            })?;
            serde_json::from_value(body).map_err(|e| ClientError::Decode(e.to_string()))
        })
    }
}

impl std::fmt::Debug for MockCatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCatalogClient")
            .field("calls", &self.lock().calls.len())
            .finish_non_exhaustive()
    }
}

impl CatalogClient for MockCatalogClient {
    fn list_products(&self, query: ListQuery) -> ClientFuture<crate::types::ProductPage> {
        let kind = if query.category.is_some() {
            OperationKind::FilterProducts
        } else {
            OperationKind::ListProducts
        };
        self.answer(MockCall {
            query: Some(query),
            ..MockCall::new(kind)
        })
    }

    fn get_product(&self, id: ProductId) -> ClientFuture<crate::types::Product> {
        self.answer(MockCall {
            product_id: Some(id),
            ..MockCall::new(OperationKind::FetchProduct)
        })
    }

    fn create_product(&self, submission: ProductSubmission) -> ClientFuture<crate::types::Product> {
        self.answer(MockCall {
            images: submission.images.len(),
            ..MockCall::new(OperationKind::CreateProduct)
        })
    }

    fn update_product(
        &self,
        id: ProductId,
        submission: ProductSubmission,
        credential: Credential,
    ) -> ClientFuture<crate::types::Product> {
        self.answer(MockCall {
            product_id: Some(id),
            credential: Some(credential),
            images: submission.images.len(),
            ..MockCall::new(OperationKind::UpdateProduct)
        })
    }

    fn delete_product(&self, id: ProductId, credential: Credential) -> ClientFuture<()> {
        let ack: ClientFuture<Value> = self.answer(MockCall {
            product_id: Some(id),
            credential: Some(credential),
            ..MockCall::new(OperationKind::DeleteProduct)
        });
        Box::pin(async move { ack.await.map(|_| ()) })
    }

    fn recommendations(&self) -> ClientFuture<Vec<crate::types::RecommendationEntry>> {
        self.answer(MockCall::new(OperationKind::FetchRecommendations))
    }

    fn increase_score(&self, product_id: ProductId, increment: f64, credential: Credential) -> ClientFuture<Value> {
        self.answer(MockCall {
            body: Some(json!({ "productId": product_id, "increment": increment })),
            product_id: Some(product_id),
            credential: Some(credential),
            ..MockCall::new(OperationKind::IncreaseScore)
        })
    }

    fn calculate_score_increases(
        &self,
        credential: Credential,
    ) -> ClientFuture<Vec<crate::types::ScoreIncrease>> {
        self.answer(MockCall {
            credential: Some(credential),
            body: Some(json!({})),
            ..MockCall::new(OperationKind::CalculateScoreIncreases)
        })
    }
}
