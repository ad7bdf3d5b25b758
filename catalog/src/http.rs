//! reqwest-backed [`CatalogClient`].

use crate::client::{CatalogClient, ClientFuture, ClientResult};
use crate::config::ServiceConfig;
use crate::error::{ClientError, ErrorPayload};
use crate::types::{
    Credential, ListQuery, Product, ProductId, ProductPage, ProductSubmission, RecommendationEntry,
    ScoreIncrease,
};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

/// Catalog client speaking JSON and multipart over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCatalogClient {
    /// Build a client from service configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &ServiceConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self::with_client(http, &config.base_url))
    }

    /// Wrap an existing reqwest client.
    #[must_use]
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `{base}/products/{id}` with the id percent-encoded as one path segment.
    fn product_url(&self, id: &ProductId) -> ClientResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ClientError::Transport(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::Transport(format!("base URL cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .push("products")
            .push(id.as_str());
        Ok(url)
    }
}

/// Send a request and decode a JSON success body.
async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<T> {
    let body = send(request).await?;
    serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Send a request and return the success body as text.
async fn send(request: RequestBuilder) -> ClientResult<String> {
    let response = request
        .send()
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;

    if status.is_success() {
        return Ok(body);
    }

    let payload = ErrorPayload::from_body(status.as_u16(), &body);
    tracing::debug!(status = status.as_u16(), error = %payload, "Catalog service returned an error");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthorized {
            status: status.as_u16(),
            payload,
        }),
        _ => Err(ClientError::Service {
            status: status.as_u16(),
            payload,
        }),
    }
}

/// Any 2xx acknowledgement: JSON when it parses, the raw text otherwise.
fn ack_body(body: String) -> Value {
    serde_json::from_str(&body).unwrap_or_else(|_| {
        if body.trim().is_empty() {
            Value::Null
        } else {
            Value::String(body)
        }
    })
}

/// Scalar draft fields plus one `images` part per captured image.
fn multipart_form(submission: ProductSubmission) -> ClientResult<Form> {
    let mut form = Form::new();
    for (name, value) in submission.draft.form_fields() {
        form = form.text(name, value);
    }
    for image in submission.images {
        let mut part = Part::bytes(image.data).file_name(image.file_name);
        if let Some(content_type) = image.content_type {
            part = part
                .mime_str(&content_type)
                .map_err(|e| ClientError::Transport(e.to_string()))?;
        }
        form = form.part("images", part);
    }
    Ok(form)
}

impl CatalogClient for HttpCatalogClient {
    fn list_products(&self, query: ListQuery) -> ClientFuture<ProductPage> {
        let request = self.http.get(self.url("/products")).query(&query.to_pairs());
        Box::pin(send_json(request))
    }

    fn get_product(&self, id: ProductId) -> ClientFuture<Product> {
        let request = self
            .product_url(&id)
            .map(|url| self.http.get(url).query(&[("increaseViews", "false")]));
        Box::pin(async move { send_json(request?).await })
    }

    fn create_product(&self, submission: ProductSubmission) -> ClientFuture<Product> {
        let http = self.http.clone();
        let url = self.url("/products");
        Box::pin(async move {
            let form = multipart_form(submission)?;
            send_json(http.post(url).multipart(form)).await
        })
    }

    fn update_product(
        &self,
        id: ProductId,
        submission: ProductSubmission,
        credential: Credential,
    ) -> ClientFuture<Product> {
        let http = self.http.clone();
        let url = self.product_url(&id);
        Box::pin(async move {
            let form = multipart_form(submission)?;
            send_json(http.put(url?).bearer_auth(credential.token()).multipart(form)).await
        })
    }

    fn delete_product(&self, id: ProductId, credential: Credential) -> ClientFuture<()> {
        let request = self
            .product_url(&id)
            .map(|url| self.http.delete(url).bearer_auth(credential.token()));
        Box::pin(async move { send(request?).await.map(|_| ()) })
    }

    fn recommendations(&self) -> ClientFuture<Vec<RecommendationEntry>> {
        Box::pin(send_json(self.http.get(self.url("/recommendations"))))
    }

    fn increase_score(&self, product_id: ProductId, increment: f64, credential: Credential) -> ClientFuture<Value> {
        let request = self
            .http
            .post(self.url("/products/increase-score"))
            .bearer_auth(credential.token())
            .json(&json!({ "productId": product_id, "increment": increment }));
        Box::pin(async move { send(request).await.map(ack_body) })
    }

    fn calculate_score_increases(&self, credential: Credential) -> ClientFuture<Vec<ScoreIncrease>> {
        let request = self
            .http
            .post(self.url("/products/calculate-score-increase"))
            .bearer_auth(credential.token())
            .json(&json!({}));
        Box::pin(send_json(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = HttpCatalogClient::with_client(reqwest::Client::new(), "http://localhost:5000/api/");
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(
            client.product_url(&ProductId::new("abc")).map(String::from),
            Ok("http://localhost:5000/api/products/abc".to_string())
        );
    }

    #[test]
    fn product_id_is_encoded_as_one_path_segment() {
        let client = HttpCatalogClient::with_client(reqwest::Client::new(), "http://localhost:5000/api");
        assert_eq!(
            client.product_url(&ProductId::new("a/b?c#d")).map(String::from),
            Ok("http://localhost:5000/api/products/a%2Fb%3Fc%23d".to_string())
        );
    }

    #[test]
    fn non_json_acknowledgement_is_kept_as_text() {
        assert_eq!(ack_body("Score updated".to_string()), Value::String("Score updated".to_string()));
        assert_eq!(ack_body(String::new()), Value::Null);
        assert_eq!(ack_body(r#"{"ok":true}"#.to_string()), json!({ "ok": true }));
    }
}
