//! Catalog sync demo: loads the first catalog page and the general
//! recommendations from a running catalog service and prints a summary.
//!
//! Configure with `CATALOG_*` environment variables (a `.env` file is read if
//! present). Set `CATALOG_TOKEN` to also compute score-increase projections,
//! and `CATALOG_METRICS_ADDR` (e.g. `0.0.0.0:9000`) to serve Prometheus metrics.

use anyhow::Context;
use catalog_sync::config::CatalogConfig;
use catalog_sync::{CatalogEngine, CategoryFilter, Command, Credential, HttpCatalogClient};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // 1. Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,catalog_sync=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Load configuration
    let config = CatalogConfig::from_env();
    config.validate().context("invalid catalog configuration")?;

    // 3. Prometheus exporter, when requested
    if let Ok(addr) = std::env::var("CATALOG_METRICS_ADDR") {
        let addr: SocketAddr = addr.parse().context("invalid CATALOG_METRICS_ADDR")?;
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("failed to install Prometheus exporter")?;
        catalog_sync::metrics::register_metrics();
        tracing::info!("Prometheus metrics available at http://{addr}/metrics");
    }

    tracing::info!(base_url = %config.service.base_url, "Starting catalog sync");

    // 4. Build the engine
    let client = HttpCatalogClient::new(&config.service).context("failed to build HTTP client")?;
    let engine = CatalogEngine::with_client(Arc::new(client), config.engine.clone());

    // 5. First page and recommendations, concurrently
    let (listing, recommendations) = tokio::join!(
        engine.select_category(CategoryFilter::All),
        engine.dispatch(Command::FetchRecommendations),
    );
    if let Err(error) = &listing {
        tracing::warn!(%error, "Listing failed");
    }
    if let Err(error) = &recommendations {
        tracing::warn!(%error, "Recommendations failed");
    }

    // 6. Score projections when a credential is available
    if let Ok(token) = std::env::var("CATALOG_TOKEN") {
        let command = Command::CalculateScoreIncreases {
            credential: Credential::new(token),
        };
        if let Err(error) = engine.dispatch(command).await {
            tracing::warn!(%error, "Score increase calculation failed");
        }
    }

    // 7. Summary
    let snapshot = engine.snapshot().await;
    println!("=== Catalog ===");
    println!(
        "Page {}/{} ({} products total, {} per page)",
        snapshot.pagination.current_page,
        snapshot.pagination.total_pages,
        snapshot.pagination.total_products,
        snapshot.pagination.page_size,
    );
    for product in &snapshot.products {
        println!("  {:<24} {:>10.2}  score {:.2}", product.name, product.price, product.score);
    }

    println!("\n=== Recommendations ===");
    for entry in &snapshot.general_recommendations {
        println!("  {:<24} {:.2}", entry.product.name, entry.score);
    }

    if !snapshot.score_increases.is_empty() {
        println!("\n{} score increase projections", snapshot.score_increases.len());
    }

    if let Some(error) = snapshot.error() {
        println!("\nLast error: {}", error.message());
    }

    engine
        .shutdown(Duration::from_secs(5))
        .await
        .context("engine did not shut down cleanly")?;
    Ok(())
}
