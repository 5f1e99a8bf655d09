mod cache_integrity;
mod circuit_breaker;
mod config;
mod enrichment;
mod errors;
mod fixtures;
mod handlers;
mod models;
mod services;
mod talent_client;

use axum::{routing::get, Router};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::talent_client::TalentClient;

/// Main entry point for the application.
///
/// Initializes logging, configuration, caches, the upstream client and the
/// HTTP routes with their middleware (CORS, rate limiting, body limits),
/// then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "talent_hub_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Credential catalog cache (1 hour TTL)
    let catalog_cache = Cache::builder()
        .time_to_live(Duration::from_secs(3600))
        .max_capacity(100)
        .build();
    tracing::info!("Credential catalog cache initialized (1h TTL)");

    // Per-profile credential value cache (5 minute TTL)
    let profile_credentials_cache = Cache::builder()
        .time_to_live(Duration::from_secs(300))
        .max_capacity(10_000)
        .build();
    tracing::info!("Profile credential cache initialized (5m TTL, 10k capacity)");

    // Initialize Talent Protocol client; without an API key the service
    // serves fixture data only.
    let client = match config.talent_api_key.clone() {
        Some(api_key) => {
            let client = TalentClient::new(
                config.talent_base_url.clone(),
                api_key,
                Duration::from_secs(config.upstream_timeout_secs),
            )?;
            tracing::info!("✓ Talent API client initialized: {}", config.talent_base_url);
            Some(client)
        }
        None => {
            tracing::warn!("TALENT_PROTOCOL_API_KEY not set, serving fixture data");
            None
        }
    };

    // Build application state
    let app_state = Arc::new(handlers::AppState {
        config: config.clone(),
        client,
        catalog_cache,
        profile_credentials_cache,
        upstream_breaker: Arc::new(circuit_breaker::create_upstream_circuit_breaker()),
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    // Build protected routes with security layers
    let protected_routes = handlers::api_routes().layer(
        ServiceBuilder::new()
            // Request size limit: 2MB max payload
            .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024))
            // Rate limiting: 10 req/sec per IP, burst of 20
            .layer(GovernorLayer {
                config: governor_conf,
            }),
    );

    // Build final app with health check bypassing rate limiting
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
