use crate::cache_integrity::SealedCacheEntry;
use crate::circuit_breaker::UpstreamCircuitBreaker;
use crate::config::Config;
use crate::enrichment;
use crate::errors::AppError;
use crate::fixtures;
use crate::models::{CredentialOption, EnrichedProfilesResponse, ResponseMetadata};
use crate::services::CredentialService;
use crate::talent_client::TalentClient;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use moka::future::Cache;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Upstream Talent API client; `None` in fixture mode.
    pub client: Option<TalentClient>,
    /// Credential catalog cache (1 hour TTL), digest-validated entries.
    pub catalog_cache: Cache<String, String>,
    /// Per-profile credential value cache (5 minute TTL).
    pub profile_credentials_cache: Cache<String, String>,
    /// Circuit breaker shared across enrichment sub-fetches.
    pub upstream_breaker: Arc<UpstreamCircuitBreaker>,
}

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub endpoint: Option<String>,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "talent-hub-api",
            "version": "0.1.0"
        })),
    )
}

/// GET /api/talent?endpoint=...
///
/// Thin proxy in front of the Talent Protocol API. Without an API key it
/// serves fixture data chosen by endpoint name; upstream failures surface as
/// a fixed 500 body, never the upstream status.
pub async fn proxy_get(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProxyParams>,
) -> Response {
    let Some(endpoint) = params.endpoint else {
        tracing::warn!("Proxy GET missing endpoint parameter");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing endpoint parameter" })),
        )
            .into_response();
    };

    tracing::info!("Proxy GET for endpoint: {}", endpoint);

    let Some(client) = state.client.clone() else {
        tracing::info!("No API key configured, returning fixture data");
        if endpoint.contains("credentials") {
            return Json(fixtures::user_credentials_response()).into_response();
        }
        return Json(fixtures::search_response()).into_response();
    };

    match client.get_json(&endpoint).await {
        Ok(data) => Json(data).into_response(),
        Err(e) => {
            tracing::error!("Proxy GET for {} failed: {}", endpoint, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch data from Talent Protocol" })),
            )
                .into_response()
        }
    }
}

/// POST /api/talent?endpoint=...
///
/// Same gating as the GET proxy. `search/advanced/profiles` is re-issued
/// upstream as a GET with the body JSON-encoded into query parameters; every
/// other endpoint is forwarded as a plain POST.
///
/// The body arrives as raw bytes and is parsed only after the endpoint check
/// and fixture gating, so a malformed body never preempts the 400 response
/// and on the keyed path it maps to the same fixed 500 as an upstream error.
pub async fn proxy_post(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProxyParams>,
    body: Bytes,
) -> Response {
    let Some(endpoint) = params.endpoint else {
        tracing::warn!("Proxy POST missing endpoint parameter");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing endpoint parameter" })),
        )
            .into_response();
    };

    tracing::info!("Proxy POST for endpoint: {}", endpoint);

    let Some(client) = state.client.clone() else {
        tracing::info!("No API key configured, returning fixture data");
        if endpoint.contains("search") {
            return Json(fixtures::search_response()).into_response();
        }
        return Json(fixtures::post_ack_response()).into_response();
    };

    let result = match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(body) if endpoint == "search/advanced/profiles" => {
            client.search_advanced_profiles(&body).await
        }
        Ok(body) => client.post_json(&endpoint, &body).await,
        Err(e) => Err(AppError::from(e)),
    };

    match result {
        Ok(data) => Json(data).into_response(),
        Err(e) => {
            tracing::error!("Proxy POST for {} failed: {}", endpoint, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to post data to Talent Protocol",
                    "details": e.to_string()
                })),
            )
                .into_response()
        }
    }
}

/// POST /api/v1/profiles/search
///
/// Runs the credential search-and-enrichment pipeline for the selected
/// credential and returns the sorted profile list with response metadata.
pub async fn search_profiles(
    State(state): State<Arc<AppState>>,
    Json(credential): Json<CredentialOption>,
) -> Result<Json<EnrichedProfilesResponse>, AppError> {
    if credential.name.trim().is_empty() || credential.data_issuer.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Credential name and dataIssuer are required".to_string(),
        ));
    }

    tracing::info!(
        "POST /profiles/search - {} {} (slug: {:?})",
        credential.data_issuer,
        credential.name,
        credential.slug
    );

    let outcome = enrichment::enrich_profiles_by_credential(&state, &credential).await;

    let metadata = ResponseMetadata {
        source: outcome.source,
        enriched: outcome.enriched,
        count: outcome.profiles.len(),
        fetched_at: Utc::now(),
    };

    Ok(Json(EnrichedProfilesResponse {
        profiles: outcome.profiles,
        metadata,
    }))
}

/// GET /api/v1/credentials
///
/// Credential catalog, cached for an hour with digest-validated entries.
pub async fn get_credential_catalog(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Some(client) = state.client.clone() else {
        return Ok(Json(fixtures::credential_catalog_response()));
    };

    const CACHE_KEY: &str = "catalog";

    if let Some(cached) = state.catalog_cache.get(CACHE_KEY).await {
        if let Some(body) = SealedCacheEntry::unseal(&cached) {
            if let Ok(data) = serde_json::from_str::<serde_json::Value>(&body) {
                tracing::debug!("Credential catalog cache HIT");
                return Ok(Json(data));
            }
        } else {
            tracing::warn!("Catalog cache entry failed integrity check, refetching");
        }
    }

    tracing::info!("Credential catalog cache MISS, fetching from upstream");
    let service = CredentialService::new(client);
    let credentials = service.fetch_catalog().await?;
    let data = json!({ "credentials": credentials });

    if let Ok(body) = serde_json::to_string(&data) {
        state
            .catalog_cache
            .insert(CACHE_KEY.to_string(), SealedCacheEntry::seal(body).into_cached())
            .await;
    }

    Ok(Json(data))
}

/// GET /api/v1/profiles/:id/credentials
///
/// A profile's credential values as a slug -> value map, cached briefly.
pub async fn get_profile_credentials(
    State(state): State<Arc<AppState>>,
    Path(profile_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if profile_id.trim().is_empty() {
        return Err(AppError::BadRequest("Profile id is required".to_string()));
    }

    let Some(client) = state.client.clone() else {
        let parsed = serde_json::from_value(fixtures::user_credentials_response())?;
        let map = crate::services::credential_value_map(parsed);
        return Ok(Json(serde_json::to_value(map)?));
    };

    if let Some(cached) = state.profile_credentials_cache.get(&profile_id).await {
        if let Some(body) = SealedCacheEntry::unseal(&cached) {
            if let Ok(data) = serde_json::from_str::<serde_json::Value>(&body) {
                tracing::debug!("Credential value cache HIT for profile {}", profile_id);
                return Ok(Json(data));
            }
        }
    }

    let service = CredentialService::new(client);
    let values = service.fetch_profile_credential_values(&profile_id).await?;
    let data = serde_json::to_value(values)?;

    if let Ok(body) = serde_json::to_string(&data) {
        state
            .profile_credentials_cache
            .insert(profile_id, SealedCacheEntry::seal(body).into_cached())
            .await;
    }

    Ok(Json(data))
}

/// GET /api/v1/credentials/options
///
/// The built-in credential filter catalog.
pub async fn get_credential_options() -> Json<Vec<CredentialOption>> {
    Json(fixtures::credential_options())
}

/// GET /.well-known/farcaster.json
///
/// Static mini-app manifest for the Farcaster frame host.
pub async fn serve_manifest() -> Json<serde_json::Value> {
    Json(json!({
        "miniApp": {
            "name": "TalentHub",
            "description": "Find talented developers with verified credentials from Talent Protocol",
            "icons": [
                {
                    "src": "/logo.svg",
                    "sizes": "512x512",
                    "type": "image/svg+xml"
                }
            ],
            "domains": ["localhost:3000"],
            "permissions": ["frame:read", "user:read"]
        }
    }))
}

/// API routes, without the outer middleware main wraps around them.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Proxy surface
        .route("/api/talent", get(proxy_get).post(proxy_post))
        // Enrichment API
        .route("/api/v1/profiles/search", post(search_profiles))
        .route("/api/v1/credentials", get(get_credential_catalog))
        .route("/api/v1/credentials/options", get(get_credential_options))
        .route(
            "/api/v1/profiles/:id/credentials",
            get(get_profile_credentials),
        )
        // Mini-app manifest
        .route("/.well-known/farcaster.json", get(serve_manifest))
}

/// Full router with state applied. Used directly by tests; `main` layers
/// rate limiting, body limits, tracing and CORS on top.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(api_routes())
        .with_state(state)
}
