/// Integration tests with a mocked upstream Talent Protocol API.
/// Exercises the client, the search service and the enrichment pipeline
/// without hitting the real external service.
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache;
use serde_json::json;
use talent_hub_api::circuit_breaker::create_upstream_circuit_breaker;
use talent_hub_api::config::Config;
use talent_hub_api::enrichment::enrich_profiles_by_credential;
use talent_hub_api::handlers::AppState;
use talent_hub_api::models::{CredentialOption, CredentialValue, DataSource};
use talent_hub_api::services::{CredentialService, ProfileSearchService};
use talent_hub_api::talent_client::TalentClient;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create test config pointing at a mock server.
fn create_test_config(base_url: String, with_key: bool) -> Config {
    Config {
        port: 3000,
        talent_api_key: with_key.then(|| "test_key".to_string()),
        talent_base_url: base_url,
        upstream_timeout_secs: 5,
        enrichment_concurrency: 4,
        enrichment_fetch_timeout_secs: 5,
    }
}

fn create_test_state(base_url: String, with_key: bool) -> Arc<AppState> {
    let config = create_test_config(base_url, with_key);
    let client = config.talent_api_key.clone().map(|key| {
        TalentClient::new(
            config.talent_base_url.clone(),
            key,
            Duration::from_secs(config.upstream_timeout_secs),
        )
        .expect("client creation")
    });

    Arc::new(AppState {
        config,
        client,
        catalog_cache: Cache::builder().build(),
        profile_credentials_cache: Cache::builder().build(),
        upstream_breaker: Arc::new(create_upstream_circuit_breaker()),
    })
}

fn github_stars() -> CredentialOption {
    CredentialOption {
        name: "GitHub Stars".to_string(),
        data_issuer: "GitHub".to_string(),
        display_name: "GitHub Stars".to_string(),
        slug: Some("github-stars".to_string()),
    }
}

fn search_body(profiles: serde_json::Value) -> serde_json::Value {
    json!({ "profiles": profiles })
}

#[tokio::test]
async fn test_search_maps_upstream_profiles() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/advanced/profiles"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(json!([
            {
                "id": "1",
                "display_name": "Ada Lovelace",
                "builder_score": { "points": 91 },
                "human_checkmark": true,
                "tags": ["Rust"]
            },
            {
                "id": "2"
            }
        ]))))
        .mount(&mock_server)
        .await;

    let client = TalentClient::new(mock_server.uri(), "key".to_string(), Duration::from_secs(5))
        .expect("client");
    let service = ProfileSearchService::new(client);
    let profiles = service.search_by_credential(&github_stars()).await.unwrap();

    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0].full_name, "Ada Lovelace");
    assert_eq!(profiles[0].score, Some(91.0));
    assert!(profiles[0].human_verified);
    assert_eq!(profiles[1].full_name, "Unknown");
}

#[tokio::test]
async fn test_search_error_status_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/advanced/profiles"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = TalentClient::new(mock_server.uri(), "key".to_string(), Duration::from_secs(5))
        .expect("client");
    let service = ProfileSearchService::new(client);
    let result = service.search_by_credential(&github_stars()).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_profile_credential_values_shaped_into_map() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profiles/42/credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_credentials": [
                {
                    "credential": {"name": "GitHub Stars", "slug": "github-stars", "data_issuer": "GitHub"},
                    "value": 120
                },
                {
                    "credential": {"name": "GitHub Forks", "slug": "github-forks", "data_issuer": "GitHub"},
                    "value": "7"
                }
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = TalentClient::new(mock_server.uri(), "key".to_string(), Duration::from_secs(5))
        .expect("client");
    let service = CredentialService::new(client);
    let values = service.fetch_profile_credential_values("42").await.unwrap();

    assert_eq!(values.len(), 2);
    assert_eq!(values["github-stars"], json!(120));
    assert_eq!(values["github-forks"], json!("7"));
}

#[tokio::test]
async fn test_end_to_end_enrichment_sorts_by_value() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/advanced/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(json!([
            { "id": "1", "display_name": "Low Star Dev" },
            { "id": "2", "display_name": "High Star Dev" }
        ]))))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/profiles/1/credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_credentials": [
                {"credential": {"slug": "github-stars"}, "value": 10}
            ]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/profiles/2/credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_credentials": [
                {"credential": {"slug": "github-stars"}, "value": 50}
            ]
        })))
        .mount(&mock_server)
        .await;

    let state = create_test_state(mock_server.uri(), true);
    let outcome = enrich_profiles_by_credential(&state, &github_stars()).await;

    assert_eq!(outcome.source, DataSource::Live);
    assert!(outcome.enriched);
    assert_eq!(outcome.profiles.len(), 2);
    assert_eq!(outcome.profiles[0].full_name, "High Star Dev");
    assert_eq!(
        outcome.profiles[0].credential_value,
        Some(CredentialValue::Number(50.0))
    );
    assert_eq!(
        outcome.profiles[1].credential_value,
        Some(CredentialValue::Number(10.0))
    );
}

#[tokio::test]
async fn test_no_slug_preserves_upstream_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/advanced/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(json!([
            { "id": "1", "display_name": "First" },
            { "id": "2", "display_name": "Second" },
            { "id": "3", "display_name": "Third" }
        ]))))
        .mount(&mock_server)
        .await;

    let state = create_test_state(mock_server.uri(), true);
    let mut credential = github_stars();
    credential.slug = None;

    let outcome = enrich_profiles_by_credential(&state, &credential).await;

    assert_eq!(outcome.source, DataSource::Live);
    assert!(!outcome.enriched);
    let names: Vec<&str> = outcome
        .profiles
        .iter()
        .map(|p| p.full_name.as_str())
        .collect();
    assert_eq!(names, vec!["First", "Second", "Third"]);
    assert!(outcome.profiles.iter().all(|p| p.credential_value.is_none()));
}

#[tokio::test]
async fn test_failed_sub_fetch_leaves_other_values_intact() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/advanced/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(json!([
            { "id": "1", "display_name": "Healthy" },
            { "id": "2", "display_name": "Broken" }
        ]))))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/profiles/1/credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_credentials": [
                {"credential": {"slug": "github-stars"}, "value": 33}
            ]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/profiles/2/credentials"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let state = create_test_state(mock_server.uri(), true);
    let outcome = enrich_profiles_by_credential(&state, &github_stars()).await;

    assert_eq!(outcome.profiles.len(), 2);
    // Value-bearing profile first, failed one last with no value
    assert_eq!(outcome.profiles[0].full_name, "Healthy");
    assert_eq!(
        outcome.profiles[0].credential_value,
        Some(CredentialValue::Number(33.0))
    );
    assert_eq!(outcome.profiles[1].full_name, "Broken");
    assert!(outcome.profiles[1].credential_value.is_none());
}

#[tokio::test]
async fn test_search_failure_falls_back_to_fixtures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/advanced/profiles"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&mock_server)
        .await;

    let state = create_test_state(mock_server.uri(), true);
    let outcome = enrich_profiles_by_credential(&state, &github_stars()).await;

    assert_eq!(outcome.source, DataSource::Fixture);
    assert!(!outcome.profiles.is_empty());
}

#[tokio::test]
async fn test_fixture_mode_without_api_key() {
    let state = create_test_state("https://api.talentprotocol.com".to_string(), false);
    let outcome = enrich_profiles_by_credential(&state, &github_stars()).await;

    assert_eq!(outcome.source, DataSource::Fixture);
    assert_eq!(outcome.profiles.len(), 4);
}

#[tokio::test]
async fn test_fan_out_respects_concurrency_bound() {
    let mock_server = MockServer::start().await;

    let profiles: Vec<serde_json::Value> = (1..=6)
        .map(|i| json!({ "id": i.to_string(), "display_name": format!("Dev {}", i) }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/search/advanced/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(json!(profiles))))
        .mount(&mock_server)
        .await;

    let delay = Duration::from_millis(150);
    Mock::given(method("GET"))
        .and(path_regex(r"^/profiles/\d+/credentials$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(delay)
                .set_body_json(json!({
                    "user_credentials": [
                        {"credential": {"slug": "github-stars"}, "value": 1}
                    ]
                })),
        )
        .expect(6)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(mock_server.uri(), true);
    config.enrichment_concurrency = 2;
    let client = TalentClient::new(
        config.talent_base_url.clone(),
        "test_key".to_string(),
        Duration::from_secs(5),
    )
    .expect("client");
    let state = Arc::new(AppState {
        config,
        client: Some(client),
        catalog_cache: Cache::builder().build(),
        profile_credentials_cache: Cache::builder().build(),
        upstream_breaker: Arc::new(create_upstream_circuit_breaker()),
    });

    let start = Instant::now();
    let outcome = enrich_profiles_by_credential(&state, &github_stars()).await;
    let elapsed = start.elapsed();

    // 6 delayed fetches through 2 permits take at least 3 delay rounds.
    assert!(
        elapsed >= delay * 3 - Duration::from_millis(50),
        "Fan-out finished too fast for a bound of 2: {:?}",
        elapsed
    );
    assert!(outcome
        .profiles
        .iter()
        .all(|p| p.credential_value.is_some()));
}

/// A hung upstream must trip the breaker just like a fast-failing one:
/// each timed-out sub-fetch is recorded as a failure, and once every fetch
/// in the run has timed out the circuit is open for subsequent calls.
#[tokio::test]
async fn test_hung_credential_fetches_open_the_circuit() {
    use failsafe::CircuitBreaker;

    let mock_server = MockServer::start().await;

    let profiles: Vec<serde_json::Value> = (1..=6)
        .map(|i| json!({ "id": i.to_string(), "display_name": format!("Dev {}", i) }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/search/advanced/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(json!(profiles))))
        .mount(&mock_server)
        .await;

    // Responds well past the per-fetch timeout, simulating a hang.
    Mock::given(method("GET"))
        .and(path_regex(r"^/profiles/\d+/credentials$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(10))
                .set_body_json(json!({ "user_credentials": [] })),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(mock_server.uri(), true);
    config.enrichment_fetch_timeout_secs = 1;
    config.enrichment_concurrency = 8;
    let client = TalentClient::new(
        config.talent_base_url.clone(),
        "test_key".to_string(),
        Duration::from_secs(30),
    )
    .expect("client");
    let state = Arc::new(AppState {
        config,
        client: Some(client),
        catalog_cache: Cache::builder().build(),
        profile_credentials_cache: Cache::builder().build(),
        upstream_breaker: Arc::new(create_upstream_circuit_breaker()),
    });

    let outcome = enrich_profiles_by_credential(&state, &github_stars()).await;

    assert!(outcome
        .profiles
        .iter()
        .all(|p| p.credential_value.is_none()));
    assert!(
        !state.upstream_breaker.is_call_permitted(),
        "6 consecutive timeouts should have opened the circuit"
    );
}
