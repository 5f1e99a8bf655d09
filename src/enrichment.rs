//! Credential search-and-enrichment pipeline.
//!
//! The workflow:
//! 1. Search upstream for profiles holding the selected credential
//!    (upstream-sorted by builder score).
//! 2. When the credential has a slug, fetch each profile's credential values
//!    with a bounded concurrent fan-out and attach the matching value.
//! 3. Re-sort the list descending by attached value; profiles without one
//!    keep their relative order at the tail.
//!
//! A failed or timed-out sub-fetch leaves that one profile without a value
//! and never aborts the others. A failed search degrades to the fixture
//! profile list.

use crate::errors::AppError;
use crate::fixtures;
use crate::handlers::AppState;
use crate::models::{CredentialOption, CredentialValue, DataSource, Profile};
use crate::services::{CredentialService, ProfileSearchService};
use failsafe::futures::CircuitBreaker;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Result of an enrichment run.
#[derive(Debug, Clone)]
pub struct EnrichmentOutcome {
    pub profiles: Vec<Profile>,
    pub source: DataSource,
    /// Whether at least one credential value was attached.
    pub enriched: bool,
}

/// Runs the full pipeline for one credential selection.
pub async fn enrich_profiles_by_credential(
    state: &Arc<AppState>,
    credential: &CredentialOption,
) -> EnrichmentOutcome {
    let Some(client) = state.client.clone() else {
        tracing::info!("No API key configured, serving fixture profiles");
        return fixture_outcome();
    };

    let search = ProfileSearchService::new(client.clone());
    let mut profiles = match search.search_by_credential(credential).await {
        Ok(profiles) => profiles,
        Err(e) => {
            tracing::warn!("Profile search failed, falling back to fixtures: {}", e);
            return fixture_outcome();
        }
    };

    let Some(slug) = credential.slug.clone() else {
        // No slug to look up: keep upstream score order untouched.
        return EnrichmentOutcome {
            profiles,
            source: DataSource::Live,
            enriched: false,
        };
    };

    if profiles.is_empty() {
        return EnrichmentOutcome {
            profiles,
            source: DataSource::Live,
            enriched: false,
        };
    }

    tracing::info!(
        "Fetching credential values for {} profiles (slug: {}, concurrency: {})",
        profiles.len(),
        slug,
        state.config.enrichment_concurrency
    );

    let semaphore = Arc::new(Semaphore::new(state.config.enrichment_concurrency));
    let fetch_timeout = Duration::from_secs(state.config.enrichment_fetch_timeout_secs);

    let mut handles = Vec::with_capacity(profiles.len());
    for profile in &profiles {
        let semaphore = Arc::clone(&semaphore);
        let breaker = Arc::clone(&state.upstream_breaker);
        let client = client.clone();
        let profile_id = profile.id.clone();
        let slug = slug.clone();

        handles.push(tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return None,
            };

            let service = CredentialService::new(client);
            // Timeout runs inside the guarded future so a hung upstream is
            // recorded as a breaker failure, not silently dropped.
            let guarded = breaker.call(async {
                match tokio::time::timeout(
                    fetch_timeout,
                    service.fetch_profile_credential_values(&profile_id),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(AppError::ExternalApiError(format!(
                        "Credential fetch for profile {} timed out after {:?}",
                        profile_id, fetch_timeout
                    ))),
                }
            });

            match guarded.await {
                Ok(values) => values.get(&slug).and_then(CredentialValue::from_json),
                Err(failsafe::Error::Rejected) => {
                    tracing::warn!(
                        "Upstream circuit open, skipping credential fetch for profile {}",
                        profile_id
                    );
                    None
                }
                Err(failsafe::Error::Inner(e)) => {
                    tracing::warn!(
                        "Credential fetch failed for profile {}: {}",
                        profile_id,
                        e
                    );
                    None
                }
            }
        }));
    }

    // Handles are in profile order; a panicked task counts as no value.
    for (index, handle) in handles.into_iter().enumerate() {
        profiles[index].credential_value = handle.await.unwrap_or(None);
    }

    let enriched = profiles.iter().any(|p| p.credential_value.is_some());
    sort_profiles_by_credential_value(&mut profiles);

    EnrichmentOutcome {
        profiles,
        source: DataSource::Live,
        enriched,
    }
}

/// Stable descending sort by credential value; profiles without a value go
/// last and keep their relative order.
pub fn sort_profiles_by_credential_value(profiles: &mut [Profile]) {
    profiles.sort_by(|a, b| match (&a.credential_value, &b.credential_value) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp_desc(b),
    });
}

fn fixture_outcome() -> EnrichmentOutcome {
    EnrichmentOutcome {
        profiles: fixtures::profiles(),
        source: DataSource::Fixture,
        enriched: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, value: Option<CredentialValue>) -> Profile {
        Profile {
            id: id.to_string(),
            full_name: format!("Dev {}", id),
            username: None,
            bio: None,
            profile_picture: None,
            score: None,
            human_verified: false,
            tags: vec![],
            credential_value: value,
        }
    }

    #[test]
    fn numeric_values_sort_descending() {
        let mut profiles = vec![
            profile("a", Some(CredentialValue::Number(10.0))),
            profile("b", Some(CredentialValue::Number(50.0))),
            profile("c", Some(CredentialValue::Number(25.0))),
        ];
        sort_profiles_by_credential_value(&mut profiles);
        let ids: Vec<&str> = profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn valueless_profiles_sort_last_in_original_order() {
        let mut profiles = vec![
            profile("a", None),
            profile("b", Some(CredentialValue::Number(5.0))),
            profile("c", None),
            profile("d", Some(CredentialValue::Number(9.0))),
            profile("e", None),
        ];
        sort_profiles_by_credential_value(&mut profiles);
        let ids: Vec<&str> = profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "b", "a", "c", "e"]);
    }

    #[test]
    fn text_values_sort_by_string_comparison() {
        let mut profiles = vec![
            profile("a", Some(CredentialValue::Text("alpha".to_string()))),
            profile("b", Some(CredentialValue::Text("zeta".to_string()))),
            profile("c", Some(CredentialValue::Text("mid".to_string()))),
        ];
        sort_profiles_by_credential_value(&mut profiles);
        let ids: Vec<&str> = profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn all_valueless_list_keeps_order() {
        let mut profiles = vec![profile("a", None), profile("b", None), profile("c", None)];
        sort_profiles_by_credential_value(&mut profiles);
        let ids: Vec<&str> = profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
