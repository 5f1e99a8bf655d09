use crate::errors::{AppError, ResultExt};
use crate::models::*;
use crate::talent_client::TalentClient;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Upstream caps `per_page` at 25.
pub const SEARCH_PAGE_SIZE: u32 = 25;

/// Searches upstream for profiles holding a given credential.
pub struct ProfileSearchService {
    client: TalentClient,
}

impl ProfileSearchService {
    pub fn new(client: TalentClient) -> Self {
        Self { client }
    }

    /// Query body for the advanced profile search: filter by credential
    /// name + issuer, upstream-sorted by builder score descending.
    pub fn build_search_query(credential: &CredentialOption) -> Value {
        json!({
            "query": {
                "credentials": [{
                    "name": credential.name,
                    "dataIssuer": credential.data_issuer
                }]
            },
            "sort": {
                "score": {
                    "order": "desc"
                }
            },
            "page": 1,
            "per_page": SEARCH_PAGE_SIZE
        })
    }

    /// Fetches up to [`SEARCH_PAGE_SIZE`] profiles matching the credential,
    /// in upstream score order.
    pub async fn search_by_credential(
        &self,
        credential: &CredentialOption,
    ) -> Result<Vec<Profile>, AppError> {
        tracing::info!(
            "Searching profiles with {} {}",
            credential.data_issuer,
            credential.name
        );

        let query = Self::build_search_query(credential);
        let data = self.client.search_advanced_profiles(&query).await?;

        let parsed: SearchResponse = serde_json::from_value(data).map_err(|e| {
            AppError::ExternalApiError(format!("Malformed search response: {}", e))
        })?;
        let upstream = parsed.profiles.ok_or_else(|| {
            AppError::ExternalApiError("Search response missing profiles".to_string())
        })?;

        tracing::info!("Found {} profiles in search response", upstream.len());
        Ok(upstream.into_iter().map(Profile::from).collect())
    }
}

/// Fetches the credential catalog and per-profile credential values.
pub struct CredentialService {
    client: TalentClient,
}

impl CredentialService {
    pub fn new(client: TalentClient) -> Self {
        Self { client }
    }

    /// Fetches the full credential catalog. A body without a `credentials`
    /// array yields an empty catalog rather than an error.
    pub async fn fetch_catalog(&self) -> Result<Vec<CredentialDetail>, AppError> {
        let data = self
            .client
            .get_json("credentials")
            .await
            .context("Fetching credential catalog")?;
        let parsed: CredentialCatalogResponse = serde_json::from_value(data).map_err(|e| {
            AppError::ExternalApiError(format!("Malformed credential catalog: {}", e))
        })?;

        let credentials = parsed.credentials.unwrap_or_default();
        tracing::info!("Fetched {} credential details", credentials.len());
        Ok(credentials)
    }

    /// Fetches a profile's credentials and shapes them into a slug -> value
    /// map. Entries without a slug or value are skipped.
    pub async fn fetch_profile_credential_values(
        &self,
        profile_id: &str,
    ) -> Result<HashMap<String, Value>, AppError> {
        tracing::debug!("Fetching credential values for profile {}", profile_id);

        let endpoint = format!("profiles/{}/credentials", profile_id);
        let data = self
            .client
            .get_json(&endpoint)
            .await
            .with_context(|| format!("Fetching credentials for profile {}", profile_id))?;
        let parsed: UserCredentialsResponse = serde_json::from_value(data).map_err(|e| {
            AppError::ExternalApiError(format!("Malformed credentials response: {}", e))
        })?;

        Ok(credential_value_map(parsed))
    }
}

/// Shapes a user-credentials response into a slug -> value map.
pub fn credential_value_map(response: UserCredentialsResponse) -> HashMap<String, Value> {
    let mut values = HashMap::new();
    for entry in response.user_credentials.unwrap_or_default() {
        let slug = entry.credential.and_then(|c| c.slug);
        if let (Some(slug), Some(value)) = (slug, entry.value) {
            values.insert(slug, value);
        }
    }
    values
}
