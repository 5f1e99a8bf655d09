use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

// ============ View Models ============

/// A developer profile as served by this API.
///
/// Built from the upstream search response; `credential_value` is only
/// populated when the selected credential carries a slug and the enrichment
/// fan-out found a value for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub full_name: String,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub score: Option<f64>,
    pub human_verified: bool,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_value: Option<CredentialValue>,
}

/// A credential value attached to a profile during enrichment.
///
/// Upstream values are either numeric or free text. Sorting compares numbers
/// arithmetically and everything else lexicographically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CredentialValue {
    Number(f64),
    Text(String),
}

impl CredentialValue {
    /// Converts a raw upstream JSON value into a credential value.
    ///
    /// Booleans are coerced to text; nulls, arrays and objects carry no
    /// sortable value and yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(CredentialValue::Number),
            Value::String(s) => Some(CredentialValue::Text(s.clone())),
            Value::Bool(b) => Some(CredentialValue::Text(b.to_string())),
            _ => None,
        }
    }

    fn as_text(&self) -> String {
        match self {
            CredentialValue::Number(n) => n.to_string(),
            CredentialValue::Text(t) => t.clone(),
        }
    }

    /// Descending comparison: the larger value orders first.
    pub fn cmp_desc(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CredentialValue::Number(a), CredentialValue::Number(b)) => {
                b.partial_cmp(a).unwrap_or(Ordering::Equal)
            }
            _ => other.as_text().cmp(&self.as_text()),
        }
    }
}

/// A selectable credential filter: name plus issuing service, with an
/// optional slug used for per-profile value lookups.
///
/// Uses camelCase on the wire to match the request shape clients send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialOption {
    pub name: String,
    pub data_issuer: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// Credential catalog metadata, passed through from upstream untransformed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialDetail {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub data_issuer: Option<String>,
    #[serde(default)]
    pub data_issuer_display_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

// ============ Upstream Wire Shapes ============

/// Response body of the upstream advanced profile search.
///
/// `profiles` stays optional so a structurally valid body without the key can
/// be told apart from an empty result set.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub profiles: Option<Vec<UpstreamProfile>>,
}

/// A profile record as the upstream API returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamProfile {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub builder_score: Option<BuilderScore>,
    #[serde(default)]
    pub human_checkmark: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuilderScore {
    #[serde(default)]
    pub points: Option<f64>,
}

impl From<UpstreamProfile> for Profile {
    fn from(upstream: UpstreamProfile) -> Self {
        let id = match upstream.id {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let full_name = upstream
            .display_name
            .filter(|s| !s.is_empty())
            .or(upstream.name.filter(|s| !s.is_empty()))
            .unwrap_or_else(|| "Unknown".to_string());

        Profile {
            id,
            full_name,
            username: upstream.username,
            bio: upstream.bio,
            profile_picture: upstream.image_url,
            score: upstream.builder_score.and_then(|s| s.points),
            human_verified: upstream.human_checkmark.unwrap_or(false),
            tags: upstream.tags.unwrap_or_default(),
            credential_value: None,
        }
    }
}

/// Response body of `profiles/{id}/credentials`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserCredentialsResponse {
    #[serde(default)]
    pub user_credentials: Option<Vec<UserCredential>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserCredential {
    #[serde(default)]
    pub credential: Option<CredentialRef>,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub data_issuer: Option<String>,
}

/// Response body of the `credentials` catalog endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialCatalogResponse {
    #[serde(default)]
    pub credentials: Option<Vec<CredentialDetail>>,
}

// ============ API Responses ============

/// Where a response's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Fixture,
}

/// Metadata attached to enriched profile responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub source: DataSource,
    pub enriched: bool,
    pub count: usize,
    pub fetched_at: DateTime<Utc>,
}

/// Response of `POST /api/v1/profiles/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedProfilesResponse {
    pub profiles: Vec<Profile>,
    pub metadata: ResponseMetadata,
}
