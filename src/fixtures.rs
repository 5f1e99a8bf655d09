//! Canned responses served when no API key is configured and when the
//! upstream Talent Protocol API cannot be reached.

use crate::models::{CredentialOption, CredentialValue, Profile};
use serde_json::{json, Value};

/// Fixture advanced-search response in the upstream wire shape.
pub fn search_response() -> Value {
    json!({
        "profiles": [
            {
                "id": "101",
                "display_name": "Alex Johnson",
                "username": "alexj",
                "bio": "Full-stack developer specializing in React and Node.js",
                "image_url": "https://randomuser.me/api/portraits/men/1.jpg",
                "builder_score": { "points": 85 },
                "human_checkmark": true,
                "tags": ["React", "Node.js", "TypeScript"]
            },
            {
                "id": "102",
                "display_name": "Sarah Williams",
                "username": "sarahw",
                "bio": "Frontend developer with a passion for UI/UX",
                "image_url": "https://randomuser.me/api/portraits/women/2.jpg",
                "builder_score": { "points": 78 },
                "human_checkmark": true,
                "tags": ["JavaScript", "React", "CSS"]
            },
            {
                "id": "103",
                "display_name": "Miguel Sanchez",
                "username": "miguels",
                "bio": "Backend engineer specialized in scalable systems",
                "image_url": "https://randomuser.me/api/portraits/men/3.jpg",
                "builder_score": { "points": 92 },
                "human_checkmark": true,
                "tags": ["Go", "Microservices", "Docker"]
            },
            {
                "id": "104",
                "display_name": "Emily Chen",
                "username": "emilyc",
                "bio": "Machine learning engineer with focus on computer vision",
                "image_url": "https://randomuser.me/api/portraits/women/4.jpg",
                "builder_score": { "points": 88 },
                "human_checkmark": true,
                "tags": ["Python", "TensorFlow", "Computer Vision"]
            }
        ]
    })
}

/// Fixture per-profile credential response in the upstream wire shape.
pub fn user_credentials_response() -> Value {
    json!({
        "user_credentials": [
            {
                "credential": {
                    "name": "GitHub Stars",
                    "slug": "github-stars",
                    "data_issuer": "GitHub"
                },
                "value": 120
            },
            {
                "credential": {
                    "name": "GitHub Repositories",
                    "slug": "github-repositories",
                    "data_issuer": "GitHub"
                },
                "value": 25
            }
        ]
    })
}

/// Fixture credential catalog in the upstream wire shape.
pub fn credential_catalog_response() -> Value {
    json!({
        "credentials": [
            {
                "id": "cred-github-stars",
                "name": "GitHub Stars",
                "slug": "github-stars",
                "data_issuer": "github",
                "data_issuer_display_name": "GitHub",
                "display_name": "GitHub Stars",
                "description": "Total stars across public repositories",
                "image_url": "https://talentprotocol.com/images/github.png",
                "created_at": "2024-01-10T00:00:00Z",
                "updated_at": "2024-06-01T00:00:00Z"
            },
            {
                "id": "cred-github-repositories",
                "name": "GitHub Repositories",
                "slug": "github-repositories",
                "data_issuer": "github",
                "data_issuer_display_name": "GitHub",
                "display_name": "GitHub Repositories",
                "description": "Public repositories owned",
                "image_url": "https://talentprotocol.com/images/github.png",
                "created_at": "2024-01-10T00:00:00Z",
                "updated_at": "2024-06-01T00:00:00Z"
            },
            {
                "id": "cred-base-contracts-mainnet",
                "name": "Contracts Deployed (Mainnet)",
                "slug": "contracts-deployed-mainnet",
                "data_issuer": "base",
                "data_issuer_display_name": "Base",
                "display_name": "Contracts Deployed (Mainnet)",
                "description": "Smart contracts deployed to Base mainnet",
                "image_url": "https://talentprotocol.com/images/base.png",
                "created_at": "2024-02-20T00:00:00Z",
                "updated_at": "2024-06-01T00:00:00Z"
            }
        ]
    })
}

/// Acknowledgement body for proxied POSTs in fixture mode.
pub fn post_ack_response() -> Value {
    json!({
        "success": true,
        "message": "Fixture data returned because no API key is configured"
    })
}

/// Fallback profile list used when the live search pipeline fails.
pub fn profiles() -> Vec<Profile> {
    vec![
        Profile {
            id: "101".to_string(),
            full_name: "Alex Johnson".to_string(),
            username: Some("alexj".to_string()),
            bio: Some("Full-stack developer specializing in React and Node.js".to_string()),
            profile_picture: Some("https://randomuser.me/api/portraits/men/1.jpg".to_string()),
            score: Some(85.0),
            human_verified: true,
            tags: vec![
                "React".to_string(),
                "Node.js".to_string(),
                "TypeScript".to_string(),
            ],
            credential_value: Some(CredentialValue::Number(120.0)),
        },
        Profile {
            id: "102".to_string(),
            full_name: "Sarah Williams".to_string(),
            username: Some("sarahw".to_string()),
            bio: Some("Frontend developer with a passion for UI/UX".to_string()),
            profile_picture: Some("https://randomuser.me/api/portraits/women/2.jpg".to_string()),
            score: Some(78.0),
            human_verified: true,
            tags: vec![
                "JavaScript".to_string(),
                "React".to_string(),
                "CSS".to_string(),
            ],
            credential_value: Some(CredentialValue::Number(85.0)),
        },
        Profile {
            id: "103".to_string(),
            full_name: "Miguel Sanchez".to_string(),
            username: Some("miguels".to_string()),
            bio: Some("Backend engineer specialized in scalable systems".to_string()),
            profile_picture: Some("https://randomuser.me/api/portraits/men/3.jpg".to_string()),
            score: Some(92.0),
            human_verified: true,
            tags: vec![
                "Go".to_string(),
                "Microservices".to_string(),
                "Docker".to_string(),
            ],
            credential_value: Some(CredentialValue::Number(210.0)),
        },
        Profile {
            id: "104".to_string(),
            full_name: "Emily Chen".to_string(),
            username: Some("emilyc".to_string()),
            bio: Some("Machine learning engineer with focus on computer vision".to_string()),
            profile_picture: Some("https://randomuser.me/api/portraits/women/4.jpg".to_string()),
            score: Some(88.0),
            human_verified: true,
            tags: vec![
                "Python".to_string(),
                "TensorFlow".to_string(),
                "Computer Vision".to_string(),
            ],
            credential_value: Some(CredentialValue::Number(150.0)),
        },
    ]
}

/// Built-in credential filter catalog exposed to clients.
pub fn credential_options() -> Vec<CredentialOption> {
    let entries = [
        ("GitHub Account", "GitHub", "GitHub Account", "github-account"),
        ("GitHub Forks", "GitHub", "GitHub Forks", "github-forks"),
        (
            "GitHub Repositories",
            "GitHub",
            "GitHub Repositories",
            "github-repositories",
        ),
        ("GitHub Stars", "GitHub", "GitHub Stars", "github-stars"),
        (
            "GitHub Total Contributions",
            "GitHub",
            "GitHub Total Contributions",
            "github-total-contributions",
        ),
        (
            "Contracts Deployed (Mainnet)",
            "Base",
            "Contracts Deployed (Mainnet)",
            "contracts-deployed-mainnet",
        ),
        (
            "Basecamp Attendee",
            "Base",
            "Basecamp Attendee",
            "basecamp-attendee",
        ),
    ];

    entries
        .into_iter()
        .map(|(name, issuer, display, slug)| CredentialOption {
            name: name.to_string(),
            data_issuer: issuer.to_string(),
            display_name: display.to_string(),
            slug: Some(slug.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchResponse;

    #[test]
    fn fixture_search_response_parses_as_upstream_shape() {
        let parsed: SearchResponse = serde_json::from_value(search_response()).unwrap();
        let profiles = parsed.profiles.unwrap();
        assert_eq!(profiles.len(), 4);
        assert_eq!(profiles[0].display_name.as_deref(), Some("Alex Johnson"));
    }

    #[test]
    fn fixture_credentials_include_github_stars() {
        let body = user_credentials_response();
        let slugs: Vec<&str> = body["user_credentials"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["credential"]["slug"].as_str().unwrap())
            .collect();
        assert!(slugs.contains(&"github-stars"));
    }

    #[test]
    fn credential_options_all_have_slugs() {
        for option in credential_options() {
            assert!(option.slug.is_some(), "{} missing slug", option.name);
        }
    }
}
