//! Talent Hub API Library
//!
//! This library provides the core functionality for the Talent Hub API, a
//! server-side companion to the TalentHub mini-app: a proxy in front of the
//! Talent Protocol REST API plus a credential search-and-enrichment pipeline
//! with bounded fan-out, caching, and fixture fallbacks.
//!
//! # Modules
//!
//! - `api`: API-layer namespace.
//! - `core`: Domain-layer namespace.
//! - `integrations`: External service namespace.
//! - `cache_integrity`: Digest validation for cached upstream responses.
//! - `circuit_breaker`: Circuit breaker for upstream calls.
//! - `config`: Configuration management.
//! - `enrichment`: Credential search-and-enrichment pipeline.
//! - `errors`: Error handling types.
//! - `fixtures`: Canned fallback data.
//! - `handlers`: HTTP request handlers and router.
//! - `models`: Data models and upstream wire shapes.
//! - `services`: Profile search and credential services.
//! - `talent_client`: Talent Protocol API client.

pub mod api;
pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and other binaries
pub mod cache_integrity;
pub mod circuit_breaker;
pub mod config;
pub mod enrichment;
pub mod errors;
pub mod fixtures;
pub mod handlers;
pub mod models;
pub mod services;
pub mod talent_client;
