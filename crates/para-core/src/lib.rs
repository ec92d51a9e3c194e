//! Para Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the platform:
//! - Report, investigator and marketplace records
//! - Category catalogs and price tables
//! - The proximity filter (haversine nearest-first search)
//! - Common error types
//! - The LLM client trait
//! - Configuration management
//!
//! Author: hephaex@gmail.com

pub mod catalog;
pub mod config;
pub mod extraction;
pub mod geo;
pub mod models;

pub use catalog::{ReportCategory, SubscriptionPlan, SubscriptionType};
pub use config::{
    AppConfig, ConfigError, DatabaseConfig, GeoConfig, LlmConfig, LlmProvider, LoggingConfig,
    ServerConfig, StoreBackend,
};
pub use extraction::ExtractionResult;
pub use geo::{find_nearby, haversine_km, GeoPoint, Located, Nearby, DEFAULT_LOCATION};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for platform operations
#[derive(Error, Debug)]
pub enum ParaError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ParaError>;

// ============================================================================
// Traits
// ============================================================================

/// Sampling parameters for a single generation call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    /// Upper bound on completion tokens
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.7,
        }
    }
}

impl GenerationOptions {
    pub fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

/// Trait for text-generation clients
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for a single user prompt
    async fn generate(&self, prompt: &str, options: GenerationOptions) -> Result<String>;

    /// Model identifier, for logging
    fn model(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================
