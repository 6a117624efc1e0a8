//! # Keywarden
//!
//! A unified API key identification and validation library for Rust.
//!
//! Keywarden classifies an opaque key-like string into one of twelve
//! providers (OpenAI, Anthropic, AI21, MakerSuite, AWS, Azure, Vertex AI,
//! Mistral, OpenRouter, ElevenLabs, DeepSeek, xAI) via an ordered pattern
//! chain, then validates the key against the provider's API and extracts
//! account metadata — quota, tier, rate limits, reachable models.
//!
//! ## Architecture
//!
//! - [`identify`] — pure, deterministic provider classification
//! - [`types`] — the key model, options, and results
//! - [`validators`] — one adapter per provider plus the shared
//!   cache-aside/governed wrapper
//! - [`orchestrator`] — single and batch validation entry points
//! - [`governor`] / [`cache`] / [`retry`] — the shared admission, caching,
//!   and retry machinery
//! - [`queue`] — bounded background work queue with a worker pool
//!
//! ## Example
//!
//! ```rust,no_run
//! use keywarden::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = ValidationOrchestrator::with_defaults(ValidationSettings::default())?;
//!
//!     let result = orchestrator
//!         .validate_single("sk-ant-api03-...", &ValidationOptions::default())
//!         .await;
//!
//!     if result.is_valid {
//!         println!("valid key: {:?}", result.key_info);
//!     } else {
//!         println!("invalid: {:?}", result.error_message);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod governor;
pub mod identify;
pub mod orchestrator;
pub mod queue;
pub mod retry;
pub mod types;
pub mod validators;

pub use error::KeyCheckError;

/// Common imports for working with the library.
pub mod prelude {
    pub use crate::api::{
        BatchValidateRequest, BatchValidationResponse, ValidateKeyRequest, ValidationResponse,
    };
    pub use crate::cache::{MemoryValidationCache, ValidationCache};
    pub use crate::config::{ProviderLimits, ValidationSettings};
    pub use crate::error::KeyCheckError;
    pub use crate::identify::identify;
    pub use crate::orchestrator::ValidationOrchestrator;
    pub use crate::types::{
        ApiKey, KeyDetails, Provider, ValidationOptions, ValidationResult,
    };
    pub use crate::validators::KeyValidator;
}
