//! `EcoVoyage` - sustainable travel search assistant
//!
//! Queries a hosted destination index, normalizes the returned records,
//! summarizes them into a conversational reply and renders destination
//! cards with carbon comparisons. Ranking and indexing belong to the search
//! service; this crate only shapes what comes back.

pub mod api;
pub mod autocomplete;
pub mod config;
pub mod conversation;
pub mod error;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod render;
pub mod search;
pub mod summary;
pub mod web;

// Re-export core types for public API
pub use autocomplete::{Autocomplete, SuggestionState};
pub use config::EcoVoyageConfig;
pub use conversation::Conversation;
pub use error::EcoVoyageError;
pub use models::{Destination, Role, Turn};
pub use search::{AlgoliaClient, SearchBackend, SearchGateway, SearchOutcome, Suggestion};
pub use summary::summarize;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, EcoVoyageError>;
