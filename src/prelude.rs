//! Prelude module - Commonly used types for quick imports
//!
//! This module re-exports the most commonly used types from Cacheron,
//! allowing users to import them with a single `use cacheron::prelude::*;`
//! statement instead of importing each type individually.

// Core types - always available
pub use crate::config::RouterConfig;
pub use crate::error::{NetworkError, RouterError, StorageError};
pub use crate::router::{FetchOutcome, OfflineRouter, OfflineRouterBuilder};

// Request model
pub use crate::classifier::RequestClass;
pub use crate::http::{CacheKey, Request, Response};

// Collaborator traits
pub use crate::diagnostics::{DiagnosticEvent, DiagnosticSink};
pub use crate::network::Network;
pub use crate::storage::{CacheStorage, CacheStore};
pub use crate::surface::{ClientSurface, NotificationSurface};
pub use crate::sync::{CartItem, CartStorage};

// In-memory collaborators
pub use crate::storage::MemoryCacheStorage;
pub use crate::surface::MemorySurface;
pub use crate::sync::MemoryCartStorage;

// Feature-gated exports
#[cfg(feature = "http")]
pub use crate::network::HttpNetwork;

#[cfg(feature = "telemetry")]
pub use crate::telemetry::{init_tracing, TelemetryConfig};
