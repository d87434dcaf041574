//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! Centralized configuration constants for Cacheron.
//!
//! These are the defaults used by [`RouterConfig::default()`]. Every value can be
//! overridden through configuration.
//!
//! [`RouterConfig::default()`]: crate::config::RouterConfig

// ============================================================================
// Cache Generation Constants
// ============================================================================

/// Identifier of the current static-asset cache generation.
///
/// Bump the suffix on every deployment that changes the install manifest;
/// activation deletes every store whose name matches neither current generation.
pub const DEFAULT_ASSETS_GENERATION: &str = "static-v1";

/// Identifier of the current API response cache generation.
pub const DEFAULT_API_GENERATION: &str = "api-v1";

// ============================================================================
// Routing Constants
// ============================================================================

/// Path prefix reserved for API requests (network-first strategy).
pub const DEFAULT_API_PREFIX: &str = "/api/";

/// Origin used to resolve relative request URLs.
pub const DEFAULT_ORIGIN: &str = "http://localhost/";

/// URL schemes the router is allowed to intercept.
///
/// Anything else (`chrome-extension:`, `moz-extension:`, `data:`, `blob:` ...)
/// is an internal browser resource and passes through untouched.
pub const FETCHABLE_SCHEMES: [&str; 2] = ["http", "https"];

/// Status code of the synthesized response for an API request under total failure.
pub const NETWORK_ERROR_STATUS: u16 = 503;

/// Error message carried in the synthesized 503 body.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error";

// ============================================================================
// Fallback Constants
// ============================================================================

/// Pre-cached document served to HTML navigations under total failure.
pub const DEFAULT_OFFLINE_PAGE: &str = "/offline.html";

/// Pre-cached image served to image requests under total failure.
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "/images/placeholder.png";

/// Fixed install-time asset manifest.
///
/// Fetched and stored as one all-or-nothing batch during install.
pub const DEFAULT_INSTALL_ASSETS: [&str; 8] = [
    "/",
    "/offline.html",
    "/manifest.json",
    "/css/styles.min.css",
    "/js/app.min.js",
    "/icons/icon-192x192.png",
    "/icons/icon-512x512.png",
    "/images/placeholder.png",
];

// ============================================================================
// Background Sync Constants
// ============================================================================

/// Tag of the deferred synchronization trigger for the shopping cart.
pub const DEFAULT_SYNC_TAG: &str = "sync-cart";

/// Endpoint receiving the pending cart as a JSON array.
pub const DEFAULT_SYNC_ENDPOINT: &str = "/api/cart/sync";

// ============================================================================
// Notification Constants
// ============================================================================

/// Title used when a push payload cannot be decoded.
pub const DEFAULT_NOTIFICATION_TITLE: &str = "New Update";

/// Body used when a push payload cannot be decoded.
pub const DEFAULT_NOTIFICATION_BODY: &str = "You have a new notification";

/// Icon used when a notification payload carries none.
pub const DEFAULT_NOTIFICATION_ICON: &str = "/icons/icon-192x192.png";

/// Badge attached to every notification.
pub const DEFAULT_NOTIFICATION_BADGE: &str = "/icons/badge-72x72.png";

/// Target URL used when a notification payload carries none.
pub const DEFAULT_NOTIFICATION_URL: &str = "/";

/// Title of the confirmation shown after a successful cart sync.
pub const DEFAULT_SYNC_NOTIFICATION_TITLE: &str = "Cart Synced";

/// Body of the confirmation shown after a successful cart sync.
pub const DEFAULT_SYNC_NOTIFICATION_BODY: &str = "Your cart has been synchronized";

// ============================================================================
// Network Constants
// ============================================================================

/// Default request timeout of the HTTP network backend (30 seconds).
pub const DEFAULT_NETWORK_TIMEOUT_SECS: u64 = 30;
