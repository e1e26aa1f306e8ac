//! Shared constants for the studio and its provider client
//!

/// Imagen model used unless overridden on the command line
pub const DEFAULT_MODEL: &str = "imagen-4.0-generate-001";

/// Base URL of the Generative Language REST API
pub const DEFAULT_PROVIDER_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variable the API key is read from, at call time
pub const DEFAULT_API_KEY_VAR: &str = "API_KEY";

/// Header carrying the API key on provider requests
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Every generation asks the provider for this many images
pub const BATCH_SIZE: u8 = 4;

/// Output encoding requested from the provider
pub const OUTPUT_MIME_TYPE: &str = "image/png";

/// Upstream message that usually means a bad or unauthorized key
pub const ENTITY_NOT_FOUND: &str = "Requested entity was not found.";

/// Prefix of every offered download filename
pub const DOWNLOAD_PREFIX: &str = "wallpaper-";

/// Extension of every offered download filename
pub const DOWNLOAD_EXTENSION: &str = "png";

/// Minutes of inactivity before a browser session is dropped
pub const SESSION_INACTIVITY_MINUTES: i64 = 60;

/// Seconds between sweeps for studios whose session went idle
pub const STUDIO_SWEEP_INTERVAL_SECONDS: u64 = 60;

/// Length of CSRF session tokens
pub const CSRF_TOKEN_LENGTH: usize = 32;

/// Length of the per-session studio key
pub const STUDIO_KEY_LENGTH: usize = 24;

/// Seconds between page refreshes while a generation is in flight
pub const LOADING_REFRESH_SECONDS: u64 = 3;

#[cfg(test)]
/// Prompt used across tests
pub const TEST_PROMPT: &str = "rainy cyberpunk city";
