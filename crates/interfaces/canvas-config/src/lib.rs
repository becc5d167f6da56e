//! Central configuration constants for runtime limits and defaults.

/// Canvas REST API root used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://canvas.nus.edu.sg/api/v1";

/// Requested page size for listing endpoints. Canvas caps `per_page` at 100.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Maximum page size Canvas honours.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Total attempts (original name plus `_v2`.. suffixes) when a download
/// collides with existing local files.
pub const DEFAULT_WRITE_RETRY_LIMIT: u32 = 10;

/// Minimum allowed write attempts.
pub const MIN_WRITE_RETRY_LIMIT: u32 = 1;

/// Maximum allowed write attempts.
pub const MAX_WRITE_RETRY_LIMIT: u32 = 100;

/// Default outbound request budget (requests per second).
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;

/// Connect timeout for the HTTP client, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Longest the HTTP client waits between reads, in seconds. There is no
/// ceiling on a whole transfer, so slow downloads of large recordings finish
/// as long as bytes keep arriving.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 60;

/// Environment variable holding the Canvas access token.
pub const TOKEN_ENV: &str = "CANVAS_TOKEN";

/// Environment variable overriding the Canvas API root.
pub const BASE_URL_ENV: &str = "CANVAS_BASE_URL";

/// Clamp a page size into the range Canvas accepts.
pub fn clamp_page_size(v: u32) -> u32 {
    v.clamp(1, MAX_PAGE_SIZE)
}

/// Clamp a write retry limit into the allowed range.
pub fn clamp_retry_limit(v: u32) -> u32 {
    v.clamp(MIN_WRITE_RETRY_LIMIT, MAX_WRITE_RETRY_LIMIT)
}
