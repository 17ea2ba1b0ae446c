//! Shared User-Agent string for API and content HTTP clients.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/gdown";

/// Default User-Agent for every request issued by the crate.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("gdown/{version} (drive-downloader; +{PROJECT_UA_URL})")
}
