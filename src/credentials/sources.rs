//! Known cookie-store locations for the desktop app and browsers

use std::path::Path;

use super::types::CookieSource;

/// Cookie holding the claude.ai session token
pub const SESSION_COOKIE: &str = "sessionKey";

/// Cookie holding the most recently active organization id
pub const ORGANIZATION_COOKIE: &str = "lastActiveOrg";

/// `host_key` LIKE pattern; tolerates the leading-dot domain variant
pub const COOKIE_HOST_PATTERN: &str = "%claude.ai";

/// Generic Chromium safe-storage identity, tried after the vendor one
const CHROMIUM_FALLBACK: (&str, &str) = ("Chromium Safe Storage", "Chromium");

/// Cookie stores to search, in priority order: the Claude desktop app
/// first, then the known browsers. Discovery stops at the first store
/// that yields either cookie.
pub fn default_sources() -> Vec<CookieSource> {
    let Some(home) = dirs::home_dir() else {
        log::warn!("Could not determine home directory; no cookie stores to search");
        return Vec::new();
    };
    let app_support = home.join("Library/Application Support");

    vec![
        source(
            "Claude Desktop",
            &app_support,
            "Claude",
            ("Claude Safe Storage", "Claude"),
        ),
        source(
            "Chrome",
            &app_support,
            "Google/Chrome/Default",
            ("Chrome Safe Storage", "Chrome"),
        ),
        source(
            "Brave",
            &app_support,
            "BraveSoftware/Brave-Browser/Default",
            ("Brave Safe Storage", "Brave"),
        ),
        source(
            "Edge",
            &app_support,
            "Microsoft Edge/Default",
            ("Microsoft Edge Safe Storage", "Microsoft Edge"),
        ),
    ]
}

fn source(
    label: &str,
    app_support: &Path,
    profile_dir: &str,
    keychain: (&str, &str),
) -> CookieSource {
    let profile = app_support.join(profile_dir);
    CookieSource {
        label: label.to_string(),
        // Newer Chromium keeps the database under Network/; older layouts
        // have it directly in the profile.
        db_paths: vec![profile.join("Network/Cookies"), profile.join("Cookies")],
        secret_candidates: vec![
            (keychain.0.to_string(), keychain.1.to_string()),
            (CHROMIUM_FALLBACK.0.to_string(), CHROMIUM_FALLBACK.1.to_string()),
        ],
    }
}
