use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Claude session credentials recovered from a local cookie store.
///
/// Either field may be absent when only one of the two cookies could be
/// found or decrypted. Persistence is the caller's job; this value is
/// produced fresh on every discovery attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Organization id from the `lastActiveOrg` cookie
    pub organization_id: Option<String>,
    /// Session token from the `sessionKey` cookie
    pub session_key: Option<String>,
    /// Label of the store the data came from (e.g. "Claude Desktop")
    pub source: String,
}

impl Credential {
    /// True when both the organization id and the session key are present.
    pub fn is_complete(&self) -> bool {
        self.organization_id.is_some() && self.session_key.is_some()
    }
}

/// One application's cookie store and how to unlock it.
#[derive(Debug, Clone)]
pub struct CookieSource {
    /// Display name, also recorded on the resulting [`Credential`]
    pub label: String,
    /// Candidate database locations; the first existing path is used
    pub db_paths: Vec<PathBuf>,
    /// Keychain (service, account) pairs to try, in priority order
    pub secret_candidates: Vec<(String, String)>,
}
