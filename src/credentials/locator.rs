//! Credential discovery across the known cookie stores.
//!
//! Sources are tried strictly in priority order and the search stops at
//! the first store that yields either cookie. Every failure mode
//! (missing file, locked database, missing keychain item, failed
//! decryption) degrades to "try the next source"; only total exhaustion
//! is reported, as `None`.

use super::cookie_db::{self, CookieRow};
use super::crypto;
use super::keychain::{Keychain, SecretStore};
use super::sources;
use super::types::{CookieSource, Credential};

pub struct CredentialLocator<S: SecretStore = Keychain> {
    secrets: S,
    sources: Vec<CookieSource>,
}

impl CredentialLocator {
    /// Locator over the default source list, unlocked via the Keychain.
    pub fn new() -> Self {
        Self::with_sources(Keychain, sources::default_sources())
    }
}

impl Default for CredentialLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SecretStore> CredentialLocator<S> {
    pub fn with_sources(secrets: S, sources: Vec<CookieSource>) -> Self {
        Self { secrets, sources }
    }

    /// Search all sources for the claude.ai session cookies.
    ///
    /// Returns the first source's data without falling through to
    /// lower-priority stores, possibly with one field unset. Never
    /// returns an error; discovery misses are absorbed and logged.
    pub fn discover(&self) -> Option<Credential> {
        for source in &self.sources {
            if let Some(credential) = self.extract_from_source(source) {
                log::debug!("Found Claude credentials in {}", source.label);
                return Some(credential);
            }
        }
        log::debug!("No Claude session cookies found in any known store");
        None
    }

    fn extract_from_source(&self, source: &CookieSource) -> Option<Credential> {
        let db_path = source.db_paths.iter().find(|path| path.exists())?;

        let rows = match cookie_db::read_cookie_rows(
            db_path,
            sources::COOKIE_HOST_PATTERN,
            &[sources::SESSION_COOKIE, sources::ORGANIZATION_COOKIE],
        ) {
            Ok(rows) => rows,
            Err(e) => {
                log::warn!("Skipping {}: {e}", source.label);
                return None;
            }
        };

        // Outer None: key not fetched yet. Inner None: fetch failed, do
        // not retry for the other cookie.
        let mut derived_key: Option<Option<[u8; 16]>> = None;
        let mut session_key = None;
        let mut organization_id = None;

        for row in rows {
            let Some(value) = self.resolve_cookie(source, &row, &mut derived_key) else {
                continue;
            };
            if row.name == sources::SESSION_COOKIE {
                session_key = Some(value);
            } else if row.name == sources::ORGANIZATION_COOKIE {
                organization_id = Some(value);
            }
        }

        if session_key.is_none() && organization_id.is_none() {
            return None;
        }
        Some(Credential {
            organization_id,
            session_key,
            source: source.label.clone(),
        })
    }

    fn resolve_cookie(
        &self,
        source: &CookieSource,
        row: &CookieRow,
        derived_key: &mut Option<Option<[u8; 16]>>,
    ) -> Option<String> {
        // Plaintext column wins when present.
        if let Some(value) = row.value.as_deref() {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }

        let encrypted = row.encrypted_value.as_deref().filter(|v| !v.is_empty())?;

        if derived_key.is_none() {
            *derived_key = Some(
                self.fetch_master_key(source)
                    .map(|master| crypto::derive_cookie_key(&master)),
            );
        }
        let key = derived_key.as_ref()?.as_ref()?;

        let value = crypto::decrypt_cookie_value(encrypted, key, &row.host_key);
        if value.is_none() {
            log::debug!("Could not decrypt {} cookie from {}", row.name, source.label);
        }
        value
    }

    /// Refetched on every discovery attempt; the key can rotate when
    /// the keychain is reset.
    fn fetch_master_key(&self, source: &CookieSource) -> Option<Vec<u8>> {
        for (service, account) in &source.secret_candidates {
            if let Some(secret) = self.secrets.lookup(service, account) {
                return Some(secret);
            }
        }
        log::debug!("No safe-storage secret found for {}", source.label);
        None
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::PathBuf;

    use super::*;
    use crate::credentials::cookie_db::write_fixture_db;

    /// In-memory secret store that records every lookup.
    #[derive(Default)]
    struct FakeSecrets {
        secrets: HashMap<(String, String), Vec<u8>>,
        lookups: RefCell<Vec<String>>,
    }

    impl FakeSecrets {
        fn with(service: &str, account: &str, secret: &[u8]) -> Self {
            let mut secrets = HashMap::new();
            secrets.insert((service.to_string(), account.to_string()), secret.to_vec());
            Self {
                secrets,
                lookups: RefCell::new(Vec::new()),
            }
        }
    }

    impl SecretStore for FakeSecrets {
        fn lookup(&self, service: &str, account: &str) -> Option<Vec<u8>> {
            self.lookups.borrow_mut().push(service.to_string());
            self.secrets
                .get(&(service.to_string(), account.to_string()))
                .cloned()
        }
    }

    fn plain_source(dir: &std::path::Path, label: &str, rows: &[(i64, &str, &str, &str, &[u8])]) -> CookieSource {
        let db = dir.join(format!("{label}-Cookies"));
        write_fixture_db(&db, rows);
        CookieSource {
            label: label.to_string(),
            db_paths: vec![db],
            secret_candidates: vec![("Test Safe Storage".to_string(), "Test".to_string())],
        }
    }

    #[test]
    fn test_plaintext_cookies_need_no_keychain() {
        let dir = tempfile::tempdir().unwrap();
        let source = plain_source(
            dir.path(),
            "Claude Desktop",
            &[
                (1, ".claude.ai", sources::SESSION_COOKIE, "sk-plain", b""),
                (1, ".claude.ai", sources::ORGANIZATION_COOKIE, "org-42", b""),
            ],
        );
        let secrets = FakeSecrets::default();
        let locator = CredentialLocator::with_sources(secrets, vec![source]);

        let credential = locator.discover().unwrap();
        assert_eq!(credential.session_key.as_deref(), Some("sk-plain"));
        assert_eq!(credential.organization_id.as_deref(), Some("org-42"));
        assert_eq!(credential.source, "Claude Desktop");
        assert!(credential.is_complete());
        assert!(locator.secrets.lookups.borrow().is_empty());
    }

    #[test]
    fn test_first_source_wins_and_later_sources_are_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let desktop = plain_source(
            dir.path(),
            "Claude Desktop",
            &[(1, ".claude.ai", sources::SESSION_COOKIE, "sk-desktop", b"")],
        );
        // The browser store holds an encrypted cookie; touching it would
        // show up as a keychain lookup.
        let key = crypto::derive_cookie_key(b"browser-secret");
        let encrypted = crypto::encrypt_v10_cbc(b"sk-browser", &key);
        let browser = plain_source(
            dir.path(),
            "Chrome",
            &[(1, ".claude.ai", sources::SESSION_COOKIE, "", &encrypted)],
        );

        let secrets = FakeSecrets::with("Chrome Safe Storage", "Chrome", b"browser-secret");
        let locator = CredentialLocator::with_sources(secrets, vec![desktop, browser]);

        let credential = locator.discover().unwrap();
        assert_eq!(credential.source, "Claude Desktop");
        assert_eq!(credential.session_key.as_deref(), Some("sk-desktop"));
        assert!(locator.secrets.lookups.borrow().is_empty());
    }

    #[test]
    fn test_encrypted_cookies_are_decrypted_via_secret_store() {
        let dir = tempfile::tempdir().unwrap();
        let key = crypto::derive_cookie_key(b"safe-storage-secret");
        let session = crypto::encrypt_v10_cbc(b"sk-encrypted", &key);
        let org = crypto::encrypt_v10_gcm(b"org-99", &key, &[3; 12]);
        let source = CookieSource {
            label: "Chrome".to_string(),
            db_paths: vec![{
                let db = dir.path().join("Cookies");
                write_fixture_db(
                    &db,
                    &[
                        (1, ".claude.ai", sources::SESSION_COOKIE, "", &session),
                        (1, ".claude.ai", sources::ORGANIZATION_COOKIE, "", &org),
                    ],
                );
                db
            }],
            secret_candidates: vec![
                ("Chrome Safe Storage".to_string(), "Chrome".to_string()),
                ("Chromium Safe Storage".to_string(), "Chromium".to_string()),
            ],
        };

        let secrets = FakeSecrets::with("Chrome Safe Storage", "Chrome", b"safe-storage-secret");
        let locator = CredentialLocator::with_sources(secrets, vec![source]);

        let credential = locator.discover().unwrap();
        assert_eq!(credential.session_key.as_deref(), Some("sk-encrypted"));
        assert_eq!(credential.organization_id.as_deref(), Some("org-99"));
        // One fetch per source, not one per cookie.
        assert_eq!(locator.secrets.lookups.borrow().len(), 1);
    }

    #[test]
    fn test_partial_credential_still_returned() {
        let dir = tempfile::tempdir().unwrap();
        let source = plain_source(
            dir.path(),
            "Brave",
            &[(1, ".claude.ai", sources::SESSION_COOKIE, "sk-only", b"")],
        );
        let locator = CredentialLocator::with_sources(FakeSecrets::default(), vec![source]);

        let credential = locator.discover().unwrap();
        assert_eq!(credential.session_key.as_deref(), Some("sk-only"));
        assert_eq!(credential.organization_id, None);
        assert!(!credential.is_complete());
    }

    #[test]
    fn test_failed_decryption_falls_through_to_next_source() {
        let dir = tempfile::tempdir().unwrap();
        let key = crypto::derive_cookie_key(b"real-secret");
        let encrypted = crypto::encrypt_v10_cbc(b"sk-unreachable", &key);
        let locked = plain_source(
            dir.path(),
            "Chrome",
            &[(1, ".claude.ai", sources::SESSION_COOKIE, "", &encrypted)],
        );
        let fallback = plain_source(
            dir.path(),
            "Brave",
            &[(1, ".claude.ai", sources::SESSION_COOKIE, "sk-fallback", b"")],
        );

        // No keychain entry for Chrome: decryption cannot even start.
        let locator = CredentialLocator::with_sources(FakeSecrets::default(), vec![locked, fallback]);

        let credential = locator.discover().unwrap();
        assert_eq!(credential.source, "Brave");
        assert_eq!(credential.session_key.as_deref(), Some("sk-fallback"));
    }

    #[test]
    fn test_missing_databases_yield_none() {
        let source = CookieSource {
            label: "Chrome".to_string(),
            db_paths: vec![PathBuf::from("/nonexistent/profile/Cookies")],
            secret_candidates: Vec::new(),
        };
        let locator = CredentialLocator::with_sources(FakeSecrets::default(), vec![source]);
        assert!(locator.discover().is_none());
    }

    #[test]
    fn test_unreadable_database_yields_none_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("Cookies");
        std::fs::write(&db, b"garbage").unwrap();
        let source = CookieSource {
            label: "Chrome".to_string(),
            db_paths: vec![db],
            secret_candidates: Vec::new(),
        };
        let locator = CredentialLocator::with_sources(FakeSecrets::default(), vec![source]);
        assert!(locator.discover().is_none());
    }
}
