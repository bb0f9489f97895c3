//! Claude credential discovery
//!
//! Finds the claude.ai session cookies in local cookie stores:
//! - Source table for the desktop app and known browsers
//! - Copy-then-read SQLite snapshots (never touches the live database)
//! - Safe-storage key retrieval from the Keychain
//! - `v10` cookie decryption (AES-128-CBC, then AES-128-GCM)

pub mod cookie_db;
pub mod crypto;
pub mod keychain;
pub mod locator;
pub mod sources;
pub mod types;

pub use keychain::{Keychain, SecretStore};
pub use locator::CredentialLocator;
pub use types::{CookieSource, Credential};
