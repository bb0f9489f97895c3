//! Core library for Halo, a macOS menu-bar utility that shows Claude
//! account usage as a percentage ring.
//!
//! Two independent components do the real work:
//! - [`credentials`] finds the claude.ai session cookies in the desktop
//!   app's and known browsers' cookie stores, decrypting them with the
//!   per-application safe-storage key when needed.
//! - [`api`] is a typed claude.ai client: usage polling, plus the
//!   two-step sequence that forces a new quota window when usage
//!   reports none is open.
//!
//! The menu-bar shell (status item, icon drawing, settings window,
//! launch agent) lives in the app target and composes these pieces.

pub mod api;
pub mod credentials;
pub mod settings;

pub use api::{ApiClient, ApiError, UsageSnapshot};
pub use credentials::{Credential, CredentialLocator};
pub use settings::Settings;
