//! Typed client for the claude.ai web API
//!
//! Provides the pieces the menu-bar controller composes:
//! - Authenticated request plumbing (session cookie + fixed headers)
//! - Usage polling (5-hour and 7-day windows)
//! - The two-step sequence that forces a new quota window

pub mod client;
pub mod quota;
pub mod sse;
pub mod types;
pub mod usage;

pub use client::{ApiClient, ApiError, DEFAULT_BASE_URL};
pub use usage::UsageSnapshot;
