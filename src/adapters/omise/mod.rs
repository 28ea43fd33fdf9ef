//! Omise payment provider adapter.
//!
//! Implements the `EventVerifier` port against the Omise events API:
//! webhook payloads name an event id, and this adapter fetches the
//! authoritative event body for that id.
//!
//! # Security
//!
//! - Lookups authenticate with the secret key over HTTP basic auth
//! - Secrets are handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! Required environment variables:
//! - `OMISE_SECRET_KEY`: Omise secret API key (skey_...)
//! - `OMISE_API_BASE_URL`: optional API base override

mod omise_adapter;

pub use omise_adapter::{OmiseConfig, OmiseEventVerifier};
