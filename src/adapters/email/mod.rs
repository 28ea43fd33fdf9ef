//! Transactional email adapter.
//!
//! Implements the `WelcomeNotifier` port over the Resend HTTP API.
//!
//! # Configuration
//!
//! Required environment variables:
//! - `RESEND_API_KEY`: Resend API key (re_...)

mod resend_adapter;

pub use resend_adapter::{ResendConfig, ResendNotifier};
