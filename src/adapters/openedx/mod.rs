//! Open edX LMS adapter.
//!
//! Implements the `IdentityProvider` and `EnrollmentProvider` ports for
//! an Open edX instance:
//! - Account lookup and registration via the user API
//! - Course enrollment via the enrollment API
//!
//! # Configuration
//!
//! Required environment variables:
//! - `OPENEDX_BASE_URL`: LMS base URL
//! - `OPENEDX_API_TOKEN`: API token with account and enrollment scopes

mod openedx_adapter;

pub use openedx_adapter::{OpenEdxAdapter, OpenEdxConfig};
