//! Credential lifecycle for the Smart Device Management API.
//!
//! [`SecretStore`] reads and writes the individual secret files.
//! [`TokenManager`] keeps the access token fresh using the OAuth2
//! refresh-token grant.

pub mod error;
pub mod manager;
pub mod storage;
pub mod types;

pub use {
    error::{AuthError, Unavailable},
    manager::{ErrorReporter, NoopReporter, TokenManager, TokenStatus},
    storage::SecretStore,
    types::{Lifetime, Secret, SecretKind, Timing},
};
