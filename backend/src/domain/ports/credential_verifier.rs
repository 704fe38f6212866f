//! Driven port for checking operator credentials.
//!
//! Inbound adapters call this after payload validation so handler tests can
//! substitute a double instead of wiring configuration.

use async_trait::async_trait;

use crate::domain::LoginCredentials;

/// Checks whether credentials belong to a lot operator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// `true` when the credentials match a configured operator.
    async fn verify(&self, credentials: &LoginCredentials) -> bool;
}

/// Verifier that accepts one fixed pair; used by handler tests.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCredentialVerifier;

#[cfg(any(test, feature = "test-support"))]
impl FixtureCredentialVerifier {
    pub const USERNAME: &'static str = "operator";
    pub const PASSWORD: &'static str = "password";
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl CredentialVerifier for FixtureCredentialVerifier {
    async fn verify(&self, credentials: &LoginCredentials) -> bool {
        credentials.username() == Self::USERNAME && credentials.password() == Self::PASSWORD
    }
}
