//! Configuration-backed operator credential check.
//!
//! The operator password is configured as an Argon2 PHC string read from a
//! file; plaintext passwords never reach the settings.

use std::path::Path;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use async_trait::async_trait;
use tracing::warn;

use crate::domain::LoginCredentials;
use crate::domain::ports::CredentialVerifier;

#[derive(Clone)]
struct Operator {
    username: String,
    password_hash: String,
}

/// Verifier holding the single operator configured at startup.
///
/// With no operator configured, or an unparsable hash, every login is
/// rejected.
///
/// # Examples
/// ```
/// use argon2::password_hash::{PasswordHasher, SaltString};
/// use argon2::Argon2;
/// use lotkeeper::domain::LoginCredentials;
/// use lotkeeper::domain::ports::CredentialVerifier;
/// use lotkeeper::outbound::credentials::ConfiguredCredentialVerifier;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let salt = SaltString::encode_b64(b"lotkeeper-docs16").unwrap();
/// let hash = Argon2::default().hash_password(b"gate-7", &salt).unwrap().to_string();
/// let verifier = ConfiguredCredentialVerifier::new(Some("attendant"), Some(&hash));
/// let creds = LoginCredentials::try_from_parts("attendant", "gate-7").unwrap();
/// assert!(verifier.verify(&creds).await);
/// # });
/// ```
#[derive(Clone, Default)]
pub struct ConfiguredCredentialVerifier {
    operator: Option<Operator>,
}

impl ConfiguredCredentialVerifier {
    /// Build from the configured username and password hash.
    ///
    /// A blank username or a hash that is not a valid PHC string counts as
    /// unconfigured.
    pub fn new(username: Option<&str>, password_hash: Option<&str>) -> Self {
        let operator = match (username.map(str::trim), password_hash.map(str::trim)) {
            (Some(user), Some(hash)) if !user.is_empty() => match PasswordHash::new(hash) {
                Ok(_) => Some(Operator {
                    username: user.to_owned(),
                    password_hash: hash.to_owned(),
                }),
                Err(e) => {
                    warn!(error = %e, "operator password hash is not a valid PHC string");
                    None
                }
            },
            _ => None,
        };
        if operator.is_none() {
            warn!("no operator credentials configured; every login will be rejected");
        }
        Self { operator }
    }

    /// Build from a username and a file holding the PHC string.
    ///
    /// Surrounding whitespace in the file is ignored. No file means no
    /// operator; an unreadable file is an error.
    pub fn from_hash_file(
        username: Option<&str>,
        hash_file: Option<&Path>,
    ) -> std::io::Result<Self> {
        let hash = hash_file.map(std::fs::read_to_string).transpose()?;
        Ok(Self::new(username, hash.as_deref()))
    }

    /// Whether an operator pair is configured.
    pub fn is_configured(&self) -> bool {
        self.operator.is_some()
    }
}

#[async_trait]
impl CredentialVerifier for ConfiguredCredentialVerifier {
    async fn verify(&self, credentials: &LoginCredentials) -> bool {
        let Some(operator) = &self.operator else {
            return false;
        };
        let Ok(parsed) = PasswordHash::new(&operator.password_hash) else {
            return false;
        };
        // Hash even on a username mismatch so both paths cost the same.
        let password_ok = Argon2::default()
            .verify_password(credentials.password().as_bytes(), &parsed)
            .is_ok();
        password_ok && credentials.username() == operator.username
    }
}
