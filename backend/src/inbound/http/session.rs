//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix cookie session so handlers only persist, read or clear
//! the signed-in operator.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::Error;

pub(crate) const OPERATOR_KEY: &str = "operator";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the signed-in operator and rotate the session id.
    pub fn persist_operator(&self, username: &str) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(OPERATOR_KEY, username)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Current operator name, if signed in.
    pub fn operator(&self) -> Result<Option<String>, Error> {
        let name = self
            .0
            .get::<String>(OPERATOR_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(name.filter(|name| !name.trim().is_empty()))
    }

    /// Require a signed-in operator or return `401 Unauthorized`.
    pub fn require_operator(&self) -> Result<String, Error> {
        self.operator()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop every value and expire the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
