//! Request identity extraction
//!
//! The gateway in front of this service authenticates users and forwards
//! their identity in headers. This extractor reads those headers; it
//! never authenticates anything itself.

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use pawspa_core::AppError;
use pawspa_services::Actor;
use std::future::{ready, Ready};

/// Identity forwarded by the upstream gateway.
///
/// `X-User-Id` is optional for staff routes (front-desk terminals share
/// an account in some deployments) but required for customer routes.
#[derive(Debug, Clone)]
pub struct ActorIdentity {
    pub user_id: Option<i32>,
    pub name: String,
    pub role: String,
}

impl ActorIdentity {
    /// Convert to the services-layer actor
    pub fn into_actor(self) -> Actor {
        Actor {
            user_id: self.user_id,
            name: self.name,
            role: self.role,
        }
    }

    /// The user id, or a 400 when the gateway did not forward one
    pub fn require_user_id(&self) -> Result<i32, AppError> {
        self.user_id
            .ok_or_else(|| AppError::MissingField("X-User-Id".to_string()))
    }
}

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl FromRequest for ActorIdentity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user_id = match header_value(req, "X-User-Id") {
            Some(raw) => match raw.parse::<i32>() {
                Ok(id) => Some(id),
                Err(_) => {
                    return ready(Err(AppError::InvalidInput(
                        "X-User-Id must be an integer".to_string(),
                    )))
                }
            },
            None => None,
        };

        let name = header_value(req, "X-User-Name").unwrap_or_else(|| "staff".to_string());
        let role = header_value(req, "X-User-Role").unwrap_or_else(|| "staff".to_string());

        ready(Ok(ActorIdentity {
            user_id,
            name,
            role,
        }))
    }
}
