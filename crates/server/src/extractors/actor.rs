//! Who is calling, as asserted by the identity layer in front of the service.
//!
//! The actor id is the `sub` claim of a validated bearer token when one is
//! present, otherwise `x-actor-id`. The role comes from `x-actor-role`.

use crate::error::ApiError;
use axum::{extract::FromRequestParts, http::request::Parts};
use database::error::ServiceError;
use models::publication::Role;
use std::str::FromStr;
use tower_oauth2_resource_server::claims::DefaultClaims;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// An identified caller. Rejects the request when nobody is named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn require_coordinator(&self) -> Result<(), ApiError> {
        match self.role {
            Role::Coordinator => Ok(()),
            _ => Err(ServiceError::Forbidden(format!(
                "{} may not edit timetables",
                self.role
            ))
            .into()),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let role = role_of(parts)?;
        let id = match parts.extensions.get::<DefaultClaims>() {
            // A token without a subject names nobody, whatever the headers say
            Some(claims) => claims.sub.clone().filter(|sub| !sub.is_empty()),
            None => header(parts, ACTOR_ID_HEADER),
        }
        .ok_or(ServiceError::Unauthorized)?;

        Ok(Self { id, role })
    }
}

/// The role of a possibly anonymous reader. Anonymous callers read as students.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer(pub Role);

impl<S: Send + Sync> FromRequestParts<S> for Viewer {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(role_of(parts)?))
    }
}

fn header(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn role_of(parts: &Parts) -> Result<Role, ApiError> {
    match header(parts, ACTOR_ROLE_HEADER) {
        None => Ok(Role::default()),
        Some(role) => Role::from_str(&role)
            .map_err(|_| ServiceError::Validation(format!("unknown role: {role}")).into()),
    }
}
