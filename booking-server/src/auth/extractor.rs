//! JWT Extractor
//!
//! Validates the bearer token and yields the [`CurrentActor`]

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{CurrentActor, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

impl FromRequestParts<ServerState> for CurrentActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(actor) = parts.extensions.get::<CurrentActor>() {
            return Ok(actor.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => JwtService::extract_from_header(header)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
            None => {
                security_log!(WARN, "auth_missing", uri = %parts.uri);
                return Err(AppError::not_authenticated());
            }
        };

        let result = state
            .jwt_service()
            .validate_token(token)
            .and_then(CurrentActor::try_from);

        match result {
            Ok(actor) => {
                parts.extensions.insert(actor.clone());
                Ok(actor)
            }
            Err(e) => {
                security_log!(WARN, "auth_failed", error = %e, uri = %parts.uri);
                match e {
                    JwtError::ExpiredToken => Err(AppError::token_expired()),
                    JwtError::ForbiddenRole(_) => {
                        Err(AppError::invalid_token("Role not accepted"))
                    }
                    _ => Err(AppError::invalid_token("Invalid token")),
                }
            }
        }
    }
}
