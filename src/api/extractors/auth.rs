use axum::{
    extract::{FromRequestParts, FromRef},
    http::{request::Parts, StatusCode},
};
use crate::state::AppState;
use std::sync::Arc;
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};
use serde::Deserialize;
use tracing::Span;

const AUDIENCE: &str = "fitcore-clients";

// exp, aud and iss are checked by the validation itself; only the subject
// is carried forward.
#[derive(Deserialize)]
struct Claims {
    sub: String,
}

// Access tokens are minted by the identity service; this service only
// verifies them against the published Ed25519 key.
pub struct AuthUser(pub String);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let access_token = parts.headers.get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let decoding_key = DecodingKey::from_ed_pem(app_state.config.jwt_public_key.as_bytes())
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_audience(&[AUDIENCE]);
        validation.set_issuer(&[&app_state.config.auth_issuer]);

        let token_data = decode::<Claims>(access_token, &decoding_key, &validation)
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        let user_id = token_data.claims.sub;
        Span::current().record("user_id", &user_id);

        Ok(AuthUser(user_id))
    }
}
