//! JWT authentication middleware

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::infrastructure::crypto::{JwtConfig, TokenClaims};

#[derive(Clone)]
pub struct AuthState {
    pub jwt: JwtConfig,
}

/// Identity attached to the request after successful authentication.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub role: String,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(String::from);

    let Some(auth_header) = auth_header else {
        return auth_error("Missing authentication token");
    };

    let Some(token) = extract_token(&auth_header) else {
        return auth_error("Invalid authentication token");
    };

    match auth_state.jwt.verify_token(token) {
        Ok(claims) => {
            request
                .extensions_mut()
                .insert(AuthenticatedUser::from_claims(claims));
            next.run(request).await
        }
        Err(_) => auth_error("Invalid authentication token"),
    }
}

fn auth_error(message: &str) -> Response {
    let body = Json(json!({
        "success": false,
        "error": message
    }));
    (StatusCode::UNAUTHORIZED, body).into_response()
}
