//! HTTP Basic authentication middleware

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::client::Credentials;

/// Authentication middleware
///
/// Requires Basic credentials and stores them as a request extension; the
/// workload hands them on to every database session of an added target.
pub async fn basic_auth(mut request: Request<Body>, next: Next) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let credentials = parse_basic(auth_header)?;
    request.extensions_mut().insert(credentials);

    Ok(next.run(request).await)
}

fn parse_basic(header: &str) -> Result<Credentials, AuthError> {
    let encoded = header
        .strip_prefix("Basic ")
        .ok_or(AuthError::InvalidFormat)?;

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| AuthError::InvalidFormat)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::InvalidFormat)?;

    let (username, password) = decoded.split_once(':').ok_or(AuthError::InvalidFormat)?;

    Ok(Credentials::new(username, password))
}

/// Authentication errors
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingCredentials,
    InvalidFormat,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingCredentials => "No basic authentication information provided",
            AuthError::InvalidFormat => {
                "Invalid Authorization format (expected: Basic <base64 user:password>)"
            }
        };

        (StatusCode::UNAUTHORIZED, message).into_response()
    }
}
