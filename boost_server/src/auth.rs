//! Access token handling.
//!
//! Users sign in with the external identity provider, which issues HS256-signed JWTs using a secret shared with this
//! server. The server never issues tokens itself; it only verifies them and extracts the [`JwtClaims`].
use std::future::{ready, Ready};

use actix_web::{
    dev::Payload,
    http::header::{HeaderMap, AUTHORIZATION},
    web,
    FromRequest,
    HttpMessage,
    HttpRequest,
};
use boost_engine::db_types::{Actor, Role, UserId};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

/// The header that may carry the access token when an `Authorization` header cannot be used.
pub const ACCESS_TOKEN_HEADER: &str = "bm_access_token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The user id assigned by the identity provider
    pub sub: String,
    /// Expiry, in seconds since the Unix epoch
    pub exp: i64,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl JwtClaims {
    pub fn has_role(&self, role: Role) -> bool {
        let role = role.to_string();
        self.roles.iter().any(|r| r == &role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    pub fn user_id(&self) -> UserId {
        UserId::from(self.sub.as_str())
    }

    pub fn actor(&self) -> Actor {
        if self.is_admin() {
            Actor::admin(self.user_id())
        } else {
            Actor::user(self.user_id())
        }
    }
}

pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self { key, validation }
    }

    /// Checks the token's signature and expiry, returning the claims it carries.
    pub fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ValidationError("The access token has expired".into()),
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                AuthError::PoorlyFormattedToken(e.to_string())
            },
            _ => AuthError::ValidationError(e.to_string()),
        })?;
        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::ValidationError("The access token has no subject".into()));
        }
        Ok(data.claims)
    }
}

/// Reads the raw access token from the `Authorization: Bearer` header, or failing that, the `bm_access_token` header.
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let value = value.to_str().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        return value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected a Bearer token".into()));
    }
    match headers.get(ACCESS_TOKEN_HEADER) {
        Some(value) => value.to_str().map(str::trim).map_err(|e| AuthError::PoorlyFormattedToken(e.to_string())),
        None => Err(AuthError::MissingToken),
    }
}

/// Verifies the token in the request headers with the verifier registered as app data.
pub fn verify_headers(
    verifier: Option<&web::Data<TokenVerifier>>,
    headers: &HeaderMap,
) -> Result<JwtClaims, ServerError> {
    let verifier = verifier.ok_or_else(|| {
        error!("💻️ No token verifier has been registered with the server");
        ServerError::ConfigurationError("Access tokens cannot be verified".into())
    })?;
    let token = extract_token(headers)?;
    let claims = verifier.verify(token).map_err(|e| {
        debug!("💻️ Rejected access token. {e}");
        e
    })?;
    trace!("💻️ Access token verified for {}", claims.sub);
    Ok(claims)
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // The ACL middleware may already have done the work
        if let Some(claims) = req.extensions().get::<JwtClaims>() {
            return ready(Ok(claims.clone()));
        }
        ready(verify_headers(req.app_data::<web::Data<TokenVerifier>>(), req.headers()))
    }
}
