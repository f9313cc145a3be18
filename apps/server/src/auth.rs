use std::sync::Arc;
use std::time::Duration;

use argon2::{
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        request::Parts,
        HeaderValue, Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use cybersentinel_core::constants::ONE_TIME_TOKEN_MINUTES;
use cybersentinel_core::errors::{Error as CoreError, Result as CoreResult};
use cybersentinel_core::users::{CredentialHasher, User};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::main_lib::AppState;

const MIN_SECRET_BYTES: usize = 32;

/// Argon2id password hashing for stored credentials.
#[derive(Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash_password(&self, password: &str) -> CoreResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CoreError::Unexpected(format!("Failed to hash password: {e}")))
    }

    fn verify_password(&self, password: &str, hashed: &str) -> CoreResult<bool> {
        let Ok(parsed) = PasswordHash::new(hashed) else {
            return Ok(false);
        };
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(other) => Err(CoreError::Unexpected(format!(
                "Password verification failed: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
    Reset,
    Magic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user's email.
    pub sub: String,
    pub user_id: String,
    pub typ: TokenType,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug)]
pub enum AuthError {
    Unauthorized,
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Could not validate credentials".to_string(),
            ),
            AuthError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
        };
        let mut response = (status, Json(AuthErrorBody { code, message })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl AuthManager {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    fn ttl(&self, typ: TokenType) -> Duration {
        match typ {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
            TokenType::Reset | TokenType::Magic => {
                Duration::from_secs(ONE_TIME_TOKEN_MINUTES as u64 * 60)
            }
        }
    }

    pub fn issue_token(&self, user: &User, typ: TokenType) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.email.clone(),
            user_id: user.id.clone(),
            typ,
            iat: now,
            exp: now + self.ttl(typ).as_secs() as i64,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Decodes the token and checks that it is of the expected type.
    pub fn validate_token(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!("Rejected token: {err}");
                AuthError::Unauthorized
            })?;
        if claims.typ != expected {
            return Err(AuthError::Unauthorized);
        }
        Ok(claims)
    }
}

/// Accepts a base64 secret that decodes to at least 32 bytes, or a raw
/// string of at least 32 bytes.
pub fn decode_secret_key(raw: &str) -> anyhow::Result<Vec<u8>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("JWT secret cannot be empty");
    }
    match BASE64.decode(trimmed) {
        Ok(bytes) if bytes.len() >= MIN_SECRET_BYTES => Ok(bytes),
        _ if trimmed.len() >= MIN_SECRET_BYTES => Ok(trimmed.as_bytes().to_vec()),
        _ => anyhow::bail!("JWT secret must be at least 32 bytes (raw or base64 encoded)"),
    }
}

fn bearer_token(request: &Request<Body>) -> Option<&str> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

/// Rejects requests without a valid access token and stores its claims in
/// the request extensions.
pub async fn require_jwt(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(&request).ok_or(AuthError::Unauthorized)?;
    let claims = state.auth.validate_token(token, TokenType::Access)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// The authenticated caller, loaded fresh from the database.
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .ok_or_else(|| ApiError::Unauthorized("Could not validate credentials".into()))?;
        match state.user_service.get_user(&claims.user_id) {
            Ok(user) => Ok(CurrentUser(user)),
            Err(e) if e.is_not_found() => Err(ApiError::NotFound("User not found".into())),
            Err(e) => Err(e.into()),
        }
    }
}
