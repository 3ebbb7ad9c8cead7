use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::database::models::User;

/// Claims carried by an identity token: the user id plus the display fields
/// handlers need without a second lookup.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub name: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i64, email: String, name: String) -> Self {
        let now = Utc::now();
        let security = &config::config().security;
        let exp = (now + Duration::minutes(security.jwt_expiry_minutes as i64)).timestamp();

        Self {
            sub: user_id,
            email,
            name,
            iss: security.jwt_issuer.clone(),
            aud: security.jwt_audience.clone(),
            iat: now.timestamp(),
            exp,
        }
    }
}

#[derive(Debug)]
pub enum AuthError {
    TokenGeneration(String),
    InvalidToken,
    InvalidSecret,
    Hashing(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::TokenGeneration(msg) => write!(f, "token generation error: {}", msg),
            AuthError::InvalidToken => write!(f, "invalid token"),
            AuthError::InvalidSecret => write!(f, "invalid JWT secret"),
            AuthError::Hashing(msg) => write!(f, "password hashing error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// Issue a signed identity token for a user.
pub fn issue_token(user: &User) -> Result<String, AuthError> {
    let claims = Claims::new(user.id, user.email.clone(), user.display_name());
    sign_claims(&claims)
}

fn sign_claims(claims: &Claims) -> Result<String, AuthError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Verify a token's signature, issuer, audience and expiry. Expiry is strict:
/// no clock-skew leeway. Any failure collapses into `AuthError::InvalidToken`
/// so callers cannot tell the reasons apart.
pub fn verify_token(token: &str) -> Result<Claims, AuthError> {
    let security = &config::config().security;

    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;
    validation.set_issuer(&[&security.jwt_issuer]);
    validation.set_audience(&[&security.jwt_audience]);

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
}

/// Hash a password with bcrypt (salted, configurable cost).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let cost = config::config().security.bcrypt_cost;
    bcrypt::hash(password, cost).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Check a password against a stored digest. A digest bcrypt cannot parse
/// counts as a mismatch, keeping login failures uniform.
pub fn verify_password(password: &str, digest: &str) -> bool {
    bcrypt::verify(password, digest).unwrap_or(false)
}
