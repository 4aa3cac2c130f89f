use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::ApiError,
    models::TokenPair,
    repository::RepositoryState,
};

/// Claim value distinguishing short-lived API tokens from long-lived refresh
/// tokens. A refresh token must never pass as an access token or vice versa.
pub const ACCESS_TOKEN_TYPE: &str = "access";
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

const ACCESS_TTL_SECS: i64 = 60 * 60;
const REFRESH_TTL_SECS: i64 = 60 * 60 * 24 * 30;

/// Claims
///
/// Represents the standard payload structure expected inside a JSON Web Token (JWT).
/// These claims are signed by the server's secret and validated upon every authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): The UUID of the user. This is the primary key used to fetch
    /// the user's record from the users table.
    pub sub: Uuid,
    /// Expiration Time (exp): Timestamp after which the JWT must not be accepted.
    /// This is crucial for preventing replay attacks and maintaining session freshness.
    pub exp: usize,
    /// Issued At (iat): Timestamp when the JWT was issued.
    pub iat: usize,
    /// Token class: "access" (1 hour) or "refresh" (30 days).
    pub token_type: String,
}

/// TokenService
///
/// Issues and validates the access/refresh token pairs handed out at login.
/// Both tokens are HS256-signed with the configured secret; only the TTL and
/// the `token_type` claim differ.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// issue_pair
    ///
    /// Produces the `{access, refresh}` pair returned by login, registration
    /// and refresh.
    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, ApiError> {
        Ok(TokenPair {
            access: self.issue(user_id, ACCESS_TOKEN_TYPE, ACCESS_TTL_SECS)?,
            refresh: self.issue(user_id, REFRESH_TOKEN_TYPE, REFRESH_TTL_SECS)?,
        })
    }

    fn issue(&self, user_id: Uuid, token_type: &str, ttl_secs: i64) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            exp: (now + Duration::seconds(ttl_secs)).timestamp() as usize,
            iat: now.timestamp() as usize,
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
    }

    /// verify
    ///
    /// Decodes and validates a token, additionally requiring the expected
    /// `token_type` claim. Expiry and signature failures both surface as 401s,
    /// with distinct messages so clients can tell a stale session from a
    /// forged token.
    pub fn verify(&self, token: &str, expected_type: &str) -> Result<Claims, ApiError> {
        let claims = self.verify_any(token)?;

        if claims.token_type != expected_type {
            return Err(ApiError::authentication("Invalid token type"));
        }

        Ok(claims)
    }

    /// verify_any
    ///
    /// Signature and expiry check only, accepting either token class. Used by
    /// the introspection endpoint, which clients call with whichever token
    /// they hold.
    pub fn verify_any(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => ApiError::authentication("Token has expired"),
                    _ => ApiError::authentication("Invalid token"),
                }
            })?;

        Ok(token_data.claims)
    }
}

/// AuthUser Extractor Result
///
/// This struct represents the resolved identity of an authenticated request.
/// It is the core output of the AuthUser extractor implementation.
/// Handlers use it for ownership checks and for the denormalized display
/// username written onto posts.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a function argument
/// in any authenticated handler. This cleanly separates authentication
/// (middleware/extractor) from business logic (the handler).
///
/// The entire process involves:
/// 1. Dependency Resolution: Accessing Repository, TokenService and AppConfig from the state.
/// 2. Local Bypass: Allowing development-time access using the 'x-user-id' header.
/// 3. Token Validation: Standard Bearer token extraction and JWT decoding (access tokens only).
/// 4. DB Lookup: Fetching the user's record and rejecting deleted or disabled accounts.
///
/// Rejection: 401 with the standard error envelope on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    // S must allow sending across threads and sharing.
    S: Send + Sync,
    // Allows the extractor to pull the Repository State from the app state.
    RepositoryState: FromRef<S>,
    // Allows the extractor to pull the token validator.
    TokenService: FromRef<S>,
    // Allows the extractor to pull the AppConfig (for the Env check).
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // 1. Dependency Resolution
        let repo = RepositoryState::from_ref(state);
        let tokens = TokenService::from_ref(state);
        let config = AppConfig::from_ref(state);

        // 2. Local Development Bypass Check
        // If the application is running in Env::Local, we allow authentication by
        // providing a known, valid UUID in the 'x-user-id' header.
        // This accelerates development but is guarded by the Env check.
        if config.env == Env::Local {
            if let Some(user_id_header) = parts.headers.get("x-user-id") {
                if let Ok(id_str) = user_id_header.to_str() {
                    if let Ok(user_id) = Uuid::parse_str(id_str) {
                        // The UUID must still map to an actual user row so
                        // downstream FK writes cannot dangle.
                        if let Some(user) = repo.get_user(user_id).await? {
                            return Ok(AuthUser {
                                id: user.id,
                                username: user.username,
                            });
                        }
                    }
                }
            }
        }
        // If Env is Production, or if the bypass failed (e.g., header was bad or user not found),
        // execution falls through to the standard JWT validation flow.

        // 3. Token Extraction
        // Attempt to retrieve the Authorization header and ensure it is prefixed with "Bearer ".
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::authentication("Authentication required"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::authentication("Authentication required"))?;

        // 4. Decode and Validate the Token
        // Refresh tokens are rejected here: only access tokens grant API access.
        let claims = tokens.verify(token, ACCESS_TOKEN_TYPE)?;

        // 5. Database Lookup (Final Verification)
        // This prevents access if the user was deleted or deactivated after
        // the token was issued.
        let user = repo
            .get_user(claims.sub)
            .await?
            .ok_or_else(|| ApiError::authentication("Invalid token"))?;

        if !user.is_active {
            return Err(ApiError::authentication("Account is disabled"));
        }

        // Success: Return the resolved identity.
        Ok(AuthUser {
            id: user.id,
            username: user.username,
        })
    }
}

/// MaybeAuthUser
///
/// Optional variant of the AuthUser extractor for public routes whose payload
/// varies with the viewer (the feed's `user_liked` flag). Never rejects: a
/// missing or invalid token simply yields `None`.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    TokenService: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(
            AuthUser::from_request_parts(parts, state).await.ok(),
        ))
    }
}
