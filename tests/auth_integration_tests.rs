use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use career_wall::{
    AppState,
    auth::{ACCESS_TOKEN_TYPE, AuthUser, Claims, MaybeAuthUser, REFRESH_TOKEN_TYPE, TokenService},
    config::{AppConfig, Env},
    error::ApiError,
    repository::MemoryRepository,
    storage::MockImageStorage,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use uuid::Uuid;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

/// Signs a token directly with jsonwebtoken, sidestepping TokenService, so
/// the tests control every claim (including bogus combinations the service
/// would never produce).
fn create_token(user_id: Uuid, token_type: &str, exp_offset: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + exp_offset) as usize,
        token_type: token_type.to_string(),
    };

    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn create_app_state(env: Env, repo: Arc<MemoryRepository>, jwt_secret: &str) -> AppState {
    let mut config = AppConfig::default();
    config.env = env;
    config.jwt_secret = jwt_secret.to_string();

    AppState {
        repo,
        storage: Arc::new(MockImageStorage::new()),
        tokens: TokenService::new(jwt_secret),
        config,
    }
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn bearer(parts: &mut Parts, token: &str) {
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
}

// --- Extractor Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let repo = Arc::new(MemoryRepository::new());
    let user = repo.seed_user("token_holder");
    let token = create_token(user.id, ACCESS_TOKEN_TYPE, 3600);

    let app_state = create_app_state(Env::Production, repo, TEST_JWT_SECRET);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_ok());
    let resolved = auth_user.unwrap();
    assert_eq!(resolved.id, user.id);
    assert_eq!(resolved.username, "token_holder");
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let app_state = create_app_state(
        Env::Production,
        Arc::new(MemoryRepository::new()),
        TEST_JWT_SECRET,
    );

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
    assert_eq!(
        auth_user.unwrap_err().status_code(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    let repo = Arc::new(MemoryRepository::new());
    let user = repo.seed_user("late_arrival");
    // Expired well past jsonwebtoken's default leeway (60s).
    let token = create_token(user.id, ACCESS_TOKEN_TYPE, -3600);

    let app_state = create_app_state(Env::Production, repo, TEST_JWT_SECRET);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
    let err = auth_user.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(err.to_string(), "Token has expired");
}

#[tokio::test]
async fn test_refresh_token_rejected_for_api_access() {
    let repo = Arc::new(MemoryRepository::new());
    let user = repo.seed_user("refresher");
    // Long-lived refresh tokens must not open API routes.
    let token = create_token(user.id, REFRESH_TOKEN_TYPE, 3600);

    let app_state = create_app_state(Env::Production, repo, TEST_JWT_SECRET);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
    assert_eq!(auth_user.unwrap_err().to_string(), "Invalid token type");
}

#[tokio::test]
async fn test_auth_failure_with_wrong_secret() {
    let repo = Arc::new(MemoryRepository::new());
    let user = repo.seed_user("forger");
    let token = create_token(user.id, ACCESS_TOKEN_TYPE, 3600);

    // The server validates with a different secret than the token was signed
    // with, so the signature check must fail.
    let app_state = create_app_state(Env::Production, repo, "a-completely-different-secret");

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
    assert_eq!(
        auth_user.unwrap_err().status_code(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_auth_failure_for_unknown_subject() {
    // Valid signature, but the subject has no row (deleted after issuance).
    let token = create_token(Uuid::new_v4(), ACCESS_TOKEN_TYPE, 3600);

    let app_state = create_app_state(
        Env::Production,
        Arc::new(MemoryRepository::new()),
        TEST_JWT_SECRET,
    );

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
    assert_eq!(auth_user.unwrap_err().to_string(), "Invalid token");
}

#[tokio::test]
async fn test_auth_failure_for_disabled_account() {
    let repo = Arc::new(MemoryRepository::new());
    let user = repo.seed_user("banned");
    repo.deactivate_user(user.id);
    let token = create_token(user.id, ACCESS_TOKEN_TYPE, 3600);

    let app_state = create_app_state(Env::Production, repo, TEST_JWT_SECRET);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
    assert_eq!(auth_user.unwrap_err().to_string(), "Account is disabled");
}

// --- Local Bypass ---

#[tokio::test]
async fn test_local_bypass_success() {
    let repo = Arc::new(MemoryRepository::new());
    let user = repo.seed_user("local_dev");

    let app_state = create_app_state(Env::Local, repo, TEST_JWT_SECRET);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&user.id.to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_ok());
    let resolved = auth_user.unwrap();
    assert_eq!(resolved.id, user.id);
    assert_eq!(resolved.username, "local_dev");
}

#[tokio::test]
async fn test_local_bypass_requires_existing_user() {
    // The bypass header must map to a real row; otherwise the request falls
    // through to (absent) standard auth and is rejected.
    let app_state = create_app_state(
        Env::Local,
        Arc::new(MemoryRepository::new()),
        TEST_JWT_SECRET,
    );

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let repo = Arc::new(MemoryRepository::new());
    let user = repo.seed_user("would_be_bypasser");

    let app_state = create_app_state(Env::Production, repo, TEST_JWT_SECRET);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    // Provide ONLY the local bypass header
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&user.id.to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
    assert_eq!(
        auth_user.unwrap_err().status_code(),
        StatusCode::UNAUTHORIZED
    );
}

// --- Optional Extractor ---

#[tokio::test]
async fn test_maybe_auth_user_never_rejects() {
    let repo = Arc::new(MemoryRepository::new());
    let user = repo.seed_user("sometimes");
    let token = create_token(user.id, ACCESS_TOKEN_TYPE, 3600);

    let app_state = create_app_state(Env::Production, repo, TEST_JWT_SECRET);

    // No credentials: Ok(None), not an error.
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    let MaybeAuthUser(viewer) = MaybeAuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert!(viewer.is_none());

    // Garbage credentials degrade to anonymous instead of erroring.
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, "garbage-token");
    let MaybeAuthUser(viewer) = MaybeAuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert!(viewer.is_none());

    // Valid credentials resolve.
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);
    let MaybeAuthUser(viewer) = MaybeAuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(viewer.unwrap().id, user.id);
}

// --- TokenService ---

#[tokio::test]
async fn test_token_service_pair_round_trip() {
    let service = TokenService::new(TEST_JWT_SECRET);
    let user_id = Uuid::new_v4();

    let pair = service.issue_pair(user_id).unwrap();

    let access = service.verify(&pair.access, ACCESS_TOKEN_TYPE).unwrap();
    assert_eq!(access.sub, user_id);
    assert_eq!(access.token_type, ACCESS_TOKEN_TYPE);

    let refresh = service.verify(&pair.refresh, REFRESH_TOKEN_TYPE).unwrap();
    assert_eq!(refresh.sub, user_id);

    // Cross-class verification fails on the type claim.
    let err = service.verify(&pair.access, REFRESH_TOKEN_TYPE).unwrap_err();
    assert!(matches!(err, ApiError::Authentication(_)));

    // verify_any accepts either class.
    assert!(service.verify_any(&pair.access).is_ok());
    assert!(service.verify_any(&pair.refresh).is_ok());
}

#[tokio::test]
async fn test_refresh_outlives_access() {
    let service = TokenService::new(TEST_JWT_SECRET);
    let pair = service.issue_pair(Uuid::new_v4()).unwrap();

    let access = service.verify_any(&pair.access).unwrap();
    let refresh = service.verify_any(&pair.refresh).unwrap();

    assert!(
        refresh.exp > access.exp,
        "refresh tokens must expire after access tokens"
    );
}
