use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client
/// (anonymous or logged-in). These cover the whole read side of the wall plus
/// the token endpoints that bootstrap a session.
///
/// A bearer token is still *honored* on the feed routes when present: the
/// handlers use the optional `MaybeAuthUser` extractor to personalize the
/// `user_liked` flag. A missing or invalid token never rejects here.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        // Returns "ok" immediately to verify the service is running and responsive.
        .route("/health", get(|| async { "ok" }))
        // --- Session Bootstrap ---
        // POST /auth/login
        // Username-only login. Unknown usernames are provisioned on the spot,
        // so this is also the fast path for first-time users.
        .route("/auth/login", post(handlers::login))
        // POST /auth/register
        // Explicit account creation. Unlike login, a taken username is a 400
        // here rather than a silent sign-in.
        .route("/auth/register", post(handlers::register_user))
        // POST /auth/refresh
        // Exchanges a refresh token for a fresh access/refresh pair.
        .route("/auth/refresh", post(handlers::refresh_token))
        // POST /auth/verify
        // Stateless token introspection (signature + expiry only).
        .route("/auth/verify", post(handlers::verify_token))
        // --- Read Side ---
        // GET /careers
        // The feed: every post, newest first, with like/comment counts.
        .route("/careers", get(handlers::get_posts))
        // GET /careers/{id}
        // Detailed view of a single post.
        .route("/careers/{id}", get(handlers::get_post_details))
        // GET /careers/{id}/comments
        // Lists all comments on a post, oldest first. 404s when the parent
        // post does not exist, rather than returning an empty list.
        .route("/careers/{id}/comments", get(handlers::get_comments))
        // GET /careers/{id}/mentions
        // Lists the users @mentioned on a post (content and comments alike).
        .route("/careers/{id}/mentions", get(handlers::get_mentions))
}
