use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Authenticated Router Module
///
/// Defines the routes accessible to any user who has successfully passed the
/// authentication layer: posting, editing, liking and commenting.
///
/// Access Control Strategy:
/// Every handler in this module relies on the `AuthUser` extractor middleware
/// being present on the router layer above this module. This guarantees that
/// all handlers receive a validated `AuthUser` struct containing the user's ID
/// and username, which is then used for all Owner-Only authorization checks
/// (e.g., in `update_post` and `delete_post`).
///
/// Note that `/careers` and `/careers/{id}` also appear in the public router
/// with GET handlers; Axum merges the method routers, so the write methods
/// registered here are authenticated while the reads stay public.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /auth/profile
        // Retrieves the currently authenticated user's own record.
        .route("/auth/profile", get(handlers::get_profile))
        // --- Posts ---
        // POST /careers
        // Creates a new post. Accepts JSON, or multipart form data when an
        // image is attached (the upload happens before the row is written).
        .route("/careers", post(handlers::create_post))
        // PATCH/DELETE /careers/{id}
        // Allows the user to modify or remove their own post.
        // Strict ownership check is enforced within the handler logic.
        .route(
            "/careers/{id}",
            patch(handlers::update_post).delete(handlers::delete_post),
        )
        // POST /careers/{id}/like
        // Strict like toggle. Safe to retry: the composite primary key on the
        // `likes` table prevents double-likes under concurrent toggles.
        .route("/careers/{id}/like", post(handlers::toggle_like))
        // --- Comments ---
        // POST /careers/{id}/comments
        // Posts a new comment; its @mentions are linked to the parent post.
        .route("/careers/{id}/comments", post(handlers::add_comment))
        // PATCH/DELETE /careers/{id}/comments/{comment_id}
        // Allows a user to edit or delete their own comment. Ownership
        // validation is required, and the comment must belong to the post in
        // the path.
        .route(
            "/careers/{id}/comments/{comment_id}",
            patch(handlers::update_comment).delete(handlers::delete_comment),
        )
}
