/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules,
/// so that access control is applied explicitly at the module level (via Axum
/// layers) rather than per-handler, preventing accidental exposure of
/// protected endpoints.
///
/// The two modules map directly to the two access roles: anonymous visitors
/// and signed-in users. There is no admin tier; moderation is out of scope.

/// Routes accessible to all users (anonymous, read-only, plus the token
/// endpoints that bootstrap a session).
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Requires a validated user session.
pub mod authenticated;
