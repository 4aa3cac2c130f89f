use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Canonical identity record from the `users` table. Accounts are keyed by a
/// unique username and carry no password: they are provisioned on first login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    // Unique, non-empty, at most 150 characters.
    pub username: String,
    // Disabled accounts keep their rows but cannot log in.
    pub is_active: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub last_login: Option<DateTime<Utc>>,
}

/// Post
///
/// A post row from the `posts` table as written. The display username is a
/// denormalized copy of the author's name, resynchronized on every write so it
/// survives author deletion (sentinel "Anonymous" when no author exists).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Post {
    pub id: Uuid,
    // FK to users.id; NULL once the author account is deleted.
    pub author_id: Option<Uuid>,
    pub username: String,
    pub title: String,
    pub content: String,
    // Public URL returned by the hosted image service.
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// PostWithStats
///
/// A post row augmented with the per-request aggregates the feed needs:
/// like/comment counts computed by COUNT(*) (never a cached counter) and
/// whether the viewing user has liked it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct PostWithStats {
    pub id: Uuid,
    pub author_id: Option<Uuid>,
    pub username: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub likes_count: i64,
    pub comments_count: i64,
    // False whenever the request carries no (valid) token.
    pub user_liked: bool,
}

/// Like
///
/// A single like record. The `(post_id, user_id)` pair is the primary key of
/// the `likes` table, which is what makes the toggle race-safe.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Like {
    pub post_id: Uuid,
    pub user_id: Uuid,
}

/// Comment
///
/// Raw comment row from the `comments` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Comment {
    // BigInt (i64) for comment IDs due to the high volume potential.
    pub id: i64,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// CommentWithAuthor
///
/// Comment row joined with the author's username for serialization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct CommentWithAuthor {
    pub id: i64,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mention
///
/// Raw mention row. `(post_id, mentioned_user_id)` is unique, so re-inserting
/// an existing mention is a no-op at the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Mention {
    pub id: i64,
    pub post_id: Uuid,
    pub mentioned_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// MentionWithUser
///
/// Mention row joined with the mentioned user's username for serialization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct MentionWithUser {
    pub id: i64,
    pub post_id: Uuid,
    pub mentioned_user_id: Uuid,
    pub mentioned_username: String,
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Input payload for POST /auth/login. Username only; unknown usernames are
/// auto-provisioned, so this doubles as registration for first-time visitors.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
}

/// RegisterRequest
///
/// Input payload for POST /auth/register. Unlike login, an already-taken
/// username is rejected here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterRequest {
    pub username: String,
}

/// RefreshRequest
///
/// Input payload for POST /auth/refresh.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// VerifyRequest
///
/// Input payload for POST /auth/verify (token introspection).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct VerifyRequest {
    pub token: String,
}

/// CreatePostRequest
///
/// JSON input payload for POST /careers. When the client attaches an image it
/// switches to multipart and sends the same fields as form parts instead.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

/// UpdatePostRequest
///
/// Partial update payload for PATCH /careers/{id}. Only provided fields are
/// written; the rest keep their stored values.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// CreateCommentRequest
///
/// Input payload for posting a new comment.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// UpdateCommentRequest
///
/// Input payload for editing an existing comment.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCommentRequest {
    pub content: String,
}

// --- Wire Schemas (Output DTOs) ---

/// UserDto
///
/// Wire shape of a user. `created_at` is exposed as `date_joined`, matching
/// what the frontend displays on profiles.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserDto {
    pub id: Uuid,
    pub username: String,
    #[ts(type = "string")]
    pub date_joined: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub last_login: Option<DateTime<Utc>>,
}

/// TokenPair
///
/// Access/refresh bearer tokens issued at login, registration and refresh.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// AuthData
///
/// Payload of a successful login/registration: the user plus their tokens.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AuthData {
    pub user: UserDto,
    pub tokens: TokenPair,
}

/// RefreshData
///
/// Payload of a successful token refresh. Shaped like the `tokens` half of
/// `AuthData` so clients can reuse one accessor for both.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RefreshData {
    pub tokens: TokenPair,
}

/// PostDto
///
/// Wire shape of a post as the feed renders it. `created_at` is exposed as
/// `created_datetime` and `image_url` as `image`, the legacy field names the
/// frontend already depends on.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PostDto {
    pub id: Uuid,
    pub username: String,
    #[ts(type = "string")]
    pub created_datetime: DateTime<Utc>,
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub user_liked: bool,
}

/// CommentDto
///
/// Wire shape of a comment.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CommentDto {
    pub id: i64,
    pub username: String,
    pub content: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// MentionDto
///
/// Wire shape of a mention.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MentionDto {
    pub id: i64,
    pub mentioned_username: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// LikeToggle
///
/// Payload of a like toggle: what happened, the fresh count, the new state.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LikeToggle {
    // "added" or "removed".
    pub action: String,
    pub likes_count: i64,
    pub user_liked: bool,
}

// --- Response Envelope ---

/// Envelope
///
/// Wrapper used by every non-health endpoint: `{success, message?, data?}`.
/// Absent fields are omitted from the JSON rather than serialized as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

// --- Row → DTO Mapping ---

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            date_joined: user.created_at,
            last_login: user.last_login,
        }
    }
}

impl From<PostWithStats> for PostDto {
    fn from(post: PostWithStats) -> Self {
        Self {
            id: post.id,
            username: post.username,
            created_datetime: post.created_at,
            title: post.title,
            content: post.content,
            image: post.image_url,
            likes_count: post.likes_count,
            comments_count: post.comments_count,
            user_liked: post.user_liked,
        }
    }
}

impl From<Post> for PostDto {
    /// A freshly written post has no likes or comments yet; the author has
    /// not liked their own post either.
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            username: post.username,
            created_datetime: post.created_at,
            title: post.title,
            content: post.content,
            image: post.image_url,
            likes_count: 0,
            comments_count: 0,
            user_liked: false,
        }
    }
}

impl From<CommentWithAuthor> for CommentDto {
    fn from(comment: CommentWithAuthor) -> Self {
        Self {
            id: comment.id,
            username: comment.username,
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

impl From<MentionWithUser> for MentionDto {
    fn from(mention: MentionWithUser) -> Self {
        Self {
            id: mention.id,
            mentioned_username: mention.mentioned_username,
            created_at: mention.created_at,
        }
    }
}
