use crate::{
    AppState, MAX_UPLOAD_BYTES,
    auth::{AuthUser, MaybeAuthUser, REFRESH_TOKEN_TYPE},
    error::ApiError,
    mentions,
    models::{
        AuthData, CommentDto, CreateCommentRequest, CreatePostRequest, Envelope, LikeToggle,
        LoginRequest, MentionDto, PostDto, RefreshData, RefreshRequest, RegisterRequest,
        UpdateCommentRequest, UpdatePostRequest, UserDto, VerifyRequest,
    },
};
use axum::{
    Json,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{error, info};
use uuid::Uuid;

const MAX_USERNAME_CHARS: usize = 150;
const MAX_TITLE_CHARS: usize = 200;

// --- Input Plumbing ---

/// ValidJson
///
/// Thin wrapper around Axum's `Json` extractor whose rejection is an
/// `ApiError`, so malformed bodies produce the standard error envelope
/// instead of Axum's plain-text 400/415 responses.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(ApiError::validation(format!(
                "Invalid JSON body: {}",
                rejection
            ))),
        }
    }
}

/// PostPayload
///
/// The fields a post create/update request can carry, regardless of whether
/// they arrived as a JSON document or as multipart form parts. Clients send
/// multipart exactly when an image is attached.
#[derive(Default)]
struct PostPayload {
    title: Option<String>,
    content: Option<String>,
    image: Option<ImageUpload>,
}

/// An image file lifted out of a multipart request.
struct ImageUpload {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// PostBody
///
/// Serde shape of the JSON variant of a post payload. Both fields optional so
/// one parser serves create (which then requires both) and partial update.
#[derive(Deserialize)]
struct PostBody {
    title: Option<String>,
    content: Option<String>,
}

/// read_post_payload
///
/// Branches on the Content-Type header: multipart bodies are walked field by
/// field (collecting the `image` part's bytes), anything else is parsed as
/// JSON. All parse failures come back as 400s in the error envelope.
async fn read_post_payload(req: Request) -> Result<PostPayload, ApiError> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if !is_multipart {
        let bytes = axum::body::to_bytes(req.into_body(), MAX_UPLOAD_BYTES)
            .await
            .map_err(|e| ApiError::validation(format!("Unreadable request body: {}", e)))?;

        let body: PostBody = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::validation(format!("Invalid JSON body: {}", e)))?;

        return Ok(PostPayload {
            title: body.title,
            content: body.content,
            image: None,
        });
    }

    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {}", e)))?;

    let mut payload = PostPayload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {}", e)))?
    {
        match field.name() {
            Some("title") => {
                payload.title = Some(field.text().await.map_err(|e| {
                    ApiError::validation(format!("Unreadable title field: {}", e))
                })?);
            }
            Some("content") => {
                payload.content = Some(field.text().await.map_err(|e| {
                    ApiError::validation(format!("Unreadable content field: {}", e))
                })?);
            }
            Some("image") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("Unreadable image field: {}", e)))?
                    .to_vec();

                // Browsers submit an empty part when no file was chosen.
                if !bytes.is_empty() {
                    payload.image = Some(ImageUpload {
                        filename,
                        content_type,
                        bytes,
                    });
                }
            }
            // Unknown parts are ignored, same as unknown JSON keys.
            _ => {}
        }
    }

    Ok(payload)
}

// --- Validation ---

fn normalize_username(raw: &str) -> Result<String, ApiError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if username.chars().count() > MAX_USERNAME_CHARS {
        return Err(ApiError::validation(
            "Username must be at most 150 characters",
        ));
    }
    Ok(username.to_string())
}

fn validate_title(raw: &str) -> Result<String, ApiError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ApiError::validation("Title is required"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ApiError::validation("Title must be at most 200 characters"));
    }
    Ok(title.to_string())
}

fn validate_content(raw: &str) -> Result<String, ApiError> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(ApiError::validation("Content is required"));
    }
    Ok(content.to_string())
}

fn validate_comment(raw: &str) -> Result<String, ApiError> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(ApiError::validation("Comment content is required"));
    }
    Ok(content.to_string())
}

/// upload_image
///
/// Gate + delegate for the hosted image service. Absent credentials reject
/// with 400 before any bytes leave the server; an upstream failure surfaces
/// as 500. Called before any row is written, so a failed upload never leaves
/// an orphaned post behind.
async fn upload_image(state: &AppState, image: ImageUpload) -> Result<String, ApiError> {
    if !state.config.uploads_enabled() {
        return Err(ApiError::UploadsDisabled);
    }

    state
        .storage
        .upload_image(&image.filename, &image.content_type, image.bytes)
        .await
        .map_err(|e| {
            error!(error = %e, "image upload failed");
            ApiError::Upstream(e)
        })
}

// --- Auth Handlers ---

/// login
///
/// [Public Route] Username-only login with auto-provisioning: an unknown
/// username creates the account on the spot, a known one is reused. Either
/// way the caller gets the user plus a fresh access/refresh token pair.
///
/// *Note*: Login and registration are deliberately conflated for this
/// friction-free flow; there is no password.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthData),
        (status = 400, description = "Empty or overlong username"),
        (status = 401, description = "Account disabled")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<Envelope<AuthData>>, ApiError> {
    let username = normalize_username(&payload.username)?;

    let user = state.repo.get_or_create_user(&username).await?;
    if !user.is_active {
        return Err(ApiError::authentication("Account is disabled"));
    }

    let user = state
        .repo
        .update_last_login(user.id)
        .await?
        .ok_or_else(|| ApiError::Internal("user row vanished during login".to_string()))?;

    let tokens = state.tokens.issue_pair(user.id)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");

    Ok(Json(Envelope::with_message(
        "Login successful",
        AuthData {
            user: user.into(),
            tokens,
        },
    )))
}

/// register_user
///
/// [Public Route] Explicit registration. Same validation as login, but an
/// already-taken username is rejected with 400 instead of being logged in.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = AuthData),
        (status = 400, description = "Invalid or taken username")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = normalize_username(&payload.username)?;

    if state
        .repo
        .get_user_by_username(&username)
        .await?
        .is_some()
    {
        return Err(ApiError::validation("Username already taken"));
    }

    let user = state.repo.create_user(&username).await?;
    let tokens = state.tokens.issue_pair(user.id)?;

    info!(user_id = %user.id, username = %user.username, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "User registered successfully",
            AuthData {
                user: user.into(),
                tokens,
            },
        )),
    ))
}

/// refresh_token
///
/// [Public Route] Exchanges a valid refresh token for a fresh token pair.
/// The subject must still exist and be active: deactivating an account cuts
/// its sessions off at the next refresh.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = RefreshData),
        (status = 400, description = "Missing refresh token"),
        (status = 401, description = "Invalid or expired refresh token")
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RefreshRequest>,
) -> Result<Json<Envelope<RefreshData>>, ApiError> {
    let refresh = payload.refresh.trim();
    if refresh.is_empty() {
        return Err(ApiError::validation("Refresh token is required"));
    }

    let claims = state.tokens.verify(refresh, REFRESH_TOKEN_TYPE)?;

    let user = state
        .repo
        .get_user(claims.sub)
        .await?
        .ok_or_else(|| ApiError::authentication("Invalid token"))?;
    if !user.is_active {
        return Err(ApiError::authentication("Account is disabled"));
    }

    let tokens = state.tokens.issue_pair(user.id)?;

    Ok(Json(Envelope::with_message(
        "Token refreshed successfully",
        RefreshData { tokens },
    )))
}

/// verify_token
///
/// [Public Route] Token introspection: checks signature and expiry of either
/// token class without touching the database.
#[utoipa::path(
    post,
    path = "/auth/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Token is valid"),
        (status = 400, description = "Missing token"),
        (status = 401, description = "Invalid or expired token")
    )
)]
pub async fn verify_token(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<VerifyRequest>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let token = payload.token.trim();
    if token.is_empty() {
        return Err(ApiError::validation("Token is required"));
    }

    state.tokens.verify_any(token)?;

    Ok(Json(Envelope::message("Token is valid")))
}

/// get_profile
///
/// [Authenticated Route] Returns the authenticated user's own record.
#[utoipa::path(
    get,
    path = "/auth/profile",
    responses(
        (status = 200, description = "Profile", body = UserDto),
        (status = 401, description = "Unauthenticated")
    )
)]
pub async fn get_profile(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Envelope<UserDto>>, ApiError> {
    let user = state
        .repo
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::authentication("Invalid token"))?;

    Ok(Json(Envelope::data(user.into())))
}

// --- Post Handlers ---

/// get_posts
///
/// [Public Route] The feed: every post, newest first, with like/comment
/// counts. A bearer token is optional and only affects the `user_liked`
/// flag; an invalid one degrades to the anonymous view rather than erroring.
#[utoipa::path(
    get,
    path = "/careers",
    responses((status = 200, description = "All posts, newest first", body = [PostDto]))
)]
pub async fn get_posts(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<PostDto>>>, ApiError> {
    let posts = state
        .repo
        .get_posts(viewer.as_ref().map(|user| user.id))
        .await?;

    Ok(Json(Envelope::data(
        posts.into_iter().map(PostDto::from).collect(),
    )))
}

/// get_post_details
///
/// [Public Route] Retrieves a single post by ID, with the same viewer
/// sensitivity as the feed.
#[utoipa::path(
    get,
    path = "/careers/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = PostDto),
        (status = 404, description = "Unknown post")
    )
)]
pub async fn get_post_details(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<PostDto>>, ApiError> {
    let post = state
        .repo
        .get_post_with_stats(id, viewer.as_ref().map(|user| user.id))
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    Ok(Json(Envelope::data(post.into())))
}

/// create_post
///
/// [Authenticated Route] Creates a post from either a JSON body or a
/// multipart form carrying an `image` part. The image is uploaded to the
/// hosted service *before* the row is written, so a failed upload aborts
/// creation cleanly. @mentions in the content are linked afterwards.
#[utoipa::path(
    post,
    path = "/careers",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = PostDto),
        (status = 400, description = "Missing title/content, or uploads disabled"),
        (status = 401, description = "Unauthenticated")
    )
)]
pub async fn create_post(
    AuthUser { id: user_id, username }: AuthUser,
    State(state): State<AppState>,
    req: Request,
) -> Result<impl IntoResponse, ApiError> {
    let payload = read_post_payload(req).await?;

    let title = validate_title(payload.title.as_deref().unwrap_or_default())?;
    let content = validate_content(payload.content.as_deref().unwrap_or_default())?;

    let image_url = match payload.image {
        Some(image) => Some(upload_image(&state, image).await?),
        None => None,
    };

    let post = state
        .repo
        .create_post(user_id, &username, &title, &content, image_url.as_deref())
        .await?;

    mentions::link_mentions(&state.repo, post.id, user_id, &post.content).await?;

    info!(post_id = %post.id, author = %username, "post created");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "Post created successfully",
            PostDto::from(post),
        )),
    ))
}

/// update_post
///
/// [Authenticated Route] Partial update of the caller's own post, JSON or
/// multipart. A replacement image is uploaded before the row is touched (a
/// failed upload leaves the stored post intact); the old image is dropped
/// best-effort afterwards. Changed content is re-scanned for mentions.
///
/// *Authorization*: 404 for an unknown id, then 403 when the caller is not
/// the author.
#[utoipa::path(
    patch,
    path = "/careers/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = PostDto),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Unknown post")
    )
)]
pub async fn update_post(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    req: Request,
) -> Result<Json<Envelope<PostDto>>, ApiError> {
    let payload = read_post_payload(req).await?;

    let existing = state
        .repo
        .get_post(id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;
    if existing.author_id != Some(user_id) {
        return Err(ApiError::Forbidden);
    }

    let title = payload.title.as_deref().map(validate_title).transpose()?;
    let content = payload
        .content
        .as_deref()
        .map(validate_content)
        .transpose()?;

    let image_url = match payload.image {
        Some(image) => Some(upload_image(&state, image).await?),
        None => None,
    };

    state
        .repo
        .update_post(id, title.as_deref(), content.as_deref(), image_url.as_deref())
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    // The replaced image only goes once the new row is safely written.
    if let (Some(_), Some(old_url)) = (&image_url, &existing.image_url) {
        state.storage.delete_image(old_url).await;
    }

    if let Some(content) = &content {
        mentions::link_mentions(&state.repo, id, user_id, content).await?;
    }

    info!(post_id = %id, "post updated");

    let post = state
        .repo
        .get_post_with_stats(id, Some(user_id))
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    Ok(Json(Envelope::with_message(
        "Post updated successfully",
        post.into(),
    )))
}

/// delete_post
///
/// [Authenticated Route] Deletes the caller's own post. Likes, comments and
/// mentions cascade away with it; the hosted image is removed best-effort.
/// Responds 200 with a message body (not 204), which is what the frontend
/// expects.
///
/// *Authorization*: 404 for an unknown id, then 403 when the caller is not
/// the author.
#[utoipa::path(
    delete,
    path = "/careers/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Unknown post")
    )
)]
pub async fn delete_post(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let post = state
        .repo
        .get_post(id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;
    if post.author_id != Some(user_id) {
        return Err(ApiError::Forbidden);
    }

    state.repo.delete_post(id).await?;

    if let Some(image_url) = &post.image_url {
        state.storage.delete_image(image_url).await;
    }

    info!(post_id = %id, "post deleted");

    Ok(Json(Envelope::message("Post deleted successfully")))
}

// --- Like Handler ---

/// toggle_like
///
/// [Authenticated Route] Strict toggle of the caller's like on a post: a
/// standing like is removed, a missing one is added. The count in the
/// response is always `COUNT(*)` over the likes table.
///
/// *Concurrency*: the `(post_id, user_id)` primary key is the sole safeguard
/// against a double-toggle race; the losing insert is treated as "already
/// liked", never an error.
#[utoipa::path(
    post,
    path = "/careers/{id}/like",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Toggled", body = LikeToggle),
        (status = 404, description = "Unknown post")
    )
)]
pub async fn toggle_like(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<LikeToggle>>, ApiError> {
    state
        .repo
        .get_post(id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    let (action, user_liked) = if state.repo.user_liked(id, user_id).await? {
        state.repo.remove_like(id, user_id).await?;
        ("removed", false)
    } else {
        // A false return means a concurrent toggle inserted first; either
        // way the caller ends up in the liked state.
        state.repo.add_like(id, user_id).await?;
        ("added", true)
    };

    let likes_count = state.repo.count_likes(id).await?;

    info!(post_id = %id, user_id = %user_id, action, "like toggled");

    Ok(Json(Envelope::with_message(
        format!("Like {}", action),
        LikeToggle {
            action: action.to_string(),
            likes_count,
            user_liked,
        },
    )))
}

// --- Comment Handlers ---

/// get_comments
///
/// [Public Route] All comments on a post, oldest first.
#[utoipa::path(
    get,
    path = "/careers/{id}/comments",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Comments", body = [CommentDto]),
        (status = 404, description = "Unknown post")
    )
)]
pub async fn get_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<CommentDto>>>, ApiError> {
    state
        .repo
        .get_post(post_id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    let comments = state.repo.get_comments(post_id).await?;

    Ok(Json(Envelope::data(
        comments.into_iter().map(CommentDto::from).collect(),
    )))
}

/// add_comment
///
/// [Authenticated Route] Posts a comment. The comment's @mentions are linked
/// to the parent post, attributed to the comment author.
#[utoipa::path(
    post,
    path = "/careers/{id}/comments",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentDto),
        (status = 400, description = "Empty content"),
        (status = 404, description = "Unknown post")
    )
)]
pub async fn add_comment(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    ValidJson(payload): ValidJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .repo
        .get_post(post_id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    let content = validate_comment(&payload.content)?;

    let comment = state.repo.add_comment(post_id, user_id, &content).await?;

    mentions::link_mentions(&state.repo, post_id, user_id, &content).await?;

    info!(post_id = %post_id, comment_id = comment.id, "comment added");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "Comment added successfully",
            CommentDto::from(comment),
        )),
    ))
}

/// update_comment
///
/// [Authenticated Route] Edits the caller's own comment. The new content is
/// re-scanned for mentions (append-only: removed names keep their rows).
///
/// *Authorization*: 404 for an unknown post, comment, or a comment that does
/// not belong to this post; then 403 when the caller is not the author.
#[utoipa::path(
    patch,
    path = "/careers/{id}/comments/{comment_id}",
    params(
        ("id" = Uuid, Path, description = "Post ID"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Updated", body = CommentDto),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Unknown post or comment")
    )
)]
pub async fn update_comment(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(Uuid, i64)>,
    ValidJson(payload): ValidJson<UpdateCommentRequest>,
) -> Result<Json<Envelope<CommentDto>>, ApiError> {
    state
        .repo
        .get_post(post_id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    let comment = state
        .repo
        .get_comment(comment_id)
        .await?
        .filter(|comment| comment.post_id == post_id)
        .ok_or(ApiError::NotFound("Comment"))?;
    if comment.user_id != user_id {
        return Err(ApiError::Forbidden);
    }

    let content = validate_comment(&payload.content)?;

    let updated = state
        .repo
        .update_comment(comment_id, &content)
        .await?
        .ok_or(ApiError::NotFound("Comment"))?;

    mentions::link_mentions(&state.repo, post_id, user_id, &content).await?;

    info!(post_id = %post_id, comment_id, "comment updated");

    Ok(Json(Envelope::with_message(
        "Comment updated successfully",
        updated.into(),
    )))
}

/// delete_comment
///
/// [Authenticated Route] Deletes the caller's own comment.
///
/// *Authorization*: same 404-then-403 ladder as comment update.
#[utoipa::path(
    delete,
    path = "/careers/{id}/comments/{comment_id}",
    params(
        ("id" = Uuid, Path, description = "Post ID"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Unknown post or comment")
    )
)]
pub async fn delete_comment(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(Uuid, i64)>,
) -> Result<Json<Envelope<()>>, ApiError> {
    state
        .repo
        .get_post(post_id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    let comment = state
        .repo
        .get_comment(comment_id)
        .await?
        .filter(|comment| comment.post_id == post_id)
        .ok_or(ApiError::NotFound("Comment"))?;
    if comment.user_id != user_id {
        return Err(ApiError::Forbidden);
    }

    state.repo.delete_comment(comment_id).await?;

    info!(post_id = %post_id, comment_id, "comment deleted");

    Ok(Json(Envelope::message("Comment deleted successfully")))
}

// --- Mention Handler ---

/// get_mentions
///
/// [Public Route] All users mentioned on a post (via its content or any of
/// its comments), oldest first.
#[utoipa::path(
    get,
    path = "/careers/{id}/mentions",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Mentions", body = [MentionDto]),
        (status = 404, description = "Unknown post")
    )
)]
pub async fn get_mentions(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<MentionDto>>>, ApiError> {
    state
        .repo
        .get_post(post_id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    let mentions = state.repo.get_mentions(post_id).await?;

    Ok(Json(Envelope::data(
        mentions.into_iter().map(MentionDto::from).collect(),
    )))
}
