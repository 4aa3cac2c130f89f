use crate::models::{
    Comment, CommentWithAuthor, Like, Mention, MentionWithUser, Post, PostWithStats, User,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations. This is the core
/// of the Repository Abstraction pattern, allowing the handlers to interact with
/// the data layer without knowing the specific implementation (Postgres, in-memory, etc.).
///
/// Every method returns `Result` so database failures bubble up to the
/// handlers, where they map onto the 500 branch of the error envelope instead
/// of being swallowed down here.
///
/// **Send + Sync + async_trait** are required to make the trait object (`Arc<dyn Repository>`)
/// safely shareable and usable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error>;
    // Explicit creation; fails on a taken username (unique constraint).
    async fn create_user(&self, username: &str) -> Result<User, sqlx::Error>;
    // Atomic get-or-create backing the auto-provisioning login. Race-free:
    // two first logins with the same name both resolve to the one row.
    async fn get_or_create_user(&self, username: &str) -> Result<User, sqlx::Error>;
    // Stamps last_login = now and returns the fresh row.
    async fn update_last_login(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;

    // --- Posts ---
    // Full feed, newest first. `viewer` only drives the user_liked flag.
    async fn get_posts(&self, viewer: Option<Uuid>) -> Result<Vec<PostWithStats>, sqlx::Error>;
    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, sqlx::Error>;
    async fn get_post_with_stats(
        &self,
        id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<Option<PostWithStats>, sqlx::Error>;
    async fn create_post(
        &self,
        author_id: Uuid,
        username: &str,
        title: &str,
        content: &str,
        image_url: Option<&str>,
    ) -> Result<Post, sqlx::Error>;
    // Partial update via COALESCE; also resyncs the denormalized username
    // from the author row. Ownership is the handler's job.
    async fn update_post(
        &self,
        id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<Option<Post>, sqlx::Error>;
    // Likes, comments and mentions go with it (FK cascade).
    async fn delete_post(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    // --- Likes ---
    // Returns false when the pair already existed (the unique-violation case
    // under a concurrent double-toggle), true when a row was inserted.
    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error>;
    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error>;
    async fn user_liked(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error>;
    // Always COUNT(*), never a cached counter.
    async fn count_likes(&self, post_id: Uuid) -> Result<i64, sqlx::Error>;

    // --- Comments ---
    async fn add_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<CommentWithAuthor, sqlx::Error>;
    // Oldest first.
    async fn get_comments(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>, sqlx::Error>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, sqlx::Error>;
    async fn update_comment(
        &self,
        id: i64,
        content: &str,
    ) -> Result<Option<CommentWithAuthor>, sqlx::Error>;
    async fn delete_comment(&self, id: i64) -> Result<bool, sqlx::Error>;

    // --- Mentions ---
    // Insert-ignore on the (post, user) unique constraint; true iff a new
    // row was written.
    async fn add_mention(&self, post_id: Uuid, mentioned_user_id: Uuid)
    -> Result<bool, sqlx::Error>;
    async fn get_mentions(&self, post_id: Uuid) -> Result<Vec<MentionWithUser>, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, username, is_active, created_at, last_login";
const POST_COLUMNS: &str = "id, author_id, username, title, content, image_url, created_at";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_user(&self, username: &str) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(username)
        .fetch_one(&self.pool)
        .await
    }

    /// get_or_create_user
    ///
    /// Single-round-trip upsert: the no-op DO UPDATE makes RETURNING yield the
    /// row in both the fresh and the existing case, so two racing first
    /// logins cannot create duplicates or error out.
    async fn get_or_create_user(&self, username: &str) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username) VALUES ($1, $2)
            ON CONFLICT (username) DO UPDATE SET username = EXCLUDED.username
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(username)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_last_login(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET last_login = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// get_posts
    ///
    /// The feed query. Counts come from correlated COUNT(*) subqueries and
    /// `user_liked` from an EXISTS against the viewer; a NULL viewer makes
    /// the EXISTS vacuously false, which is exactly the anonymous case.
    async fn get_posts(&self, viewer: Option<Uuid>) -> Result<Vec<PostWithStats>, sqlx::Error> {
        let query = r#"
            SELECT
                p.id, p.author_id, p.username, p.title, p.content, p.image_url, p.created_at,
                (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS likes_count,
                (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count,
                EXISTS(
                    SELECT 1 FROM likes l WHERE l.post_id = p.id AND l.user_id = $1
                ) AS user_liked
            FROM posts p
            ORDER BY p.created_at DESC
        "#;

        sqlx::query_as::<_, PostWithStats>(query)
            .bind(viewer)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_post_with_stats(
        &self,
        id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<Option<PostWithStats>, sqlx::Error> {
        let query = r#"
            SELECT
                p.id, p.author_id, p.username, p.title, p.content, p.image_url, p.created_at,
                (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS likes_count,
                (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count,
                EXISTS(
                    SELECT 1 FROM likes l WHERE l.post_id = p.id AND l.user_id = $1
                ) AS user_liked
            FROM posts p
            WHERE p.id = $2
        "#;

        sqlx::query_as::<_, PostWithStats>(query)
            .bind(viewer)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_post(
        &self,
        author_id: Uuid,
        username: &str,
        title: &str,
        content: &str,
        image_url: Option<&str>,
    ) -> Result<Post, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (id, author_id, username, title, content, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(author_id)
        .bind(username)
        .bind(title)
        .bind(content)
        .bind(image_url)
        .fetch_one(&self.pool)
        .await
    }

    /// update_post
    ///
    /// Uses the PostgreSQL `COALESCE` function to handle `Option<T>` fields,
    /// only updating a column when the corresponding argument is `Some`. The
    /// denormalized username is resynchronized from the author row on every
    /// write; an authorless post keeps its stored name.
    async fn update_post(
        &self,
        id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                image_url = COALESCE($4, image_url),
                username = COALESCE(
                    (SELECT u.username FROM users u WHERE u.id = posts.author_id),
                    username
                )
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(title)
        .bind(content)
        .bind(image_url)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// add_like
    ///
    /// Plain insert against the `(post_id, user_id)` primary key. A unique
    /// violation means a concurrent request (or an out-of-sync client) got
    /// there first: that is reported as `false`, the "already liked" case,
    /// never as an error.
    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("INSERT INTO likes (post_id, user_id) VALUES ($1, $2)")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn user_liked(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE post_id = $1 AND user_id = $2)",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn count_likes(&self, post_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await
    }

    /// add_comment
    ///
    /// Uses a CTE (Common Table Expression) to perform the insert and the
    /// username join in one query, returning the enriched row the wire
    /// format needs.
    async fn add_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<CommentWithAuthor, sqlx::Error> {
        let query = r#"
            WITH inserted AS (
                INSERT INTO comments (post_id, user_id, content)
                VALUES ($1, $2, $3)
                RETURNING id, post_id, user_id, content, created_at, updated_at
            )
            SELECT i.id, i.post_id, i.user_id, u.username, i.content, i.created_at, i.updated_at
            FROM inserted i
            JOIN users u ON i.user_id = u.id
        "#;

        sqlx::query_as::<_, CommentWithAuthor>(query)
            .bind(post_id)
            .bind(user_id)
            .bind(content)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_comments(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        let query = r#"
            SELECT c.id, c.post_id, c.user_id, u.username, c.content, c.created_at, c.updated_at
            FROM comments c
            JOIN users u ON c.user_id = u.id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC, c.id ASC
        "#;

        sqlx::query_as::<_, CommentWithAuthor>(query)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, user_id, content, created_at, updated_at FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_comment(
        &self,
        id: i64,
        content: &str,
    ) -> Result<Option<CommentWithAuthor>, sqlx::Error> {
        let query = r#"
            WITH updated AS (
                UPDATE comments
                SET content = $2, updated_at = NOW()
                WHERE id = $1
                RETURNING id, post_id, user_id, content, created_at, updated_at
            )
            SELECT d.id, d.post_id, d.user_id, u.username, d.content, d.created_at, d.updated_at
            FROM updated d
            JOIN users u ON d.user_id = u.id
        "#;

        sqlx::query_as::<_, CommentWithAuthor>(query)
            .bind(id)
            .bind(content)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// add_mention
    ///
    /// `ON CONFLICT DO NOTHING` on the `(post_id, mentioned_user_id)` unique
    /// constraint makes re-mentioning a no-op; `rows_affected` distinguishes
    /// a fresh mention from a repeat.
    async fn add_mention(
        &self,
        post_id: Uuid,
        mentioned_user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO mentions (post_id, mentioned_user_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, mentioned_user_id) DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(mentioned_user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_mentions(&self, post_id: Uuid) -> Result<Vec<MentionWithUser>, sqlx::Error> {
        let query = r#"
            SELECT m.id, m.post_id, m.mentioned_user_id,
                   u.username AS mentioned_username, m.created_at
            FROM mentions m
            JOIN users u ON m.mentioned_user_id = u.id
            WHERE m.post_id = $1
            ORDER BY m.created_at ASC, m.id ASC
        "#;

        sqlx::query_as::<_, MentionWithUser>(query)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
    }
}

/// MemoryRepository
///
/// Full in-memory implementation of the `Repository` trait. Backs the
/// router-level and end-to-end test suites so they run without a database,
/// and mirrors the Postgres semantics relevant to them: unique usernames,
/// unique like pairs, insert-ignore mentions, cascade on post delete.
#[derive(Default)]
pub struct MemoryRepository {
    inner: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    posts: Vec<Post>,
    likes: Vec<Like>,
    comments: Vec<Comment>,
    mentions: Vec<Mention>,
    next_comment_id: i64,
    next_mention_id: i64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        // A poisoned lock means a panic mid-test; propagating it is fine.
        self.inner.lock().unwrap()
    }

    /// Seeds a user directly, bypassing the login flow. Test convenience.
    pub fn seed_user(&self, username: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        };
        self.state().users.push(user.clone());
        user
    }

    /// Flips is_active on a seeded user. Test convenience.
    pub fn deactivate_user(&self, id: Uuid) {
        let mut state = self.state();
        if let Some(user) = state.users.iter_mut().find(|u| u.id == id) {
            user.is_active = false;
        }
    }
}

fn join_comment(state: &MemoryState, comment: &Comment) -> CommentWithAuthor {
    let username = state
        .users
        .iter()
        .find(|u| u.id == comment.user_id)
        .map(|u| u.username.clone())
        .unwrap_or_else(|| "Anonymous".to_string());

    CommentWithAuthor {
        id: comment.id,
        post_id: comment.post_id,
        user_id: comment.user_id,
        username,
        content: comment.content.clone(),
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }
}

fn with_stats(state: &MemoryState, post: &Post, viewer: Option<Uuid>) -> PostWithStats {
    let likes_count = state.likes.iter().filter(|l| l.post_id == post.id).count() as i64;
    let comments_count = state
        .comments
        .iter()
        .filter(|c| c.post_id == post.id)
        .count() as i64;
    let user_liked = viewer
        .map(|v| {
            state
                .likes
                .iter()
                .any(|l| l.post_id == post.id && l.user_id == v)
        })
        .unwrap_or(false);

    PostWithStats {
        id: post.id,
        author_id: post.author_id,
        username: post.username.clone(),
        title: post.title.clone(),
        content: post.content.clone(),
        image_url: post.image_url.clone(),
        created_at: post.created_at,
        likes_count,
        comments_count,
        user_liked,
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self.state().users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, username: &str) -> Result<User, sqlx::Error> {
        let mut state = self.state();
        if state.users.iter().any(|u| u.username == username) {
            // Stands in for the unique-constraint failure Postgres would raise.
            return Err(sqlx::Error::Protocol("duplicate username".into()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn get_or_create_user(&self, username: &str) -> Result<User, sqlx::Error> {
        let mut state = self.state();
        if let Some(user) = state.users.iter().find(|u| u.username == username) {
            return Ok(user.clone());
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn update_last_login(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let mut state = self.state();
        Ok(state.users.iter_mut().find(|u| u.id == id).map(|user| {
            user.last_login = Some(Utc::now());
            user.clone()
        }))
    }

    async fn get_posts(&self, viewer: Option<Uuid>) -> Result<Vec<PostWithStats>, sqlx::Error> {
        let state = self.state();
        // Insertion order is creation order; newest first means reversed.
        Ok(state
            .posts
            .iter()
            .rev()
            .map(|p| with_stats(&state, p, viewer))
            .collect())
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        Ok(self.state().posts.iter().find(|p| p.id == id).cloned())
    }

    async fn get_post_with_stats(
        &self,
        id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<Option<PostWithStats>, sqlx::Error> {
        let state = self.state();
        Ok(state
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| with_stats(&state, p, viewer)))
    }

    async fn create_post(
        &self,
        author_id: Uuid,
        username: &str,
        title: &str,
        content: &str,
        image_url: Option<&str>,
    ) -> Result<Post, sqlx::Error> {
        let post = Post {
            id: Uuid::new_v4(),
            author_id: Some(author_id),
            username: username.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            image_url: image_url.map(str::to_string),
            created_at: Utc::now(),
        };
        self.state().posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(
        &self,
        id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<Option<Post>, sqlx::Error> {
        let mut state = self.state();

        let resynced_username = state.posts.iter().find(|p| p.id == id).and_then(|post| {
            post.author_id.and_then(|author| {
                state
                    .users
                    .iter()
                    .find(|u| u.id == author)
                    .map(|u| u.username.clone())
            })
        });

        Ok(state.posts.iter_mut().find(|p| p.id == id).map(|post| {
            if let Some(title) = title {
                post.title = title.to_string();
            }
            if let Some(content) = content {
                post.content = content.to_string();
            }
            if let Some(image_url) = image_url {
                post.image_url = Some(image_url.to_string());
            }
            if let Some(username) = resynced_username {
                post.username = username;
            }
            post.clone()
        }))
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut state = self.state();
        let before = state.posts.len();
        state.posts.retain(|p| p.id != id);
        let deleted = state.posts.len() < before;

        if deleted {
            // FK cascade equivalent.
            state.likes.retain(|l| l.post_id != id);
            state.comments.retain(|c| c.post_id != id);
            state.mentions.retain(|m| m.post_id != id);
        }

        Ok(deleted)
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut state = self.state();
        if state
            .likes
            .iter()
            .any(|l| l.post_id == post_id && l.user_id == user_id)
        {
            return Ok(false);
        }
        state.likes.push(Like { post_id, user_id });
        Ok(true)
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut state = self.state();
        let before = state.likes.len();
        state
            .likes
            .retain(|l| !(l.post_id == post_id && l.user_id == user_id));
        Ok(state.likes.len() < before)
    }

    async fn user_liked(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(self
            .state()
            .likes
            .iter()
            .any(|l| l.post_id == post_id && l.user_id == user_id))
    }

    async fn count_likes(&self, post_id: Uuid) -> Result<i64, sqlx::Error> {
        Ok(self
            .state()
            .likes
            .iter()
            .filter(|l| l.post_id == post_id)
            .count() as i64)
    }

    async fn add_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<CommentWithAuthor, sqlx::Error> {
        let mut state = self.state();
        state.next_comment_id += 1;

        let now = Utc::now();
        let comment = Comment {
            id: state.next_comment_id,
            post_id,
            user_id,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.comments.push(comment.clone());
        Ok(join_comment(&state, &comment))
    }

    async fn get_comments(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        let state = self.state();
        Ok(state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| join_comment(&state, c))
            .collect())
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, sqlx::Error> {
        Ok(self.state().comments.iter().find(|c| c.id == id).cloned())
    }

    async fn update_comment(
        &self,
        id: i64,
        content: &str,
    ) -> Result<Option<CommentWithAuthor>, sqlx::Error> {
        let mut state = self.state();

        let updated = match state.comments.iter_mut().find(|c| c.id == id) {
            Some(comment) => {
                comment.content = content.to_string();
                comment.updated_at = Utc::now();
                comment.clone()
            }
            None => return Ok(None),
        };

        Ok(Some(join_comment(&state, &updated)))
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut state = self.state();
        let before = state.comments.len();
        state.comments.retain(|c| c.id != id);
        Ok(state.comments.len() < before)
    }

    async fn add_mention(
        &self,
        post_id: Uuid,
        mentioned_user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let mut state = self.state();
        if state
            .mentions
            .iter()
            .any(|m| m.post_id == post_id && m.mentioned_user_id == mentioned_user_id)
        {
            return Ok(false);
        }

        state.next_mention_id += 1;
        let mention = Mention {
            id: state.next_mention_id,
            post_id,
            mentioned_user_id,
            created_at: Utc::now(),
        };
        state.mentions.push(mention);
        Ok(true)
    }

    async fn get_mentions(&self, post_id: Uuid) -> Result<Vec<MentionWithUser>, sqlx::Error> {
        let state = self.state();
        Ok(state
            .mentions
            .iter()
            .filter(|m| m.post_id == post_id)
            .map(|m| {
                let mentioned_username = state
                    .users
                    .iter()
                    .find(|u| u.id == m.mentioned_user_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default();

                MentionWithUser {
                    id: m.id,
                    post_id: m.post_id,
                    mentioned_user_id: m.mentioned_user_id,
                    mentioned_username,
                    created_at: m.created_at,
                }
            })
            .collect())
    }
}
