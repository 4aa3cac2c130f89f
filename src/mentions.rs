use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use uuid::Uuid;

use crate::repository::RepositoryState;

// "@" followed by one or more word characters. "@alice!" captures "alice";
// a bare "@" matches nothing.
static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)").expect("valid pattern"));

/// extract_mentions
///
/// Scans free text for @username tokens, in order of first appearance.
/// Duplicates are NOT removed here: the unique constraint on the mentions
/// table absorbs them, so extraction stays a dumb scan.
pub fn extract_mentions(content: &str) -> Vec<String> {
    MENTION_RE
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// link_mentions
///
/// Resolves the @username tokens in `content` and records a mention on
/// `post_id` for each one that maps to a real user other than the writer.
/// Unresolvable tokens are dropped silently (logged at debug, never an
/// error), and re-mentioning an already-mentioned user is a no-op. Returns
/// how many new mention rows were written.
///
/// Called with post content on post create/update and with comment content on
/// comment create/update; mentions always attach to the post.
pub async fn link_mentions(
    repo: &RepositoryState,
    post_id: Uuid,
    writer_id: Uuid,
    content: &str,
) -> Result<usize, sqlx::Error> {
    let mut linked = 0;

    for username in extract_mentions(content) {
        match repo.get_user_by_username(&username).await? {
            Some(user) if user.id == writer_id => {
                debug!(%post_id, username, "skipping self-mention");
            }
            Some(user) => {
                if repo.add_mention(post_id, user.id).await? {
                    linked += 1;
                }
            }
            None => {
                debug!(%post_id, username, "mention does not match any user");
            }
        }
    }

    Ok(linked)
}
