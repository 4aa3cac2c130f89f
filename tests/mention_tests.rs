use career_wall::{
    mentions::{extract_mentions, link_mentions},
    repository::{MemoryRepository, Repository, RepositoryState},
};
use std::sync::Arc;

// --- Extraction (pure, no repository) ---

#[test]
fn test_extracts_single_mention() {
    assert_eq!(extract_mentions("hello @alice"), vec!["alice".to_string()]);
}

#[test]
fn test_extracts_multiple_in_order() {
    let found = extract_mentions("@carol then @bob then @alice");
    assert_eq!(
        found,
        vec!["carol".to_string(), "bob".to_string(), "alice".to_string()]
    );
}

#[test]
fn test_extraction_keeps_duplicates() {
    // Dedupe is the persistence layer's job, not the scanner's.
    let found = extract_mentions("@bob and @bob again");
    assert_eq!(found, vec!["bob".to_string(), "bob".to_string()]);
}

#[test]
fn test_punctuation_ends_a_mention() {
    assert_eq!(extract_mentions("thanks @alice!"), vec!["alice".to_string()]);
    assert_eq!(extract_mentions("(cc @bob)"), vec!["bob".to_string()]);
    assert_eq!(extract_mentions("@a.b"), vec!["a".to_string()]);
}

#[test]
fn test_underscores_and_digits_are_part_of_names() {
    assert_eq!(extract_mentions("ping @user_42"), vec!["user_42".to_string()]);
}

#[test]
fn test_bare_at_sign_matches_nothing() {
    assert!(extract_mentions("meet @ noon").is_empty());
    assert!(extract_mentions("no handles here").is_empty());
    assert!(extract_mentions("").is_empty());
}

#[test]
fn test_email_domain_is_scanned_like_any_token() {
    // The scanner is intentionally naive: "user@example.com" yields
    // "example". Linking drops it unless a user by that name exists.
    assert_eq!(
        extract_mentions("mail user@example.com"),
        vec!["example".to_string()]
    );
}

// --- Linking (repository-backed) ---

fn seeded_repo() -> (RepositoryState, Arc<MemoryRepository>) {
    let repo = Arc::new(MemoryRepository::new());
    let state: RepositoryState = repo.clone();
    (state, repo)
}

#[tokio::test]
async fn test_link_dedupes_repeated_handles() {
    let (state, repo) = seeded_repo();
    let author = repo.seed_user("author");
    let bob = repo.seed_user("bob");
    let post = repo
        .create_post(author.id, "author", "T", "B", None)
        .await
        .unwrap();

    let linked = link_mentions(&state, post.id, author.id, "@bob @bob @bob")
        .await
        .unwrap();
    assert_eq!(linked, 1);

    let rows = repo.get_mentions(post.id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].mentioned_user_id, bob.id);
}

#[tokio::test]
async fn test_link_skips_the_writer() {
    let (state, repo) = seeded_repo();
    let author = repo.seed_user("selfish");
    let post = repo
        .create_post(author.id, "selfish", "T", "B", None)
        .await
        .unwrap();

    let linked = link_mentions(&state, post.id, author.id, "by @selfish")
        .await
        .unwrap();
    assert_eq!(linked, 0);
    assert!(repo.get_mentions(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_link_drops_unknown_handles_silently() {
    let (state, repo) = seeded_repo();
    let author = repo.seed_user("author");
    let post = repo
        .create_post(author.id, "author", "T", "B", None)
        .await
        .unwrap();

    let linked = link_mentions(&state, post.id, author.id, "hi @ghost and @phantom")
        .await
        .unwrap();
    assert_eq!(linked, 0);
    assert!(repo.get_mentions(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_relinking_same_content_adds_nothing() {
    let (state, repo) = seeded_repo();
    let author = repo.seed_user("author");
    repo.seed_user("bob");
    let post = repo
        .create_post(author.id, "author", "T", "B", None)
        .await
        .unwrap();

    // An edit that keeps the handle re-runs linking; count stays one.
    assert_eq!(
        link_mentions(&state, post.id, author.id, "cc @bob").await.unwrap(),
        1
    );
    assert_eq!(
        link_mentions(&state, post.id, author.id, "cc @bob, still").await.unwrap(),
        0
    );
    assert_eq!(repo.get_mentions(post.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_link_preserves_first_appearance_order() {
    let (state, repo) = seeded_repo();
    let author = repo.seed_user("author");
    repo.seed_user("carol");
    repo.seed_user("bob");
    let post = repo
        .create_post(author.id, "author", "T", "B", None)
        .await
        .unwrap();

    link_mentions(&state, post.id, author.id, "@carol saw it before @bob")
        .await
        .unwrap();

    let names: Vec<String> = repo
        .get_mentions(post.id)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.mentioned_username)
        .collect();
    assert_eq!(names, vec!["carol".to_string(), "bob".to_string()]);
}
