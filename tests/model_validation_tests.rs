use career_wall::models::{
    CommentWithAuthor, Envelope, Post, PostDto, PostWithStats, UpdatePostRequest, User, UserDto,
};
use chrono::Utc;
use uuid::Uuid;

// The frontend contract lives in these serialized shapes: legacy key names,
// omitted-when-absent envelope fields, partial-update optionality. Each test
// pins one piece of that contract.

// --- Wire Field Names ---

#[test]
fn test_post_dto_uses_legacy_field_names() {
    let row = PostWithStats {
        id: Uuid::new_v4(),
        username: "poster".to_string(),
        title: "Title".to_string(),
        content: "Body".to_string(),
        image_url: Some("https://img.example/x.png".to_string()),
        created_at: Utc::now(),
        likes_count: 3,
        comments_count: 1,
        user_liked: true,
        ..Default::default()
    };

    let json_output = serde_json::to_string(&PostDto::from(row)).unwrap();

    // CRITICAL: clients read `created_datetime` and `image`, not the column
    // names the database uses.
    assert!(json_output.contains(r#""created_datetime":"#));
    assert!(json_output.contains(r#""image":"#));
    assert!(!json_output.contains("image_url"));
    assert!(!json_output.contains(r#""created_at""#));
    assert!(json_output.contains(r#""likes_count":3"#));
}

#[test]
fn test_fresh_post_dto_has_zeroed_stats() {
    let row = Post {
        id: Uuid::new_v4(),
        author_id: Some(Uuid::new_v4()),
        username: "poster".to_string(),
        title: "Title".to_string(),
        content: "Body".to_string(),
        image_url: None,
        created_at: Utc::now(),
    };

    let dto = PostDto::from(row.clone());

    // A just-created post cannot have been liked or commented on yet.
    assert_eq!(dto.likes_count, 0);
    assert_eq!(dto.comments_count, 0);
    assert!(!dto.user_liked);
    assert_eq!(dto.created_datetime, row.created_at);
    assert_eq!(dto.image, None);
}

#[test]
fn test_user_dto_renames_created_at_to_date_joined() {
    let user = User {
        id: Uuid::new_v4(),
        username: "newcomer".to_string(),
        is_active: true,
        created_at: Utc::now(),
        last_login: None,
    };

    let json_output = serde_json::to_string(&UserDto::from(user)).unwrap();

    assert!(json_output.contains(r#""date_joined":"#));
    assert!(!json_output.contains("created_at"));
    assert!(!json_output.contains("is_active")); // internal flag, never on the wire
}

#[test]
fn test_comment_dto_hides_foreign_keys() {
    let row = CommentWithAuthor {
        id: 7,
        post_id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        username: "commenter".to_string(),
        content: "Nice one".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let json_output =
        serde_json::to_string(&career_wall::models::CommentDto::from(row)).unwrap();

    assert!(json_output.contains(r#""username":"commenter""#));
    assert!(!json_output.contains("post_id"));
    assert!(!json_output.contains("user_id"));
}

// --- Envelope ---

#[test]
fn test_envelope_omits_absent_fields() {
    let message_only = serde_json::to_string(&Envelope::message("Done")).unwrap();
    assert!(message_only.contains(r#""success":true"#));
    assert!(message_only.contains(r#""message":"Done""#));
    assert!(!message_only.contains("data"));

    let data_only = serde_json::to_string(&Envelope::data(vec![1, 2, 3])).unwrap();
    assert!(data_only.contains(r#""data":[1,2,3]"#));
    assert!(!data_only.contains("message"));

    let both = serde_json::to_string(&Envelope::with_message("Saved", 42)).unwrap();
    assert!(both.contains(r#""message":"Saved""#));
    assert!(both.contains(r#""data":42"#));
}

#[test]
fn test_envelope_parses_with_fields_missing() {
    // Clients (and our own test helpers) deserialize minimal envelopes.
    let parsed: Envelope<()> = serde_json::from_str(r#"{"success":false}"#).unwrap();
    assert!(!parsed.success);
    assert!(parsed.message.is_none());
    assert!(parsed.data.is_none());
}

// --- Partial Updates ---

#[test]
fn test_update_post_request_optionality() {
    // This confirms the structure supports partial updates (all fields are Option<T>)
    let partial_update = UpdatePostRequest {
        title: Some("New Title Only".to_string()),
        content: None,
    };

    let json_output = serde_json::to_string(&partial_update).unwrap();
    assert!(json_output.contains(r#""title":"New Title Only""#));
    assert!(!json_output.contains("content")); // None fields are omitted
}
