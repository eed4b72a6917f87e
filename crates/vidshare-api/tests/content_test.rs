//! Video, comment, tweet, playlist and dashboard integration tests.
//!
//! Run with: `cargo test -p vidshare-api --test content_test -- --ignored`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::auth::create_logged_in_user;
use helpers::{api_path, fixtures, setup_test_app};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires docker"]
async fn publish_video_stores_both_files() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = create_logged_in_user(client, app.pool(), "creator").await;

    let form = MultipartForm::new()
        .add_text("title", "My first video")
        .add_text("description", "Shot on a phone")
        .add_part(
            "videoFile",
            Part::bytes(b"not really an mp4".to_vec())
                .file_name("clip.mp4")
                .mime_type("video/mp4"),
        )
        .add_part(
            "thumbnail",
            Part::bytes(fixtures::create_minimal_png())
                .file_name("thumb.png")
                .mime_type("image/png"),
        );

    let response = client
        .post(&api_path("/videos"))
        .add_header("Authorization", user.bearer())
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 201, "{}", response.text());
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["title"], "My first video");
    assert_eq!(body["data"]["isPublished"], true);
    assert_eq!(body["data"]["owner"]["username"], "creator");

    let video_url = body["data"]["videoFile"].as_str().unwrap();
    let key = app.storage.key_from_url(video_url).expect("local media url");
    assert!(app.storage.exists(&key).await.unwrap());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn publish_video_requires_both_files() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = create_logged_in_user(client, app.pool(), "halfway").await;

    let form = MultipartForm::new()
        .add_text("title", "No thumbnail")
        .add_text("description", "Missing a part")
        .add_part(
            "videoFile",
            Part::bytes(b"data".to_vec())
                .file_name("clip.mp4")
                .mime_type("video/mp4"),
        );

    let response = client
        .post(&api_path("/videos"))
        .add_header("Authorization", user.bearer())
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "video file and thumbnail, both are required");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn viewing_a_video_counts_a_view_and_records_history() {
    let app = setup_test_app().await;
    let client = app.client();
    let owner = create_logged_in_user(client, app.pool(), "director").await;
    let viewer = create_logged_in_user(client, app.pool(), "audience").await;
    let video = fixtures::create_video(app.pool(), owner.id, "Premiere").await;
    let path = api_path(&format!("/videos/{}", video.id));

    for expected_views in 1..=2 {
        let response = client.get(&path).add_header("Authorization", viewer.bearer()).await;
        assert_eq!(response.status_code(), 200);
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["views"], expected_views);
        assert_eq!(body["data"]["likesCount"], 0);
    }

    let history: serde_json::Value = client
        .get(&api_path("/users/history"))
        .add_header("Authorization", viewer.bearer())
        .await
        .json();
    assert_eq!(history["data"]["totalCount"], 1);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn unpublished_videos_are_visible_only_to_their_owner() {
    let app = setup_test_app().await;
    let client = app.client();
    let owner = create_logged_in_user(client, app.pool(), "shy").await;
    let other = create_logged_in_user(client, app.pool(), "curious").await;
    let video = fixtures::create_video(app.pool(), owner.id, "Draft").await;

    let toggled = client
        .patch(&api_path(&format!("/videos/toggle/publish/{}", video.id)))
        .add_header("Authorization", owner.bearer())
        .await;
    assert_eq!(toggled.status_code(), 200);
    let body: serde_json::Value = toggled.json();
    assert_eq!(body["data"]["isPublished"], false);

    let hidden = client
        .get(&api_path(&format!("/videos/{}", video.id)))
        .add_header("Authorization", other.bearer())
        .await;
    assert_eq!(hidden.status_code(), 404);

    let listing: serde_json::Value = client
        .get(&api_path(&format!("/videos?userId={}", owner.id)))
        .add_header("Authorization", other.bearer())
        .await
        .json();
    assert_eq!(listing["data"]["totalCount"], 0);

    let own: serde_json::Value = client
        .get(&api_path("/dashboard/videos"))
        .add_header("Authorization", owner.bearer())
        .await
        .json();
    assert_eq!(own["data"]["totalCount"], 1);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn video_listing_filters_and_paginates() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = create_logged_in_user(client, app.pool(), "lister").await;
    for title in ["Rust intro", "Rust async", "Cooking pasta"] {
        fixtures::create_video(app.pool(), user.id, title).await;
    }

    let page: serde_json::Value = client
        .get(&api_path("/videos?query=rust&limit=1&page=2&sortBy=title&sortType=asc"))
        .add_header("Authorization", user.bearer())
        .await
        .json();
    assert_eq!(page["data"]["totalCount"], 2);
    assert_eq!(page["data"]["totalPages"], 2);
    assert_eq!(page["data"]["currentPage"], 2);
    assert_eq!(page["data"]["items"][0]["title"], "Rust intro");

    let bad_user = client
        .get(&api_path("/videos?userId=abc"))
        .add_header("Authorization", user.bearer())
        .await;
    assert_eq!(bad_user.status_code(), 400);

    let unknown_user = client
        .get(&api_path(&format!("/videos?userId={}", Uuid::new_v4())))
        .add_header("Authorization", user.bearer())
        .await;
    assert_eq!(unknown_user.status_code(), 404);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn ownership_guard_distinguishes_missing_foreign_and_malformed() {
    let app = setup_test_app().await;
    let client = app.client();
    let owner = create_logged_in_user(client, app.pool(), "keeper").await;
    let intruder = create_logged_in_user(client, app.pool(), "intruder").await;
    let video = fixtures::create_video(app.pool(), owner.id, "Mine").await;

    let foreign = client
        .delete(&api_path(&format!("/videos/{}", video.id)))
        .add_header("Authorization", intruder.bearer())
        .await;
    assert_eq!(foreign.status_code(), 403);

    let missing = client
        .delete(&api_path(&format!("/videos/{}", Uuid::new_v4())))
        .add_header("Authorization", owner.bearer())
        .await;
    assert_eq!(missing.status_code(), 404);

    let malformed = client
        .delete(&api_path("/videos/12345"))
        .add_header("Authorization", owner.bearer())
        .await;
    assert_eq!(malformed.status_code(), 400);

    let deleted = client
        .delete(&api_path(&format!("/videos/{}", video.id)))
        .add_header("Authorization", owner.bearer())
        .await;
    assert_eq!(deleted.status_code(), 200);

    let gone = client
        .get(&api_path(&format!("/videos/{}", video.id)))
        .add_header("Authorization", owner.bearer())
        .await;
    assert_eq!(gone.status_code(), 404);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn video_update_rejects_unchanged_details() {
    let app = setup_test_app().await;
    let client = app.client();
    let owner = create_logged_in_user(client, app.pool(), "editor").await;
    let video = fixtures::create_video(app.pool(), owner.id, "Draft").await;
    let path = api_path(&format!("/videos/{}", video.id));

    let same = client
        .patch(&path)
        .add_header("Authorization", owner.bearer())
        .multipart(
            MultipartForm::new()
                .add_text("title", "Draft")
                .add_text("description", "Draft description"),
        )
        .await;
    assert_eq!(same.status_code(), 400);
    let body: serde_json::Value = same.json();
    assert_eq!(
        body["message"],
        "New title and description are identical to the current ones"
    );

    let retitled = client
        .patch(&path)
        .add_header("Authorization", owner.bearer())
        .multipart(
            MultipartForm::new()
                .add_text("title", "Final cut")
                .add_text("description", "Draft description"),
        )
        .await;
    assert_eq!(retitled.status_code(), 200);
    let body: serde_json::Value = retitled.json();
    assert_eq!(body["data"]["title"], "Final cut");
    assert_eq!(body["data"]["description"], "Draft description");
    assert_eq!(body["data"]["owner"]["username"], "editor");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn comment_lifecycle() {
    let app = setup_test_app().await;
    let client = app.client();
    let author = create_logged_in_user(client, app.pool(), "commenter").await;
    let other = create_logged_in_user(client, app.pool(), "bystander").await;
    let video = fixtures::create_video(app.pool(), author.id, "Discuss").await;

    let empty = client
        .post(&api_path(&format!("/comments/{}", video.id)))
        .add_header("Authorization", author.bearer())
        .json(&json!({ "content": "   " }))
        .await;
    assert_eq!(empty.status_code(), 400);

    let created = client
        .post(&api_path(&format!("/comments/{}", video.id)))
        .add_header("Authorization", author.bearer())
        .json(&json!({ "content": "Great video" }))
        .await;
    assert_eq!(created.status_code(), 201);
    let body: serde_json::Value = created.json();
    let comment_id = body["data"]["id"].as_str().unwrap().to_string();
    let path = api_path(&format!("/comments/c/{}", comment_id));

    let same = client
        .patch(&path)
        .add_header("Authorization", author.bearer())
        .json(&json!({ "newContent": "Great video" }))
        .await;
    assert_eq!(same.status_code(), 400);

    let foreign = client
        .patch(&path)
        .add_header("Authorization", other.bearer())
        .json(&json!({ "newContent": "Hijacked" }))
        .await;
    assert_eq!(foreign.status_code(), 403);

    let edited = client
        .patch(&path)
        .add_header("Authorization", author.bearer())
        .json(&json!({ "newContent": "Great video, watched twice" }))
        .await;
    assert_eq!(edited.status_code(), 200);
    let body: serde_json::Value = edited.json();
    assert!(body["data"]["editedAt"].is_string());
    assert_eq!(body["data"]["content"], "Great video, watched twice");
    assert_eq!(body["data"]["owner"]["username"], "commenter");

    let listing: serde_json::Value = client
        .get(&api_path(&format!("/comments/{}", video.id)))
        .add_header("Authorization", other.bearer())
        .await
        .json();
    assert_eq!(listing["data"]["totalCount"], 1);
    assert_eq!(listing["data"]["items"][0]["owner"]["username"], "commenter");

    let deleted = client
        .delete(&path)
        .add_header("Authorization", author.bearer())
        .await;
    assert_eq!(deleted.status_code(), 200);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn tweet_update_rejects_identical_content() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = create_logged_in_user(client, app.pool(), "tweeter").await;

    let missing = client
        .post(&api_path("/tweets"))
        .add_header("Authorization", user.bearer())
        .json(&json!({}))
        .await;
    assert_eq!(missing.status_code(), 400);

    let created: serde_json::Value = client
        .post(&api_path("/tweets"))
        .add_header("Authorization", user.bearer())
        .json(&json!({ "content": "hello world" }))
        .await
        .json();
    let tweet_id = created["data"]["id"].as_str().unwrap().to_string();

    let same = client
        .patch(&api_path(&format!("/tweets/{}", tweet_id)))
        .add_header("Authorization", user.bearer())
        .json(&json!({ "newContent": "hello world" }))
        .await;
    assert_eq!(same.status_code(), 400);
    let body: serde_json::Value = same.json();
    assert_eq!(body["message"], "New content is identical to existing content");

    let changed = client
        .patch(&api_path(&format!("/tweets/{}", tweet_id)))
        .add_header("Authorization", user.bearer())
        .json(&json!({ "newContent": "hello again" }))
        .await;
    assert_eq!(changed.status_code(), 200);
    let body: serde_json::Value = changed.json();
    assert_eq!(body["data"]["content"], "hello again");
    assert_eq!(body["data"]["owner"]["username"], "tweeter");
    assert_eq!(body["data"]["likesCount"], 0);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn playlist_names_are_unique_per_owner() {
    let app = setup_test_app().await;
    let client = app.client();
    let first = create_logged_in_user(client, app.pool(), "curator").await;
    let second = create_logged_in_user(client, app.pool(), "collector").await;

    let create = |user: &helpers::auth::TestUser| {
        client
            .post(&api_path("/playlist"))
            .add_header("Authorization", user.bearer())
            .json(&json!({ "name": "Favourites", "description": "Best of" }))
    };

    assert_eq!(create(&first).await.status_code(), 201);
    let duplicate = create(&first).await;
    assert_eq!(duplicate.status_code(), 409);
    let body: serde_json::Value = duplicate.json();
    assert_eq!(body["message"], "You already have a playlist with this name.");

    assert_eq!(create(&second).await.status_code(), 201);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn playlist_membership_is_a_set() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = create_logged_in_user(client, app.pool(), "mixer").await;
    let video = fixtures::create_video(app.pool(), user.id, "Track").await;

    let playlist: serde_json::Value = client
        .post(&api_path("/playlist"))
        .add_header("Authorization", user.bearer())
        .json(&json!({ "name": "Mix" }))
        .await
        .json();
    let playlist_id = playlist["data"]["id"].as_str().unwrap().to_string();
    let add = api_path(&format!("/playlist/add/{}/{}", video.id, playlist_id));

    for _ in 0..2 {
        let response = client.patch(&add).add_header("Authorization", user.bearer()).await;
        assert_eq!(response.status_code(), 200);
    }

    let detail: serde_json::Value = client
        .get(&api_path(&format!("/playlist/{}", playlist_id)))
        .add_header("Authorization", user.bearer())
        .await
        .json();
    assert_eq!(detail["data"]["videos"].as_array().unwrap().len(), 1);

    let listing: serde_json::Value = client
        .get(&api_path(&format!("/playlist/user/{}", user.id)))
        .add_header("Authorization", user.bearer())
        .await
        .json();
    assert_eq!(listing["data"]["items"][0]["videoCount"], 1);

    let remove = api_path(&format!("/playlist/remove/{}/{}", video.id, playlist_id));
    let removed = client.patch(&remove).add_header("Authorization", user.bearer()).await;
    assert_eq!(removed.status_code(), 200);
    let again = client.patch(&remove).add_header("Authorization", user.bearer()).await;
    assert_eq!(again.status_code(), 400);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn dashboard_stats_aggregate_the_channel() {
    let app = setup_test_app().await;
    let client = app.client();
    let owner = create_logged_in_user(client, app.pool(), "studio").await;
    let fan = create_logged_in_user(client, app.pool(), "follower").await;
    let video = fixtures::create_video(app.pool(), owner.id, "Hit").await;
    fixtures::create_video(app.pool(), owner.id, "Flop").await;

    client
        .get(&api_path(&format!("/videos/{}", video.id)))
        .add_header("Authorization", fan.bearer())
        .await;
    client
        .post(&api_path(&format!("/likes/toggle/v/{}", video.id)))
        .add_header("Authorization", fan.bearer())
        .await;
    client
        .post(&api_path(&format!("/subscriptions/c/{}", owner.id)))
        .add_header("Authorization", fan.bearer())
        .await;

    let stats = client
        .get(&api_path("/dashboard/stats"))
        .add_header("Authorization", owner.bearer())
        .await;
    assert_eq!(stats.status_code(), 200);
    let body: serde_json::Value = stats.json();
    assert_eq!(body["data"]["totalVideos"], 2);
    assert_eq!(body["data"]["totalViews"], 1);
    assert_eq!(body["data"]["totalLikes"], 1);
    assert_eq!(body["data"]["totalSubscribers"], 1);
}
