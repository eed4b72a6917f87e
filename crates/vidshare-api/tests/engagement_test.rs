//! Like and subscription toggle integration tests.
//!
//! Run with: `cargo test -p vidshare-api --test engagement_test -- --ignored`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::auth::create_logged_in_user;
use helpers::{api_path, fixtures, setup_test_app};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires docker"]
async fn video_like_toggles_on_and_off() {
    let app = setup_test_app().await;
    let client = app.client();
    let owner = create_logged_in_user(client, app.pool(), "owner").await;
    let fan = create_logged_in_user(client, app.pool(), "fan").await;
    let video = fixtures::create_video(app.pool(), owner.id, "Toggle me").await;
    let path = api_path(&format!("/likes/toggle/v/{}", video.id));

    let first = client.post(&path).add_header("Authorization", fan.bearer()).await;
    assert_eq!(first.status_code(), 200);
    let body: serde_json::Value = first.json();
    assert_eq!(body["data"]["added"], true);
    assert_eq!(body["data"]["record"]["videoId"], video.id.to_string());
    assert_eq!(body["message"], "Video liked successfully");

    let feed = client
        .get(&api_path("/likes/videos"))
        .add_header("Authorization", fan.bearer())
        .await;
    let feed: serde_json::Value = feed.json();
    assert_eq!(feed["data"]["totalCount"], 1);
    assert_eq!(feed["data"]["items"][0]["isLiked"], true);

    let second = client.post(&path).add_header("Authorization", fan.bearer()).await;
    assert_eq!(second.status_code(), 200);
    let body: serde_json::Value = second.json();
    assert_eq!(body["data"]["added"], false);
    assert_eq!(body["message"], "Video unliked successfully");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE video_id = $1")
        .bind(video.id)
        .fetch_one(app.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn toggle_targets_must_exist_and_be_well_formed() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = create_logged_in_user(client, app.pool(), "liker").await;

    let malformed = client
        .post(&api_path("/likes/toggle/t/not-a-uuid"))
        .add_header("Authorization", user.bearer())
        .await;
    assert_eq!(malformed.status_code(), 400);

    for path in [
        format!("/likes/toggle/v/{}", Uuid::new_v4()),
        format!("/likes/toggle/c/{}", Uuid::new_v4()),
        format!("/likes/toggle/t/{}", Uuid::new_v4()),
        format!("/subscriptions/c/{}", Uuid::new_v4()),
    ] {
        let response = client
            .post(&api_path(&path))
            .add_header("Authorization", user.bearer())
            .await;
        assert_eq!(response.status_code(), 404, "{}", path);
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn comment_and_tweet_likes_are_independent() {
    let app = setup_test_app().await;
    let client = app.client();
    let author = create_logged_in_user(client, app.pool(), "author").await;
    let video = fixtures::create_video(app.pool(), author.id, "Talk").await;

    let comment: serde_json::Value = client
        .post(&api_path(&format!("/comments/{}", video.id)))
        .add_header("Authorization", author.bearer())
        .json(&json!({ "content": "first" }))
        .await
        .json();
    let comment_id = comment["data"]["id"].as_str().unwrap().to_string();

    let tweet: serde_json::Value = client
        .post(&api_path("/tweets"))
        .add_header("Authorization", author.bearer())
        .json(&json!({ "content": "hello" }))
        .await
        .json();
    let tweet_id = tweet["data"]["id"].as_str().unwrap().to_string();

    let liked_comment: serde_json::Value = client
        .post(&api_path(&format!("/likes/toggle/c/{}", comment_id)))
        .add_header("Authorization", author.bearer())
        .await
        .json();
    assert_eq!(liked_comment["data"]["added"], true);

    let liked_tweet: serde_json::Value = client
        .post(&api_path(&format!("/likes/toggle/t/{}", tweet_id)))
        .add_header("Authorization", author.bearer())
        .await
        .json();
    assert_eq!(liked_tweet["data"]["added"], true);

    let tweets: serde_json::Value = client
        .get(&api_path(&format!("/tweets/user/{}", author.id)))
        .add_header("Authorization", author.bearer())
        .await
        .json();
    assert_eq!(tweets["data"]["items"][0]["likesCount"], 1);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn subscribing_to_yourself_is_rejected() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = create_logged_in_user(client, app.pool(), "narcissus").await;

    let response = client
        .post(&api_path(&format!("/subscriptions/c/{}", user.id)))
        .add_header("Authorization", user.bearer())
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn subscription_lists_are_owner_only() {
    let app = setup_test_app().await;
    let client = app.client();
    let channel = create_logged_in_user(client, app.pool(), "channel").await;
    let viewer = create_logged_in_user(client, app.pool(), "viewer").await;

    let toggled: serde_json::Value = client
        .post(&api_path(&format!("/subscriptions/c/{}", channel.id)))
        .add_header("Authorization", viewer.bearer())
        .await
        .json();
    assert_eq!(toggled["data"]["added"], true);
    assert_eq!(toggled["data"]["record"]["channelId"], channel.id.to_string());

    let subscribers = client
        .get(&api_path(&format!("/subscriptions/c/{}", channel.id)))
        .add_header("Authorization", channel.bearer())
        .await;
    assert_eq!(subscribers.status_code(), 200);
    let body: serde_json::Value = subscribers.json();
    assert_eq!(body["data"]["totalCount"], 1);
    assert_eq!(body["data"]["items"][0]["username"], "viewer");

    let snooping = client
        .get(&api_path(&format!("/subscriptions/c/{}", channel.id)))
        .add_header("Authorization", viewer.bearer())
        .await;
    assert_eq!(snooping.status_code(), 403);

    let own_list = client
        .get(&api_path(&format!("/subscriptions/u/{}", viewer.id)))
        .add_header("Authorization", viewer.bearer())
        .await;
    let body: serde_json::Value = own_list.json();
    assert_eq!(body["data"]["items"][0]["username"], "channel");

    let others_list = client
        .get(&api_path(&format!("/subscriptions/u/{}", viewer.id)))
        .add_header("Authorization", channel.bearer())
        .await;
    assert_eq!(others_list.status_code(), 403);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn concurrent_toggles_leave_at_most_one_like() {
    let app = setup_test_app().await;
    let client = app.client();
    let owner = create_logged_in_user(client, app.pool(), "racer").await;
    let video = fixtures::create_video(app.pool(), owner.id, "Race").await;
    let path = api_path(&format!("/likes/toggle/v/{}", video.id));

    let toggle = || async { client.post(&path).add_header("Authorization", owner.bearer()).await };
    let (a, b) = tokio::join!(toggle(), toggle());
    let statuses = [a.status_code(), b.status_code()];
    for status in statuses {
        assert!(status == 200 || status == 409, "unexpected status {}", status);
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE video_id = $1")
        .bind(video.id)
        .fetch_one(app.pool())
        .await
        .unwrap();
    if statuses.iter().any(|status| *status == 409) {
        // the losing insert is rejected and the winner's like stays
        assert_eq!(count, 1);
    } else {
        // the requests ran one after the other: like, then unlike
        assert_eq!(count, 0);
    }
}
