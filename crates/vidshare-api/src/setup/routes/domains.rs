//! Domain route groups. Everything here sits behind the auth middleware.

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, patch, post};
use axum::Router;
use std::sync::Arc;

pub fn user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(&format!("{}/users/logout", API_PREFIX), post(handlers::users::logout))
        .route(
            &format!("{}/users/current-user", API_PREFIX),
            get(handlers::users::current_user),
        )
        .route(
            &format!("{}/users/change-password", API_PREFIX),
            post(handlers::users::change_password),
        )
        .route(
            &format!("{}/users/update-account", API_PREFIX),
            patch(handlers::users::update_account),
        )
        .route(&format!("{}/users/avatar", API_PREFIX), patch(handlers::users::update_avatar))
        .route(
            &format!("{}/users/cover-image", API_PREFIX),
            patch(handlers::users::update_cover_image),
        )
        .route(
            &format!("{}/users/c/{{username}}", API_PREFIX),
            get(handlers::users::channel_profile),
        )
        .route(&format!("{}/users/history", API_PREFIX), get(handlers::users::watch_history))
        .with_state(state)
}

pub fn video_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/videos", API_PREFIX),
            get(handlers::videos::list_videos).post(handlers::videos::publish_video),
        )
        .route(
            &format!("{}/videos/{{videoId}}", API_PREFIX),
            get(handlers::videos::get_video)
                .patch(handlers::videos::update_video)
                .delete(handlers::videos::delete_video),
        )
        .route(
            &format!("{}/videos/toggle/publish/{{videoId}}", API_PREFIX),
            patch(handlers::videos::toggle_publish),
        )
        .with_state(state)
}

pub fn comment_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/comments/{{videoId}}", API_PREFIX),
            get(handlers::comments::list_comments).post(handlers::comments::add_comment),
        )
        .route(
            &format!("{}/comments/c/{{commentId}}", API_PREFIX),
            patch(handlers::comments::update_comment).delete(handlers::comments::delete_comment),
        )
        .with_state(state)
}

pub fn like_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/likes/toggle/v/{{videoId}}", API_PREFIX),
            post(handlers::likes::toggle_video_like),
        )
        .route(
            &format!("{}/likes/toggle/c/{{commentId}}", API_PREFIX),
            post(handlers::likes::toggle_comment_like),
        )
        .route(
            &format!("{}/likes/toggle/t/{{tweetId}}", API_PREFIX),
            post(handlers::likes::toggle_tweet_like),
        )
        .route(&format!("{}/likes/videos", API_PREFIX), get(handlers::likes::liked_videos))
        .with_state(state)
}

pub fn subscription_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/subscriptions/c/{{channelId}}", API_PREFIX),
            post(handlers::subscriptions::toggle_subscription)
                .get(handlers::subscriptions::channel_subscribers),
        )
        .route(
            &format!("{}/subscriptions/u/{{subscriberId}}", API_PREFIX),
            get(handlers::subscriptions::subscribed_channels),
        )
        .with_state(state)
}

pub fn tweet_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(&format!("{}/tweets", API_PREFIX), post(handlers::tweets::create_tweet))
        .route(
            &format!("{}/tweets/user/{{userId}}", API_PREFIX),
            get(handlers::tweets::user_tweets),
        )
        .route(
            &format!("{}/tweets/{{tweetId}}", API_PREFIX),
            patch(handlers::tweets::update_tweet).delete(handlers::tweets::delete_tweet),
        )
        .with_state(state)
}

pub fn playlist_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(&format!("{}/playlist", API_PREFIX), post(handlers::playlists::create_playlist))
        .route(
            &format!("{}/playlist/{{playlistId}}", API_PREFIX),
            get(handlers::playlists::get_playlist)
                .patch(handlers::playlists::update_playlist)
                .delete(handlers::playlists::delete_playlist),
        )
        .route(
            &format!("{}/playlist/add/{{videoId}}/{{playlistId}}", API_PREFIX),
            patch(handlers::playlists::add_video_to_playlist),
        )
        .route(
            &format!("{}/playlist/remove/{{videoId}}/{{playlistId}}", API_PREFIX),
            patch(handlers::playlists::remove_video_from_playlist),
        )
        .route(
            &format!("{}/playlist/user/{{userId}}", API_PREFIX),
            get(handlers::playlists::user_playlists),
        )
        .with_state(state)
}

pub fn dashboard_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/dashboard/stats", API_PREFIX),
            get(handlers::dashboard::channel_stats),
        )
        .route(
            &format!("{}/dashboard/videos", API_PREFIX),
            get(handlers::dashboard::channel_videos),
        )
        .with_state(state)
}
