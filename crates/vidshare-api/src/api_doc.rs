//! OpenAPI documentation.
//! Served at `/api/openapi.json` and rendered by RapiDoc under `/docs`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use crate::response;
use vidshare_core::models;

/// Access tokens are accepted as a bearer header or as the `accessToken` cookie.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "cookieAuth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("accessToken"))),
        );
    }
}

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vidshare API",
        version = "0.1.0",
        description = "Video-sharing backend: accounts, videos, comments, likes, playlists, subscriptions, tweets and a channel dashboard. All endpoints are versioned under /api/v1/."
    ),
    modifiers(&SecurityAddon),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    paths(
        // Users
        handlers::users::register,
        handlers::users::login,
        handlers::users::logout,
        handlers::users::refresh_token,
        handlers::users::current_user,
        handlers::users::change_password,
        handlers::users::update_account,
        handlers::users::update_avatar,
        handlers::users::update_cover_image,
        handlers::users::channel_profile,
        handlers::users::watch_history,
        // Videos
        handlers::videos::list_videos,
        handlers::videos::publish_video,
        handlers::videos::get_video,
        handlers::videos::update_video,
        handlers::videos::delete_video,
        handlers::videos::toggle_publish,
        // Comments
        handlers::comments::list_comments,
        handlers::comments::add_comment,
        handlers::comments::update_comment,
        handlers::comments::delete_comment,
        // Likes
        handlers::likes::toggle_video_like,
        handlers::likes::toggle_comment_like,
        handlers::likes::toggle_tweet_like,
        handlers::likes::liked_videos,
        // Subscriptions
        handlers::subscriptions::toggle_subscription,
        handlers::subscriptions::channel_subscribers,
        handlers::subscriptions::subscribed_channels,
        // Tweets
        handlers::tweets::create_tweet,
        handlers::tweets::user_tweets,
        handlers::tweets::update_tweet,
        handlers::tweets::delete_tweet,
        // Playlists
        handlers::playlists::create_playlist,
        handlers::playlists::user_playlists,
        handlers::playlists::get_playlist,
        handlers::playlists::update_playlist,
        handlers::playlists::delete_playlist,
        handlers::playlists::add_video_to_playlist,
        handlers::playlists::remove_video_from_playlist,
        // Dashboard
        handlers::dashboard::channel_stats,
        handlers::dashboard::channel_videos,
    ),
    components(
        schemas(
            // Users
            models::UserResponse,
            models::LoginRequest,
            models::RefreshTokenRequest,
            models::ChangePasswordRequest,
            models::UpdateAccountRequest,
            models::AuthResponse,
            models::ChannelProfile,
            models::OwnerSummary,
            // Videos
            models::Video,
            models::VideoWithOwner,
            models::VideoDetail,
            models::LikedVideo,
            models::WatchHistoryEntry,
            // Comments, tweets, playlists
            models::Comment,
            models::CommentWithOwner,
            models::AddCommentRequest,
            models::UpdateCommentRequest,
            models::Tweet,
            models::TweetWithOwner,
            models::CreateTweetRequest,
            models::UpdateTweetRequest,
            models::Playlist,
            models::PlaylistSummary,
            models::PlaylistDetail,
            models::CreatePlaylistRequest,
            models::UpdatePlaylistRequest,
            // Engagement
            models::Like,
            models::Subscription,
            models::SubscriptionEntry,
            vidshare_core::Engagement,
            handlers::likes::ToggleResponse,
            // Dashboard
            models::ChannelStats,
            // Envelopes
            response::Empty,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "users", description = "Registration, sessions, profile and watch history"),
        (name = "videos", description = "Video publishing, listing, viewing and management"),
        (name = "comments", description = "Comments on videos"),
        (name = "likes", description = "Like toggles and the liked-videos feed"),
        (name = "subscriptions", description = "Channel subscriptions"),
        (name = "tweets", description = "Short text posts"),
        (name = "playlists", description = "Owner-scoped ordered video collections"),
        (name = "dashboard", description = "Statistics over the caller's own channel")
    )
)]
pub struct ApiDoc;
