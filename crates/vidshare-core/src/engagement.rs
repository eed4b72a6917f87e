//! Toggle-engagement engine
//!
//! Likes (on videos, comments, tweets) and channel subscriptions are binary edges between
//! a user and a target. A toggle removes the edge when it exists and creates it otherwise;
//! at most one edge per (kind, target, actor) ever exists, which the store enforces with a
//! uniqueness constraint so concurrent toggles cannot double-insert.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Like, Subscription};
use crate::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngagementKind {
    VideoLike,
    CommentLike,
    TweetLike,
    Subscription,
}

impl EngagementKind {
    /// Name of the target entity, as used in id validation messages
    pub fn target_label(&self) -> &'static str {
        match self {
            EngagementKind::VideoLike => "video",
            EngagementKind::CommentLike => "comment",
            EngagementKind::TweetLike => "tweet",
            EngagementKind::Subscription => "channel",
        }
    }

    pub fn message(&self, added: bool) -> &'static str {
        match (self, added) {
            (EngagementKind::VideoLike, true) => "Video liked successfully",
            (EngagementKind::VideoLike, false) => "Video unliked successfully",
            (EngagementKind::CommentLike, true) => "Comment liked successfully",
            (EngagementKind::CommentLike, false) => "Comment unliked successfully",
            (EngagementKind::TweetLike, true) => "Tweet liked successfully",
            (EngagementKind::TweetLike, false) => "Tweet unliked successfully",
            (EngagementKind::Subscription, true) => "Channel subscribed successfully",
            (EngagementKind::Subscription, false) => "Channel unsubscribed successfully",
        }
    }
}

impl Display for EngagementKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            EngagementKind::VideoLike => write!(f, "video_like"),
            EngagementKind::CommentLike => write!(f, "comment_like"),
            EngagementKind::TweetLike => write!(f, "tweet_like"),
            EngagementKind::Subscription => write!(f, "subscription"),
        }
    }
}

/// A stored engagement edge
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum Engagement {
    Like(Like),
    Subscription(Subscription),
}

impl Engagement {
    pub fn id(&self) -> Uuid {
        match self {
            Engagement::Like(like) => like.id,
            Engagement::Subscription(sub) => sub.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    Added(Engagement),
    Removed(Engagement),
}

impl ToggleOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, ToggleOutcome::Added(_))
    }

    pub fn message(&self, kind: EngagementKind) -> &'static str {
        kind.message(self.is_added())
    }

    pub fn into_record(self) -> Engagement {
        match self {
            ToggleOutcome::Added(e) | ToggleOutcome::Removed(e) => e,
        }
    }
}

/// Persistence for engagement edges
///
/// `create` must fail with [`AppError::Conflict`] when the edge already exists.
#[async_trait]
pub trait EngagementStore: Send + Sync {
    async fn find(
        &self,
        kind: EngagementKind,
        target: Uuid,
        actor: Uuid,
    ) -> Result<Option<Engagement>, AppError>;

    async fn create(
        &self,
        kind: EngagementKind,
        target: Uuid,
        actor: Uuid,
    ) -> Result<Engagement, AppError>;

    /// Delete by record id; returns whether a row was removed.
    async fn delete(&self, kind: EngagementKind, record: &Engagement) -> Result<bool, AppError>;
}

/// Flip the (kind, target, actor) edge.
///
/// A create that loses a race against a concurrent toggle fails with the store's
/// [`AppError::Conflict`]; the edge written by the winner is left in place.
#[tracing::instrument(skip(store), fields(engagement = %kind))]
pub async fn toggle<S>(
    store: &S,
    kind: EngagementKind,
    target: Uuid,
    actor: Uuid,
) -> Result<ToggleOutcome, AppError>
where
    S: EngagementStore + ?Sized,
{
    if kind == EngagementKind::Subscription && target == actor {
        return Err(AppError::BadRequest(
            "You cannot subscribe to yourself".to_string(),
        ));
    }

    if let Some(existing) = store.find(kind, target, actor).await? {
        store.delete(kind, &existing).await?;
        tracing::debug!(record_id = %existing.id(), "Engagement removed");
        return Ok(ToggleOutcome::Removed(existing));
    }

    let created = store.create(kind, target, actor).await?;
    tracing::debug!(record_id = %created.id(), "Engagement added");
    Ok(ToggleOutcome::Added(created))
}
