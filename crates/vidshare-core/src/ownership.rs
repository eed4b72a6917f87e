//! Ownership guard
//!
//! Every mutation of a video, comment, playlist, or tweet goes through [`guard`]: the path
//! id is parsed, the resource is loaded in one read, and the caller must be its owner. The
//! loaded resource is handed back to the handler so it is not fetched a second time.

use async_trait::async_trait;
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

use crate::models::{Comment, Playlist, Tweet, Video};
use crate::validation::parse_id;
use crate::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Video,
    Comment,
    Playlist,
    Tweet,
}

impl ResourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Video => "video",
            ResourceKind::Comment => "comment",
            ResourceKind::Playlist => "playlist",
            ResourceKind::Tweet => "tweet",
        }
    }

    fn not_found(&self) -> AppError {
        let label = self.label();
        let mut chars = label.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        AppError::NotFound(format!("{} not found", capitalized))
    }

    fn forbidden(&self) -> AppError {
        AppError::Forbidden(format!(
            "You are not allowed to modify this {}",
            self.label()
        ))
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.label())
    }
}

/// Anything with a single owning user
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Video {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl Owned for Playlist {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl Owned for Tweet {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// A loaded resource tagged with its kind
#[derive(Debug, Clone)]
pub enum OwnedResource {
    Video(Video),
    Comment(Comment),
    Playlist(Playlist),
    Tweet(Tweet),
}

impl OwnedResource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            OwnedResource::Video(_) => ResourceKind::Video,
            OwnedResource::Comment(_) => ResourceKind::Comment,
            OwnedResource::Playlist(_) => ResourceKind::Playlist,
            OwnedResource::Tweet(_) => ResourceKind::Tweet,
        }
    }
}

impl Owned for OwnedResource {
    fn owner_id(&self) -> Uuid {
        match self {
            OwnedResource::Video(v) => v.owner_id(),
            OwnedResource::Comment(c) => c.owner_id(),
            OwnedResource::Playlist(p) => p.owner_id(),
            OwnedResource::Tweet(t) => t.owner_id(),
        }
    }
}

/// Single-read lookup of a resource by kind and id
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    async fn load(&self, kind: ResourceKind, id: Uuid) -> Result<Option<OwnedResource>, AppError>;
}

/// Parse `raw_id`, load the resource, and confirm `caller` owns it.
///
/// Order matters: malformed id → `BadRequest`, missing → `NotFound`, other owner → `Forbidden`.
#[tracing::instrument(skip(loader), fields(resource = %kind))]
pub async fn guard<L>(
    loader: &L,
    kind: ResourceKind,
    raw_id: &str,
    caller: Uuid,
) -> Result<OwnedResource, AppError>
where
    L: ResourceLoader + ?Sized,
{
    let id = parse_id(raw_id, kind.label())?;

    let resource = loader.load(kind, id).await?.ok_or_else(|| kind.not_found())?;

    if resource.kind() != kind {
        return Err(AppError::Internal(format!(
            "Loader returned a {} for a {} lookup",
            resource.kind(),
            kind
        )));
    }

    if resource.owner_id() != caller {
        tracing::debug!(resource_id = %id, caller = %caller, "Ownership check failed");
        return Err(kind.forbidden());
    }

    Ok(resource)
}

/// Concrete resource types the guard can hand back directly
pub trait GuardedResource: Owned + Sized {
    const KIND: ResourceKind;

    fn from_resource(resource: OwnedResource) -> Option<Self>;
}

impl GuardedResource for Video {
    const KIND: ResourceKind = ResourceKind::Video;

    fn from_resource(resource: OwnedResource) -> Option<Self> {
        match resource {
            OwnedResource::Video(v) => Some(v),
            _ => None,
        }
    }
}

impl GuardedResource for Comment {
    const KIND: ResourceKind = ResourceKind::Comment;

    fn from_resource(resource: OwnedResource) -> Option<Self> {
        match resource {
            OwnedResource::Comment(c) => Some(c),
            _ => None,
        }
    }
}

impl GuardedResource for Playlist {
    const KIND: ResourceKind = ResourceKind::Playlist;

    fn from_resource(resource: OwnedResource) -> Option<Self> {
        match resource {
            OwnedResource::Playlist(p) => Some(p),
            _ => None,
        }
    }
}

impl GuardedResource for Tweet {
    const KIND: ResourceKind = ResourceKind::Tweet;

    fn from_resource(resource: OwnedResource) -> Option<Self> {
        match resource {
            OwnedResource::Tweet(t) => Some(t),
            _ => None,
        }
    }
}

/// Typed form of [`guard`], e.g. `guard_as::<Video, _>(&loader, &video_id, user.id)`.
pub async fn guard_as<T, L>(loader: &L, raw_id: &str, caller: Uuid) -> Result<T, AppError>
where
    T: GuardedResource,
    L: ResourceLoader + ?Sized,
{
    let resource = guard(loader, T::KIND, raw_id, caller).await?;
    T::from_resource(resource)
        .ok_or_else(|| AppError::Internal(format!("Unexpected resource for {}", T::KIND)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{sample_comment, sample_tweet, sample_video, MemoryResourceLoader};

    #[tokio::test]
    async fn owner_passes_and_gets_resource_back() {
        let owner = Uuid::new_v4();
        let video = sample_video(owner);
        let loader = MemoryResourceLoader::default();
        loader.insert(OwnedResource::Video(video.clone()));

        let loaded: Video = guard_as(&loader, &video.id.to_string(), owner).await.unwrap();
        assert_eq!(loaded.id, video.id);
        assert_eq!(loader.load_count(), 1);
    }

    #[tokio::test]
    async fn non_owner_is_forbidden() {
        let owner = Uuid::new_v4();
        let tweet = sample_tweet(owner);
        let loader = MemoryResourceLoader::default();
        loader.insert(OwnedResource::Tweet(tweet.clone()));

        let err = guard(&loader, ResourceKind::Tweet, &tweet.id.to_string(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn missing_resource_is_not_found() {
        let loader = MemoryResourceLoader::default();
        let err = guard(
            &loader,
            ResourceKind::Comment,
            &Uuid::new_v4().to_string(),
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
        match err {
            AppError::NotFound(msg) => assert_eq!(msg, "Comment not found"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_id_is_bad_request_before_any_lookup() {
        let loader = MemoryResourceLoader::default();
        let err = guard(&loader, ResourceKind::Playlist, "12345", Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(loader.load_count(), 0);
    }

    #[tokio::test]
    async fn kind_mismatch_does_not_leak_other_resources() {
        let owner = Uuid::new_v4();
        let comment = sample_comment(owner, Uuid::new_v4());
        let loader = MemoryResourceLoader::default();
        loader.insert(OwnedResource::Comment(comment.clone()));

        // A comment id used on a video route is simply not a video.
        let err = guard(&loader, ResourceKind::Video, &comment.id.to_string(), owner)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
