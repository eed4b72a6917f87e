//! In-memory stores for unit tests of the guard and toggle engine

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::engagement::{Engagement, EngagementKind, EngagementStore};
use crate::models::{Comment, Like, Subscription, Tweet, Video};
use crate::ownership::{OwnedResource, ResourceKind, ResourceLoader};
use crate::AppError;

pub fn sample_video(owner: Uuid) -> Video {
    let now = Utc::now();
    Video {
        id: Uuid::new_v4(),
        video_file: "http://localhost:8000/media/videos/sample.mp4".to_string(),
        thumbnail: "http://localhost:8000/media/thumbnails/sample.png".to_string(),
        title: "Sample".to_string(),
        description: "Sample video".to_string(),
        duration: 10.0,
        views: 0,
        is_published: true,
        owner_id: owner,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_comment(owner: Uuid, video: Uuid) -> Comment {
    let now = Utc::now();
    Comment {
        id: Uuid::new_v4(),
        content: "Nice".to_string(),
        video_id: video,
        owner_id: owner,
        edited_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_tweet(owner: Uuid) -> Tweet {
    let now = Utc::now();
    Tweet {
        id: Uuid::new_v4(),
        content: "hello".to_string(),
        owner_id: owner,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Default)]
pub struct MemoryResourceLoader {
    resources: Mutex<HashMap<Uuid, OwnedResource>>,
    loads: AtomicUsize,
}

impl MemoryResourceLoader {
    pub fn insert(&self, resource: OwnedResource) {
        let id = match &resource {
            OwnedResource::Video(v) => v.id,
            OwnedResource::Comment(c) => c.id,
            OwnedResource::Playlist(p) => p.id,
            OwnedResource::Tweet(t) => t.id,
        };
        self.resources.lock().unwrap().insert(id, resource);
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceLoader for MemoryResourceLoader {
    async fn load(&self, kind: ResourceKind, id: Uuid) -> Result<Option<OwnedResource>, AppError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let resources = self.resources.lock().unwrap();
        Ok(resources.get(&id).filter(|r| r.kind() == kind).cloned())
    }
}

type EdgeKey = (EngagementKind, Uuid, Uuid);

#[derive(Default, Clone)]
pub struct MemoryEngagementStore {
    edges: Arc<Mutex<HashMap<EdgeKey, Engagement>>>,
}

impl MemoryEngagementStore {
    pub fn count(&self, kind: EngagementKind, target: Uuid) -> usize {
        self.edges
            .lock()
            .unwrap()
            .keys()
            .filter(|(k, t, _)| *k == kind && *t == target)
            .count()
    }
}

fn new_record(kind: EngagementKind, target: Uuid, actor: Uuid) -> Engagement {
    let id = Uuid::new_v4();
    let created_at = Utc::now();
    let like = |video_id, comment_id, tweet_id| {
        Engagement::Like(Like {
            id,
            video_id,
            comment_id,
            tweet_id,
            liked_by: actor,
            created_at,
        })
    };
    match kind {
        EngagementKind::VideoLike => like(Some(target), None, None),
        EngagementKind::CommentLike => like(None, Some(target), None),
        EngagementKind::TweetLike => like(None, None, Some(target)),
        EngagementKind::Subscription => Engagement::Subscription(Subscription {
            id,
            subscriber_id: actor,
            channel_id: target,
            created_at,
        }),
    }
}

#[async_trait]
impl EngagementStore for MemoryEngagementStore {
    async fn find(
        &self,
        kind: EngagementKind,
        target: Uuid,
        actor: Uuid,
    ) -> Result<Option<Engagement>, AppError> {
        Ok(self.edges.lock().unwrap().get(&(kind, target, actor)).cloned())
    }

    async fn create(
        &self,
        kind: EngagementKind,
        target: Uuid,
        actor: Uuid,
    ) -> Result<Engagement, AppError> {
        let mut edges = self.edges.lock().unwrap();
        if edges.contains_key(&(kind, target, actor)) {
            return Err(AppError::Conflict("Like already exists".to_string()));
        }
        let record = new_record(kind, target, actor);
        edges.insert((kind, target, actor), record.clone());
        Ok(record)
    }

    async fn delete(&self, _kind: EngagementKind, record: &Engagement) -> Result<bool, AppError> {
        let mut edges = self.edges.lock().unwrap();
        let before = edges.len();
        edges.retain(|_, e| e.id() != record.id());
        Ok(edges.len() < before)
    }
}

/// Store where another request inserts the edge between this toggle's `find` and `create`.
pub struct RacedEngagementStore {
    winner: Engagement,
    finds: AtomicUsize,
    deletes: AtomicUsize,
}

impl RacedEngagementStore {
    pub fn new(kind: EngagementKind, target: Uuid, actor: Uuid) -> Self {
        RacedEngagementStore {
            winner: new_record(kind, target, actor),
            finds: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EngagementStore for RacedEngagementStore {
    async fn find(
        &self,
        _kind: EngagementKind,
        _target: Uuid,
        _actor: Uuid,
    ) -> Result<Option<Engagement>, AppError> {
        if self.finds.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(None);
        }
        Ok(Some(self.winner.clone()))
    }

    async fn create(
        &self,
        _kind: EngagementKind,
        _target: Uuid,
        _actor: Uuid,
    ) -> Result<Engagement, AppError> {
        Err(AppError::Conflict("Like already exists".to_string()))
    }

    async fn delete(&self, _kind: EngagementKind, _record: &Engagement) -> Result<bool, AppError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
}
