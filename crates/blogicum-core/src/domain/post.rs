use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a blog publication.
///
/// `pub_date` may lie in the future for scheduled publications; whether a
/// given viewer may see the post is decided by [`crate::policy::visible`],
/// never ad hoc.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub location_id: Option<Uuid>,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    /// Path of an uploaded image, relative to the media root.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(
        author_id: Uuid,
        category_id: Uuid,
        title: String,
        text: String,
        pub_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            category_id,
            location_id: None,
            title,
            text,
            pub_date,
            is_published: true,
            image: None,
            created_at: Utc::now(),
        }
    }
}

/// A post as it appears in a feed, annotated with its comment count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPreview {
    pub post: Post,
    pub comment_count: u64,
}
