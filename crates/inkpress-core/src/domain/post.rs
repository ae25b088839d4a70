use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Author, AuthorId, Category, CategoryId, Tag};

pub type PostId = i32;

/// Post entity - a blog article with explicit author/category references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub meta: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub published: bool,
    pub posted_date: DateTime<Utc>,
    pub modified_date: Option<DateTime<Utc>>,
    pub view_count: i32,
    pub author_id: AuthorId,
    pub category_id: CategoryId,
    /// Related entities, present when the post was loaded with details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<PostDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDetails {
    pub author: Author,
    pub category: Category,
    pub tags: Vec<Tag>,
}

impl Post {
    pub fn with_details(mut self, details: PostDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// Slugs of the attached tags, empty when details were not loaded.
    pub fn tag_slugs(&self) -> Vec<&str> {
        self.details
            .as_ref()
            .map(|d| d.tags.iter().map(|t| t.slug.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Caller-supplied post fields. `id: None` creates a new post.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostInput {
    pub id: Option<PostId>,
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub meta: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub published: bool,
    pub author_id: AuthorId,
    pub category_id: CategoryId,
}

/// A validated post write handed to storage.
///
/// `at` becomes `posted_date` on insert and `modified_date` on update.
#[derive(Debug, Clone)]
pub struct PostWrite {
    pub input: PostInput,
    pub at: DateTime<Utc>,
}
