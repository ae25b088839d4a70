use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type AuthorId = i32;

/// Author entity - the person a post is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub full_name: String,
    pub email: String,
    pub bio: Option<String>,
    pub slug: String,
    pub image_url: Option<String>,
    pub joined_date: DateTime<Utc>,
}

/// Fields supplied when creating (`id: None`) or replacing an author.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorInput {
    pub id: Option<AuthorId>,
    pub full_name: String,
    pub email: String,
    pub bio: Option<String>,
    pub slug: String,
    pub image_url: Option<String>,
}

/// Author together with the number of published posts attributed to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorItem {
    #[serde(flatten)]
    pub author: Author,
    pub post_count: u64,
}
