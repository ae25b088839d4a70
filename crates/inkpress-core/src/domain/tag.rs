use serde::{Deserialize, Serialize};

pub type TagId = i32;

/// Tag entity - shared between posts, never owned by one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagInput {
    pub id: Option<TagId>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagItem {
    #[serde(flatten)]
    pub tag: Tag,
    pub post_count: u64,
}
