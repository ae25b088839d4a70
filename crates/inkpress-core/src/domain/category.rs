use serde::{Deserialize, Serialize};

pub type CategoryId = i32;

/// Category entity - every post belongs to exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub show_on_menu: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryInput {
    pub id: Option<CategoryId>,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub show_on_menu: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryItem {
    #[serde(flatten)]
    pub category: Category,
    pub post_count: u64,
}
