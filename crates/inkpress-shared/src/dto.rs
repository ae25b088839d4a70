//! Data Transfer Objects - request bodies and query parameters for the API.

use serde::{Deserialize, Serialize};

/// Page 1 of 10 unless the query string says otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageParams {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

/// Query string of `GET /posts`. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostListParams {
    pub page: u32,
    pub page_size: u32,
    pub keyword: Option<String>,
    pub category_id: Option<i32>,
    pub category_slug: Option<String>,
    pub author_id: Option<i32>,
    pub author_slug: Option<String>,
    pub tag_id: Option<i32>,
    pub tag_slug: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub published_only: bool,
}

impl Default for PostListParams {
    fn default() -> Self {
        let paging = PageParams::default();
        Self {
            page: paging.page,
            page_size: paging.page_size,
            keyword: None,
            category_id: None,
            category_slug: None,
            author_id: None,
            author_slug: None,
            tag_id: None,
            tag_slug: None,
            year: None,
            month: None,
            published_only: false,
        }
    }
}

/// Query string of `GET /authors/pagination`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorPageParams {
    pub page: u32,
    pub page_size: u32,
    pub name: Option<String>,
}

impl Default for AuthorPageParams {
    fn default() -> Self {
        let paging = PageParams::default();
        Self {
            page: paging.page,
            page_size: paging.page_size,
            name: None,
        }
    }
}

/// Body of `POST /posts` and `PUT /posts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRequest {
    pub title: String,
    pub short_description: String,
    pub description: String,
    #[serde(default)]
    pub meta: String,
    /// Raw slug; normalized by the server. Falls back to the title.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub published: bool,
    pub author_id: i32,
    pub category_id: i32,
    /// Tag names separated by commas, semicolons or line breaks.
    #[serde(default)]
    pub tags: String,
}

/// Body of `POST /authors` and `PUT /authors/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRequest {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Body of `POST /categories` and `PUT /categories/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub show_on_menu: bool,
}

/// Body of `POST /tags` and `PUT /tags/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRequest {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `POST /posts/{id}/published`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRequest {
    pub published: bool,
}

/// Body of `POST /authors/{id}/avatar`. `null` clears the image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarRequest {
    pub image_url: Option<String>,
}

/// Returned by `POST /authors/{id}/avatar`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarResponse {
    pub image_url: Option<String>,
    /// The replaced file, for the client to clean up.
    pub previous_image_url: Option<String>,
}

/// Query string of `GET /slugs/{entity}/exists`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlugExistsParams {
    pub slug: String,
    /// The entity being edited; absent or 0 for a new one.
    #[serde(default)]
    pub id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlugExistsResponse {
    pub exists: bool,
}

/// Acknowledgement for deletes and counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Affected {
    pub affected: bool,
}
