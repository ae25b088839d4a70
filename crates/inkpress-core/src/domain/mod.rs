//! Domain entities - the core business objects.

mod author;
mod category;
mod post;
mod slug;
mod tag;

pub use author::{Author, AuthorId, AuthorInput, AuthorItem};
pub use category::{Category, CategoryId, CategoryInput, CategoryItem};
pub use post::{Post, PostDetails, PostId, PostInput, PostWrite};
pub use slug::{EntityKind, Slug};
pub use tag::{Tag, TagId, TagInput, TagItem};
