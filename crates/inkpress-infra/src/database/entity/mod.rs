//! SeaORM entities for the five blog collections.

pub mod author;
pub mod category;
pub mod post;
pub mod post_tag;
pub mod tag;
