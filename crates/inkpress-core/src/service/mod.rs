//! Application services composed from the ports.

mod content;
mod ranking;
mod slug_index;

pub use content::ContentRepository;
pub use ranking::{rank_authors, with_post_counts};
pub use slug_index::SlugIndex;
