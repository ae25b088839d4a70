//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod cache;
mod clock;
mod store;

pub use cache::{Generation, Lookup, LookupCache};
pub use clock::{Clock, SystemClock};
pub use store::{BlogStore, ImageUrlChange, PostGrouping, PublishChange, SavedPost};
