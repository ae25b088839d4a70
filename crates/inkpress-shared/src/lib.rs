//! # Inkpress Shared
//!
//! Wire types shared between the API server and its clients: request bodies,
//! query-string parameters and the response envelopes.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
