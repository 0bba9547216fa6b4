//! # Blogicum Shared
//!
//! Types shared between the server and its clients: request/response DTOs
//! and the standard response envelopes.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
