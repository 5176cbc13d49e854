//! # Tardygram Shared
//!
//! Request and response bodies of the HTTP API, shared between server and clients.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
