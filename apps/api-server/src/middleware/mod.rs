//! Request extractors and error translation.

pub mod auth;
pub mod error;
