//! # Tardygram Core
//!
//! The domain layer of the Tardygram backend.
//! Entities, ports and the services that enforce authentication and ownership.
//! No infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
