//! PostgreSQL persistence via SeaORM.

mod connections;
mod postgres_base;
mod postgres_repo;

pub mod entity;

pub use connections::{DatabaseConfig, connect};
pub use sea_orm::DbErr;
pub use postgres_base::{DomainMapped, PostgresBaseRepository};
pub use postgres_repo::{
    PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository,
    postgres_repositories,
};
