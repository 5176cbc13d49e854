//! Application services - business rules over the ports.

mod auth;
mod comments;
mod posts;

pub use auth::{AuthService, Session};
pub use comments::CommentService;
pub use posts::{Actor, POPULAR_LIMIT, PostDraft, PostService};
