//! Domain entities - the core business objects.

mod comment;
mod post;
mod user;

pub use comment::{Comment, NewComment};
pub use post::{NewPost, Post, PostDetail, PostPatch, RankedPost};
pub use user::{NewUser, User, mask_email};
