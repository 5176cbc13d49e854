//! PostgreSQL repository implementations.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DbConn, EntityTrait, FromQueryResult, JoinType, Order, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, prelude::DateTimeWithTimeZone,
};

use tardygram_core::domain::{Comment, Post, RankedPost, User, mask_email};
use tardygram_core::error::RepoError;
use tardygram_core::ports::{CommentRepository, PostRepository, UserRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, repo_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.conn())
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }
}

/// A post row with its aggregated comment count.
#[derive(Debug, FromQueryResult)]
struct PopularRow {
    id: i64,
    user_id: i64,
    photo_url: String,
    caption: String,
    tags: Vec<String>,
    created_at: DateTimeWithTimeZone,
    updated_at: DateTimeWithTimeZone,
    comment_count: i64,
}

impl From<PopularRow> for RankedPost {
    fn from(row: PopularRow) -> Self {
        Self {
            post: Post {
                id: row.id,
                user_id: row.user_id,
                photo_url: row.photo_url,
                caption: row.caption,
                tags: row.tags,
                created_at: row.created_at.into(),
                updated_at: row.updated_at.into(),
            },
            comment_count: row.comment_count,
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        self.update_entity(post).await
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        // comments go with it via ON DELETE CASCADE
        self.delete_entity(id).await
    }

    async fn list_recent(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(self.conn())
            .await
            .map_err(repo_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_popular(&self, limit: u64) -> Result<Vec<RankedPost>, RepoError> {
        // posts.id is the primary key, so grouping by it alone is valid in PostgreSQL.
        let rows = PostEntity::find()
            .column_as(comment::Column::Id.count(), "comment_count")
            .join(JoinType::LeftJoin, post::Relation::Comment.def())
            .group_by(post::Column::Id)
            .order_by(Expr::cust("comment_count"), Order::Desc)
            .order_by_asc(post::Column::Id)
            .limit(limit)
            .into_model::<PopularRow>()
            .all(self.conn())
            .await
            .map_err(repo_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        self.delete_entity(id).await
    }

    async fn find_by_post_id(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::Id)
            .all(self.conn())
            .await
            .map_err(repo_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// Build all three repositories over one pool.
pub fn postgres_repositories(
    db: DbConn,
) -> (
    PostgresUserRepository,
    PostgresPostRepository,
    PostgresCommentRepository,
) {
    let db = Arc::new(db);
    (
        PostgresUserRepository::shared(Arc::clone(&db)),
        PostgresPostRepository::shared(Arc::clone(&db)),
        PostgresCommentRepository::shared(db),
    )
}
