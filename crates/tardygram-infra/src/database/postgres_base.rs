use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DbConn, DbErr, EntityTrait, IntoActiveModel,
    PrimaryKeyTrait, SqlErr,
};

use tardygram_core::error::RepoError;
use tardygram_core::ports::BaseRepository;

/// Ties a SeaORM entity to the domain types it stores.
pub trait DomainMapped: EntityTrait {
    /// Stored form.
    type Domain: From<Self::Model> + Send + Sync + 'static;
    /// Unsaved form, without an id.
    type Draft: Into<Self::ActiveModel> + Send + Sync + 'static;
}

/// Generic PostgreSQL repository over one SeaORM entity.
///
/// The connection is shared, so every repository built over it uses the same pool.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    db: Arc<DbConn>,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self::shared(Arc::new(db))
    }

    pub fn shared(db: Arc<DbConn>) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    pub(crate) fn conn(&self) -> &DbConn {
        &self.db
    }
}

impl<E> PostgresBaseRepository<E>
where
    E: DomainMapped,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync,
{
    /// Overwrite a stored row with the domain value.
    pub(crate) async fn update_entity(&self, entity: E::Domain) -> Result<E::Domain, RepoError>
    where
        E::Domain: Into<E::ActiveModel>,
    {
        let active_model: E::ActiveModel = entity.into();
        let model = active_model.update(self.conn()).await.map_err(repo_error)?;

        Ok(model.into())
    }

    /// Delete by primary key; no matching row is `NotFound`.
    pub(crate) async fn delete_entity<ID>(&self, id: ID) -> Result<(), RepoError>
    where
        E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
        ID: Into<sea_orm::Value> + Send,
    {
        let result = E::delete_by_id(id)
            .exec(self.conn())
            .await
            .map_err(repo_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

/// Map a SeaORM error onto the repository taxonomy.
pub(crate) fn repo_error(err: DbErr) -> RepoError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return RepoError::Constraint(detail);
    }
    if let Some(SqlErr::ForeignKeyConstraintViolation(detail)) = err.sql_err() {
        return RepoError::Constraint(detail);
    }

    match err {
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

#[async_trait]
impl<E, ID> BaseRepository<E::Domain, E::Draft, ID> for PostgresBaseRepository<E>
where
    E: DomainMapped,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
    ID: Send + Sync + Into<sea_orm::Value> + Clone + Copy + 'static,
{
    async fn find_by_id(&self, id: ID) -> Result<Option<E::Domain>, RepoError> {
        let result = E::find_by_id(id).one(self.conn()).await.map_err(repo_error)?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, draft: E::Draft) -> Result<E::Domain, RepoError> {
        let active_model: E::ActiveModel = draft.into();
        let model = active_model.insert(self.conn()).await.map_err(repo_error)?;

        Ok(model.into())
    }
}
