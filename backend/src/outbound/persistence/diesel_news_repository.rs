//! PostgreSQL-backed [`NewsRepository`] using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NewsRepository, NewsRepositoryError};
use crate::domain::{News, ObjectId};

use super::diesel_basic_error_mapping::{
    BasicRepositoryError, map_diesel_error, map_pool_error, map_row_error,
};
use super::models::NewsRow;
use super::pool::DbPool;
use super::schema::news;

impl BasicRepositoryError for NewsRepositoryError {
    fn connection_failure(message: String) -> Self {
        Self::connection(message)
    }

    fn query_failure(message: String) -> Self {
        Self::query(message)
    }
}

/// Diesel implementation of the news repository port.
#[derive(Clone)]
pub struct DieselNewsRepository {
    pool: DbPool,
}

impl DieselNewsRepository {
    /// Create a repository over `pool`.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NewsRepository for DieselNewsRepository {
    async fn list_all(&self) -> Result<Vec<News>, NewsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NewsRow> = news::table
            .select(NewsRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|row| News::try_from(row).map_err(map_row_error))
            .collect()
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<News>, NewsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<NewsRow> = news::table
            .find(id.to_string())
            .select(NewsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|found| News::try_from(found).map_err(map_row_error))
            .transpose()
    }

    async fn insert(&self, item: &News) -> Result<(), NewsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(news::table)
            .values(NewsRow::from(item))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, item: &News) -> Result<(), NewsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewsRow::from(item);
        diesel::update(news::table.find(row.id.clone()))
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &ObjectId) -> Result<(), NewsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(news::table.find(id.to_string()))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete_all(&self) -> Result<(), NewsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(news::table)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
