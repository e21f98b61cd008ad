//! SeaORM repository implementations

use super::entity::{self, module_destination, module_source};
use super::{mapper, query_mapper};
use crate::contract::{Page, Storage, SERVICE_AGENT};
use crate::domain::query::StorageQuery;
use crate::domain::repository::{CodeConflict, StorageRepository};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    prelude::Expr, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;

// ===== Storage Repository =====

pub struct SeaOrmStorageRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmStorageRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Attach link collections to storage rows, keeping row order
    async fn with_links(&self, models: Vec<entity::Model>) -> Result<Vec<Storage>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();

        let mut sources: HashMap<i64, Vec<module_source::Model>> = HashMap::new();
        for row in module_source::Entity::find()
            .filter(module_source::Column::StorageId.is_in(ids.clone()))
            .order_by_asc(module_source::Column::StorageId)
            .order_by_asc(module_source::Column::Position)
            .all(&*self.db)
            .await?
        {
            sources.entry(row.storage_id).or_default().push(row);
        }

        let mut destinations: HashMap<i64, Vec<module_destination::Model>> = HashMap::new();
        for row in module_destination::Entity::find()
            .filter(module_destination::Column::StorageId.is_in(ids))
            .order_by_asc(module_destination::Column::StorageId)
            .order_by_asc(module_destination::Column::Position)
            .all(&*self.db)
            .await?
        {
            destinations.entry(row.storage_id).or_default().push(row);
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let sources = sources.remove(&model.id).unwrap_or_default();
                let destinations = destinations.remove(&model.id).unwrap_or_default();
                mapper::to_storage(model, sources, destinations)
            })
            .collect())
    }
}

/// Surface the active-code unique index as a [`CodeConflict`]
fn write_error(err: DbErr, code: &str) -> anyhow::Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => CodeConflict {
            code: code.to_string(),
        }
        .into(),
        _ => err.into(),
    }
}

async fn insert_links<C: ConnectionTrait>(
    conn: &C,
    storage_id: i64,
    storage: &Storage,
) -> Result<(), DbErr> {
    let sources = mapper::source_rows(storage_id, &storage.module_sources);
    if !sources.is_empty() {
        module_source::Entity::insert_many(sources).exec(conn).await?;
    }

    let destinations = mapper::destination_rows(storage_id, &storage.module_destinations);
    if !destinations.is_empty() {
        module_destination::Entity::insert_many(destinations)
            .exec(conn)
            .await?;
    }

    Ok(())
}

#[async_trait]
impl StorageRepository for SeaOrmStorageRepository {
    async fn insert(&self, storage: &Storage) -> Result<i64> {
        let txn = self.db.begin().await?;

        let active: entity::ActiveModel = storage.into();
        let id = entity::Entity::insert(active)
            .exec(&txn)
            .await
            .map_err(|e| write_error(e, &storage.code))?
            .last_insert_id;
        insert_links(&txn, id, storage).await?;

        txn.commit().await?;
        Ok(id)
    }

    async fn find_active_by_id(&self, id: i64) -> Result<Option<Storage>> {
        let Some(model) = entity::Entity::find_by_id(id)
            .filter(entity::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?
        else {
            return Ok(None);
        };

        Ok(self.with_links(vec![model]).await?.pop())
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        let count = entity::Entity::find_by_id(id).count(&*self.db).await?;

        Ok(count > 0)
    }

    async fn code_in_use(&self, code: &str, exclude_id: Option<i64>) -> Result<bool> {
        let mut query = entity::Entity::find()
            .filter(
                query_mapper::lower(entity::Column::Code)
                    .eq(query_mapper::lower_value(code.trim())),
            )
            .filter(entity::Column::IsDeleted.eq(false));

        if let Some(id) = exclude_id {
            query = query.filter(entity::Column::Id.ne(id));
        }

        Ok(query.count(&*self.db).await? > 0)
    }

    async fn update(&self, storage: &Storage) -> Result<u64> {
        let txn = self.db.begin().await?;

        let result = entity::Entity::update_many()
            .col_expr(entity::Column::Code, Expr::value(storage.code.clone()))
            .col_expr(entity::Column::Name, Expr::value(storage.name.clone()))
            .col_expr(
                entity::Column::LastModifiedUtc,
                Expr::value(storage.last_modified_utc),
            )
            .col_expr(
                entity::Column::LastModifiedBy,
                Expr::value(storage.last_modified_by.clone()),
            )
            .col_expr(
                entity::Column::LastModifiedAgent,
                Expr::value(storage.last_modified_agent.clone()),
            )
            .filter(entity::Column::Id.eq(storage.id))
            .filter(entity::Column::IsDeleted.eq(false))
            .exec(&txn)
            .await
            .map_err(|e| write_error(e, &storage.code))?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(0);
        }

        // Link collections are replaced wholesale
        module_source::Entity::delete_many()
            .filter(module_source::Column::StorageId.eq(storage.id))
            .exec(&txn)
            .await?;
        module_destination::Entity::delete_many()
            .filter(module_destination::Column::StorageId.eq(storage.id))
            .exec(&txn)
            .await?;
        insert_links(&txn, storage.id, storage).await?;

        txn.commit().await?;
        Ok(result.rows_affected)
    }

    async fn soft_delete(
        &self,
        id: i64,
        deleted_by: &str,
        deleted_at: DateTime<Utc>,
    ) -> Result<u64> {
        let result = entity::Entity::update_many()
            .col_expr(entity::Column::IsDeleted, Expr::value(true))
            .col_expr(entity::Column::DeletedUtc, Expr::value(deleted_at))
            .col_expr(entity::Column::DeletedBy, Expr::value(deleted_by.to_string()))
            .col_expr(entity::Column::LastModifiedUtc, Expr::value(deleted_at))
            .col_expr(
                entity::Column::LastModifiedBy,
                Expr::value(deleted_by.to_string()),
            )
            .col_expr(entity::Column::LastModifiedAgent, Expr::value(SERVICE_AGENT))
            .filter(entity::Column::Id.eq(id))
            .filter(entity::Column::IsDeleted.eq(false))
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn find_page(&self, query: &StorageQuery) -> Result<Page<Storage>> {
        let base = entity::Entity::find().filter(query_mapper::condition(query));
        let total = base.clone().count(&*self.db).await?;

        let items = if query.offset() >= total {
            Vec::new()
        } else {
            let mut select = base;
            for spec in &query.order {
                select = select.order_by(
                    query_mapper::sort_column(spec.field),
                    query_mapper::sort_order(spec.direction),
                );
            }
            let models = select
                .order_by_asc(entity::Column::Id)
                .offset(query.offset())
                .limit(query.size)
                .all(&*self.db)
                .await?;
            self.with_links(models).await?
        };

        Ok(Page {
            items,
            total,
            page: query.page,
            size: query.size,
        })
    }
}
