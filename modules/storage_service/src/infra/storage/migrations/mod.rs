//! Database migrations for storage service

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_storages::Migration),
            Box::new(m20250301_000002_create_storage_module_links::Migration),
        ]
    }
}

mod m20250301_000001_create_storages {
    use super::*;

    pub struct Migration;

    // Both migrations share this file, so names are spelled out
    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_storages"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Storages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Storages::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Storages::Code).string().not_null())
                        .col(ColumnDef::new(Storages::Name).string().not_null())
                        .col(
                            ColumnDef::new(Storages::IsDeleted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Storages::CreatedUtc)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(ColumnDef::new(Storages::CreatedBy).string().not_null())
                        .col(ColumnDef::new(Storages::CreatedAgent).string().not_null())
                        .col(
                            ColumnDef::new(Storages::LastModifiedUtc)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(ColumnDef::new(Storages::LastModifiedBy).string().not_null())
                        .col(
                            ColumnDef::new(Storages::LastModifiedAgent)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Storages::DeletedUtc).timestamp_with_time_zone())
                        .col(ColumnDef::new(Storages::DeletedBy).string())
                        .to_owned(),
                )
                .await?;

            // Code lookups always filter on the active flag
            manager
                .create_index(
                    Index::create()
                        .name("idx_storages_code_is_deleted")
                        .table(Storages::Table)
                        .col(Storages::Code)
                        .col(Storages::IsDeleted)
                        .to_owned(),
                )
                .await?;

            // One active storage per case-folded code. Deleted rows keep theirs.
            manager
                .get_connection()
                .execute_unprepared(
                    "CREATE UNIQUE INDEX ux_storages_active_code \
                     ON storages (LOWER(code)) WHERE is_deleted = false",
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Storages::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Storages {
        Table,
        Id,
        Code,
        Name,
        IsDeleted,
        CreatedUtc,
        CreatedBy,
        CreatedAgent,
        LastModifiedUtc,
        LastModifiedBy,
        LastModifiedAgent,
        DeletedUtc,
        DeletedBy,
    }
}

mod m20250301_000002_create_storage_module_links {
    use super::*;

    pub struct Migration;

    // Both migrations share this file, so names are spelled out
    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_storage_module_links"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(link_table(
                    StorageModuleSources::Table,
                    "fk_storage_module_sources_storage",
                ))
                .await?;

            manager
                .create_table(link_table(
                    StorageModuleDestinations::Table,
                    "fk_storage_module_destinations_storage",
                ))
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_storage_module_sources_storage_id")
                        .table(StorageModuleSources::Table)
                        .col(Link::StorageId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_storage_module_destinations_storage_id")
                        .table(StorageModuleDestinations::Table)
                        .col(Link::StorageId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(
                    Table::drop()
                        .table(StorageModuleDestinations::Table)
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(Table::drop().table(StorageModuleSources::Table).to_owned())
                .await
        }
    }

    /// Both link tables share one shape
    fn link_table<T: IntoIden + Copy + 'static>(table: T, fk_name: &str) -> TableCreateStatement {
        Table::create()
            .table(table)
            .if_not_exists()
            .col(
                ColumnDef::new(Link::Id)
                    .big_integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Link::StorageId).big_integer().not_null())
            .col(ColumnDef::new(Link::Position).integer().not_null())
            .col(ColumnDef::new(Link::ModuleId).big_integer())
            .col(ColumnDef::new(Link::ModuleCode).string())
            .col(ColumnDef::new(Link::ModuleName).string())
            .foreign_key(
                ForeignKey::create()
                    .name(fk_name)
                    .from(table, Link::StorageId)
                    .to(Storages::Table, Storages::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .on_update(ForeignKeyAction::Cascade),
            )
            .to_owned()
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum StorageModuleSources {
        Table,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum StorageModuleDestinations {
        Table,
    }

    #[derive(DeriveIden)]
    enum Link {
        Id,
        StorageId,
        Position,
        ModuleId,
        ModuleCode,
        ModuleName,
    }

    #[derive(DeriveIden)]
    enum Storages {
        Table,
        Id,
    }
}
