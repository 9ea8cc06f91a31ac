use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const SOFT_DELETE_TABLES: &[&str] = &[
    "article_categories",
    "articles",
    "tags",
    "system_configs",
    "static_pages",
    "legal_documents",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for table in SOFT_DELETE_TABLES {
            db.execute_unprepared(&format!(
                "CREATE INDEX IF NOT EXISTS idx_{table}_deleted_at ON {table} (deleted_at)"
            ))
            .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for table in SOFT_DELETE_TABLES {
            db.execute_unprepared(&format!("DROP INDEX IF EXISTS idx_{table}_deleted_at"))
                .await?;
        }

        Ok(())
    }
}
