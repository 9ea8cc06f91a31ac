use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            "CREATE TABLE IF NOT EXISTS legal_documents (
                id SERIAL PRIMARY KEY,
                kind VARCHAR(10) NOT NULL CHECK (kind IN ('terms', 'policy')),
                doc_type VARCHAR(30) NOT NULL,
                version VARCHAR(20) NOT NULL,
                title VARCHAR(200) NOT NULL,
                content TEXT NOT NULL,
                effective_date DATE NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT FALSE,
                created_by INTEGER REFERENCES users(id) ON DELETE SET NULL,
                updated_by INTEGER REFERENCES users(id) ON DELETE SET NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                deleted_at TIMESTAMP,
                UNIQUE (kind, doc_type, version)
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_legal_documents_active
             ON legal_documents (kind, doc_type) WHERE is_active AND deleted_at IS NULL",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS legal_documents")
            .await?;
        Ok(())
    }
}
