use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users_table;
mod m20250101_000002_create_article_categories_table;
mod m20250101_000003_create_articles_table;
mod m20250101_000004_create_tags_tables;
mod m20250101_000005_create_system_configs_table;
mod m20250101_000006_create_static_pages_table;
mod m20250101_000007_create_legal_documents_table;
mod m20250101_000008_add_soft_delete_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users_table::Migration),
            Box::new(m20250101_000002_create_article_categories_table::Migration),
            Box::new(m20250101_000003_create_articles_table::Migration),
            Box::new(m20250101_000004_create_tags_tables::Migration),
            Box::new(m20250101_000005_create_system_configs_table::Migration),
            Box::new(m20250101_000006_create_static_pages_table::Migration),
            Box::new(m20250101_000007_create_legal_documents_table::Migration),
            Box::new(m20250101_000008_add_soft_delete_indexes::Migration),
        ]
    }
}
