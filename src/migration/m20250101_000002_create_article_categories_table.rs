use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum ArticleCategories {
    Table,
    Id,
    Name,
    Slug,
    Description,
    ParentId,
    SortOrder,
    IsActive,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ArticleCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ArticleCategories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ArticleCategories::Name)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ArticleCategories::Slug)
                            .string_len(120)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ArticleCategories::Description)
                            .string_len(500)
                            .null(),
                    )
                    .col(ColumnDef::new(ArticleCategories::ParentId).integer().null())
                    .col(
                        ColumnDef::new(ArticleCategories::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ArticleCategories::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ArticleCategories::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ArticleCategories::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ArticleCategories::DeletedAt)
                            .timestamp()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_categories_parent")
                            .from(ArticleCategories::Table, ArticleCategories::ParentId)
                            .to(ArticleCategories::Table, ArticleCategories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .check(
                        Expr::col(ArticleCategories::ParentId)
                            .is_null()
                            .or(Expr::col(ArticleCategories::ParentId)
                                .ne(Expr::col(ArticleCategories::Id))),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_article_categories_parent")
                    .table(ArticleCategories::Table)
                    .col(ArticleCategories::ParentId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ArticleCategories::Table).to_owned())
            .await
    }
}
