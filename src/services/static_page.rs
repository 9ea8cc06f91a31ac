use crate::{
    error::{AppError, AppResult},
    models::{static_page, SoftDelete, StaticPage, StaticPageModel},
    services::slug::{slug_taken, unique_slug, SlugStore},
    validation::{validate, FieldRule, Rule},
};
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

const PAGE_RULES: &[FieldRule] = &[
    FieldRule {
        field: "title",
        rules: &[Rule::Required, Rule::Length { min: 1, max: 200 }],
    },
    FieldRule {
        field: "content",
        rules: &[Rule::Required],
    },
    FieldRule {
        field: "meta_description",
        rules: &[Rule::Length { min: 0, max: 300 }],
    },
];

#[derive(Debug, Clone)]
pub struct PageInput {
    pub title: String,
    pub content: String,
    pub meta_description: Option<String>,
    pub is_published: bool,
    pub sort_order: i32,
}

impl PageInput {
    fn validate(&self) -> AppResult<()> {
        validate(
            PAGE_RULES,
            &[
                ("title", Some(self.title.as_str())),
                ("content", Some(self.content.as_str())),
                ("meta_description", self.meta_description.as_deref()),
            ],
        )
    }
}

pub struct StaticPageService {
    db: DatabaseConnection,
}

impl StaticPageService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_published(&self) -> AppResult<Vec<StaticPageModel>> {
        let pages = StaticPage::find_active()
            .filter(static_page::Column::IsPublished.eq(true))
            .order_by_asc(static_page::Column::SortOrder)
            .order_by_asc(static_page::Column::Title)
            .all(&self.db)
            .await?;
        Ok(pages)
    }

    pub async fn list_all(&self) -> AppResult<Vec<StaticPageModel>> {
        let pages = StaticPage::find_active()
            .order_by_asc(static_page::Column::SortOrder)
            .order_by_asc(static_page::Column::Title)
            .all(&self.db)
            .await?;
        Ok(pages)
    }

    pub async fn get_published_by_slug(&self, slug: &str) -> AppResult<StaticPageModel> {
        StaticPage::find_active()
            .filter(static_page::Column::Slug.eq(slug))
            .filter(static_page::Column::IsPublished.eq(true))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<StaticPageModel> {
        StaticPage::find_active_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(&self, input: PageInput, created_by: i32) -> AppResult<StaticPageModel> {
        input.validate()?;
        let title = input.title.trim().to_string();
        let slug = unique_slug(self, &title, "page", None).await?;
        let now = chrono::Utc::now().naive_utc();

        let page = static_page::ActiveModel {
            title: Set(title),
            slug: Set(slug),
            content: Set(input.content),
            meta_description: Set(input.meta_description),
            is_published: Set(input.is_published),
            sort_order: Set(input.sort_order),
            created_by: Set(Some(created_by)),
            updated_by: Set(Some(created_by)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(page_id = page.id, slug = %page.slug, "Static page created");
        Ok(page)
    }

    pub async fn update(
        &self,
        id: i32,
        input: PageInput,
        updated_by: i32,
    ) -> AppResult<StaticPageModel> {
        input.validate()?;
        let existing = self.get_by_id(id).await?;

        let title = input.title.trim().to_string();
        let slug = if title != existing.title {
            unique_slug(self, &title, "page", Some(id)).await?
        } else {
            existing.slug.clone()
        };

        let mut active: static_page::ActiveModel = existing.into();
        active.title = Set(title);
        active.slug = Set(slug);
        active.content = Set(input.content);
        active.meta_description = Set(input.meta_description);
        active.is_published = Set(input.is_published);
        active.sort_order = Set(input.sort_order);
        active.updated_by = Set(Some(updated_by));
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        Ok(active.update(&self.db).await?)
    }

    pub async fn delete(&self, id: i32, deleted_by: i32) -> AppResult<()> {
        let existing = self.get_by_id(id).await?;
        let now = chrono::Utc::now().naive_utc();

        let mut active: static_page::ActiveModel = existing.into();
        active.deleted_at = Set(Some(now));
        active.updated_by = Set(Some(deleted_by));
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        tracing::info!(page_id = id, "Static page soft-deleted");
        Ok(())
    }
}

#[async_trait]
impl SlugStore for StaticPageService {
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        slug_taken::<StaticPage>(
            &self.db,
            static_page::Column::Slug,
            static_page::Column::Id,
            slug,
            exclude_id,
        )
        .await
    }
}
