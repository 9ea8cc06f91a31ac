use crate::{
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::{
        article, article_category, article_tag, tag, Article, ArticleCategory, ArticleModel,
        ArticleStatus, SoftDelete,
    },
    services::{
        article_tag::{bulk_remove_relations, sync_relations, ArticleTagService, ArticleTagStore},
        slug::{slug_taken, unique_slug, SlugStore},
        tag::{decrement_usage, increment_usage, TagService, UsageCounterStore},
    },
    utils::plain_excerpt,
    validation::{validate, FieldRule, Rule},
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sea_orm::{
    sea_query::{Expr, Query},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select, Set, Statement,
};

const EXCERPT_CHARS: usize = 200;

const ARTICLE_RULES: &[FieldRule] = &[
    FieldRule {
        field: "title",
        rules: &[Rule::Required, Rule::Length { min: 1, max: 200 }],
    },
    FieldRule {
        field: "content",
        rules: &[Rule::Required],
    },
    FieldRule {
        field: "excerpt",
        rules: &[Rule::Length { min: 0, max: 500 }],
    },
    FieldRule {
        field: "status",
        rules: &[Rule::OneOf(ArticleStatus::NAMES)],
    },
];

/// `published_at` is stamped the first time an article is published and never moves.
pub fn resolve_published_at(
    current: Option<NaiveDateTime>,
    status: ArticleStatus,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    match (current, status) {
        (Some(stamped), _) => Some(stamped),
        (None, ArticleStatus::Published) => Some(now),
        (None, _) => None,
    }
}

/// Apply a tag set change to the junction and the tag usage counters.
pub async fn replace_article_tags<J, U>(
    junction: &J,
    counters: &U,
    article_id: i32,
    tag_ids: &[i32],
) -> AppResult<()>
where
    J: ArticleTagStore + ?Sized,
    U: UsageCounterStore + ?Sized,
{
    let diff = sync_relations(junction, article_id, tag_ids).await?;
    for tag_id in diff.added {
        increment_usage(counters, tag_id).await?;
    }
    for tag_id in diff.removed {
        decrement_usage(counters, tag_id).await?;
    }
    Ok(())
}

/// Detach every tag from an article, releasing their usage counts.
pub async fn release_article_tags<J, U>(junction: &J, counters: &U, article_id: i32) -> AppResult<()>
where
    J: ArticleTagStore + ?Sized,
    U: UsageCounterStore + ?Sized,
{
    let current = junction.tag_ids_for_article(article_id).await?;
    for tag_id in bulk_remove_relations(junction, article_id, &current).await? {
        decrement_usage(counters, tag_id).await?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleCounter {
    View,
    Like,
    Share,
}

impl ArticleCounter {
    fn column(self) -> &'static str {
        match self {
            ArticleCounter::View => "view_count",
            ArticleCounter::Like => "like_count",
            ArticleCounter::Share => "share_count",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArticleInput {
    pub title: String,
    pub excerpt: Option<String>,
    pub content: String,
    /// `None` means draft on create and "unchanged" on update.
    pub status: Option<String>,
    pub category_id: Option<i32>,
    /// `None` leaves the tag set untouched on update.
    pub tag_ids: Option<Vec<i32>>,
}

impl ArticleInput {
    fn validate(&self) -> AppResult<()> {
        validate(
            ARTICLE_RULES,
            &[
                ("title", Some(self.title.as_str())),
                ("content", Some(self.content.as_str())),
                ("excerpt", self.excerpt.as_deref()),
                ("status", self.status.as_deref()),
            ],
        )
    }

    fn parsed_status(&self) -> Option<ArticleStatus> {
        self.status.as_deref().and_then(ArticleStatus::parse)
    }
}

#[derive(Debug, Default, Clone)]
pub struct ArticleFilter {
    pub status: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub author_id: Option<i32>,
}

pub struct ArticleService {
    db: DatabaseConnection,
}

impl ArticleService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Published articles only; the status filter is ignored.
    pub async fn list_published(
        &self,
        filter: &ArticleFilter,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ArticleModel>, u64)> {
        let query = self
            .filtered(filter)
            .filter(article::Column::Status.eq(ArticleStatus::Published.as_str()));
        self.paginate(query, page, per_page).await
    }

    /// Every status. Callers restrict `author_id` for non-admins.
    pub async fn list_all(
        &self,
        filter: &ArticleFilter,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ArticleModel>, u64)> {
        let mut query = self.filtered(filter);
        if let Some(status) = filter.status.as_deref() {
            let status = ArticleStatus::parse(status).ok_or_else(|| {
                AppError::Validation(format!(
                    "status must be one of: {}",
                    ArticleStatus::NAMES.join(", ")
                ))
            })?;
            query = query.filter(article::Column::Status.eq(status.as_str()));
        }
        self.paginate(query, page, per_page).await
    }

    fn filtered(&self, filter: &ArticleFilter) -> Select<Article> {
        let mut query = Article::find_active();

        if let Some(author_id) = filter.author_id {
            query = query.filter(article::Column::AuthorId.eq(author_id));
        }

        if let Some(category_slug) = filter.category.as_deref() {
            query = query.filter(
                article::Column::CategoryId.in_subquery(
                    Query::select()
                        .column(article_category::Column::Id)
                        .from(article_category::Entity)
                        .and_where(article_category::Column::Slug.eq(category_slug))
                        .and_where(article_category::Column::DeletedAt.is_null())
                        .to_owned(),
                ),
            );
        }

        if let Some(tag_slug) = filter.tag.as_deref() {
            query = query.filter(
                article::Column::Id.in_subquery(
                    Query::select()
                        .column(article_tag::Column::ArticleId)
                        .from(article_tag::Entity)
                        .inner_join(
                            tag::Entity,
                            Expr::col((tag::Entity, tag::Column::Id))
                                .equals((article_tag::Entity, article_tag::Column::TagId)),
                        )
                        .and_where(tag::Column::Slug.eq(tag_slug))
                        .and_where(tag::Column::DeletedAt.is_null())
                        .to_owned(),
                ),
            );
        }

        query
            .order_by_desc(article::Column::PublishedAt)
            .order_by_desc(article::Column::CreatedAt)
    }

    async fn paginate(
        &self,
        query: Select<Article>,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ArticleModel>, u64)> {
        let paginator = query.paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let articles = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((articles, total))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<ArticleModel> {
        Article::find_active_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Drafts and archived articles are invisible here.
    pub async fn get_published_by_slug(&self, slug: &str) -> AppResult<ArticleModel> {
        Article::find_active()
            .filter(article::Column::Slug.eq(slug))
            .filter(article::Column::Status.eq(ArticleStatus::Published.as_str()))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(&self, author_id: i32, input: ArticleInput) -> AppResult<ArticleModel> {
        input.validate()?;
        self.ensure_category(input.category_id).await?;
        let tag_ids = input.tag_ids.clone().unwrap_or_default();
        let tags = TagService::new(self.db.clone());
        tags.ensure_usable(&tag_ids).await?;

        let title = input.title.trim().to_string();
        let slug = unique_slug(self, &title, "article", None).await?;
        let status = input.parsed_status().unwrap_or(ArticleStatus::Draft);
        let now = chrono::Utc::now().naive_utc();

        let article = article::ActiveModel {
            title: Set(title),
            slug: Set(slug),
            excerpt: Set(excerpt_or_derived(input.excerpt, &input.content)),
            content: Set(input.content),
            status: Set(status.as_str().to_string()),
            author_id: Set(author_id),
            category_id: Set(input.category_id),
            view_count: Set(0),
            like_count: Set(0),
            share_count: Set(0),
            published_at: Set(resolve_published_at(None, status, now)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        let junction = ArticleTagService::new(self.db.clone());
        replace_article_tags(&junction, &tags, article.id, &tag_ids).await?;

        tracing::info!(
            article_id = article.id,
            slug = %article.slug,
            status = %article.status,
            "Article created"
        );
        Ok(article)
    }

    /// Full replace of the editable fields. Only the author or an admin may edit.
    pub async fn update(
        &self,
        id: i32,
        actor: &AuthUser,
        input: ArticleInput,
    ) -> AppResult<ArticleModel> {
        input.validate()?;
        let existing = self.get_by_id(id).await?;
        ensure_can_edit(&existing, actor)?;
        self.ensure_category(input.category_id).await?;

        let tags = TagService::new(self.db.clone());
        if let Some(tag_ids) = &input.tag_ids {
            tags.ensure_usable(tag_ids).await?;
        }

        let title = input.title.trim().to_string();
        let slug = if title != existing.title {
            unique_slug(self, &title, "article", Some(id)).await?
        } else {
            existing.slug.clone()
        };

        let status = input
            .parsed_status()
            .or_else(|| ArticleStatus::parse(&existing.status))
            .unwrap_or(ArticleStatus::Draft);
        let now = chrono::Utc::now().naive_utc();
        let published_at = resolve_published_at(existing.published_at, status, now);

        let mut active: article::ActiveModel = existing.into();
        active.title = Set(title);
        active.slug = Set(slug);
        active.excerpt = Set(excerpt_or_derived(input.excerpt, &input.content));
        active.content = Set(input.content);
        active.status = Set(status.as_str().to_string());
        active.category_id = Set(input.category_id);
        active.published_at = Set(published_at);
        active.updated_at = Set(now);
        let updated = active.update(&self.db).await?;

        if let Some(tag_ids) = &input.tag_ids {
            let junction = ArticleTagService::new(self.db.clone());
            replace_article_tags(&junction, &tags, id, tag_ids).await?;
        }

        Ok(updated)
    }

    /// Soft delete; the article's tags are detached so usage counts stay accurate.
    pub async fn delete(&self, id: i32, actor: &AuthUser) -> AppResult<()> {
        let existing = self.get_by_id(id).await?;
        ensure_can_edit(&existing, actor)?;

        let now = chrono::Utc::now().naive_utc();
        let mut active: article::ActiveModel = existing.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        let junction = ArticleTagService::new(self.db.clone());
        let tags = TagService::new(self.db.clone());
        release_article_tags(&junction, &tags, id).await?;

        tracing::info!(article_id = id, user_id = actor.user_id, "Article soft-deleted");
        Ok(())
    }

    /// Bump one engagement counter on a published article. Returns the new value.
    pub async fn increment_counter(&self, slug: &str, counter: ArticleCounter) -> AppResult<i64> {
        let column = counter.column();
        let sql = format!(
            "UPDATE articles SET {column} = {column} + 1 \
                WHERE slug = $1 AND status = 'published' AND deleted_at IS NULL \
                RETURNING {column}"
        );

        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                &sql,
                vec![slug.into()],
            ))
            .await?
            .ok_or(AppError::NotFound)?;

        let value: i32 = row.try_get_by_index(0)?;
        Ok(i64::from(value))
    }

    async fn ensure_category(&self, category_id: Option<i32>) -> AppResult<()> {
        let Some(category_id) = category_id else {
            return Ok(());
        };
        ArticleCategory::find_active_by_id(category_id)
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::Validation("Category does not exist".to_string()))
    }
}

fn ensure_can_edit(article: &ArticleModel, actor: &AuthUser) -> AppResult<()> {
    if article.author_id == actor.user_id || actor.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

fn excerpt_or_derived(excerpt: Option<String>, content: &str) -> Option<String> {
    match excerpt.filter(|e| !e.trim().is_empty()) {
        Some(excerpt) => Some(excerpt),
        None => {
            let derived = plain_excerpt(content, EXCERPT_CHARS);
            (!derived.is_empty()).then_some(derived)
        }
    }
}

#[async_trait]
impl SlugStore for ArticleService {
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        slug_taken::<Article>(
            &self.db,
            article::Column::Slug,
            article::Column::Id,
            slug,
            exclude_id,
        )
        .await
    }
}
