use crate::{
    error::{AppError, AppResult},
    models::{tag, SoftDelete, Tag, TagModel},
    services::slug::{slug_taken, unique_slug, SlugStore},
    validation::{is_hex_color, validate, FieldRule, Rule},
};
use async_trait::async_trait;
use std::collections::HashSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, Statement,
};

/// Requested ids absent from `found`, each once, in request order.
fn unknown_ids(requested: &[i32], found: &[i32]) -> Vec<i32> {
    let mut seen = HashSet::new();
    requested
        .iter()
        .copied()
        .filter(|id| !found.contains(id) && seen.insert(*id))
        .collect()
}

const TAG_RULES: &[FieldRule] = &[
    FieldRule {
        field: "name",
        rules: &[Rule::Required, Rule::Length { min: 1, max: 50 }],
    },
    FieldRule {
        field: "description",
        rules: &[Rule::Length { min: 0, max: 255 }],
    },
    FieldRule {
        field: "color",
        rules: &[Rule::Pattern {
            check: is_hex_color,
            expected: "a hex color such as #1e90ff",
        }],
    },
];

/// Caller-maintained usage counters on tags.
#[async_trait]
pub trait UsageCounterStore: Send + Sync {
    /// Add `delta` to the tag's usage count, flooring at zero. Returns the new count.
    async fn adjust_usage(&self, tag_id: i32, delta: i32) -> AppResult<i32>;
}

pub async fn increment_usage<S>(store: &S, tag_id: i32) -> AppResult<i32>
where
    S: UsageCounterStore + ?Sized,
{
    store.adjust_usage(tag_id, 1).await
}

/// Never drives the count below zero.
pub async fn decrement_usage<S>(store: &S, tag_id: i32) -> AppResult<i32>
where
    S: UsageCounterStore + ?Sized,
{
    store.adjust_usage(tag_id, -1).await
}

pub struct TagInput {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
}

impl TagInput {
    fn validate(&self) -> AppResult<()> {
        validate(
            TAG_RULES,
            &[
                ("name", Some(self.name.as_str())),
                ("description", self.description.as_deref()),
                ("color", self.color.as_deref()),
            ],
        )
    }
}

pub struct TagService {
    db: DatabaseConnection,
}

impl TagService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Active tags, most used first.
    pub async fn list_tags(&self) -> AppResult<Vec<TagModel>> {
        let tags = Tag::find_active()
            .filter(tag::Column::IsActive.eq(true))
            .order_by_desc(tag::Column::UsageCount)
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await?;
        Ok(tags)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<TagModel> {
        Tag::find_active_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn get_by_slug(&self, slug: &str) -> AppResult<TagModel> {
        Tag::find_active()
            .filter(tag::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Fail unless every id names a live, active tag.
    pub async fn ensure_usable(&self, tag_ids: &[i32]) -> AppResult<()> {
        if tag_ids.is_empty() {
            return Ok(());
        }

        let found: Vec<i32> = Tag::find_active()
            .filter(tag::Column::Id.is_in(tag_ids.to_vec()))
            .filter(tag::Column::IsActive.eq(true))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();

        let missing: Vec<String> = unknown_ids(tag_ids, &found)
            .iter()
            .map(|id| id.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Unknown or inactive tag id(s): {}",
                missing.join(", ")
            )))
        }
    }

    pub async fn create_tag(&self, input: TagInput) -> AppResult<TagModel> {
        input.validate()?;
        let name = input.name.trim().to_string();
        self.ensure_name_free(&name, None).await?;

        let slug = unique_slug(self, &name, "tag", None).await?;
        let now = chrono::Utc::now().naive_utc();

        let tag = tag::ActiveModel {
            name: Set(name),
            slug: Set(slug),
            description: Set(input.description),
            color: Set(input.color),
            usage_count: Set(0),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(tag_id = tag.id, slug = %tag.slug, "Tag created");
        Ok(tag)
    }

    pub async fn update_tag(&self, id: i32, input: TagInput) -> AppResult<TagModel> {
        input.validate()?;
        let existing = self.get_by_id(id).await?;
        let name = input.name.trim().to_string();

        let slug = if name != existing.name {
            self.ensure_name_free(&name, Some(id)).await?;
            unique_slug(self, &name, "tag", Some(id)).await?
        } else {
            existing.slug.clone()
        };

        let mut active: tag::ActiveModel = existing.into();
        active.name = Set(name);
        active.slug = Set(slug);
        active.description = Set(input.description);
        active.color = Set(input.color);
        active.is_active = Set(input.is_active);
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        Ok(active.update(&self.db).await?)
    }

    /// Soft delete. Junction rows stay; reads filter the tag out.
    pub async fn delete_tag(&self, id: i32) -> AppResult<()> {
        let existing = self.get_by_id(id).await?;
        let now = chrono::Utc::now().naive_utc();

        let mut active: tag::ActiveModel = existing.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        tracing::info!(tag_id = id, "Tag soft-deleted");
        Ok(())
    }

    /// Reset `usage_count` to the number of live articles linked to the tag.
    pub async fn recount_usage(&self, id: i32) -> AppResult<i32> {
        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                "UPDATE tags SET usage_count = \
                    (SELECT COUNT(*) FROM article_tags link \
                        JOIN articles a ON a.id = link.article_id \
                        WHERE link.tag_id = $1 AND a.deleted_at IS NULL), \
                    updated_at = NOW() \
                    WHERE id = $1 AND deleted_at IS NULL \
                    RETURNING usage_count",
                vec![id.into()],
            ))
            .await?
            .ok_or(AppError::NotFound)?;

        let count: i32 = row.try_get_by_index(0)?;
        tracing::debug!(tag_id = id, usage_count = count, "Tag usage recounted");
        Ok(count)
    }

    /// Names are unique across retired rows too.
    async fn ensure_name_free(&self, name: &str, exclude_id: Option<i32>) -> AppResult<()> {
        let mut query = Tag::find().filter(tag::Column::Name.eq(name));
        if let Some(id) = exclude_id {
            query = query.filter(tag::Column::Id.ne(id));
        }
        if query.count(&self.db).await? > 0 {
            return Err(AppError::Conflict("Tag already exists".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SlugStore for TagService {
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        slug_taken::<Tag>(&self.db, tag::Column::Slug, tag::Column::Id, slug, exclude_id).await
    }
}

#[async_trait]
impl UsageCounterStore for TagService {
    async fn adjust_usage(&self, tag_id: i32, delta: i32) -> AppResult<i32> {
        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                "UPDATE tags SET usage_count = GREATEST(usage_count + $1, 0), updated_at = NOW() \
                    WHERE id = $2 \
                    RETURNING usage_count",
                vec![delta.into(), tag_id.into()],
            ))
            .await?
            .ok_or(AppError::NotFound)?;

        Ok(row.try_get_by_index(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory::MemoryStore;

    #[test]
    fn unknown_ids_reported_once_in_request_order() {
        assert_eq!(unknown_ids(&[5, 6, 5, 2], &[2]), vec![5, 6]);
        assert!(unknown_ids(&[1, 1], &[1]).is_empty());
    }

    #[tokio::test]
    async fn decrement_stops_at_zero() {
        let store = MemoryStore::default();
        store.add_tag(1, 1);

        assert_eq!(decrement_usage(&store, 1).await.unwrap(), 0);
        assert_eq!(decrement_usage(&store, 1).await.unwrap(), 0);
        assert_eq!(store.usage(1), Some(0));
    }

    #[tokio::test]
    async fn increment_then_decrement() {
        let store = MemoryStore::default();
        store.add_tag(2, 0);

        increment_usage(&store, 2).await.unwrap();
        increment_usage(&store, 2).await.unwrap();
        assert_eq!(decrement_usage(&store, 2).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_tag_is_not_found() {
        let store = MemoryStore::default();
        assert!(matches!(
            increment_usage(&store, 404).await,
            Err(AppError::NotFound)
        ));
    }

    #[test]
    fn rule_table_checks_color() {
        let mut input = TagInput {
            name: "networking".to_string(),
            description: None,
            color: Some("#12ab9f".to_string()),
            is_active: true,
        };
        assert!(input.validate().is_ok());

        input.color = Some("teal".to_string());
        assert!(input.validate().is_err());
    }
}
