use crate::{
    error::{AppError, AppResult},
    models::{article_category, ArticleCategory, CategoryModel, SoftDelete},
    services::{
        cache::CacheService,
        slug::{slug_taken, unique_slug, SlugStore},
    },
    validation::{validate, FieldRule, Rule},
};
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

const CACHE_KEY_CATEGORY_TREE: &str = "categories:tree";
const CACHE_TTL_CATEGORY_TREE: u64 = 300;

const CATEGORY_RULES: &[FieldRule] = &[
    FieldRule {
        field: "name",
        rules: &[Rule::Required, Rule::Length { min: 1, max: 100 }],
    },
    FieldRule {
        field: "description",
        rules: &[Rule::Length { min: 0, max: 500 }],
    },
];

#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Non-deleted category by id, active or not.
    async fn find_category(&self, id: i32) -> AppResult<Option<CategoryModel>>;
    /// Active, non-deleted categories ordered by (sort_order, name).
    async fn list_active_ordered(&self) -> AppResult<Vec<CategoryModel>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub category: CategoryModel,
    pub subcategories: Vec<CategoryNode>,
}

/// Assemble a forest from a flat, pre-ordered category list.
///
/// Nodes keep their input order among siblings. A node whose parent is not in
/// the list is dropped together with its descendants, as are nodes caught in a
/// parent cycle.
pub fn build_category_tree(categories: Vec<CategoryModel>) -> Vec<CategoryNode> {
    let known: HashSet<i32> = categories.iter().map(|c| c.id).collect();
    let mut children: HashMap<i32, Vec<i32>> = HashMap::new();
    let mut roots = Vec::new();

    for category in &categories {
        match category.parent_id {
            None => roots.push(category.id),
            Some(parent_id) if parent_id != category.id && known.contains(&parent_id) => {
                children.entry(parent_id).or_default().push(category.id);
            }
            Some(parent_id) => {
                tracing::warn!(
                    category_id = category.id,
                    parent_id,
                    "Dropping category with unavailable parent from tree"
                );
            }
        }
    }

    let mut nodes: HashMap<i32, CategoryModel> =
        categories.into_iter().map(|c| (c.id, c)).collect();

    fn attach(
        id: i32,
        nodes: &mut HashMap<i32, CategoryModel>,
        children: &HashMap<i32, Vec<i32>>,
    ) -> Option<CategoryNode> {
        let category = nodes.remove(&id)?;
        let subcategories = children
            .get(&id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|&child_id| attach(child_id, nodes, children))
                    .collect()
            })
            .unwrap_or_default();
        Some(CategoryNode {
            category,
            subcategories,
        })
    }

    let forest: Vec<CategoryNode> = roots
        .into_iter()
        .filter_map(|id| attach(id, &mut nodes, &children))
        .collect();

    for id in nodes.keys() {
        tracing::warn!(category_id = id, "Category unreachable from any root");
    }

    forest
}

pub async fn category_tree<S>(store: &S) -> AppResult<Vec<CategoryNode>>
where
    S: CategoryStore + ?Sized,
{
    let categories = store.list_active_ordered().await?;
    Ok(build_category_tree(categories))
}

/// A category may only hang under an existing, active category other than
/// itself. Longer cycles (A -> B -> A) are not detected here.
pub async fn validate_parent<S>(
    store: &S,
    category_id: Option<i32>,
    parent_id: Option<i32>,
) -> AppResult<()>
where
    S: CategoryStore + ?Sized,
{
    let Some(parent_id) = parent_id else {
        return Ok(());
    };

    if category_id == Some(parent_id) {
        return Err(AppError::Validation(
            "Category cannot be its own parent".to_string(),
        ));
    }

    let parent = store.find_category(parent_id).await?;
    if !parent.is_some_and(|p| p.is_active) {
        return Err(AppError::Validation(
            "Parent category does not exist".to_string(),
        ));
    }

    Ok(())
}

pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
    pub sort_order: i32,
    pub is_active: bool,
}

impl CategoryInput {
    fn validate(&self) -> AppResult<()> {
        validate(
            CATEGORY_RULES,
            &[
                ("name", Some(self.name.as_str())),
                ("description", self.description.as_deref()),
            ],
        )
    }
}

pub struct CategoryService {
    db: DatabaseConnection,
    cache: Option<CacheService>,
}

impl CategoryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, cache: None }
    }

    pub fn with_cache(mut self, cache: Option<CacheService>) -> Self {
        self.cache = cache;
        self
    }

    pub async fn list(&self) -> AppResult<Vec<CategoryModel>> {
        self.list_active_ordered().await
    }

    pub async fn tree(&self) -> AppResult<Vec<CategoryNode>> {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache
                .get::<Vec<CategoryNode>>(CACHE_KEY_CATEGORY_TREE)
                .await
            {
                return Ok(cached);
            }
        }

        let tree = category_tree(self).await?;

        if let Some(cache) = &self.cache {
            cache
                .set(CACHE_KEY_CATEGORY_TREE, &tree, CACHE_TTL_CATEGORY_TREE)
                .await;
        }

        Ok(tree)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<CategoryModel> {
        ArticleCategory::find_active_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Active category by slug together with its direct active children.
    pub async fn get_with_children(
        &self,
        slug: &str,
    ) -> AppResult<(CategoryModel, Vec<CategoryModel>)> {
        let category = ArticleCategory::find_active()
            .filter(article_category::Column::Slug.eq(slug))
            .filter(article_category::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let children = ArticleCategory::find_active()
            .filter(article_category::Column::ParentId.eq(category.id))
            .filter(article_category::Column::IsActive.eq(true))
            .order_by_asc(article_category::Column::SortOrder)
            .order_by_asc(article_category::Column::Name)
            .all(&self.db)
            .await?;

        Ok((category, children))
    }

    pub async fn create(&self, input: CategoryInput) -> AppResult<CategoryModel> {
        input.validate()?;
        validate_parent(self, None, input.parent_id).await?;

        let slug = unique_slug(self, &input.name, "category", None).await?;
        let now = chrono::Utc::now().naive_utc();

        let category = article_category::ActiveModel {
            name: Set(input.name.trim().to_string()),
            slug: Set(slug),
            description: Set(input.description),
            parent_id: Set(input.parent_id),
            sort_order: Set(input.sort_order),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(category_id = category.id, slug = %category.slug, "Category created");
        self.invalidate_tree_cache().await;
        Ok(category)
    }

    pub async fn update(&self, id: i32, input: CategoryInput) -> AppResult<CategoryModel> {
        input.validate()?;
        let existing = self.get_by_id(id).await?;
        validate_parent(self, Some(id), input.parent_id).await?;

        let name = input.name.trim().to_string();
        let slug = if name != existing.name {
            unique_slug(self, &name, "category", Some(id)).await?
        } else {
            existing.slug.clone()
        };

        let mut active: article_category::ActiveModel = existing.into();
        active.name = Set(name);
        active.slug = Set(slug);
        active.description = Set(input.description);
        active.parent_id = Set(input.parent_id);
        active.sort_order = Set(input.sort_order);
        active.is_active = Set(input.is_active);
        active.updated_at = Set(chrono::Utc::now().naive_utc());

        let updated = active.update(&self.db).await?;
        self.invalidate_tree_cache().await;
        Ok(updated)
    }

    /// Soft delete. Refused while the category still has live subcategories.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let existing = self.get_by_id(id).await?;

        let child_count = ArticleCategory::find_active()
            .filter(article_category::Column::ParentId.eq(id))
            .count(&self.db)
            .await?;
        if child_count > 0 {
            return Err(AppError::Conflict(
                "Category still has subcategories".to_string(),
            ));
        }

        let now = chrono::Utc::now().naive_utc();
        let mut active: article_category::ActiveModel = existing.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        tracing::info!(category_id = id, "Category soft-deleted");
        self.invalidate_tree_cache().await;
        Ok(())
    }

    async fn invalidate_tree_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate(CACHE_KEY_CATEGORY_TREE).await;
        }
    }
}

#[async_trait]
impl CategoryStore for CategoryService {
    async fn find_category(&self, id: i32) -> AppResult<Option<CategoryModel>> {
        Ok(ArticleCategory::find_active_by_id(id).one(&self.db).await?)
    }

    async fn list_active_ordered(&self) -> AppResult<Vec<CategoryModel>> {
        Ok(ArticleCategory::find_active()
            .filter(article_category::Column::IsActive.eq(true))
            .order_by_asc(article_category::Column::SortOrder)
            .order_by_asc(article_category::Column::Name)
            .all(&self.db)
            .await?)
    }
}

#[async_trait]
impl SlugStore for CategoryService {
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        slug_taken::<ArticleCategory>(
            &self.db,
            article_category::Column::Slug,
            article_category::Column::Id,
            slug,
            exclude_id,
        )
        .await
    }
}
