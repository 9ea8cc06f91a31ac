//! In-memory stand-ins for the sea-orm stores, used by unit tests.

use crate::error::{AppError, AppResult};
use crate::models::CategoryModel;
use crate::services::{
    article_tag::ArticleTagStore, category::CategoryStore, slug::SlugStore,
    tag::UsageCounterStore,
};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    /// (row id, slug) for every row, soft-deleted or not
    slugs: Mutex<Vec<(i32, String)>>,
    categories: Mutex<Vec<CategoryModel>>,
    pairs: Mutex<BTreeSet<(i32, i32)>>,
    usage: Mutex<HashMap<i32, i32>>,
}

impl MemoryStore {
    pub fn add_slug(&self, id: i32, slug: &str) {
        self.slugs.lock().unwrap().push((id, slug.to_string()));
    }

    pub fn add_category(&self, category: CategoryModel) {
        self.categories.lock().unwrap().push(category);
    }

    pub fn add_tag(&self, tag_id: i32, usage_count: i32) {
        self.usage.lock().unwrap().insert(tag_id, usage_count);
    }

    pub fn usage(&self, tag_id: i32) -> Option<i32> {
        self.usage.lock().unwrap().get(&tag_id).copied()
    }

    pub fn pairs(&self) -> Vec<(i32, i32)> {
        self.pairs.lock().unwrap().iter().copied().collect()
    }
}

#[async_trait]
impl SlugStore for MemoryStore {
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        Ok(self
            .slugs
            .lock()
            .unwrap()
            .iter()
            .any(|(id, s)| s == slug && Some(*id) != exclude_id))
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn find_category(&self, id: i32) -> AppResult<Option<CategoryModel>> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id && c.deleted_at.is_none())
            .cloned())
    }

    async fn list_active_ordered(&self) -> AppResult<Vec<CategoryModel>> {
        let mut active: Vec<CategoryModel> = self
            .categories
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.is_active && c.deleted_at.is_none())
            .cloned()
            .collect();
        active.sort_by(|a, b| (a.sort_order, &a.name).cmp(&(b.sort_order, &b.name)));
        Ok(active)
    }
}

#[async_trait]
impl ArticleTagStore for MemoryStore {
    async fn tag_ids_for_article(&self, article_id: i32) -> AppResult<Vec<i32>> {
        Ok(self
            .pairs
            .lock()
            .unwrap()
            .iter()
            .filter(|(a, _)| *a == article_id)
            .map(|(_, t)| *t)
            .collect())
    }

    async fn insert_pairs(&self, article_id: i32, tag_ids: &[i32]) -> AppResult<()> {
        let mut pairs = self.pairs.lock().unwrap();
        for &tag_id in tag_ids {
            pairs.insert((article_id, tag_id));
        }
        Ok(())
    }

    async fn delete_pairs(&self, article_id: i32, tag_ids: &[i32]) -> AppResult<()> {
        let mut pairs = self.pairs.lock().unwrap();
        for &tag_id in tag_ids {
            pairs.remove(&(article_id, tag_id));
        }
        Ok(())
    }
}

#[async_trait]
impl UsageCounterStore for MemoryStore {
    async fn adjust_usage(&self, tag_id: i32, delta: i32) -> AppResult<i32> {
        let mut usage = self.usage.lock().unwrap();
        let count = usage.get_mut(&tag_id).ok_or(AppError::NotFound)?;
        *count = (*count + delta).max(0);
        Ok(*count)
    }
}

pub fn category(id: i32, name: &str, parent_id: Option<i32>, sort_order: i32) -> CategoryModel {
    let now = chrono::Utc::now().naive_utc();
    CategoryModel {
        id,
        name: name.to_string(),
        slug: crate::utils::slugify(name),
        description: None,
        parent_id,
        sort_order,
        is_active: true,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}
