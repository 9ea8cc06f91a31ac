use crate::{
    error::AppResult,
    models::{article_tag, tag, ArticleTag, SoftDelete, Tag, TagModel},
};
use async_trait::async_trait;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::collections::{HashMap, HashSet};

/// Storage for the (article, tag) junction.
#[async_trait]
pub trait ArticleTagStore: Send + Sync {
    async fn tag_ids_for_article(&self, article_id: i32) -> AppResult<Vec<i32>>;
    /// Pairs that already exist are ignored.
    async fn insert_pairs(&self, article_id: i32, tag_ids: &[i32]) -> AppResult<()>;
    async fn delete_pairs(&self, article_id: i32, tag_ids: &[i32]) -> AppResult<()>;
}

/// Link `tag_ids` to an article. Repeated ids and pairs already present are
/// skipped. Returns the tag ids that were actually linked, in input order.
pub async fn bulk_create_relations<S>(
    store: &S,
    article_id: i32,
    tag_ids: &[i32],
) -> AppResult<Vec<i32>>
where
    S: ArticleTagStore + ?Sized,
{
    let existing: HashSet<i32> = store
        .tag_ids_for_article(article_id)
        .await?
        .into_iter()
        .collect();
    let mut seen = HashSet::new();
    let fresh: Vec<i32> = tag_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id) && !existing.contains(id))
        .collect();

    if !fresh.is_empty() {
        store.insert_pairs(article_id, &fresh).await?;
    }
    Ok(fresh)
}

/// Unlink `tag_ids` from an article. Returns the tag ids whose pair existed.
pub async fn bulk_remove_relations<S>(
    store: &S,
    article_id: i32,
    tag_ids: &[i32],
) -> AppResult<Vec<i32>>
where
    S: ArticleTagStore + ?Sized,
{
    let existing: HashSet<i32> = store
        .tag_ids_for_article(article_id)
        .await?
        .into_iter()
        .collect();
    let mut seen = HashSet::new();
    let doomed: Vec<i32> = tag_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id) && existing.contains(id))
        .collect();

    if !doomed.is_empty() {
        store.delete_pairs(article_id, &doomed).await?;
    }
    Ok(doomed)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RelationDiff {
    pub added: Vec<i32>,
    pub removed: Vec<i32>,
}

/// Make the article's tag set equal to `tag_ids`.
pub async fn sync_relations<S>(
    store: &S,
    article_id: i32,
    tag_ids: &[i32],
) -> AppResult<RelationDiff>
where
    S: ArticleTagStore + ?Sized,
{
    let existing = store.tag_ids_for_article(article_id).await?;
    let wanted: HashSet<i32> = tag_ids.iter().copied().collect();
    let stale: Vec<i32> = existing
        .into_iter()
        .filter(|id| !wanted.contains(id))
        .collect();

    let removed = bulk_remove_relations(store, article_id, &stale).await?;
    let added = bulk_create_relations(store, article_id, tag_ids).await?;
    Ok(RelationDiff { added, removed })
}

pub struct ArticleTagService {
    db: DatabaseConnection,
}

impl ArticleTagService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Live tags for a batch of articles, each list ordered by tag name.
    pub async fn tags_for_articles(
        &self,
        article_ids: &[i32],
    ) -> AppResult<HashMap<i32, Vec<TagModel>>> {
        if article_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let pairs = ArticleTag::find()
            .filter(article_tag::Column::ArticleId.is_in(article_ids.to_vec()))
            .all(&self.db)
            .await?;

        let tag_ids: Vec<i32> = pairs
            .iter()
            .map(|p| p.tag_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if tag_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let tags: HashMap<i32, TagModel> = Tag::find_active()
            .filter(tag::Column::Id.is_in(tag_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let mut map: HashMap<i32, Vec<TagModel>> = HashMap::new();
        for pair in pairs {
            if let Some(tag) = tags.get(&pair.tag_id) {
                map.entry(pair.article_id).or_default().push(tag.clone());
            }
        }
        for list in map.values_mut() {
            list.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Ok(map)
    }
}

#[async_trait]
impl ArticleTagStore for ArticleTagService {
    async fn tag_ids_for_article(&self, article_id: i32) -> AppResult<Vec<i32>> {
        Ok(ArticleTag::find()
            .filter(article_tag::Column::ArticleId.eq(article_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|p| p.tag_id)
            .collect())
    }

    async fn insert_pairs(&self, article_id: i32, tag_ids: &[i32]) -> AppResult<()> {
        if tag_ids.is_empty() {
            return Ok(());
        }

        let now = chrono::Utc::now().naive_utc();
        let rows = tag_ids.iter().map(|&tag_id| article_tag::ActiveModel {
            article_id: Set(article_id),
            tag_id: Set(tag_id),
            created_at: Set(now),
        });

        ArticleTag::insert_many(rows)
            .on_conflict(
                OnConflict::columns([article_tag::Column::ArticleId, article_tag::Column::TagId])
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn delete_pairs(&self, article_id: i32, tag_ids: &[i32]) -> AppResult<()> {
        if tag_ids.is_empty() {
            return Ok(());
        }

        ArticleTag::delete_many()
            .filter(article_tag::Column::ArticleId.eq(article_id))
            .filter(article_tag::Column::TagId.is_in(tag_ids.to_vec()))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
