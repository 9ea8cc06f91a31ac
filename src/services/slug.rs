use crate::error::{AppError, AppResult};
use crate::utils::slugify;
use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

/// Upper bound on `-N` suffixes tried before giving up.
pub const SLUG_MAX_ATTEMPTS: u32 = 1000;

/// Anything that can answer "is this slug already used?".
#[async_trait]
pub trait SlugStore: Send + Sync {
    /// Must count soft-deleted rows too: the unique index still holds them.
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i32>) -> AppResult<bool>;
}

/// Allocate a slug for `source` that no other row holds.
///
/// Tries `base`, `base-1`, `base-2`, ... one query at a time. An empty base
/// (all punctuation) is replaced by `fallback`. `exclude_id` lets an update
/// keep a slug the row already owns.
///
/// Two concurrent callers can still pick the same candidate; the second
/// insert then fails on the unique index and the error propagates as-is.
pub async fn unique_slug<S>(
    store: &S,
    source: &str,
    fallback: &str,
    exclude_id: Option<i32>,
) -> AppResult<String>
where
    S: SlugStore + ?Sized,
{
    let base = match slugify(source) {
        slug if slug.is_empty() => slugify(fallback),
        slug => slug,
    };

    if !store.slug_exists(&base, exclude_id).await? {
        return Ok(base);
    }

    for n in 1..=SLUG_MAX_ATTEMPTS {
        let candidate = format!("{base}-{n}");
        if !store.slug_exists(&candidate, exclude_id).await? {
            return Ok(candidate);
        }
    }

    tracing::warn!(base = %base, "Slug suffixes exhausted");
    Err(AppError::Conflict(format!(
        "Could not allocate a unique slug for '{base}'"
    )))
}

/// Slug lookup shared by the sea-orm backed services. Not
/// filtered by `deleted_at`.
pub(crate) async fn slug_taken<E>(
    db: &DatabaseConnection,
    slug_column: E::Column,
    id_column: E::Column,
    slug: &str,
    exclude_id: Option<i32>,
) -> AppResult<bool>
where
    E: EntityTrait,
    E::Model: Sync + 'static,
{
    let mut query = E::find().filter(slug_column.eq(slug));
    if let Some(id) = exclude_id {
        query = query.filter(id_column.ne(id));
    }
    Ok(query.count(db).await? > 0)
}
