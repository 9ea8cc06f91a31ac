use sea_orm::{ColumnTrait, EntityTrait, PrimaryKeyTrait, QueryFilter, Select};

/// Entities whose rows are retired by stamping `deleted_at` instead of being removed.
///
/// Services read through [`SoftDelete::find_active`] and
/// [`SoftDelete::find_active_by_id`] so the `deleted_at IS NULL` predicate is
/// applied on every read path. Uniqueness checks (slugs, keys, versions) go
/// through plain `find()` on purpose: the database unique indexes still cover
/// retired rows.
pub trait SoftDelete: EntityTrait {
    fn deleted_at_column() -> Self::Column;

    fn find_active() -> Select<Self> {
        Self::find().filter(Self::deleted_at_column().is_null())
    }

    fn find_active_by_id<T>(id: T) -> Select<Self>
    where
        T: Into<<Self::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    {
        Self::find_by_id(id).filter(Self::deleted_at_column().is_null())
    }
}

macro_rules! impl_soft_delete {
    ($($module:ident),+ $(,)?) => {
        $(
            impl SoftDelete for super::$module::Entity {
                fn deleted_at_column() -> Self::Column {
                    super::$module::Column::DeletedAt
                }
            }
        )+
    };
}

impl_soft_delete!(
    article,
    article_category,
    tag,
    system_config,
    static_page,
    legal_document,
);
