use crate::{
    error::{AppError, AppResult},
    models::{system_config, SoftDelete, SystemConfig, SystemConfigModel},
    services::cache::CacheService,
    validation::{is_config_key, validate, FieldRule, Rule},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

const CACHE_KEY_PUBLIC_CONFIG: &str = "config:public";
const CACHE_TTL_PUBLIC_CONFIG: u64 = 300;

const CONFIG_RULES: &[FieldRule] = &[
    FieldRule {
        field: "key",
        rules: &[
            Rule::Required,
            Rule::Length { min: 1, max: 100 },
            Rule::Pattern {
                check: is_config_key,
                expected: "lowercase letters, digits, '.', '_' or '-'",
            },
        ],
    },
    FieldRule {
        field: "category",
        rules: &[Rule::Required, Rule::Length { min: 1, max: 50 }],
    },
    FieldRule {
        field: "description",
        rules: &[Rule::Length { min: 0, max: 500 }],
    },
];

#[derive(Debug, Clone)]
pub struct ConfigInput {
    pub value: serde_json::Value,
    pub category: String,
    pub description: Option<String>,
    pub is_public: bool,
}

fn validate_config(key: &str, input: &ConfigInput) -> AppResult<()> {
    validate(
        CONFIG_RULES,
        &[
            ("key", Some(key)),
            ("category", Some(input.category.as_str())),
            ("description", input.description.as_deref()),
        ],
    )
}

pub struct SystemConfigService {
    db: DatabaseConnection,
    cache: Option<CacheService>,
}

impl SystemConfigService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, cache: None }
    }

    pub fn with_cache(mut self, cache: Option<CacheService>) -> Self {
        self.cache = cache;
        self
    }

    pub async fn list_all(&self, category: Option<&str>) -> AppResult<Vec<SystemConfigModel>> {
        let mut query = SystemConfig::find_active();
        if let Some(category) = category {
            query = query.filter(system_config::Column::Category.eq(category));
        }
        let configs = query
            .order_by_asc(system_config::Column::Category)
            .order_by_asc(system_config::Column::Key)
            .all(&self.db)
            .await?;
        Ok(configs)
    }

    pub async fn list_public(&self) -> AppResult<Vec<SystemConfigModel>> {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache
                .get::<Vec<SystemConfigModel>>(CACHE_KEY_PUBLIC_CONFIG)
                .await
            {
                return Ok(cached);
            }
        }

        let configs = SystemConfig::find_active()
            .filter(system_config::Column::IsPublic.eq(true))
            .order_by_asc(system_config::Column::Category)
            .order_by_asc(system_config::Column::Key)
            .all(&self.db)
            .await?;

        if let Some(cache) = &self.cache {
            cache
                .set(CACHE_KEY_PUBLIC_CONFIG, &configs, CACHE_TTL_PUBLIC_CONFIG)
                .await;
        }

        Ok(configs)
    }

    pub async fn get_by_key(&self, key: &str) -> AppResult<SystemConfigModel> {
        SystemConfig::find_active()
            .filter(system_config::Column::Key.eq(key))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(
        &self,
        key: &str,
        input: ConfigInput,
        created_by: i32,
    ) -> AppResult<SystemConfigModel> {
        validate_config(key, &input)?;

        // Keys stay reserved after a soft delete.
        let taken = SystemConfig::find()
            .filter(system_config::Column::Key.eq(key))
            .count(&self.db)
            .await?;
        if taken > 0 {
            return Err(AppError::Conflict(format!("Config key '{key}' already exists")));
        }

        let now = chrono::Utc::now().naive_utc();
        let config = system_config::ActiveModel {
            key: Set(key.to_string()),
            value: Set(input.value),
            category: Set(input.category),
            description: Set(input.description),
            is_public: Set(input.is_public),
            created_by: Set(Some(created_by)),
            updated_by: Set(Some(created_by)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(key, user_id = created_by, "Config entry created");
        self.invalidate_public_cache().await;
        Ok(config)
    }

    pub async fn update(
        &self,
        key: &str,
        input: ConfigInput,
        updated_by: i32,
    ) -> AppResult<SystemConfigModel> {
        validate_config(key, &input)?;
        let existing = self.get_by_key(key).await?;

        let mut active: system_config::ActiveModel = existing.into();
        active.value = Set(input.value);
        active.category = Set(input.category);
        active.description = Set(input.description);
        active.is_public = Set(input.is_public);
        active.updated_by = Set(Some(updated_by));
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        let updated = active.update(&self.db).await?;

        self.invalidate_public_cache().await;
        Ok(updated)
    }

    pub async fn delete(&self, key: &str, deleted_by: i32) -> AppResult<()> {
        let existing = self.get_by_key(key).await?;
        let now = chrono::Utc::now().naive_utc();

        let mut active: system_config::ActiveModel = existing.into();
        active.deleted_at = Set(Some(now));
        active.updated_by = Set(Some(deleted_by));
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        tracing::info!(key, user_id = deleted_by, "Config entry soft-deleted");
        self.invalidate_public_cache().await;
        Ok(())
    }

    async fn invalidate_public_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate(CACHE_KEY_PUBLIC_CONFIG).await;
        }
    }
}
