use crate::config::env_flag;
use crate::error::AppResult;
use crate::models::{user, Role, User};
use crate::utils::hash_password;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::env;

#[derive(Debug, Clone)]
pub struct BootstrapAdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl BootstrapAdminConfig {
    /// `None` unless `BOOTSTRAP_ADMIN_ENABLED` is on and all three credentials are set.
    pub fn from_env() -> Option<Self> {
        if !env_flag("BOOTSTRAP_ADMIN_ENABLED", false) {
            return None;
        }

        Some(Self {
            username: env::var("BOOTSTRAP_ADMIN_USERNAME").ok()?,
            email: env::var("BOOTSTRAP_ADMIN_EMAIL").ok()?,
            password: env::var("BOOTSTRAP_ADMIN_PASSWORD").ok()?,
        })
    }
}

/// Make sure the dashboard has an administrator at startup.
///
/// Does nothing when any admin exists. Otherwise promotes the user matching
/// the configured email or username, or creates a new admin account.
pub async fn ensure_bootstrap_admin(db: &DatabaseConnection) -> AppResult<()> {
    let Some(cfg) = BootstrapAdminConfig::from_env() else {
        return Ok(());
    };

    let admin_exists = User::find()
        .filter(user::Column::Role.eq(Role::Admin.as_str()))
        .one(db)
        .await?
        .is_some();
    if admin_exists {
        return Ok(());
    }

    let existing = User::find()
        .filter(
            Condition::any()
                .add(user::Column::Email.eq(cfg.email.clone()))
                .add(user::Column::Username.eq(cfg.username.clone())),
        )
        .one(db)
        .await?;

    let now = chrono::Utc::now().naive_utc();

    if let Some(found) = existing {
        let user_id = found.id;
        let mut active: user::ActiveModel = found.into();
        active.role = Set(Role::Admin.as_str().to_string());
        active.updated_at = Set(now);
        active.update(db).await?;
        tracing::info!(user_id, "Promoted existing user to admin");
        return Ok(());
    }

    let admin = user::ActiveModel {
        username: Set(cfg.username),
        email: Set(cfg.email),
        password_hash: Set(hash_password(&cfg.password)?),
        role: Set(Role::Admin.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(user_id = admin.id, "Bootstrap admin created");
    Ok(())
}
