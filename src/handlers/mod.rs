pub mod article;
pub mod auth;
pub mod category;
pub mod legal;
pub mod static_page;
pub mod system_config;
pub mod tag;

pub use auth::*;
