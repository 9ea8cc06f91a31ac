pub mod article;
pub mod article_tag;
pub mod auth;
pub mod bootstrap_admin;
pub mod cache;
pub mod category;
pub mod legal;
#[cfg(test)]
pub mod memory;
pub mod slug;
pub mod static_page;
pub mod system_config;
pub mod tag;
