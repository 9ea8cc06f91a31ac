pub mod article;
pub mod article_category;
pub mod article_tag;
pub mod legal_document;
pub mod soft_delete;
pub mod static_page;
pub mod system_config;
pub mod tag;
pub mod user;

pub use article::{ArticleStatus, Entity as Article, Model as ArticleModel};
pub use article_category::{Entity as ArticleCategory, Model as CategoryModel};
pub use article_tag::Entity as ArticleTag;
pub use legal_document::{Entity as LegalDocument, LegalKind, Model as LegalDocumentModel};
pub use soft_delete::SoftDelete;
pub use static_page::{Entity as StaticPage, Model as StaticPageModel};
pub use system_config::{Entity as SystemConfig, Model as SystemConfigModel};
pub use tag::{Entity as Tag, Model as TagModel};
pub use user::{Entity as User, Model as UserModel, Role};
