pub mod jwt;
pub mod markdown;
pub mod password;
pub mod slug;

pub use jwt::encode_access_token;
pub use markdown::{plain_excerpt, render_markdown};
pub use password::{hash_password, verify_password};
pub use slug::slugify;
