//! HTTP API handlers for vigie-admin

pub mod affairs;
pub mod auth;
pub mod buildinfo;
pub mod health;
pub mod press;

pub use affairs::{delete_affair, find_duplicate_affairs, list_affairs, merge_affairs};
pub use auth::auth_middleware;
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use press::{classify_press_article, list_press_articles, reclassify_press_articles};
