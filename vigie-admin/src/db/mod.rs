//! Database access layer for vigie-admin
//!
//! Queries return `vigie_common::Result`; handlers map its variants to HTTP
//! status codes.

pub mod affairs;
pub mod press;

pub use affairs::{
    delete_affair, load_affair, load_affairs, load_politician, merge_affairs, MergeOutcome,
};
pub use press::{count_articles, list_articles, reclassify_articles, ReclassifyCounts};
