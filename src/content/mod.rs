//! Content module - handles posts, front matter and markdown

mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use frontmatter::{parse_date_string, FrontMatter};
pub use loader::PostLoader;
pub use markdown::MarkdownRenderer;
pub use post::{post_url, Post, POST_ROUTE_PREFIX};
