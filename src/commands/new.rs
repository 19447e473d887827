//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Blog;

/// Create a draft post named after the slugified title. Returns its path.
pub fn create_post(blog: &Blog, title: &str, path: Option<&str>) -> Result<PathBuf> {
    let now = chrono::Local::now();

    let urlpath = match path {
        Some(p) => p.trim_matches('/').to_string(),
        None => slug::slugify(title),
    };
    if urlpath.is_empty() {
        anyhow::bail!("Cannot derive a file name from {:?}", title);
    }

    let file_path = blog
        .posts_dir
        .join(format!("{}{}", urlpath, blog.config.file_extension()));

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Quote the title so YAML punctuation survives
    let content = format!(
        "title: {}\ndate: {}\npublished: false\n\n",
        serde_yaml::to_string(title)?.trim_end(),
        now.format("%Y-%m-%d %H:%M:%S")
    );

    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}
