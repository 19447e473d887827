//! List posts

use anyhow::Result;
use std::io::Write;

use crate::cache::PostCache;
use crate::Blog;

/// Print every post, newest first. Drafts are marked.
pub fn run(blog: &Blog, drafts: bool) -> Result<()> {
    let stdout = std::io::stdout();
    write_listing(blog, drafts, &mut stdout.lock())
}

/// Write the listing to `out`
pub fn write_listing<W: Write>(blog: &Blog, drafts: bool, out: &mut W) -> Result<()> {
    let mut cache = PostCache::new(blog.loader());
    cache.populate()?;

    let posts = if drafts {
        cache.posts()
    } else {
        cache.published()
    };

    writeln!(out, "Posts ({}):", posts.len())?;
    for post in posts {
        let date = post
            .date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        let marker = if post.published { "" } else { " (draft)" };
        writeln!(
            out,
            "  {} - {}{} [{}]",
            date,
            post.title(),
            marker,
            post.relative_source(&blog.posts_dir)
        )?;
    }

    Ok(())
}
