//! Clean the build directory

use anyhow::Result;
use std::fs;

use crate::Blog;

/// Remove the build directory. Returns whether anything was deleted.
pub fn run(blog: &Blog) -> Result<bool> {
    if !blog.build_dir.exists() {
        return Ok(false);
    }

    if blog.holds_sources(&blog.build_dir) {
        anyhow::bail!(
            "Refusing to delete {:?}: it contains the site sources",
            blog.build_dir
        );
    }

    fs::remove_dir_all(&blog.build_dir)?;
    tracing::info!("Deleted: {:?}", blog.build_dir);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlogConfig;

    #[test]
    fn test_clean_removes_build_dir() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        fs::create_dir_all(blog.build_dir.join("blog")).unwrap();

        assert!(run(&blog).unwrap());
        assert!(!blog.build_dir.exists());
        assert!(!run(&blog).unwrap());
    }

    #[test]
    fn test_clean_refuses_site_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = BlogConfig {
            freezer_destination: String::new(),
            ..Default::default()
        };
        let blog = Blog::with_config(dir.path(), config);

        assert!(run(&blog).is_err());
        assert!(dir.path().exists());
    }

    #[test]
    fn test_clean_refuses_parent_segments() {
        for destination in ["posts/..", "..", "build/../posts"] {
            let dir = tempfile::tempdir().unwrap();
            let post = dir.path().join("posts/keep.markdown");
            fs::create_dir_all(post.parent().unwrap()).unwrap();
            fs::write(&post, "title: Keep\n\nbody").unwrap();

            let config = BlogConfig {
                freezer_destination: destination.to_string(),
                ..Default::default()
            };
            let blog = Blog::with_config(dir.path(), config);

            assert!(run(&blog).is_err(), "{}", destination);
            assert!(post.exists(), "{}", destination);
        }
    }
}
