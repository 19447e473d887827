//! Content loader - loads posts from the posts root directory

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{FrontMatter, Post};
use crate::error::Result;

/// Loads posts from a directory of markdown files
#[derive(Debug, Clone)]
pub struct PostLoader {
    root: PathBuf,
    extension: String,
}

impl PostLoader {
    /// Create a loader for `root`. `extension` includes the leading dot.
    pub fn new<P: Into<PathBuf>>(root: P, extension: &str) -> Self {
        Self {
            root: root.into(),
            extension: extension.to_string(),
        }
    }

    /// Posts root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every post under the root. A missing root is an empty blog.
    pub fn load_all(&self) -> Result<Vec<Post>> {
        if !self.root.exists() {
            tracing::warn!("Posts directory {:?} does not exist", self.root);
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();

        for entry in WalkDir::new(&self.root).follow_links(true) {
            let entry = entry.map_err(|e| {
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop in posts directory"))
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(urlpath) = self.urlpath_for(path) {
                posts.push(self.load_file(urlpath, path)?);
            }
        }

        tracing::debug!("Loaded {} posts from {:?}", posts.len(), self.root);
        Ok(posts)
    }

    /// Load a single post by urlpath. `Ok(None)` when no such file exists.
    pub fn load(&self, urlpath: &str) -> Result<Option<Post>> {
        if !is_safe_urlpath(urlpath) {
            tracing::debug!("Rejected post path {:?}", urlpath);
            return Ok(None);
        }

        let path = self.root.join(format!("{}{}", urlpath, self.extension));
        match self.load_file(urlpath.to_string(), &path) {
            Ok(post) => Ok(Some(post)),
            Err(crate::Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn load_file(&self, urlpath: String, path: &Path) -> Result<Post> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(path, &content)?;
        tracing::debug!("Loaded post {} from {:?}", urlpath, path);
        Ok(Post::new(urlpath, path.to_path_buf(), fm, body.to_string()))
    }

    /// The urlpath of a file under the root, if it is a post file
    pub fn urlpath_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let segments: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        let joined = segments.join("/");
        let urlpath = joined.strip_suffix(&self.extension)?;

        // A file named just `.markdown` has no slug
        if urlpath.is_empty() || urlpath.ends_with('/') {
            return None;
        }
        Some(urlpath.to_string())
    }
}

/// Reject paths that would escape the posts root
fn is_safe_urlpath(urlpath: &str) -> bool {
    !urlpath.is_empty()
        && !urlpath.contains('\\')
        && !urlpath.contains('\0')
        && urlpath
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, name: &str, content: &str) {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_all_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "first.markdown", "title: First\n\nOne");
        write(dir.path(), "2013/second.markdown", "title: Second\n\nTwo");
        write(dir.path(), "notes.txt", "not a post");

        let loader = PostLoader::new(dir.path(), ".markdown");
        let mut urlpaths: Vec<_> = loader
            .load_all()
            .unwrap()
            .into_iter()
            .map(|p| p.urlpath)
            .collect();
        urlpaths.sort();
        assert_eq!(urlpaths, vec!["2013/second", "first"]);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loader = PostLoader::new(dir.path().join("nope"), ".markdown");
        assert!(loader.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_load_single() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "hello.md", "title: Hello\n\nBody");

        let loader = PostLoader::new(dir.path(), ".md");
        let post = loader.load("hello").unwrap().unwrap();
        assert_eq!(post.title(), "Hello");
        assert!(loader.load("missing").unwrap().is_none());
    }

    #[test]
    fn test_load_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "secret.md", "title: Secret\n\nBody");
        let posts = dir.path().join("posts");
        fs::create_dir_all(&posts).unwrap();

        let loader = PostLoader::new(&posts, ".md");
        assert!(loader.load("../secret").unwrap().is_none());
        assert!(loader.load("").unwrap().is_none());
        assert!(loader.load("a//b").unwrap().is_none());
    }

    #[test]
    fn test_broken_post_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "broken.md", "title: no separator\n");

        let loader = PostLoader::new(dir.path(), ".md");
        assert!(loader.load("broken").is_err());
        assert!(loader.load_all().is_err());
    }
}
