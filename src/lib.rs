//! blogfreeze: a small markdown blog
//!
//! Posts are markdown files with a YAML front-matter block. The blog is
//! either served over HTTP or frozen into a directory of static files.

pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod feed;
pub mod freezer;
pub mod server;
pub mod site;
pub mod templates;

pub use error::{Error, Result};

use std::path::{Component, Path, PathBuf};

/// Settings file looked up in the site directory
pub const SETTINGS_FILE: &str = "settings.yml";

/// Environment variable pointing at an alternative settings file
pub const SETTINGS_ENV: &str = "BLOG_SETTINGS";

/// A blog rooted at a site directory
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::BlogConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Markdown posts
    pub posts_dir: PathBuf,
    /// Static assets served under /static
    pub static_dir: PathBuf,
    /// Template overrides
    pub templates_dir: PathBuf,
    /// Freezer output
    pub build_dir: PathBuf,
}

impl Blog {
    /// Open the blog in `base_dir`, reading its settings file if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let settings_path = settings_path(&base_dir);

        let config = if settings_path.exists() {
            config::BlogConfig::load(&settings_path)?
        } else {
            tracing::debug!("No settings at {:?}, using defaults", settings_path);
            config::BlogConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Open the blog with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::BlogConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();

        let posts_dir = base_dir.join(&config.posts_root_directory);
        let static_dir = base_dir.join(&config.static_directory);
        let templates_dir = base_dir.join(&config.templates_directory);
        let build_dir = base_dir.join(&config.freezer_destination);

        Self {
            config,
            base_dir,
            posts_dir,
            static_dir,
            templates_dir,
            build_dir,
        }
    }

    /// Loader for this blog's posts
    pub fn loader(&self) -> content::PostLoader {
        content::PostLoader::new(&self.posts_dir, &self.config.file_extension())
    }

    /// Scan the posts and prepare templates
    pub fn site(&self) -> Result<site::Site> {
        site::Site::open(self)
    }

    /// Whether removing `dir` would delete the site, its posts, static files
    /// or templates. Paths are resolved first, so `posts/..` counts as the site.
    pub fn holds_sources(&self, dir: &Path) -> bool {
        let dir = resolve_path(dir);
        [
            &self.base_dir,
            &self.posts_dir,
            &self.static_dir,
            &self.templates_dir,
        ]
        .iter()
        .any(|source| resolve_path(source).starts_with(&dir))
    }

    /// Freeze the blog into `build_dir`
    pub fn build(&self) -> Result<freezer::FreezeReport> {
        let site = self.site()?;
        freezer::Freezer::new(self, &site).freeze()
    }
}

/// `$BLOG_SETTINGS` if set (relative to `base_dir`), else `settings.yml`
fn settings_path(base_dir: &Path) -> PathBuf {
    match std::env::var_os(SETTINGS_ENV) {
        Some(path) if !path.is_empty() => base_dir.join(path),
        _ => base_dir.join(SETTINGS_FILE),
    }
}

/// Absolute `path` with `.` and `..` folded away and its longest existing
/// prefix canonicalized
fn resolve_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }

    for ancestor in normalized.ancestors() {
        if let Ok(canonical) = ancestor.canonicalize() {
            let rest = normalized.strip_prefix(ancestor).unwrap_or(Path::new(""));
            return canonical.join(rest);
        }
    }
    normalized
}
