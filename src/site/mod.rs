//! Page rendering shared by the server and the freezer

use std::sync::{Arc, PoisonError, RwLock};
use tera::Context;

use crate::cache::PostCache;
use crate::config::BlogConfig;
use crate::content::Post;
use crate::error::Result;
use crate::feed::{self, FEED_PATH};
use crate::templates::{PostData, SiteData, TemplateRenderer};
use crate::Blog;

/// A loaded blog: post cache plus templates
pub struct Site {
    config: BlogConfig,
    cache: RwLock<PostCache>,
    templates: TemplateRenderer,
}

impl Site {
    /// Scan the posts directory and load templates
    pub fn open(blog: &Blog) -> Result<Self> {
        let mut cache = PostCache::new(blog.loader());
        cache.populate()?;
        let templates = TemplateRenderer::with_overrides(&blog.templates_dir)?;

        Ok(Self::from_parts(blog.config.clone(), cache, templates))
    }

    /// Assemble a site from an already filled cache
    pub fn from_parts(config: BlogConfig, cache: PostCache, templates: TemplateRenderer) -> Self {
        Self {
            config,
            cache: RwLock::new(cache),
            templates,
        }
    }

    pub fn config(&self) -> &BlogConfig {
        &self.config
    }

    /// All cached posts, newest first
    pub fn posts(&self) -> Vec<Arc<Post>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).posts()
    }

    /// Published posts, newest first
    pub fn published_posts(&self) -> Vec<Arc<Post>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .published()
    }

    /// Find a post, loading it from disk if it was not scanned
    pub fn post(&self, urlpath: &str) -> Result<Arc<Post>> {
        if let Some(post) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(urlpath)
        {
            return Ok(post);
        }

        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_load(urlpath)
    }

    /// The index page listing published posts
    pub fn render_index(&self) -> Result<String> {
        let posts: Vec<PostData> = self
            .published_posts()
            .iter()
            .map(|p| PostData::from(p.as_ref()))
            .collect();

        let mut context = self.base_context();
        context.insert("posts", &posts);
        self.templates.render("index.html", &context)
    }

    /// A single post page. Unknown urlpaths yield `Error::NotFound`.
    pub fn render_post(&self, urlpath: &str) -> Result<String> {
        let post = self.post(urlpath)?;
        let mut context = self.base_context();
        context.insert("post", &PostData::from(post.as_ref()));
        self.templates.render("post.html", &context)
    }

    /// The Atom feed, with links made absolute against `base_url`
    pub fn render_feed(&self, base_url: &str) -> Result<String> {
        feed::render_feed(&self.config, &self.published_posts(), base_url)
    }

    fn base_context(&self) -> Context {
        let site = SiteData {
            title: self.config.site_title.clone(),
            author: self.config.site_author.clone(),
            base_url: self.config.base_url(),
            feed_url: FEED_PATH.to_string(),
        };

        let mut context = Context::new();
        context.insert("site", &site);
        context
    }
}
