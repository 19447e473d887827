//! Post model

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::{FrontMatter, MarkdownRenderer};

/// Characters escaped inside a URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Route prefix for single posts
pub const POST_ROUTE_PREFIX: &str = "/blog/";

/// A blog post loaded from a markdown file
#[derive(Debug)]
pub struct Post {
    /// Path relative to the posts root, without extension (`2013/hello`)
    pub urlpath: String,

    /// Source file
    pub filepath: PathBuf,

    /// Whether the post shows up in listings, the feed and the frozen site
    pub published: bool,

    /// Every front-matter field, in file order
    pub meta: IndexMap<String, Value>,

    /// Raw markdown body
    pub body: String,

    date: Option<DateTime<FixedOffset>>,
    html: OnceLock<String>,
    url: OnceLock<String>,
}

impl Post {
    /// Build a post from its parsed parts
    pub fn new(urlpath: String, filepath: PathBuf, front_matter: FrontMatter, body: String) -> Self {
        let published = front_matter.published();
        let date = front_matter.parse_date();
        if date.is_none() && front_matter.get("date").is_some() {
            tracing::warn!("Unrecognised date in {:?}", filepath);
        }

        Self {
            urlpath,
            filepath,
            published,
            meta: front_matter.meta,
            body,
            date,
            html: OnceLock::new(),
            url: OnceLock::new(),
        }
    }

    /// Title from front matter, or the file stem
    pub fn title(&self) -> String {
        match self.meta.get("title") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => self
                .filepath
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(&self.urlpath)
                .to_string(),
        }
    }

    /// Publication date, if the front matter carries a parsable one
    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        self.date
    }

    /// Optional `summary` field
    pub fn summary(&self) -> Option<&str> {
        self.meta.get("summary").and_then(Value::as_str)
    }

    /// Body rendered to HTML; rendered on first use only
    pub fn html(&self) -> &str {
        self.html
            .get_or_init(|| MarkdownRenderer::shared().render(&self.body))
    }

    /// Absolute path of the post route, e.g. `/blog/2013/hello/`
    pub fn url(&self) -> &str {
        self.url.get_or_init(|| post_url(&self.urlpath))
    }

    #[cfg(test)]
    fn is_rendered(&self) -> bool {
        self.html.get().is_some()
    }

    /// Source file relative to `root`, for log output
    pub fn relative_source(&self, root: &Path) -> String {
        self.filepath
            .strip_prefix(root)
            .unwrap_or(&self.filepath)
            .to_string_lossy()
            .to_string()
    }
}

/// Route path for a urlpath, each segment percent-encoded
pub fn post_url(urlpath: &str) -> String {
    let encoded: Vec<String> = urlpath
        .split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect();
    format!("{}{}/", POST_ROUTE_PREFIX, encoded.join("/"))
}
