//! Built-in templates using the Tera template engine
//!
//! The default templates are embedded in the binary. A site can override any
//! of them by dropping a file with the same name into its templates
//! directory.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tera::{Context, Tera};

use crate::content::{parse_date_string, Post};
use crate::error::Result;

/// Template names, in the order they are registered
pub const TEMPLATE_NAMES: [&str; 3] = ["base.html", "index.html", "post.html"];

/// Template renderer with embedded defaults
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a renderer with only the embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("base.html", include_str!("default/base.html")),
            ("index.html", include_str!("default/index.html")),
            ("post.html", include_str!("default/post.html")),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    /// Create a renderer, letting files in `dir` replace embedded templates
    pub fn with_overrides(dir: &Path) -> Result<Self> {
        let mut renderer = Self::new()?;
        if !dir.is_dir() {
            return Ok(renderer);
        }

        for name in TEMPLATE_NAMES {
            let path = dir.join(name);
            if path.is_file() {
                renderer.tera.add_template_file(&path, Some(name))?;
                tracing::debug!("Using template override {:?}", path);
            }
        }

        Ok(renderer)
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    Ok(tera::Value::String(result.trim().to_string()))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "…".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Tera filter: reformat a date string with a strftime pattern
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "%Y-%m-%d".to_string(),
    };

    match parse_date_string(&s) {
        Some(date) => Ok(tera::Value::String(date.format(&format).to_string())),
        None => Ok(tera::Value::String(s)),
    }
}

/// Site-wide values available to every template as `site`
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub author: String,
    pub base_url: String,
    pub feed_url: String,
}

/// A post as seen by templates
#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub urlpath: String,
    pub title: String,
    pub date: Option<String>,
    pub url: String,
    pub published: bool,
    pub summary: Option<String>,
    pub html: String,
    pub meta: IndexMap<String, serde_yaml::Value>,
}

impl From<&Post> for PostData {
    fn from(post: &Post) -> Self {
        Self {
            urlpath: post.urlpath.clone(),
            title: post.title(),
            date: post.date().map(|d| d.format("%Y-%m-%d").to_string()),
            url: post.url().to_string(),
            published: post.published,
            summary: post.summary().map(str::to_string),
            html: post.html().to_string(),
            meta: post.meta.clone(),
        }
    }
}
