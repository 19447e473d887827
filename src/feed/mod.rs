//! Atom feed generation

use atom_syndication::{Content, Entry, Feed, Link, Person, Text};
use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;

use crate::config::BlogConfig;
use crate::content::Post;
use crate::error::Result;

/// Route of the feed
pub const FEED_PATH: &str = "/feed.atom";

/// Content type served for the feed
pub const FEED_CONTENT_TYPE: &str = "application/atom+xml; charset=utf-8";

/// Hard cap on feed entries; `FEED_MAX_ENTRIES` can only lower it
pub const FEED_ENTRY_LIMIT: usize = 10;

/// Build the feed from posts that are already sorted newest first.
///
/// Only published posts are included, at most `FEED_MAX_ENTRIES` of them
/// and never more than [`FEED_ENTRY_LIMIT`].
/// `base_url` must end with a slash.
pub fn build_feed(config: &BlogConfig, posts: &[Arc<Post>], base_url: &str) -> Feed {
    let absolute = |path: &str| format!("{}{}", base_url, path.trim_start_matches('/'));

    let entries: Vec<Entry> = posts
        .iter()
        .filter(|p| p.published)
        .take(config.feed_max_entries.min(FEED_ENTRY_LIMIT))
        .map(|post| feed_entry(config, post, &absolute(post.url())))
        .collect();

    let updated = entries
        .iter()
        .map(|e| e.updated)
        .max()
        .unwrap_or_else(epoch);

    Feed {
        title: Text::plain(config.site_title.clone()),
        id: absolute(FEED_PATH),
        updated,
        authors: vec![author(config)],
        links: vec![
            Link {
                href: absolute(FEED_PATH),
                rel: "self".to_string(),
                mime_type: Some("application/atom+xml".to_string()),
                ..Default::default()
            },
            Link {
                href: absolute("/"),
                rel: "alternate".to_string(),
                ..Default::default()
            },
        ],
        entries,
        ..Default::default()
    }
}

/// Render the feed as an XML document
pub fn render_feed(config: &BlogConfig, posts: &[Arc<Post>], base_url: &str) -> Result<String> {
    let feed = build_feed(config, posts, base_url);
    let buffer = feed.write_to(Vec::new())?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn feed_entry(config: &BlogConfig, post: &Post, url: &str) -> Entry {
    let date = post.date().unwrap_or_else(epoch);

    Entry {
        title: Text::plain(post.title()),
        id: url.to_string(),
        updated: date,
        published: post.date(),
        authors: vec![author(config)],
        links: vec![Link {
            href: url.to_string(),
            rel: "alternate".to_string(),
            ..Default::default()
        }],
        summary: post.summary().map(|s| Text::plain(s.to_string())),
        content: Some(Content {
            value: Some(post.html().to_string()),
            content_type: Some("html".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn author(config: &BlogConfig) -> Person {
    Person {
        name: config.site_author.clone(),
        ..Default::default()
    }
}

fn epoch() -> DateTime<FixedOffset> {
    DateTime::<Utc>::default().fixed_offset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FrontMatter;
    use std::path::PathBuf;

    fn make_post(urlpath: &str, content: &str) -> Arc<Post> {
        let path = PathBuf::from(format!("posts/{}.markdown", urlpath));
        let (fm, body) = FrontMatter::parse(&path, content).unwrap();
        Arc::new(Post::new(urlpath.to_string(), path, fm, body.to_string()))
    }

    #[test]
    fn test_feed_caps_entries() {
        let posts: Vec<_> = (0..15)
            .map(|i| {
                make_post(
                    &format!("post-{}", i),
                    &format!("title: Post {}\npublished: true\ndate: 2013-01-{:02}\n\nbody", i, i + 1),
                )
            })
            .collect();

        let feed = build_feed(&BlogConfig::default(), &posts, "http://example.com/");
        assert_eq!(feed.entries.len(), 10);
        for entry in &feed.entries {
            assert!(!entry.title.value.is_empty());
            assert!(entry.links[0].href.starts_with("http://example.com/blog/"));
        }
    }

    #[test]
    fn test_feed_max_entries_cannot_exceed_limit() {
        let posts: Vec<_> = (0..15)
            .map(|i| {
                make_post(
                    &format!("post-{}", i),
                    &format!("title: Post {}\npublished: true\ndate: 2013-01-{:02}\n\nbody", i, i + 1),
                )
            })
            .collect();

        let config = BlogConfig {
            feed_max_entries: 50,
            ..Default::default()
        };
        let feed = build_feed(&config, &posts, "http://example.com/");
        assert_eq!(feed.entries.len(), FEED_ENTRY_LIMIT);

        let config = BlogConfig {
            feed_max_entries: 3,
            ..Default::default()
        };
        let feed = build_feed(&config, &posts, "http://example.com/");
        assert_eq!(feed.entries.len(), 3);
        assert_eq!(feed.entries[0].title.value, "Post 0");
    }

    #[test]
    fn test_feed_skips_unpublished() {
        let posts = vec![
            make_post("draft", "title: Draft\n\nbody"),
            make_post("live", "published: true\ndate: 2013-01-01\n\nbody"),
        ];

        let feed = build_feed(&BlogConfig::default(), &posts, "http://example.com/");
        assert_eq!(feed.entries.len(), 1);
        let entry = &feed.entries[0];
        // Title falls back to the file stem
        assert_eq!(entry.title.value, "live");
        assert_eq!(entry.id, "http://example.com/blog/live/");
        assert_eq!(feed.updated, entry.updated);
    }

    #[test]
    fn test_render_feed_xml() {
        let posts = vec![make_post(
            "hello",
            "title: Hello & welcome\npublished: true\ndate: 2013-01-01\n\n*hi*",
        )];

        let xml = render_feed(&BlogConfig::default(), &posts, "http://localhost/").unwrap();
        assert!(xml.contains("<feed"));
        assert!(xml.contains("Hello &amp; welcome"));
        assert!(xml.contains("http://localhost/feed.atom"));
        assert!(xml.contains("http://localhost/blog/hello/"));
    }

    #[test]
    fn test_empty_feed() {
        let feed = build_feed(&BlogConfig::default(), &[], "http://localhost/");
        assert!(feed.entries.is_empty());
        assert_eq!(feed.updated, epoch());
    }
}
