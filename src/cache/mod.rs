//! Ordered post cache
//!
//! Posts are kept in a [`SortedIndex`], a mapping whose keys are always
//! ordered by a sort key derived from the value. For posts that is the
//! publish date, newest first. The index is filled once by a directory scan
//! and grows lazily when a request names a post that was not scanned.
//! Nothing is ever evicted.

use chrono::{DateTime, FixedOffset};
use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::content::{Post, PostLoader};
use crate::error::{Error, Result};

type SortKeyFn<V, S> = Box<dyn Fn(&V) -> S + Send + Sync>;

/// A map whose iteration order follows a sort key computed from each value.
///
/// Ties are broken by the map key so the order is deterministic.
pub struct SortedIndex<K, V, S> {
    entries: HashMap<K, V>,
    order: Vec<K>,
    sort_key: SortKeyFn<V, S>,
}

impl<K, V, S> SortedIndex<K, V, S>
where
    K: Eq + Hash + Ord + Clone,
    S: Ord,
{
    /// Create an empty index ordered by `sort_key`
    pub fn new<F>(sort_key: F) -> Self
    where
        F: Fn(&V) -> S + Send + Sync + 'static,
    {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            sort_key: Box::new(sort_key),
        }
    }

    /// Insert or replace a value, then restore the ordering.
    ///
    /// Re-sorts the whole key list; inserts are rare (startup scan and cache
    /// misses) so that stays cheap.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let previous = self.entries.insert(key.clone(), value);
        if previous.is_none() {
            self.order.push(key);
        }
        self.resort();
        previous
    }

    /// Look up a value
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Remove a value
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    /// Values in sorted order
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    /// Entries in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order
            .iter()
            .filter_map(move |k| self.entries.get(k).map(|v| (k, v)))
    }

    fn resort(&mut self) {
        let entries = &self.entries;
        let sort_key = &self.sort_key;
        self.order.sort_by(|a, b| match (entries.get(a), entries.get(b)) {
            (Some(va), Some(vb)) => sort_key(va).cmp(&sort_key(vb)).then_with(|| a.cmp(b)),
            _ => Ordering::Equal,
        });
    }
}

impl<K: fmt::Debug, V, S> fmt::Debug for SortedIndex<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortedIndex")
            .field("order", &self.order)
            .finish()
    }
}

/// Sort key for posts: newest first, undated posts last
type PostOrder = Reverse<Option<DateTime<FixedOffset>>>;

fn post_order(post: &Arc<Post>) -> PostOrder {
    Reverse(post.date())
}

/// Posts keyed by urlpath, newest first
#[derive(Debug)]
pub struct PostCache {
    index: SortedIndex<String, Arc<Post>, PostOrder>,
    loader: PostLoader,
}

impl PostCache {
    /// Create an empty cache backed by `loader`
    pub fn new(loader: PostLoader) -> Self {
        Self {
            index: SortedIndex::new(post_order),
            loader,
        }
    }

    /// Scan the posts directory and insert every post
    pub fn populate(&mut self) -> Result<usize> {
        let posts = self.loader.load_all()?;
        let count = posts.len();
        for post in posts {
            self.insert(post);
        }
        tracing::info!("Cached {} posts from {:?}", count, self.loader.root());
        Ok(count)
    }

    /// Add a post, replacing any post with the same urlpath
    pub fn insert(&mut self, post: Post) -> Arc<Post> {
        let post = Arc::new(post);
        self.index.insert(post.urlpath.clone(), Arc::clone(&post));
        post
    }

    /// Plain lookup, no disk access
    pub fn get(&self, urlpath: &str) -> Option<Arc<Post>> {
        self.index.get(&urlpath.to_string()).cloned()
    }

    /// Lookup that falls back to loading the file on a miss.
    ///
    /// Returns [`Error::NotFound`] when no file backs `urlpath`.
    pub fn get_or_load(&mut self, urlpath: &str) -> Result<Arc<Post>> {
        if let Some(post) = self.get(urlpath) {
            return Ok(post);
        }

        match self.loader.load(urlpath)? {
            Some(post) => {
                tracing::debug!("Cache miss for {}, loaded from disk", urlpath);
                Ok(self.insert(post))
            }
            None => Err(Error::NotFound(urlpath.to_string())),
        }
    }

    /// Remove a post
    pub fn remove(&mut self, urlpath: &str) -> Option<Arc<Post>> {
        self.index.remove(&urlpath.to_string())
    }

    /// All posts, newest first
    pub fn posts(&self) -> Vec<Arc<Post>> {
        self.index.values().cloned().collect()
    }

    /// Published posts, newest first
    pub fn published(&self) -> Vec<Arc<Post>> {
        self.index
            .values()
            .filter(|p| p.published)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
