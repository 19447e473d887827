//! Freezer - exports every route of the blog to static files

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::feed::FEED_PATH;
use crate::site::Site;
use crate::Blog;

/// What a freeze run wrote
#[derive(Debug, Clone, Default)]
pub struct FreezeReport {
    /// Routes that were rendered, e.g. `/blog/hello/`
    pub routes: Vec<String>,
    /// Files written for those routes, relative to the destination
    pub files: Vec<PathBuf>,
    /// Number of static assets copied
    pub assets: usize,
}

/// Writes a loaded site into the blog's build directory
pub struct Freezer<'a> {
    blog: &'a Blog,
    site: &'a Site,
}

impl<'a> Freezer<'a> {
    pub fn new(blog: &'a Blog, site: &'a Site) -> Self {
        Self { blog, site }
    }

    /// Clear the destination and write every route into it
    pub fn freeze(&self) -> Result<FreezeReport> {
        let start = std::time::Instant::now();
        let destination = &self.blog.build_dir;
        self.check_destination(destination)?;

        if destination.exists() {
            fs::remove_dir_all(destination)?;
            tracing::debug!("Removed previous build at {:?}", destination);
        }
        fs::create_dir_all(destination)?;

        let mut report = FreezeReport::default();

        self.write_route(&mut report, "/", self.site.render_index()?)?;

        for post in self.site.published_posts() {
            let html = self.site.render_post(&post.urlpath)?;
            self.write_route(&mut report, post.url(), html)?;
        }

        let feed = self.site.render_feed(&self.blog.config.base_url())?;
        self.write_route(&mut report, FEED_PATH, feed)?;

        report.assets = self.copy_static(destination)?;

        tracing::info!(
            "Froze {} routes and {} assets into {:?} in {:.2}s",
            report.routes.len(),
            report.assets,
            destination,
            start.elapsed().as_secs_f64()
        );
        Ok(report)
    }

    /// Never wipe a directory that holds the sources
    fn check_destination(&self, destination: &Path) -> Result<()> {
        if self.blog.holds_sources(destination) {
            return Err(Error::UnsafeDestination(destination.to_path_buf()));
        }
        Ok(())
    }

    fn write_route(&self, report: &mut FreezeReport, route: &str, body: String) -> Result<()> {
        let relative = route_to_file(route);
        let path = self.blog.build_dir.join(&relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, body)?;
        tracing::debug!("Wrote {} -> {:?}", route, relative);

        report.routes.push(route.to_string());
        report.files.push(relative);
        Ok(())
    }

    /// Copy the static directory to `<destination>/static`
    fn copy_static(&self, destination: &Path) -> Result<usize> {
        let source = &self.blog.static_dir;
        if !source.is_dir() {
            return Ok(0);
        }

        let target = destination.join("static");
        let mut count = 0;

        for entry in WalkDir::new(source).follow_links(true) {
            let entry = entry.map_err(|e| {
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop in static directory"))
            })?;
            let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
            let dest = target.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest)?;
            } else if entry.file_type().is_file() {
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(entry.path(), &dest)?;
                count += 1;
            }
        }

        Ok(count)
    }
}

/// Map a route to a file path: directories get an `index.html`, and
/// percent-escapes are decoded so static servers find the file again.
pub fn route_to_file(route: &str) -> PathBuf {
    let mut path = PathBuf::new();
    for segment in route.split('/').filter(|s| !s.is_empty()) {
        let decoded = percent_encoding::percent_decode_str(segment).decode_utf8_lossy();
        path.push(&*decoded);
    }
    if route.ends_with('/') || route.is_empty() {
        path.push("index.html");
    }
    path
}
