//! Freeze the blog into static files

use anyhow::Result;

use crate::freezer::FreezeReport;
use crate::Blog;

/// Freeze every route into the build directory
pub fn run(blog: &Blog) -> Result<FreezeReport> {
    let start = std::time::Instant::now();

    let report = blog.build()?;
    for route in &report.routes {
        tracing::debug!("Frozen: {}", route);
    }

    tracing::info!(
        "Built {} pages into {:?} in {:.2}s",
        report.files.len(),
        blog.build_dir,
        start.elapsed().as_secs_f64()
    );

    Ok(report)
}
