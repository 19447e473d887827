//! HTTP server for the blog

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, uri::Authority, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::DEFAULT_BASE_URL;
use crate::content::POST_ROUTE_PREFIX;
use crate::feed::{FEED_CONTENT_TYPE, FEED_PATH};
use crate::site::Site;
use crate::{Blog, Error};

const NOT_FOUND_PAGE: &str = "<!DOCTYPE html>\n<title>404 Not Found</title>\n<h1>Not Found</h1>\n<p>The requested URL was not found on the server.</p>\n";

/// Server state
struct ServerState {
    site: Site,
}

type SharedState = Arc<ServerState>;

/// Load the blog and serve it until the process is stopped
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let site = blog.site()?;
    tracing::info!("Loaded {} posts", site.posts().len());

    let app = router(site, blog);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Routes of the blog
pub fn router(site: Site, blog: &Blog) -> Router {
    let state = Arc::new(ServerState { site });

    Router::new()
        .route("/", get(index_handler))
        .route(&format!("{}*path", POST_ROUTE_PREFIX), get(post_handler))
        .route(FEED_PATH, get(feed_handler))
        .nest_service("/static", ServeDir::new(&blog.static_dir))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index_handler(State(state): State<SharedState>) -> Response {
    match state.site.render_index() {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_response(e),
    }
}

/// `/blog/<path>/`. Requests without the trailing slash are redirected.
async fn post_handler(State(state): State<SharedState>, Path(path): Path<String>) -> Response {
    let Some(urlpath) = path.strip_suffix('/') else {
        let target = crate::content::post_url(&path);
        return Redirect::permanent(&target).into_response();
    };

    if urlpath.is_empty() {
        return not_found_handler().await;
    }

    match state.site.render_post(urlpath) {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_response(e),
    }
}

async fn feed_handler(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let base_url = request_base_url(&state.site, &headers);

    match state.site.render_feed(&base_url) {
        Ok(xml) => ([(header::CONTENT_TYPE, FEED_CONTENT_TYPE)], xml).into_response(),
        Err(e) => error_response(e),
    }
}

async fn not_found_handler() -> Response {
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response()
}

/// Base URL for absolute feed links: the configured one, else the Host
/// header when it is a bare `host[:port]`, else the default.
fn request_base_url(site: &Site, headers: &HeaderMap) -> String {
    if site.config().freezer_base_url.is_some() {
        return site.config().base_url();
    }

    headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .and_then(|host| host.parse::<Authority>().ok())
        .filter(|authority| !authority.as_str().contains('@'))
        .map(|authority| format!("http://{}/", authority))
        .unwrap_or_else(|| {
            tracing::debug!("No usable Host header, feed links use {}", DEFAULT_BASE_URL);
            DEFAULT_BASE_URL.to_string()
        })
}

fn error_response(err: Error) -> Response {
    if err.is_not_found() {
        tracing::debug!("{}", err);
        return (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response();
    }

    tracing::error!("Request failed: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}
