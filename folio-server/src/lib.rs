use anyhow::Result;
use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tower_http::services::ServeDir;

use folio_core::{Config, Site, SiteBuilder, SiteError};

// Served when even the 404 template fails to render
const FALLBACK_NOT_FOUND: &str = "<!DOCTYPE html><html><body><h1>404 - Page not found</h1></body></html>";

/// Configuration for the documentation server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to serve on
    pub port: u16,
    /// Auto-open browser
    pub open: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            open: false,
        }
    }
}

/// Everything needed to (re)build the site from disk.
#[derive(Debug, Clone)]
pub struct SiteSources {
    pub source_dir: PathBuf,
    pub theme_dir: PathBuf,
    pub config_path: PathBuf,
}

impl SiteSources {
    pub fn build_site(&self) -> Result<Site, SiteError> {
        // A missing config file is fine; a broken one should be visible,
        // not silently replaced by default chrome.
        let config = if self.config_path.exists() {
            match Config::read(&self.config_path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(
                        path = %self.config_path.display(),
                        error = %e,
                        "invalid config file, falling back to defaults"
                    );
                    Config::default()
                }
            }
        } else {
            Config::default()
        };

        SiteBuilder::new(&self.source_dir)
            .theme_dir(&self.theme_dir)
            .site_config(config.site)
            .build()
    }
}

#[derive(Clone)]
struct AppState {
    site: Arc<RwLock<Site>>,
}

/// Serves a [`Site`] over HTTP and rebuilds it when sources change.
pub struct DocServer {
    config: ServerConfig,
    sources: SiteSources,
    site: Arc<RwLock<Site>>,
}

impl DocServer {
    pub fn new(config: ServerConfig, sources: SiteSources, site: Site) -> Self {
        Self {
            config,
            sources,
            site: Arc::new(RwLock::new(site)),
        }
    }

    pub async fn run(self) -> Result<()> {
        let assets_dir = self.site.read().await.theme_dir().join("assets");
        let app = router(Arc::clone(&self.site), assets_dir);

        let watch_site = Arc::clone(&self.site);
        let watch_sources = self.sources.clone();
        tokio::spawn(async move {
            if let Err(e) = watch_and_rebuild(watch_sources, watch_site).await {
                tracing::error!(error = %e, "file watcher stopped");
            }
        });

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        tracing::info!(%addr, "serving documentation");

        if self.config.open {
            if let Err(e) = open::that(format!("http://{}", addr)) {
                tracing::warn!(error = %e, "failed to open browser");
            }
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Build the request router: theme assets under `/assets`, everything else
/// resolved through the page registry.
pub fn router(site: Arc<RwLock<Site>>, assets_dir: PathBuf) -> Router {
    Router::new()
        .nest_service("/assets", ServeDir::new(assets_dir))
        .fallback(render_page)
        .with_state(AppState { site })
}

async fn render_page(State(state): State<AppState>, uri: Uri) -> Response {
    let route = normalize_route(uri.path());
    let site = state.site.read().await;

    match site.render_route(&route) {
        Ok(html) => Html(html).into_response(),
        Err(SiteError::RouteNotFound(_)) => {
            tracing::debug!(%route, "route not found");
            let body = site
                .not_found_page()
                .unwrap_or_else(|_| FALLBACK_NOT_FOUND.to_string());
            (StatusCode::NOT_FOUND, Html(body)).into_response()
        }
        Err(e) => {
            tracing::error!(%route, error = %e, "failed to render page");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Request paths map onto page routes: trailing slashes are dropped and the
/// empty path is the index route.
fn normalize_route(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

async fn watch_and_rebuild(sources: SiteSources, site: Arc<RwLock<Site>>) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |res: DebounceEventResult| {
            if let Ok(events) = res {
                for event in events {
                    let _ = tx.blocking_send(event.path);
                }
            }
        },
    )?;

    debouncer
        .watcher()
        .watch(&sources.source_dir, notify::RecursiveMode::Recursive)?;
    if sources.theme_dir.exists() {
        debouncer
            .watcher()
            .watch(&sources.theme_dir, notify::RecursiveMode::Recursive)?;
    }
    if sources.config_path.exists() {
        debouncer
            .watcher()
            .watch(&sources.config_path, notify::RecursiveMode::NonRecursive)?;
    }

    tracing::info!(source = %sources.source_dir.display(), "watching for changes");

    while let Some(path) = rx.recv().await {
        tracing::info!(path = %path.display(), "source changed, rebuilding");
        match sources.build_site() {
            Ok(new_site) => {
                *site.write().await = new_site;
                tracing::info!("site rebuilt");
            }
            Err(e) => {
                tracing::error!(error = %e, "rebuild failed, keeping previous site");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;

    fn sample_site(dir: &std::path::Path) -> Site {
        std::fs::write(dir.join("index.md"), "# Introduction\n\nWelcome.\n").unwrap();
        SiteBuilder::new(dir).build().unwrap()
    }

    #[test]
    fn malformed_config_falls_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("index.md"), "# Home\n").unwrap();
        std::fs::write(tmp.path().join("folio.toml"), "[site\nnot valid toml").unwrap();

        let sources = SiteSources {
            source_dir: tmp.path().to_path_buf(),
            theme_dir: tmp.path().join("theme"),
            config_path: tmp.path().join("folio.toml"),
        };

        let site = sources.build_site().unwrap();
        assert_eq!(
            site.config().logo,
            folio_core::SiteConfig::default().logo
        );
    }

    #[tokio::test]
    async fn known_route_returns_html() {
        let tmp = tempfile::tempdir().unwrap();
        let site = sample_site(tmp.path());
        let app = router(Arc::new(RwLock::new(site)), tmp.path().join("assets"));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/html"));
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let tmp = tempfile::tempdir().unwrap();
        let site = sample_site(tmp.path());
        let app = router(Arc::new(RwLock::new(site)), tmp.path().join("assets"));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/does-not-exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn trailing_slash_resolves_to_the_same_page() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("onboarding")).unwrap();
        std::fs::write(
            tmp.path().join("onboarding/wsl-setup.md"),
            "# Windows WSL setup\n",
        )
        .unwrap();
        let site = SiteBuilder::new(tmp.path()).build().unwrap();
        let app = router(Arc::new(RwLock::new(site)), tmp.path().join("assets"));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/onboarding/wsl-setup/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
