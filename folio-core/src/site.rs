use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::Context;

use crate::config::SiteConfig;
use crate::content::ContentNode;
use crate::html;
use crate::markdown;
use crate::pagemap::PageMap;
use crate::scanner::{ScanError, SiteScanner};
use crate::sidebar;
use crate::template::{TemplateError, TemplateRenderer};

#[derive(Debug)]
pub enum SiteError {
    /// The requested route has no matching page.
    RouteNotFound(String),
    Scan(ScanError),
    Template(TemplateError),
    Io(std::io::Error),
}

impl From<ScanError> for SiteError {
    fn from(err: ScanError) -> Self {
        SiteError::Scan(err)
    }
}

impl From<TemplateError> for SiteError {
    fn from(err: TemplateError) -> Self {
        SiteError::Template(err)
    }
}

impl From<std::io::Error> for SiteError {
    fn from(err: std::io::Error) -> Self {
        SiteError::Io(err)
    }
}

impl fmt::Display for SiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteError::RouteNotFound(route) => write!(f, "No page at route: {}", route),
            SiteError::Scan(e) => write!(f, "Scan error: {}", e),
            SiteError::Template(e) => write!(f, "Template error: {}", e),
            SiteError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for SiteError {}

#[derive(Debug, Serialize)]
pub struct NavItem {
    pub text: String,
    pub link: String,
}

struct Document {
    title: String,
    nodes: Vec<ContentNode>,
    outline: Vec<NavItem>,
    edit_link: Option<String>,
}

/// Assembles a [`Site`] from a source directory, a theme directory and a
/// site configuration.
pub struct SiteBuilder {
    source_dir: PathBuf,
    theme_dir: PathBuf,
    config: SiteConfig,
}

impl SiteBuilder {
    pub fn new<P: AsRef<Path>>(source_dir: P) -> Self {
        Self {
            source_dir: source_dir.as_ref().to_path_buf(),
            theme_dir: PathBuf::from("./theme"),
            config: SiteConfig::default(),
        }
    }

    pub fn theme_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.theme_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn site_config(mut self, config: SiteConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Site, SiteError> {
        let page_map = SiteScanner::new(&self.source_dir).scan()?;
        let renderer = TemplateRenderer::new(&self.theme_dir)?;

        let mut documents = HashMap::new();
        for page in page_map.pages() {
            let raw = std::fs::read_to_string(&page.source)?;
            let nodes = markdown::parse(&raw);

            let outline = markdown::headings(&nodes)
                .into_iter()
                // Convention: the only h1 is the page title
                .filter(|h| h.depth > 1)
                .map(|h| NavItem {
                    text: h.text,
                    link: format!("#{}", h.id),
                })
                .collect();

            let edit_link = self.config.docs_repository_base.as_ref().and_then(|base| {
                page.source
                    .strip_prefix(&self.source_dir)
                    .ok()
                    .map(|rel| format!("{}/{}", base.trim_end_matches('/'), rel.display()))
            });

            documents.insert(
                page.route.clone(),
                Document {
                    title: page.title.clone(),
                    nodes,
                    outline,
                    edit_link,
                },
            );
        }

        let sidebar_html = sidebar::render_html(
            &sidebar::build(page_map.entries()),
            self.config.sidebar_collapse_level,
        );

        Ok(Site {
            config: self.config,
            page_map,
            documents,
            sidebar_html,
            renderer,
            theme_dir: self.theme_dir,
        })
    }
}

/// The page registry: every document of the site, keyed by route, plus the
/// immutable navigation tree and configuration. Read-only once built.
pub struct Site {
    config: SiteConfig,
    page_map: PageMap,
    documents: HashMap<String, Document>,
    sidebar_html: String,
    renderer: TemplateRenderer,
    theme_dir: PathBuf,
}

impl Site {
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn page_map(&self) -> &PageMap {
        &self.page_map
    }

    /// Render the document at `route` into a full HTML page.
    ///
    /// Pure transformation: repeated calls return identical output. Fails
    /// with [`SiteError::RouteNotFound`] for routes with no page.
    pub fn render_route(&self, route: &str) -> Result<String, SiteError> {
        let doc = self
            .documents
            .get(route)
            .ok_or_else(|| SiteError::RouteNotFound(route.to_string()))?;

        let mut context = self.base_context();
        context.insert("title", &doc.title);
        context.insert("content", &html::render_nodes(&doc.nodes));
        context.insert("outline", &doc.outline);
        context.insert("edit_link", &doc.edit_link);

        Ok(self.renderer.render("page.html", &context)?)
    }

    /// The user-visible not-found document served alongside a 404 status.
    pub fn not_found_page(&self) -> Result<String, SiteError> {
        Ok(self.renderer.render("404.html", &self.base_context())?)
    }

    /// Write the whole site below `out_dir`: one `<route>/index.html` per
    /// page, the 404 page, and the theme's static assets.
    pub fn render_all<P: AsRef<Path>>(&self, out_dir: P) -> Result<(), SiteError> {
        let out_dir = out_dir.as_ref();
        std::fs::create_dir_all(out_dir)?;

        for page in self.page_map.pages() {
            let html = self.render_route(&page.route)?;
            let output_path = out_dir.join(route_out_path(&page.route));
            if let Some(parent) = output_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(output_path, html)?;
        }

        self.renderer
            .render_to_file("404.html", &self.base_context(), &out_dir.join("404.html"))?;

        self.copy_assets(out_dir)?;

        Ok(())
    }

    /// Theme directory the site was built with.
    pub fn theme_dir(&self) -> &Path {
        &self.theme_dir
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.config);
        context.insert("sidebar", &self.sidebar_html);
        context.insert("favicon", &favicon_link(&self.config.favicon_glyph));
        context
    }

    fn copy_assets(&self, out_dir: &Path) -> Result<(), SiteError> {
        let assets_dir = self.theme_dir.join("assets");
        if !assets_dir.is_dir() {
            return Ok(());
        }

        for entry in walkdir::WalkDir::new(&assets_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
        {
            let rel = entry
                .path()
                .strip_prefix(&assets_dir)
                .expect("walked path is below assets dir");
            let target = out_dir.join("assets").join(rel);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), target)?;
        }

        Ok(())
    }
}

/// Output path for a route: `/` maps to `index.html`, `/a/b` to
/// `a/b/index.html`.
fn route_out_path(route: &str) -> PathBuf {
    let trimmed = route.trim_matches('/');
    if trimmed.is_empty() {
        PathBuf::from("index.html")
    } else {
        PathBuf::from(trimmed).join("index.html")
    }
}

/// Favicon link tag with the configured glyph drawn into an inline SVG.
fn favicon_link(glyph: &str) -> String {
    if glyph.is_empty() {
        return String::new();
    }
    format!(
        "<link rel=\"icon\" href=\"data:image/svg+xml,<svg xmlns=%22http://www.w3.org/2000/svg%22 viewBox=%220 0 100 100%22><text y=%22.9em%22 font-size=%2290%22>{glyph}</text></svg>\">"
    )
}
