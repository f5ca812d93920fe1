use std::path::Path;

use tera::{Context, Tera};

#[derive(Debug)]
pub enum TemplateError {
    TeraError(tera::Error),
    IoError(std::io::Error),
}

impl From<tera::Error> for TemplateError {
    fn from(err: tera::Error) -> Self {
        TemplateError::TeraError(err)
    }
}

impl From<std::io::Error> for TemplateError {
    fn from(err: std::io::Error) -> Self {
        TemplateError::IoError(err)
    }
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::TeraError(e) => write!(f, "Template error: {}", e),
            TemplateError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for TemplateError {}

const DEFAULT_PAGE_TEMPLATE: &str = include_str!("templates/page.html");
const DEFAULT_NOT_FOUND_TEMPLATE: &str = include_str!("templates/404.html");

/// Tera templates loaded from the theme directory, with built-in fallbacks
/// so a site renders without any theme on disk.
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    pub fn new(theme_dir: &Path) -> Result<Self, TemplateError> {
        let mut tera = if theme_dir.is_dir() {
            Tera::new(&format!("{}/**/*.html", theme_dir.display()))?
        } else {
            Tera::default()
        };

        if !tera.get_template_names().any(|name| name == "page.html") {
            tera.add_raw_template("page.html", DEFAULT_PAGE_TEMPLATE)?;
        }
        if !tera.get_template_names().any(|name| name == "404.html") {
            tera.add_raw_template("404.html", DEFAULT_NOT_FOUND_TEMPLATE)?;
        }

        Ok(Self { tera })
    }

    /// Render a template with the given context
    pub fn render(&self, template: &str, context: &Context) -> Result<String, TemplateError> {
        Ok(self.tera.render(template, context)?)
    }

    /// Render a template and write it directly to a file
    pub fn render_to_file(
        &self,
        template: &str,
        context: &Context,
        output_path: &Path,
    ) -> Result<(), TemplateError> {
        let rendered = self.render(template, context)?;

        // Ensure parent directory exists
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(output_path, rendered)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_builtin_templates() {
        let renderer = TemplateRenderer::new(Path::new("./no-such-theme")).unwrap();

        let mut context = Context::new();
        context.insert("title", "Windows WSL setup");
        context.insert("content", "<h1>Windows WSL setup</h1>");
        context.insert("sidebar", "");
        context.insert("outline", &Vec::<String>::new());
        context.insert("edit_link", &Option::<String>::None);
        context.insert("favicon", "");
        context.insert("site", &crate::config::SiteConfig::default());

        let html = renderer.render("page.html", &context).unwrap();
        assert!(html.contains("<title>Windows WSL setup</title>"));
        assert!(html.contains("<h1>Windows WSL setup</h1>"));
    }

    #[test]
    fn render_to_file_creates_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("page.html"), "hello {{ title }}").unwrap();

        let renderer = TemplateRenderer::new(tmp.path()).unwrap();
        let mut context = Context::new();
        context.insert("title", "file");

        let target = tmp.path().join("nested/out/index.html");
        renderer.render_to_file("page.html", &context, &target).unwrap();

        assert_eq!(std::fs::read_to_string(target).unwrap(), "hello file");
    }

    #[test]
    fn theme_templates_override_builtins() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("page.html"), "custom: {{ title }}").unwrap();

        let renderer = TemplateRenderer::new(tmp.path()).unwrap();
        let mut context = Context::new();
        context.insert("title", "Hello");

        assert_eq!(renderer.render("page.html", &context).unwrap(), "custom: Hello");
    }
}
