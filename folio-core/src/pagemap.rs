use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// A node in the site's navigation tree.
#[derive(Debug, Clone)]
pub enum PageMapEntry {
    Page(PageRef),
    Folder(Folder),
    Meta(MetaData),
}

/// A single documentation page: where it lives on disk and where it is
/// served from.
#[derive(Debug, Clone)]
pub struct PageRef {
    /// File stem, e.g. "wsl-setup".
    pub name: String,
    /// Route the page is served at, e.g. "/onboarding/wsl-setup".
    pub route: String,
    pub title: String,
    pub source: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Folder {
    pub name: String,
    pub route: String,
    pub children: Vec<PageMapEntry>,
}

/// Per-directory display metadata, parsed from a `_meta.json` descriptor.
///
/// Keys are page/folder slugs; order in the descriptor controls sidebar
/// order. Values are either a bare display title or an options object.
#[derive(Debug, Clone, Default)]
pub struct MetaData {
    entries: Vec<(String, MetaValue)>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Title(String),
    Options {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        display: Option<String>,
        #[serde(default, rename = "type")]
        kind: Option<String>,
    },
}

impl MetaData {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)?;
        let mut entries = Vec::with_capacity(map.len());
        for (slug, value) in map {
            entries.push((slug, serde_json::from_value(value)?));
        }
        Ok(Self { entries })
    }

    pub fn get(&self, slug: &str) -> Option<&MetaValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == slug)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(slug, value)| (slug.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MetaValue {
    pub fn title(&self) -> Option<&str> {
        match self {
            MetaValue::Title(title) => Some(title),
            MetaValue::Options { title, .. } => title.as_deref(),
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, MetaValue::Options { display: Some(d), .. } if d == "hidden")
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, MetaValue::Options { kind: Some(k), .. } if k == "separator")
    }
}

#[derive(Debug)]
pub enum PageMapError {
    DuplicateRoute(String),
}

impl fmt::Display for PageMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageMapError::DuplicateRoute(route) => {
                write!(f, "Duplicate route in page map: {}", route)
            }
        }
    }
}

impl std::error::Error for PageMapError {}

/// The site's navigation tree. Built once at scan time; read-only after.
#[derive(Debug, Clone)]
pub struct PageMap {
    entries: Vec<PageMapEntry>,
}

impl PageMap {
    /// Validates that every page route is unique within the tree.
    pub fn new(entries: Vec<PageMapEntry>) -> Result<Self, PageMapError> {
        let mut seen = HashSet::new();
        check_routes(&entries, &mut seen)?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PageMapEntry] {
        &self.entries
    }

    /// Look up a page by route.
    pub fn find_page(&self, route: &str) -> Option<&PageRef> {
        find_in(&self.entries, route)
    }

    /// Every page of the tree, flattened in tree order.
    pub fn pages(&self) -> Vec<&PageRef> {
        let mut pages = Vec::new();
        collect_pages(&self.entries, &mut pages);
        pages
    }
}

fn check_routes(entries: &[PageMapEntry], seen: &mut HashSet<String>) -> Result<(), PageMapError> {
    for entry in entries {
        match entry {
            PageMapEntry::Page(page) => {
                if !seen.insert(page.route.clone()) {
                    return Err(PageMapError::DuplicateRoute(page.route.clone()));
                }
            }
            PageMapEntry::Folder(folder) => check_routes(&folder.children, seen)?,
            PageMapEntry::Meta(_) => {}
        }
    }
    Ok(())
}

fn find_in<'a>(entries: &'a [PageMapEntry], route: &str) -> Option<&'a PageRef> {
    for entry in entries {
        match entry {
            PageMapEntry::Page(page) if page.route == route => return Some(page),
            PageMapEntry::Folder(folder) => {
                if let Some(page) = find_in(&folder.children, route) {
                    return Some(page);
                }
            }
            _ => {}
        }
    }
    None
}

fn collect_pages<'a>(entries: &'a [PageMapEntry], pages: &mut Vec<&'a PageRef>) {
    for entry in entries {
        match entry {
            PageMapEntry::Page(page) => pages.push(page),
            PageMapEntry::Folder(folder) => collect_pages(&folder.children, pages),
            PageMapEntry::Meta(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(name: &str, route: &str) -> PageMapEntry {
        PageMapEntry::Page(PageRef {
            name: name.to_string(),
            route: route.to_string(),
            title: name.to_string(),
            source: PathBuf::from(format!("{name}.md")),
        })
    }

    #[test]
    fn find_page_recurses_into_folders() {
        let map = PageMap::new(vec![
            page("index", "/"),
            PageMapEntry::Folder(Folder {
                name: "onboarding".into(),
                route: "/onboarding".into(),
                children: vec![page("wsl-setup", "/onboarding/wsl-setup")],
            }),
        ])
        .unwrap();

        assert_eq!(map.find_page("/onboarding/wsl-setup").unwrap().name, "wsl-setup");
        assert!(map.find_page("/does-not-exist").is_none());
        assert_eq!(map.pages().len(), 2);
    }

    #[test]
    fn duplicate_routes_are_rejected() {
        let result = PageMap::new(vec![
            page("a", "/same"),
            PageMapEntry::Folder(Folder {
                name: "sub".into(),
                route: "/sub".into(),
                children: vec![page("b", "/same")],
            }),
        ]);

        assert!(matches!(result, Err(PageMapError::DuplicateRoute(route)) if route == "/same"));
    }

    #[test]
    fn meta_values_parse_titles_and_options() {
        let meta = MetaData::from_json(
            r#"{
                "index": "Introduction",
                "-- Backend --": {"type": "separator"},
                "captcha": {"display": "hidden", "title": "Captcha"},
                "wsl-setup": "Windows WSL Setup"
            }"#,
        )
        .unwrap();

        assert_eq!(meta.get("index").unwrap().title(), Some("Introduction"));
        assert!(meta.get("-- Backend --").unwrap().is_separator());
        assert!(meta.get("captcha").unwrap().is_hidden());
        assert_eq!(meta.get("captcha").unwrap().title(), Some("Captcha"));

        // Descriptor order is preserved
        let slugs: Vec<&str> = meta.iter().map(|(slug, _)| slug).collect();
        assert_eq!(slugs, vec!["index", "-- Backend --", "captcha", "wsl-setup"]);
    }
}
