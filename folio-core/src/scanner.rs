use std::fmt;
use std::path::{Path, PathBuf};

use crate::markdown;
use crate::pagemap::{Folder, MetaData, PageMap, PageMapEntry, PageMapError, PageRef};

pub const META_FILE: &str = "_meta.json";

#[derive(Debug)]
pub enum ScanError {
    Io(std::io::Error),
    Meta(PathBuf, serde_json::Error),
    PageMap(PageMapError),
    InvalidPath(PathBuf),
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::Io(err)
    }
}

impl From<PageMapError> for ScanError {
    fn from(err: PageMapError) -> Self {
        ScanError::PageMap(err)
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Io(e) => write!(f, "IO error: {}", e),
            ScanError::Meta(path, e) => {
                write!(f, "Invalid meta descriptor {}: {}", path.display(), e)
            }
            ScanError::PageMap(e) => write!(f, "{}", e),
            ScanError::InvalidPath(p) => write!(f, "Invalid path: {}", p.display()),
        }
    }
}

impl std::error::Error for ScanError {}

/// Walks a source directory and assembles the navigation tree.
///
/// Each directory contributes its `.md` files as pages, its subdirectories
/// as folders and its `_meta.json` (when present) as display metadata.
/// `index.md` maps to the directory's own route.
pub struct SiteScanner {
    source_dir: PathBuf,
}

impl SiteScanner {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            source_dir: path.as_ref().to_path_buf(),
        }
    }

    pub fn scan(&self) -> Result<PageMap, ScanError> {
        let entries = self.scan_dir(&self.source_dir, "")?;
        Ok(PageMap::new(entries)?)
    }

    fn scan_dir(&self, dir: &Path, route_prefix: &str) -> Result<Vec<PageMapEntry>, ScanError> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        // Filesystem order is not stable; sort for deterministic output
        paths.sort();

        let mut entries = Vec::new();

        for path in paths {
            if path.is_dir() {
                if is_hidden(&path) {
                    continue;
                }
                let name = file_name(&path)?;
                let route = format!("{route_prefix}/{name}");
                let children = self.scan_dir(&path, &route)?;
                entries.push(PageMapEntry::Folder(Folder { name, route, children }));
            } else if file_name(&path)? == META_FILE {
                let raw = std::fs::read_to_string(&path)?;
                let meta = MetaData::from_json(&raw)
                    .map_err(|e| ScanError::Meta(path.clone(), e))?;
                entries.push(PageMapEntry::Meta(meta));
            } else if !is_hidden(&path) && path.extension().map(|ext| ext == "md").unwrap_or(false) {
                entries.push(PageMapEntry::Page(self.scan_page(&path, route_prefix)?));
            }
        }

        Ok(entries)
    }

    fn scan_page(&self, path: &Path, route_prefix: &str) -> Result<PageRef, ScanError> {
        let stem = path
            .file_stem()
            .ok_or_else(|| ScanError::InvalidPath(path.to_path_buf()))?
            .to_string_lossy()
            .to_string();

        let route = if stem == "index" {
            if route_prefix.is_empty() {
                "/".to_string()
            } else {
                route_prefix.to_string()
            }
        } else {
            format!("{route_prefix}/{stem}")
        };

        let source = std::fs::read_to_string(path)?;
        let title = markdown::page_title(&markdown::parse(&source))
            .unwrap_or_else(|| title_from_slug(&stem));

        Ok(PageRef {
            name: stem,
            route,
            title,
            source: path.to_path_buf(),
        })
    }
}

// Dot and underscore prefixes are reserved: dotfiles, descriptors
// (`_meta.json`) and drafts never become pages or folders.
fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| {
            let name = name.to_string_lossy();
            name.starts_with('.') || name.starts_with('_')
        })
        .unwrap_or(true)
}

fn file_name(path: &Path) -> Result<String, ScanError> {
    Ok(path
        .file_name()
        .ok_or_else(|| ScanError::InvalidPath(path.to_path_buf()))?
        .to_string_lossy()
        .to_string())
}

/// Display title for a page without a top-level heading: "wsl-setup"
/// becomes "Wsl Setup".
fn title_from_slug(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn scans_pages_folders_and_meta() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "index.md", "# Introduction\n\nWelcome.\n");
        write(tmp.path(), "_meta.json", r#"{"index": "Introduction"}"#);
        write(
            tmp.path(),
            "onboarding/wsl-setup.md",
            "# Windows WSL setup\n\nHere we go.\n",
        );
        write(tmp.path(), "onboarding/_meta.json", r#"{"wsl-setup": "Windows WSL Setup"}"#);

        let map = SiteScanner::new(tmp.path()).scan().unwrap();

        let index = map.find_page("/").unwrap();
        assert_eq!(index.title, "Introduction");

        let wsl = map.find_page("/onboarding/wsl-setup").unwrap();
        assert_eq!(wsl.name, "wsl-setup");
        assert_eq!(wsl.title, "Windows WSL setup");

        assert_eq!(map.pages().len(), 2);
    }

    #[test]
    fn index_md_maps_to_folder_route() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "frontend/index.md", "# Frontend\n");

        let map = SiteScanner::new(tmp.path()).scan().unwrap();
        assert!(map.find_page("/frontend").is_some());
    }

    #[test]
    fn hidden_and_underscore_directories_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "visible.md", "# Visible\n");
        write(tmp.path(), ".git/ignored.md", "# Nope\n");
        write(tmp.path(), "_drafts/ignored.md", "# Nope\n");

        let map = SiteScanner::new(tmp.path()).scan().unwrap();
        assert_eq!(map.pages().len(), 1);
    }

    #[test]
    fn underscore_prefixed_files_are_not_pages() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "visible.md", "# Visible\n");
        write(tmp.path(), "_draft.md", "# Draft\n");

        let map = SiteScanner::new(tmp.path()).scan().unwrap();
        assert_eq!(map.pages().len(), 1);
        assert!(map.find_page("/_draft").is_none());
    }

    #[test]
    fn page_without_heading_gets_titlecased_slug() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "forms-general.md", "Just a paragraph.\n");

        let map = SiteScanner::new(tmp.path()).scan().unwrap();
        assert_eq!(map.find_page("/forms-general").unwrap().title, "Forms General");
    }

    #[test]
    fn bad_meta_descriptor_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "_meta.json", "{not valid json");

        let result = SiteScanner::new(tmp.path()).scan();
        assert!(matches!(result, Err(ScanError::Meta(_, _))));
    }
}
