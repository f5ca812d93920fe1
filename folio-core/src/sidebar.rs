use crate::pagemap::{Folder, MetaData, PageMapEntry};

/// One rendered sidebar row.
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarItem {
    Separator { text: String },
    Page { text: String, link: String },
    Folder {
        text: String,
        /// Present when the folder has an index page.
        link: Option<String>,
        children: Vec<SidebarItem>,
    },
}

/// Build the sidebar for one level of the page map.
///
/// The level's `_meta.json` (when present) dictates order, titles,
/// separators and hidden entries; pages and folders it does not mention are
/// appended afterwards in filesystem order.
pub fn build(entries: &[PageMapEntry]) -> Vec<SidebarItem> {
    let meta = entries.iter().find_map(|entry| match entry {
        PageMapEntry::Meta(meta) => Some(meta),
        _ => None,
    });

    let mut candidates: Vec<(String, SidebarItem)> = Vec::new();
    for entry in entries {
        match entry {
            PageMapEntry::Page(page) => {
                candidates.push((
                    page.name.clone(),
                    SidebarItem::Page {
                        text: page.title.clone(),
                        link: page.route.clone(),
                    },
                ));
            }
            PageMapEntry::Folder(folder) => {
                candidates.push((folder.name.clone(), folder_item(folder)));
            }
            PageMapEntry::Meta(_) => {}
        }
    }

    let Some(meta) = meta else {
        return candidates.into_iter().map(|(_, item)| item).collect();
    };

    ordered_by_meta(meta, candidates)
}

fn ordered_by_meta(meta: &MetaData, mut candidates: Vec<(String, SidebarItem)>) -> Vec<SidebarItem> {
    let mut items = Vec::new();

    for (slug, value) in meta.iter() {
        if value.is_separator() {
            let text = value
                .title()
                .map(str::to_string)
                .unwrap_or_else(|| slug.trim_matches(['-', ' ']).to_string());
            items.push(SidebarItem::Separator { text });
            continue;
        }

        let Some(position) = candidates.iter().position(|(name, _)| name == slug) else {
            continue;
        };
        let (_, item) = candidates.remove(position);

        if value.is_hidden() {
            continue;
        }

        items.push(match (value.title(), item) {
            (Some(title), SidebarItem::Page { link, .. }) => SidebarItem::Page {
                text: title.to_string(),
                link,
            },
            (Some(title), SidebarItem::Folder { link, children, .. }) => SidebarItem::Folder {
                text: title.to_string(),
                link,
                children,
            },
            (_, item) => item,
        });
    }

    // Entries the descriptor does not mention keep filesystem order
    items.extend(candidates.into_iter().map(|(_, item)| item));
    items
}

fn folder_item(folder: &Folder) -> SidebarItem {
    // A folder's index page links the folder itself instead of being
    // listed among its children
    let link = folder.children.iter().find_map(|entry| match entry {
        PageMapEntry::Page(page) if page.route == folder.route => Some(page.route.clone()),
        _ => None,
    });

    let children: Vec<PageMapEntry> = folder
        .children
        .iter()
        .filter(|entry| {
            !matches!(entry, PageMapEntry::Page(page) if page.route == folder.route)
        })
        .cloned()
        .collect();

    SidebarItem::Folder {
        text: folder.name.clone(),
        link,
        children: build(&children),
    }
}

/// Render sidebar items to nested `<ul>` markup.
pub fn render_html(items: &[SidebarItem], collapse_level: u8) -> String {
    let mut out = String::new();
    render_level(items, collapse_level, 1, &mut out);
    out
}

fn render_level(items: &[SidebarItem], collapse_level: u8, depth: u8, out: &mut String) {
    out.push_str("<ul>\n");
    for item in items {
        match item {
            SidebarItem::Separator { text } => {
                out.push_str(&format!(
                    "<li class=\"separator\">{}</li>\n",
                    html_escape::encode_text(text)
                ));
            }
            SidebarItem::Page { text, link } => {
                out.push_str(&format!(
                    "<li><a href=\"{}\">{}</a></li>\n",
                    html_escape::encode_quoted_attribute(link),
                    html_escape::encode_text(text)
                ));
            }
            SidebarItem::Folder { text, link, children } => {
                // Folders deeper than the collapse level start collapsed
                let collapsed = collapse_level > 0 && depth > collapse_level;
                let class = if collapsed { "folder collapsed" } else { "folder" };
                out.push_str(&format!("<li class=\"{class}\">"));
                match link {
                    Some(link) => out.push_str(&format!(
                        "<a href=\"{}\">{}</a>",
                        html_escape::encode_quoted_attribute(link),
                        html_escape::encode_text(text)
                    )),
                    None => out.push_str(&format!(
                        "<span>{}</span>",
                        html_escape::encode_text(text)
                    )),
                }
                out.push('\n');
                render_level(children, collapse_level, depth + 1, out);
                out.push_str("</li>\n");
            }
        }
    }
    out.push_str("</ul>\n");
}
