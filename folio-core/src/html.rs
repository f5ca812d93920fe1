use std::sync::LazyLock;

use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::content::ContentNode;

// Initialize syntax highlighting resources once
static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const SYNTAX_THEME: &str = "base16-ocean.dark";

/// Render a content node sequence to HTML.
///
/// Pure: every node maps to exactly one element, in document order, and
/// repeated calls over the same nodes produce identical output.
pub fn render_nodes(nodes: &[ContentNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(node, &mut out);
    }
    out
}

fn render_node(node: &ContentNode, out: &mut String) {
    match node {
        ContentNode::Heading { level, id, children } => {
            out.push_str(&format!(
                "<h{0} id=\"{1}\">{2}</h{0}>\n",
                level,
                html_escape::encode_quoted_attribute(id),
                render_children(children)
            ));
        }
        ContentNode::Paragraph { children } => {
            out.push_str(&format!("<p>{}</p>\n", render_children(children)));
        }
        ContentNode::List { ordered, children } => {
            let tag = if *ordered { "ol" } else { "ul" };
            out.push_str(&format!("<{tag}>\n"));
            for item in children {
                render_node(item, out);
            }
            out.push_str(&format!("</{tag}>\n"));
        }
        ContentNode::ListItem { children } => {
            out.push_str(&format!("<li>{}</li>\n", render_children(children)));
        }
        ContentNode::Link { href, children } => {
            out.push_str(&format!(
                "<a href=\"{}\">{}</a>",
                html_escape::encode_quoted_attribute(href),
                render_children(children)
            ));
        }
        ContentNode::CodeBlock { language, code } => {
            out.push_str(&render_code_block(language.as_deref(), code));
        }
        ContentNode::InlineCode(code) => {
            out.push_str(&format!("<code>{}</code>", html_escape::encode_text(code)));
        }
        ContentNode::Emphasis { strong, children } => {
            let tag = if *strong { "strong" } else { "em" };
            out.push_str(&format!("<{tag}>{}</{tag}>", render_children(children)));
        }
        ContentNode::Text(text) => {
            out.push_str(&html_escape::encode_text(text));
        }
    }
}

fn render_children(children: &[ContentNode]) -> String {
    let mut out = String::new();
    for child in children {
        render_node(child, &mut out);
    }
    // Block children of list items already end in a newline; trim so the
    // closing tag stays on the same line for inline-only items.
    out.trim_end_matches('\n').to_string()
}

fn render_code_block(language: Option<&str>, code: &str) -> String {
    if let Some(lang) = language {
        let syntax = SYNTAX_SET.find_syntax_by_token(lang).or_else(|| {
            // Fallback mappings for unsupported languages
            match lang {
                "toml" => SYNTAX_SET.find_syntax_by_name("YAML"),
                _ => None,
            }
        });

        if let Some(syntax) = syntax {
            let theme = &THEME_SET.themes[SYNTAX_THEME];
            return highlighted_html_for_string(code, &SYNTAX_SET, syntax, theme)
                .unwrap_or_else(|_| plain_code_block(Some(lang), code));
        }
    }

    plain_code_block(language, code)
}

fn plain_code_block(language: Option<&str>, code: &str) -> String {
    match language {
        Some(lang) => format!(
            "<pre><code class=\"language-{}\">{}</code></pre>\n",
            html_escape::encode_quoted_attribute(lang),
            html_escape::encode_text(code)
        ),
        None => format!("<pre><code>{}</code></pre>\n", html_escape::encode_text(code)),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::markdown;

    #[test]
    fn renders_nodes_in_document_order() {
        let nodes = markdown::parse(
            "# Windows WSL setup\n\nInstall a distro first.\n\n1. enable the subsystem\n2. install Ubuntu\n",
        );
        let html = render_nodes(&nodes);

        assert_eq!(
            html,
            "<h1 id=\"windows-wsl-setup\">Windows WSL setup</h1>\n\
             <p>Install a distro first.</p>\n\
             <ol>\n\
             <li>enable the subsystem</li>\n\
             <li>install Ubuntu</li>\n\
             </ol>\n"
        );
    }

    #[test]
    fn heading_paragraph_ordered_list_shape() {
        let nodes = markdown::parse("# Title\n\nIntro.\n\n1. one\n2. two\n");
        let html = render_nodes(&nodes);

        assert_eq!(html.matches("<h1").count(), 1);
        assert_eq!(html.matches("<p>").count(), 1);
        assert_eq!(html.matches("<ol>").count(), 1);
        assert_eq!(html.matches("<li>").count(), 2);

        let h1 = html.find("<h1").unwrap();
        let p = html.find("<p>").unwrap();
        let ol = html.find("<ol>").unwrap();
        assert!(h1 < p && p < ol);
    }

    #[test]
    fn link_href_is_preserved() {
        let nodes = markdown::parse("[install guide](https://docs.microsoft.com/en-us/windows/wsl/install)");
        let html = render_nodes(&nodes);

        assert!(html.contains("<a href=\"https://docs.microsoft.com/en-us/windows/wsl/install\">"));
    }

    #[test]
    fn text_is_escaped() {
        let nodes = markdown::parse("use `wsl --set-version <distro name> 2` & reboot\n");
        let html = render_nodes(&nodes);

        assert!(html.contains("<code>wsl --set-version &lt;distro name&gt; 2</code>"));
        assert!(html.contains("&amp; reboot"));
        assert!(!html.contains("<distro"));
    }

    #[test]
    fn unknown_language_falls_back_to_plain_block() {
        let nodes = markdown::parse("```notalanguage\nfoo\n```\n");
        let html = render_nodes(&nodes);

        assert_eq!(
            html,
            "<pre><code class=\"language-notalanguage\">foo\n</code></pre>\n"
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let nodes = markdown::parse("# Title\n\nSome *emphasis* and a [link](/other).\n");
        assert_eq!(render_nodes(&nodes), render_nodes(&nodes));
    }
}
