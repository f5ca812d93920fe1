/// A single semantic unit of documentation content.
///
/// Pages are stored as a flat sequence of these at the top level; container
/// variants own their children, so the tree is finite and acyclic by
/// construction. Rendering walks nodes in document order and nothing ever
/// re-sorts them.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentNode {
    Heading {
        level: u8,
        /// Slug used for the anchor id and the on-this-page outline.
        id: String,
        children: Vec<ContentNode>,
    },
    Paragraph {
        children: Vec<ContentNode>,
    },
    List {
        ordered: bool,
        children: Vec<ContentNode>,
    },
    /// Item of a list. May hold block children (paragraphs, nested lists)
    /// as well as inline ones.
    ListItem {
        children: Vec<ContentNode>,
    },
    Link {
        href: String,
        children: Vec<ContentNode>,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    InlineCode(String),
    Emphasis {
        strong: bool,
        children: Vec<ContentNode>,
    },
    Text(String),
}

impl ContentNode {
    /// Concatenated text content of this node and its descendants.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            ContentNode::Text(text) => out.push_str(text),
            ContentNode::InlineCode(code) => out.push_str(code),
            ContentNode::CodeBlock { code, .. } => out.push_str(code),
            ContentNode::Heading { children, .. }
            | ContentNode::Paragraph { children }
            | ContentNode::List { children, .. }
            | ContentNode::ListItem { children }
            | ContentNode::Link { children, .. }
            | ContentNode::Emphasis { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// Text content of a node sequence, used for heading slugs and titles.
pub fn plain_text(nodes: &[ContentNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.collect_text(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_walks_nested_children() {
        let node = ContentNode::Paragraph {
            children: vec![
                ContentNode::Text("Run ".into()),
                ContentNode::Emphasis {
                    strong: true,
                    children: vec![ContentNode::Text("wsl".into())],
                },
                ContentNode::InlineCode(" --set-version".into()),
            ],
        };

        assert_eq!(node.plain_text(), "Run wsl --set-version");
    }
}
