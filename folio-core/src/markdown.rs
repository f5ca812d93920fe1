use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

use crate::content::{self, ContentNode};

/// One entry of a page's heading outline.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingRef {
    pub depth: u8,
    pub text: String,
    pub id: String,
}

/// Parse markdown source into a sequence of content nodes.
///
/// The pulldown event stream is folded with a stack of open containers.
/// Constructs outside the content model (tables, raw html, footnotes) are
/// either skipped or have their children spill into the enclosing node, so
/// the output always stays within the modeled node set.
pub fn parse(source: &str) -> Vec<ContentNode> {
    let parser = Parser::new_ext(source, Options::all());

    let mut root: Vec<ContentNode> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for event in parser {
        match event {
            Event::Start(tag) => {
                stack.push(Frame::open(tag));
            }
            Event::End(_) => {
                if let Some(frame) = stack.pop() {
                    frame.close(&mut stack, &mut root);
                }
            }
            Event::Text(text) => push_text(&mut stack, &mut root, &text),
            Event::Code(code) => {
                push_node(&mut stack, &mut root, ContentNode::InlineCode(code.to_string()));
            }
            Event::SoftBreak => push_text(&mut stack, &mut root, " "),
            Event::HardBreak => push_text(&mut stack, &mut root, "\n"),
            // Not part of the content model
            _ => {}
        }
    }

    root
}

/// First level-1 heading of the page, if any.
pub fn page_title(nodes: &[ContentNode]) -> Option<String> {
    nodes.iter().find_map(|node| match node {
        ContentNode::Heading { level: 1, children, .. } => {
            Some(content::plain_text(children))
        }
        _ => None,
    })
}

/// Heading outline of a page, in document order.
pub fn headings(nodes: &[ContentNode]) -> Vec<HeadingRef> {
    nodes
        .iter()
        .filter_map(|node| match node {
            ContentNode::Heading { level, id, children } => Some(HeadingRef {
                depth: *level,
                text: content::plain_text(children),
                id: id.clone(),
            }),
            _ => None,
        })
        .collect()
}

/// Anchor slug for a heading: lowercased, alphanumerics kept, everything
/// else collapsed into single dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

enum Open {
    Heading { level: u8, id: Option<String> },
    Paragraph,
    List { ordered: bool },
    Item,
    Link { href: String },
    Emphasis { strong: bool },
    CodeBlock { language: Option<String> },
    // Unmodeled container; children flow into the parent on close
    Passthrough,
}

struct Frame {
    open: Open,
    children: Vec<ContentNode>,
    code: String,
}

impl Frame {
    fn open(tag: Tag) -> Self {
        let open = match tag {
            Tag::Heading { level, id, .. } => Open::Heading {
                level: level as u8,
                id: id.map(|s| s.to_string()),
            },
            Tag::Paragraph => Open::Paragraph,
            Tag::List(start) => Open::List { ordered: start.is_some() },
            Tag::Item => Open::Item,
            Tag::Link { dest_url, .. } => Open::Link { href: dest_url.to_string() },
            Tag::Emphasis => Open::Emphasis { strong: false },
            Tag::Strong => Open::Emphasis { strong: true },
            Tag::CodeBlock(CodeBlockKind::Fenced(lang)) => Open::CodeBlock {
                language: if lang.is_empty() { None } else { Some(lang.to_string()) },
            },
            Tag::CodeBlock(CodeBlockKind::Indented) => Open::CodeBlock { language: None },
            _ => Open::Passthrough,
        };

        Self {
            open,
            children: Vec::new(),
            code: String::new(),
        }
    }

    fn close(self, stack: &mut Vec<Frame>, root: &mut Vec<ContentNode>) {
        match self.open {
            Open::Heading { level, id } => {
                let id = id.unwrap_or_else(|| slugify(&content::plain_text(&self.children)));
                push_node(stack, root, ContentNode::Heading { level, id, children: self.children });
            }
            Open::Paragraph => {
                if !self.children.is_empty() {
                    push_node(stack, root, ContentNode::Paragraph { children: self.children });
                }
            }
            Open::List { ordered } => {
                push_node(stack, root, ContentNode::List { ordered, children: self.children });
            }
            Open::Item => {
                push_node(stack, root, ContentNode::ListItem { children: self.children });
            }
            Open::Link { href } => {
                push_node(stack, root, ContentNode::Link { href, children: self.children });
            }
            Open::Emphasis { strong } => {
                push_node(stack, root, ContentNode::Emphasis { strong, children: self.children });
            }
            Open::CodeBlock { language } => {
                push_node(stack, root, ContentNode::CodeBlock { language, code: self.code });
            }
            Open::Passthrough => {
                for child in self.children {
                    push_node(stack, root, child);
                }
            }
        }
    }
}

fn push_node(stack: &mut Vec<Frame>, root: &mut Vec<ContentNode>, node: ContentNode) {
    match stack.last_mut() {
        Some(frame) => frame.children.push(node),
        None => root.push(node),
    }
}

fn push_text(stack: &mut Vec<Frame>, root: &mut Vec<ContentNode>, text: &str) {
    if let Some(frame) = stack.last_mut() {
        if matches!(frame.open, Open::CodeBlock { .. }) {
            frame.code.push_str(text);
            return;
        }
    }
    push_node(stack, root, ContentNode::Text(text.to_string()));
}
