//! HTML rendering of rich text and content trees.

use std::fmt::Write;

use crate::content::{BlockKind, ContentTree, Node, NodeId};
use crate::id::to_plain_id;
use crate::rich_text::{Mark, RichText, plain_text};

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Render an icon for inline display.
///
/// URLs become an `<img>`, anything else (usually an emoji) is wrapped in a
/// `<span>`.
#[must_use]
pub fn icon_html(icon: Option<&str>) -> String {
    match icon {
        Some(icon) if icon.starts_with("http") => format!(
            r#"<span><img class="inline-img-icon" src="{}"></span>"#,
            escape_html(icon)
        ),
        Some(icon) if !icon.is_empty() => format!("<span>{}</span>", escape_html(icon)),
        _ => String::new(),
    }
}

/// Render rich text runs to inline HTML.
#[must_use]
pub fn render_rich_text(runs: &[RichText]) -> String {
    let mut out = String::new();
    for run in runs {
        push_run(run, &mut out);
    }
    out
}

fn push_run(run: &RichText, out: &mut String) {
    if run.is_page_mention()
        && let Some(Mark::PageMention { uri }) = run.marks.first()
    {
        let uri = escape_html(uri);
        let _ = write!(out, r#"<a class="page-mention" href="{uri}">{uri}</a>"#);
        return;
    }

    let mut html = match run.marks.iter().find_map(|mark| match mark {
        Mark::Date(date) => Some(date),
        _ => None,
    }) {
        Some(date) => format!(r#"<span class="date">{}</span>"#, escape_html(&date.start_date)),
        None => escape_html(&run.text),
    };

    for mark in &run.marks {
        html = match mark {
            Mark::Bold => format!("<strong>{html}</strong>"),
            Mark::Italic => format!("<em>{html}</em>"),
            Mark::Strikethrough => format!("<del>{html}</del>"),
            Mark::Underline => format!("<u>{html}</u>"),
            Mark::Code => format!("<code>{html}</code>"),
            Mark::Color { value } => {
                format!(r#"<span class="color-{}">{html}</span>"#, escape_html(value))
            }
            Mark::Link { href } => format!(r#"<a href="{}">{html}</a>"#, escape_html(href)),
            Mark::PageMention { .. } | Mark::Date(_) | Mark::Unknown => html,
        };
    }
    out.push_str(&html);
}

/// Render the body of a page.
///
/// The root page node itself is not rendered, only its children. Every block
/// carries its dashless id as the `id` attribute so that `#block` anchors
/// resolve. A node reachable through several edges is rendered once.
#[must_use]
pub fn render_content(tree: &ContentTree) -> String {
    let mut writer = HtmlWriter {
        tree,
        seen: vec![false; tree.len()],
        out: String::new(),
    };
    let root = tree.root();
    if let Some(node) = tree.node(root) {
        writer.seen[root.index()] = true;
        writer.children(&node.children);
    }
    writer.out
}

struct HtmlWriter<'a> {
    tree: &'a ContentTree,
    seen: Vec<bool>,
    out: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bulleted,
    Numbered,
}

impl ListKind {
    fn of(node: &Node) -> Option<Self> {
        match node.kind {
            BlockKind::BulletedListItem => Some(Self::Bulleted),
            BlockKind::NumberedListItem => Some(Self::Numbered),
            _ => None,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Self::Bulleted => "ul",
            Self::Numbered => "ol",
        }
    }
}

impl<'a> HtmlWriter<'a> {
    /// Render siblings, grouping consecutive list items into one list.
    fn children(&mut self, ids: &[NodeId]) {
        let tree = self.tree;
        let mut open: Option<ListKind> = None;
        for &id in ids {
            let Some(node) = tree.node(id) else {
                continue;
            };
            if self.seen.get(id.index()).copied().unwrap_or(true) {
                continue;
            }
            let list = ListKind::of(node);
            if open != list {
                if let Some(kind) = open {
                    let _ = write!(self.out, "</{}>", kind.tag());
                }
                if let Some(kind) = list {
                    let _ = write!(self.out, "<{}>", kind.tag());
                }
                open = list;
            }
            self.block(id, node);
        }
        if let Some(kind) = open {
            let _ = write!(self.out, "</{}>", kind.tag());
        }
    }

    fn block(&mut self, id: NodeId, node: &'a Node) {
        self.seen[id.index()] = true;
        let anchor = escape_html(&to_plain_id(&node.id));
        let text = render_rich_text(&node.title);

        match &node.kind {
            BlockKind::Page => {
                let href = escape_html(node.uri.as_deref().unwrap_or_default());
                let _ = write!(
                    self.out,
                    r#"<div id="{anchor}" class="page-link"><a href="{href}">{text}</a></div>"#
                );
                return;
            }
            BlockKind::Text => {
                let _ = write!(self.out, r#"<p id="{anchor}">{text}</p>"#);
            }
            BlockKind::Heading { level } => {
                let level = (*level).clamp(1, 6);
                let _ = write!(self.out, r#"<h{level} id="{anchor}">{text}</h{level}>"#);
            }
            BlockKind::BulletedListItem | BlockKind::NumberedListItem => {
                let _ = write!(self.out, r#"<li id="{anchor}">{text}"#);
                self.children(&node.children);
                self.out.push_str("</li>");
                return;
            }
            BlockKind::ToDo { checked } => {
                let checked = if *checked { " checked" } else { "" };
                let _ = write!(
                    self.out,
                    r#"<div id="{anchor}" class="to-do"><input type="checkbox" disabled{checked}> {text}</div>"#
                );
            }
            BlockKind::Toggle => {
                let _ = write!(self.out, r#"<details id="{anchor}"><summary>{text}</summary>"#);
                self.children(&node.children);
                self.out.push_str("</details>");
                return;
            }
            BlockKind::Quote => {
                let _ = write!(self.out, r#"<blockquote id="{anchor}">{text}</blockquote>"#);
            }
            BlockKind::Callout { icon } => {
                let _ = write!(
                    self.out,
                    r#"<div id="{anchor}" class="callout">{}<div>{text}</div></div>"#,
                    icon_html(icon.as_deref())
                );
            }
            BlockKind::Code { language } => {
                let code = escape_html(&plain_text(&node.title));
                let class = language
                    .as_deref()
                    .map(|lang| format!(r#" class="language-{}""#, escape_html(lang)))
                    .unwrap_or_default();
                let _ = write!(self.out, r#"<pre id="{anchor}"><code{class}>{code}</code></pre>"#);
            }
            BlockKind::Divider => {
                let _ = write!(self.out, r#"<hr id="{anchor}">"#);
            }
            BlockKind::Image { source } => {
                let _ = write!(
                    self.out,
                    r#"<figure id="{anchor}"><img src="{}" alt="">"#,
                    escape_html(source)
                );
                if !text.is_empty() {
                    let _ = write!(self.out, "<figcaption>{text}</figcaption>");
                }
                self.out.push_str("</figure>");
            }
            BlockKind::Bookmark { link } => {
                let link = escape_html(link);
                let label = if text.is_empty() { link.clone() } else { text };
                let _ = write!(
                    self.out,
                    r#"<div id="{anchor}" class="bookmark"><a href="{link}">{label}</a></div>"#
                );
            }
            BlockKind::ColumnList | BlockKind::Column => {
                let class = if node.kind == BlockKind::Column {
                    "column"
                } else {
                    "column-list"
                };
                let _ = write!(self.out, r#"<div id="{anchor}" class="{class}">"#);
                self.children(&node.children);
                self.out.push_str("</div>");
                return;
            }
            BlockKind::Unsupported => {
                tracing::debug!(block = %node.id, "Skipping unsupported block");
            }
        }

        if !node.children.is_empty() {
            self.out.push_str(r#"<div class="indent">"#);
            self.children(&node.children);
            self.out.push_str("</div>");
        }
    }
}
