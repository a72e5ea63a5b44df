use ego_tree::iter::Edge;
use ego_tree::NodeId;
use scraper::node::Node;
use scraper::ElementRef;

const SKIPPED: &[&str] = &["script", "style", "noscript", "template", "svg"];

const BLOCKS: &[&str] = &[
    "p", "div", "section", "article", "header", "footer", "li", "ul", "ol", "h1", "h2", "h3",
    "h4", "h5", "h6", "blockquote", "tr", "table",
];

/// Rendered-style text of an element: block elements and `<br>` start new
/// lines, runs of whitespace collapse to one space, scripts are skipped.
pub fn visible_text(element: ElementRef) -> String {
    let mut lines = LineBuffer::default();
    let mut skipped: Option<NodeId> = None;

    for edge in element.traverse() {
        match edge {
            Edge::Open(node) if skipped.is_none() => match node.value() {
                Node::Text(text) => lines.push_text(text),
                Node::Element(el) if SKIPPED.contains(&el.name()) => skipped = Some(node.id()),
                Node::Element(el) if el.name() == "br" || BLOCKS.contains(&el.name()) => {
                    lines.break_line()
                }
                _ => {}
            },
            Edge::Open(_) => {}
            Edge::Close(node) if skipped == Some(node.id()) => skipped = None,
            Edge::Close(node) if skipped.is_none() => {
                if let Node::Element(el) = node.value() {
                    if BLOCKS.contains(&el.name()) {
                        lines.break_line();
                    }
                }
            }
            Edge::Close(_) => {}
        }
    }
    lines.finish()
}

/// Completed non-empty lines plus the one being filled.
#[derive(Default)]
struct LineBuffer {
    lines: Vec<String>,
    current: String,
    space_pending: bool,
}

impl LineBuffer {
    fn push_text(&mut self, text: &str) {
        if text.starts_with(char::is_whitespace) {
            self.space_pending = true;
        }
        for word in text.split_whitespace() {
            if self.space_pending && !self.current.is_empty() {
                self.current.push(' ');
            }
            self.current.push_str(word);
            self.space_pending = true;
        }
        self.space_pending = text.ends_with(char::is_whitespace);
    }

    fn break_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
        self.space_pending = false;
    }

    fn finish(mut self) -> String {
        self.break_line();
        self.lines.join("\n")
    }
}
