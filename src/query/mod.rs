//! Search and in-place editing of a single section part, working on the
//! XML directly instead of going through the IR.

mod editor;
mod searcher;

pub use editor::Editor;
pub use searcher::{BreakKind, ImageInfo, PageBreakInfo, ParagraphInfo, SearchResult, Searcher, TableInfo};

use crate::xml::{HP_NS, NodeId, XmlTree};

/// Text of every `hp:t` below `node`, nested paragraphs included.
pub(crate) fn deep_paragraph_text(tree: &XmlTree, node: NodeId) -> String {
    tree.find_descendants(node, HP_NS, "t")
        .into_iter()
        .map(|t| tree.deep_text(t))
        .collect()
}

/// Text of the `hp:t` elements owned by paragraph `p`, skipping those that
/// belong to paragraphs nested in its tables, notes or text boxes.
pub(crate) fn own_paragraph_text(tree: &XmlTree, p: NodeId) -> String {
    tree.find_descendants(p, HP_NS, "t")
        .into_iter()
        .filter(|&t| nearest_paragraph(tree, t) == Some(p))
        .map(|t| tree.deep_text(t))
        .collect()
}

fn nearest_paragraph(tree: &XmlTree, node: NodeId) -> Option<NodeId> {
    let mut current = tree.parent(node);
    while let Some(id) = current {
        if tree.is(id, HP_NS, "p") {
            return Some(id);
        }
        current = tree.parent(id);
    }
    None
}

/// The first `max` characters of `text`, with `...` appended when cut.
pub(crate) fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
