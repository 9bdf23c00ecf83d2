use crate::error::Result;
use crate::model::{Margins, Position};
use crate::writer::paragraph::{
    LINE_HEIGHT, TEXT_WIDTH, add_lineseg, add_paragraph_element, add_run, add_sub_list, add_text,
};
use crate::writer::shapes::{flag, matrix, write_margins, write_position, write_size};
use crate::xml::{HP_NS, NodeId, XmlTree};

use super::deep_paragraph_text;

const TABLE_IN_MARGIN: i32 = 141;

/// In-place editor for one section part.
///
/// Paragraph indices count the top-level `hp:p` children of the section
/// root only. Every index-taking operation returns `false` (or `None`)
/// when the index is out of range and leaves the tree untouched.
///
/// Elements built here carry id 0 and style references supplied by the
/// caller. Nothing is deduplicated against the style catalog.
#[derive(Debug, Clone)]
pub struct Editor {
    tree: XmlTree,
    modified: bool,
}

impl Editor {
    pub fn parse(section_xml: &str) -> Result<Self> {
        Ok(Self {
            tree: XmlTree::parse(section_xml)?,
            modified: false,
        })
    }

    pub fn from_bytes(section_xml: &[u8]) -> Result<Self> {
        Ok(Self {
            tree: XmlTree::parse_bytes(section_xml)?,
            modified: false,
        })
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn to_xml(&self) -> String {
        self.tree.to_xml()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_xml().into_bytes()
    }

    fn paragraphs(&self) -> Vec<NodeId> {
        self.tree.child_elements(self.tree.root(), HP_NS, "p")
    }

    fn paragraph(&self, index: usize) -> Option<NodeId> {
        self.paragraphs().get(index).copied()
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().len()
    }

    /// Text of a top-level paragraph, including text of tables it holds.
    pub fn paragraph_text(&self, index: usize) -> Option<String> {
        self.paragraph(index)
            .map(|p| deep_paragraph_text(&self.tree, p))
    }

    /// Position among the root's children at which a new top-level
    /// paragraph lands before paragraph `index`; `None` past the end.
    fn slot_before(&self, index: usize) -> Option<usize> {
        self.paragraph(index)
            .and_then(|p| self.tree.index_in_parent(p))
    }

    fn place(&mut self, node: NodeId, slot: Option<usize>) {
        let root = self.tree.root();
        match slot {
            Some(slot) => self.tree.insert(root, slot, node),
            None => self.tree.append(root, node),
        }
        self.modified = true;
    }

    fn text_paragraph(&mut self, text: &str, para_pr: u32, char_pr: u32) -> NodeId {
        let root = self.tree.root();
        let p = add_paragraph_element(&mut self.tree, root, 0, para_pr, 0, false);
        self.tree.detach(p);
        let run = add_run(&mut self.tree, p, char_pr);
        if !text.is_empty() {
            add_text(&mut self.tree, run, text);
        }
        add_lineseg(&mut self.tree, p, LINE_HEIGHT, 0);
        p
    }

    pub fn insert_paragraph_after(&mut self, after: usize, text: &str, para_pr: u32, char_pr: u32) -> bool {
        let Some(slot) = self.slot_before(after) else {
            return false;
        };
        let p = self.text_paragraph(text, para_pr, char_pr);
        self.place(p, Some(slot + 1));
        true
    }

    pub fn insert_paragraph_before(&mut self, before: usize, text: &str, para_pr: u32, char_pr: u32) -> bool {
        let Some(slot) = self.slot_before(before) else {
            return false;
        };
        let p = self.text_paragraph(text, para_pr, char_pr);
        self.place(p, Some(slot));
        true
    }

    pub fn append_paragraph(&mut self, text: &str, para_pr: u32, char_pr: u32) {
        let p = self.text_paragraph(text, para_pr, char_pr);
        self.place(p, None);
    }

    pub fn delete_paragraph(&mut self, index: usize) -> bool {
        let Some(p) = self.paragraph(index) else {
            return false;
        };
        self.tree.detach(p);
        self.modified = true;
        true
    }

    /// Deletes paragraphs `start..end`, clamped to the paragraph count.
    /// Returns how many were removed.
    pub fn delete_paragraphs_range(&mut self, start: usize, end: usize) -> usize {
        let paragraphs = self.paragraphs();
        let end = end.min(paragraphs.len());
        if start >= end {
            return 0;
        }
        for &p in &paragraphs[start..end] {
            self.tree.detach(p);
        }
        self.modified = true;
        end - start
    }

    /// Replaces `old` with `new` in every text node under an `hp:t`, in
    /// document order, stopping after `max` replacements when given.
    /// Matches spanning two text nodes are not found. Returns the number
    /// of replacements made.
    pub fn replace_text(&mut self, old: &str, new: &str, max: Option<usize>) -> usize {
        if old.is_empty() || max == Some(0) {
            return 0;
        }
        let root = self.tree.root();
        let mut replaced = 0;
        'outer: for t in self.tree.find_descendants(root, HP_NS, "t") {
            for node in self.tree.children(t).to_vec() {
                let Some(text) = self.tree.text_value(node) else {
                    continue;
                };
                let found = text.matches(old).count();
                if found == 0 {
                    continue;
                }
                let take = match max {
                    Some(max) => found.min(max - replaced),
                    None => found,
                };
                let updated = text.replacen(old, new, take);
                self.tree.set_text_value(node, updated);
                replaced += take;
                if max.is_some_and(|max| replaced >= max) {
                    break 'outer;
                }
            }
        }
        if replaced > 0 {
            self.modified = true;
        }
        replaced
    }

    /// Replaces every run of a paragraph with a single run holding `text`.
    pub fn set_paragraph_text(&mut self, index: usize, text: &str, char_pr: u32) -> bool {
        let Some(p) = self.paragraph(index) else {
            return false;
        };
        for run in self.tree.child_elements(p, HP_NS, "run") {
            self.tree.detach(run);
        }
        let run = add_run(&mut self.tree, p, char_pr);
        if !text.is_empty() {
            add_text(&mut self.tree, run, text);
        }
        if let Some(slot) = self
            .tree
            .find_child(p, HP_NS, "linesegarray")
            .and_then(|lsa| self.tree.index_in_parent(lsa))
        {
            self.tree.insert(p, slot, run);
        }
        self.modified = true;
        true
    }

    /// Copies paragraph `from` so the copy sits before paragraph `to`;
    /// `to == paragraph_count()` appends it.
    pub fn copy_paragraph(&mut self, from: usize, to: usize) -> bool {
        let count = self.paragraph_count();
        let Some(source) = self.paragraph(from) else {
            return false;
        };
        if to > count {
            return false;
        }
        let slot = self.slot_before(to);
        let copy = self.tree.deep_copy(source);
        self.place(copy, slot);
        true
    }

    /// Moves paragraph `from` to index `to`, counted after its removal.
    pub fn move_paragraph(&mut self, from: usize, to: usize) -> bool {
        let count = self.paragraph_count();
        let Some(source) = self.paragraph(from) else {
            return false;
        };
        if to > count {
            return false;
        }
        if from == to {
            return true;
        }
        self.tree.detach(source);
        let slot = self.slot_before(to);
        self.place(source, slot);
        true
    }

    fn set_paragraph_attr(&mut self, index: usize, name: &str, value: String) -> bool {
        let Some(p) = self.paragraph(index) else {
            return false;
        };
        self.tree.set_attr(p, name, value);
        self.modified = true;
        true
    }

    pub fn set_page_break(&mut self, index: usize, enable: bool) -> bool {
        self.set_paragraph_attr(index, "pageBreak", flag(enable).to_string())
    }

    pub fn set_column_break(&mut self, index: usize, enable: bool) -> bool {
        self.set_paragraph_attr(index, "columnBreak", flag(enable).to_string())
    }

    pub fn set_paragraph_style(&mut self, index: usize, para_pr: u32) -> bool {
        self.set_paragraph_attr(index, "paraPrIDRef", para_pr.to_string())
    }

    /// Points every run of the paragraph at `char_pr`.
    pub fn set_char_style(&mut self, index: usize, char_pr: u32) -> bool {
        let Some(p) = self.paragraph(index) else {
            return false;
        };
        for run in self.tree.child_elements(p, HP_NS, "run") {
            self.tree.set_attr(run, "charPrIDRef", char_pr.to_string());
        }
        self.modified = true;
        true
    }

    /// Inserts a `rows` x `cols` table after paragraph `after`. Cell text
    /// comes from `data[row][col]` where present. Without `col_widths` the
    /// text width is split evenly.
    pub fn insert_table_after(
        &mut self,
        after: usize,
        rows: usize,
        cols: usize,
        data: &[Vec<String>],
        col_widths: Option<&[i32]>,
        border_fill_id: u32,
    ) -> bool {
        if rows == 0 || cols == 0 || col_widths.is_some_and(|w| w.len() != cols) {
            return false;
        }
        let Some(slot) = self.slot_before(after) else {
            return false;
        };
        let widths = match col_widths {
            Some(widths) => widths.to_vec(),
            None => vec![TEXT_WIDTH / cols as i32; cols],
        };
        let p = self.table_paragraph(rows, &widths, data, border_fill_id);
        self.place(p, Some(slot + 1));
        true
    }

    fn table_paragraph(&mut self, rows: usize, widths: &[i32], data: &[Vec<String>], border_fill_id: u32) -> NodeId {
        let total_width: i32 = widths.iter().sum();
        let total_height = LINE_HEIGHT * rows as i32;
        let border_fill = border_fill_id.to_string();

        let tree = &mut self.tree;
        let root = tree.root();
        let p = add_paragraph_element(tree, root, 0, 0, 0, false);
        tree.detach(p);
        let run = add_run(tree, p, 0);
        let tbl = tree.add_element(
            run,
            "hp:tbl",
            &[
                ("id", "0"),
                ("zOrder", "0"),
                ("numberingType", "TABLE"),
                ("textWrap", "TOP_AND_BOTTOM"),
                ("textFlow", "BOTH_SIDES"),
                ("lock", "0"),
                ("dropcapstyle", "None"),
                ("pageBreak", "CELL"),
                ("repeatHeader", "0"),
                ("rowCnt", &rows.to_string()),
                ("colCnt", &widths.len().to_string()),
                ("cellSpacing", "0"),
                ("borderFillIDRef", &border_fill),
                ("noAdjust", "0"),
            ],
        );
        write_size(tree, tbl, total_width, total_height);
        write_position(tree, tbl, &Position::default());
        write_margins(tree, tbl, "hp:outMargin", Margins::default());
        write_margins(tree, tbl, "hp:inMargin", Margins::uniform(TABLE_IN_MARGIN));

        for row in 0..rows {
            let tr = tree.add_element(tbl, "hp:tr", &[]);
            for (col, width) in widths.iter().enumerate() {
                let text = data.get(row).and_then(|r| r.get(col)).map_or("", String::as_str);
                let tc = tree.add_element(
                    tr,
                    "hp:tc",
                    &[
                        ("name", ""),
                        ("header", "0"),
                        ("hasMargin", "0"),
                        ("protect", "0"),
                        ("editable", "0"),
                        ("dirty", "0"),
                        ("borderFillIDRef", &border_fill),
                    ],
                );
                let sub_list = add_sub_list(tree, tc, "CENTER");
                let cell_p = add_paragraph_element(tree, sub_list, 0, 0, 0, false);
                let cell_run = add_run(tree, cell_p, 0);
                if !text.is_empty() {
                    add_text(tree, cell_run, text);
                }
                add_lineseg(tree, cell_p, LINE_HEIGHT, 0);

                tree.add_element(
                    tc,
                    "hp:cellAddr",
                    &[("colAddr", &col.to_string()), ("rowAddr", &row.to_string())],
                );
                tree.add_element(tc, "hp:cellSpan", &[("colSpan", "1"), ("rowSpan", "1")]);
                tree.add_element(
                    tc,
                    "hp:cellSz",
                    &[("width", &width.to_string()), ("height", &LINE_HEIGHT.to_string())],
                );
                write_margins(tree, tc, "hp:cellMargin", Margins::uniform(TABLE_IN_MARGIN));
            }
        }
        add_lineseg(tree, p, total_height, total_width);
        p
    }

    /// Inserts a picture of `binary_id` after paragraph `after`. The binary
    /// item itself must be added to the package separately.
    pub fn insert_image_after(&mut self, after: usize, binary_id: &str, width: i32, height: i32) -> bool {
        let Some(slot) = self.slot_before(after) else {
            return false;
        };
        let p = self.picture_paragraph(binary_id, width, height);
        self.place(p, Some(slot + 1));
        true
    }

    fn picture_paragraph(&mut self, binary_id: &str, width: i32, height: i32) -> NodeId {
        let (w, h) = (width.to_string(), height.to_string());
        let tree = &mut self.tree;
        let root = tree.root();
        let p = add_paragraph_element(tree, root, 0, 0, 0, false);
        tree.detach(p);
        let run = add_run(tree, p, 0);
        let pic = tree.add_element(
            run,
            "hp:pic",
            &[
                ("id", "0"),
                ("zOrder", "0"),
                ("numberingType", "PICTURE"),
                ("textWrap", "TOP_AND_BOTTOM"),
                ("textFlow", "BOTH_SIDES"),
                ("lock", "0"),
                ("dropcapstyle", "None"),
                ("href", ""),
                ("groupLevel", "0"),
                ("instid", "0"),
                ("reverse", "0"),
            ],
        );
        tree.add_element(pic, "hp:offset", &[("x", "0"), ("y", "0")]);
        tree.add_element(pic, "hp:orgSz", &[("width", &w), ("height", &h)]);
        tree.add_element(pic, "hp:curSz", &[("width", &w), ("height", &h)]);
        tree.add_element(pic, "hp:flip", &[("horizontal", "0"), ("vertical", "0")]);
        tree.add_element(
            pic,
            "hp:rotationInfo",
            &[
                ("angle", "0"),
                ("centerX", &(width / 2).to_string()),
                ("centerY", &(height / 2).to_string()),
                ("rotateimage", "1"),
            ],
        );
        let rendering = tree.add_element(pic, "hp:renderingInfo", &[]);
        matrix(tree, rendering, "hc:transMatrix", "1", "1");
        matrix(tree, rendering, "hc:scaMatrix", "1.000000", "1.000000");
        matrix(tree, rendering, "hc:rotMatrix", "1.000000", "1.000000");
        tree.add_element(
            pic,
            "hc:img",
            &[
                ("binaryItemIDRef", binary_id),
                ("effect", "REAL_PIC"),
                ("alpha", "0"),
                ("bright", "0"),
                ("contrast", "0"),
            ],
        );
        let rect = tree.add_element(pic, "hp:imgRect", &[]);
        for (name, x, y) in [
            ("hc:pt0", "0", "0"),
            ("hc:pt1", w.as_str(), "0"),
            ("hc:pt2", w.as_str(), h.as_str()),
            ("hc:pt3", "0", h.as_str()),
        ] {
            tree.add_element(rect, name, &[("x", x), ("y", y)]);
        }
        write_margins(
            tree,
            pic,
            "hp:imgClip",
            Margins {
                left: 0,
                right: width,
                top: 0,
                bottom: height,
            },
        );
        write_margins(tree, pic, "hp:inMargin", Margins::default());
        tree.add_element(pic, "hp:imgDim", &[("dimwidth", &w), ("dimheight", &h)]);
        tree.add_element(pic, "hp:effects", &[]);
        write_size(tree, pic, width, height);
        write_position(tree, pic, &Position::default());
        write_margins(tree, pic, "hp:outMargin", Margins::default());
        tree.add_element(pic, "hp:shapeComment", &[]);
        add_lineseg(tree, p, height, width);
        p
    }
}
