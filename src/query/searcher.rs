use regex::{Regex, RegexBuilder};

use crate::error::Result;
use crate::xml::{HC_NS, HP_NS, NodeId, XmlTree};

use super::{own_paragraph_text, preview};

const TEXT_PREVIEW_CHARS: usize = 100;
const TABLE_PREVIEW_CHARS: usize = 200;
const CONTEXT_CHARS: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakKind {
    Page,
    Column,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageBreakInfo {
    pub paragraph_index: usize,
    pub paragraph_id: String,
    pub kind: BreakKind,
    pub text_preview: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParagraphInfo {
    pub index: usize,
    pub paragraph_id: String,
    pub text: String,
    pub char_pr_ids: Vec<u32>,
    pub para_pr_id: u32,
    pub has_table: bool,
    pub has_image: bool,
    pub page_estimate: usize,
}

/// `match_start..match_end` is a byte range into `text`.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub paragraph_index: usize,
    pub paragraph_id: String,
    pub text: String,
    pub match_start: usize,
    pub match_end: usize,
    pub context: String,
    pub page_estimate: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableInfo {
    pub index: usize,
    pub rows: u32,
    pub cols: u32,
    pub text_preview: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageInfo {
    pub index: usize,
    pub binary_ref: String,
    pub width: i32,
    pub height: i32,
}

/// Read-only queries over one section part.
///
/// Paragraph indices here count every `hp:p` in document order, including
/// paragraphs nested in table cells and notes, so they differ from
/// [`Editor`](super::Editor) indices whenever the section holds tables.
///
/// Page numbers are estimates: the only page boundaries known are explicit
/// `pageBreak`/`columnBreak` flags, and a flagged paragraph is taken to
/// start the next page. Layout-driven page flow is not modelled.
#[derive(Debug, Clone)]
pub struct Searcher {
    tree: XmlTree,
    paragraphs: Vec<NodeId>,
    breaks: Vec<usize>,
}

impl Searcher {
    pub fn parse(section_xml: &str) -> Result<Self> {
        Ok(Self::new(XmlTree::parse(section_xml)?))
    }

    pub fn from_bytes(section_xml: &[u8]) -> Result<Self> {
        Ok(Self::new(XmlTree::parse_bytes(section_xml)?))
    }

    fn new(tree: XmlTree) -> Self {
        let paragraphs = tree.find_descendants(tree.root(), HP_NS, "p");
        let mut breaks = Vec::new();
        for (i, &p) in paragraphs.iter().enumerate() {
            if tree.attr(p, "pageBreak") == Some("1") {
                breaks.push(i);
            }
            if tree.attr(p, "columnBreak") == Some("1") {
                breaks.push(i);
            }
        }
        Self {
            tree,
            paragraphs,
            breaks,
        }
    }

    fn text(&self, p: NodeId) -> String {
        own_paragraph_text(&self.tree, p)
    }

    fn id_of(&self, p: NodeId) -> String {
        self.tree.attr(p, "id").unwrap_or_default().to_string()
    }

    /// 1-based page estimate for paragraph `index`.
    pub fn page_of(&self, index: usize) -> usize {
        1 + self.breaks.iter().filter(|&&b| b <= index).count()
    }

    pub fn find_page_breaks(&self) -> Vec<PageBreakInfo> {
        let mut out = Vec::new();
        for (i, &p) in self.paragraphs.iter().enumerate() {
            let page = self.tree.attr(p, "pageBreak") == Some("1");
            let column = self.tree.attr(p, "columnBreak") == Some("1");
            if !page && !column {
                continue;
            }
            out.push(PageBreakInfo {
                paragraph_index: i,
                paragraph_id: self.id_of(p),
                kind: if page { BreakKind::Page } else { BreakKind::Column },
                text_preview: preview(&self.text(p), TEXT_PREVIEW_CHARS),
            });
        }
        out
    }

    pub fn get_page_count_estimate(&self) -> usize {
        self.breaks.len() + 1
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn get_paragraph(&self, index: usize) -> Option<ParagraphInfo> {
        let &p = self.paragraphs.get(index)?;
        let char_pr_ids = self
            .tree
            .child_elements(p, HP_NS, "run")
            .into_iter()
            .filter_map(|run| self.tree.attr(run, "charPrIDRef")?.parse().ok())
            .collect();
        Some(ParagraphInfo {
            index,
            paragraph_id: self.id_of(p),
            text: self.text(p),
            char_pr_ids,
            para_pr_id: self
                .tree
                .attr(p, "paraPrIDRef")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            has_table: self.tree.find_descendant(p, HP_NS, "tbl").is_some(),
            has_image: self.tree.find_descendant(p, HP_NS, "pic").is_some(),
            page_estimate: self.page_of(index),
        })
    }

    /// Paragraphs `start..end`, clamped to the paragraph count.
    pub fn get_paragraphs_range(&self, start: usize, end: usize) -> Vec<ParagraphInfo> {
        (start..end.min(self.paragraphs.len()))
            .filter_map(|i| self.get_paragraph(i))
            .collect()
    }

    pub fn get_paragraphs_by_page(&self, page: usize) -> Vec<ParagraphInfo> {
        (0..self.paragraphs.len())
            .filter(|&i| self.page_of(i) == page)
            .filter_map(|i| self.get_paragraph(i))
            .collect()
    }

    /// Literal substring search, case-insensitive unless `case_sensitive`.
    pub fn search(&self, query: &str, case_sensitive: bool) -> Vec<SearchResult> {
        if query.is_empty() {
            return Vec::new();
        }
        match RegexBuilder::new(&regex::escape(query))
            .case_insensitive(!case_sensitive)
            .build()
        {
            Ok(re) => self.find_all(&re),
            Err(e) => {
                log::warn!("search pattern for {query:?} rejected: {e}");
                Vec::new()
            }
        }
    }

    pub fn search_regex(&self, pattern: &str) -> Result<Vec<SearchResult>> {
        let re = Regex::new(pattern)?;
        Ok(self.find_all(&re))
    }

    fn find_all(&self, re: &Regex) -> Vec<SearchResult> {
        let mut out = Vec::new();
        for (i, &p) in self.paragraphs.iter().enumerate() {
            let text = self.text(p);
            for m in re.find_iter(&text).filter(|m| !m.is_empty()) {
                out.push(SearchResult {
                    paragraph_index: i,
                    paragraph_id: self.id_of(p),
                    context: context_around(&text, m.start(), m.end()),
                    match_start: m.start(),
                    match_end: m.end(),
                    page_estimate: self.page_of(i),
                    text: text.clone(),
                });
            }
        }
        out
    }

    /// Every non-blank paragraph, one per line.
    pub fn get_all_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|&p| self.text(p))
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn get_text_by_page(&self, page: usize) -> String {
        self.get_paragraphs_by_page(page)
            .into_iter()
            .map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn get_tables_info(&self) -> Vec<TableInfo> {
        let tree = &self.tree;
        tree.find_descendants(tree.root(), HP_NS, "tbl")
            .into_iter()
            .enumerate()
            .map(|(index, tbl)| {
                let texts: Vec<String> = tree
                    .find_descendants(tbl, HP_NS, "t")
                    .into_iter()
                    .map(|t| tree.deep_text(t))
                    .filter(|t| !t.is_empty())
                    .collect();
                let joined = texts.join(" ");
                TableInfo {
                    index,
                    rows: uint(tree.attr(tbl, "rowCnt")),
                    cols: uint(tree.attr(tbl, "colCnt")),
                    text_preview: joined.chars().take(TABLE_PREVIEW_CHARS).collect(),
                }
            })
            .collect()
    }

    pub fn get_images_info(&self) -> Vec<ImageInfo> {
        let tree = &self.tree;
        tree.find_descendants(tree.root(), HP_NS, "pic")
            .into_iter()
            .enumerate()
            .map(|(index, pic)| {
                let binary_ref = tree
                    .find_descendant(pic, HC_NS, "img")
                    .and_then(|img| tree.attr(img, "binaryItemIDRef"))
                    .unwrap_or_default()
                    .to_string();
                let cur_sz = tree.find_child(pic, HP_NS, "curSz");
                let dim = |name: &str| -> i32 {
                    cur_sz
                        .and_then(|sz| tree.attr(sz, name))
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0)
                };
                ImageInfo {
                    index,
                    binary_ref,
                    width: dim("width"),
                    height: dim("height"),
                }
            })
            .collect()
    }
}

fn uint(value: Option<&str>) -> u32 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Up to `CONTEXT_CHARS` characters either side of a match, with `...`
/// marking each side that was cut.
fn context_around(text: &str, start: usize, end: usize) -> String {
    let before = &text[..start];
    let after = &text[end..];
    let from = before
        .char_indices()
        .rev()
        .nth(CONTEXT_CHARS - 1)
        .map_or(0, |(i, _)| i);
    let to = after
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map_or(text.len(), |(i, _)| end + i);

    let mut out = String::new();
    if from > 0 {
        out.push_str("...");
    }
    out.push_str(&text[from..to]);
    if to < text.len() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::HS_NS;

    fn paragraph(text: &str, page_break: bool) -> String {
        format!(
            r#"<hp:p id="1" paraPrIDRef="2" styleIDRef="0" pageBreak="{}" columnBreak="0" merged="0"><hp:run charPrIDRef="5"><hp:t>{text}</hp:t></hp:run></hp:p>"#,
            if page_break { "1" } else { "0" }
        )
    }

    fn searcher(body: &str) -> Searcher {
        Searcher::parse(&format!(
            r#"<hs:sec xmlns:hs="{HS_NS}" xmlns:hp="{HP_NS}" xmlns:hc="{HC_NS}">{body}</hs:sec>"#
        ))
        .unwrap()
    }

    #[test]
    fn page_estimates_follow_explicit_breaks() {
        let body: String = (0..8).map(|i| paragraph(&format!("p{i}"), i == 3 || i == 7)).collect();
        let s = searcher(&body);
        let pages: Vec<usize> = (0..8).map(|i| s.page_of(i)).collect();
        assert_eq!(pages, [1, 1, 1, 2, 2, 2, 2, 3]);
        assert_eq!(s.get_page_count_estimate(), 3);
        assert_eq!(s.get_text_by_page(2), "p3\np4\np5\np6");
        let breaks = s.find_page_breaks();
        assert_eq!(breaks.len(), 2);
        assert_eq!(breaks[0].paragraph_index, 3);
        assert_eq!(breaks[0].kind, BreakKind::Page);
    }

    #[test]
    fn paragraph_info() {
        let s = searcher(&paragraph("hello", false));
        let info = s.get_paragraph(0).unwrap();
        assert_eq!(info.text, "hello");
        assert_eq!(info.char_pr_ids, [5]);
        assert_eq!(info.para_pr_id, 2);
        assert!(!info.has_table);
        assert!(s.get_paragraph(1).is_none());
        assert_eq!(s.get_paragraphs_range(0, 10).len(), 1);
    }

    #[test]
    fn case_insensitive_search_reports_byte_offsets() {
        let s = searcher(&paragraph("한글 Foo and foo", false));
        let hits = s.search("foo", false);
        assert_eq!(hits.len(), 2);
        assert_eq!(&hits[0].text[hits[0].match_start..hits[0].match_end], "Foo");
        assert_eq!(s.search("foo", true).len(), 1);
        assert!(s.search("", false).is_empty());
    }

    #[test]
    fn regex_search_and_bad_pattern() {
        let s = searcher(&paragraph("order 123 and 4567", false));
        let hits = s.search_regex(r"\d+").unwrap();
        assert_eq!(hits.len(), 2);
        assert!(s.search_regex("(").is_err());
    }

    #[test]
    fn context_is_cut_on_characters() {
        let text = format!("{}X{}", "가".repeat(60), "나".repeat(60));
        let start = "가".len() * 60;
        let ctx = context_around(&text, start, start + 1);
        assert_eq!(ctx, format!("...{}X{}...", "가".repeat(50), "나".repeat(50)));
        assert_eq!(context_around("abc", 1, 2), "abc");
    }

    #[test]
    fn tables_and_images() {
        let body = format!(
            r#"<hp:p><hp:run><hp:tbl rowCnt="1" colCnt="2"><hp:tr><hp:tc><hp:subList><hp:p><hp:run><hp:t>a</hp:t></hp:run></hp:p></hp:subList></hp:tc><hp:tc><hp:subList><hp:p><hp:run><hp:t>b</hp:t></hp:run></hp:p></hp:subList></hp:tc></hp:tr></hp:tbl></hp:run></hp:p><hp:p><hp:run><hp:pic><hp:curSz width="300" height="200"/><hc:img binaryItemIDRef="image1"/></hp:pic></hp:run></hp:p>"#
        );
        let s = searcher(&body);
        assert_eq!(
            s.get_tables_info(),
            [TableInfo {
                index: 0,
                rows: 1,
                cols: 2,
                text_preview: "a b".into()
            }]
        );
        assert_eq!(
            s.get_images_info(),
            [ImageInfo {
                index: 0,
                binary_ref: "image1".into(),
                width: 300,
                height: 200
            }]
        );
        assert_eq!(s.get_all_text(), "a\nb");
        assert!(s.get_paragraph(0).unwrap().has_table);
    }
}
