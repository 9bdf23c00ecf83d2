//! Assembles an IR document from content that an extraction backend has
//! already laid out: pages of positioned text blocks and tables.

use crate::model::{Block, Document, Paragraph, Table, TableCell};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractedContent {
    pub pages: Vec<ExtractedPage>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractedPage {
    pub page_number: u32,
    pub width: f32,
    pub height: f32,
    /// In reading order.
    pub text_blocks: Vec<TextBlock>,
    pub tables: Vec<ExtractedTable>,
}

/// Position and size are in page coordinates of the source and are not
/// used for layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: 1.0,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractedTable {
    pub rows: u32,
    pub cols: u32,
    pub cells: Vec<ExtractedCell>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedCell {
    pub text: String,
    pub row: u32,
    pub col: u32,
    pub row_span: u32,
    pub col_span: u32,
}

impl ExtractedCell {
    pub fn new(row: u32, col: u32, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            row,
            col,
            row_span: 1,
            col_span: 1,
        }
    }
}

fn table_block(table: &ExtractedTable) -> Block {
    let cells = table
        .cells
        .iter()
        .map(|cell| TableCell {
            row_span: cell.row_span.max(1),
            col_span: cell.col_span.max(1),
            ..TableCell::with_text(cell.row, cell.col, cell.text.as_str())
        })
        .collect();
    Table {
        row_cnt: table.rows,
        col_cnt: table.cols,
        cells,
        ..Table::default()
    }
    .into()
}

/// One paragraph per text block followed by one table per extracted table,
/// page by page. The first block of every page after the first carries a
/// page break; an empty page passes its break on to the next block.
pub fn build_document(content: &ExtractedContent) -> Document {
    let mut blocks: Vec<Block> = Vec::new();
    let mut pending_break = false;
    for (i, page) in content.pages.iter().enumerate() {
        if i > 0 && !blocks.is_empty() {
            pending_break = true;
        }
        let page_blocks = page
            .text_blocks
            .iter()
            .map(|tb| Block::from(Paragraph::from_text(tb.text.as_str())))
            .chain(page.tables.iter().map(table_block));
        for mut block in page_blocks {
            if pending_break {
                block.page_break = true;
                pending_break = false;
            }
            blocks.push(block);
        }
    }
    log::debug!(
        "built {} blocks from {} extracted pages",
        blocks.len(),
        content.pages.len()
    );
    Document { blocks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockContent;

    fn page(texts: &[&str], tables: Vec<ExtractedTable>) -> ExtractedPage {
        ExtractedPage {
            text_blocks: texts.iter().map(|t| TextBlock::new(*t)).collect(),
            tables,
            ..Default::default()
        }
    }

    #[test]
    fn breaks_go_on_first_block_of_later_pages() {
        let content = ExtractedContent {
            pages: vec![
                page(&["one", "two"], vec![]),
                page(&[], vec![]),
                page(&["three\nlines"], vec![]),
            ],
        };
        let doc = build_document(&content);
        let breaks: Vec<bool> = doc.blocks.iter().map(|b| b.page_break).collect();
        assert_eq!(breaks, [false, false, true]);
        match &doc.blocks[2].content {
            BlockContent::Paragraph(p) => assert_eq!(p.plain_text(), "three\nlines"),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn tables_follow_text_with_one_paragraph_per_cell() {
        let table = ExtractedTable {
            rows: 1,
            cols: 2,
            cells: vec![
                ExtractedCell {
                    col_span: 2,
                    ..ExtractedCell::new(0, 0, "wide")
                },
            ],
        };
        let doc = build_document(&ExtractedContent {
            pages: vec![page(&["intro"], vec![table])],
        });
        assert_eq!(doc.blocks.len(), 2);
        let BlockContent::Table(t) = &doc.blocks[1].content else {
            panic!("expected table");
        };
        assert_eq!((t.row_cnt, t.col_cnt), (1, 2));
        assert_eq!(t.cells[0].col_span, 2);
        assert_eq!(t.cells[0].blocks.len(), 1);
        assert!(t.validate().is_ok());
    }
}
