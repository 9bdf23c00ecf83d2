use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::model::{Margins, Paragraph, Table, TableCell, VertAlign};
use crate::xml::NodeId;

use super::WriteContext;
use super::paragraph::{add_sub_list, synthesize_paragraph};
use super::shapes::{write_margins, write_position, write_size};

const DEFAULT_OUT_MARGIN: i32 = 283;
const DEFAULT_IN_MARGIN: i32 = 141;
const FALLBACK_CELL_WIDTH: i32 = 10000;
const FALLBACK_CELL_HEIGHT: i32 = 1000;

fn saturating_total(sizes: &[i32]) -> i32 {
    sizes.iter().fold(0, |acc, &size| acc.saturating_add(size))
}

/// `count` fallback-sized cells laid end to end, clamped to `i32::MAX`.
fn fallback_extent(count: u32, size: i32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX).saturating_mul(size)
}

/// Sum of `sizes[start..start + span]`, if every entry is there.
fn span_sum(sizes: &[i32], start: u32, span: u32) -> Option<i32> {
    let start = start as usize;
    let end = start.saturating_add(span.max(1) as usize);
    sizes.get(start..end).map(saturating_total)
}

pub(crate) fn effective_cell_width(table: &Table, cell: &TableCell) -> i32 {
    cell.width
        .or_else(|| span_sum(&table.col_widths, cell.col, cell.col_span))
        .unwrap_or(FALLBACK_CELL_WIDTH)
}

pub(crate) fn effective_cell_height(table: &Table, cell: &TableCell) -> i32 {
    cell.height
        .or_else(|| span_sum(&table.row_heights, cell.row, cell.row_span))
        .unwrap_or(FALLBACK_CELL_HEIGHT)
}

fn table_width(table: &Table) -> i32 {
    table.width.unwrap_or_else(|| {
        if table.col_widths.is_empty() {
            fallback_extent(table.col_cnt, FALLBACK_CELL_WIDTH)
        } else {
            saturating_total(&table.col_widths)
        }
    })
}

fn table_height(table: &Table) -> i32 {
    table.height.unwrap_or_else(|| {
        if table.row_heights.is_empty() {
            fallback_extent(table.row_cnt, FALLBACK_CELL_HEIGHT)
        } else {
            saturating_total(&table.row_heights)
        }
    })
}

pub(super) fn write_table(cx: &mut WriteContext, run: NodeId, table: &Table) -> Result<NodeId> {
    if let Some(raw) = &table.raw {
        return Ok(cx.tree.add_raw(run, raw));
    }
    table
        .validate()
        .map_err(|msg| Error::format(format!("table layout: {msg}")))?;

    let id = cx.ids.next_table();
    let tree = &mut cx.tree;
    let tbl = tree.add_element(
        run,
        "hp:tbl",
        &[
            ("id", &id.to_string()),
            ("zOrder", "0"),
            ("numberingType", "TABLE"),
            ("textWrap", table.text_wrap.as_hwpx()),
            ("textFlow", "BOTH_SIDES"),
            ("lock", "0"),
            ("dropcapstyle", "None"),
            ("pageBreak", "CELL"),
            ("repeatHeader", if table.repeat_header { "1" } else { "0" }),
            ("rowCnt", &table.row_cnt.to_string()),
            ("colCnt", &table.col_cnt.to_string()),
            ("cellSpacing", &table.cell_spacing.to_string()),
            ("borderFillIDRef", &table.border_fill_id.to_string()),
            ("noAdjust", "0"),
        ],
    );
    write_size(tree, tbl, table_width(table), table_height(table));
    write_position(tree, tbl, &table.position);
    write_margins(
        tree,
        tbl,
        "hp:outMargin",
        table.out_margin.unwrap_or(Margins::uniform(DEFAULT_OUT_MARGIN)),
    );
    write_margins(
        tree,
        tbl,
        "hp:inMargin",
        table.in_margin.unwrap_or(Margins::uniform(DEFAULT_IN_MARGIN)),
    );

    let mut rows: BTreeMap<u32, Vec<&TableCell>> = BTreeMap::new();
    for cell in &table.cells {
        rows.entry(cell.row).or_default().push(cell);
    }
    for cells in rows.values_mut() {
        cells.sort_by_key(|c| c.col);
        let tr = cx.tree.add_element(tbl, "hp:tr", &[]);
        for cell in cells.iter() {
            write_cell(cx, tr, table, cell)?;
        }
    }
    Ok(tbl)
}

fn write_cell(cx: &mut WriteContext, tr: NodeId, table: &Table, cell: &TableCell) -> Result<()> {
    if let Some(raw) = &cell.raw {
        cx.tree.add_raw(tr, raw);
        return Ok(());
    }
    let tc = cx.tree.add_element(
        tr,
        "hp:tc",
        &[
            ("name", ""),
            ("header", if table.repeat_header && cell.row == 0 { "1" } else { "0" }),
            ("hasMargin", if cell.margin.is_some() { "1" } else { "0" }),
            ("protect", if cell.protect { "1" } else { "0" }),
            ("editable", "0"),
            ("dirty", "0"),
            ("borderFillIDRef", &cell.border_fill_id.to_string()),
        ],
    );
    let vert_align = cell.vert_align.unwrap_or(VertAlign::Center).as_hwpx();
    let sub_list = add_sub_list(&mut cx.tree, tc, vert_align);
    if cell.blocks.is_empty() {
        synthesize_paragraph(cx, sub_list, &Paragraph::default(), false)?;
    }
    for block in &cell.blocks {
        cx.write_block(sub_list, block, false)?;
    }

    let tree = &mut cx.tree;
    tree.add_element(
        tc,
        "hp:cellAddr",
        &[("colAddr", &cell.col.to_string()), ("rowAddr", &cell.row.to_string())],
    );
    tree.add_element(
        tc,
        "hp:cellSpan",
        &[
            ("colSpan", &cell.col_span.max(1).to_string()),
            ("rowSpan", &cell.row_span.max(1).to_string()),
        ],
    );
    tree.add_element(
        tc,
        "hp:cellSz",
        &[
            ("width", &effective_cell_width(table, cell).to_string()),
            ("height", &effective_cell_height(table, cell).to_string()),
        ],
    );
    write_margins(
        tree,
        tc,
        "hp:cellMargin",
        cell.margin.unwrap_or(Margins::uniform(DEFAULT_IN_MARGIN)),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BinaryItems;

    #[test]
    fn spanned_cell_sums_column_widths() {
        let table = Table {
            row_cnt: 1,
            col_cnt: 3,
            col_widths: vec![1000, 2000, 3000],
            ..Table::default()
        };
        let cell = TableCell {
            col_span: 2,
            ..TableCell::new(0, 1)
        };
        assert_eq!(effective_cell_width(&table, &cell), 5000);
        assert_eq!(effective_cell_height(&table, &cell), FALLBACK_CELL_HEIGHT);

        let explicit = TableCell {
            width: Some(777),
            ..cell.clone()
        };
        assert_eq!(effective_cell_width(&table, &explicit), 777);

        let past_end = TableCell {
            col_span: 3,
            ..cell
        };
        assert_eq!(effective_cell_width(&table, &past_end), FALLBACK_CELL_WIDTH);
    }

    #[test]
    fn table_extent_saturates_for_huge_grids() {
        let wide = Table {
            row_cnt: u32::MAX,
            col_cnt: 300_000,
            ..Table::default()
        };
        assert_eq!(table_width(&wide), i32::MAX);
        assert_eq!(table_height(&wide), i32::MAX);

        let measured = Table {
            col_widths: vec![i32::MAX, 10],
            ..Table::default()
        };
        assert_eq!(table_width(&measured), i32::MAX);
        let cell = TableCell {
            col_span: u32::MAX,
            ..TableCell::new(0, 0)
        };
        assert_eq!(effective_cell_width(&measured, &cell), FALLBACK_CELL_WIDTH);
        assert_eq!(span_sum(&[i32::MAX, 10], 0, 2), Some(i32::MAX));
    }

    #[test]
    fn writes_rows_in_order_with_defaults() {
        let binaries = BinaryItems::new();
        let mut cx = WriteContext::new(None, &binaries).unwrap();
        let root = cx.tree.root();
        let table = Table {
            row_cnt: 2,
            col_cnt: 2,
            cells: vec![
                TableCell::with_text(1, 1, "d"),
                TableCell::with_text(0, 1, "b"),
                TableCell::with_text(1, 0, "c"),
                TableCell::with_text(0, 0, "a"),
            ],
            ..Table::default()
        };
        let tbl = write_table(&mut cx, root, &table).unwrap();
        assert_eq!(cx.tree.deep_text(tbl), "abcd");
        let xml = cx.tree.node_to_string(tbl);
        assert!(xml.contains(r#"<hp:outMargin left="283" right="283" top="283" bottom="283"/>"#));
        assert!(xml.contains(r#"vertAlign="CENTER""#));
        assert!(xml.contains(r#"<hp:sz width="20000" widthRelTo="ABSOLUTE" height="2000""#));
    }

    #[test]
    fn rejects_overlapping_cells() {
        let binaries = BinaryItems::new();
        let mut cx = WriteContext::new(None, &binaries).unwrap();
        let root = cx.tree.root();
        let table = Table {
            row_cnt: 1,
            col_cnt: 1,
            cells: vec![TableCell::new(0, 0), TableCell::new(0, 0)],
            ..Table::default()
        };
        assert!(matches!(write_table(&mut cx, root, &table), Err(Error::Format(_))));
    }
}
