use crate::model::{
    HorzAlign, Margins, Position, RelativeTo, Table, TableCell, TextWrap, VertAlign,
};

use super::{ReadContext, flag_attr, hp, hp_children, int_attr, raw_fragment, read_block, uint_attr};

pub(super) fn read_margins(node: Option<roxmltree::Node>) -> Option<Margins> {
    let node = node?;
    Some(Margins {
        left: int_attr(node, "left").unwrap_or(0),
        right: int_attr(node, "right").unwrap_or(0),
        top: int_attr(node, "top").unwrap_or(0),
        bottom: int_attr(node, "bottom").unwrap_or(0),
    })
}

pub(super) fn read_position(node: Option<roxmltree::Node>, default: Position) -> Position {
    let Some(pos) = node else {
        return default;
    };
    Position {
        treat_as_char: pos
            .attribute("treatAsChar")
            .map_or(default.treat_as_char, |v| v == "1"),
        vert_rel_to: pos
            .attribute("vertRelTo")
            .map_or(default.vert_rel_to, RelativeTo::from_hwpx),
        horz_rel_to: pos
            .attribute("horzRelTo")
            .map_or(default.horz_rel_to, RelativeTo::from_hwpx),
        vert_align: pos
            .attribute("vertAlign")
            .map_or(default.vert_align, VertAlign::from_hwpx),
        horz_align: pos
            .attribute("horzAlign")
            .map_or(default.horz_align, HorzAlign::from_hwpx),
        vert_offset: int_attr(pos, "vertOffset").unwrap_or(0),
        horz_offset: int_attr(pos, "horzOffset").unwrap_or(0),
        flow_with_text: pos
            .attribute("flowWithText")
            .map_or(default.flow_with_text, |v| v == "1"),
        allow_overlap: flag_attr(pos, "allowOverlap"),
    }
}

fn read_cell(ctx: &ReadContext, tc: roxmltree::Node) -> TableCell {
    let mut cell = TableCell::new(0, 0);
    if let Some(addr) = hp(tc, "cellAddr") {
        cell.row = uint_attr(addr, "rowAddr").unwrap_or(0);
        cell.col = uint_attr(addr, "colAddr").unwrap_or(0);
    }
    if let Some(span) = hp(tc, "cellSpan") {
        cell.row_span = uint_attr(span, "rowSpan").unwrap_or(1).max(1);
        cell.col_span = uint_attr(span, "colSpan").unwrap_or(1).max(1);
    }
    if let Some(size) = hp(tc, "cellSz") {
        cell.width = int_attr(size, "width");
        cell.height = int_attr(size, "height");
    }
    cell.margin = read_margins(hp(tc, "cellMargin"));
    cell.border_fill_id = uint_attr(tc, "borderFillIDRef").unwrap_or(5);
    cell.protect = flag_attr(tc, "protect");

    if let Some(sub_list) = hp(tc, "subList") {
        cell.vert_align = sub_list.attribute("vertAlign").map(VertAlign::from_hwpx);
        cell.blocks = sub_list
            .children()
            .filter(|n| n.is_element())
            .filter_map(|n| read_block(ctx, n))
            .collect();
    }
    cell.raw = Some(raw_fragment(tc));
    cell
}

/// Column widths and row heights recovered from unmerged cells. Left empty
/// unless every column (row) has at least one single-span cell.
fn derive_grid(cells: &[TableCell], col_cnt: u32, row_cnt: u32) -> (Vec<i32>, Vec<i32>) {
    let col_widths: Option<Vec<i32>> = (0..col_cnt)
        .map(|c| {
            cells
                .iter()
                .find(|cell| cell.col == c && cell.col_span == 1)
                .and_then(|cell| cell.width)
        })
        .collect();
    let row_heights: Option<Vec<i32>> = (0..row_cnt)
        .map(|r| {
            cells
                .iter()
                .find(|cell| cell.row == r && cell.row_span == 1)
                .and_then(|cell| cell.height)
        })
        .collect();
    (col_widths.unwrap_or_default(), row_heights.unwrap_or_default())
}

pub(super) fn read_table(ctx: &ReadContext, tbl: roxmltree::Node) -> Table {
    let cells: Vec<TableCell> = hp_children(tbl, "tr")
        .flat_map(|tr| hp_children(tr, "tc"))
        .map(|tc| read_cell(ctx, tc))
        .collect();

    let row_cnt = uint_attr(tbl, "rowCnt").unwrap_or_else(|| {
        cells.iter().map(|c| c.row + c.row_span).max().unwrap_or(0)
    });
    let col_cnt = uint_attr(tbl, "colCnt").unwrap_or_else(|| {
        cells.iter().map(|c| c.col + c.col_span).max().unwrap_or(0)
    });
    let (col_widths, row_heights) = derive_grid(&cells, col_cnt, row_cnt);
    let size = hp(tbl, "sz");

    Table {
        row_cnt,
        col_cnt,
        cells,
        width: size.and_then(|s| int_attr(s, "width")),
        height: size.and_then(|s| int_attr(s, "height")),
        col_widths,
        row_heights,
        position: read_position(hp(tbl, "pos"), Position::default()),
        text_wrap: tbl
            .attribute("textWrap")
            .map(TextWrap::from_hwpx)
            .unwrap_or_default(),
        out_margin: read_margins(hp(tbl, "outMargin")),
        in_margin: read_margins(hp(tbl, "inMargin")),
        cell_spacing: int_attr(tbl, "cellSpacing").unwrap_or(0),
        border_fill_id: uint_attr(tbl, "borderFillIDRef").unwrap_or(5),
        repeat_header: flag_attr(tbl, "repeatHeader"),
        raw: Some(raw_fragment(tbl)),
    }
}
