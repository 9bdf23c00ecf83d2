use crate::error::Result;
use crate::hwpx;
use crate::model::{Block, BlockContent, HeaderFooter, Paragraph, Section};
use crate::xml::{HP_NS, NodeId, XmlTree};

use super::WriteContext;
use super::context::DEFAULT_CHAR_PR_ID;
use super::paragraph::{
    LINE_HEIGHT, TEXT_WIDTH, add_lineseg, add_paragraph_element, add_run, add_sub_list, add_text,
    synthesize_paragraph,
};

const SPACE_COLUMNS: &str = "1134";
const DEFAULT_COL_GAP: i32 = 1134;
const HEADER_LINE_WIDTH: i32 = 10000;
const PAGE_BORDER_OFFSET: &str = "1417";

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Writes a section: an anchor paragraph carrying `hp:secPr` and the
/// section-level controls, followed by `blocks`.
pub(super) fn write_section(
    cx: &mut WriteContext,
    parent: NodeId,
    section: &Section,
    blocks: &[Block],
    page_break: bool,
) -> Result<()> {
    let anchor = match blocks.first() {
        Some(first) => match &first.content {
            BlockContent::Paragraph(p) => Some((first, p)),
            _ => None,
        },
        None => None,
    };

    let anchor_has_sec_pr = match anchor.and_then(|(_, p)| p.raw.as_deref()) {
        Some(raw) => hwpx::fragment_has_sec_pr(raw)?,
        None => false,
    };

    let rest = match anchor {
        // A source anchor already holds its secPr and controls.
        Some(_) if anchor_has_sec_pr => blocks,
        Some((first, p)) => {
            let node = match &p.raw {
                Some(raw) => {
                    let node = cx.tree.import_fragment(raw)?;
                    cx.tree.append(parent, node);
                    node
                }
                None => synthesize_paragraph(cx, parent, p, page_break || first.page_break)?,
            };
            inject_controls(cx, node, section);
            &blocks[1..]
        }
        None => {
            let node = synthesize_paragraph(cx, parent, &Paragraph::default(), page_break)?;
            inject_controls(cx, node, section);
            blocks
        }
    };

    for block in rest {
        cx.write_block(parent, block, true)?;
    }
    Ok(())
}

fn inject_controls(cx: &mut WriteContext, p: NodeId, section: &Section) {
    let run = match cx.tree.find_child(p, HP_NS, "run") {
        Some(run) => run,
        None => {
            let run = cx
                .tree
                .create_element("hp:run", &[("charPrIDRef", &DEFAULT_CHAR_PR_ID.to_string())]);
            cx.tree.insert(p, 0, run);
            run
        }
    };

    let mut controls = Vec::new();
    controls.push(match &section.raw {
        Some(raw) => cx.tree.create_raw(raw),
        None => sec_pr(&mut cx.tree, section),
    });
    controls.push(col_pr(&mut cx.tree, section));
    if let Some(header) = &section.header {
        controls.push(header_footer(cx, "hp:header", header, "TOP"));
    }
    if let Some(footer) = &section.footer {
        controls.push(header_footer(cx, "hp:footer", footer, "BOTTOM"));
    }
    if let Some(page_number) = &section.page_number {
        let ctrl = cx.tree.create_element("hp:ctrl", &[]);
        cx.tree.add_element(
            ctrl,
            "hp:pageNum",
            &[
                ("pos", page_number.position.as_hwpx()),
                ("formatType", page_number.format.as_hwpx()),
                ("sideChar", &page_number.side_char),
            ],
        );
        controls.push(ctrl);
    }
    for (i, control) in controls.into_iter().enumerate() {
        cx.tree.insert(run, i, control);
    }
}

fn sec_pr(tree: &mut XmlTree, section: &Section) -> NodeId {
    let sec_pr = tree.create_element(
        "hp:secPr",
        &[
            ("id", ""),
            ("textDirection", "HORIZONTAL"),
            ("spaceColumns", SPACE_COLUMNS),
            ("tabStop", "8000"),
            ("tabStopVal", "4000"),
            ("tabStopUnit", "HWPUNIT"),
            ("outlineShapeIDRef", "1"),
            ("memoShapeIDRef", "0"),
            ("textVerticalWidthHead", "0"),
            ("masterPageCnt", "0"),
        ],
    );
    tree.add_element(
        sec_pr,
        "hp:grid",
        &[("lineGrid", "0"), ("charGrid", "0"), ("wonggojiFormat", "0")],
    );
    let start = section.page_number.as_ref().map_or(0, |n| n.start.saturating_sub(1));
    tree.add_element(
        sec_pr,
        "hp:startNum",
        &[
            ("pageStartsOn", "BOTH"),
            ("page", &start.to_string()),
            ("pic", "0"),
            ("tbl", "0"),
            ("equation", "0"),
        ],
    );
    let hide_first = section.page_number.as_ref().is_some_and(|n| n.hide_first_page);
    tree.add_element(
        sec_pr,
        "hp:visibility",
        &[
            ("hideFirstHeader", "0"),
            ("hideFirstFooter", "0"),
            ("hideFirstMasterPage", "0"),
            ("border", "SHOW_ALL"),
            ("fill", "SHOW_ALL"),
            ("hideFirstPageNum", flag(hide_first)),
            ("hideFirstEmptyLine", "0"),
            ("showLineNumber", "0"),
        ],
    );
    tree.add_element(
        sec_pr,
        "hp:lineNumberShape",
        &[("restartType", "0"), ("countBy", "0"), ("distance", "0"), ("startNumber", "0")],
    );

    let page_pr = tree.add_element(
        sec_pr,
        "hp:pagePr",
        &[
            ("landscape", if section.landscape { "NARROWLY" } else { "WIDELY" }),
            ("width", &section.page_width.to_string()),
            ("height", &section.page_height.to_string()),
            ("gutterType", "LEFT_ONLY"),
        ],
    );
    let m = section.margin;
    tree.add_element(
        page_pr,
        "hp:margin",
        &[
            ("header", &m.header.to_string()),
            ("footer", &m.footer.to_string()),
            ("gutter", &m.gutter.to_string()),
            ("left", &m.left.to_string()),
            ("right", &m.right.to_string()),
            ("top", &m.top.to_string()),
            ("bottom", &m.bottom.to_string()),
        ],
    );

    note_pr(tree, sec_pr, "hp:footNotePr", "EACH_COLUMN");
    note_pr(tree, sec_pr, "hp:endNotePr", "END_OF_DOCUMENT");

    for kind in ["BOTH", "EVEN", "ODD"] {
        let fill = tree.add_element(
            sec_pr,
            "hp:pageBorderFill",
            &[
                ("type", kind),
                ("borderFillIDRef", "1"),
                ("textBorder", "PAPER"),
                ("headerInside", "0"),
                ("footerInside", "0"),
                ("fillArea", "PAPER"),
            ],
        );
        tree.add_element(
            fill,
            "hp:offset",
            &[
                ("left", PAGE_BORDER_OFFSET),
                ("right", PAGE_BORDER_OFFSET),
                ("top", PAGE_BORDER_OFFSET),
                ("bottom", PAGE_BORDER_OFFSET),
            ],
        );
    }
    sec_pr
}

fn note_pr(tree: &mut XmlTree, sec_pr: NodeId, name: &str, place: &str) {
    let note = tree.add_element(sec_pr, name, &[]);
    tree.add_element(
        note,
        "hp:autoNumFormat",
        &[
            ("type", "DIGIT"),
            ("userChar", ""),
            ("prefixChar", ""),
            ("suffixChar", ")"),
            ("supscript", "0"),
        ],
    );
    tree.add_element(
        note,
        "hp:noteLine",
        &[("length", "-1"), ("type", "SOLID"), ("width", "0.12 mm"), ("color", "#000000")],
    );
    tree.add_element(
        note,
        "hp:noteSpacing",
        &[("betweenNotes", "283"), ("belowLine", "567"), ("aboveLine", "850")],
    );
    tree.add_element(note, "hp:numbering", &[("type", "CONTINUOUS"), ("newNum", "1")]);
    tree.add_element(note, "hp:placement", &[("place", place), ("beneathText", "0")]);
}

fn col_pr(tree: &mut XmlTree, section: &Section) -> NodeId {
    let ctrl = tree.create_element("hp:ctrl", &[]);
    let gap = if section.col_gap > 0 { section.col_gap } else { DEFAULT_COL_GAP };
    let col_pr = tree.add_element(
        ctrl,
        "hp:colPr",
        &[
            ("id", ""),
            ("type", "NEWSPAPER"),
            ("layout", "LEFT"),
            ("colCount", &section.col_count.max(1).to_string()),
            ("sameSz", "1"),
            ("sameGap", &gap.to_string()),
        ],
    );
    if let Some(line_type) = &section.col_line_type {
        tree.add_element(
            col_pr,
            "hp:colLine",
            &[("type", line_type), ("width", "100"), ("color", "#000000")],
        );
    }
    ctrl
}

fn header_footer(cx: &mut WriteContext, name: &str, hf: &HeaderFooter, vert_align: &str) -> NodeId {
    let ctrl = cx.tree.create_element("hp:ctrl", &[]);
    let node = cx
        .tree
        .add_element(ctrl, name, &[("id", "1"), ("applyPageType", "BOTH")]);
    let sub_list = add_sub_list(&mut cx.tree, node, vert_align);
    cx.tree.set_attr(sub_list, "textWidth", TEXT_WIDTH.to_string());
    cx.tree.set_attr(sub_list, "textHeight", hf.height.to_string());

    let id = cx.ids.next_para();
    let tree = &mut cx.tree;
    let p = add_paragraph_element(tree, sub_list, id, 0, 0, false);
    let run = add_run(tree, p, DEFAULT_CHAR_PR_ID);
    add_text(tree, run, &hf.text);
    if hf.show_page_number {
        let num_ctrl = tree.add_element(run, "hp:ctrl", &[]);
        let auto_num = tree.add_element(num_ctrl, "hp:autoNum", &[("num", "1"), ("numType", "PAGE")]);
        tree.add_element(
            auto_num,
            "hp:autoNumFormat",
            &[
                ("type", "DIGIT"),
                ("userChar", ""),
                ("prefixChar", ""),
                ("suffixChar", ""),
                ("supscript", "0"),
            ],
        );
    }
    add_lineseg(tree, p, LINE_HEIGHT, HEADER_LINE_WIDTH);
    ctrl
}
