use crate::error::Result;
use crate::model::{Field, FieldType, Inline, Note, Paragraph, TextRun, TrackChange};
use crate::xml::{NodeId, XmlTree};

use super::WriteContext;
use super::context::DEFAULT_CHAR_PR_ID;

/// Text width of an A4 page with the default margins.
pub(crate) const TEXT_WIDTH: i32 = 42520;
pub(crate) const LINE_HEIGHT: i32 = 1000;
const LINESEG_FLAGS: &str = "393216";

/// `hp:linesegarray` with a single placeholder line. Hangul recomputes the
/// real layout on open.
pub(crate) fn add_lineseg(tree: &mut XmlTree, p: NodeId, vert_size: i32, horz_size: i32) -> NodeId {
    let array = tree.add_element(p, "hp:linesegarray", &[]);
    tree.add_element(
        array,
        "hp:lineseg",
        &[
            ("textpos", "0"),
            ("vertpos", "0"),
            ("vertsize", &vert_size.to_string()),
            ("textheight", &vert_size.to_string()),
            ("baseline", &(vert_size * 85 / 100).to_string()),
            ("spacing", "600"),
            ("horzpos", "0"),
            ("horzsize", &horz_size.to_string()),
            ("flags", LINESEG_FLAGS),
        ],
    );
    array
}

/// Appends an `hp:t` holding `text`, with embedded newlines as `hp:lineBreak`.
pub(crate) fn add_text(tree: &mut XmlTree, run: NodeId, text: &str) -> NodeId {
    let t = tree.add_element(run, "hp:t", &[]);
    for (i, part) in text.split('\n').enumerate() {
        if i > 0 {
            tree.add_element(t, "hp:lineBreak", &[]);
        }
        if !part.is_empty() {
            tree.add_text(t, part);
        }
    }
    t
}

pub(crate) fn add_run(tree: &mut XmlTree, p: NodeId, char_pr: u32) -> NodeId {
    tree.add_element(p, "hp:run", &[("charPrIDRef", &char_pr.to_string())])
}

/// Bare `hp:p` element with the attributes every paragraph carries.
pub(crate) fn add_paragraph_element(
    tree: &mut XmlTree,
    parent: NodeId,
    id: u32,
    para_pr: u32,
    style: u32,
    page_break: bool,
) -> NodeId {
    tree.add_element(
        parent,
        "hp:p",
        &[
            ("id", &id.to_string()),
            ("paraPrIDRef", &para_pr.to_string()),
            ("styleIDRef", &style.to_string()),
            ("pageBreak", if page_break { "1" } else { "0" }),
            ("columnBreak", "0"),
            ("merged", "0"),
        ],
    )
}

pub(super) fn write_paragraph(
    cx: &mut WriteContext,
    parent: NodeId,
    p: &Paragraph,
    page_break: bool,
) -> Result<NodeId> {
    if let Some(raw) = &p.raw {
        return Ok(cx.tree.add_raw(parent, raw));
    }
    synthesize_paragraph(cx, parent, p, page_break)
}

/// Builds a paragraph from its structured fields, ignoring any raw fragment.
pub(super) fn synthesize_paragraph(
    cx: &mut WriteContext,
    parent: NodeId,
    p: &Paragraph,
    page_break: bool,
) -> Result<NodeId> {
    let id = cx.ids.next_para();
    let para_pr = cx.styles.para_pr_id(p);
    let node = add_paragraph_element(
        &mut cx.tree,
        parent,
        id,
        para_pr,
        p.style_id.unwrap_or(0),
        page_break,
    );
    if p.inlines.is_empty() {
        add_run(&mut cx.tree, node, DEFAULT_CHAR_PR_ID);
    }
    for inline in &p.inlines {
        write_inline(cx, node, inline)?;
    }
    add_lineseg(&mut cx.tree, node, LINE_HEIGHT, TEXT_WIDTH);
    Ok(node)
}

/// Paragraph wrapping a single table, picture or equation. Returns the run
/// the control goes into.
pub(super) fn control_paragraph(cx: &mut WriteContext, parent: NodeId, page_break: bool) -> NodeId {
    let id = cx.ids.next_para();
    let p = add_paragraph_element(&mut cx.tree, parent, id, 0, 0, page_break);
    let run = add_run(&mut cx.tree, p, DEFAULT_CHAR_PR_ID);
    add_lineseg(&mut cx.tree, p, LINE_HEIGHT, 0);
    run
}

fn text_run(cx: &mut WriteContext, p: NodeId, run: &TextRun) -> NodeId {
    let char_pr = cx.styles.char_pr_id(run);
    let node = add_run(&mut cx.tree, p, char_pr);
    add_text(&mut cx.tree, node, &run.text);
    node
}

fn write_inline(cx: &mut WriteContext, p: NodeId, inline: &Inline) -> Result<()> {
    match inline {
        Inline::Text(run) => {
            text_run(cx, p, run);
        }
        Inline::LineBreak | Inline::Tab => {
            let run = add_run(&mut cx.tree, p, DEFAULT_CHAR_PR_ID);
            let t = cx.tree.add_element(run, "hp:t", &[]);
            let name = if matches!(inline, Inline::Tab) { "hp:tab" } else { "hp:lineBreak" };
            cx.tree.add_element(t, name, &[]);
        }
        Inline::Hyperlink(link) => {
            let run = add_run(&mut cx.tree, p, DEFAULT_CHAR_PR_ID);
            let ctrl = cx.tree.add_element(run, "hp:ctrl", &[]);
            cx.tree.add_element(
                ctrl,
                "hp:clickHere",
                &[("url", &link.url), ("tooltip", link.tooltip.as_deref().unwrap_or(""))],
            );
            let inner = add_run(&mut cx.tree, ctrl, DEFAULT_CHAR_PR_ID);
            add_text(&mut cx.tree, inner, &link.text);
        }
        Inline::Bookmark(mark) => {
            let run = add_run(&mut cx.tree, p, DEFAULT_CHAR_PR_ID);
            let ctrl = cx.tree.add_element(run, "hp:ctrl", &[]);
            cx.tree
                .add_element(ctrl, "hp:bookmark", &[("name", &mark.name), ("type", "START")]);
            if let Some(text) = &mark.text {
                let inner = add_run(&mut cx.tree, ctrl, DEFAULT_CHAR_PR_ID);
                add_text(&mut cx.tree, inner, text);
            }
        }
        Inline::Field(field) => write_field(cx, p, field),
        Inline::Footnote(note) => write_note(cx, p, "hp:footNote", note)?,
        Inline::Endnote(note) => write_note(cx, p, "hp:endNote", note)?,
        Inline::Comment(comment) => {
            let run = add_run(&mut cx.tree, p, DEFAULT_CHAR_PR_ID);
            let ctrl = cx.tree.add_element(run, "hp:ctrl", &[]);
            let memo = cx.tree.add_element(ctrl, "hp:memo", &[("author", &comment.author)]);
            if let Some(date) = &comment.date {
                cx.tree.set_attr(memo, "date", date.as_str());
            }
            let sub_list = add_sub_list(&mut cx.tree, memo, "TOP");
            synthesize_paragraph(cx, sub_list, &Paragraph::from_text(comment.content.as_str()), false)?;
        }
        Inline::TrackChange(change) => write_track_change(cx, p, change),
        Inline::Equation(eq) => {
            let run = add_run(&mut cx.tree, p, DEFAULT_CHAR_PR_ID);
            let equation = crate::model::Equation {
                base_line: eq.base_line,
                ..crate::model::Equation::new(eq.script.as_str())
            };
            super::shapes::write_equation(cx, run, &equation);
        }
    }
    Ok(())
}

/// Text shown for a field until Hangul refreshes it.
fn field_preview(field: &Field) -> String {
    match field.field_type {
        FieldType::PageNumber | FieldType::TotalPages => "1".to_string(),
        FieldType::Custom => field.custom_value.clone().unwrap_or_default(),
        _ => String::new(),
    }
}

fn write_field(cx: &mut WriteContext, p: NodeId, field: &Field) {
    let run = add_run(&mut cx.tree, p, DEFAULT_CHAR_PR_ID);
    let begin_ctrl = cx.tree.add_element(run, "hp:ctrl", &[]);
    let begin = cx
        .tree
        .add_element(begin_ctrl, "hp:fieldBegin", &[("type", field.field_type.as_hwpx())]);
    if let Some(format) = &field.format {
        cx.tree.set_attr(begin, "format", format.as_str());
    }
    if let Some(value) = &field.custom_value {
        cx.tree.set_attr(begin, "value", value.as_str());
    }
    add_text(&mut cx.tree, run, &field_preview(field));
    let end_ctrl = cx.tree.add_element(run, "hp:ctrl", &[]);
    cx.tree.add_element(end_ctrl, "hp:fieldEnd", &[]);
}

pub(crate) fn add_sub_list(tree: &mut XmlTree, parent: NodeId, vert_align: &str) -> NodeId {
    tree.add_element(
        parent,
        "hp:subList",
        &[
            ("id", ""),
            ("textDirection", "HORIZONTAL"),
            ("lineWrap", "BREAK"),
            ("vertAlign", vert_align),
            ("linkListIDRef", "0"),
            ("linkListNextIDRef", "0"),
            ("textWidth", "0"),
            ("textHeight", "0"),
            ("hasTextRef", "0"),
            ("hasNumRef", "0"),
        ],
    )
}

fn write_note(cx: &mut WriteContext, p: NodeId, name: &str, note: &Note) -> Result<()> {
    let run = add_run(&mut cx.tree, p, DEFAULT_CHAR_PR_ID);
    let ctrl = cx.tree.add_element(run, "hp:ctrl", &[]);
    let body = cx
        .tree
        .add_element(ctrl, name, &[("number", &note.number.to_string())]);
    let sub_list = add_sub_list(&mut cx.tree, body, "TOP");
    if note.content.is_empty() {
        synthesize_paragraph(cx, sub_list, &Paragraph::default(), false)?;
    }
    for para in &note.content {
        write_paragraph(cx, sub_list, para, false)?;
    }
    Ok(())
}

fn write_track_change(cx: &mut WriteContext, p: NodeId, change: &TrackChange) {
    let run = add_run(&mut cx.tree, p, DEFAULT_CHAR_PR_ID);
    let ctrl = cx.tree.add_element(run, "hp:ctrl", &[]);
    let node = cx.tree.add_element(
        ctrl,
        "hp:trackChange",
        &[("type", change.change_type.as_hwpx()), ("author", &change.author)],
    );
    if let Some(date) = &change.date {
        cx.tree.set_attr(node, "date", date.as_str());
    }
    for (name, text) in [("hp:oldText", &change.original_text), ("hp:newText", &change.new_text)] {
        if let Some(text) = text {
            let side = cx.tree.add_element(node, name, &[]);
            let inner = add_run(&mut cx.tree, side, DEFAULT_CHAR_PR_ID);
            add_text(&mut cx.tree, inner, text);
        }
    }
}
