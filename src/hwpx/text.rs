use crate::model::{
    Bookmark, ChangeType, Comment, Field, FieldType, Hyperlink, Inline, InlineEquation, Note,
    Paragraph, TextRun, TrackChange,
};

use super::styles::CharProps;
use super::{ReadContext, deep_text, find_hp, hp, hp_children, int_attr, is_hp, raw_fragment, uint_attr};

pub(super) fn read_paragraph(ctx: &ReadContext, p: roxmltree::Node) -> Paragraph {
    let layout = ctx
        .styles
        .paragraph(p.attribute("paraPrIDRef").unwrap_or("0"));

    let mut inlines = Vec::new();
    for run in hp_children(p, "run") {
        read_run(ctx, run, &mut inlines);
    }

    Paragraph {
        inlines,
        alignment: layout.alignment,
        line_spacing: layout.line_spacing,
        indent_left: layout.indent_left,
        indent_right: layout.indent_right,
        indent_first_line: layout.indent_first_line,
        space_before: layout.space_before,
        space_after: layout.space_after,
        background_color: None,
        style_id: uint_attr(p, "styleIDRef"),
        raw: Some(raw_fragment(p)),
    }
}

fn styled_run(text: &str, props: &CharProps) -> TextRun {
    TextRun {
        text: text.to_string(),
        bold: props.bold,
        italic: props.italic,
        underline: props.underline,
        strikethrough: props.strikethrough,
        font_size: props.font_size,
        font_family: props.font_family.clone(),
        color: props.color.clone(),
        background_color: props.background_color.clone(),
    }
}

/// Text may carry embedded newlines; each becomes a LineBreak.
fn push_text(text: &str, props: &CharProps, out: &mut Vec<Inline>) {
    for (i, part) in text.split('\n').enumerate() {
        if i > 0 {
            out.push(Inline::LineBreak);
        }
        if !part.is_empty() {
            out.push(Inline::Text(styled_run(part, props)));
        }
    }
}

pub(super) fn read_run(ctx: &ReadContext, run: roxmltree::Node, out: &mut Vec<Inline>) {
    let props = ctx
        .styles
        .characters(run.attribute("charPrIDRef").unwrap_or("0"));

    // Text between fieldBegin and fieldEnd is the field's cached display value.
    let mut in_field = false;
    for child in run.children().filter(|n| n.is_element()) {
        if child.tag_name().namespace() != Some(crate::xml::HP_NS) {
            continue;
        }
        match child.tag_name().name() {
            "t" if in_field => {}
            "t" => {
                for part in child.children() {
                    if part.is_text() {
                        push_text(part.text().unwrap_or(""), &props, out);
                    } else if is_hp(part, "tab") {
                        out.push(Inline::Tab);
                    } else if is_hp(part, "lineBreak") {
                        out.push(Inline::LineBreak);
                    }
                }
            }
            "lineBreak" => out.push(Inline::LineBreak),
            "tab" => out.push(Inline::Tab),
            "ctrl" => {
                let closes = find_hp(child, "fieldEnd").is_some();
                match read_ctrl(ctx, child) {
                    Some(inline) => {
                        in_field = matches!(inline, Inline::Field(_))
                            && find_hp(child, "fieldBegin").is_some()
                            && !closes;
                        out.push(inline);
                    }
                    None if closes => in_field = false,
                    None => {}
                }
            }
            "equation" => out.push(Inline::Equation(InlineEquation {
                script: hp(child, "script")
                    .map(|s| s.text().unwrap_or("").to_string())
                    .unwrap_or_default(),
                base_line: int_attr(child, "baseLine").unwrap_or(85),
            })),
            _ => {}
        }
    }
}

/// Inline controls. Section-level controls (colPr, header, footer, pageNum)
/// yield nothing here; they stay in the paragraph's raw fragment.
fn read_ctrl(ctx: &ReadContext, ctrl: roxmltree::Node) -> Option<Inline> {
    if let Some(click) = find_hp(ctrl, "clickHere") {
        let url = click.attribute("url").unwrap_or("");
        if url.is_empty() {
            return None;
        }
        let text = deep_text(ctrl);
        return Some(Inline::Hyperlink(Hyperlink {
            url: url.to_string(),
            text: if text.is_empty() { url.to_string() } else { text },
            tooltip: click
                .attribute("tooltip")
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        }));
    }

    if let Some(mark) = find_hp(ctrl, "bookmark") {
        let name = mark.attribute("name").unwrap_or("");
        if name.is_empty() {
            return None;
        }
        let text = deep_text(ctrl);
        return Some(Inline::Bookmark(Bookmark {
            name: name.to_string(),
            text: (!text.is_empty()).then_some(text),
        }));
    }

    if let Some(field) = find_hp(ctrl, "fieldBegin").or_else(|| find_hp(ctrl, "field")) {
        let field_type = FieldType::from_hwpx(field.attribute("type").unwrap_or(""));
        let custom_value = (field_type == FieldType::Custom)
            .then(|| {
                field
                    .attribute("value")
                    .map(str::to_string)
                    .or_else(|| Some(deep_text(ctrl)).filter(|t| !t.is_empty()))
            })
            .flatten();
        return Some(Inline::Field(Field {
            field_type,
            format: field.attribute("format").map(str::to_string),
            custom_value,
        }));
    }

    if let Some(note) = find_hp(ctrl, "footNote") {
        return Some(Inline::Footnote(read_note(ctx, note)));
    }
    if let Some(note) = find_hp(ctrl, "endNote") {
        return Some(Inline::Endnote(read_note(ctx, note)));
    }

    if let Some(memo) = find_hp(ctrl, "memo") {
        return Some(Inline::Comment(Comment {
            author: memo.attribute("author").unwrap_or("").to_string(),
            content: deep_text(memo),
            date: memo.attribute("date").map(str::to_string),
        }));
    }

    if let Some(track) = find_hp(ctrl, "trackChange") {
        let side_text = |name: &str| {
            hp(track, name)
                .map(deep_text)
                .filter(|t| !t.is_empty())
        };
        return Some(Inline::TrackChange(TrackChange {
            change_type: ChangeType::from_hwpx(track.attribute("type").unwrap_or("INSERT")),
            author: track.attribute("author").unwrap_or("").to_string(),
            date: track.attribute("date").map(str::to_string),
            original_text: side_text("oldText"),
            new_text: side_text("newText"),
        }));
    }

    None
}

fn read_note(ctx: &ReadContext, note: roxmltree::Node) -> Note {
    let content = hp(note, "subList")
        .into_iter()
        .flat_map(|sub| hp_children(sub, "p"))
        .map(|p| read_paragraph(ctx, p))
        .collect();
    Note {
        number: uint_attr(note, "number").unwrap_or(1),
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwpx::styles::StyleTable;
    use crate::model::BinaryItems;
    use crate::xml::HP_NS;

    fn read(xml_body: &str) -> Paragraph {
        let xml = format!(r#"<hp:p xmlns:hp="{HP_NS}" paraPrIDRef="0" styleIDRef="2">{xml_body}</hp:p>"#);
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let styles = StyleTable::default();
        let binaries = BinaryItems::new();
        let ctx = ReadContext {
            styles: &styles,
            binaries: &binaries,
        };
        read_paragraph(&ctx, doc.root_element())
    }

    #[test]
    fn splits_text_on_newlines() {
        let para = read(r#"<hp:run charPrIDRef="0"><hp:t>one
two</hp:t><hp:lineBreak/><hp:t>three<hp:tab/>four</hp:t></hp:run>"#);
        let kinds: Vec<String> = para
            .inlines
            .iter()
            .map(|i| match i {
                Inline::Text(r) => r.text.clone(),
                Inline::LineBreak => "<br>".into(),
                Inline::Tab => "<tab>".into(),
                _ => "?".into(),
            })
            .collect();
        assert_eq!(kinds, ["one", "<br>", "two", "<br>", "three", "<tab>", "four"]);
        assert_eq!(para.style_id, Some(2));
        assert!(para.raw.as_deref().unwrap().starts_with("<hp:p "));
    }

    #[test]
    fn reads_inline_controls() {
        let para = read(
            r#"<hp:run><hp:ctrl><hp:clickHere url="https://hancom.com" tooltip=""/><hp:run><hp:t>Hancom</hp:t></hp:run></hp:ctrl>
            <hp:ctrl><hp:bookmark name="intro" type="START"/></hp:ctrl>
            <hp:ctrl><hp:fieldBegin type="PAGE"/><hp:fieldEnd/></hp:ctrl>
            <hp:ctrl><hp:footNote number="3"><hp:subList><hp:p><hp:run><hp:t>note body</hp:t></hp:run></hp:p></hp:subList></hp:footNote></hp:ctrl>
            <hp:ctrl><hp:memo author="kim" date="2024-01-01"><hp:subList><hp:p><hp:run><hp:t>check</hp:t></hp:run></hp:p></hp:subList></hp:memo></hp:ctrl>
            <hp:ctrl><hp:trackChange type="DELETE" author="lee"><hp:oldText><hp:run><hp:t>old</hp:t></hp:run></hp:oldText></hp:trackChange></hp:ctrl>
            <hp:equation baseLine="80"><hp:script>a over b</hp:script></hp:equation></hp:run>"#,
        );
        assert_eq!(para.inlines.len(), 7);
        match &para.inlines[0] {
            Inline::Hyperlink(link) => {
                assert_eq!(link.url, "https://hancom.com");
                assert_eq!(link.text, "Hancom");
                assert_eq!(link.tooltip, None);
            }
            other => panic!("expected hyperlink, got {other:?}"),
        }
        assert!(matches!(&para.inlines[1], Inline::Bookmark(b) if b.name == "intro" && b.text.is_none()));
        assert!(matches!(&para.inlines[2], Inline::Field(f) if f.field_type == FieldType::PageNumber));
        match &para.inlines[3] {
            Inline::Footnote(note) => {
                assert_eq!(note.number, 3);
                assert_eq!(note.content[0].plain_text(), "note body");
            }
            other => panic!("expected footnote, got {other:?}"),
        }
        assert!(matches!(&para.inlines[4], Inline::Comment(c) if c.author == "kim" && c.content == "check"));
        assert!(matches!(&para.inlines[5], Inline::TrackChange(t)
            if t.change_type == ChangeType::Delete && t.original_text.as_deref() == Some("old") && t.new_text.is_none()));
        assert!(matches!(&para.inlines[6], Inline::Equation(e) if e.script == "a over b" && e.base_line == 80));
    }
}
