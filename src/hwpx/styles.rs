use std::collections::HashMap;

use crate::model::{Alignment, LineSpacing};
use crate::xml::{HC_NS, HH_NS};

use super::{find_hh, int_attr};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct ParaLayout {
    pub(crate) alignment: Alignment,
    pub(crate) line_spacing: LineSpacing,
    pub(crate) indent_left: i32,
    pub(crate) indent_right: i32,
    pub(crate) indent_first_line: i32,
    pub(crate) space_before: i32,
    pub(crate) space_after: i32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct CharProps {
    pub(crate) bold: bool,
    pub(crate) italic: bool,
    pub(crate) underline: bool,
    pub(crate) strikethrough: bool,
    pub(crate) font_size: Option<u32>,
    pub(crate) font_family: Option<String>,
    pub(crate) color: Option<String>,
    pub(crate) background_color: Option<String>,
}

/// Paragraph and character properties from `header.xml`, keyed by the id
/// strings body elements reference.
#[derive(Debug, Default)]
pub(crate) struct StyleTable {
    paragraphs: HashMap<String, ParaLayout>,
    characters: HashMap<String, CharProps>,
}

fn hh<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(HH_NS))
}

fn elements_named<'a>(
    root: roxmltree::Node<'a, 'a>,
    name: &'a str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'a>> {
    root.descendants()
        .filter(move |n| n.tag_name().name() == name && n.tag_name().namespace() == Some(HH_NS))
}

/// Toggle present either as a child element (`<hh:bold/>`) or an attribute.
fn toggle(node: roxmltree::Node, name: &str) -> bool {
    hh(node, name).is_some() || node.attribute(name) == Some("1")
}

/// Underline and strikeout: on unless the type/shape says NONE.
fn line_decoration(node: roxmltree::Node, name: &str, attr: &str) -> bool {
    if let Some(child) = hh(node, name) {
        return child
            .attribute("type")
            .or_else(|| child.attribute("shape"))
            .is_some_and(|v| v != "NONE");
    }
    node.attribute(name).is_some_and(|v| v != "NONE") || node.attribute(attr).is_some_and(|v| v != "NONE")
}

fn color_attr(node: roxmltree::Node, attr: &str) -> Option<String> {
    node.attribute(attr)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("none"))
        .map(str::to_string)
}

/// `hh:margin` carries its values either as `hc:*` children with a `value`
/// attribute or directly as attributes.
fn margin_value(margin: roxmltree::Node, name: &str) -> i32 {
    margin
        .children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(HC_NS))
        .and_then(|n| int_attr(n, "value"))
        .or_else(|| int_attr(margin, name))
        .unwrap_or(0)
}

pub(crate) fn parse_para_pr(node: roxmltree::Node) -> ParaLayout {
    let alignment = hh(node, "align")
        .and_then(|a| a.attribute("horizontal"))
        .or_else(|| node.attribute("align"))
        .map(Alignment::from_hwpx)
        .unwrap_or_default();

    let line_spacing = find_hh(node, "lineSpacing")
        .map(|ls| {
            LineSpacing::from_hwpx(
                ls.attribute("type").unwrap_or("PERCENT"),
                int_attr(ls, "value").unwrap_or(160),
            )
        })
        .unwrap_or_default();

    let mut layout = ParaLayout {
        alignment,
        line_spacing,
        ..Default::default()
    };
    if let Some(margin) = find_hh(node, "margin") {
        layout.indent_left = margin_value(margin, "left");
        layout.indent_right = margin_value(margin, "right");
        layout.indent_first_line = match margin_value(margin, "intent") {
            0 => margin_value(margin, "indent"),
            v => v,
        };
        layout.space_before = margin_value(margin, "prev");
        layout.space_after = margin_value(margin, "next");
    }
    layout
}

pub(crate) fn parse_char_pr(node: roxmltree::Node, hangul_fonts: &HashMap<String, String>) -> CharProps {
    let font_family = hh(node, "fontRef")
        .and_then(|r| r.attribute("hangul"))
        .or_else(|| node.attribute("fontRef"))
        .and_then(|id| hangul_fonts.get(id))
        .cloned();

    CharProps {
        bold: toggle(node, "bold"),
        italic: toggle(node, "italic"),
        underline: line_decoration(node, "underline", "underlineType"),
        strikethrough: line_decoration(node, "strikeout", "strikeoutShape"),
        font_size: node
            .attribute("height")
            .and_then(|v| v.trim().parse::<u32>().ok()),
        font_family,
        color: color_attr(node, "textColor"),
        background_color: color_attr(node, "shadeColor"),
    }
}

/// Font id to face name for the HANGUL font face (or the first face when
/// no language is tagged).
pub(crate) fn hangul_font_names(root: roxmltree::Node) -> HashMap<String, String> {
    let mut names = HashMap::new();
    let faces: Vec<_> = elements_named(root, "fontface").collect();
    let face = faces
        .iter()
        .find(|f| f.attribute("lang") == Some("HANGUL"))
        .or_else(|| faces.first());
    if let Some(face) = face {
        for font in face.children().filter(|n| n.tag_name().name() == "font") {
            if let (Some(id), Some(name)) = (font.attribute("id"), font.attribute("face")) {
                names.insert(id.to_string(), name.to_string());
            }
        }
        // Flat fontface entries: <hh:fontface id=".." font=".."/>
        if let (Some(id), Some(name)) = (face.attribute("id"), face.attribute("font")) {
            names.insert(id.to_string(), name.to_string());
        }
    }
    for face in &faces {
        if let (Some(id), Some(name)) = (face.attribute("id"), face.attribute("font")) {
            names.entry(id.to_string()).or_insert_with(|| name.to_string());
        }
    }
    names
}

impl StyleTable {
    pub(crate) fn from_header(root: roxmltree::Node) -> Self {
        let fonts = hangul_font_names(root);

        let paragraphs = elements_named(root, "paraPr")
            .filter_map(|n| n.attribute("id").map(|id| (id.to_string(), parse_para_pr(n))))
            .collect();

        let characters = elements_named(root, "charPr")
            .filter_map(|n| {
                n.attribute("id")
                    .map(|id| (id.to_string(), parse_char_pr(n, &fonts)))
            })
            .collect();

        StyleTable {
            paragraphs,
            characters,
        }
    }

    pub(crate) fn paragraph(&self, id: &str) -> ParaLayout {
        self.paragraphs.get(id).cloned().unwrap_or_default()
    }

    pub(crate) fn characters(&self, id: &str) -> CharProps {
        self.characters.get(id).cloned().unwrap_or_default()
    }
}
