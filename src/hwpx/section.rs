use crate::model::{
    Block, HeaderFooter, NumberFormat, PageMargin, PageNumber, PageNumberPosition, Section,
};

use super::{deep_text, find_hp, flag_attr, hp, hp_children, int_attr, raw_fragment, uint_attr};

/// First occurrence of a section-level control among the top-level paragraphs.
fn section_control<'a>(
    root: roxmltree::Node<'a, 'a>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    hp_children(root, "p").find_map(|p| find_hp(p, name))
}

fn read_margin(page_pr: roxmltree::Node) -> PageMargin {
    let default = PageMargin::default();
    let Some(margin) = hp(page_pr, "margin") else {
        return default;
    };
    let value = |name: &str, fallback: i32| int_attr(margin, name).unwrap_or(fallback);
    PageMargin {
        header: value("header", default.header),
        footer: value("footer", default.footer),
        gutter: value("gutter", default.gutter),
        left: value("left", default.left),
        right: value("right", default.right),
        top: value("top", default.top),
        bottom: value("bottom", default.bottom),
    }
}

fn read_header_footer(node: roxmltree::Node) -> HeaderFooter {
    let sub_list = hp(node, "subList");
    let mut hf = HeaderFooter::new(sub_list.map(deep_text).unwrap_or_default());
    if let Some(height) = sub_list.and_then(|s| int_attr(s, "textHeight")) {
        hf.height = height;
    }
    hf.show_page_number = node.descendants().any(|n| {
        n.tag_name().name() == "pageNum"
            || (n.tag_name().name() == "fieldBegin" && n.attribute("type") == Some("PAGE"))
            || (n.tag_name().name() == "autoNum" && n.attribute("numType") == Some("PAGE"))
    });
    hf
}

pub(super) fn read_section(
    root: roxmltree::Node,
    sec_pr: roxmltree::Node,
    blocks: Vec<Block>,
) -> Section {
    let mut section = Section {
        blocks,
        raw: Some(raw_fragment(sec_pr)),
        ..Section::default()
    };

    if let Some(page_pr) = hp(sec_pr, "pagePr") {
        section.page_width = int_attr(page_pr, "width").unwrap_or(section.page_width);
        section.page_height = int_attr(page_pr, "height").unwrap_or(section.page_height);
        section.landscape = page_pr.attribute("landscape") == Some("NARROWLY");
        section.margin = read_margin(page_pr);
    }

    if let Some(col_pr) = section_control(root, "colPr") {
        section.col_count = col_pr
            .attribute("colCount")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);
        section.col_gap = int_attr(col_pr, "sameGap").unwrap_or(0);
        section.col_line_type = hp(col_pr, "colLine")
            .and_then(|line| line.attribute("type"))
            .filter(|t| *t != "NONE")
            .map(str::to_string);
    }

    section.header = section_control(root, "header").map(read_header_footer);
    section.footer = section_control(root, "footer").map(read_header_footer);

    if let Some(page_num) = section_control(root, "pageNum") {
        section.page_number = Some(PageNumber {
            position: PageNumberPosition::from_hwpx(page_num.attribute("pos").unwrap_or("")),
            format: NumberFormat::from_hwpx(page_num.attribute("formatType").unwrap_or("")),
            start: hp(sec_pr, "startNum")
                .and_then(|s| uint_attr(s, "page"))
                .map_or(1, |page| page + 1),
            hide_first_page: hp(sec_pr, "visibility")
                .is_some_and(|v| flag_attr(v, "hideFirstPageNum")),
            side_char: page_num.attribute("sideChar").unwrap_or("-").to_string(),
        });
    }

    section
}
