use crate::error::{Error, Result};
use crate::model::{Equation, Image, Margins, Position};
use crate::xml::{NodeId, XmlTree};

use super::WriteContext;
use super::context::INSTID_OFFSET;

const DEFAULT_PICTURE_SIZE: i32 = 3000;
const EQUATION_BASE_UNIT: &str = "1100";
const EQUATION_FONT: &str = "HYhwpEQ";

pub(crate) fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

pub(crate) fn write_position(tree: &mut XmlTree, parent: NodeId, pos: &Position) -> NodeId {
    tree.add_element(
        parent,
        "hp:pos",
        &[
            ("treatAsChar", flag(pos.treat_as_char)),
            ("affectLSpacing", "0"),
            ("flowWithText", flag(pos.flow_with_text)),
            ("allowOverlap", flag(pos.allow_overlap)),
            ("holdAnchorAndSO", "0"),
            ("vertRelTo", pos.vert_rel_to.as_hwpx()),
            ("horzRelTo", pos.horz_rel_to.as_hwpx()),
            ("vertAlign", pos.vert_align.as_hwpx()),
            ("horzAlign", pos.horz_align.as_hwpx()),
            ("vertOffset", &pos.vert_offset.to_string()),
            ("horzOffset", &pos.horz_offset.to_string()),
        ],
    )
}

pub(crate) fn write_margins(tree: &mut XmlTree, parent: NodeId, name: &str, m: Margins) -> NodeId {
    tree.add_element(
        parent,
        name,
        &[
            ("left", &m.left.to_string()),
            ("right", &m.right.to_string()),
            ("top", &m.top.to_string()),
            ("bottom", &m.bottom.to_string()),
        ],
    )
}

pub(crate) fn write_size(tree: &mut XmlTree, parent: NodeId, width: i32, height: i32) -> NodeId {
    tree.add_element(
        parent,
        "hp:sz",
        &[
            ("width", &width.to_string()),
            ("widthRelTo", "ABSOLUTE"),
            ("height", &height.to_string()),
            ("heightRelTo", "ABSOLUTE"),
            ("protect", "0"),
        ],
    )
}

/// Display-to-original scale, 1.0 when the original size is unknown.
fn scale(current: i32, original: i32) -> f64 {
    if original == 0 {
        1.0
    } else {
        f64::from(current) / f64::from(original)
    }
}

pub(crate) fn matrix(tree: &mut XmlTree, parent: NodeId, name: &str, e1: &str, e5: &str) {
    tree.add_element(
        parent,
        name,
        &[("e1", e1), ("e2", "0"), ("e3", "0"), ("e4", "0"), ("e5", e5), ("e6", "0")],
    );
}

pub(super) fn write_picture(cx: &mut WriteContext, run: NodeId, image: &Image) -> Result<NodeId> {
    if !cx.binaries.contains_key(&image.image_id) {
        return Err(Error::MissingAsset(image.image_id.clone()));
    }
    if let Some(raw) = &image.raw {
        return Ok(cx.tree.add_raw(run, raw));
    }

    let width = image.width.unwrap_or(DEFAULT_PICTURE_SIZE);
    let height = image.height.unwrap_or(DEFAULT_PICTURE_SIZE);
    let org_width = image.org_width.unwrap_or(width);
    let org_height = image.org_height.unwrap_or(height);
    let id = cx.ids.next_pic();

    let tree = &mut cx.tree;
    let pic = tree.add_element(
        run,
        "hp:pic",
        &[
            ("id", &id.to_string()),
            ("zOrder", "0"),
            ("numberingType", "PICTURE"),
            ("textWrap", image.text_wrap.as_hwpx()),
            ("textFlow", "BOTH_SIDES"),
            ("lock", "0"),
            ("dropcapstyle", "None"),
            ("href", ""),
            ("groupLevel", "0"),
            ("instid", &(id + INSTID_OFFSET).to_string()),
            ("reverse", "0"),
        ],
    );
    tree.add_element(pic, "hp:offset", &[("x", "0"), ("y", "0")]);
    for (name, w, h) in [("hp:orgSz", org_width, org_height), ("hp:curSz", width, height)] {
        tree.add_element(pic, name, &[("width", &w.to_string()), ("height", &h.to_string())]);
    }
    tree.add_element(
        pic,
        "hp:flip",
        &[("horizontal", flag(image.flip_h)), ("vertical", flag(image.flip_v))],
    );
    tree.add_element(
        pic,
        "hp:rotationInfo",
        &[
            ("angle", &image.rotation_angle.to_string()),
            ("centerX", &(width / 2).to_string()),
            ("centerY", &(height / 2).to_string()),
            ("rotateimage", "1"),
        ],
    );

    let rendering = tree.add_element(pic, "hp:renderingInfo", &[]);
    matrix(tree, rendering, "hc:transMatrix", "1", "1");
    let sca_x = format!("{:.6}", scale(width, org_width));
    let sca_y = format!("{:.6}", scale(height, org_height));
    matrix(tree, rendering, "hc:scaMatrix", &sca_x, &sca_y);
    matrix(tree, rendering, "hc:rotMatrix", "1", "1");

    tree.add_element(
        pic,
        "hc:img",
        &[
            ("binaryItemIDRef", &image.image_id),
            ("bright", &image.brightness.to_string()),
            ("contrast", &image.contrast.to_string()),
            ("effect", "REAL_PIC"),
            ("alpha", &image.alpha.to_string()),
        ],
    );
    let rect = tree.add_element(pic, "hp:imgRect", &[]);
    for (name, x, y) in [
        ("hc:pt0", 0, 0),
        ("hc:pt1", org_width, 0),
        ("hc:pt2", org_width, org_height),
        ("hc:pt3", 0, org_height),
    ] {
        tree.add_element(rect, name, &[("x", &x.to_string()), ("y", &y.to_string())]);
    }
    write_margins(
        tree,
        pic,
        "hp:imgClip",
        Margins {
            left: 0,
            right: org_width,
            top: 0,
            bottom: org_height,
        },
    );
    write_margins(tree, pic, "hp:inMargin", Margins::default());
    tree.add_element(
        pic,
        "hp:imgDim",
        &[("dimwidth", &org_width.to_string()), ("dimheight", &org_height.to_string())],
    );
    tree.add_element(pic, "hp:effects", &[]);
    write_size(tree, pic, width, height);
    write_position(tree, pic, &image.position);
    write_margins(tree, pic, "hp:outMargin", image.out_margin.unwrap_or_default());
    let comment = tree.add_element(pic, "hp:shapeComment", &[]);
    tree.add_text(comment, &format!("Original Size: {org_width}, {org_height}"));
    Ok(pic)
}

pub(super) fn write_equation(cx: &mut WriteContext, run: NodeId, eq: &Equation) -> NodeId {
    if let Some(raw) = &eq.raw {
        return cx.tree.add_raw(run, raw);
    }
    let id = cx.ids.next_pic();
    let tree = &mut cx.tree;
    let node = tree.add_element(
        run,
        "hp:equation",
        &[
            ("id", &id.to_string()),
            ("zOrder", "0"),
            ("numberingType", "EQUATION"),
            ("textWrap", "TOP_AND_BOTTOM"),
            ("textFlow", "BOTH_SIDES"),
            ("lock", "0"),
            ("dropcapstyle", "None"),
            ("version", &eq.version),
            ("baseLine", &eq.base_line.to_string()),
            ("textColor", &eq.text_color),
            ("baseUnit", EQUATION_BASE_UNIT),
            ("lineMode", "CHAR"),
            ("font", EQUATION_FONT),
        ],
    );
    write_size(tree, node, eq.width, eq.height);
    write_position(tree, node, &Position::default());
    write_margins(tree, node, "hp:outMargin", Margins::default());
    let comment = tree.add_element(node, "hp:shapeComment", &[]);
    tree.add_text(comment, "Equation");
    let script = tree.add_element(node, "hp:script", &[]);
    tree.add_text(script, &eq.script);
    node
}
