use crate::model::{Equation, Image, Position, TextWrap};

use super::table::{read_margins, read_position};
use super::{ReadContext, find_hc, flag_attr, hp, int_attr, raw_fragment};

/// Reads an `hp:pic`. Pictures whose binary item cannot be resolved are
/// dropped with a warning.
pub(super) fn read_image(ctx: &ReadContext, pic: roxmltree::Node) -> Option<Image> {
    let Some(img) = find_hc(pic, "img") else {
        log::warn!("dropping picture without hc:img");
        return None;
    };
    let Some(binary_id) = img.attribute("binaryItemIDRef").filter(|id| !id.is_empty()) else {
        log::warn!("dropping picture without binaryItemIDRef");
        return None;
    };
    if !ctx.binaries.contains_key(binary_id) {
        log::warn!("dropping picture: binary item {binary_id} is not in the package");
        return None;
    }

    let size = |name: &str| hp(pic, name).map(|n| (int_attr(n, "width"), int_attr(n, "height")));
    let (width, height) = size("curSz")
        .filter(|(w, h)| w.is_some_and(|v| v > 0) || h.is_some_and(|v| v > 0))
        .or_else(|| size("sz"))
        .unwrap_or((None, None));
    let (org_width, org_height) = size("orgSz").unwrap_or((None, None));

    let mut image = Image::new(binary_id);
    image.width = width;
    image.height = height;
    image.org_width = org_width;
    image.org_height = org_height;
    image.position = read_position(
        hp(pic, "pos"),
        Position {
            treat_as_char: false,
            ..Position::default()
        },
    );
    image.text_wrap = pic
        .attribute("textWrap")
        .map(TextWrap::from_hwpx)
        .unwrap_or_default();
    image.out_margin = read_margins(hp(pic, "outMargin"));
    if let Some(flip) = hp(pic, "flip") {
        image.flip_h = flag_attr(flip, "horizontal");
        image.flip_v = flag_attr(flip, "vertical");
    }
    image.rotation_angle = hp(pic, "rotationInfo")
        .and_then(|r| int_attr(r, "angle"))
        .unwrap_or(0);
    image.brightness = int_attr(img, "bright").unwrap_or(0);
    image.contrast = int_attr(img, "contrast").unwrap_or(0);
    image.alpha = int_attr(img, "alpha").unwrap_or(0);
    image.raw = Some(raw_fragment(pic));
    Some(image)
}

pub(super) fn read_equation(node: roxmltree::Node) -> Equation {
    let mut eq = Equation::new(
        hp(node, "script")
            .and_then(|s| s.text())
            .unwrap_or(""),
    );
    if let Some(size) = hp(node, "sz") {
        eq.width = int_attr(size, "width").unwrap_or(eq.width);
        eq.height = int_attr(size, "height").unwrap_or(eq.height);
    }
    if let Some(color) = node.attribute("textColor") {
        eq.text_color = color.to_string();
    }
    eq.base_line = int_attr(node, "baseLine").unwrap_or(eq.base_line);
    if let Some(version) = node.attribute("version") {
        eq.version = version.to_string();
    }
    eq.raw = Some(raw_fragment(node));
    eq
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwpx::styles::StyleTable;
    use crate::model::{BinaryItem, BinaryItems};
    use crate::xml::{HC_NS, HP_NS};

    fn pic_xml(binary_ref: &str) -> String {
        format!(
            r#"<hp:pic xmlns:hp="{HP_NS}" xmlns:hc="{HC_NS}" id="1" textWrap="IN_FRONT_OF_TEXT"><hp:orgSz width="6000" height="4000"/><hp:curSz width="3000" height="2000"/><hp:flip horizontal="1" vertical="0"/><hp:rotationInfo angle="90"/><hc:img binaryItemIDRef="{binary_ref}" bright="10" contrast="-5" alpha="0"/><hp:sz width="3000" height="2000"/><hp:pos treatAsChar="1"/></hp:pic>"#
        )
    }

    fn binaries() -> BinaryItems {
        let mut items = BinaryItems::new();
        items.insert("image1".into(), BinaryItem::new("image1", "image1.png", vec![1, 2, 3]));
        items
    }

    #[test]
    fn reads_picture() {
        let xml = pic_xml("image1");
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let styles = StyleTable::default();
        let binaries = binaries();
        let ctx = ReadContext {
            styles: &styles,
            binaries: &binaries,
        };
        let image = read_image(&ctx, doc.root_element()).unwrap();
        assert_eq!(image.image_id, "image1");
        assert_eq!((image.width, image.height), (Some(3000), Some(2000)));
        assert_eq!((image.org_width, image.org_height), (Some(6000), Some(4000)));
        assert!(image.flip_h && !image.flip_v);
        assert_eq!(image.rotation_angle, 90);
        assert_eq!((image.brightness, image.contrast), (10, -5));
        assert!(image.position.treat_as_char);
        assert_eq!(image.text_wrap, TextWrap::InFrontOfText);
    }

    #[test]
    fn drops_picture_with_unknown_binary() {
        let xml = pic_xml("image9");
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let styles = StyleTable::default();
        let binaries = binaries();
        let ctx = ReadContext {
            styles: &styles,
            binaries: &binaries,
        };
        assert!(read_image(&ctx, doc.root_element()).is_none());
    }

    #[test]
    fn reads_equation() {
        let xml = format!(
            r##"<hp:equation xmlns:hp="{HP_NS}" version="Equation Version 70" baseLine="90" textColor="#112233"><hp:sz width="5000" height="1200"/><hp:script>x^2</hp:script></hp:equation>"##
        );
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let eq = read_equation(doc.root_element());
        assert_eq!(eq.script, "x^2");
        assert_eq!((eq.width, eq.height, eq.base_line), (5000, 1200, 90));
        assert_eq!(eq.text_color, "#112233");
        assert_eq!(eq.version, "Equation Version 70");
    }
}
