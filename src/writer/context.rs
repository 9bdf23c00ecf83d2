use std::collections::HashMap;

use crate::error::Result;
use crate::hwpx::styles::{self, CharProps, ParaLayout};
use crate::model::{Paragraph, TextRun};
use crate::xml::{HH_NS, NodeId, XmlTree, namespace_declarations};

pub(crate) const PARA_ID_BASE: u32 = 0;
pub(crate) const TABLE_ID_BASE: u32 = 0;
/// Picture and equation ids live far above paragraph and table ids.
pub(crate) const PIC_ID_BASE: u32 = 2_000_000_000;
pub(crate) const INSTID_OFFSET: u32 = 3_000_000;

pub(crate) const DEFAULT_CHAR_PR_ID: u32 = 0;
pub(crate) const DEFAULT_PARA_PR_ID: u32 = 0;
const DEFAULT_FONT_HEIGHT: u32 = 1000;
const DEFAULT_TEXT_COLOR: &str = "#000000";

const FONT_LANGS: [&str; 7] = ["hangul", "latin", "hanja", "japanese", "other", "symbol", "user"];
const FONTFACE_LANGS: [&str; 7] = ["HANGUL", "LATIN", "HANJA", "JAPANESE", "OTHER", "SYMBOL", "USER"];

/// Monotonic id counters for one write call.
#[derive(Debug)]
pub(crate) struct IdAllocator {
    next_para: u32,
    next_table: u32,
    next_pic: u32,
}

impl IdAllocator {
    pub(crate) fn new() -> Self {
        Self {
            next_para: PARA_ID_BASE,
            next_table: TABLE_ID_BASE,
            next_pic: PIC_ID_BASE,
        }
    }

    pub(crate) fn next_para(&mut self) -> u32 {
        let id = self.next_para;
        self.next_para += 1;
        id
    }

    pub(crate) fn next_table(&mut self) -> u32 {
        let id = self.next_table;
        self.next_table += 1;
        id
    }

    /// Shared by pictures and equations.
    pub(crate) fn next_pic(&mut self) -> u32 {
        let id = self.next_pic;
        self.next_pic += 1;
        id
    }
}

/// The character formatting a charPr entry is deduplicated on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct CharSignature {
    pub(crate) bold: bool,
    pub(crate) italic: bool,
    pub(crate) font_size: Option<u32>,
    pub(crate) font_family: Option<String>,
    pub(crate) color: Option<String>,
}

impl CharSignature {
    pub(crate) fn of(run: &TextRun) -> Self {
        Self {
            bold: run.bold,
            italic: run.italic,
            font_size: run.font_size,
            font_family: run.font_family.clone(),
            color: run.color.clone(),
        }
    }

    fn from_props(props: CharProps) -> Self {
        Self {
            bold: props.bold,
            italic: props.italic,
            font_size: props.font_size,
            font_family: props.font_family,
            color: props.color,
        }
    }

    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

fn layout_of(p: &Paragraph) -> ParaLayout {
    ParaLayout {
        alignment: p.alignment,
        line_spacing: p.line_spacing,
        indent_left: p.indent_left,
        indent_right: p.indent_right,
        indent_first_line: p.indent_first_line,
        space_before: p.space_before,
        space_after: p.space_after,
    }
}

/// Maps formatting signatures to style catalog ids, appending new
/// `hh:charPr`, `hh:paraPr` and `hh:font` entries on a miss.
pub(crate) struct StyleDeduplicator {
    header: XmlTree,
    chars: HashMap<CharSignature, u32>,
    paras: HashMap<ParaLayout, u32>,
    fonts: HashMap<String, u32>,
    next_char: u32,
    next_para: u32,
    next_font: u32,
}

fn max_id<'a>(nodes: impl Iterator<Item = roxmltree::Node<'a, 'a>>) -> Option<u32> {
    nodes
        .filter_map(|n| n.attribute("id").and_then(|v| v.parse::<u32>().ok()))
        .max()
}

fn hh_elements<'a>(
    root: roxmltree::Node<'a, 'a>,
    name: &'a str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'a>> {
    root.descendants()
        .filter(move |n| n.tag_name().name() == name && n.tag_name().namespace() == Some(HH_NS))
}

impl StyleDeduplicator {
    /// Seeds the caches from a template catalog. Without one, a minimal
    /// catalog holding only the default charPr and paraPr is synthesized.
    pub(crate) fn new(header_xml: Option<&str>) -> Result<Self> {
        let Some(xml) = header_xml else {
            return Ok(Self::minimal());
        };

        let doc = roxmltree::Document::parse(xml)?;
        let root = doc.root_element();
        let font_names = styles::hangul_font_names(root);

        let mut fonts: HashMap<String, u32> = HashMap::new();
        for (id, name) in &font_names {
            if let Ok(id) = id.parse::<u32>() {
                fonts
                    .entry(name.clone())
                    .and_modify(|v| *v = (*v).min(id))
                    .or_insert(id);
            }
        }

        let mut chars = HashMap::new();
        for node in hh_elements(root, "charPr") {
            if let Some(id) = node.attribute("id").and_then(|v| v.parse::<u32>().ok()) {
                let signature = CharSignature::from_props(styles::parse_char_pr(node, &font_names));
                chars.entry(signature).or_insert(id);
            }
        }

        let mut paras = HashMap::new();
        for node in hh_elements(root, "paraPr") {
            if let Some(id) = node.attribute("id").and_then(|v| v.parse::<u32>().ok()) {
                paras.entry(styles::parse_para_pr(node)).or_insert(id);
            }
        }

        Ok(Self {
            header: XmlTree::parse(xml)?,
            chars,
            paras,
            fonts,
            next_char: max_id(hh_elements(root, "charPr")).map_or(0, |id| id + 1),
            next_para: max_id(hh_elements(root, "paraPr")).map_or(0, |id| id + 1),
            next_font: max_id(hh_elements(root, "font")).map_or(0, |id| id + 1),
        })
    }

    fn minimal() -> Self {
        let decls = namespace_declarations();
        let mut attrs: Vec<(&str, &str)> = decls.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        attrs.extend([("version", "1.4"), ("secCnt", "1")]);
        let mut header = XmlTree::new("hh:head", &attrs);
        let root = header.root();
        header.add_element(root, "hh:refList", &[]);

        let mut dedup = Self {
            header,
            chars: HashMap::new(),
            paras: HashMap::new(),
            fonts: HashMap::new(),
            next_char: 0,
            next_para: 0,
            next_font: 0,
        };
        dedup.append_char_pr(&CharSignature::default());
        dedup.append_para_pr(&ParaLayout::default());
        dedup
    }

    pub(crate) fn char_pr_id(&mut self, run: &TextRun) -> u32 {
        self.char_pr_for(CharSignature::of(run))
    }

    pub(crate) fn char_pr_for(&mut self, signature: CharSignature) -> u32 {
        if signature.is_default() {
            return DEFAULT_CHAR_PR_ID;
        }
        if let Some(&id) = self.chars.get(&signature) {
            return id;
        }
        let id = self.append_char_pr(&signature);
        self.chars.insert(signature, id);
        id
    }

    pub(crate) fn para_pr_id(&mut self, paragraph: &Paragraph) -> u32 {
        if paragraph.has_default_layout() {
            return DEFAULT_PARA_PR_ID;
        }
        let layout = layout_of(paragraph);
        if let Some(&id) = self.paras.get(&layout) {
            return id;
        }
        let id = self.append_para_pr(&layout);
        self.paras.insert(layout, id);
        id
    }

    /// Font slot for `name`; an empty name maps to the default slot 0.
    pub(crate) fn font_id(&mut self, name: &str) -> u32 {
        if name.is_empty() {
            return 0;
        }
        if let Some(&id) = self.fonts.get(name) {
            return id;
        }
        let id = self.next_font;
        self.next_font += 1;

        let faces = self.fontfaces();
        let id_str = id.to_string();
        for face in faces {
            self.header.add_element(
                face,
                "hh:font",
                &[("id", &id_str), ("face", name), ("type", "TTF"), ("isEmbedded", "0")],
            );
        }
        log::debug!("font {name:?} appended as {id}");
        self.fonts.insert(name.to_string(), id);
        id
    }

    pub(crate) fn set_section_count(&mut self, count: usize) {
        let root = self.header.root();
        self.header.set_attr(root, "secCnt", count.to_string());
    }

    /// Serialized catalog with `itemCnt`/`fontCnt` matching the entries.
    pub(crate) fn finish(mut self) -> String {
        let root = self.header.root();
        for (container, item) in [
            ("charProperties", "charPr"),
            ("paraProperties", "paraPr"),
            ("fontfaces", "fontface"),
        ] {
            for list in self.header.find_descendants(root, HH_NS, container) {
                let count = self.header.child_elements(list, HH_NS, item).len();
                self.header.set_attr(list, "itemCnt", count.to_string());
            }
        }
        for face in self.header.find_descendants(root, HH_NS, "fontface") {
            let count = self.header.child_elements(face, HH_NS, "font").len();
            self.header.set_attr(face, "fontCnt", count.to_string());
        }
        self.header.to_xml()
    }

    fn ref_list(&mut self) -> NodeId {
        let root = self.header.root();
        match self.header.find_descendant(root, HH_NS, "refList") {
            Some(list) => list,
            None => self.header.add_element(root, "hh:refList", &[]),
        }
    }

    fn container(&mut self, name: &str) -> NodeId {
        let root = self.header.root();
        if let Some(found) = self.header.find_descendant(root, HH_NS, name) {
            return found;
        }
        let ref_list = self.ref_list();
        self.header.add_element(ref_list, &format!("hh:{name}"), &[("itemCnt", "0")])
    }

    fn fontfaces(&mut self) -> Vec<NodeId> {
        let root = self.header.root();
        let faces = self.header.find_descendants(root, HH_NS, "fontface");
        if !faces.is_empty() {
            return faces;
        }
        let ref_list = self.ref_list();
        let list = self.header.create_element("hh:fontfaces", &[("itemCnt", "7")]);
        self.header.insert(ref_list, 0, list);
        FONTFACE_LANGS
            .iter()
            .map(|lang| {
                self.header
                    .add_element(list, "hh:fontface", &[("lang", lang), ("fontCnt", "0")])
            })
            .collect()
    }

    fn append_char_pr(&mut self, signature: &CharSignature) -> u32 {
        let id = self.next_char;
        self.next_char += 1;
        let font = signature
            .font_family
            .as_deref()
            .map_or(0, |name| self.font_id(name))
            .to_string();

        let list = self.container("charProperties");
        let height = signature.font_size.unwrap_or(DEFAULT_FONT_HEIGHT).to_string();
        let tree = &mut self.header;
        let char_pr = tree.add_element(
            list,
            "hh:charPr",
            &[
                ("id", &id.to_string()),
                ("height", &height),
                ("textColor", signature.color.as_deref().unwrap_or(DEFAULT_TEXT_COLOR)),
                ("shadeColor", "none"),
                ("useFontSpace", "0"),
                ("useKerning", "0"),
                ("symMark", "NONE"),
                ("borderFillIDRef", "2"),
            ],
        );
        let per_lang = |value: &str| -> Vec<(&'static str, String)> {
            FONT_LANGS.iter().map(|lang| (*lang, value.to_string())).collect()
        };
        for (name, value) in [
            ("hh:fontRef", font.as_str()),
            ("hh:ratio", "100"),
            ("hh:spacing", "0"),
            ("hh:relSz", "100"),
            ("hh:offset", "0"),
        ] {
            let attrs = per_lang(value);
            let refs: Vec<(&str, &str)> = attrs.iter().map(|(k, v)| (*k, v.as_str())).collect();
            tree.add_element(char_pr, name, &refs);
        }
        if signature.bold {
            tree.add_element(char_pr, "hh:bold", &[]);
        }
        if signature.italic {
            tree.add_element(char_pr, "hh:italic", &[]);
        }
        tree.add_element(
            char_pr,
            "hh:underline",
            &[("type", "NONE"), ("shape", "SOLID"), ("color", DEFAULT_TEXT_COLOR)],
        );
        tree.add_element(char_pr, "hh:strikeout", &[("shape", "NONE"), ("color", DEFAULT_TEXT_COLOR)]);
        tree.add_element(char_pr, "hh:outline", &[("type", "NONE")]);
        tree.add_element(
            char_pr,
            "hh:shadow",
            &[("type", "NONE"), ("color", "#B2B2B2"), ("offsetX", "10"), ("offsetY", "10")],
        );
        log::debug!("charPr {id} appended for {signature:?}");
        id
    }

    fn append_para_pr(&mut self, layout: &ParaLayout) -> u32 {
        let id = self.next_para;
        self.next_para += 1;

        let list = self.container("paraProperties");
        let tree = &mut self.header;
        let para_pr = tree.add_element(
            list,
            "hh:paraPr",
            &[
                ("id", &id.to_string()),
                ("tabPrIDRef", "0"),
                ("condense", "0"),
                ("fontLineHeight", "0"),
                ("snapToGrid", "1"),
                ("suppressLineNumbers", "0"),
                ("checked", "0"),
            ],
        );
        tree.add_element(
            para_pr,
            "hh:align",
            &[("horizontal", layout.alignment.as_hwpx()), ("vertical", "BASELINE")],
        );
        tree.add_element(para_pr, "hh:heading", &[("type", "NONE"), ("idRef", "0"), ("level", "0")]);
        tree.add_element(
            para_pr,
            "hh:breakSetting",
            &[
                ("breakLatinWord", "KEEP_WORD"),
                ("breakNonLatinWord", "KEEP_WORD"),
                ("widowOrphan", "0"),
                ("keepWithNext", "0"),
                ("keepLines", "0"),
                ("pageBreakBefore", "0"),
                ("lineWrap", "BREAK"),
            ],
        );
        tree.add_element(para_pr, "hh:autoSpacing", &[("eAsianEng", "0"), ("eAsianNum", "0")]);
        let margin = tree.add_element(para_pr, "hh:margin", &[]);
        for (name, value) in [
            ("hc:intent", layout.indent_first_line),
            ("hc:left", layout.indent_left),
            ("hc:right", layout.indent_right),
            ("hc:prev", layout.space_before),
            ("hc:next", layout.space_after),
        ] {
            tree.add_element(margin, name, &[("value", &value.to_string()), ("unit", "HWPUNIT")]);
        }
        let spacing_unit = match layout.line_spacing.kind() {
            "PERCENT" => "PERCENT",
            _ => "HWPUNIT",
        };
        tree.add_element(
            para_pr,
            "hh:lineSpacing",
            &[
                ("type", layout.line_spacing.kind()),
                ("value", &layout.line_spacing.value().to_string()),
                ("unit", spacing_unit),
            ],
        );
        tree.add_element(
            para_pr,
            "hh:border",
            &[
                ("borderFillIDRef", "2"),
                ("offsetLeft", "0"),
                ("offsetRight", "0"),
                ("offsetTop", "0"),
                ("offsetBottom", "0"),
                ("connect", "0"),
                ("ignoreMargin", "0"),
            ],
        );
        log::debug!("paraPr {id} appended for {layout:?}");
        id
    }
}
