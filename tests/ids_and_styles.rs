mod common;

use std::collections::HashSet;

use common::*;
use hwpx_ir::model::{
    Alignment, BinaryItem, BinaryItems, Equation, Image, Inline, Paragraph, Table, TableCell, TextRun,
};
use hwpx_ir::{Document, Error, write_document_with_template_bytes};

fn bold(text: &str) -> Inline {
    Inline::Text(TextRun {
        bold: true,
        ..TextRun::new(text)
    })
}

fn sample_doc() -> Document {
    let table = Table {
        row_cnt: 2,
        col_cnt: 2,
        cells: vec![
            TableCell::with_text(0, 0, "a"),
            TableCell::with_text(0, 1, "b"),
            TableCell::with_text(1, 0, "c"),
            TableCell::with_text(1, 1, "d"),
        ],
        ..Table::default()
    };
    Document {
        blocks: vec![
            Paragraph {
                inlines: vec![bold("bold one")],
                ..Paragraph::default()
            }
            .into(),
            Paragraph::from_text("plain").into(),
            Paragraph {
                inlines: vec![bold("bold two")],
                alignment: Alignment::Center,
                ..Paragraph::default()
            }
            .into(),
            table.clone().into(),
            Image {
                width: Some(3000),
                height: Some(2000),
                ..Image::new("image1")
            }
            .into(),
            Equation::new("a over b").into(),
            table.into(),
        ],
    }
}

fn binaries() -> BinaryItems {
    let mut items = BinaryItems::new();
    items.insert(
        "image1".to_string(),
        BinaryItem::new("image1", "image1.png", PNG_BYTES.to_vec()),
    );
    items
}

fn written_section() -> (String, String) {
    let template = Fixture::new(&anchor_paragraph("")).build();
    let out = write_document_with_template_bytes(&sample_doc(), &binaries(), &template).unwrap();
    (
        entry_text(&out, "Contents/section0.xml").unwrap(),
        entry_text(&out, "Contents/header.xml").unwrap(),
    )
}

/// `(text, charPrIDRef)` of every run holding text.
fn text_runs(section: &str) -> Vec<(String, String)> {
    let doc = roxmltree::Document::parse(section).unwrap();
    doc.descendants()
        .filter(|n| n.tag_name().name() == "run")
        .filter_map(|run| {
            let text: String = run
                .children()
                .filter(|c| c.tag_name().name() == "t")
                .flat_map(|t| t.descendants().filter(|n| n.is_text()))
                .filter_map(|n| n.text())
                .collect();
            (!text.is_empty()).then(|| (text, run.attribute("charPrIDRef").unwrap_or("").to_string()))
        })
        .collect()
}

fn assert_unique(ids: &[String], what: &str) {
    let set: HashSet<&String> = ids.iter().collect();
    assert_eq!(set.len(), ids.len(), "duplicate {what} ids: {ids:?}");
}

#[test]
fn element_ids_are_unique_per_kind() {
    init_logging();
    let (section, _) = written_section();

    let paragraphs = attr_values(&section, "p", "id");
    assert!(paragraphs.len() >= 12, "{paragraphs:?}");
    assert_unique(&paragraphs, "paragraph");

    let tables = attr_values(&section, "tbl", "id");
    assert_eq!(tables.len(), 2);
    assert_unique(&tables, "table");

    let mut shapes = attr_values(&section, "pic", "id");
    shapes.extend(attr_values(&section, "equation", "id"));
    assert_eq!(shapes.len(), 2);
    assert_unique(&shapes, "picture");
    for id in &shapes {
        assert!(id.parse::<u32>().unwrap() >= 2_000_000_000, "{id}");
    }
}

#[test]
fn identical_formatting_shares_one_char_pr() {
    let (section, _) = written_section();
    let runs = text_runs(&section);
    let id_of = |text: &str| {
        runs.iter()
            .find(|(t, _)| t == text)
            .map(|(_, id)| id.clone())
            .unwrap_or_else(|| panic!("no run {text:?} in {runs:?}"))
    };

    assert_eq!(id_of("plain"), "0");
    assert_eq!(id_of("a"), "0");
    assert_eq!(id_of("bold one"), id_of("bold two"));
    assert_ne!(id_of("bold one"), "0");
}

#[test]
fn catalog_counts_match_entries() {
    let (_, header) = written_section();
    let doc = roxmltree::Document::parse(&header).unwrap();
    for (container, item) in [("charProperties", "charPr"), ("paraProperties", "paraPr")] {
        let list = doc
            .descendants()
            .find(|n| n.tag_name().name() == container)
            .unwrap();
        let count = list.children().filter(|n| n.tag_name().name() == item).count();
        assert_eq!(list.attribute("itemCnt"), Some(count.to_string().as_str()), "{container}");
    }

    let para_prs = attr_values(&header, "paraPr", "id");
    assert_unique(&para_prs, "paraPr");
    let char_prs = attr_values(&header, "charPr", "id");
    assert_unique(&char_prs, "charPr");
    assert!(char_prs.iter().any(|id| id == "0"));
}

#[test]
fn non_default_layout_gets_its_own_para_pr() {
    let (section, header) = written_section();
    let doc = roxmltree::Document::parse(&section).unwrap();
    let centered = doc
        .descendants()
        .filter(|n| n.tag_name().name() == "p")
        .find(|p| {
            p.descendants()
                .any(|n| n.is_text() && n.text() == Some("bold two"))
        })
        .unwrap();
    let para_pr = centered.attribute("paraPrIDRef").unwrap();
    assert_ne!(para_pr, "0");
    assert!(attr_values(&header, "paraPr", "id").iter().any(|id| id == para_pr));
    assert!(header.contains(r#"horizontal="CENTER""#));
}

#[test]
fn image_without_binary_is_a_missing_asset() {
    let template = Fixture::new(&anchor_paragraph("")).build();
    let doc = Document {
        blocks: vec![Image::new("ghost").into()],
    };
    let err = write_document_with_template_bytes(&doc, &BinaryItems::new(), &template).unwrap_err();
    assert!(matches!(err, Error::MissingAsset(ref id) if id == "ghost"), "{err}");
}

#[test]
fn overlapping_table_is_rejected() {
    let template = Fixture::new(&anchor_paragraph("")).build();
    let table = Table {
        row_cnt: 1,
        col_cnt: 2,
        cells: vec![
            TableCell {
                col_span: 2,
                ..TableCell::with_text(0, 0, "wide")
            },
            TableCell::with_text(0, 1, "clash"),
        ],
        ..Table::default()
    };
    let doc = Document {
        blocks: vec![table.into()],
    };
    let err = write_document_with_template_bytes(&doc, &BinaryItems::new(), &template).unwrap_err();
    assert!(matches!(err, Error::Format(_)), "{err}");
}
