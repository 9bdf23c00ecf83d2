mod common;

use common::*;
use hwpx_ir::model::{BinaryItem, BinaryItems, Image, Paragraph};
use hwpx_ir::{Document, Error, write_document_with_template_bytes};
use zip::CompressionMethod;

fn doc_with_image(id: &str) -> Document {
    Document {
        blocks: vec![Paragraph::from_text("caption").into(), Image::new(id).into()],
    }
}

fn binaries(items: &[(&str, &str)]) -> BinaryItems {
    items
        .iter()
        .map(|(id, file)| {
            (
                id.to_string(),
                BinaryItem::new(*id, *file, format!("data of {file}").into_bytes()),
            )
        })
        .collect()
}

/// `(id, href, media-type)` of every manifest item.
fn manifest_items(package: &[u8]) -> Vec<(String, String, String)> {
    let hpf = entry_text(package, "Contents/content.hpf").unwrap();
    let doc = roxmltree::Document::parse(&hpf).unwrap();
    doc.descendants()
        .filter(|n| n.tag_name().name() == "item")
        .map(|n| {
            let attr = |name: &str| n.attribute(name).unwrap_or("").to_string();
            (attr("id"), attr("href"), attr("media-type"))
        })
        .collect()
}

fn bin_entries(package: &[u8]) -> Vec<String> {
    let mut names: Vec<String> = entries(package)
        .into_iter()
        .map(|(name, _, _)| name)
        .filter(|name| name.starts_with("BinData/"))
        .collect();
    names.sort();
    names
}

#[test]
fn manifest_lists_exactly_the_supplied_binaries() {
    init_logging();
    let template = Fixture::new(&anchor_paragraph(""))
        .with_image("image1", "image1.png")
        .with_image("image2", "image2.png")
        .build();
    let items = binaries(&[("image2", "image2.png"), ("image3", "image3.gif")]);
    let out = write_document_with_template_bytes(&doc_with_image("image3"), &items, &template).unwrap();

    let manifest = manifest_items(&out);
    let ids: Vec<&str> = manifest.iter().map(|(id, _, _)| id.as_str()).collect();
    assert!(ids.contains(&"header") && ids.contains(&"section0"));
    assert!(!ids.contains(&"image1"));
    let image3 = manifest.iter().find(|(id, _, _)| id == "image3").unwrap();
    assert_eq!(image3.1, "BinData/image3.gif");
    assert_eq!(image3.2, "image/gif");
    assert_eq!(ids.iter().filter(|id| **id == "image2").count(), 1);

    assert_eq!(bin_entries(&out), ["BinData/image2.png", "BinData/image3.gif"]);
    assert_eq!(
        entry_text(&out, "BinData/image3.gif").as_deref(),
        Some("data of image3.gif")
    );

    let hpf = entry_text(&out, "Contents/content.hpf").unwrap();
    assert!(hpf.contains("<opf:title>fixture</opf:title>"));
    assert_eq!(attr_values(&hpf, "item", "isEmbeded").len(), 2);
}

#[test]
fn mimetype_is_first_and_stored() {
    let template = Fixture::new(&anchor_paragraph("")).build();
    let out = write_document_with_template_bytes(&Document::default(), &BinaryItems::new(), &template).unwrap();
    let all = entries(&out);
    let (name, method, data) = &all[0];
    assert_eq!(name, "mimetype");
    assert_eq!(*method, CompressionMethod::Stored);
    assert_eq!(data, b"application/hwp+zip");
    assert_eq!(all.iter().filter(|(n, _, _)| n == "mimetype").count(), 1);
}

#[test]
fn template_without_content_hpf_is_a_format_error() {
    let mut fixture = Fixture::new(&anchor_paragraph(""));
    fixture.content_hpf = None;
    let items = binaries(&[("image1", "image1.png")]);
    let err = write_document_with_template_bytes(&doc_with_image("image1"), &items, &fixture.build()).unwrap_err();
    assert!(matches!(err, Error::Format(_)), "{err}");
}

#[test]
fn template_without_header_gets_a_minimal_catalog() {
    let mut fixture = Fixture::new(&anchor_paragraph(""));
    fixture.header = None;
    let template = fixture.build();

    let items = binaries(&[("image1", "image1.png")]);
    let out = write_document_with_template_bytes(&doc_with_image("image1"), &items, &template).unwrap();

    let manifest = manifest_items(&out);
    assert!(manifest.iter().any(|(id, href, _)| id == "image1" && href == "BinData/image1.png"));
    let header = entry_text(&out, "Contents/header.xml").unwrap();
    assert!(header.contains("charPr"));

    let doc = hwpx_ir::read_document_bytes(&out).unwrap();
    assert!(!doc.blocks.is_empty());
}

#[test]
fn content_without_manifest_node_is_a_format_error() {
    let mut fixture = Fixture::new(&anchor_paragraph(""));
    fixture.content_hpf = Some(format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><opf:package xmlns:opf="{}"><opf:metadata/></opf:package>"#,
        hwpx_ir::xml::OPF_NS
    ));
    let err =
        write_document_with_template_bytes(&Document::default(), &BinaryItems::new(), &fixture.build()).unwrap_err();
    assert!(matches!(err, Error::Format(_)), "{err}");
}

#[test]
fn written_package_can_be_saved_and_reopened() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("template.hwpx");
    let output_path = dir.path().join("out.hwpx");
    std::fs::write(&template_path, Fixture::new(&anchor_paragraph("")).build()).unwrap();

    let doc = Document {
        blocks: vec![Paragraph::from_text("saved").into()],
    };
    hwpx_ir::write_document_to_file(&doc, &BinaryItems::new(), &template_path, &output_path).unwrap();

    let reread = hwpx_ir::read_document(&output_path).unwrap();
    let searcher_text = {
        let package = hwpx_ir::read_package(&output_path).unwrap();
        hwpx_ir::Searcher::parse(&package.sections[0].1).unwrap().get_all_text()
    };
    assert_eq!(reread.blocks.len(), 1);
    assert_eq!(searcher_text, "saved");
}
