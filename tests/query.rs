mod common;

use common::*;
use hwpx_ir::query::BreakKind;
use hwpx_ir::{Editor, Searcher, read_package_bytes, replace_text_in_hwpx};

fn body() -> String {
    [
        anchor_paragraph("Quarterly report"),
        paragraph(1, "Revenue grew in the first quarter."),
        table_paragraph(2, &["Region", "Revenue"]),
        paragraph_with(3, "Appendix: revenue by month", true),
        picture_paragraph(4, "image1"),
    ]
    .concat()
}

fn package() -> Vec<u8> {
    Fixture::new(&body()).with_image("image1", "image1.png").build()
}

fn section0(package: &[u8]) -> String {
    entry_text(package, "Contents/section0.xml").unwrap()
}

#[test]
fn searcher_over_a_package() {
    let searcher = Searcher::parse(&section0(&package())).unwrap();

    // Top-level paragraphs plus the two paragraphs inside the table cells.
    assert_eq!(searcher.paragraph_count(), 7);
    assert_eq!(searcher.get_page_count_estimate(), 2);

    let breaks = searcher.find_page_breaks();
    assert_eq!(breaks.len(), 1);
    assert_eq!(breaks[0].kind, BreakKind::Page);
    assert_eq!(breaks[0].paragraph_id, "3");
    assert!(breaks[0].text_preview.starts_with("Appendix"));

    let hits = searcher.search("revenue", false);
    let hit_ids: Vec<&str> = hits.iter().map(|h| h.paragraph_id.as_str()).collect();
    assert_eq!(hit_ids, ["1", "101", "3"]);
    let appendix = hits.last().unwrap();
    assert_eq!(appendix.page_estimate, 2);
    assert_eq!(&appendix.text[appendix.match_start..appendix.match_end], "revenue");

    assert_eq!(searcher.search("revenue", true).len(), 1);

    let tables = searcher.get_tables_info();
    assert_eq!(tables.len(), 1);
    assert_eq!((tables[0].rows, tables[0].cols), (1, 2));
    assert_eq!(tables[0].text_preview, "Region Revenue");

    let images = searcher.get_images_info();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].binary_ref, "image1");
    assert_eq!((images[0].width, images[0].height), (3000, 2000));

    assert!(searcher.get_text_by_page(2).contains("Appendix"));
    assert!(!searcher.get_text_by_page(1).contains("Appendix"));
}

#[test]
fn editor_changes_survive_a_reparse() {
    let xml = section0(&package());
    let mut editor = Editor::parse(&xml).unwrap();
    assert_eq!(editor.paragraph_count(), 5);

    assert!(editor.insert_paragraph_after(1, "Inserted note", 0, 0));
    assert!(editor.set_page_break(2, true));
    assert!(editor.delete_paragraph(5));
    assert_eq!(editor.replace_text("quarter", "half", None), 1);
    assert!(editor.is_modified());

    let searcher = Searcher::parse(&editor.to_xml()).unwrap();
    assert_eq!(searcher.get_page_count_estimate(), 3);
    let text = searcher.get_all_text();
    assert!(text.contains("Inserted note"));
    assert!(text.contains("first half."));
    assert!(text.contains("Quarterly report"));
    assert!(searcher.get_images_info().is_empty());

    let reparsed = Editor::parse(&editor.to_xml()).unwrap();
    assert_eq!(reparsed.paragraph_count(), 5);
    assert_eq!(reparsed.paragraph_text(2).as_deref(), Some("Inserted note"));
}

#[test]
fn replace_in_file_rewrites_only_the_section() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.hwpx");
    let output = dir.path().join("out.hwpx");
    let source = package();
    std::fs::write(&input, &source).unwrap();

    let count = replace_text_in_hwpx(&input, &output, "Revenue", "Income", Some(1)).unwrap();
    assert_eq!(count, 1);

    let written = std::fs::read(&output).unwrap();
    let before = entries(&source);
    let after = entries(&written);
    let names = |list: &[(String, zip::CompressionMethod, Vec<u8>)]| -> Vec<String> {
        list.iter().map(|(n, _, _)| n.clone()).collect()
    };
    assert_eq!(names(&before), names(&after));
    for ((name, _, old), (_, _, new)) in before.iter().zip(&after) {
        if name == "Contents/section0.xml" {
            assert_ne!(old, new);
        } else {
            assert_eq!(old, new, "{name} changed");
        }
    }

    let package = read_package_bytes(&written).unwrap();
    let searcher = Searcher::parse(&package.sections[0].1).unwrap();
    assert_eq!(searcher.search("Income", true).len(), 1);
    assert_eq!(searcher.search("Revenue", true).len(), 1);
}

#[test]
fn replace_without_match_copies_the_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.hwpx");
    let output = dir.path().join("out.hwpx");
    let source = package();
    std::fs::write(&input, &source).unwrap();

    assert_eq!(replace_text_in_hwpx(&input, &output, "absent", "x", None).unwrap(), 0);
    assert_eq!(std::fs::read(&output).unwrap(), source);
}

#[test]
fn replace_on_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = replace_text_in_hwpx(
        &dir.path().join("nope.hwpx"),
        &dir.path().join("out.hwpx"),
        "a",
        "b",
        None,
    )
    .unwrap_err();
    assert!(matches!(err, hwpx_ir::Error::Io(_)), "{err}");
}
