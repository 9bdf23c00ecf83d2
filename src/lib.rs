pub mod builder;
mod error;
pub mod hwpx;
pub mod model;
pub mod query;
pub mod units;
pub mod writer;
pub mod xml;

pub use builder::{ExtractedContent, build_document};
pub use error::{Error, Result};
pub use hwpx::{Package, parse_package, read_document, read_document_bytes, read_package, read_package_bytes};
pub use model::{BinaryItem, BinaryItems, Block, BlockContent, Document};
pub use query::{Editor, Searcher};
pub use writer::{
    Template, guess_media_type, write_document, write_document_to_file, write_document_with_template_bytes,
    write_package,
};

use std::io::Read;
use std::path::Path;
use std::time::Instant;

fn log_timing(stage: &str, t_stage: std::time::Duration, t_total: std::time::Duration, bytes: usize) {
    log::info!(
        "Timing: {stage}={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_stage.as_secs_f64() * 1000.0,
        (t_total - t_stage).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes,
    );
}

/// Reads `input` into the IR and writes it back out. The input itself is
/// the template unless another one is given.
pub fn rewrite_hwpx(input: &Path, output: &Path, template: Option<&Path>) -> Result<()> {
    let t0 = Instant::now();

    let package = read_package(input)?;
    let doc = parse_package(&package)?;
    let t_read = t0.elapsed();

    let bytes = write_document(&doc, &package.binary_items, template.unwrap_or(input))?;
    std::fs::write(output, &bytes)?;
    log_timing("read", t_read, t0.elapsed(), bytes.len());

    Ok(())
}

/// Builds a document from extracted page content and writes it using
/// `template` as the package baseline.
pub fn convert_extracted(
    content: &ExtractedContent,
    binaries: &BinaryItems,
    template: &Path,
    output: &Path,
) -> Result<()> {
    let t0 = Instant::now();

    let doc = build_document(content);
    let t_build = t0.elapsed();

    let bytes = write_document(&doc, binaries, template)?;
    std::fs::write(output, &bytes)?;
    log_timing("build", t_build, t0.elapsed(), bytes.len());

    Ok(())
}

/// Replaces text in the first section of `input` and saves the result to
/// `output`. Every other package entry is copied unchanged. Returns the
/// number of replacements.
pub fn replace_text_in_hwpx(
    input: &Path,
    output: &Path,
    old: &str,
    new: &str,
    max: Option<usize>,
) -> Result<usize> {
    let t0 = Instant::now();

    let mut source = Vec::new();
    error::open_file(input)?.read_to_end(&mut source)?;
    let package = read_package_bytes(&source)?;
    let (part, xml) = package
        .sections
        .first()
        .ok_or_else(|| Error::Format("package has no section parts".into()))?;
    let mut editor = Editor::parse(xml)?;
    let count = editor.replace_text(old, new, max);
    let t_read = t0.elapsed();

    let bytes = if editor.is_modified() {
        writer::replace_part(&source, part, &editor.to_xml())?
    } else {
        source
    };
    std::fs::write(output, &bytes)?;
    log_timing("read", t_read, t0.elapsed(), bytes.len());

    Ok(count)
}
