mod context;
mod list;
pub(crate) mod paragraph;
mod section;
pub(crate) mod shapes;
mod table;

use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::{Error, Result};
use crate::hwpx::{
    self, BINDATA_DIR, CONTENT_HPF_PART, HEADER_PART, MIMETYPE, MIMETYPE_PART, open_archive,
    read_entry_text, section_part,
};
use crate::model::{BinaryItems, Block, BlockContent, CaptionPosition, Document, Section};
use crate::xml::{NodeId, OPF_NS, XmlTree, namespace_declarations};

use context::{IdAllocator, StyleDeduplicator};

/// Where the structural baseline of a written package comes from.
#[derive(Clone, Copy, Debug)]
pub enum Template<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
}

/// State for one write call: the section being built, id counters, the
/// style catalog and the binary items images may reference.
pub(crate) struct WriteContext<'a> {
    tree: XmlTree,
    ids: IdAllocator,
    styles: StyleDeduplicator,
    binaries: &'a BinaryItems,
    caption_numbers: [u32; 3],
}

impl<'a> WriteContext<'a> {
    pub(crate) fn new(header_xml: Option<&str>, binaries: &'a BinaryItems) -> Result<Self> {
        Ok(Self {
            tree: section_root(),
            ids: IdAllocator::new(),
            styles: StyleDeduplicator::new(header_xml)?,
            binaries,
            caption_numbers: [0; 3],
        })
    }

    /// Serializes the document body, one `hs:sec` part per Section block.
    /// Blocks ahead of the first Section join its part; a document without
    /// any Section block gets one, using `default_sec_pr` (the template's
    /// page setup) when given.
    fn write_body(&mut self, doc: &Document, default_sec_pr: Option<String>) -> Result<Vec<String>> {
        let parts = split_sections(&doc.blocks);
        if parts.is_empty() {
            let section = Section {
                raw: default_sec_pr,
                ..Section::default()
            };
            self.tree = section_root();
            let root = self.tree.root();
            section::write_section(self, root, &section, &doc.blocks, false)?;
            return Ok(vec![self.tree.to_xml()]);
        }

        let mut out = Vec::with_capacity(parts.len());
        for part in parts {
            self.tree = section_root();
            let root = self.tree.root();
            for block in part {
                self.write_block(root, block, true)?;
            }
            out.push(self.tree.to_xml());
        }
        Ok(out)
    }

    pub(crate) fn write_block(&mut self, parent: NodeId, block: &Block, top_level: bool) -> Result<()> {
        if let Some(caption) = block.caption.as_ref().filter(|c| c.position == CaptionPosition::Above) {
            list::write_caption(self, parent, caption)?;
        }

        match &block.content {
            BlockContent::Paragraph(p) => {
                paragraph::write_paragraph(self, parent, p, block.page_break)?;
            }
            BlockContent::Table(t) => {
                let run = paragraph::control_paragraph(self, parent, block.page_break);
                table::write_table(self, run, t)?;
            }
            BlockContent::Image(image) => {
                let run = paragraph::control_paragraph(self, parent, block.page_break);
                shapes::write_picture(self, run, image)?;
            }
            BlockContent::Equation(eq) => {
                let run = paragraph::control_paragraph(self, parent, block.page_break);
                shapes::write_equation(self, run, eq);
            }
            BlockContent::Section(s) => {
                if !top_level {
                    return Err(Error::UnsupportedElement(
                        "section block nested inside a table cell".into(),
                    ));
                }
                section::write_section(self, parent, s, &s.blocks, block.page_break)?;
            }
            BlockContent::List(l) => list::write_list(self, parent, l, block.page_break)?,
            BlockContent::Toc(toc) => list::write_toc(self, parent, toc, block.page_break)?,
        }

        if let Some(caption) = block.caption.as_ref().filter(|c| c.position == CaptionPosition::Below) {
            list::write_caption(self, parent, caption)?;
        }
        Ok(())
    }
}

fn section_root() -> XmlTree {
    let decls = namespace_declarations();
    let attrs: Vec<(&str, &str)> = decls.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    XmlTree::new("hs:sec", &attrs)
}

/// Groups top-level blocks by section part. Empty when no block is a
/// Section.
fn split_sections(blocks: &[Block]) -> Vec<&[Block]> {
    let starts: Vec<usize> = blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| matches!(b.content, BlockContent::Section(_)))
        .map(|(i, _)| i)
        .collect();
    let mut parts = Vec::with_capacity(starts.len());
    for (n, _) in starts.iter().enumerate() {
        let from = if n == 0 { 0 } else { starts[n] };
        let to = starts.get(n + 1).copied().unwrap_or(blocks.len());
        parts.push(&blocks[from..to]);
    }
    parts
}

pub fn guess_media_type(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "wmf" => "image/x-wmf",
        "emf" => "image/x-emf",
        "xml" => "application/xml",
        _ => "application/octet-stream",
    }
}

fn qualified(tree: &XmlTree, sibling: NodeId, local: &str) -> String {
    match tree.name(sibling).and_then(|n| n.split_once(':')) {
        Some((prefix, _)) => format!("{prefix}:{local}"),
        None => local.to_string(),
    }
}

/// Lists exactly `binaries` under `BinData/` and exactly `section_count`
/// section parts: stale entries are pruned (with their spine references),
/// existing ones updated and missing ones added.
pub(crate) fn rewrite_manifest(content_hpf: &str, binaries: &BinaryItems, section_count: usize) -> Result<String> {
    let mut tree = XmlTree::parse(content_hpf)?;
    let root = tree.root();
    let manifest = tree
        .find_descendant(root, OPF_NS, "manifest")
        .ok_or_else(|| Error::format(format!("{CONTENT_HPF_PART} has no opf:manifest")))?;
    let item_name = qualified(&tree, manifest, "item");

    sync_section_items(&mut tree, manifest, section_count);

    for item in tree.child_elements(manifest, OPF_NS, "item") {
        let is_bin = tree.attr(item, "href").is_some_and(|h| h.starts_with(BINDATA_DIR));
        let known = tree.attr(item, "id").is_some_and(|id| binaries.contains_key(id));
        if is_bin && !known {
            log::debug!("pruning manifest item {:?}", tree.attr(item, "id"));
            tree.detach(item);
        }
    }

    for binary in binaries.values() {
        let existing = tree
            .child_elements(manifest, OPF_NS, "item")
            .into_iter()
            .find(|&item| tree.attr(item, "id") == Some(binary.id.as_str()));
        let item = match existing {
            Some(item) => item,
            None => tree.add_element(manifest, &item_name, &[("id", &binary.id)]),
        };
        tree.set_attr(item, "href", format!("{BINDATA_DIR}{}", binary.filename));
        tree.set_attr(item, "media-type", guess_media_type(&binary.filename));
        tree.set_attr(item, "isEmbeded", "1");
    }
    Ok(tree.to_xml())
}

fn sync_section_items(tree: &mut XmlTree, manifest: NodeId, section_count: usize) {
    let root = tree.root();
    let spine = tree.find_descendant(root, OPF_NS, "spine");

    let mut stale = Vec::new();
    for item in tree.child_elements(manifest, OPF_NS, "item") {
        let index = tree.attr(item, "href").and_then(hwpx::section_index);
        if index.is_some_and(|k| k >= section_count) {
            stale.push(tree.attr(item, "id").unwrap_or_default().to_string());
            log::debug!("pruning manifest item {:?}", tree.attr(item, "href"));
            tree.detach(item);
        }
    }
    if let Some(spine) = spine {
        for itemref in tree.child_elements(spine, OPF_NS, "itemref") {
            if tree.attr(itemref, "idref").is_some_and(|id| stale.iter().any(|s| s == id)) {
                tree.detach(itemref);
            }
        }
    }

    let item_name = qualified(tree, manifest, "item");
    for k in 0..section_count {
        let href = section_part(k);
        let items = tree.child_elements(manifest, OPF_NS, "item");
        if items.iter().any(|&item| tree.attr(item, "href") == Some(href.as_str())) {
            continue;
        }
        let id = format!("section{k}");
        let previous = items
            .iter()
            .copied()
            .find(|&item| k > 0 && tree.attr(item, "href") == Some(section_part(k - 1).as_str()));
        let item = tree.create_element(
            &item_name,
            &[("id", &id), ("href", &href), ("media-type", "application/xml")],
        );
        let previous_id = previous.and_then(|p| tree.attr(p, "id")).map(str::to_string);
        place_after(tree, manifest, previous, item);

        if let Some(spine) = spine {
            let itemref_name = qualified(tree, spine, "itemref");
            let previous = tree
                .child_elements(spine, OPF_NS, "itemref")
                .into_iter()
                .find(|&r| previous_id.is_some() && tree.attr(r, "idref") == previous_id.as_deref());
            let itemref = tree.create_element(&itemref_name, &[("idref", &id), ("linear", "yes")]);
            place_after(tree, spine, previous, itemref);
        }
    }
}

/// Inserts `node` right after `previous`, or at the end of `parent`.
fn place_after(tree: &mut XmlTree, parent: NodeId, previous: Option<NodeId>, node: NodeId) {
    match previous.and_then(|p| tree.index_in_parent(p)) {
        Some(index) => tree.insert(parent, index + 1, node),
        None => tree.append(parent, node),
    }
}

pub fn write_package(doc: &Document, binaries: &BinaryItems, template: Template) -> Result<Vec<u8>> {
    match template {
        Template::Path(path) => write_from_template(doc, binaries, crate::error::open_file(path)?),
        Template::Bytes(bytes) => write_from_template(doc, binaries, Cursor::new(bytes)),
    }
}

pub fn write_document(doc: &Document, binaries: &BinaryItems, template_path: &Path) -> Result<Vec<u8>> {
    write_package(doc, binaries, Template::Path(template_path))
}

pub fn write_document_with_template_bytes(
    doc: &Document,
    binaries: &BinaryItems,
    template: &[u8],
) -> Result<Vec<u8>> {
    write_package(doc, binaries, Template::Bytes(template))
}

pub fn write_document_to_file(
    doc: &Document,
    binaries: &BinaryItems,
    template_path: &Path,
    output: &Path,
) -> Result<()> {
    let bytes = write_document(doc, binaries, template_path)?;
    std::fs::write(output, bytes)?;
    Ok(())
}

fn write_from_template<R: Read + Seek>(
    doc: &Document,
    binaries: &BinaryItems,
    reader: R,
) -> Result<Vec<u8>> {
    let mut template = open_archive(reader)?;

    let header_xml = read_entry_text(&mut template, HEADER_PART)?;
    if header_xml.is_none() {
        log::warn!("template has no {HEADER_PART}, writing a minimal style catalog");
    }
    let content_hpf = read_entry_text(&mut template, CONTENT_HPF_PART)?
        .ok_or_else(|| Error::format(format!("template has no {CONTENT_HPF_PART}")))?;
    let default_sec_pr = match read_entry_text(&mut template, &section_part(0))? {
        Some(xml) => hwpx::first_sec_pr(&xml)?,
        None => None,
    };

    let mut cx = WriteContext::new(header_xml.as_deref(), binaries)?;
    let section_xmls = cx.write_body(doc, default_sec_pr)?;
    cx.styles.set_section_count(section_xmls.len());
    let header_out = cx.styles.finish();
    let manifest = rewrite_manifest(&content_hpf, binaries, section_xmls.len())?;

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut out = ZipWriter::new(Cursor::new(Vec::new()));

    // mimetype first and uncompressed
    out.start_file(MIMETYPE_PART, stored)?;
    out.write_all(MIMETYPE.as_bytes())?;

    let section_names: Vec<String> = (0..section_xmls.len()).map(section_part).collect();
    let mut replaced: Vec<(&str, &str)> = vec![
        (HEADER_PART, header_out.as_str()),
        (CONTENT_HPF_PART, manifest.as_str()),
    ];
    replaced.extend(
        section_names
            .iter()
            .zip(&section_xmls)
            .map(|(name, xml)| (name.as_str(), xml.as_str())),
    );
    let mut written = vec![false; replaced.len()];
    for i in 0..template.len() {
        let name = template.by_index_raw(i)?.name().to_string();
        if name == MIMETYPE_PART || name.starts_with(BINDATA_DIR) {
            continue;
        }
        if let Some(slot) = replaced.iter().position(|(part, _)| *part == name) {
            out.start_file(name.as_str(), deflated)?;
            out.write_all(replaced[slot].1.as_bytes())?;
            written[slot] = true;
            continue;
        }
        if hwpx::section_index(&name).is_some() {
            log::debug!("dropping template part {name} beyond the written sections");
            continue;
        }
        out.raw_copy_file(template.by_index_raw(i)?)?;
    }
    for (slot, (part, xml)) in replaced.iter().enumerate() {
        if !written[slot] {
            out.start_file(*part, deflated)?;
            out.write_all(xml.as_bytes())?;
        }
    }
    for item in binaries.values() {
        out.start_file(format!("{BINDATA_DIR}{}", item.filename), deflated)?;
        out.write_all(&item.data)?;
    }

    Ok(out.finish()?.into_inner())
}

/// Copies `package` entry by entry in its original order, substituting the
/// content of `part` with `xml`.
pub fn replace_part(package: &[u8], part: &str, xml: &str) -> Result<Vec<u8>> {
    let mut source = open_archive(Cursor::new(package))?;
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut out = ZipWriter::new(Cursor::new(Vec::new()));
    let mut found = false;
    for i in 0..source.len() {
        let entry = source.by_index_raw(i)?;
        if entry.name() == part {
            out.start_file(part, deflated)?;
            out.write_all(xml.as_bytes())?;
            found = true;
        } else {
            out.raw_copy_file(entry)?;
        }
    }
    if !found {
        return Err(Error::format(format!("package has no {part}")));
    }
    Ok(out.finish()?.into_inner())
}
