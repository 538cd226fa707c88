// File: ./src/document.rs
// Loads plain text out of uploaded documents.
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use zip::ZipArchive;

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unsupported document type: {0}")]
    UnsupportedType(String),
    #[error("not a Word document: {0}")]
    MalformedDocx(String),
}

/// Text content of a `.txt` or `.docx` file.
pub fn load_text(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "txt" | "text" | "md" => read_plain(path),
        "docx" => read_docx(path),
        other => Err(DocumentError::UnsupportedType(if other.is_empty() {
            path.display().to_string()
        } else {
            format!(".{other}")
        })
        .into()),
    }
}

/// UTF-8 first, then Latin-1 (every byte is a code point) so that legacy
/// files still load.
fn read_plain(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    Ok(match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    })
}

fn read_docx(path: &Path) -> Result<String> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| DocumentError::MalformedDocx(format!("{}: {}", path.display(), e)))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| DocumentError::MalformedDocx(format!("{}: {}", path.display(), e)))?
        .read_to_string(&mut xml)?;
    docx_xml_to_text(&xml)
}

/// One line per `w:p`, runs concatenated, `w:tab` as a tab.
pub fn docx_xml_to_text(xml: &str) -> Result<String> {
    let doc = roxmltree::Document::parse(xml).context("Invalid document.xml")?;
    let mut out = String::new();
    for para in doc
        .descendants()
        .filter(|n| n.has_tag_name((WORD_NS, "p")))
    {
        for node in para.descendants() {
            if node.has_tag_name((WORD_NS, "t")) {
                out.push_str(node.text().unwrap_or_default());
            } else if node.has_tag_name((WORD_NS, "tab")) {
                out.push('\t');
            } else if node.has_tag_name((WORD_NS, "br")) {
                out.push('\n');
            }
        }
        out.push('\n');
    }
    Ok(out)
}
