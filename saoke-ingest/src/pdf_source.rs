//! Pluggable PDF text extraction.
//!
//! The geometric reconstruction in [`crate::table`] only needs positioned
//! text runs, so the PDF library sits behind a trait and tests feed the
//! detector synthetic elements instead of real documents.

use lopdf::content::Content;
use lopdf::{Document, Object};

use crate::error::IngestError;
use crate::table::TextElement;

const DEFAULT_PAGE_HEIGHT: f32 = 842.0; // A4 points

/// "Given bytes, return positioned text runs."
pub trait PdfTextSource: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<Vec<TextElement>, IngestError>;
}

/// lopdf-backed extraction: walks each page's content stream tracking the
/// text cursor, and normalizes y so it grows down the page (pages stack).
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfTextSource;

impl PdfTextSource for LopdfTextSource {
    fn extract(&self, bytes: &[u8]) -> Result<Vec<TextElement>, IngestError> {
        let mut doc = Document::load_mem(bytes)
            .map_err(|e| IngestError::UnreadableDocument(e.to_string()))?;

        if doc.is_encrypted() {
            // One retry with an empty password before giving up
            tracing::debug!("pdf is encrypted, attempting empty-password decrypt");
            doc.decrypt("").map_err(|e| {
                IngestError::UnreadableDocument(format!("password-protected pdf: {e}"))
            })?;
        }

        let mut elements = Vec::new();
        let mut page_offset = 0.0f32;

        for (_, page_id) in doc.get_pages() {
            let height = page_height(&doc, page_id);
            let data = doc
                .get_page_content(page_id)
                .map_err(|e| IngestError::UnreadableDocument(e.to_string()))?;
            let content = Content::decode(&data)
                .map_err(|e| IngestError::UnreadableDocument(e.to_string()))?;

            collect_page_text(&content, height, page_offset, &mut elements);
            page_offset += height;
        }

        if elements.is_empty() {
            return Err(IngestError::NoExtractableText);
        }
        tracing::debug!(elements = elements.len(), "extracted positioned text");
        Ok(elements)
    }
}

/// Interpret the text-positioning subset of the content stream. Only the
/// translation part of Tm is tracked, which is enough for statement PDFs
/// (no rotated or scaled text).
fn collect_page_text(
    content: &Content,
    page_height: f32,
    page_offset: f32,
    out: &mut Vec<TextElement>,
) {
    let mut x = 0.0f32;
    let mut y = 0.0f32;
    let mut font_size = 0.0f32;
    let mut leading = 0.0f32;

    for op in &content.operations {
        let operands = &op.operands;
        match op.operator.as_str() {
            "BT" => {
                x = 0.0;
                y = 0.0;
            }
            "Tf" => {
                if let Some(size) = operands.get(1).and_then(object_to_f32) {
                    font_size = size;
                }
            }
            "TL" => {
                if let Some(l) = operands.first().and_then(object_to_f32) {
                    leading = l;
                }
            }
            "Tm" => {
                if let (Some(e), Some(f)) = (
                    operands.get(4).and_then(object_to_f32),
                    operands.get(5).and_then(object_to_f32),
                ) {
                    x = e;
                    y = f;
                }
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (
                    operands.first().and_then(object_to_f32),
                    operands.get(1).and_then(object_to_f32),
                ) {
                    if op.operator == "TD" {
                        leading = -ty;
                    }
                    x += tx;
                    y += ty;
                }
            }
            "T*" => y -= leading,
            "Tj" => {
                if let Some(text) = operands.first().and_then(object_to_text) {
                    push_element(out, x, y, page_height, page_offset, font_size, text);
                }
            }
            "'" => {
                y -= leading;
                if let Some(text) = operands.first().and_then(object_to_text) {
                    push_element(out, x, y, page_height, page_offset, font_size, text);
                }
            }
            "\"" => {
                y -= leading;
                if let Some(text) = operands.get(2).and_then(object_to_text) {
                    push_element(out, x, y, page_height, page_offset, font_size, text);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let text: String = items.iter().filter_map(object_to_text).collect();
                    push_element(out, x, y, page_height, page_offset, font_size, text);
                }
            }
            _ => {}
        }
    }
}

fn push_element(
    out: &mut Vec<TextElement>,
    x: f32,
    y: f32,
    page_height: f32,
    page_offset: f32,
    font_size: f32,
    text: String,
) {
    let text = text.trim().to_string();
    if text.is_empty() {
        return;
    }
    out.push(TextElement {
        x,
        // PDF y grows up the page; TextElement y grows down the document
        y: page_offset + (page_height - y),
        text,
        font_size,
    });
}

fn page_height(doc: &Document, page_id: lopdf::ObjectId) -> f32 {
    doc.get_dictionary(page_id)
        .ok()
        .and_then(|dict| dict.get(b"MediaBox").ok())
        .and_then(|media_box| media_box.as_array().ok())
        .and_then(|values| values.get(3))
        .and_then(object_to_f32)
        .unwrap_or(DEFAULT_PAGE_HEIGHT)
}

fn object_to_f32(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Decode a PDF string object: UTF-16BE when BOM-prefixed, otherwise
/// byte-per-char (Latin-1 superset), which covers statement PDFs without
/// per-font CMap handling.
fn object_to_text(object: &Object) -> Option<String> {
    let Object::String(bytes, _) = object else {
        return None;
    };
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return Some(String::from_utf16_lossy(&utf16));
    }
    Some(bytes.iter().map(|&b| b as char).collect())
}
