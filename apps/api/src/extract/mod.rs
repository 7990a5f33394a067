//! Plain-text extraction from uploaded resume files.
//!
//! PDF goes through `pdf-extract`; DOCX is read straight out of
//! `word/document.xml` with `zip` + `quick-xml`, one line per paragraph.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::errors::AppError;

const DOCUMENT_XML: &str = "word/document.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractFormat {
    Pdf,
    Docx,
}

impl ExtractFormat {
    /// Picks the format from a file name's extension.
    pub fn from_filename(filename: &str) -> Result<Self, AppError> {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(ExtractFormat::Pdf),
            "docx" => Ok(ExtractFormat::Docx),
            _ => Err(AppError::UnsupportedFormat(format!(
                "'{filename}' is not a PDF or DOCX file"
            ))),
        }
    }
}

/// Extracts plain text. CPU-bound; async callers use `extract_text_blocking`.
pub fn extract_text(bytes: &[u8], format: ExtractFormat) -> Result<String, AppError> {
    let text = match format {
        ExtractFormat::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::Validation(format!("Could not read PDF: {e}")))?,
        ExtractFormat::Docx => docx_text(bytes)?,
    };
    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "No text could be extracted from the uploaded file".to_string(),
        ));
    }
    Ok(text)
}

pub async fn extract_text_blocking(bytes: Vec<u8>, format: ExtractFormat) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || extract_text(&bytes, format))
        .await
        .map_err(|e| {
            // pdf-extract panics on some malformed files.
            if e.is_panic() {
                AppError::Validation("The uploaded file could not be read".to_string())
            } else {
                AppError::Internal(anyhow::anyhow!("extraction task failed: {e}"))
            }
        })?
}

fn docx_text(bytes: &[u8]) -> Result<String, AppError> {
    let unreadable = |e: String| AppError::Validation(format!("Could not read DOCX: {e}"));

    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| unreadable(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_XML)
        .map_err(|e| unreadable(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| unreadable(e.to_string()))?;

    paragraphs_from_xml(&xml).map_err(unreadable)
}

/// Text of every `w:p`, joined with newlines. Empty paragraphs are dropped.
fn paragraphs_from_xml(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:p" => current.clear(),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" => current.push(' '),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e.unescape().map_err(|e| e.to_string())?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    let line = current.trim();
                    if !line.is_empty() {
                        paragraphs.push(line.to_string());
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n"))
}
