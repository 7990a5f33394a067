//! Paginated-stream backend (PDF via `printpdf`).
//!
//! Two stages: `paginate` turns the block stream into positioned lines on A4
//! pages (pure, deterministic, unit-tested), then `write_pdf` emits them with
//! the Helvetica base fonts.
//!
//! Styling: section headings are bold, uppercase and underlined at 12pt; entry
//! lines are bold 10pt; body text is 9pt; bullets sit 15pt in from the margin.

use std::io::BufWriter;

use printpdf::{BuiltinFont, Line, Mm, PdfDocument, Point};

use crate::document::SectionId;
use crate::errors::AppError;
use crate::render::blocks::{Block, SectionBlocks};
use crate::render::font_metrics::{get_metrics, PdfFont};

const PAGE_WIDTH_PT: f32 = 595.28;
const PAGE_HEIGHT_PT: f32 = 841.89;
const MARGIN_Y_PT: f32 = 50.0;
const MARGIN_X_PT: f32 = 55.0;
const CONTENT_WIDTH_PT: f32 = PAGE_WIDTH_PT - 2.0 * MARGIN_X_PT;

const HEADING_SIZE_PT: f32 = 12.0;
const LABEL_SIZE_PT: f32 = 10.0;
const BODY_SIZE_PT: f32 = 9.0;
const LINE_HEIGHT: f32 = 1.3;

const BULLET_INDENT_PT: f32 = 15.0;
const BULLET_PREFIX: &str = "• ";
const SPACE_BEFORE_HEADING_PT: f32 = 8.0;
const SPACE_AFTER_HEADING_PT: f32 = 3.0;
const SPACE_BEFORE_ENTRY_PT: f32 = 3.0;
const UNDERLINE_OFFSET_PT: f32 = 1.8;

const PT_TO_MM: f32 = 0.352_778;

// ────────────────────────────────────────────────────────────────────────────
// Layout model
// ────────────────────────────────────────────────────────────────────────────

/// One line of text at a fixed position. Coordinates are points from the
/// bottom-left corner, as PDF expects.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub font: PdfFont,
    pub size_pt: f32,
    pub x_pt: f32,
    pub baseline_pt: f32,
    pub underline: bool,
    /// Set on section heading lines only.
    pub section: Option<SectionId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfPage {
    pub lines: Vec<PlacedLine>,
}

/// A line waiting for placement, with the vertical gap it wants above it.
struct PendingLine {
    text: String,
    font: PdfFont,
    size_pt: f32,
    x_pt: f32,
    space_before_pt: f32,
    underline: bool,
    section: Option<SectionId>,
    /// Heading lines must not be the last line on a page.
    keep_with_next: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Pagination
// ────────────────────────────────────────────────────────────────────────────

/// Lays out the section stream on as many pages as needed. Always returns at
/// least one page.
pub fn paginate(sections: &[SectionBlocks]) -> Vec<PdfPage> {
    let pending = flow_lines(sections);

    let mut pages = vec![PdfPage::default()];
    // Distance from the top edge to the top of the next line.
    let mut cursor = MARGIN_Y_PT;
    let bottom_limit = PAGE_HEIGHT_PT - MARGIN_Y_PT;

    for (i, line) in pending.iter().enumerate() {
        let at_page_top = pages.last().map_or(true, |p| p.lines.is_empty());
        let gap = if at_page_top { 0.0 } else { line.space_before_pt };
        let height = line.size_pt * LINE_HEIGHT;

        let mut needed = gap + height;
        if line.keep_with_next {
            if let Some(next) = pending.get(i + 1) {
                needed += next.space_before_pt + next.size_pt * LINE_HEIGHT;
            }
        }

        let mut top = cursor + gap;
        if !at_page_top && cursor + needed > bottom_limit {
            pages.push(PdfPage::default());
            top = MARGIN_Y_PT;
        }

        let baseline_from_top = top + line.size_pt;
        if let Some(page) = pages.last_mut() {
            page.lines.push(PlacedLine {
                text: line.text.clone(),
                font: line.font,
                size_pt: line.size_pt,
                x_pt: line.x_pt,
                baseline_pt: PAGE_HEIGHT_PT - baseline_from_top,
                underline: line.underline,
                section: line.section,
            });
        }
        cursor = top + height;
    }

    pages
}

/// Converts blocks into wrapped, styled lines in reading order.
fn flow_lines(sections: &[SectionBlocks]) -> Vec<PendingLine> {
    let mut out = Vec::new();

    for section in sections {
        let mut heading_idx = None;
        for block in &section.blocks {
            match block {
                Block::Heading(text) => {
                    heading_idx = Some(out.len());
                    out.push(PendingLine {
                    text: text.to_uppercase(),
                    font: PdfFont::HelveticaBold,
                    size_pt: HEADING_SIZE_PT,
                    x_pt: MARGIN_X_PT,
                    space_before_pt: SPACE_BEFORE_HEADING_PT,
                    underline: true,
                    section: Some(section.section),
                    keep_with_next: true,
                    })
                }
                Block::KeyValueLine(text) => push_wrapped(
                    &mut out,
                    text,
                    PdfFont::HelveticaBold,
                    LABEL_SIZE_PT,
                    MARGIN_X_PT,
                    SPACE_BEFORE_ENTRY_PT,
                ),
                Block::Paragraph(text) => {
                    push_wrapped(&mut out, text, PdfFont::Helvetica, BODY_SIZE_PT, MARGIN_X_PT, 0.0)
                }
                Block::BulletList(items) => {
                    for item in items {
                        push_bullet(&mut out, item);
                    }
                }
            }
        }
        // The first line under a heading sits close to it.
        if let Some(next) = heading_idx.and_then(|idx| out.get_mut(idx + 1)) {
            next.space_before_pt = SPACE_AFTER_HEADING_PT;
        }
    }
    out
}

fn push_wrapped(
    out: &mut Vec<PendingLine>,
    text: &str,
    font: PdfFont,
    size_pt: f32,
    x_pt: f32,
    space_before_pt: f32,
) {
    let width = CONTENT_WIDTH_PT - (x_pt - MARGIN_X_PT);
    for (i, line) in get_metrics(font).wrap(text, size_pt, width).into_iter().enumerate() {
        out.push(PendingLine {
            text: line,
            font,
            size_pt,
            x_pt,
            space_before_pt: if i == 0 { space_before_pt } else { 0.0 },
            underline: false,
            section: None,
            keep_with_next: false,
        });
    }
}

/// `• text` at the bullet indent; continuation lines hang under the text.
fn push_bullet(out: &mut Vec<PendingLine>, item: &str) {
    let metrics = get_metrics(PdfFont::Helvetica);
    let prefix_pt = metrics.measure_str(BULLET_PREFIX) * BODY_SIZE_PT;
    let text_x = MARGIN_X_PT + BULLET_INDENT_PT + prefix_pt;
    let width = CONTENT_WIDTH_PT - BULLET_INDENT_PT - prefix_pt;

    for (i, line) in metrics.wrap(item, BODY_SIZE_PT, width).into_iter().enumerate() {
        let (text, x_pt) = if i == 0 {
            (format!("{BULLET_PREFIX}{line}"), MARGIN_X_PT + BULLET_INDENT_PT)
        } else {
            (line, text_x)
        };
        out.push(PendingLine {
            text,
            font: PdfFont::Helvetica,
            size_pt: BODY_SIZE_PT,
            x_pt,
            space_before_pt: 0.0,
            underline: false,
            section: None,
            keep_with_next: false,
        });
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Emission
// ────────────────────────────────────────────────────────────────────────────

fn mm(pt: f32) -> Mm {
    Mm(pt * PT_TO_MM)
}

/// Writes the laid-out pages as a PDF document.
pub fn write_pdf(pages: &[PdfPage], title: &str) -> Result<Vec<u8>, AppError> {
    let page_w = mm(PAGE_WIDTH_PT);
    let page_h = mm(PAGE_HEIGHT_PT);
    let (doc, first_page, first_layer) = PdfDocument::new(title, page_w, page_h, "Layer 1");

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF font error: {e}")))?;

    for (i, page) in pages.iter().enumerate() {
        let (page_idx, layer_idx) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(page_w, page_h, format!("Layer {}", i + 1))
        };
        let layer = doc.get_page(page_idx).get_layer(layer_idx);

        for line in &page.lines {
            let font = match line.font {
                PdfFont::Helvetica => &regular,
                PdfFont::HelveticaBold => &bold,
            };
            layer.use_text(
                line.text.as_str(),
                line.size_pt,
                mm(line.x_pt),
                mm(line.baseline_pt),
                font,
            );

            if line.underline {
                let width_pt = get_metrics(line.font).measure_str(&line.text) * line.size_pt;
                let y = mm(line.baseline_pt - UNDERLINE_OFFSET_PT);
                layer.set_outline_thickness(0.6);
                layer.add_line(Line {
                    points: vec![
                        (Point::new(mm(line.x_pt), y), false),
                        (Point::new(mm(line.x_pt + width_pt), y), false),
                    ],
                    is_closed: false,
                });
            }
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF buffer error: {e}")))
}
