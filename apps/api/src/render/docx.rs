//! Flow-document backend (DOCX via `docx-rs`).
//!
//! `plan` maps the block stream onto styled paragraphs; `write_docx` packs them
//! into a WordprocessingML archive. Bullets use a real numbering definition so
//! word processors treat them as a list.

use std::io::Cursor;

use docx_rs::{
    AbstractNumbering, Docx, IndentLevel, Level, LevelJc, LevelText, LineSpacing, NumberFormat,
    Numbering, NumberingId, Paragraph, Run, RunFonts, Start, Style, StyleType,
};

use crate::document::SectionId;
use crate::errors::AppError;
use crate::render::blocks::{Block, SectionBlocks};

const FONT: &str = "Calibri";
const HEADING_STYLE: &str = "Heading2";

// Half-points.
const HEADING_SIZE: usize = 24;
const LABEL_SIZE: usize = 20;
const BODY_SIZE: usize = 20;

// Twentieths of a point.
const HEADING_SPACE_BEFORE: u32 = 240;
const HEADING_SPACE_AFTER: u32 = 80;
const LABEL_SPACE_BEFORE: u32 = 80;

const BULLET_ABSTRACT_ID: usize = 1;
const BULLET_NUMBERING_ID: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphKind {
    Heading,
    Label,
    Body,
    Bullet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxParagraph {
    pub kind: ParagraphKind,
    pub text: String,
    /// Set on heading paragraphs only.
    pub section: Option<SectionId>,
}

pub fn plan(sections: &[SectionBlocks]) -> Vec<DocxParagraph> {
    let mut out = Vec::new();
    for section in sections {
        for block in &section.blocks {
            match block {
                Block::Heading(text) => out.push(DocxParagraph {
                    kind: ParagraphKind::Heading,
                    text: text.to_uppercase(),
                    section: Some(section.section),
                }),
                Block::KeyValueLine(text) => out.push(DocxParagraph {
                    kind: ParagraphKind::Label,
                    text: text.clone(),
                    section: None,
                }),
                Block::Paragraph(text) => out.push(DocxParagraph {
                    kind: ParagraphKind::Body,
                    text: text.clone(),
                    section: None,
                }),
                Block::BulletList(items) => out.extend(items.iter().map(|item| DocxParagraph {
                    kind: ParagraphKind::Bullet,
                    text: item.clone(),
                    section: None,
                })),
            }
        }
    }
    out
}

fn run(text: &str, size: usize) -> Run {
    Run::new()
        .add_text(text)
        .size(size)
        .fonts(RunFonts::new().ascii(FONT).hi_ansi(FONT).cs(FONT))
}

fn to_docx_paragraph(p: &DocxParagraph) -> Paragraph {
    match p.kind {
        ParagraphKind::Heading => Paragraph::new()
            .add_run(run(&p.text, HEADING_SIZE).bold())
            .style(HEADING_STYLE)
            .line_spacing(
                LineSpacing::new()
                    .before(HEADING_SPACE_BEFORE)
                    .after(HEADING_SPACE_AFTER),
            ),
        ParagraphKind::Label => Paragraph::new()
            .add_run(run(&p.text, LABEL_SIZE).bold())
            .line_spacing(LineSpacing::new().before(LABEL_SPACE_BEFORE)),
        ParagraphKind::Body => Paragraph::new().add_run(run(&p.text, BODY_SIZE)),
        ParagraphKind::Bullet => Paragraph::new()
            .add_run(run(&p.text, BODY_SIZE))
            .numbering(NumberingId::new(BULLET_NUMBERING_ID), IndentLevel::new(0)),
    }
}

pub fn write_docx(paragraphs: &[DocxParagraph]) -> Result<Vec<u8>, AppError> {
    let bullet_level = Level::new(
        0,
        Start::new(1),
        NumberFormat::new("bullet"),
        LevelText::new("•"),
        LevelJc::new("left"),
    );

    let mut docx = Docx::new()
        .add_style(
            Style::new(HEADING_STYLE, StyleType::Paragraph)
                .name("Heading 2")
                .bold()
                .size(HEADING_SIZE),
        )
        .add_abstract_numbering(AbstractNumbering::new(BULLET_ABSTRACT_ID).add_level(bullet_level))
        .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_ABSTRACT_ID));

    for p in paragraphs {
        docx = docx.add_paragraph(to_docx_paragraph(p));
    }

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("DOCX pack error: {e}")))?;
    Ok(cursor.into_inner())
}
