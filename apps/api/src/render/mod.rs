//! Rendering engine: one block stream from the section registry, two backends.
//!
//! `render_document` is synchronous and CPU-bound; handlers run it under
//! `spawn_blocking`.

pub mod blocks;
pub mod docx;
pub mod font_metrics;
pub mod pdf;
pub mod registry;

#[cfg(test)]
pub(crate) mod fixtures;

use std::str::FromStr;

use crate::document::{ResumeContent, TemplateStructure};
use crate::errors::AppError;

pub use registry::SummaryPlacement;

const FALLBACK_LABEL: &str = "tailored";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            other => Err(AppError::UnsupportedFormat(format!(
                "export format '{other}' is not supported (use 'pdf' or 'docx')"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

/// `{label}-resume.{ext}`, with characters that would break a
/// `Content-Disposition` header replaced.
pub fn export_filename(label: &str, format: ExportFormat) -> String {
    let cleaned: String = label
        .trim()
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '"' | '\\' | '/') {
                '_'
            } else {
                c
            }
        })
        .collect();
    let label = if cleaned.is_empty() {
        FALLBACK_LABEL
    } else {
        cleaned.as_str()
    };
    format!("{label}-resume.{}", format.extension())
}

/// Renders `content` in the section order of `structure`.
///
/// Content irregularities never fail; only backend serialization can.
pub fn render_document(
    content: &ResumeContent,
    structure: &TemplateStructure,
    format: ExportFormat,
    label: &str,
    placement: SummaryPlacement,
) -> Result<RenderedDocument, AppError> {
    let sections = registry::layout(content, structure, placement);
    let filename = export_filename(label, format);

    let bytes = match format {
        ExportFormat::Pdf => pdf::write_pdf(&pdf::paginate(&sections), &filename)?,
        ExportFormat::Docx => docx::write_docx(&docx::plan(&sections))?,
    };

    Ok(RenderedDocument {
        bytes,
        content_type: format.content_type(),
        filename,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SectionId;
    use crate::render::fixtures::full_content;
    use crate::render::registry::layout;

    fn pdf_outline(
        content: &ResumeContent,
        structure: &TemplateStructure,
        placement: SummaryPlacement,
    ) -> Vec<SectionId> {
        pdf::paginate(&layout(content, structure, placement))
            .iter()
            .flat_map(|p| p.lines.iter())
            .filter_map(|l| l.section)
            .collect()
    }

    fn docx_outline(
        content: &ResumeContent,
        structure: &TemplateStructure,
        placement: SummaryPlacement,
    ) -> Vec<SectionId> {
        docx::plan(&layout(content, structure, placement))
            .iter()
            .filter_map(|p| p.section)
            .collect()
    }

    #[test]
    fn test_export_format_parses_case_insensitively() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!(" docx ".parse::<ExportFormat>().unwrap(), ExportFormat::Docx);
    }

    #[test]
    fn test_unknown_export_format_is_unsupported() {
        let err = "odt".parse::<ExportFormat>().unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_filename_uses_label_and_extension() {
        assert_eq!(
            export_filename("Backend Engineer", ExportFormat::Pdf),
            "Backend Engineer-resume.pdf"
        );
        assert_eq!(export_filename("  ", ExportFormat::Docx), "tailored-resume.docx");
        assert_eq!(
            export_filename("a\"b/c\td", ExportFormat::Docx),
            "a_b_c_d-resume.docx"
        );
    }

    #[test]
    fn test_content_types() {
        assert_eq!(ExportFormat::Pdf.content_type(), "application/pdf");
        assert!(ExportFormat::Docx.content_type().contains("wordprocessingml"));
    }

    #[test]
    fn test_empty_content_renders_no_headings_in_either_backend() {
        let empty = ResumeContent::default();
        let structure = TemplateStructure::default();
        assert!(pdf_outline(&empty, &structure, SummaryPlacement::Pinned).is_empty());
        assert!(docx_outline(&empty, &structure, SummaryPlacement::Pinned).is_empty());

        for format in [ExportFormat::Pdf, ExportFormat::Docx] {
            let doc =
                render_document(&empty, &structure, format, "empty", SummaryPlacement::Pinned)
                    .unwrap();
            assert!(!doc.bytes.is_empty());
        }
    }

    #[test]
    fn test_backends_agree_on_section_order() {
        let content = full_content();
        let orders = [
            TemplateStructure::default(),
            TemplateStructure::new(
                vec![
                    SectionId::Achievements,
                    SectionId::Projects,
                    SectionId::Summary,
                    SectionId::Skills,
                ],
                "single-column",
            ),
            TemplateStructure::new(
                vec![SectionId::Experience, SectionId::Education, SectionId::Summary],
                "two-column",
            ),
        ];
        for structure in &orders {
            for placement in [SummaryPlacement::Pinned, SummaryPlacement::Declared] {
                let pdf = pdf_outline(&content, structure, placement);
                let docx = docx_outline(&content, structure, placement);
                assert_eq!(pdf, docx);
                assert_eq!(pdf, registry::resolve_order(structure, &content, placement));
            }
        }
    }

    #[test]
    fn test_summary_first_in_both_backends_when_pinned() {
        let structure = TemplateStructure::new(
            vec![SectionId::Skills, SectionId::Experience, SectionId::Summary],
            "single-column",
        );
        let content = full_content();
        let expected = vec![SectionId::Summary, SectionId::Skills, SectionId::Experience];
        assert_eq!(
            pdf_outline(&content, &structure, SummaryPlacement::Pinned),
            expected
        );
        assert_eq!(
            docx_outline(&content, &structure, SummaryPlacement::Pinned),
            expected
        );
    }

    #[test]
    fn test_same_input_same_text_in_both_backends() {
        let content = full_content();
        let structure = TemplateStructure::default();
        let pdf_text: String = pdf::paginate(&layout(&content, &structure, SummaryPlacement::Pinned))
            .iter()
            .flat_map(|p| p.lines.iter())
            .map(|l| l.text.trim_start_matches("• "))
            .collect::<Vec<_>>()
            .join(" ");
        let docx_text: String = docx::plan(&layout(&content, &structure, SummaryPlacement::Pinned))
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let words = |s: &str| s.split_whitespace().map(str::to_string).collect::<Vec<_>>();
        assert_eq!(words(&pdf_text), words(&docx_text));
    }

    #[test]
    fn test_render_document_sets_metadata() {
        let doc = render_document(
            &full_content(),
            &TemplateStructure::default(),
            ExportFormat::Docx,
            "SRE",
            SummaryPlacement::Pinned,
        )
        .unwrap();
        assert_eq!(doc.filename, "SRE-resume.docx");
        assert_eq!(doc.content_type, ExportFormat::Docx.content_type());
        assert!(doc.bytes.starts_with(b"PK"));
    }
}
