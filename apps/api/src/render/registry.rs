//! Section Registry — per-section emptiness predicates and block rules, plus
//! resolution of the final section sequence.
//!
//! # Summary placement
//! Under `SummaryPlacement::Pinned` (the default) a non-empty summary that the
//! template lists is always emitted first, whatever its declared position. This
//! is the header convention both export formats have always followed. It is kept
//! as a named, switchable rule: `SummaryPlacement::Declared` renders the summary
//! exactly where the template puts it.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::schema::{
    CertificationEntry, EducationEntry, ExperienceEntry, ProjectEntry, ResumeContent, SectionId,
    TemplateStructure,
};
use crate::render::blocks::{Block, SectionBlocks};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryPlacement {
    #[default]
    Pinned,
    Declared,
}

impl FromStr for SummaryPlacement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pinned" => Ok(SummaryPlacement::Pinned),
            "declared" => Ok(SummaryPlacement::Declared),
            other => Err(format!(
                "unknown summary placement '{other}' (expected 'pinned' or 'declared')"
            )),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public API
// ────────────────────────────────────────────────────────────────────────────

pub fn heading_for(section: SectionId) -> &'static str {
    match section {
        SectionId::Summary => "Professional Summary",
        SectionId::Education => "Education",
        SectionId::Experience => "Experience",
        SectionId::Skills => "Skills",
        SectionId::Projects => "Projects",
        SectionId::Certifications => "Certifications",
        SectionId::Achievements => "Achievements",
    }
}

/// Whether `section` has anything to render. Absent and empty are the same.
pub fn is_present(section: SectionId, content: &ResumeContent) -> bool {
    match section {
        SectionId::Summary => !content.summary.trim().is_empty(),
        SectionId::Education => content.education.iter().any(|e| !e.is_blank()),
        SectionId::Experience => content.experience.iter().any(|e| !e.is_blank()),
        SectionId::Skills => !content.skills.is_empty(),
        SectionId::Projects => content.projects.iter().any(|p| !p.is_blank()),
        SectionId::Certifications => content.certifications.iter().any(|c| !c.is_blank()),
        SectionId::Achievements => content.achievements.iter().any(|a| !a.trim().is_empty()),
    }
}

/// Blocks for one section, heading first. Empty when the section is not present.
pub fn blocks_for(section: SectionId, content: &ResumeContent) -> Vec<Block> {
    if !is_present(section, content) {
        return Vec::new();
    }

    let mut blocks = vec![Block::Heading(heading_for(section).to_string())];
    match section {
        SectionId::Summary => blocks.push(Block::Paragraph(content.summary.trim().to_string())),
        SectionId::Education => {
            for entry in content.education.iter().filter(|e| !e.is_blank()) {
                education_blocks(entry, &mut blocks);
            }
        }
        SectionId::Experience => {
            for entry in content.experience.iter().filter(|e| !e.is_blank()) {
                experience_blocks(entry, &mut blocks);
            }
        }
        SectionId::Skills => {
            let skills = &content.skills;
            for (label, group) in [
                ("Technical", &skills.technical),
                ("Tools", &skills.tools),
                ("Languages", &skills.languages),
                ("Soft Skills", &skills.soft),
            ] {
                let items = non_blank(group);
                if !items.is_empty() {
                    blocks.push(Block::Paragraph(format!("{label}: {}", items.join(", "))));
                }
            }
        }
        SectionId::Projects => {
            for entry in content.projects.iter().filter(|p| !p.is_blank()) {
                project_blocks(entry, &mut blocks);
            }
        }
        SectionId::Certifications => {
            for entry in content.certifications.iter().filter(|c| !c.is_blank()) {
                blocks.push(Block::Paragraph(certification_line(entry)));
            }
        }
        SectionId::Achievements => {
            blocks.push(Block::BulletList(non_blank(&content.achievements)));
        }
    }
    blocks
}

/// Final section sequence: declared order, absent sections skipped, summary
/// override applied.
pub fn resolve_order(
    structure: &TemplateStructure,
    content: &ResumeContent,
    placement: SummaryPlacement,
) -> Vec<SectionId> {
    let mut order: Vec<SectionId> = Vec::with_capacity(structure.section_order.len());
    for &id in &structure.section_order {
        if !order.contains(&id) && is_present(id, content) {
            order.push(id);
        }
    }

    if placement == SummaryPlacement::Pinned {
        if let Some(pos) = order.iter().position(|id| *id == SectionId::Summary) {
            let summary = order.remove(pos);
            order.insert(0, summary);
        }
    }
    order
}

/// Full block stream for a document, grouped by section.
pub fn layout(
    content: &ResumeContent,
    structure: &TemplateStructure,
    placement: SummaryPlacement,
) -> Vec<SectionBlocks> {
    resolve_order(structure, content, placement)
        .into_iter()
        .map(|section| SectionBlocks {
            section,
            blocks: blocks_for(section, content),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Per-entry rules
// ────────────────────────────────────────────────────────────────────────────

/// Institution line, then `degree in field | dates | GPA`, then details.
fn education_blocks(entry: &EducationEntry, blocks: &mut Vec<Block>) {
    if !entry.institution.trim().is_empty() {
        blocks.push(Block::KeyValueLine(entry.institution.trim().to_string()));
    }

    let degree = match (entry.degree.trim(), entry.field.trim()) {
        ("", "") => String::new(),
        (degree, "") => degree.to_string(),
        ("", field) => field.to_string(),
        (degree, field) => format!("{degree} in {field}"),
    };
    let gpa = if entry.gpa.trim().is_empty() {
        String::new()
    } else {
        format!("GPA: {}", entry.gpa.trim())
    };
    let detail = join_non_empty(
        &[
            degree.as_str(),
            date_range(&entry.start_date, &entry.end_date).as_str(),
            gpa.as_str(),
        ],
        " | ",
    );
    if !detail.is_empty() {
        blocks.push(Block::Paragraph(detail));
    }

    if !entry.details.trim().is_empty() {
        blocks.push(Block::Paragraph(entry.details.trim().to_string()));
    }
}

/// Role/company line, location/date line, bullet list.
fn experience_blocks(entry: &ExperienceEntry, blocks: &mut Vec<Block>) {
    let header = join_non_empty(&[entry.role.as_str(), entry.company.as_str()], " — ");
    if !header.is_empty() {
        blocks.push(Block::KeyValueLine(header));
    }

    let meta = join_non_empty(
        &[
            entry.location.as_str(),
            date_range(&entry.start_date, &entry.end_date).as_str(),
        ],
        " | ",
    );
    if !meta.is_empty() {
        blocks.push(Block::Paragraph(meta));
    }

    let bullets = non_blank(&entry.bullets);
    if !bullets.is_empty() {
        blocks.push(Block::BulletList(bullets));
    }
}

/// Title, tech line, description, bullet list.
fn project_blocks(entry: &ProjectEntry, blocks: &mut Vec<Block>) {
    if !entry.title.trim().is_empty() {
        blocks.push(Block::KeyValueLine(entry.title.trim().to_string()));
    }

    let stack = non_blank(&entry.tech_stack);
    if !stack.is_empty() {
        blocks.push(Block::Paragraph(format!("Tech: {}", stack.join(", "))));
    }

    if !entry.description.trim().is_empty() {
        blocks.push(Block::Paragraph(entry.description.trim().to_string()));
    }

    let bullets = non_blank(&entry.bullets);
    if !bullets.is_empty() {
        blocks.push(Block::BulletList(bullets));
    }
}

/// `Name — Issuer (Date)`, omitting whatever is missing.
fn certification_line(entry: &CertificationEntry) -> String {
    let mut line = join_non_empty(&[entry.name.as_str(), entry.issuer.as_str()], " — ");
    let date = entry.date.trim();
    if !date.is_empty() {
        if line.is_empty() {
            line = date.to_string();
        } else {
            line.push_str(&format!(" ({date})"));
        }
    }
    line
}

fn date_range(start: &str, end: &str) -> String {
    join_non_empty(&[start, end], " - ")
}

fn join_non_empty(parts: &[&str], sep: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

fn non_blank(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
