//! Canonical resume document — the shape every renderer consumes and every
//! structuring / tailoring response is coerced into.
//!
//! Text fields are plain `String`s: an empty string and an absent value mean the
//! same thing. List fields are always present (possibly empty).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Resume content
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeContent {
    pub summary: String,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Skills,
    pub projects: Vec<ProjectEntry>,
    pub certifications: Vec<CertificationEntry>,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    pub end_date: String,
    pub gpa: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub company: String,
    pub role: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    pub bullets: Vec<String>,
}

/// Skill groups. Each group is an insertion-ordered set (no duplicates).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Skills {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
    pub languages: Vec<String>,
    pub tools: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEntry {
    pub title: String,
    pub tech_stack: Vec<String>,
    pub description: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificationEntry {
    pub name: String,
    pub issuer: String,
    pub date: String,
}

impl EducationEntry {
    pub fn is_blank(&self) -> bool {
        [
            &self.institution,
            &self.degree,
            &self.field,
            &self.start_date,
            &self.end_date,
            &self.gpa,
            &self.details,
        ]
        .iter()
        .all(|s| s.trim().is_empty())
    }
}

impl ExperienceEntry {
    pub fn is_blank(&self) -> bool {
        [
            &self.company,
            &self.role,
            &self.start_date,
            &self.end_date,
            &self.location,
        ]
        .iter()
        .all(|s| s.trim().is_empty())
            && self.bullets.iter().all(|b| b.trim().is_empty())
    }
}

impl ProjectEntry {
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
            && self.description.trim().is_empty()
            && self.tech_stack.iter().all(|t| t.trim().is_empty())
            && self.bullets.iter().all(|b| b.trim().is_empty())
    }
}

impl CertificationEntry {
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.issuer.trim().is_empty() && self.date.trim().is_empty()
    }
}

impl Skills {
    pub fn is_empty(&self) -> bool {
        [&self.technical, &self.soft, &self.languages, &self.tools]
            .iter()
            .all(|group| group.iter().all(|s| s.trim().is_empty()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Section identifiers and template structure
// ────────────────────────────────────────────────────────────────────────────

/// The seven fixed resume sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionId {
    Summary,
    Education,
    Experience,
    Skills,
    Projects,
    Certifications,
    Achievements,
}

impl SectionId {
    /// Canonical order, used when a template declares no order at all.
    pub const ALL: [SectionId; 7] = [
        SectionId::Summary,
        SectionId::Education,
        SectionId::Experience,
        SectionId::Skills,
        SectionId::Projects,
        SectionId::Certifications,
        SectionId::Achievements,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::Summary => "summary",
            SectionId::Education => "education",
            SectionId::Experience => "experience",
            SectionId::Skills => "skills",
            SectionId::Projects => "projects",
            SectionId::Certifications => "certifications",
            SectionId::Achievements => "achievements",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SectionId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(wanted))
            .ok_or(())
    }
}

pub const DEFAULT_STYLE: &str = "single-column";

/// Declared section order plus a descriptive style tag.
///
/// `style` never changes rendering rules. `section_order` holds no duplicates;
/// build it through `TemplateStructure::new` or `normalize_template`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateStructure {
    pub section_order: Vec<SectionId>,
    pub style: String,
}

impl TemplateStructure {
    /// Builds a structure, dropping repeated identifiers (first occurrence wins).
    pub fn new(order: impl IntoIterator<Item = SectionId>, style: impl Into<String>) -> Self {
        let mut section_order = Vec::new();
        for id in order {
            if !section_order.contains(&id) {
                section_order.push(id);
            }
        }
        Self {
            section_order,
            style: style.into(),
        }
    }
}

impl Default for TemplateStructure {
    fn default() -> Self {
        Self::new(SectionId::ALL, DEFAULT_STYLE)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generated artifact
// ────────────────────────────────────────────────────────────────────────────

/// Immutable snapshot of one tailored document.
///
/// Content and structure are owned copies taken at generation time; edits to the
/// base resume or to projects never reach an existing artifact. There is no
/// mutating API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArtifact {
    id: Uuid,
    user_id: Uuid,
    base_resume_id: Uuid,
    role_tag: String,
    keywords: Vec<String>,
    content: ResumeContent,
    structure: TemplateStructure,
    ats_score: Option<i16>,
    created_at: DateTime<Utc>,
}

/// Inputs captured when an artifact is created.
pub struct ArtifactSnapshot {
    pub user_id: Uuid,
    pub base_resume_id: Uuid,
    pub role_tag: String,
    pub keywords: Vec<String>,
    pub content: ResumeContent,
    pub structure: TemplateStructure,
    pub ats_score: Option<i16>,
}

impl GeneratedArtifact {
    pub fn create(snapshot: ArtifactSnapshot) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: snapshot.user_id,
            base_resume_id: snapshot.base_resume_id,
            role_tag: snapshot.role_tag,
            keywords: snapshot.keywords,
            content: snapshot.content,
            structure: snapshot.structure,
            ats_score: snapshot.ats_score,
            created_at: Utc::now(),
        }
    }

    /// Rehydrates a stored artifact.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: Uuid,
        user_id: Uuid,
        base_resume_id: Uuid,
        role_tag: String,
        keywords: Vec<String>,
        content: ResumeContent,
        structure: TemplateStructure,
        ats_score: Option<i16>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            base_resume_id,
            role_tag,
            keywords,
            content,
            structure,
            ats_score,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn base_resume_id(&self) -> Uuid {
        self.base_resume_id
    }

    pub fn role_tag(&self) -> &str {
        &self.role_tag
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn content(&self) -> &ResumeContent {
        &self.content
    }

    pub fn structure(&self) -> &TemplateStructure {
        &self.structure
    }

    pub fn ats_score(&self) -> Option<i16> {
        self.ats_score
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_id_parses_case_insensitively() {
        assert_eq!("Experience".parse::<SectionId>(), Ok(SectionId::Experience));
        assert_eq!(" skills ".parse::<SectionId>(), Ok(SectionId::Skills));
        assert!("objective".parse::<SectionId>().is_err());
    }

    #[test]
    fn test_template_structure_drops_repeats() {
        let t = TemplateStructure::new(
            [
                SectionId::Skills,
                SectionId::Summary,
                SectionId::Skills,
                SectionId::Education,
            ],
            "modern",
        );
        assert_eq!(
            t.section_order,
            vec![SectionId::Skills, SectionId::Summary, SectionId::Education]
        );
        assert_eq!(t.style, "modern");
    }

    #[test]
    fn test_missing_fields_deserialize_to_empty() {
        let content: ResumeContent = serde_json::from_str(r#"{"summary": "Hi"}"#).unwrap();
        assert_eq!(content.summary, "Hi");
        assert!(content.education.is_empty());
        assert!(content.skills.is_empty());
        assert!(content.achievements.is_empty());
    }

    #[test]
    fn test_blank_entries_detected() {
        assert!(ExperienceEntry::default().is_blank());
        assert!(!ExperienceEntry {
            bullets: vec!["Shipped it".to_string()],
            ..Default::default()
        }
        .is_blank());
        assert!(CertificationEntry {
            name: "  ".to_string(),
            ..Default::default()
        }
        .is_blank());
    }

    #[test]
    fn test_artifact_is_a_snapshot() {
        let mut content = ResumeContent {
            summary: "Original".to_string(),
            ..Default::default()
        };
        let artifact = GeneratedArtifact::create(ArtifactSnapshot {
            user_id: Uuid::new_v4(),
            base_resume_id: Uuid::new_v4(),
            role_tag: "backend".to_string(),
            keywords: vec![],
            content: content.clone(),
            structure: TemplateStructure::default(),
            ats_score: Some(80),
        });
        content.summary = "Edited later".to_string();
        assert_eq!(artifact.content().summary, "Original");
    }
}
