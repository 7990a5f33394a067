//! Coercion of loosely-shaped collaborator JSON into the canonical schema.
//!
//! Never fails: missing or mistyped fields become their empty default, unknown
//! fields are dropped. Dates and other free text are passed through untouched.

use serde_json::{Map, Value};

use crate::document::schema::{
    CertificationEntry, EducationEntry, ExperienceEntry, ProjectEntry, ResumeContent, SectionId,
    Skills, TemplateStructure, DEFAULT_STYLE,
};

/// Normalizes a structuring or tailoring response into `ResumeContent`.
///
/// Idempotent: feeding the serialized result back in yields the same value.
pub fn normalize(raw: &Value) -> ResumeContent {
    let Some(obj) = raw.as_object() else {
        return ResumeContent::default();
    };

    ResumeContent {
        summary: text(obj.get("summary")),
        education: entries(obj.get("education"), education_entry, EducationEntry::is_blank),
        experience: entries(obj.get("experience"), experience_entry, ExperienceEntry::is_blank),
        skills: skills(obj.get("skills")),
        projects: entries(obj.get("projects"), project_entry, ProjectEntry::is_blank),
        certifications: entries(
            obj.get("certifications"),
            certification_entry,
            CertificationEntry::is_blank,
        ),
        achievements: text_list(obj.get("achievements")),
    }
}

/// Reads `sectionOrder` / `style` from a structuring response.
///
/// Unknown identifiers and repeats are dropped. An absent or empty order falls
/// back to the canonical seven-section order.
pub fn normalize_template(raw: &Value) -> TemplateStructure {
    let order: Vec<SectionId> = raw
        .get("sectionOrder")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|s| s.parse().ok())
                .collect()
        })
        .unwrap_or_default();

    let style = raw
        .get("style")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_STYLE);

    if order.is_empty() {
        TemplateStructure::new(SectionId::ALL, style)
    } else {
        TemplateStructure::new(order, style)
    }
}

/// Extracts the tailoring response's `atsScore`, clamped to 0..=100.
pub fn ats_score(raw: &Value) -> Option<i16> {
    let value = raw.get("atsScore")?;
    let score = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !score.is_finite() {
        return None;
    }
    Some(score.round().clamp(0.0, 100.0) as i16)
}

// ────────────────────────────────────────────────────────────────────────────
// Entry coercion
// ────────────────────────────────────────────────────────────────────────────

fn education_entry(obj: &Map<String, Value>) -> EducationEntry {
    EducationEntry {
        institution: text(obj.get("institution")),
        degree: text(obj.get("degree")),
        field: text(obj.get("field")),
        start_date: text(obj.get("startDate")),
        end_date: text(obj.get("endDate")),
        gpa: text(obj.get("gpa")),
        details: text(obj.get("details")),
    }
}

fn experience_entry(obj: &Map<String, Value>) -> ExperienceEntry {
    ExperienceEntry {
        company: text(obj.get("company")),
        role: text(obj.get("role")),
        start_date: text(obj.get("startDate")),
        end_date: text(obj.get("endDate")),
        location: text(obj.get("location")),
        bullets: text_list(obj.get("bullets")),
    }
}

fn project_entry(obj: &Map<String, Value>) -> ProjectEntry {
    ProjectEntry {
        title: text(obj.get("title")),
        tech_stack: text_set(obj.get("techStack")),
        description: text(obj.get("description")),
        bullets: text_list(obj.get("bullets")),
    }
}

fn certification_entry(obj: &Map<String, Value>) -> CertificationEntry {
    CertificationEntry {
        name: text(obj.get("name")),
        issuer: text(obj.get("issuer")),
        date: text(obj.get("date")),
    }
}

fn skills(value: Option<&Value>) -> Skills {
    let Some(obj) = value.and_then(Value::as_object) else {
        return Skills::default();
    };
    Skills {
        technical: text_set(obj.get("technical")),
        soft: text_set(obj.get("soft")),
        languages: text_set(obj.get("languages")),
        tools: text_set(obj.get("tools")),
    }
}

/// Maps every object element through `build`, dropping non-objects and entries
/// with no content at all.
fn entries<T>(
    value: Option<&Value>,
    build: fn(&Map<String, Value>) -> T,
    is_blank: fn(&T) -> bool,
) -> Vec<T> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(build)
                .filter(|entry| !is_blank(entry))
                .collect()
        })
        .unwrap_or_default()
}

// ────────────────────────────────────────────────────────────────────────────
// Scalar coercion
// ────────────────────────────────────────────────────────────────────────────

/// Strings are trimmed; numbers and booleans are stringified; anything else is empty.
fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Ordered list of non-empty strings. A bare string is treated as a one-item list.
fn text_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| text(Some(item)))
            .filter(|s| !s.is_empty())
            .collect(),
        Some(single @ Value::String(_)) => {
            let s = text(Some(single));
            if s.is_empty() {
                Vec::new()
            } else {
                vec![s]
            }
        }
        _ => Vec::new(),
    }
}

/// Like `text_list`, keeping only the first occurrence of each value.
fn text_set(value: Option<&Value>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in text_list(value) {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messy_input() -> Value {
        json!({
            "summary": "  Backend engineer  ",
            "education": [
                {"institution": "MIT", "degree": "BSc", "gpa": 3.9, "honours": "cum laude"},
                {},
                "not an object"
            ],
            "experience": [
                {"company": "Acme", "role": "SWE", "bullets": ["Built X", "", 42, null]}
            ],
            "skills": {"technical": ["Rust", "Go", "Rust"], "tools": "Docker", "hobbies": ["chess"]},
            "projects": [{"title": "vitae", "techStack": ["Rust", "Rust", "Postgres"]}],
            "certifications": [{"name": "CKA", "date": "2023"}],
            "achievements": "Won a hackathon",
            "atsScore": 88,
            "sectionOrder": ["skills"]
        })
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let content = normalize(&json!({}));
        assert_eq!(content, ResumeContent::default());
    }

    #[test]
    fn test_non_object_input_is_empty_content() {
        assert_eq!(normalize(&json!(null)), ResumeContent::default());
        assert_eq!(normalize(&json!([1, 2, 3])), ResumeContent::default());
        assert_eq!(normalize(&json!("resume")), ResumeContent::default());
    }

    #[test]
    fn test_coerces_scalars_and_drops_unknown_fields() {
        let content = normalize(&messy_input());
        assert_eq!(content.summary, "Backend engineer");
        assert_eq!(content.education.len(), 1, "blank and non-object entries dropped");
        assert_eq!(content.education[0].gpa, "3.9");
        assert_eq!(content.experience[0].bullets, vec!["Built X", "42"]);
        assert_eq!(content.skills.technical, vec!["Rust", "Go"]);
        assert_eq!(content.skills.tools, vec!["Docker"]);
        assert_eq!(content.projects[0].tech_stack, vec!["Rust", "Postgres"]);
        assert_eq!(content.achievements, vec!["Won a hackathon"]);

        let round = serde_json::to_value(&content).unwrap();
        assert!(round.get("atsScore").is_none());
        assert!(round["skills"].get("hobbies").is_none());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in [messy_input(), json!({}), json!({"summary": 12})] {
            let once = normalize(&raw);
            let twice = normalize(&serde_json::to_value(&once).unwrap());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_dates_are_not_validated() {
        let content = normalize(&json!({
            "experience": [{"role": "SWE", "startDate": "sometime in 2019", "endDate": "Present"}]
        }));
        assert_eq!(content.experience[0].start_date, "sometime in 2019");
        assert_eq!(content.experience[0].end_date, "Present");
    }

    #[test]
    fn test_template_drops_unknown_and_repeated_ids() {
        let t = normalize_template(&json!({
            "sectionOrder": ["experience", "objective", "Skills", "experience", 7],
            "style": "modern"
        }));
        assert_eq!(t.section_order, vec![SectionId::Experience, SectionId::Skills]);
        assert_eq!(t.style, "modern");
    }

    #[test]
    fn test_template_defaults_when_order_missing_or_empty() {
        let missing = normalize_template(&json!({}));
        assert_eq!(missing.section_order, SectionId::ALL.to_vec());
        assert_eq!(missing.style, DEFAULT_STYLE);

        let empty = normalize_template(&json!({"sectionOrder": []}));
        assert_eq!(empty.section_order, SectionId::ALL.to_vec());
    }

    #[test]
    fn test_ats_score_clamped_and_lenient() {
        assert_eq!(ats_score(&json!({"atsScore": 85})), Some(85));
        assert_eq!(ats_score(&json!({"atsScore": 140})), Some(100));
        assert_eq!(ats_score(&json!({"atsScore": "72.4"})), Some(72));
        assert_eq!(ats_score(&json!({"atsScore": "high"})), None);
        assert_eq!(ats_score(&json!({})), None);
    }
}
