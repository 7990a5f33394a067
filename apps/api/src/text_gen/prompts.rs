// Prompts for the four text-generation calls.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{NO_INVENTION_INSTRUCTION, RESUME_JSON_SHAPE};

pub const STRUCTURE_ROLE: &str = "You are a resume parser. Extract structured information \
    from resume text exactly as written.";

pub const ANALYZE_ROLE: &str = "You are a job description analyst. Extract the information \
    an applicant tracking system would screen for.";

pub const TAILOR_ROLE: &str = "You are an expert ATS-optimized resume writer.";

pub const BULLETS_ROLE: &str = "You are a resume writing expert. You turn project facts into \
    concise, impactful resume bullet points.";

/// Replace `{resume_text}` before sending.
pub fn structure_prompt(resume_text: &str) -> String {
    format!(
        r#"Parse this resume into JSON with this exact structure:
{RESUME_JSON_SHAPE},
  "sectionOrder": ["summary","education","experience","skills","projects","certifications","achievements"],
  "style": "single-column"
}}

Rules:
- Only include sections that exist in the resume; use an empty array or empty string otherwise.
- sectionOrder lists the sections in the order they appear in the original text.
- Copy dates exactly as written.

RESUME:
{resume_text}"#
    )
}

pub fn analyze_prompt(job_text: &str) -> String {
    format!(
        r#"Analyze this job description and return JSON with this exact structure:
{{
  "roleTitle": "the job title",
  "requiredSkills": ["..."],
  "preferredSkills": ["..."],
  "keywords": ["ATS-relevant keywords and phrases"],
  "responsibilities": ["key responsibilities"],
  "experienceLevel": "entry/mid/senior",
  "industry": "industry name"
}}

JOB DESCRIPTION:
{job_text}"#
    )
}

pub fn tailor_prompt(base: &str, projects: &str, analysis: &str, structure: &str) -> String {
    format!(
        r#"Generate a tailored resume that:
1. Preserves the original section order given in TEMPLATE STRUCTURE.
2. Optimizes wording for the job's keywords and required skills.
3. Uses strong action verbs and quantifies impact where the source does.
4. Prioritizes the most relevant projects and skills for the target role.
5. Stays ATS-friendly: no tables, no icons, standard headings.

{NO_INVENTION_INSTRUCTION}

Return JSON with this exact structure:
{RESUME_JSON_SHAPE},
  "atsScore": 85
}}
atsScore is your 0-100 estimate of how well the tailored resume matches the job.

ORIGINAL RESUME CONTENT:
{base}

AVAILABLE PROJECTS:
{projects}

JOB ANALYSIS:
{analysis}

TEMPLATE STRUCTURE:
{structure}"#
    )
}

pub fn bullets_prompt(
    title: &str,
    tech_stack: &str,
    about: &str,
    stars: u32,
    forks: u32,
) -> String {
    format!(
        r#"Write 2-4 resume bullet points for this project. Each bullet starts with a strong
action verb, names the technology used, quantifies impact where the facts allow, and fits
on one line.

{NO_INVENTION_INSTRUCTION}

Return JSON: {{"bullets": ["...", "..."], "description": "one-line project description"}}

Title: {title}
Tech Stack: {tech_stack}
Description/README: {about}
Stars: {stars}, Forks: {forks}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_prompt_is_valid_shape_and_embeds_text() {
        let prompt = structure_prompt("Jane Doe\nRust engineer");
        assert!(prompt.contains("\"sectionOrder\""));
        assert!(prompt.ends_with("Jane Doe\nRust engineer"));
    }

    #[test]
    fn test_bullets_prompt_lists_facts() {
        let prompt = bullets_prompt("vitae", "Rust, SQL", "N/A", 12, 3);
        assert!(prompt.contains("Title: vitae"));
        assert!(prompt.contains("Stars: 12, Forks: 3"));
    }
}
