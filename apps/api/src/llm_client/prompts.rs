// Cross-cutting prompt fragments. Feature prompts live in their own
// prompts.rs next to the code that sends them.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt that rewrites a candidate's own material.
pub const NO_INVENTION_INSTRUCTION: &str = "\
    CRITICAL: Do NOT invent experience, employers, dates, degrees, metrics or \
    qualifications. Only rephrase, reorder and emphasise what the input already \
    contains. If the input does not support a claim, omit it.";

/// Canonical resume JSON shape shared by the structuring and tailoring prompts.
pub const RESUME_JSON_SHAPE: &str = r#"{
  "summary": "professional summary or objective text",
  "education": [{"institution":"","degree":"","field":"","startDate":"","endDate":"","gpa":"","details":""}],
  "experience": [{"company":"","role":"","startDate":"","endDate":"","location":"","bullets":["..."]}],
  "skills": {"technical":["..."],"soft":["..."],"languages":["..."],"tools":["..."]},
  "projects": [{"title":"","techStack":["..."],"description":"","bullets":["..."]}],
  "certifications": [{"name":"","issuer":"","date":""}],
  "achievements": ["..."]"#;

/// Builds a system prompt from a role line and the JSON-only rule.
pub fn system_prompt(role: &str) -> String {
    format!("{role}\n\n{JSON_ONLY_SYSTEM}")
}
