//! Text generation: the narrow interface to the natural-language collaborator.
//!
//! Callers depend on `TextGenerator`, never on the LLM transport, so tests swap
//! in deterministic fakes. `AppState` holds an `Arc<dyn TextGenerator>`.

pub mod prompts;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{ResumeContent, TemplateStructure};
use crate::llm_client::prompts::system_prompt;
use crate::llm_client::{CallOptions, LlmClient, LlmError};

// ────────────────────────────────────────────────────────────────────────────
// Request / response types
// ────────────────────────────────────────────────────────────────────────────

/// Job-description analysis. Keywords and required skills are read; the rest travels
/// back into the tailoring call untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetAnalysis {
    pub keywords: Vec<String>,
    pub required_skills: Vec<String>,
    pub raw: Value,
}

impl TargetAnalysis {
    pub fn from_raw(raw: Value) -> Self {
        Self {
            keywords: string_list(raw.get("keywords")),
            required_skills: string_list(raw.get("requiredSkills")),
            raw,
        }
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// A project as offered to the tailoring call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBrief {
    pub title: String,
    pub tech_stack: Vec<String>,
    pub description: String,
    pub bullets: Vec<String>,
    pub impact: String,
}

#[derive(Debug, Clone)]
pub struct TailorRequest {
    pub base: ResumeContent,
    pub projects: Vec<ProjectBrief>,
    pub analysis: TargetAnalysis,
    pub structure: TemplateStructure,
}

/// Facts a bullet synthesis call may use. Nothing else is sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFacts {
    pub title: String,
    pub tech_stack: Vec<String>,
    pub description: String,
    pub readme: Option<String>,
    pub stars: u32,
    pub forks: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BulletSynthesis {
    pub bullets: Vec<String>,
    pub description: String,
}

impl BulletSynthesis {
    /// Trims everything and drops empty bullets.
    pub fn cleaned(self) -> Self {
        Self {
            bullets: self
                .bullets
                .into_iter()
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty())
                .collect(),
            description: self.description.trim().to_string(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Plain resume text to loosely structured JSON in canonical field names.
    async fn structure(&self, plain_text: &str) -> Result<Value, LlmError>;

    async fn analyze_target(&self, job_text: &str) -> Result<TargetAnalysis, LlmError>;

    /// Tailored content as loosely structured JSON; may carry `atsScore`.
    async fn tailor(&self, request: &TailorRequest) -> Result<Value, LlmError>;

    async fn synthesize_bullets(&self, facts: &ProjectFacts) -> Result<BulletSynthesis, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmTextGenerator
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmTextGenerator {
    client: LlmClient,
}

impl LlmTextGenerator {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

const PARSE_OPTIONS: CallOptions = CallOptions {
    max_tokens: 4000,
    temperature: 0.1,
};
const ANALYZE_OPTIONS: CallOptions = CallOptions {
    max_tokens: 2000,
    temperature: 0.1,
};
const TAILOR_OPTIONS: CallOptions = CallOptions {
    max_tokens: 4000,
    temperature: 0.3,
};
const BULLET_OPTIONS: CallOptions = CallOptions {
    max_tokens: 1000,
    temperature: 0.4,
};

#[async_trait]
impl TextGenerator for LlmTextGenerator {
    async fn structure(&self, plain_text: &str) -> Result<Value, LlmError> {
        self.client
            .call_json(
                &prompts::structure_prompt(plain_text),
                &system_prompt(prompts::STRUCTURE_ROLE),
                PARSE_OPTIONS,
            )
            .await
    }

    async fn analyze_target(&self, job_text: &str) -> Result<TargetAnalysis, LlmError> {
        let raw: Value = self
            .client
            .call_json(
                &prompts::analyze_prompt(job_text),
                &system_prompt(prompts::ANALYZE_ROLE),
                ANALYZE_OPTIONS,
            )
            .await?;
        Ok(TargetAnalysis::from_raw(raw))
    }

    async fn tailor(&self, request: &TailorRequest) -> Result<Value, LlmError> {
        let prompt = prompts::tailor_prompt(
            &serde_json::to_string_pretty(&request.base)?,
            &serde_json::to_string_pretty(&request.projects)?,
            &serde_json::to_string_pretty(&request.analysis.raw)?,
            &serde_json::to_string_pretty(&request.structure)?,
        );
        self.client
            .call_json(&prompt, &system_prompt(prompts::TAILOR_ROLE), TAILOR_OPTIONS)
            .await
    }

    async fn synthesize_bullets(&self, facts: &ProjectFacts) -> Result<BulletSynthesis, LlmError> {
        let tech = if facts.tech_stack.is_empty() {
            "N/A".to_string()
        } else {
            facts.tech_stack.join(", ")
        };
        let about = facts
            .readme
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| {
                if facts.description.trim().is_empty() {
                    "N/A"
                } else {
                    facts.description.as_str()
                }
            });
        let prompt = prompts::bullets_prompt(&facts.title, &tech, about, facts.stars, facts.forks);

        let synthesis: BulletSynthesis = self
            .client
            .call_json(&prompt, &system_prompt(prompts::BULLETS_ROLE), BULLET_OPTIONS)
            .await?;
        Ok(synthesis.cleaned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_target_analysis_reads_keyword_bag() {
        let analysis = TargetAnalysis::from_raw(json!({
            "keywords": ["Rust", " ", 7, "Kafka"],
            "requiredSkills": ["Postgres"],
            "industry": "fintech"
        }));
        assert_eq!(analysis.keywords, vec!["Rust", "Kafka"]);
        assert_eq!(analysis.required_skills, vec!["Postgres"]);
        assert_eq!(analysis.raw["industry"], "fintech");
    }

    #[test]
    fn test_target_analysis_tolerates_missing_fields() {
        let analysis = TargetAnalysis::from_raw(json!("not an object"));
        assert!(analysis.keywords.is_empty());
        assert!(analysis.required_skills.is_empty());
    }

    #[test]
    fn test_bullet_synthesis_defaults_and_cleans() {
        let parsed: BulletSynthesis =
            serde_json::from_value(json!({"bullets": [" Built X ", ""]})).unwrap();
        let cleaned = parsed.cleaned();
        assert_eq!(cleaned.bullets, vec!["Built X"]);
        assert_eq!(cleaned.description, "");
    }

    #[test]
    fn test_project_brief_serializes_camel_case() {
        let brief = ProjectBrief {
            title: "vitae".into(),
            tech_stack: vec!["Rust".into()],
            ..Default::default()
        };
        let value = serde_json::to_value(&brief).unwrap();
        assert_eq!(value["techStack"], json!(["Rust"]));
    }
}
