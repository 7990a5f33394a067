//! Deterministic `TextGenerator` for tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{BulletSynthesis, ProjectFacts, TailorRequest, TargetAnalysis, TextGenerator};
use crate::llm_client::LlmError;

#[derive(Default)]
pub struct FakeTextGenerator {
    pub structured: Value,
    pub tailored: Value,
    pub analysis: Value,
    /// Project titles whose bullet synthesis fails.
    pub failing_titles: HashSet<String>,
    /// Every call fails.
    pub unavailable: bool,
    pub synthesis_calls: AtomicUsize,
}

impl FakeTextGenerator {
    pub fn new() -> Self {
        Self {
            structured: json!({}),
            tailored: json!({}),
            analysis: json!({"keywords": ["Rust"]}),
            ..Default::default()
        }
    }

    pub fn failing_for(mut self, title: &str) -> Self {
        self.failing_titles.insert(title.to_string());
        self
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new()
        }
    }

    fn check(&self) -> Result<(), LlmError> {
        if self.unavailable {
            Err(LlmError::Api {
                status: 503,
                message: "fake outage".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TextGenerator for FakeTextGenerator {
    async fn structure(&self, _plain_text: &str) -> Result<Value, LlmError> {
        self.check()?;
        Ok(self.structured.clone())
    }

    async fn analyze_target(&self, _job_text: &str) -> Result<TargetAnalysis, LlmError> {
        self.check()?;
        Ok(TargetAnalysis::from_raw(self.analysis.clone()))
    }

    async fn tailor(&self, _request: &TailorRequest) -> Result<Value, LlmError> {
        self.check()?;
        Ok(self.tailored.clone())
    }

    async fn synthesize_bullets(&self, facts: &ProjectFacts) -> Result<BulletSynthesis, LlmError> {
        self.synthesis_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        if self.failing_titles.contains(&facts.title) {
            return Err(LlmError::EmptyContent);
        }
        Ok(BulletSynthesis {
            bullets: vec![format!("Built {}", facts.title)],
            description: format!("{} description", facts.title),
        })
    }
}
