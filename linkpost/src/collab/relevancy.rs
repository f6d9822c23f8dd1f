//! Relevancy classifier that asks a [`TextGenerator`] a yes/no question.

use std::sync::Arc;

use async_trait::async_trait;

use crate::prompts;

use super::{CollabError, RelevancyClassifier, TextGenerator};

/// Classifies content by prompting a text generator and reading a yes/no answer.
pub struct LlmRelevancyClassifier {
    generator: Arc<dyn TextGenerator>,
}

impl LlmRelevancyClassifier {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

/// Reads the first word of a model answer as yes/no.
pub(crate) fn parse_verdict(answer: &str) -> Result<bool, CollabError> {
    let first = answer
        .trim()
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    match first.as_str() {
        "yes" | "true" | "relevant" => Ok(true),
        "no" | "false" | "irrelevant" => Ok(false),
        _ => Err(CollabError::Classify(format!(
            "unexpected classifier answer: {}",
            answer.chars().take(80).collect::<String>()
        ))),
    }
}

#[async_trait]
impl RelevancyClassifier for LlmRelevancyClassifier {
    async fn is_relevant(&self, content: &str, policy: &str) -> Result<bool, CollabError> {
        let prompt = prompts::relevancy_prompt(content, policy);
        let answer = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| CollabError::Classify(e.to_string()))?;
        parse_verdict(&answer)
    }
}
