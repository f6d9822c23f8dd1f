//! External collaborators, specified at their interface boundary.
//!
//! Each concern is a trait so stages can be driven by real adapters or by the `Mock*`
//! implementations in [`mock`]:
//!
//! - [`ContentFetcher`]: page text and image URLs ([`HttpFetcher`])
//! - [`RelevancyClassifier`]: does content match the topical policy ([`LlmRelevancyClassifier`])
//! - [`TextGenerator`]: prompt → text ([`OpenAiGenerator`])
//! - [`Publisher`]: platform post and auth check ([`DryRunPublisher`])
//! - [`DateParser`]: free-form date → [`Schedule`] ([`BasicDateParser`])

mod date;
mod http;
pub mod mock;
mod openai;
mod publisher;
mod relevancy;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prompts::Prompt;
use crate::schedule::{Schedule, ScheduleError};

pub use date::BasicDateParser;
pub use http::HttpFetcher;
pub use openai::OpenAiGenerator;
pub use publisher::DryRunPublisher;
pub use relevancy::LlmRelevancyClassifier;

/// Failure of an external collaborator. Stages turn these into fallbacks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollabError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("classification failed: {0}")]
    Classify(String),
    #[error("generation failed: {0}")]
    Generate(String),
    #[error("publish failed: {0}")]
    Publish(String),
}

/// Text and image candidates of one fetched page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    pub content: String,
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    LinkedIn,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::LinkedIn => "linkedin",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "twitter" | "x" => Ok(Platform::Twitter),
            "linkedin" => Ok(Platform::LinkedIn),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

/// What to publish.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub text: String,
    pub image_url: Option<String>,
    pub schedule: Schedule,
    pub organization: bool,
}

/// Outcome of publishing to one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    pub platform: Platform,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PublishResult {
    pub fn failed(platform: Platform, error: impl Into<String>) -> Self {
        Self {
            platform,
            success: false,
            post_id: None,
            post_url: None,
            error: Some(error.into()),
        }
    }
}

/// Credentials check result for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthStatus {
    pub authorized: bool,
    pub detail: Option<String>,
}

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, CollabError>;
}

#[async_trait]
pub trait RelevancyClassifier: Send + Sync {
    /// Whether `content` matches the topical `policy`.
    async fn is_relevant(&self, content: &str, policy: &str) -> Result<bool, CollabError>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<String, CollabError>;
}

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn auth_check(&self, platform: Platform) -> Result<AuthStatus, CollabError>;

    async fn post(
        &self,
        platform: Platform,
        request: &PublishRequest,
    ) -> Result<PublishResult, CollabError>;
}

pub trait DateParser: Send + Sync {
    /// Parses `input` relative to `now`. Does not check that the result is in the future.
    fn parse(&self, input: &str, now: DateTime<Utc>) -> Result<Schedule, ScheduleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_parse_and_display() {
        assert_eq!("LinkedIn".parse::<Platform>().unwrap(), Platform::LinkedIn);
        assert_eq!("x".parse::<Platform>().unwrap(), Platform::Twitter);
        assert!("myspace".parse::<Platform>().is_err());
        assert_eq!(Platform::Twitter.to_string(), "twitter");
    }

    #[test]
    fn publish_result_serializes_camel_case() {
        let r = PublishResult::failed(Platform::LinkedIn, "expired token");
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"platform": "linkedin", "success": false, "error": "expired token"})
        );
    }
}
