//! Scriptable test doubles for every collaborator trait. No network.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::prompts::{Prompt, PromptKind};
use crate::schedule::{Schedule, ScheduleError};

use super::{
    AuthStatus, BasicDateParser, CollabError, ContentFetcher, DateParser, FetchedPage, Platform,
    PublishRequest, PublishResult, Publisher, RelevancyClassifier, TextGenerator,
};

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Serves pages from a map. Unknown URLs fail.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, Result<FetchedPage, CollabError>>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, content: &str) -> Self {
        self.with_page_images(url, content, &[])
    }

    pub fn with_page_images(mut self, url: &str, content: &str, images: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            Ok(FetchedPage {
                content: content.to_string(),
                image_urls: images.iter().map(|s| s.to_string()).collect(),
            }),
        );
        self
    }

    pub fn with_failure(mut self, url: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            Err(CollabError::Fetch(format!("mock failure for {}", url))),
        );
        self
    }

    /// Delays the response for `url`, to force a completion order.
    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, CollabError> {
        lock(&self.calls).push(url.to_string());
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        self.pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(CollabError::Fetch(format!("no page for {}", url))))
    }
}

enum Verdict {
    Always(bool),
    Keyword(String),
    Fail,
}

/// Relevancy classifier with a fixed rule.
pub struct MockClassifier {
    verdict: Verdict,
    calls: AtomicUsize,
}

impl MockClassifier {
    pub fn always(relevant: bool) -> Self {
        Self {
            verdict: Verdict::Always(relevant),
            calls: AtomicUsize::new(0),
        }
    }

    /// Relevant when the content contains `keyword`.
    pub fn keyword(keyword: &str) -> Self {
        Self {
            verdict: Verdict::Keyword(keyword.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            verdict: Verdict::Fail,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelevancyClassifier for MockClassifier {
    async fn is_relevant(&self, content: &str, _policy: &str) -> Result<bool, CollabError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.verdict {
            Verdict::Always(v) => Ok(*v),
            Verdict::Keyword(k) => Ok(content.contains(k.as_str())),
            Verdict::Fail => Err(CollabError::Classify("mock classifier down".to_string())),
        }
    }
}

/// Text generator answering from per-[`PromptKind`] scripts.
///
/// Each script is a queue; the last entry repeats once the others are used up. Kinds
/// without a script get the fallback answer.
pub struct MockGenerator {
    scripts: Mutex<HashMap<PromptKind, VecDeque<Result<String, CollabError>>>>,
    fallback: Result<String, CollabError>,
    prompts: Mutex<Vec<Prompt>>,
}

impl MockGenerator {
    /// Answers `text` to every prompt.
    pub fn fixed(text: &str) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            fallback: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fails every prompt.
    pub fn failing() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            fallback: Err(CollabError::Generate("mock generator down".to_string())),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queues an answer for prompts of `kind`.
    pub fn with(self, kind: PromptKind, text: impl Into<String>) -> Self {
        self.push(kind, Ok(text.into()))
    }

    /// Queues a failure for prompts of `kind`.
    pub fn with_failure(self, kind: PromptKind) -> Self {
        self.push(
            kind,
            Err(CollabError::Generate(format!("mock {} failure", kind))),
        )
    }

    fn push(self, kind: PromptKind, answer: Result<String, CollabError>) -> Self {
        lock(&self.scripts).entry(kind).or_default().push_back(answer);
        self
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        lock(&self.prompts).clone()
    }

    pub fn calls(&self, kind: PromptKind) -> usize {
        lock(&self.prompts).iter().filter(|p| p.kind == kind).count()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &Prompt) -> Result<String, CollabError> {
        lock(&self.prompts).push(prompt.clone());
        let mut scripts = lock(&self.scripts);
        match scripts.get_mut(&prompt.kind) {
            Some(queue) if queue.len() > 1 => queue
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone()),
            Some(queue) => queue.front().cloned().unwrap_or_else(|| self.fallback.clone()),
            None => self.fallback.clone(),
        }
    }
}

/// Publisher that records requests. Every platform is authorized and succeeds unless
/// configured otherwise.
#[derive(Default)]
pub struct MockPublisher {
    unauthorized: HashSet<Platform>,
    failing: HashSet<Platform>,
    auth_checks: Mutex<Vec<Platform>>,
    posts: Mutex<Vec<(Platform, PublishRequest)>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unauthorized(mut self, platform: Platform) -> Self {
        self.unauthorized.insert(platform);
        self
    }

    pub fn failing(mut self, platform: Platform) -> Self {
        self.failing.insert(platform);
        self
    }

    pub fn posts(&self) -> Vec<(Platform, PublishRequest)> {
        lock(&self.posts).clone()
    }

    pub fn auth_checks(&self) -> Vec<Platform> {
        lock(&self.auth_checks).clone()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn auth_check(&self, platform: Platform) -> Result<AuthStatus, CollabError> {
        lock(&self.auth_checks).push(platform);
        let authorized = !self.unauthorized.contains(&platform);
        Ok(AuthStatus {
            authorized,
            detail: (!authorized).then(|| "token expired".to_string()),
        })
    }

    async fn post(
        &self,
        platform: Platform,
        request: &PublishRequest,
    ) -> Result<PublishResult, CollabError> {
        lock(&self.posts).push((platform, request.clone()));
        if self.failing.contains(&platform) {
            return Err(CollabError::Publish(format!("mock {} rejected post", platform)));
        }
        let n = lock(&self.posts).len();
        Ok(PublishResult {
            platform,
            success: true,
            post_id: Some(format!("{}-{}", platform, n)),
            post_url: Some(format!("https://{}.example/posts/{}", platform, n)),
            error: None,
        })
    }
}

/// Date parser delegating to [`BasicDateParser`] and recording its inputs.
#[derive(Default)]
pub struct MockDateParser {
    inner: BasicDateParser,
    inputs: Mutex<Vec<String>>,
}

impl MockDateParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inputs(&self) -> Vec<String> {
        lock(&self.inputs).clone()
    }
}

impl DateParser for MockDateParser {
    fn parse(&self, input: &str, now: DateTime<Utc>) -> Result<Schedule, ScheduleError> {
        lock(&self.inputs).push(input.to_string());
        self.inner.parse(input, now)
    }
}
