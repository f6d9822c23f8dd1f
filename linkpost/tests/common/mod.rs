//! Pipeline harness over scripted collaborators and a fixed clock.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use linkpost::collab::mock::{
    MockClassifier, MockDateParser, MockFetcher, MockGenerator, MockPublisher,
};
use linkpost::memory::{InMemoryStore, MemorySaver};
use linkpost::prompts::PromptKind;
use linkpost::{
    Collaborators, LinkCache, Pipeline, PipelineCheckpointer, PipelineOutcome, PipelineSettings,
    PostState, RunOutcome, Stage, Suspension,
};

pub const LINK: &str = "https://blog.example.com/launch";

/// Sunday 2026-10-18 12:00 UTC.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

/// Post body that composes with [`LINK`] into exactly `total` chars.
pub fn body_for_total(total: usize) -> String {
    "a".repeat(total - LINK.chars().count() - 2)
}

pub struct Harness {
    pub fetcher: Arc<MockFetcher>,
    pub generator: Arc<MockGenerator>,
    pub publisher: Arc<MockPublisher>,
    pub date_parser: Arc<MockDateParser>,
    pub cache: Arc<LinkCache>,
    pub checkpointer: PipelineCheckpointer,
    pub pipeline: Pipeline,
}

impl Harness {
    /// Default fetcher serving [`LINK`], a generator answering a short post, and an
    /// in-memory cache and checkpointer.
    pub fn new() -> Self {
        Self::with(default_fetcher(), default_generator(), MockPublisher::new())
    }

    pub fn with(fetcher: MockFetcher, generator: MockGenerator, publisher: MockPublisher) -> Self {
        let cache = Arc::new(LinkCache::new(Arc::new(InMemoryStore::new())));
        let checkpointer: PipelineCheckpointer = Arc::new(MemorySaver::<PostState, Stage>::new());
        Self::build(fetcher, generator, publisher, cache, checkpointer)
    }

    pub fn build(
        fetcher: MockFetcher,
        generator: MockGenerator,
        publisher: MockPublisher,
        cache: Arc<LinkCache>,
        checkpointer: PipelineCheckpointer,
    ) -> Self {
        let fetcher = Arc::new(fetcher);
        let generator = Arc::new(generator);
        let publisher = Arc::new(publisher);
        let date_parser = Arc::new(MockDateParser::new());
        let collab = Collaborators {
            fetcher: fetcher.clone(),
            classifier: Arc::new(MockClassifier::always(true)),
            generator: generator.clone(),
            publisher: publisher.clone(),
            date_parser: date_parser.clone(),
            clock: Arc::new(now),
        };
        let pipeline = Pipeline::new(
            collab,
            cache.clone(),
            Some(checkpointer.clone()),
            PipelineSettings::default(),
        )
        .unwrap();
        Self {
            fetcher,
            generator,
            publisher,
            date_parser,
            cache,
            checkpointer,
            pipeline,
        }
    }
}

pub fn default_fetcher() -> MockFetcher {
    MockFetcher::new().with_page_images(
        LINK,
        "We launched a new open source agent framework.",
        &["https://blog.example.com/hero.png"],
    )
}

pub fn default_generator() -> MockGenerator {
    MockGenerator::fixed("unused")
        .with(PromptKind::Report, "Report: an open source agent framework launched.")
        .with(PromptKind::Post, "New open source agent framework, worth a look.")
        .with(PromptKind::Rewrite, "Rewritten: a punchy take on the new framework.")
}

pub fn expect_suspended(outcome: PipelineOutcome) -> Suspension<PostState, Stage> {
    match outcome {
        RunOutcome::Suspended(s) => s,
        RunOutcome::Completed(state) => panic!("expected suspension, completed with {:?}", state.status),
    }
}

pub fn expect_completed(outcome: PipelineOutcome) -> PostState {
    match outcome {
        RunOutcome::Completed(state) => state,
        RunOutcome::Suspended(s) => panic!("expected completion, suspended at {:?}", s.stage()),
    }
}
