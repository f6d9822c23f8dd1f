//! CLI command handlers over a temp database and scripted collaborators.

use std::sync::Arc;

use linkpost::collab::mock::{
    MockClassifier, MockDateParser, MockFetcher, MockGenerator, MockPublisher,
};
use linkpost::prompts::PromptKind;
use linkpost::{Collaborators, Pipeline, PipelineConfig, PipelineError, PipelineSettings};

const LINK: &str = "https://news.example.org/story";

fn open(db: &std::path::Path) -> Pipeline {
    let collab = Collaborators {
        fetcher: Arc::new(MockFetcher::new().with_page(LINK, "A story about Rust tooling.")),
        classifier: Arc::new(MockClassifier::always(true)),
        generator: Arc::new(
            MockGenerator::fixed("unused")
                .with(PromptKind::Report, "report")
                .with(PromptKind::Post, "Rust tooling keeps getting better."),
        ),
        publisher: Arc::new(MockPublisher::new()),
        date_parser: Arc::new(MockDateParser::new()),
        clock: linkpost::nodes::system_clock(),
    };
    cli::open_pipeline(db, collab, PipelineSettings::default()).unwrap()
}

/// **Scenario**: run prints a suspension, status shows it, resume completes it, and the
/// cache commands see the published link.
#[tokio::test]
async fn run_status_resume_cache() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("nested").join("linkpost.db");
    let pipeline = open(&db);

    let out = cli::run(
        &pipeline,
        vec![LINK.into()],
        PipelineConfig::default(),
        Some("cli-1".into()),
    )
    .await
    .unwrap();
    assert_eq!(out["status"], "suspended");
    assert_eq!(out["runId"], "cli-1");
    assert_eq!(out["stage"], "human_review");
    assert_eq!(out["payload"]["action"], "review_post");

    let status = cli::status(&pipeline, "cli-1").await.unwrap();
    assert_eq!(status["suspended"], true);
    assert_eq!(status["pausedStage"], "human_review");
    assert_eq!(status["checkpoints"], 1);

    let out = cli::resume(&pipeline, "cli-1", "accept").await.unwrap();
    assert_eq!(out["status"], "completed");
    assert_eq!(out["runStatus"], "published");
    assert_eq!(out["publishResults"].as_array().unwrap().len(), 2);

    let cached = cli::cache_show(&pipeline).await;
    assert_eq!(cached["data"], serde_json::json!([LINK]));
    cli::cache_clear(&pipeline).await.unwrap();
    assert_eq!(cli::cache_show(&pipeline).await["data"], serde_json::json!([]));
}

/// **Scenario**: a JSON response on the command line is parsed as a typed response.
#[tokio::test]
async fn resume_accepts_json_text() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = open(&dir.path().join("linkpost.db"));
    cli::run(&pipeline, vec![LINK.into()], PipelineConfig::default(), Some("j".into()))
        .await
        .unwrap();
    let out = cli::resume(&pipeline, "j", r#"{"type":"ignore"}"#).await.unwrap();
    assert_eq!(out["status"], "completed");
    assert_eq!(out["runStatus"], "ignored");
}

#[tokio::test]
async fn errors_for_unknown_run_and_empty_links() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = open(&dir.path().join("linkpost.db"));
    assert!(matches!(
        cli::status(&pipeline, "nope").await,
        Err(cli::CliError::Pipeline(PipelineError::RunNotFound(_)))
    ));
    assert!(matches!(
        cli::run(&pipeline, Vec::new(), PipelineConfig::default(), None).await,
        Err(cli::CliError::Usage(_))
    ));
}

#[test]
fn graph_text_and_dot() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = open(&dir.path().join("linkpost.db"));
    assert!(cli::graph(&pipeline, false).contains("Entry: check_links"));
    assert!(cli::graph(&pipeline, true).starts_with("digraph"));
}
