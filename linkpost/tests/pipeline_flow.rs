//! End-to-end runs of the link → post pipeline over scripted collaborators.

mod common;

use chrono::{TimeZone, Utc};
use linkpost::collab::mock::{MockFetcher, MockGenerator, MockPublisher};
use linkpost::nodes::UNKNOWN_RESPONSE_NOTE;
use linkpost::prompts::PromptKind;
use linkpost::{
    HumanResponse, PipelineConfig, PipelineError, RunOutcome, Schedule, Stage, Status,
};
use serde_json::json;

use common::{body_for_total, expect_completed, expect_suspended, Harness, LINK};

fn links(urls: &[&str]) -> Vec<String> {
    urls.iter().map(|s| s.to_string()).collect()
}

/// **Scenario**: a fresh link runs through verification, report and post, then pauses for
/// review with a payload describing the post.
#[tokio::test]
async fn fresh_link_pauses_for_review() {
    let h = Harness::new();
    let s = expect_suspended(
        h.pipeline
            .start(links(&[LINK]), PipelineConfig::default(), Some("run-1".into()))
            .await
            .unwrap(),
    );
    assert_eq!(s.run_id(), "run-1");
    assert_eq!(s.stage(), Some(Stage::HumanReview));
    assert_eq!(s.payload["action"], "review_post");
    assert_eq!(s.payload["post"]["sourceLink"], LINK);
    assert_eq!(s.payload["post"]["imageUrl"], "https://blog.example.com/hero.png");
    assert_eq!(s.payload["allowedActions"]["accept"], true);

    let state = s.state();
    assert_eq!(state.status, Status::PostGenerated);
    assert!(state.post.ends_with(LINK));
    assert!(state.relevant_links.contains(LINK));
    assert_eq!(h.generator.calls(PromptKind::Report), 1);
    assert_eq!(h.generator.calls(PromptKind::Post), 1);
    assert_eq!(h.generator.calls(PromptKind::Condense), 0);
    assert!(h.publisher.posts().is_empty());
}

/// **Scenario**: links already in the cache are split off; only new ones are fetched.
#[tokio::test]
async fn cached_links_are_partitioned_out() {
    let h = Harness::new();
    h.cache.put(&links(&["https://old.example.com"])).await.unwrap();
    let s = expect_suspended(
        h.pipeline
            .start(
                links(&["https://old.example.com", LINK]),
                PipelineConfig::default(),
                None,
            )
            .await
            .unwrap(),
    );
    assert_eq!(s.state().links, links(&[LINK]));
    assert_eq!(s.state().duplicate_links, links(&["https://old.example.com"]));
    assert_eq!(h.fetcher.calls(), links(&[LINK]));
}

/// **Scenario**: every link was used before; the run ends without generating or publishing.
#[tokio::test]
async fn all_duplicates_end_the_run() {
    let h = Harness::new();
    h.cache.put(&links(&[LINK])).await.unwrap();
    let state = expect_completed(
        h.pipeline
            .start(links(&[LINK]), PipelineConfig::default(), None)
            .await
            .unwrap(),
    );
    assert_eq!(state.status, Status::NoNewLinks);
    assert!(state.links.is_empty());
    assert!(h.fetcher.calls().is_empty());
    assert!(h.generator.prompts().is_empty());
    assert!(h.publisher.posts().is_empty());
}

/// **Scenario**: skipping the dedup check fetches a cached link anyway.
#[tokio::test]
async fn skip_dedup_uses_cached_link() {
    let h = Harness::new();
    h.cache.put(&links(&[LINK])).await.unwrap();
    let config = PipelineConfig {
        skip_dedup_check: true,
        ..PipelineConfig::default()
    };
    let s = expect_suspended(h.pipeline.start(links(&[LINK]), config, None).await.unwrap());
    assert!(s.state().duplicate_links.is_empty());
    assert_eq!(h.fetcher.calls(), links(&[LINK]));
}

/// **Scenario**: a 320-char post is condensed to 260 chars once, then goes to review.
#[tokio::test]
async fn over_limit_post_is_condensed_once() {
    let generator = MockGenerator::fixed("unused")
        .with(PromptKind::Report, "report")
        .with(PromptKind::Post, body_for_total(320))
        .with(PromptKind::Condense, "c".repeat(260));
    let h = Harness::with(common::default_fetcher(), generator, MockPublisher::new());
    let s = expect_suspended(
        h.pipeline
            .start(links(&[LINK]), PipelineConfig::default(), None)
            .await
            .unwrap(),
    );
    assert_eq!(s.state().post_len(), 260);
    assert_eq!(s.state().condense_count.get(), 1);
    assert_eq!(s.payload["post"]["characterCount"], 260);
    assert_eq!(s.payload["post"]["withinLimit"], true);
    assert_eq!(h.generator.calls(PromptKind::Condense), 1);
}

/// **Scenario**: condensing never gets under the limit; after three attempts the post
/// goes to review over the limit.
#[tokio::test]
async fn condense_retries_are_capped() {
    let generator = MockGenerator::fixed("unused")
        .with(PromptKind::Report, "report")
        .with(PromptKind::Post, body_for_total(320))
        .with(PromptKind::Condense, "c".repeat(300));
    let h = Harness::with(common::default_fetcher(), generator, MockPublisher::new());
    let s = expect_suspended(
        h.pipeline
            .start(links(&[LINK]), PipelineConfig::default(), None)
            .await
            .unwrap(),
    );
    assert_eq!(h.generator.calls(PromptKind::Condense), 3);
    assert_eq!(s.state().condense_count.get(), 3);
    assert_eq!(s.payload["post"]["withinLimit"], false);
}

/// **Scenario**: accepting publishes to every platform and records the links as used.
#[tokio::test]
async fn accept_publishes_and_caches_links() {
    let h = Harness::new();
    expect_suspended(
        h.pipeline
            .start(links(&[LINK]), PipelineConfig::default(), Some("acc".into()))
            .await
            .unwrap(),
    );
    let state = expect_completed(h.pipeline.resume("acc", &json!("accept")).await.unwrap());
    assert_eq!(state.status, Status::Published);
    assert_eq!(state.publish_results.len(), 2);
    assert!(state.publish_results.iter().all(|r| r.success));

    let posts = h.publisher.posts();
    assert_eq!(posts.len(), 2);
    assert!(posts[0].1.text.ends_with(LINK));
    assert_eq!(posts[0].1.schedule, Schedule::default());
    assert!(h.cache.get().await.contains(LINK));
}

/// **Scenario**: text-only mode publishes without an image.
#[tokio::test]
async fn text_only_publishes_without_image() {
    let h = Harness::new();
    let config = PipelineConfig {
        text_only_mode: true,
        ..PipelineConfig::default()
    };
    let s = expect_suspended(
        h.pipeline
            .start(links(&[LINK]), config, Some("txt".into()))
            .await
            .unwrap(),
    );
    assert_eq!(s.payload["post"]["hasImage"], false);
    expect_completed(
        h.pipeline
            .resume_with("txt", HumanResponse::Accept)
            .await
            .unwrap(),
    );
    assert!(h.publisher.posts().iter().all(|(_, req)| req.image_url.is_none()));
}

/// **Scenario**: a failing platform is reported but the cache is still updated by the
/// successful one.
#[tokio::test]
async fn partial_publish_failure() {
    let h = Harness::with(
        common::default_fetcher(),
        common::default_generator(),
        MockPublisher::new().failing(linkpost::collab::Platform::LinkedIn),
    );
    expect_suspended(
        h.pipeline
            .start(links(&[LINK]), PipelineConfig::default(), Some("p".into()))
            .await
            .unwrap(),
    );
    let state = expect_completed(h.pipeline.resume("p", &json!("yes")).await.unwrap());
    assert_eq!(state.publish_results.iter().filter(|r| r.success).count(), 1);
    assert!(h.cache.get().await.contains(LINK));
}

/// **Scenario**: ignoring ends the run with nothing published and the cache untouched.
#[tokio::test]
async fn ignore_ends_without_publishing() {
    let h = Harness::new();
    expect_suspended(
        h.pipeline
            .start(links(&[LINK]), PipelineConfig::default(), Some("ign".into()))
            .await
            .unwrap(),
    );
    let state = expect_completed(
        h.pipeline
            .resume("ign", &json!({"type": "ignore"}))
            .await
            .unwrap(),
    );
    assert_eq!(state.status, Status::Ignored);
    assert!(h.publisher.posts().is_empty());
    assert!(h.cache.get().await.is_empty());
}

/// **Scenario**: edit feedback rewrites the post and returns to review.
#[tokio::test]
async fn edit_rewrites_and_reviews_again() {
    let h = Harness::new();
    expect_suspended(
        h.pipeline
            .start(links(&[LINK]), PipelineConfig::default(), Some("ed".into()))
            .await
            .unwrap(),
    );
    let s = expect_suspended(
        h.pipeline
            .resume("ed", &json!("make it punchier"))
            .await
            .unwrap(),
    );
    assert_eq!(s.stage(), Some(Stage::HumanReview));
    assert!(s.state().post.starts_with("Rewritten:"));
    assert!(s.state().pending_response.is_none());
    let rewrite = h
        .generator
        .prompts()
        .into_iter()
        .find(|p| p.kind == PromptKind::Rewrite)
        .unwrap();
    assert!(rewrite.user.contains("make it punchier"));
}

/// **Scenario**: an unrecognized response loops back to review with an explanatory note.
#[tokio::test]
async fn malformed_response_asks_again() {
    let h = Harness::new();
    let first = expect_suspended(
        h.pipeline
            .start(links(&[LINK]), PipelineConfig::default(), Some("bad".into()))
            .await
            .unwrap(),
    );
    let s = expect_suspended(h.pipeline.resume("bad", &json!(42)).await.unwrap());
    assert_eq!(s.stage(), Some(Stage::HumanReview));
    assert_ne!(s.checkpoint_id(), first.checkpoint_id());
    assert_eq!(s.state().feedback.as_deref(), Some(UNKNOWN_RESPONSE_NOTE));
    assert_eq!(s.state().post, first.state().post);
    assert!(s.payload["instructions"]
        .as_str()
        .unwrap()
        .contains(UNKNOWN_RESPONSE_NOTE));
    assert!(h.publisher.posts().is_empty());
}

/// **Scenario**: "next monday" moves the schedule; a past date is rejected and the
/// schedule stays.
#[tokio::test]
async fn schedule_changes_and_rejections() {
    let h = Harness::new();
    expect_suspended(
        h.pipeline
            .start(links(&[LINK]), PipelineConfig::default(), Some("sch".into()))
            .await
            .unwrap(),
    );
    let monday = Schedule::At(Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap());

    let s = expect_suspended(
        h.pipeline
            .resume(
                "sch",
                &json!({"type": "respond", "args": {"scheduleDate": "next monday"}}),
            )
            .await
            .unwrap(),
    );
    assert_eq!(s.state().schedule, monday);
    assert!(s.state().feedback.is_none());

    let s = expect_suspended(
        h.pipeline
            .resume(
                "sch",
                &json!({"type": "respond", "args": {"scheduleDate": "2020-01-01"}}),
            )
            .await
            .unwrap(),
    );
    assert_eq!(s.state().schedule, monday);
    assert!(s.state().feedback.as_deref().unwrap().contains("in the past"));
    assert_eq!(h.date_parser.inputs(), vec!["next monday", "2020-01-01"]);

    let state = expect_completed(h.pipeline.resume("sch", &json!("accept")).await.unwrap());
    assert_eq!(state.schedule, monday);
    assert_eq!(h.publisher.posts()[0].1.schedule, monday);
}

/// **Scenario**: no fetched link is relevant; the run ends before the report.
#[tokio::test]
async fn unreachable_links_end_the_run() {
    let h = Harness::with(
        MockFetcher::new().with_failure(LINK),
        common::default_generator(),
        MockPublisher::new(),
    );
    let state = expect_completed(
        h.pipeline
            .start(links(&[LINK]), PipelineConfig::default(), None)
            .await
            .unwrap(),
    );
    assert!(state.relevant_links.is_empty());
    assert_eq!(h.generator.calls(PromptKind::Report), 0);
    assert!(h.publisher.posts().is_empty());
}

/// **Scenario**: resuming a finished run or an unknown run fails with a typed error.
#[tokio::test]
async fn resume_errors() {
    let h = Harness::new();
    expect_suspended(
        h.pipeline
            .start(links(&[LINK]), PipelineConfig::default(), Some("done".into()))
            .await
            .unwrap(),
    );
    expect_completed(h.pipeline.resume("done", &json!("accept")).await.unwrap());

    match h.pipeline.resume("done", &json!("accept")).await {
        Err(PipelineError::NotSuspended(id)) => assert_eq!(id, "done"),
        other => panic!("unexpected {:?}", other.map(|o| o.is_suspended())),
    }
    match h.pipeline.resume("missing", &json!("accept")).await {
        Err(PipelineError::RunNotFound(id)) => assert_eq!(id, "missing"),
        other => panic!("unexpected {:?}", other.map(|o| o.is_suspended())),
    }
    assert_eq!(h.publisher.posts().len(), 2);
}

/// **Scenario**: the checkpoint history records the pause and the completion.
#[tokio::test]
async fn history_tracks_checkpoints() {
    let h = Harness::new();
    expect_suspended(
        h.pipeline
            .start(links(&[LINK]), PipelineConfig::default(), Some("hist".into()))
            .await
            .unwrap(),
    );
    let outcome = h.pipeline.resume("hist", &json!("ignore")).await.unwrap();
    assert!(matches!(outcome, RunOutcome::Completed(_)));
    let history = h.pipeline.history("hist", None).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].paused_stage.as_deref(), Some("human_review"));
    assert!(history[1].paused_stage.is_none());
    let latest = h.pipeline.state("hist").await.unwrap().unwrap();
    assert!(!latest.is_suspended());
}
