use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::collab::TextGenerator;
use crate::error::PipelineError;
use crate::graph::Node;
use crate::prompts;
use crate::state::{PostState, PostUpdate, Stage, Status};
use crate::verify::MAX_SNIPPET_CHARS;

use super::non_blank;

const FALLBACK_SNIPPET_CHARS: usize = MAX_SNIPPET_CHARS / 4;

/// Report assembled from the fetched snippets when generation fails. Empty without
/// snippets.
pub(crate) fn fallback_report(state: &PostState) -> String {
    let mut parts = Vec::new();
    for content in state.page_contents.iter().filter(|c| !c.trim().is_empty()) {
        let snippet: String = content.trim().chars().take(FALLBACK_SNIPPET_CHARS).collect();
        parts.push(snippet);
    }
    if parts.is_empty() {
        return String::new();
    }
    let sources: Vec<&str> = state.relevant_links.iter().map(String::as_str).collect();
    format!("Sources: {}\n\n{}", sources.join(", "), parts.join("\n\n"))
}

pub struct GenerateReportNode {
    generator: Arc<dyn TextGenerator>,
}

impl GenerateReportNode {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Node<PostState, Stage> for GenerateReportNode {
    fn id(&self) -> Stage {
        Stage::GenerateReport
    }

    async fn run(&self, state: PostState) -> Result<PostUpdate, PipelineError> {
        let links: Vec<String> = state.relevant_links.iter().cloned().collect();
        let prompt = prompts::report_prompt(&links, &state.page_contents);
        let generated = self.generator.generate(&prompt).await.map(non_blank);
        let (report, status) = match generated {
            Ok(Some(report)) => (report, Status::ReportGenerated),
            Ok(None) => {
                warn!("report generation returned nothing, using snippets");
                (fallback_report(&state), Status::ReportFallback)
            }
            Err(e) => {
                warn!(error = %e, "report generation failed, using snippets");
                (fallback_report(&state), Status::ReportFallback)
            }
        };
        info!(chars = report.chars().count(), status = %status, "report ready");
        Ok(PostUpdate {
            report: Some(report),
            status: Some(status),
            ..PostUpdate::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::mock::MockGenerator;

    fn state() -> PostState {
        PostState {
            relevant_links: ["https://a.com".to_string()].into(),
            page_contents: vec!["Rust 2.0 released".into()],
            ..PostState::default()
        }
    }

    #[tokio::test]
    async fn uses_generated_report() {
        let node = GenerateReportNode::new(Arc::new(MockGenerator::fixed("A report")));
        let u = node.run(state()).await.unwrap();
        assert_eq!(u.report.as_deref(), Some("A report"));
        assert_eq!(u.status, Some(Status::ReportGenerated));
    }

    #[tokio::test]
    async fn falls_back_to_snippets() {
        let node = GenerateReportNode::new(Arc::new(MockGenerator::failing()));
        let u = node.run(state()).await.unwrap();
        let report = u.report.unwrap();
        assert!(report.contains("https://a.com"));
        assert!(report.contains("Rust 2.0 released"));
        assert_eq!(u.status, Some(Status::ReportFallback));
    }

    #[test]
    fn fallback_without_snippets_is_empty() {
        assert!(fallback_report(&PostState::default()).is_empty());
    }
}
