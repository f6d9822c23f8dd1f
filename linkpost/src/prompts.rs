//! Prompts sent to the [`TextGenerator`](crate::collab::TextGenerator).

use std::fmt;

use serde::Serialize;

/// Default topical policy for the relevancy check.
pub const DEFAULT_RELEVANCY_POLICY: &str = "The content is about software engineering, \
developer tooling, AI/LLM applications, agents, or open-source infrastructure. \
Marketing pages, login walls, cookie notices and unrelated news are not relevant.";

/// Which stage a prompt serves. Lets test doubles answer per purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Relevancy,
    Report,
    Post,
    Condense,
    Rewrite,
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PromptKind::Relevancy => "relevancy",
            PromptKind::Report => "report",
            PromptKind::Post => "post",
            PromptKind::Condense => "condense",
            PromptKind::Rewrite => "rewrite",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(kind: PromptKind, system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            kind,
            system: system.into(),
            user: user.into(),
        }
    }
}

pub fn relevancy_prompt(content: &str, policy: &str) -> Prompt {
    Prompt::new(
        PromptKind::Relevancy,
        "You decide whether web page content matches a topical policy. \
         Answer with a single word: yes or no.",
        format!("Policy:\n{}\n\nContent:\n{}", policy, content),
    )
}

pub fn report_prompt(links: &[String], contents: &[String]) -> Prompt {
    let mut user = String::from("Sources:\n");
    for link in links {
        user.push_str("- ");
        user.push_str(link);
        user.push('\n');
    }
    user.push_str("\nExtracted content:\n");
    for (i, content) in contents.iter().enumerate() {
        user.push_str(&format!("\n<page {}>\n{}\n</page {}>\n", i + 1, content, i + 1));
    }
    Prompt::new(
        PromptKind::Report,
        "You are a technical analyst. Write a concise marketing report about the linked \
         content: what it is, who it is for, and the key takeaways. Plain text, no preamble.",
        user,
    )
}

/// Asks for the post body only; the link is appended afterwards.
pub fn post_prompt(report: &str, link: &str, limit: usize) -> Prompt {
    let budget = limit.saturating_sub(link.chars().count() + 2);
    Prompt::new(
        PromptKind::Post,
        format!(
            "You write engaging social media posts for a developer audience. \
             Write the post body only, at most {} characters. Do not include the link, \
             hashtags, or quotes around the text.",
            budget
        ),
        format!("Report:\n{}\n\nThe post will link to: {}", report, link),
    )
}

pub fn condense_prompt(post: &str, limit: usize, current_len: usize) -> Prompt {
    Prompt::new(
        PromptKind::Condense,
        format!(
            "Shorten the social media post to at most {} characters while keeping its \
             meaning, tone and any link exactly as written. Reply with the post only.",
            limit
        ),
        format!("Current length: {} characters.\n\nPost:\n{}", current_len, post),
    )
}

pub fn rewrite_prompt(post: &str, feedback: &str, limit: usize) -> Prompt {
    Prompt::new(
        PromptKind::Rewrite,
        format!(
            "Rewrite the social media post following the reviewer's feedback. Keep any link \
             exactly as written and stay under {} characters. Reply with the post only.",
            limit
        ),
        format!("Post:\n{}\n\nFeedback:\n{}", post, feedback),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_prompt_reserves_room_for_link() {
        let p = post_prompt("report", "https://a.com", 280);
        assert_eq!(p.kind, PromptKind::Post);
        assert!(p.system.contains("at most 265 characters"));
        assert!(p.user.contains("https://a.com"));
    }

    #[test]
    fn report_prompt_numbers_pages() {
        let p = report_prompt(&["https://a.com".into()], &["one".into(), "two".into()]);
        assert!(p.user.contains("<page 2>\ntwo"));
        assert!(p.user.contains("- https://a.com"));
    }
}
