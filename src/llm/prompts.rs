use crate::llm::provider::ChatMessage;
use crate::models::{ChangedFile, PullRequest, ValidationRule};

const ROLE_STATEMENT: &str =
    "You are an experienced senior software engineer reviewing a pull request.\nCheck the changes against these validation rules:";

const OUTPUT_SCHEMA: &str = r#"You must respond with valid JSON matching this exact schema:
{
    "approved": true|false,
    "score": 0-100,
    "issues": ["string describing a problem that must be fixed"],
    "suggestions": ["string describing an optional improvement"],
    "summary": "string summarizing the change and the review"
}"#;

const GUIDELINES: &str = r#"Guidelines:
- Set "approved" to false if any REQUIRED rule is violated
- List every violation or problem in "issues", naming the file it occurs in
- OPTIONAL rules never block approval; mention them in "suggestions" instead
- "score" rates overall code quality from 0 (unacceptable) to 100 (excellent)
- Keep "summary" to two or three sentences"#;

const NO_DESCRIPTION: &str = "No description provided.";

/// The system and user prompt for one review request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPrompt {
    pub system: String,
    pub user: String,
}

impl ReviewPrompt {
    pub fn build(rules: &[ValidationRule], pr: &PullRequest, files: &[ChangedFile]) -> Self {
        Self {
            system: system_prompt(rules),
            user: user_prompt(pr, files),
        }
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.clone()),
            ChatMessage::user(self.user.clone()),
        ]
    }
}

fn system_prompt(rules: &[ValidationRule]) -> String {
    let mut prompt = String::from(ROLE_STATEMENT);
    prompt.push('\n');

    for rule in rules {
        prompt.push_str(&format!(
            "- {}: {} ({})\n",
            rule.name,
            rule.description,
            rule.label()
        ));
    }

    prompt.push('\n');
    prompt.push_str(OUTPUT_SCHEMA);
    prompt.push_str("\n\n");
    prompt.push_str(GUIDELINES);
    prompt
}

fn user_prompt(pr: &PullRequest, files: &[ChangedFile]) -> String {
    let description = pr
        .body
        .as_deref()
        .filter(|b| !b.trim().is_empty())
        .unwrap_or(NO_DESCRIPTION);

    let mut prompt = format!("Pull Request: {}\n", pr.title);
    prompt.push_str(&format!("Description: {}\n", description));
    prompt.push_str(&format!("Author: {}\n", pr.user.login));
    prompt.push_str(&format!("Files changed: {}\n\n", files.len()));

    for file in files {
        prompt.push_str(&format!("### File: {}\n", file.filename));
        prompt.push_str(&format!("Status: {}\n", file.status));
        prompt.push_str(&format!("Changes: +{}/-{}\n", file.additions, file.deletions));

        if let Some(patch) = &file.patch {
            prompt.push_str("```diff\n");
            prompt.push_str(patch);
            if !patch.ends_with('\n') {
                prompt.push('\n');
            }
            prompt.push_str("```\n");
        }
        prompt.push('\n');
    }

    prompt.push_str("Provide your review as JSON:\n");
    prompt
}
