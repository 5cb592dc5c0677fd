use crate::models::ExtractedIssue;

pub const SYSTEM_PROMPT: &str = r#"You are a technical writer preparing customer-facing release notes.
You receive one Jira issue at a time and describe the change it delivers.

Rules:
- Write exactly one sentence, at most 40 words, in plain English.
- Describe the benefit or behaviour change for the customer, not the implementation.
- Do not mention the issue key, internal team names, people, or ticket workflow.
- Do not use Markdown, bullet markers, quotes, or a preamble such as "Summary:".
- If the issue is a bug fix, phrase it as what now works correctly."#;

pub const ISSUE_TEMPLATE: &str = r#"Project: {project}
Issue: {key}
Type: {issue_type}
Title: {title}

Description:
{description}

Write the release note sentence for this issue:"#;

const MAX_DESCRIPTION_CHARS: usize = 3000;

/// Replaces only the `{placeholders}` that are provided, so literal braces survive.
pub fn render_template(template: &str, variables: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (name, value) in variables {
        rendered = rendered.replace(&format!("{{{}}}", name), value);
    }
    rendered
}

pub fn issue_prompt(issue: &ExtractedIssue) -> String {
    let description = if issue.raw_text.trim().is_empty() {
        "(no description provided)".to_string()
    } else {
        truncate_chars(issue.raw_text.trim(), MAX_DESCRIPTION_CHARS)
    };

    render_template(
        ISSUE_TEMPLATE,
        &[
            ("project", issue.project.as_str()),
            ("key", issue.key.as_str()),
            ("issue_type", issue.issue_type.as_str()),
            ("title", issue.title.as_str()),
            ("description", description.as_str()),
        ],
    )
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...\n[truncated]", &text[..byte_index]),
        None => text.to_string(),
    }
}
