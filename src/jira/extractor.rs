use serde_json::Value;

use crate::models::{ExtractedIssue, RawIssue};

const DEFAULT_ISSUE_TYPE: &str = "Other";

/// Reduces raw Jira records to the fields the summarizer needs.
///
/// Output order follows input order. Issues without a key are skipped: they can
/// be neither deduplicated nor cited in the final document.
pub fn extract(project_context: &str, issues: &[RawIssue]) -> Vec<ExtractedIssue> {
    let mut extracted = Vec::with_capacity(issues.len());

    for (index, issue) in issues.iter().enumerate() {
        let key = match issue.key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => {
                tracing::warn!("Skipping issue #{} without a key", index);
                continue;
            }
        };

        let project = issue
            .project_key()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(project_context)
            .to_string();

        let issue_type = issue
            .issue_type()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_ISSUE_TYPE)
            .to_string();

        extracted.push(ExtractedIssue {
            key,
            project,
            title: issue
                .fields
                .summary
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            issue_type,
            fix_version: issue.fix_version().map(|v| v.trim().to_string()),
            raw_text: issue
                .fields
                .description
                .as_ref()
                .map(description_text)
                .unwrap_or_default(),
        });
    }

    tracing::debug!(
        "Extracted {} of {} issues for {}",
        extracted.len(),
        issues.len(),
        project_context
    );
    extracted
}

/// Flattens a description into plain text. Accepts a plain string or an ADF document.
pub fn description_text(description: &Value) -> String {
    match description {
        Value::String(text) => text.trim().to_string(),
        Value::Null => String::new(),
        other => {
            let mut blocks = Vec::new();
            collect_blocks(other, &mut blocks);
            blocks.join("\n")
        }
    }
}

fn collect_blocks(node: &Value, blocks: &mut Vec<String>) {
    let children = node.get("content").and_then(Value::as_array);
    let node_type = node.get("type").and_then(Value::as_str).unwrap_or("");

    match node_type {
        "paragraph" | "heading" | "codeBlock" => {
            let mut line = String::new();
            collect_inline(node, &mut line);
            let line = line.trim();
            if !line.is_empty() {
                blocks.push(line.to_string());
            }
        }
        _ => {
            if let Some(children) = children {
                for child in children {
                    collect_blocks(child, blocks);
                }
            }
        }
    }
}

fn collect_inline(node: &Value, out: &mut String) {
    match node.get("type").and_then(Value::as_str) {
        Some("text") => {
            if let Some(text) = node.get("text").and_then(Value::as_str) {
                out.push_str(text);
            }
        }
        Some("hardBreak") => out.push(' '),
        Some("mention") | Some("emoji") => {
            if let Some(text) = node
                .get("attrs")
                .and_then(|a| a.get("text"))
                .and_then(Value::as_str)
            {
                out.push_str(text);
            }
        }
        _ => {}
    }

    if let Some(children) = node.get("content").and_then(Value::as_array) {
        for child in children {
            collect_inline(child, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawIssue {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_extract_minimal_fields() {
        let issues = vec![raw(json!({
            "key": "CUU2-7",
            "fields": {
                "summary": " Faster login ",
                "description": "Login now takes one step.",
                "issuetype": {"name": "Improvement"},
                "project": {"key": "CUU2"},
                "fixVersions": [{"name": "3.1"}]
            }
        }))];

        let extracted = extract("Communicator", &issues);
        assert_eq!(
            extracted,
            vec![ExtractedIssue {
                key: "CUU2-7".to_string(),
                project: "CUU2".to_string(),
                title: "Faster login".to_string(),
                issue_type: "Improvement".to_string(),
                fix_version: Some("3.1".to_string()),
                raw_text: "Login now takes one step.".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_project_defaults_to_context() {
        let issues = vec![raw(json!({"key": "GC-1", "fields": {"summary": "x"}}))];
        let extracted = extract("GC", &issues);
        assert_eq!(extracted[0].project, "GC");
        assert_eq!(extracted[0].issue_type, "Other");
        assert_eq!(extracted[0].fix_version, None);
        assert_eq!(extracted[0].raw_text, "");
    }

    #[test]
    fn test_keyless_issues_are_dropped_in_order() {
        let issues = vec![
            raw(json!({"key": "A-1", "fields": {}})),
            raw(json!({"fields": {"summary": "no key"}})),
            raw(json!({"key": "  ", "fields": {}})),
            raw(json!({"key": "A-2", "fields": {}})),
        ];
        let extracted = extract("A", &issues);
        let keys: Vec<_> = extracted.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["A-1", "A-2"]);
        assert!(extracted.len() <= issues.len());
        for issue in &extracted {
            assert!(issues.iter().any(|r| r.key.as_deref() == Some(issue.key.as_str())));
        }
    }

    #[test]
    fn test_adf_description_is_flattened() {
        let adf = json!({
            "type": "doc",
            "version": 1,
            "content": [
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "Supervisors can "},
                    {"type": "text", "text": "pause", "marks": [{"type": "strong"}]},
                    {"type": "text", "text": " queues."}
                ]},
                {"type": "bulletList", "content": [
                    {"type": "listItem", "content": [
                        {"type": "paragraph", "content": [
                            {"type": "text", "text": "Per team"}
                        ]}
                    ]}
                ]},
                {"type": "paragraph", "content": []}
            ]
        });
        assert_eq!(description_text(&adf), "Supervisors can pause queues.\nPer team");
    }
}
