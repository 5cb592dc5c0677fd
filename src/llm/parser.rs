use crate::error::{Error, Result};

/// Turns a raw model reply into one clean bullet sentence.
pub fn parse_summary(response: &str) -> Result<String> {
    let text = strip_code_fence(response.trim());

    let text = text
        .lines()
        .map(strip_list_marker)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let text = strip_label(strip_quotes(&text));
    let text = strip_quotes(text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        return Err(Error::MalformedOutput("empty summary".to_string()));
    }
    if text.starts_with('{') || text.starts_with('[') {
        return Err(Error::MalformedOutput(format!(
            "expected prose, got structured output: {}",
            text.chars().take(60).collect::<String>()
        )));
    }

    Ok(text)
}

fn strip_code_fence(text: &str) -> &str {
    if let Some(inner) = text.strip_prefix("```") {
        // Skip any language identifier on the fence line
        let inner = inner.find('\n').map(|i| &inner[i + 1..]).unwrap_or("");
        return inner.trim_end().trim_end_matches("```").trim();
    }
    text
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
        .unwrap_or(line)
        .trim()
}

fn strip_quotes(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`').trim()
}

fn strip_label(text: &str) -> &str {
    for label in ["Release note:", "Summary:"] {
        let matches = text
            .get(..label.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(label));
        if matches {
            return text[label.len()..].trim();
        }
    }
    text
}
