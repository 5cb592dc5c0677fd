//! Renders the generator's Markdown into Confluence storage format (XHTML).
//!
//! Only the constructs the aggregator emits are supported: ATX headings,
//! bullet lists, horizontal rules, paragraphs, bold, emphasis and links.

#[derive(PartialEq)]
enum Block {
    None,
    List,
    Paragraph,
}

pub fn markdown_to_storage(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len() * 2);
    let mut block = Block::None;
    let mut paragraph: Vec<&str> = Vec::new();

    for line in markdown.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            close_block(&mut out, &mut block, &mut paragraph);
            continue;
        }

        if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            if block != Block::List {
                close_block(&mut out, &mut block, &mut paragraph);
                out.push_str("<ul>");
                block = Block::List;
            }
            out.push_str("<li>");
            out.push_str(&render_inline(item.trim()));
            out.push_str("</li>");
            continue;
        }

        if is_rule(trimmed) {
            close_block(&mut out, &mut block, &mut paragraph);
            out.push_str("<hr />");
            continue;
        }

        if let Some((level, text)) = heading(trimmed) {
            close_block(&mut out, &mut block, &mut paragraph);
            out.push_str(&format!("<h{0}>{1}</h{0}>", level, render_inline(text)));
            continue;
        }

        if block != Block::Paragraph {
            close_block(&mut out, &mut block, &mut paragraph);
            block = Block::Paragraph;
        }
        paragraph.push(trimmed);
    }

    close_block(&mut out, &mut block, &mut paragraph);
    out
}

fn close_block(out: &mut String, block: &mut Block, paragraph: &mut Vec<&str>) {
    match block {
        Block::List => out.push_str("</ul>"),
        Block::Paragraph => {
            out.push_str("<p>");
            out.push_str(&render_inline(&paragraph.join(" ")));
            out.push_str("</p>");
            paragraph.clear();
        }
        Block::None => {}
    }
    *block = Block::None;
}

fn is_rule(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    line[level..]
        .strip_prefix(' ')
        .map(|text| (level, text.trim()))
}

fn render_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut prev: Option<char> = None;

    while let Some(c) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix("**") {
            if let Some(end) = after.find("**").filter(|end| *end > 0) {
                out.push_str("<strong>");
                out.push_str(&render_inline(&after[..end]));
                out.push_str("</strong>");
                rest = &after[end + 2..];
                prev = Some('*');
                continue;
            }
        }

        if c == '[' {
            if let Some((label, url, remainder)) = split_link(&rest[1..]) {
                out.push_str(&format!(
                    "<a href=\"{}\">{}</a>",
                    escape(url),
                    render_inline(label)
                ));
                rest = remainder;
                prev = Some(')');
                continue;
            }
        }

        if c == '_' && !prev.is_some_and(char::is_alphanumeric) {
            let after = &rest[1..];
            if let Some(end) = after.find('_').filter(|end| *end > 0) {
                let closes_word = !after[end + 1..]
                    .chars()
                    .next()
                    .is_some_and(char::is_alphanumeric);
                if closes_word {
                    out.push_str("<em>");
                    out.push_str(&render_inline(&after[..end]));
                    out.push_str("</em>");
                    rest = &after[end + 1..];
                    prev = Some('_');
                    continue;
                }
            }
        }

        out.push_str(&escape_char(c));
        rest = &rest[c.len_utf8()..];
        prev = Some(c);
    }

    out
}

fn split_link(s: &str) -> Option<(&str, &str, &str)> {
    let label_end = s.find("](")?;
    let label = &s[..label_end];
    if label.is_empty() || label.contains('[') {
        return None;
    }
    let after = &s[label_end + 2..];
    let url_end = after.find(')')?;
    let url = after[..url_end].trim();
    if url.is_empty() || url.contains(char::is_whitespace) {
        return None;
    }
    Some((label, url, &after[url_end + 1..]))
}

fn escape(text: &str) -> String {
    text.chars().map(escape_char).collect()
}

fn escape_char(c: char) -> String {
    match c {
        '&' => "&amp;".to_string(),
        '<' => "&lt;".to_string(),
        '>' => "&gt;".to_string(),
        '"' => "&quot;".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_structure() {
        let markdown = "# BAMA - 1.0\n\n## Fixes\n\n- **BAMA-1**: Calls no longer drop.\n- **BAMA-2**: Fixed <script> tags & quotes.\n\n---\n\n_No items to report for this release._\n";
        assert_eq!(
            markdown_to_storage(markdown),
            "<h1>BAMA - 1.0</h1><h2>Fixes</h2><ul><li><strong>BAMA-1</strong>: Calls no longer drop.</li><li><strong>BAMA-2</strong>: Fixed &lt;script&gt; tags &amp; quotes.</li></ul><hr /><p><em>No items to report for this release.</em></p>"
        );
    }

    #[test]
    fn test_links_and_snake_case() {
        assert_eq!(
            render_inline("[CUU2-4](https://jira.example.com/browse/CUU2-4): set max_call_time"),
            "<a href=\"https://jira.example.com/browse/CUU2-4\">CUU2-4</a>: set max_call_time"
        );
        assert_eq!(render_inline("[not a link] (x)"), "[not a link] (x)");
    }

    #[test]
    fn test_paragraph_lines_are_joined() {
        assert_eq!(
            markdown_to_storage("Questions?\nSend feedback."),
            "<p>Questions? Send feedback.</p>"
        );
    }
}
