use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::types::CandidateFile;
use crate::clock::Clock;

pub const FALLBACK_PROJECT: &str = "default-project";
pub const FALLBACK_VERSION: &str = "1.0.0";

const FENCE: &str = "```";
const BLOCK_BOUNDARY: &str = "\nprojectName:";

// One header field per line, then the body up to the first "\nend of file:".
static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)projectName:([^\n]*)\nfilename:([^\n]*)\nversion:([^\n]*)\n(.*?)\nend of file:")
        .unwrap()
});

/// Parse an AI reply into candidate files.
///
/// Structured blocks are extracted in source order. When none is accepted and
/// the reply is not blank, the whole trimmed reply becomes a single
/// `default-project` file whose name carries the clock's current millis.
pub fn parse_response(text: &str, clock: &dyn Clock) -> Vec<CandidateFile> {
    let mut files = extract_blocks(text);

    let trimmed = text.trim();
    if files.is_empty() && !trimmed.is_empty() {
        let file_name = format!("response-{}.txt", clock.now_millis());
        debug!(file = %file_name, len = trimmed.len(), "no file blocks found, using whole reply");
        files.push(CandidateFile {
            project_name: FALLBACK_PROJECT.to_string(),
            file_name,
            version: FALLBACK_VERSION.to_string(),
            content: trimmed.to_string(),
        });
    }

    files
}

/// Extract every well-formed file block, without the fallback.
///
/// The trailer after `end of file:` runs to the next `"\nprojectName:"` or the
/// end of input, and the next search resumes there. Nothing checks whether
/// that `projectName:` sits inside a code fence.
pub fn extract_blocks(text: &str) -> Vec<CandidateFile> {
    let mut files = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let Some(caps) = BLOCK_RE.captures_at(text, pos) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };

        let trailer_start = whole.end();
        pos = text[trailer_start..]
            .find(BLOCK_BOUNDARY)
            .map(|i| trailer_start + i)
            .unwrap_or(text.len());

        let field = |i: usize| caps.get(i).map(|m| m.as_str().trim()).unwrap_or("");
        let project_name = field(1);
        let file_name = field(2);
        let version = field(3);
        let content = strip_fences(field(4));

        if project_name.is_empty() || file_name.is_empty() || version.is_empty() || content.is_empty()
        {
            debug!(
                project = project_name,
                file = file_name,
                version,
                "dropping incomplete file block"
            );
            continue;
        }

        files.push(CandidateFile {
            project_name: project_name.to_string(),
            file_name: file_name.to_string(),
            version: version.to_string(),
            content: content.to_string(),
        });
    }

    files
}

/// Remove a leading fence line (with its language tag) and a trailing fence.
fn strip_fences(body: &str) -> &str {
    let mut content = body.trim();
    if content.starts_with(FENCE) {
        if let Some(newline) = content.find('\n') {
            content = &content[newline + 1..];
        }
    }
    if content.ends_with(FENCE) {
        if let Some(idx) = content.rfind(FENCE) {
            content = &content[..idx];
        }
    }
    content.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn block(project: &str, file: &str, version: &str, body: &str) -> String {
        format!(
            "projectName: {}\nfilename: {}\nversion: {}\n{}\nend of file: {}\n",
            project, file, version, body, file
        )
    }

    #[test]
    fn test_single_fenced_block() {
        let input = "projectName: demo\nfilename: a.ts\nversion: 1.0.0\n```ts\nconst x = 1;\n```\nend of file: a.ts";
        let clock = ManualClock::at(1);
        let files = parse_response(input, &clock);
        assert_eq!(
            files,
            vec![CandidateFile {
                project_name: "demo".into(),
                file_name: "a.ts".into(),
                version: "1.0.0".into(),
                content: "const x = 1;".into(),
            }]
        );
    }

    #[test]
    fn test_back_to_back_blocks_in_order() {
        let input = format!(
            "{}{}",
            block("demo", "a.ts", "1.0.0", "```ts\nlet a = 1;\n```"),
            block("demo", "b.ts", "1.0.1", "```ts\nlet b = 2;\n```")
        );
        let files = extract_blocks(&input);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].file_name, "a.ts");
        assert_eq!(files[0].content, "let a = 1;");
        assert_eq!(files[1].file_name, "b.ts");
        assert_eq!(files[1].version, "1.0.1");
        assert_eq!(files[1].content, "let b = 2;");
    }

    #[test]
    fn test_prose_between_blocks_is_ignored() {
        let input = format!(
            "Here you go:\n\n{}\nAnd the stylesheet:\n{}\nHope this helps.",
            block("site", "index.html", "2.0.0", "<p>hi</p>"),
            block("site", "style.css", "2.0.0", "```css\np { color: red; }\n```")
        );
        let files = extract_blocks(&input);
        let names: Vec<_> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["index.html", "style.css"]);
        assert_eq!(files[0].content, "<p>hi</p>");
    }

    #[test]
    fn test_field_whitespace_trimmed() {
        let input = "projectName:   demo   \nfilename:\tsrc/a/b.ts  \nversion:  1.2.3 \n  body text  \nend of file: whatever";
        let files = extract_blocks(input);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].project_name, "demo");
        assert_eq!(files[0].file_name, "src/a/b.ts");
        assert_eq!(files[0].version, "1.2.3");
        assert_eq!(files[0].content, "body text");
    }

    #[test]
    fn test_unfenced_body_kept_verbatim_inside() {
        let input = block("p", "notes.md", "1", "# Title\n\n- one\n- two");
        let files = extract_blocks(&input);
        assert_eq!(files[0].content, "# Title\n\n- one\n- two");
    }

    #[test]
    fn test_fence_without_newline_only_trailing_stripped() {
        assert_eq!(strip_fences("```js```"), "```js");
        assert_eq!(strip_fences("```\nx\n```"), "x");
        assert_eq!(strip_fences("```"), "");
    }

    #[test]
    fn test_empty_fenced_body_dropped() {
        let input = block("p", "a.rs", "1.0.0", "```rust\n\n```");
        assert!(extract_blocks(&input).is_empty());
    }

    #[test]
    fn test_fallback_for_plain_prose() {
        let clock = ManualClock::at(1_700_000_000_123);
        let files = parse_response("  just some prose, no markers \n", &clock);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].project_name, "default-project");
        assert_eq!(files[0].version, "1.0.0");
        assert_eq!(files[0].file_name, "response-1700000000123.txt");
        assert_eq!(files[0].content, "just some prose, no markers");
    }

    #[test]
    fn test_fallback_names_differ_over_time() {
        let clock = ManualClock::at(1000);
        let first = parse_response("hello", &clock);
        clock.advance(1);
        let second = parse_response("hello", &clock);
        assert_ne!(first[0].file_name, second[0].file_name);
        assert_eq!(first[0].content, second[0].content);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let clock = ManualClock::at(1);
        assert!(parse_response("", &clock).is_empty());
        assert!(parse_response("   \n\t  ", &clock).is_empty());
    }

    #[test]
    fn test_block_missing_version_is_dropped() {
        let partial = "projectName: demo\nfilename: a.ts\nconst x = 1;\nend of file: a.ts";
        assert!(extract_blocks(partial).is_empty());
    }

    #[test]
    fn test_fallback_fires_when_only_partial_block() {
        let partial = "projectName: demo\nfilename: a.ts\nconst x = 1;\nend of file: a.ts";
        let clock = ManualClock::at(7);
        let files = parse_response(partial, &clock);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].project_name, FALLBACK_PROJECT);
        assert_eq!(files[0].content, partial);
    }

    #[test]
    fn test_no_fallback_when_a_block_matched() {
        let input = format!(
            "projectName: demo\nfilename: broken.ts\nno version here\nend of file: broken.ts\n{}",
            block("demo", "ok.ts", "1.0.0", "let ok = true;")
        );
        let clock = ManualClock::at(7);
        let files = parse_response(&input, &clock);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "ok.ts");
        assert!(files.iter().all(|f| f.project_name != FALLBACK_PROJECT));
    }

    #[test]
    fn test_missing_end_marker_merges_into_next_block() {
        // The lazy body runs to the first "end of file:" it can find.
        let input = "projectName: p\nfilename: a.ts\nversion: 1\nlet a = 1;\n\
                     projectName: p\nfilename: b.ts\nversion: 1\nlet b = 2;\nend of file: b.ts";
        let files = extract_blocks(input);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "a.ts");
        assert!(files[0].content.contains("filename: b.ts"));
    }

    #[test]
    fn test_trailer_swallows_text_until_next_block() {
        let input = format!(
            "{}trailing chatter\n{}",
            block("p", "a.ts", "1", "a"),
            block("p", "b.ts", "1", "b")
        );
        let files = extract_blocks(&input);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_marker_text_inside_fence_before_end() {
        let input = format!(
            "{}{}",
            block("p", "a.md", "1", "```md\nprojectName: x\n```"),
            block("p", "b.ts", "1", "b")
        );
        let files = extract_blocks(&input);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].content, "projectName: x");
        assert_eq!(files[1].file_name, "b.ts");
    }

    #[test]
    fn test_nested_example_block_truncates_outer_body() {
        let body = "```md\nprojectName: inner\nfilename: x\nversion: 1\nhi\nend of file: x\n```";
        let input = block("outer", "README.md", "1", body);
        let files = extract_blocks(&input);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].project_name, "outer");
        assert_eq!(files[0].content, "projectName: inner\nfilename: x\nversion: 1\nhi");
    }

    #[test]
    fn test_header_fields_must_be_on_consecutive_lines() {
        let input = "projectName: demo\n\nfilename: a.ts\nversion: 1\nx\nend of file: a.ts";
        assert!(extract_blocks(input).is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let input = "projectName: demo\r\nfilename: a.ts\r\nversion: 1.0.0\r\nlet x = 1;\r\nend of file: a.ts\r\n";
        let files = extract_blocks(input);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].project_name, "demo");
        assert_eq!(files[0].version, "1.0.0");
        assert_eq!(files[0].content, "let x = 1;");
    }

    #[test]
    fn test_deterministic_for_structured_input() {
        let input = format!("{}{}", block("p", "a", "1", "x"), block("p", "b", "2", "y"));
        assert_eq!(extract_blocks(&input), extract_blocks(&input));
    }
}
