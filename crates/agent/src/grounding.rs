//! Link grounding: every URL in a final answer should come from a tool.

use regex_lite::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::warn;

static LINK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>()\[\]"'`*]+"#).ok());

/// URL-shaped tokens in `text`, in order of appearance.
pub fn extract_links(text: &str) -> Vec<String> {
    let Some(re) = LINK.as_ref() else {
        warn!("Link pattern failed to compile; grounding check skipped");
        return Vec::new();
    };
    re.find_iter(text)
        .map(|m| {
            m.as_str()
                .trim_end_matches(['.', ',', ';', ':', '!', '?', '*', '_', '~'])
                .to_string()
        })
        .collect()
}

/// Links in `answer` that no tool output contains. Comparison is exact, so
/// `.../1/1/1` is not grounded by `.../1/1/10`. Duplicates are reported once.
pub fn ungrounded_links<S: AsRef<str>>(answer: &str, tool_outputs: &[S]) -> Vec<String> {
    let produced: HashSet<String> = tool_outputs
        .iter()
        .flat_map(|output| extract_links(output.as_ref()))
        .collect();

    let mut missing: Vec<String> = Vec::new();
    for link in extract_links(answer) {
        if !produced.contains(&link) && !missing.contains(&link) {
            missing.push(link);
        }
    }
    missing
}
