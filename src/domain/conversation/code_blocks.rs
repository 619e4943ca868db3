//! Post-processing for code responses.

const FENCE: &str = "```";

/// Adds `label` to the first fenced code block if it has no language label.
///
/// Content without a fence, or whose first fence is already labeled, is
/// returned unchanged.
pub fn label_first_code_block(content: &str, label: &str) -> String {
    let Some(start) = content.find(FENCE) else {
        return content.to_string();
    };
    let after_fence = start + FENCE.len();
    let rest = &content[after_fence..];
    let line_end = rest.find('\n').unwrap_or(rest.len());
    if !rest[..line_end].trim().is_empty() {
        return content.to_string();
    }

    let mut labeled = String::with_capacity(content.len() + label.len());
    labeled.push_str(&content[..after_fence]);
    labeled.push_str(label);
    labeled.push_str(rest);
    labeled
}
