//! Thread name derivation from the parent message's text.

/// Name used when nothing readable is left.
pub const FALLBACK_THREAD_NAME: &str = "Discussion Thread";

const ELLIPSIS: &str = "...";

/// Derive a thread name from `content`, at most `max_len` characters.
///
/// Mentions (`<@…`, `<#…`), bare links, spoilers and inline code tokens are
/// dropped, whitespace runs collapse to single spaces. Bold and italic
/// markers are kept as typed.
pub fn thread_name(content: &str, max_len: usize) -> String {
    if content.trim().is_empty() {
        return FALLBACK_THREAD_NAME.to_string();
    }

    let cleaned = content
        .split_whitespace()
        .filter(|word| !is_noise(word))
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.is_empty() {
        return FALLBACK_THREAD_NAME.to_string();
    }

    if cleaned.chars().count() > max_len {
        let keep = max_len.saturating_sub(ELLIPSIS.len());
        let mut truncated: String = cleaned.chars().take(keep).collect();
        truncated.push_str(ELLIPSIS);
        return truncated;
    }

    cleaned
}

fn is_noise(word: &str) -> bool {
    word.starts_with("<@")
        || word.starts_with("<#")
        || word.starts_with("http://")
        || word.starts_with("https://")
        || (word.starts_with("||") && word.ends_with("||"))
        || (word.starts_with('`') && word.ends_with('`'))
}
