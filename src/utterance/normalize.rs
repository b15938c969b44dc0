//! Caption text cleanup

/// Clean caption text for downstream use.
///
/// Removes markup tags, folds typographic quotes, dashes and the ellipsis
/// character to ASCII, and collapses runs of whitespace.
pub fn normalize_text(text: &str) -> String {
    let text = regex!(r"<[^>]+>").replace_all(text, "");
    let text = text
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201c}', '\u{201d}'], "\"")
        .replace(['\u{2013}', '\u{2014}'], "-")
        .replace('\u{2026}', "...");
    collapse_whitespace(&text)
}

/// Collapse whitespace runs to a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether the text is only a caption note such as "(audience laughs)" or
/// "[door slams]", i.e. not spoken dialogue.
///
/// The whole text must sit inside one pair of matching parentheses or square
/// brackets, and the inside may hold only letters, apostrophes, hyphens,
/// spaces and exclamation marks.
pub fn is_caption_note(text: &str) -> bool {
    let text = text.trim();
    let inner = if let Some(rest) = text.strip_prefix('(') {
        rest.strip_suffix(')')
    } else if let Some(rest) = text.strip_prefix('[') {
        rest.strip_suffix(']')
    } else {
        None
    };

    match inner {
        Some(inner) if !inner.trim().is_empty() => inner
            .chars()
            .all(|c| c.is_alphabetic() || matches!(c, '\'' | '-' | ' ' | '!')),
        _ => false,
    }
}
