//! Text normalization applied to ticket text before vectorization

/// Normalize raw ticket text.
///
/// Lowercases (Unicode-aware), drops every character that is not an ASCII
/// letter or whitespace, then collapses whitespace runs into single spaces.
/// Never fails; the result may be empty.
///
/// # Examples
/// ```
/// use triage_common::text::normalize;
///
/// assert_eq!(normalize("  Login FAILED!!  error #500 "), "login failed error");
/// assert_eq!(normalize("1234 !!"), "");
/// ```
pub fn normalize(text: &str) -> String {
    let filtered: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Join subject and description into the text fed to the classifier
pub fn ticket_text(subject: &str, description: &str) -> String {
    format!("{} {}", subject, description)
}

/// First `max_chars` characters of `text`, never splitting a code point
pub fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
