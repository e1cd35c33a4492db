//! Small inflection helpers used by the filter and facet layers.
//!
//! These mirror the inflections the index vocabulary was built with, e.g.
//! `"computer_science"` is indexed as the humanized subject
//! `"Computer science"` and resource type ids are dasherized.

/// Replace underscores with spaces and capitalize the first word.
pub fn humanize(s: &str) -> String {
    let spaced = s.replace('_', " ");
    capitalize(&spaced)
}

/// Capitalize every word, with underscores treated as word breaks.
pub fn titleize(s: &str) -> String {
    s.replace('_', " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lower-case and replace any non-alphanumeric run with `separator`,
/// trimming leading/trailing separators.
pub fn parameterize(s: &str, separator: char) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_sep = false;
    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push(separator);
            }
            pending_sep = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// CamelCase to dashed-lower-case, e.g. `"JournalArticle"` to
/// `"journal-article"`.
pub fn underscore_dasherize(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, ch) in s.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(if ch == '_' { '-' } else { ch });
        }
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("dataset"), "Dataset");
        assert_eq!(humanize("computer_science"), "Computer science");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_titleize() {
        assert_eq!(titleize("natural sciences"), "Natural Sciences");
        assert_eq!(titleize("resource_type"), "Resource Type");
    }

    #[test]
    fn test_parameterize() {
        assert_eq!(parameterize("Computer and information sciences", '_'), "computer_and_information_sciences");
        assert_eq!(parameterize("FOS: Earth science", '_'), "fos_earth_science");
    }

    #[test]
    fn test_underscore_dasherize() {
        assert_eq!(underscore_dasherize("JournalArticle"), "journal-article");
        assert_eq!(underscore_dasherize("Dataset"), "dataset");
        assert_eq!(underscore_dasherize("data_paper"), "data-paper");
    }
}
