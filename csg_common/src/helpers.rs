/// Returns the first candidate that is non-empty after trimming, or `None` if all are blank.
///
/// Used wherever a value can come from several sources in order of preference (request
/// override, stored record, profile lookup).
pub fn first_non_blank<'a, I>(candidates: I) -> Option<&'a str>
where I: IntoIterator<Item = Option<&'a str>> {
    candidates.into_iter().flatten().find(|s| !s.trim().is_empty())
}

/// Trims and lowercases a free-text key (role name, email) for case-insensitive comparison.
/// Blank input normalizes to `None`.
pub fn normalize_key(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn first_non_blank_skips_empty_and_whitespace() {
        let result = first_non_blank([None, Some(""), Some("   "), Some("keep"), Some("later")]);
        assert_eq!(result, Some("keep"));
        assert_eq!(first_non_blank([None, Some("  ")]), None);
    }

    #[test]
    fn normalize_key_trims_and_lowercases() {
        assert_eq!(normalize_key("  First Party "), Some("first party".to_string()));
        assert_eq!(normalize_key("   "), None);
    }
}
