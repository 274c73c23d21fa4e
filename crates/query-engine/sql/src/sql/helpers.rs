//! String helpers shared by the rewriter and the translators.

/// Quote a column name with backticks. Embedded backticks are doubled.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Does `haystack` contain `needle`, ignoring ASCII case.
pub fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

/// Replace every occurrence of `needle` in `haystack`, ignoring ASCII case.
///
/// `needle` must be ASCII; lowercasing ASCII keeps byte offsets, so positions
/// found in the lowercased copy are valid in the original.
pub fn replace_ignore_ascii_case(haystack: &str, needle: &str, replacement: &str) -> String {
    debug_assert!(needle.is_ascii());
    let lowered = haystack.to_ascii_lowercase();
    let needle = needle.to_ascii_lowercase();
    let mut result = String::with_capacity(haystack.len());
    let mut last = 0;
    for (start, _) in lowered.match_indices(&needle) {
        result.push_str(&haystack[last..start]);
        result.push_str(replacement);
        last = start + needle.len();
    }
    result.push_str(&haystack[last..]);
    result
}
