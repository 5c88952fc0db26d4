//! Speculative "next version" generation
//!
//! A version string is split into alternating value and delimiter tokens
//! (`1`, `.`, `2`, `.`, `3`). Candidates are produced by bumping the value
//! tokens from right to left and zeroing everything after the bumped one:
//!
//! ```text
//! 1.2.3  ->  1.2.4, 1.3.0, 2.0.0
//! ```

/// Characters that separate version components
pub const DELIMITERS: [char; 3] = ['.', '_', '-'];

/// One piece of a tokenized version string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Run of non-delimiter characters (may be empty, e.g. in `1..2`)
    Value(&'a str),
    /// One of [`DELIMITERS`]
    Delimiter(char),
}

/// Split a version string into alternating value/delimiter tokens.
///
/// The result always starts and ends with a value token, so `"1."` yields
/// `[Value("1"), Delimiter('.'), Value("")]`.
pub fn tokenize(version: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;

    for (i, c) in version.char_indices() {
        if DELIMITERS.contains(&c) {
            tokens.push(Token::Value(&version[start..i]));
            tokens.push(Token::Delimiter(c));
            start = i + c.len_utf8();
        }
    }
    tokens.push(Token::Value(&version[start..]));

    tokens
}

/// Generate candidate next versions, least significant bump first.
///
/// Generation stops at the first non-numeric value token (counting from the
/// right); candidates produced before that point are kept.
///
/// # Examples
/// - `"1.2.3"` -> `["1.2.4", "1.3.0", "2.0.0"]`
/// - `"5"` -> `["6"]`
/// - `"1.2rc1"` -> `[]`
pub fn next_versions(version: &str) -> Vec<String> {
    let mut tokens = tokenize(version);
    let mut candidates = Vec::new();
    // Suffix appended after the bumped token: zeroed positions and their delimiters
    let mut reminder = String::new();

    loop {
        let Some(Token::Value(value)) = tokens.pop() else {
            break;
        };
        let Some(bumped) = increment_numeric(value) else {
            break;
        };

        candidates.push(format!("{}{}{}", join_tokens(&tokens), bumped, reminder));

        reminder.insert(0, '0');
        match tokens.pop() {
            Some(Token::Delimiter(delimiter)) => reminder.insert(0, delimiter),
            _ => break,
        }
    }

    candidates
}

fn join_tokens(tokens: &[Token<'_>]) -> String {
    let mut joined = String::new();
    for token in tokens {
        match token {
            Token::Value(value) => joined.push_str(value),
            Token::Delimiter(delimiter) => joined.push(*delimiter),
        }
    }
    joined
}

/// Increment a purely ASCII-numeric token; `None` for anything else
fn increment_numeric(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<u64>().ok()?.checked_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.3", vec!["1.2.4", "1.3.0", "2.0.0"])]
    #[case("5", vec!["6"])]
    #[case("2.0", vec!["2.1", "3.0"])]
    #[case("1_9", vec!["1_10", "2_0"])]
    #[case("2024-01-31", vec!["2024-01-32", "2024-2-0", "2025-0-0"])]
    #[case("1.2-3", vec!["1.2-4", "1.3-0", "2.0-0"])]
    #[case("1.09", vec!["1.10", "2.0"])]
    fn next_versions_bumps_each_position(#[case] version: &str, #[case] expected: Vec<&str>) {
        assert_eq!(next_versions(version), expected);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("1.2rc1")]
    #[case("1.2-rc")]
    #[case("1.")]
    #[case("99999999999999999999")] // overflows u64
    fn next_versions_returns_empty_without_numeric_trailing_token(#[case] version: &str) {
        assert!(next_versions(version).is_empty());
    }

    #[test]
    fn next_versions_keeps_candidates_before_non_numeric_token() {
        // "3" and "2" bump fine, "r1" stops the walk
        assert_eq!(next_versions("r1.2.3"), vec!["r1.2.4", "r1.3.0"]);
    }

    #[test]
    fn next_versions_stops_at_empty_value_between_delimiters() {
        assert_eq!(next_versions("1..2"), vec!["1..3"]);
    }

    #[test]
    fn next_versions_keeps_non_ascii_prefix_intact() {
        assert_eq!(next_versions("é.1"), vec!["é.2"]);
    }

    #[test]
    fn next_versions_is_stable_when_reapplied_to_first_candidate() {
        let first = next_versions("1.2.3").remove(0);
        let again = next_versions(&first);

        assert_eq!(first, "1.2.4");
        assert_eq!(again, vec!["1.2.5", "1.3.0", "2.0.0"]);
    }

    #[test]
    fn tokenize_alternates_values_and_delimiters() {
        assert_eq!(
            tokenize("1.2_b-3"),
            vec![
                Token::Value("1"),
                Token::Delimiter('.'),
                Token::Value("2"),
                Token::Delimiter('_'),
                Token::Value("b"),
                Token::Delimiter('-'),
                Token::Value("3"),
            ]
        );
    }

    #[test]
    fn tokenize_keeps_trailing_empty_value() {
        assert_eq!(
            tokenize("1."),
            vec![Token::Value("1"), Token::Delimiter('.'), Token::Value("")]
        );
    }
}
