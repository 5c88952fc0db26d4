//! Source URL selection and version substitution

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::recipe::types::ExtractedRecipe;

/// Schemes the probe layer can check
static PROBEABLE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:https?|ftp)://").unwrap());

/// Matches a version string as a whole word inside a URL
#[derive(Debug, Clone)]
pub struct VersionPattern {
    regex: Regex,
}

impl VersionPattern {
    /// Returns `None` for an empty version, which would match everywhere
    pub fn new(version: &str) -> Option<Self> {
        let first = version.chars().next()?;
        let last = version.chars().last()?;

        // `\b` only means "word boundary" next to a word character
        let leading = if is_word_char(first) { r"\b" } else { "" };
        let trailing = if is_word_char(last) { r"\b" } else { "" };
        let pattern = format!("{}{}{}", leading, regex::escape(version), trailing);

        Regex::new(&pattern).ok().map(|regex| Self { regex })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Replace every whole-word occurrence of the version
    pub fn replace_all(&self, text: &str, replacement: &str) -> String {
        self.regex
            .replace_all(text, NoExpand(replacement))
            .into_owned()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Drop a `name::` rename prefix (`foo-1.0.tar.gz::https://...`)
pub fn strip_rename_prefix(entry: &str) -> &str {
    entry
        .split_once("::")
        .filter(|(name, _)| !name.contains('/'))
        .map(|(_, url)| url)
        .unwrap_or(entry)
}

/// Pick the first source URL that can be probed and contains the current
/// version as a whole word
pub fn select_source_template(recipe: &ExtractedRecipe) -> Option<String> {
    let pattern = VersionPattern::new(&recipe.version)?;

    recipe
        .sources
        .iter()
        .map(|entry| strip_rename_prefix(entry.trim()))
        .find(|url| PROBEABLE_URL_RE.is_match(url) && pattern.is_match(url))
        .map(|url| url.to_string())
}
