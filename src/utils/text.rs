//! Token and set normalization shared by the query builder and scorer.

use std::collections::BTreeSet;

/// Minimum token length kept by [`tokenize`].
pub const MIN_TOKEN_LEN: usize = 3;

/// Split on any run of non-alphanumeric characters, lower-case, and drop
/// tokens shorter than [`MIN_TOKEN_LEN`].
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| token.len() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

/// Token set of `text`.
#[must_use]
pub fn token_set(text: &str) -> BTreeSet<String> {
    tokenize(text).into_iter().collect()
}

/// Token set of every item joined together.
#[must_use]
pub fn token_set_of<I, S>(items: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .flat_map(|item| tokenize(item.as_ref()))
        .collect()
}

/// Canonical skill id: trimmed and lower-cased.
#[must_use]
pub fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Trimmed, lower-cased, de-duplicated set; blank entries are dropped.
#[must_use]
pub fn normalize_set<I, S>(items: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| normalize_id(item.as_ref()))
        .filter(|item| !item.is_empty())
        .collect()
}

/// [`normalize_set`] as a sorted list.
#[must_use]
pub fn normalize_list<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    normalize_set(items).into_iter().collect()
}
