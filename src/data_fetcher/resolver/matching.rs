//! Name matching used by the entity resolver.
//!
//! Candidates are scanned once in catalog order and the first one whose name
//! matches wins. A name matches when it equals the query, contains it, or
//! contains every query token. Only when nothing matches that way is a second
//! pass made that accepts misspellings within [`MAX_EDIT_DISTANCE`].

use strsim::levenshtein;

/// Largest Levenshtein distance still accepted as a misspelling.
pub const MAX_EDIT_DISTANCE: usize = 2;

/// How the winning candidate matched. Lower variants are stricter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    Exact,
    Substring,
    Tokens,
    Fuzzy,
}

/// Lowercases and collapses internal whitespace.
///
/// # Example
/// ```
/// use courtside::data_fetcher::resolver::normalize_name;
///
/// assert_eq!(normalize_name("  LeBron   JAMES "), "lebron james");
/// ```
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn direct_match(name: &str, query: &str, tokens: &[&str]) -> Option<MatchTier> {
    if name == query {
        Some(MatchTier::Exact)
    } else if name.contains(query) {
        Some(MatchTier::Substring)
    } else {
        let name_tokens: Vec<&str> = name.split(' ').collect();
        tokens
            .iter()
            .all(|t| name_tokens.contains(t))
            .then_some(MatchTier::Tokens)
    }
}

/// Finds the first candidate in catalog order matching `query`.
/// `names` yields the searchable names of one candidate (full name, abbreviation, ...).
/// Returns `None` for a blank query.
pub fn find_first<'a, T, F, I>(
    candidates: &'a [T],
    query: &str,
    names: F,
) -> Option<(&'a T, MatchTier)>
where
    F: Fn(&'a T) -> I,
    I: IntoIterator<Item = &'a str>,
{
    let query = normalize_name(query);
    if query.is_empty() {
        return None;
    }
    let tokens: Vec<&str> = query.split(' ').collect();

    let normalized: Vec<Vec<String>> = candidates
        .iter()
        .map(|c| names(c).into_iter().map(normalize_name).collect())
        .collect();

    let direct = candidates
        .iter()
        .zip(&normalized)
        .find_map(|(candidate, candidate_names)| {
            candidate_names
                .iter()
                .filter_map(|n| direct_match(n, &query, &tokens))
                .min()
                .map(|tier| (candidate, tier))
        });
    if direct.is_some() {
        return direct;
    }

    candidates
        .iter()
        .zip(&normalized)
        .find(|(_, candidate_names)| {
            candidate_names
                .iter()
                .any(|n| levenshtein(n, &query) <= MAX_EDIT_DISTANCE)
        })
        .map(|(candidate, _)| (candidate, MatchTier::Fuzzy))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: [&str; 4] = [
        "Anthony Davis",
        "Anthony Edwards",
        "Nikola Jokic",
        "Jalen Williams",
    ];

    fn lookup(query: &str) -> Option<(&'static str, MatchTier)> {
        find_first(&NAMES, query, |n| [*n]).map(|(n, tier)| (*n, tier))
    }

    #[test]
    fn test_exact_full_name() {
        assert_eq!(
            lookup("anthony edwards"),
            Some(("Anthony Edwards", MatchTier::Exact))
        );
    }

    #[test]
    fn test_earlier_partial_match_beats_later_exact() {
        let names = ["Anthony Davison", "Anthony Davis"];
        let hit = find_first(&names, "Anthony Davis", |n| [*n]);
        assert_eq!(hit, Some((&"Anthony Davison", MatchTier::Substring)));
    }

    #[test]
    fn test_fuzzy_only_when_nothing_matches_directly() {
        let names = ["Nikola Jokis", "Nikola Jokic Jr"];
        let hit = find_first(&names, "nikola jokic", |n| [*n]);
        assert_eq!(hit, Some((&"Nikola Jokic Jr", MatchTier::Substring)));
    }

    #[test]
    fn test_substring_first_in_catalog_order_wins() {
        assert_eq!(
            lookup("Anthony"),
            Some(("Anthony Davis", MatchTier::Substring))
        );
    }

    #[test]
    fn test_reordered_tokens_match() {
        assert_eq!(
            lookup("williams jalen"),
            Some(("Jalen Williams", MatchTier::Tokens))
        );
    }

    #[test]
    fn test_misspelling_matches_fuzzy() {
        assert_eq!(
            lookup("Nikola Jokik"),
            Some(("Nikola Jokic", MatchTier::Fuzzy))
        );
    }

    #[test]
    fn test_blank_and_unknown_queries() {
        assert_eq!(lookup(""), None);
        assert_eq!(lookup("   \t "), None);
        assert_eq!(lookup("Michael Jordan"), None);
    }
}
