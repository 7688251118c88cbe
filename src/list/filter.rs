/// Result of running a query against a full collection.
#[derive(Debug, Clone)]
pub struct FilterOutcome<T> {
    pub result: Vec<T>,
    pub has_match: bool,
}

/// Lowercases and trims a raw search query. An empty normalized query means
/// "show everything".
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

pub fn title_contains(title: &str, needle: &str) -> bool {
    title.to_lowercase().contains(needle)
}

/// Filters `full` down to the elements for which `matches` holds against the
/// normalized query, preserving the original relative order. A blank query
/// returns the whole collection and always counts as a match.
pub fn filter_items<T, F>(full: &[T], query: &str, matches: F) -> FilterOutcome<T>
where
    T: Clone,
    F: Fn(&T, &str) -> bool,
{
    let needle = normalize_query(query);
    if needle.is_empty() {
        return FilterOutcome {
            result: full.to_vec(),
            has_match: true,
        };
    }
    let result: Vec<T> = full
        .iter()
        .filter(|item| matches(item, &needle))
        .cloned()
        .collect();
    let has_match = !result.is_empty();
    FilterOutcome { result, has_match }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn run(full: &[String], query: &str) -> FilterOutcome<String> {
        filter_items(full, query, |item, needle| title_contains(item, needle))
    }

    #[test]
    fn blank_query_returns_collection_unchanged() {
        let full = titles(&["Buy milk", "Call mom"]);
        for query in ["", "   ", "\t"] {
            let outcome = run(&full, query);
            assert_eq!(outcome.result, full);
            assert!(outcome.has_match);
        }
    }

    #[test]
    fn substring_match_is_case_insensitive_and_trimmed() {
        let full = titles(&["Buy milk", "Call mom"]);
        let outcome = run(&full, "  CA ");
        assert_eq!(outcome.result, titles(&["Call mom"]));
        assert!(outcome.has_match);
    }

    #[test]
    fn no_match_reports_empty_result() {
        let full = titles(&["Buy milk"]);
        let outcome = run(&full, "xyz");
        assert!(outcome.result.is_empty());
        assert!(!outcome.has_match);
    }

    #[test]
    fn relative_order_is_preserved() {
        let full = titles(&["apple pie", "banana", "apple tart", "cherry"]);
        let outcome = run(&full, "apple");
        assert_eq!(outcome.result, titles(&["apple pie", "apple tart"]));
    }

    #[test]
    fn has_match_agrees_with_result_length_for_real_queries() {
        let full = titles(&["alpha", "beta", "gamma"]);
        for query in ["a", "alp", "zzz", "  GAM  ", "beta extra"] {
            let outcome = run(&full, query);
            assert_eq!(outcome.has_match, !outcome.result.is_empty());
        }
    }

    #[test]
    fn blank_query_on_empty_collection_still_counts_as_match() {
        let outcome = run(&[], "   ");
        assert!(outcome.result.is_empty());
        assert!(outcome.has_match);
    }
}
