//! Question keyword derivation and line-level prefiltering.
//!
//! A heuristic relevance prefilter, not a ranking: no scoring, no stemming.

/// Words carrying no content in a question.
const STOP_WORDS: &[&str] = &[
    "what", "who", "when", "where", "why", "how", "is", "are", "was", "were", "will", "do",
    "does", "did", "the", "a", "an", "of", "in", "to", "on", "for", "with", "and", "or",
];

/// Lowercased question words with the stop words removed. Punctuation is
/// kept attached ("growth?" stays "growth?").
pub fn extract_keywords(question: &str) -> Vec<String> {
    question
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
        .collect()
}

/// Keep the lines of `text` containing at least one keyword as a
/// case-insensitive substring, rejoined in original order. An empty
/// keyword list matches nothing.
pub fn filter_by_keywords(text: &str, keywords: &[String]) -> String {
    text.lines()
        .filter(|line| {
            let lowered = line.to_lowercase();
            keywords.iter().any(|keyword| lowered.contains(keyword.as_str()))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_words_are_removed() {
        assert_eq!(
            extract_keywords("What was the revenue growth?"),
            vec!["revenue".to_string(), "growth?".to_string()]
        );
    }

    #[test]
    fn keywords_are_lowercased() {
        assert_eq!(
            extract_keywords("Describe ACME Corp"),
            vec!["describe".to_string(), "acme".to_string(), "corp".to_string()]
        );
    }

    #[test]
    fn filter_keeps_matching_lines_in_order() {
        let text = "header\nRevenue grew 10% in 2023\nan unrelated line\nrevenue outlook strong";
        let keywords = vec!["revenue".to_string()];
        assert_eq!(
            filter_by_keywords(text, &keywords),
            "Revenue grew 10% in 2023\nrevenue outlook strong"
        );
    }

    #[test]
    fn filter_is_case_insensitive() {
        let keywords = vec!["revenue".to_string()];
        assert_eq!(filter_by_keywords("REVENUE UP", &keywords), "REVENUE UP");
    }

    #[test]
    fn empty_keywords_match_nothing() {
        assert_eq!(filter_by_keywords("some text\nmore text", &[]), "");
    }

    #[test]
    fn no_match_yields_empty_string() {
        let keywords = vec!["zebra".to_string()];
        assert_eq!(filter_by_keywords("some text\nmore text", &keywords), "");
    }
}
