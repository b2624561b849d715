//! Fuzzy issue matching with multi-term support using nucleo
//!
//! - Multi-term search (whitespace splits terms, ALL must match one field)
//! - Weighted field scoring
//! - Case-insensitive

use crate::data::Node;
use crate::tree::NodeMatcher;
use nucleo::{
    pattern::{CaseMatching, Normalization, Pattern},
    Config, Matcher, Utf32Str,
};

/// Best-scoring field for a matched issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub score: u32,
    pub matched_field: &'static str,
}

pub struct FuzzySearch {
    matcher: Matcher,
}

impl Default for FuzzySearch {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzySearch {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT),
        }
    }

    fn match_term(&mut self, term: &str, haystack: &str) -> Option<u32> {
        if term.is_empty() || haystack.is_empty() {
            return if term.is_empty() { Some(0) } else { None };
        }

        let pattern = Pattern::parse(term, CaseMatching::Ignore, Normalization::Smart);
        let mut haystack_buf = Vec::new();
        let haystack_utf32 = Utf32Str::new(haystack, &mut haystack_buf);

        pattern.score(haystack_utf32, &mut self.matcher)
    }

    /// Split query on whitespace; every term must match (AND semantics).
    pub fn multi_term_match(&mut self, query: &str, haystack: &str) -> Option<u32> {
        let terms: Vec<&str> = query.split_whitespace().collect();

        if terms.is_empty() {
            return Some(0);
        }

        let mut total_score = 0u32;
        for term in terms {
            let score = self.match_term(term, haystack)?;
            total_score = total_score.saturating_add(score);
        }

        Some(total_score)
    }

    /// Search an issue across id, title, description, assignee and labels.
    pub fn search_node(&mut self, node: &Node, query: &str) -> Option<SearchResult> {
        let mut fields: Vec<(&str, u32, &'static str)> = vec![
            (node.id.as_str(), 10, "id"),
            (node.title.as_str(), 8, "title"),
        ];
        if let Some(assignee) = &node.assignee {
            fields.push((assignee.as_str(), 3, "assignee"));
        }
        for label in &node.labels {
            fields.push((label.as_str(), 2, "label"));
        }
        if let Some(desc) = &node.description {
            fields.push((desc.as_str(), 1, "description"));
        }

        let mut best: Option<SearchResult> = None;
        for (text, weight, field) in fields {
            if let Some(score) = self.multi_term_match(query, text) {
                let weighted = score.saturating_mul(weight);
                if best.as_ref().map_or(true, |b| weighted > b.score) {
                    best = Some(SearchResult {
                        score: weighted,
                        matched_field: field,
                    });
                }
            }
        }

        best
    }
}

impl NodeMatcher for FuzzySearch {
    fn matches(&mut self, node: &Node, query: &str) -> bool {
        self.search_node(node, query).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_term_match() {
        let mut search = FuzzySearch::new();
        assert!(search.multi_term_match("test", "this is a test").is_some());
        assert!(search.multi_term_match("xyz", "this is a test").is_none());
    }

    #[test]
    fn test_multi_term_match() {
        let mut search = FuzzySearch::new();
        assert!(search
            .multi_term_match("test case", "this is a test case")
            .is_some());
        assert!(search
            .multi_term_match("test xyz", "this is a test case")
            .is_none());
    }

    #[test]
    fn test_case_insensitive() {
        let mut search = FuzzySearch::new();
        assert!(search.multi_term_match("TEST", "this is a test").is_some());
        assert!(search.multi_term_match("Test", "THIS IS A TEST").is_some());
    }

    #[test]
    fn test_node_matches_on_label() {
        let mut search = FuzzySearch::new();
        let mut node = Node::new("bd-12", "Refresh flicker");
        node.labels.push("frontend".to_string());

        let result = search.search_node(&node, "frontend").unwrap();
        assert_eq!(result.matched_field, "label");
        assert!(search.matches(&node, "flicker"));
        assert!(!search.matches(&node, "zzqx"));
    }
}
