//! Cross-source candidate deduplication.
//!
//! Exact content equality only; near-duplicate or paraphrased content is not
//! merged. This is a documented limitation of the pipeline, not an
//! oversight.

use std::collections::HashSet;

use crate::types::CandidateResult;

/// Deduplicates candidates by exact `content` equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictResolver;

impl ConflictResolver {
    pub fn new() -> Self {
        Self
    }

    /// Stable filter: the first occurrence of each content wins and the
    /// relative order of survivors is preserved.
    pub fn resolve(&self, candidates: Vec<CandidateResult>) -> Vec<CandidateResult> {
        let mut seen: HashSet<String> = HashSet::with_capacity(candidates.len());
        candidates
            .into_iter()
            .filter(|c| seen.insert(c.content.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Metadata, SourceType};

    fn candidate(content: &str, source_type: SourceType, score: f32) -> CandidateResult {
        CandidateResult {
            content: content.to_string(),
            metadata: Metadata::new(),
            source_type,
            score,
        }
    }

    #[test]
    fn test_first_occurrence_wins() {
        let resolver = ConflictResolver::new();
        let out = resolver.resolve(vec![
            candidate("alpha", SourceType::Document, 0.7),
            candidate("beta", SourceType::Web, 0.6),
            candidate("alpha", SourceType::Web, 0.9),
        ]);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].content, "alpha");
        // The earlier (document) occurrence was kept
        assert_eq!(out[0].source_type, SourceType::Document);
        assert_eq!(out[1].content, "beta");
    }

    #[test]
    fn test_order_preserved() {
        let resolver = ConflictResolver::new();
        let out = resolver.resolve(vec![
            candidate("c", SourceType::Document, 0.1),
            candidate("a", SourceType::Document, 0.9),
            candidate("b", SourceType::Document, 0.5),
        ]);
        let contents: Vec<_> = out.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_no_duplicates_in_output() {
        let resolver = ConflictResolver::new();
        let input: Vec<_> = (0..20)
            .map(|i| candidate(if i % 3 == 0 { "x" } else { "y" }, SourceType::Web, 0.5))
            .collect();
        let input_len = input.len();

        let out = resolver.resolve(input);
        assert!(out.len() <= input_len);
        let mut contents: Vec<_> = out.iter().map(|c| c.content.clone()).collect();
        contents.sort();
        contents.dedup();
        assert_eq!(contents.len(), out.len());
    }

    #[test]
    fn test_empty_input() {
        let resolver = ConflictResolver::new();
        assert!(resolver.resolve(vec![]).is_empty());
    }
}
