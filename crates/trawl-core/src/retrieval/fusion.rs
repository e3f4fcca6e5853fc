//! Candidate fusion across dense, sparse, and web retrieval.
//!
//! Dense, sparse, and web hits are concatenated into one candidate list with
//! a source label and a score, then floored by a minimum credibility. The
//! three scoring scales are NOT cross-normalized: BM25 is unbounded, the
//! dense placeholder is a constant, credibility is 0-1. That mismatch is a
//! known limitation carried over deliberately, not a guaranteed comparable
//! ranking.

use crate::credibility::CredibilityScorer;
use crate::traits::WebHit;
use crate::types::{CandidateResult, Document, Metadata, ScalarValue, SourceType};

use super::sparse::SparseHit;

/// Fixed score for dense hits: the dense service exposes no comparable
/// metric, so every dense candidate carries this placeholder.
pub const DENSE_PLACEHOLDER_SCORE: f32 = 0.7;

/// Merges the three retrieval branches into one candidate list.
#[derive(Debug, Clone, Default)]
pub struct ResultFuser {
    credibility: CredibilityScorer,
}

impl ResultFuser {
    pub fn new(credibility: CredibilityScorer) -> Self {
        Self { credibility }
    }

    /// Concatenate dense, sparse, and web candidates, then apply the
    /// credibility floor uniformly (regardless of source type) when
    /// `min_credibility > 0`.
    pub fn fuse(
        &self,
        dense: Vec<Document>,
        sparse: Vec<SparseHit>,
        web: Vec<WebHit>,
        min_credibility: f32,
    ) -> Vec<CandidateResult> {
        let mut candidates = Vec::with_capacity(dense.len() + sparse.len() + web.len());

        for doc in dense {
            candidates.push(CandidateResult {
                content: doc.content,
                metadata: doc.metadata,
                source_type: SourceType::Document,
                score: DENSE_PLACEHOLDER_SCORE,
            });
        }

        for hit in sparse {
            candidates.push(CandidateResult {
                content: hit.content,
                metadata: hit.metadata,
                source_type: SourceType::Document,
                score: hit.score,
            });
        }

        for hit in web {
            let credibility = self.credibility.score_hit(&hit);
            candidates.push(CandidateResult {
                content: hit.snippet,
                metadata: web_metadata(&hit.title, &hit.link, credibility),
                source_type: SourceType::Web,
                score: credibility,
            });
        }

        if min_credibility > 0.0 {
            candidates.retain(|c| c.score >= min_credibility);
        }
        candidates
    }
}

fn web_metadata(title: &str, link: &str, credibility: f32) -> Metadata {
    let mut meta = Metadata::new();
    meta.insert("title".to_string(), ScalarValue::from(title));
    meta.insert("url".to_string(), ScalarValue::from(link));
    meta.insert("source".to_string(), ScalarValue::from("web"));
    meta.insert(
        "credibility".to_string(),
        ScalarValue::Number(f64::from(credibility)),
    );
    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense_doc(content: &str) -> Document {
        Document::new(content, Metadata::new())
    }

    fn sparse_hit(content: &str, score: f32) -> SparseHit {
        SparseHit {
            content: content.to_string(),
            metadata: Metadata::new(),
            score,
        }
    }

    #[test]
    fn test_concatenation_order_and_scores() {
        let fuser = ResultFuser::default();
        let fused = fuser.fuse(
            vec![dense_doc("d1"), dense_doc("d2")],
            vec![sparse_hit("s1", 2.1)],
            vec![],
            0.0,
        );

        assert_eq!(fused.len(), 3);
        assert_eq!(fused[0].content, "d1");
        assert_eq!(fused[0].score, DENSE_PLACEHOLDER_SCORE);
        assert_eq!(fused[0].source_type, SourceType::Document);
        assert_eq!(fused[2].content, "s1");
        assert_eq!(fused[2].score, 2.1);
    }

    #[test]
    fn test_credibility_floor_applied_uniformly() {
        let fuser = ResultFuser::default();
        let fused = fuser.fuse(
            vec![dense_doc("d1"), dense_doc("d2"), dense_doc("d3")],
            vec![sparse_hit("strong", 2.1), sparse_hit("weak", 0.3)],
            vec![],
            0.5,
        );

        // Dense placeholder 0.7 survives, sparse 0.3 is dropped
        assert_eq!(fused.len(), 4);
        assert!(fused.iter().all(|c| c.score >= 0.5));
        assert!(fused.iter().any(|c| c.content == "strong"));
        assert!(!fused.iter().any(|c| c.content == "weak"));
    }

    #[test]
    fn test_zero_floor_keeps_everything() {
        let fuser = ResultFuser::default();
        let fused = fuser.fuse(vec![], vec![sparse_hit("weak", 0.01)], vec![], 0.0);
        assert_eq!(fused.len(), 1);
    }

    #[test]
    fn test_web_hits_carry_credibility_metadata() {
        let fuser = ResultFuser::default();
        let fused = fuser.fuse(
            vec![],
            vec![],
            vec![WebHit {
                title: "BM25 explained".to_string(),
                link: "https://en.wikipedia.org/wiki/Okapi_BM25".to_string(),
                snippet: "A ranking function".to_string(),
                published: None,
            }],
            0.0,
        );

        assert_eq!(fused.len(), 1);
        let c = &fused[0];
        assert_eq!(c.source_type, SourceType::Web);
        assert_eq!(c.content, "A ranking function");
        assert_eq!(c.metadata.get("source").and_then(|v| v.as_str()), Some("web"));
        assert_eq!(
            c.metadata.get("url").and_then(|v| v.as_str()),
            Some("https://en.wikipedia.org/wiki/Okapi_BM25")
        );
        // Trusted domain, no freshness: 0.5 + 0.3
        assert!((c.score - 0.8).abs() < 1e-6);
    }
}
