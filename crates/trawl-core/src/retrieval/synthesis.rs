//! Multi-source answer synthesis with confidence and quality assessment.

use std::sync::Arc;

use ordered_float::OrderedFloat;

use crate::error::TrawlResult;
use crate::traits::RelevanceScorer;
use crate::types::{CandidateResult, Quality, SynthesisResult};

/// Number of top candidates that contribute to the answer, confidence, and
/// attributed sources.
const TOP_SOURCES: usize = 3;

/// Reranks deduplicated candidates against the query and aggregates the top
/// ones into an answer.
pub struct Synthesizer {
    scorer: Arc<dyn RelevanceScorer>,
}

impl Synthesizer {
    pub fn new(scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self { scorer }
    }

    /// Score every candidate against `query`, rank descending (stable, so
    /// ties keep input order), and aggregate the top 3.
    ///
    /// With zero candidates this returns the empty result rather than
    /// calling the scorer.
    pub async fn synthesize(
        &self,
        query: &str,
        candidates: Vec<CandidateResult>,
    ) -> TrawlResult<SynthesisResult> {
        if candidates.is_empty() {
            return Ok(SynthesisResult::empty());
        }

        let texts: Vec<String> = candidates.iter().map(|c| c.content.clone()).collect();
        let scores = self.scorer.score_batch(query, &texts).await?;

        let mut ranked: Vec<(CandidateResult, f32)> =
            candidates.into_iter().zip(scores).collect();
        ranked.sort_by(|a, b| OrderedFloat(b.1).cmp(&OrderedFloat(a.1)));
        ranked.truncate(TOP_SOURCES);

        let answer = ranked
            .iter()
            .map(|(c, _)| c.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let confidence = (ranked.iter().map(|(_, s)| s).sum::<f32>()
            / ranked.len().max(1) as f32)
            .clamp(0.0, 1.0);

        Ok(SynthesisResult {
            answer,
            confidence,
            quality: Quality::from_confidence(confidence),
            sources: ranked.into_iter().map(|(c, _)| c).collect(),
        })
    }
}
