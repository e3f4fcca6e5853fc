//! Domain types shared across the retrieval pipeline.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Scalar-only metadata value.
///
/// Both the sparse index and the vector store rely on metadata values being
/// primitive scalars. Anything richer is stringified once, at the ingestion
/// boundary, via [`ScalarValue::normalize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl ScalarValue {
    /// Coerce an arbitrary JSON value into a scalar.
    ///
    /// Arrays and objects are rendered to their JSON text; numbers that do
    /// not fit an `f64` are rendered to text as well.
    pub fn normalize(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => Self::Number(f),
                None => Self::String(n.to_string()),
            },
            serde_json::Value::String(s) => Self::String(s),
            other => Self::String(other.to_string()),
        }
    }

    /// View as a string slice, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for ScalarValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Scalar-valued document metadata.
pub type Metadata = HashMap<String, ScalarValue>;

/// Normalize a loose JSON metadata mapping into the scalar-only form.
pub fn normalize_metadata(raw: HashMap<String, serde_json::Value>) -> Metadata {
    raw.into_iter()
        .map(|(k, v)| (k, ScalarValue::normalize(v)))
        .collect()
}

/// A normalized document produced by ingestion.
///
/// Immutable once indexed; `metadata` holds scalars only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

/// Which retrieval path produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Document,
    Web,
}

/// A fused retrieval candidate.
///
/// Never mutated after fusion; downstream stages only filter, reorder, or
/// copy. `score` is 0-1 for dense and web candidates; sparse candidates carry
/// their raw BM25 score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub content: String,
    pub metadata: Metadata,
    pub source_type: SourceType,
    pub score: f32,
}

/// Discrete quality label derived from synthesis confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Medium,
    High,
}

impl Quality {
    /// Thresholds are strict: exactly 0.7 maps to Medium, exactly 0.4 to Low.
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence > 0.7 {
            Self::High
        } else if confidence > 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Terminal artifact of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisResult {
    /// Top snippets joined in ranked order.
    pub answer: String,
    /// Mean of the top (at most 3) relevance scores, clamped to 0-1.
    pub confidence: f32,
    pub quality: Quality,
    /// The top-3 original candidates, in ranked order.
    pub sources: Vec<CandidateResult>,
}

impl SynthesisResult {
    /// The well-defined empty result for zero candidates.
    pub fn empty() -> Self {
        Self {
            answer: String::new(),
            confidence: 0.0,
            quality: Quality::Low,
            sources: Vec::new(),
        }
    }
}
