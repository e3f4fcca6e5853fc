//! Citation formatting from candidate metadata.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::types::Metadata;

/// Supported citation styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CitationStyle {
    #[default]
    Apa,
    Mla,
    Chicago,
}

impl CitationStyle {
    /// Parse a style name; anything unrecognized falls back to APA.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "MLA" => Self::Mla,
            "CHICAGO" => Self::Chicago,
            _ => Self::Apa,
        }
    }
}

fn field<'a>(meta: &'a Metadata, key: &str, default: &'a str) -> &'a str {
    meta.get(key).and_then(|v| v.as_str()).unwrap_or(default)
}

/// Render a citation string from metadata in the given style.
///
/// Missing fields fall back to "Anon" / "Untitled" / "Web"; the year comes
/// from the first four characters of `published`, else "n.d.".
pub fn generate_citation(meta: &Metadata, style: CitationStyle) -> String {
    let author = field(meta, "author", "Anon");
    let title = field(meta, "title", "Untitled");
    let source = field(meta, "source", "Web");
    let url = meta
        .get("url")
        .or_else(|| meta.get("link"))
        .and_then(|v| v.as_str())
        .unwrap_or("");
    let year = meta
        .get("published")
        .and_then(|v| v.as_str())
        .filter(|p| p.chars().count() >= 4)
        .map(|p| p.chars().take(4).collect::<String>())
        .unwrap_or_else(|| "n.d.".to_string());

    match style {
        CitationStyle::Apa => format!("{author}. ({year}). {title}. {source}. {url}"),
        CitationStyle::Mla => format!("{author}. \"{title}.\" {source}, {year}, {url}."),
        CitationStyle::Chicago => format!("{author}. \"{title}.\" {source} ({year}): {url}."),
    }
}

/// Basic completeness check: author, title, source, and url all present.
pub fn verify_citation(meta: &Metadata) -> bool {
    ["author", "title", "source", "url"]
        .iter()
        .all(|k| meta.get(*k).and_then(|v| v.as_str()).is_some_and(|s| !s.is_empty()))
}

/// Collects source metadata across requests for later batch formatting.
///
/// Entries accumulate for the lifetime of the process; duplicates are
/// skipped but nothing is evicted, so long-running deployments should
/// expect the set to grow with the number of distinct sources cited.
#[derive(Debug, Default)]
pub struct CitationManager {
    entries: Mutex<Vec<Metadata>>,
}

impl CitationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record metadata once; identical entries are not duplicated.
    pub fn add(&self, meta: Metadata) {
        let mut entries = self.entries.lock().expect("citation lock poisoned");
        if !entries.contains(&meta) {
            entries.push(meta);
        }
    }

    pub fn format_all(&self, style: CitationStyle) -> Vec<String> {
        self.entries
            .lock()
            .expect("citation lock poisoned")
            .iter()
            .map(|m| generate_citation(m, style))
            .collect()
    }

    pub fn verify_all(&self) -> Vec<bool> {
        self.entries
            .lock()
            .expect("citation lock poisoned")
            .iter()
            .map(verify_citation)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("citation lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
