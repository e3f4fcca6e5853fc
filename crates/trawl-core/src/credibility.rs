//! Source credibility assessment from domain reputation and freshness.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::traits::WebHit;

/// Where a domain falls on the curated reputation lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainReputation {
    Trusted,
    Blacklisted,
    Unknown,
}

/// Curated reputation lists. Entries are registrable domains; a host
/// matches when it equals an entry or is a subdomain of one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredibilityConfig {
    pub trusted_domains: HashSet<String>,
    pub blacklisted_domains: HashSet<String>,
}

impl Default for CredibilityConfig {
    fn default() -> Self {
        let trusted = [
            "wikipedia.org",
            "nature.com",
            "nytimes.com",
            "bbc.co.uk",
            "reuters.com",
            "nasa.gov",
        ];
        let blacklisted = ["clickbait.com", "fakenews.net"];

        Self {
            trusted_domains: trusted.into_iter().map(String::from).collect(),
            blacklisted_domains: blacklisted.into_iter().map(String::from).collect(),
        }
    }
}

/// Scores a web source's trustworthiness.
#[derive(Debug, Clone, Default)]
pub struct CredibilityScorer {
    config: CredibilityConfig,
}

impl CredibilityScorer {
    pub fn new(config: CredibilityConfig) -> Self {
        Self { config }
    }

    /// Check `url`'s registrable domain against the curated lists.
    pub fn domain_reputation(&self, url: &str) -> DomainReputation {
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        else {
            return DomainReputation::Unknown;
        };

        if Self::host_in(&host, &self.config.blacklisted_domains) {
            DomainReputation::Blacklisted
        } else if Self::host_in(&host, &self.config.trusted_domains) {
            DomainReputation::Trusted
        } else {
            DomainReputation::Unknown
        }
    }

    /// Freshness score in 0-1 from an ISO-8601 publication date.
    ///
    /// Tiers: 1.0 under 30 days, 0.7 under 180, 0.4 under 365, else 0.1.
    /// Missing or unparsable dates fail closed to 0.0.
    pub fn freshness(&self, published: Option<&str>) -> f32 {
        let Some(raw) = published else {
            return 0.0;
        };
        let Some(published_at) = parse_iso_datetime(raw) else {
            return 0.0;
        };

        let days = (Utc::now() - published_at).num_days();
        if days < 30 {
            1.0
        } else if days < 180 {
            0.7
        } else if days < 365 {
            0.4
        } else {
            0.1
        }
    }

    /// Combined credibility score in 0-1.
    ///
    /// Base 0.5, +0.3 trusted, -0.4 blacklisted, plus 0.2 * freshness,
    /// clamped.
    pub fn score(&self, link: &str, published: Option<&str>) -> f32 {
        let mut base: f32 = 0.5;
        match self.domain_reputation(link) {
            DomainReputation::Trusted => base += 0.3,
            DomainReputation::Blacklisted => base -= 0.4,
            DomainReputation::Unknown => {}
        }
        (base + 0.2 * self.freshness(published)).clamp(0.0, 1.0)
    }

    /// Score a web hit.
    pub fn score_hit(&self, hit: &WebHit) -> f32 {
        self.score(&hit.link, hit.published.as_deref())
    }

    /// Keep only hits scoring at or above `min_score`.
    pub fn filter(&self, hits: Vec<WebHit>, min_score: f32) -> Vec<WebHit> {
        hits.into_iter()
            .filter(|h| self.score_hit(h) >= min_score)
            .collect()
    }

    fn host_in(host: &str, domains: &HashSet<String>) -> bool {
        domains
            .iter()
            .any(|d| host == d || host.ends_with(&format!(".{d}")))
    }
}

/// Parse an ISO-8601 timestamp, tolerating a trailing `Z`, missing offset,
/// or date-only form.
fn parse_iso_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}
