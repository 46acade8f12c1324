use crate::kits::{normalize_kits, KitName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storefront path prefix for kit product pages.
pub const PRODUCTS_PATH: &str = "/products";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Compatible,
    Incompatible,
    Unknown,
}

impl VerdictStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictStatus::Compatible => "compatible",
            VerdictStatus::Incompatible => "incompatible",
            VerdictStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    StaticTable,
    RuleEngine,
    RemoteService,
}

impl VerdictSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictSource::StaticTable => "static_table",
            VerdictSource::RuleEngine => "rule_engine",
            VerdictSource::RemoteService => "remote_service",
        }
    }
}

/// Outcome of a compatibility resolution.
///
/// Fields are private so every verdict goes through [`CompatibilityVerdict::new`]:
/// kits are present only for compatible verdicts, and a compatible verdict
/// always names at least one kit and a recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityVerdict {
    status: VerdictStatus,
    kits: Vec<KitName>,
    recommendation_ref: Option<String>,
    note: String,
    source: VerdictSource,
}

impl CompatibilityVerdict {
    /// Build a verdict. Kits are tier-sorted and deduplicated, dropped for
    /// non-compatible statuses, and a compatible status without kits is
    /// downgraded to unknown.
    pub fn new(
        status: VerdictStatus,
        kits: impl IntoIterator<Item = KitName>,
        note: impl Into<String>,
        source: VerdictSource,
    ) -> Self {
        let kits = match status {
            VerdictStatus::Compatible => normalize_kits(kits),
            _ => Vec::new(),
        };
        let status = if status == VerdictStatus::Compatible && kits.is_empty() {
            VerdictStatus::Unknown
        } else {
            status
        };
        let recommendation_ref = match status {
            VerdictStatus::Compatible => kits.first().map(KitName::product_ref),
            _ => None,
        };

        Self {
            status,
            kits,
            recommendation_ref,
            note: note.into(),
            source,
        }
    }

    pub fn compatible(
        kits: impl IntoIterator<Item = KitName>,
        note: impl Into<String>,
        source: VerdictSource,
    ) -> Self {
        Self::new(VerdictStatus::Compatible, kits, note, source)
    }

    pub fn incompatible(note: impl Into<String>, source: VerdictSource) -> Self {
        Self::new(VerdictStatus::Incompatible, [], note, source)
    }

    pub fn unknown(note: impl Into<String>, source: VerdictSource) -> Self {
        Self::new(VerdictStatus::Unknown, [], note, source)
    }

    pub fn status(&self) -> VerdictStatus {
        self.status
    }

    pub fn kits(&self) -> &[KitName] {
        &self.kits
    }

    pub fn recommendation_ref(&self) -> Option<&str> {
        self.recommendation_ref.as_deref()
    }

    /// Storefront URL of the recommended kit, e.g. `/products/kit-cosmopolit`.
    pub fn recommendation_url(&self) -> Option<String> {
        self.recommendation_ref
            .as_ref()
            .map(|r| format!("{}/{}", PRODUCTS_PATH, r))
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn source(&self) -> VerdictSource {
        self.source
    }

    pub fn is_compatible(&self) -> bool {
        self.status == VerdictStatus::Compatible
    }
}
