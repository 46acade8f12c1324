//! Static compatibility table
//!
//! Brand → model → stored verdict, built once and shared read-only for the
//! life of the process. Also serves the brand list and autocomplete.

use crate::bike::BikeQuery;
use crate::kits::KitName;
use crate::messages;
use crate::verdict::{CompatibilityVerdict, VerdictSource, VerdictStatus};
use itertools::Itertools;
use lazy_static::lazy_static;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use strsim::jaro_winkler;
use tracing::debug;

lazy_static! {
    static ref REFERENCE_TABLE: StaticTable = StaticTable::storefront();
}

/// Stored verdict for one model.
#[derive(Debug, Clone, PartialEq)]
struct TableEntry {
    status: VerdictStatus,
    kits: Vec<KitName>,
    note: String,
}

#[derive(Debug, Clone)]
struct ModelRecord {
    display: String,
    entry: TableEntry,
}

#[derive(Debug, Clone)]
struct BrandRecord {
    display: String,
    models: BTreeMap<String, ModelRecord>,
}

/// Autocomplete entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub brand: String,
    pub model: String,
    pub label: String,
    pub status: VerdictStatus,
}

#[derive(Debug, Clone, Default)]
pub struct StaticTable {
    brands: BTreeMap<String, BrandRecord>,
}

impl StaticTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide reference table.
    pub fn reference() -> &'static StaticTable {
        &REFERENCE_TABLE
    }

    /// Add a model. Keys are lower-cased; the given casing is kept for display.
    pub fn insert(
        &mut self,
        brand: &str,
        model: &str,
        status: VerdictStatus,
        kits: &[KitName],
        note: &str,
    ) -> &mut Self {
        let brand_record = self
            .brands
            .entry(brand.trim().to_lowercase())
            .or_insert_with(|| BrandRecord {
                display: brand.trim().to_string(),
                models: BTreeMap::new(),
            });
        brand_record.models.insert(
            model.trim().to_lowercase(),
            ModelRecord {
                display: model.trim().to_string(),
                entry: TableEntry {
                    status,
                    kits: kits.to_vec(),
                    note: note.to_string(),
                },
            },
        );
        self
    }

    /// Storefront reference data.
    pub fn storefront() -> Self {
        use KitName::*;
        use VerdictStatus::*;

        let all = [Cosmopolit, Urban, Explorer];
        let mut table = Self::new();
        table
            .insert("Trek", "Domane", Compatible, &all, messages::FRAME_LENGTH)
            .insert("Trek", "Emonda", Compatible, &all, messages::FRAME_LENGTH)
            .insert("Trek", "Madone", Incompatible, &[], messages::NON_STANDARD_GEOMETRY)
            .insert("Specialized", "Roubaix", Compatible, &all, messages::FRAME_LENGTH)
            .insert("Specialized", "Tarmac", Compatible, &all, messages::FRAME_LENGTH)
            .insert("Specialized", "Allez", Incompatible, &[], messages::NON_STANDARD_GEOMETRY)
            .insert("Giant", "Defy", Compatible, &all, messages::FRAME_LENGTH)
            .insert("Giant", "TCR", Unknown, &[], messages::MISSING_DATA)
            .insert("Cannondale", "Synapse", Compatible, &all, messages::FRAME_LENGTH)
            .insert("Cannondale", "SuperSix", Incompatible, &[], messages::NON_STANDARD_GEOMETRY);
        table
    }

    /// Number of models across all brands.
    pub fn len(&self) -> usize {
        self.brands.values().map(|b| b.models.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Brand display names, sorted alphabetically.
    pub fn brands(&self) -> Vec<String> {
        self.brands
            .values()
            .map(|b| b.display.clone())
            .sorted()
            .collect()
    }

    pub fn lookup(&self, query: &BikeQuery) -> CompatibilityVerdict {
        lookup(query, self)
    }

    /// Entries whose "Brand Model" label contains the text (or is contained
    /// in it), closest first.
    pub fn suggest(&self, text: &str, limit: usize) -> Vec<Suggestion> {
        let needle = text.split_whitespace().join(" ").to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        self.brands
            .values()
            .flat_map(|brand| {
                brand.models.values().map(move |model| Suggestion {
                    brand: brand.display.clone(),
                    model: model.display.clone(),
                    label: format!("{} {}", brand.display, model.display),
                    status: model.entry.status,
                })
            })
            .filter_map(|s| {
                let label = s.label.to_lowercase();
                if label.contains(&needle) || needle.contains(&label) {
                    Some((jaro_winkler(&needle, &label), s))
                } else {
                    None
                }
            })
            .sorted_by(|(score_a, a), (score_b, b)| {
                score_b
                    .partial_cmp(score_a)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.label.cmp(&b.label))
            })
            .take(limit)
            .map(|(_, s)| s)
            .collect()
    }
}

fn find_model<'a>(brand: &'a BrandRecord, model_key: &str) -> Option<&'a ModelRecord> {
    if model_key.is_empty() {
        return None;
    }
    if let Some(exact) = brand.models.get(model_key) {
        return Some(exact);
    }
    // A typed model carrying extra words ("domane sl 2023") matches its
    // longest key; a shortened one ("syn") matches the first key holding it.
    brand
        .models
        .iter()
        .filter(|(key, _)| model_key.contains(key.as_str()))
        .max_by_key(|(key, _)| key.len())
        .or_else(|| {
            brand
                .models
                .iter()
                .find(|(key, _)| key.contains(model_key))
        })
        .map(|(_, record)| record)
}

/// Resolve a query against the table. Unrecognised brands and models are
/// `Unknown` verdicts, never errors.
pub fn lookup(query: &BikeQuery, table: &StaticTable) -> CompatibilityVerdict {
    let Some(brand) = table.brands.get(&query.brand_key()) else {
        debug!(brand = %query.brand, "brand not in table");
        return CompatibilityVerdict::unknown(
            messages::unknown_brand(&query.brand, &query.model),
            VerdictSource::StaticTable,
        );
    };

    match find_model(brand, &query.model_key()) {
        Some(record) => {
            debug!(brand = %brand.display, model = %record.display, "table match");
            let entry = &record.entry;
            CompatibilityVerdict::new(
                entry.status,
                entry.kits.iter().copied(),
                entry.note.clone(),
                VerdictSource::StaticTable,
            )
        }
        None => {
            debug!(brand = %brand.display, model = %query.model, "model not in table");
            CompatibilityVerdict::unknown(
                messages::unknown_model(&query.brand, &query.model),
                VerdictSource::StaticTable,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> &'static StaticTable {
        StaticTable::reference()
    }

    #[test]
    fn test_trek_domane_compatible() {
        let verdict = lookup(&BikeQuery::new("trek", "domane"), table());
        assert_eq!(verdict.status(), VerdictStatus::Compatible);
        assert_eq!(
            verdict.kits(),
            &[KitName::Cosmopolit, KitName::Urban, KitName::Explorer]
        );
        assert_eq!(verdict.recommendation_ref(), Some("kit-cosmopolit"));
        assert_eq!(verdict.source(), VerdictSource::StaticTable);
    }

    #[test]
    fn test_trek_madone_incompatible() {
        let verdict = lookup(&BikeQuery::new("trek", "madone"), table());
        assert_eq!(verdict.status(), VerdictStatus::Incompatible);
        assert!(verdict.kits().is_empty());
        assert!(verdict.recommendation_ref().is_none());
    }

    #[test]
    fn test_giant_tcr_unknown() {
        let verdict = lookup(&BikeQuery::new("giant", "tcr"), table());
        assert_eq!(verdict.status(), VerdictStatus::Unknown);
        assert_eq!(verdict.note(), messages::MISSING_DATA);
    }

    #[test]
    fn test_case_insensitive() {
        let verdict = lookup(&BikeQuery::new("TREK", "Domane"), table());
        assert!(verdict.is_compatible());
    }

    #[test]
    fn test_partial_model_match() {
        let verdict = lookup(&BikeQuery::parse("Trek Domane SL 2023"), table());
        assert!(verdict.is_compatible());

        let verdict = lookup(&BikeQuery::parse("Trek Madone SLR 2023"), table());
        assert_eq!(verdict.status(), VerdictStatus::Incompatible);

        let verdict = lookup(&BikeQuery::new("cannondale", "syn"), table());
        assert!(verdict.is_compatible());
    }

    #[test]
    fn test_unknown_brand() {
        let verdict = lookup(&BikeQuery::new("UnknownBrand", "UnknownModel"), table());
        assert_eq!(verdict.status(), VerdictStatus::Unknown);
        assert!(verdict.note().contains("UnknownBrand"));
        assert!(verdict.note().contains("non reconnu"));
    }

    #[test]
    fn test_known_brand_unknown_model() {
        let verdict = lookup(&BikeQuery::new("Trek", "Unknown Model"), table());
        assert_eq!(verdict.status(), VerdictStatus::Unknown);
        assert!(verdict.note().contains("Nous connaissons la marque Trek"));
    }

    #[test]
    fn test_brand_only_never_matches_a_model() {
        let verdict = lookup(&BikeQuery::parse("Specialized"), table());
        assert_eq!(verdict.status(), VerdictStatus::Unknown);
        assert!(verdict.kits().is_empty());
    }

    #[test]
    fn test_find_model_match_order() {
        let mut custom = StaticTable::new();
        custom
            .insert("Trek", "Domane", VerdictStatus::Compatible, &[KitName::Urban], "short")
            .insert("Trek", "Domane SL", VerdictStatus::Incompatible, &[], "long")
            .insert("Trek", "Emonda", VerdictStatus::Unknown, &[], "emonda");
        let trek = &custom.brands["trek"];

        assert_eq!(find_model(trek, "domane").map(|r| r.display.as_str()), Some("Domane"));
        assert_eq!(
            find_model(trek, "domane sl 2023").map(|r| r.display.as_str()),
            Some("Domane SL")
        );
        assert_eq!(find_model(trek, "emon").map(|r| r.entry.note.as_str()), Some("emonda"));
        assert!(find_model(trek, "").is_none());
        assert!(find_model(trek, "madone").is_none());
    }

    #[test]
    fn test_every_entry_respects_kit_invariant() {
        for brand in table().brands.values() {
            for key in brand.models.keys() {
                let verdict = lookup(&BikeQuery::new(brand.display.clone(), key.clone()), table());
                assert_eq!(verdict.kits().is_empty(), !verdict.is_compatible());
                assert_eq!(verdict.recommendation_ref().is_some(), verdict.is_compatible());
            }
        }
    }

    #[test]
    fn test_brands_sorted() {
        assert_eq!(
            table().brands(),
            vec!["Cannondale", "Giant", "Specialized", "Trek"]
        );
        assert_eq!(table().len(), 10);
    }

    #[test]
    fn test_suggest() {
        let suggestions = table().suggest("trek", 10);
        assert_eq!(suggestions.len(), 3);
        assert!(suggestions.iter().all(|s| s.brand == "Trek"));

        let suggestions = table().suggest("super", 5);
        assert_eq!(suggestions[0].label, "Cannondale SuperSix");

        let suggestions = table().suggest("Trek Domane SL 2023", 5);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].model, "Domane");

        assert!(table().suggest("   ", 5).is_empty());
        assert_eq!(table().suggest("a", 2).len(), 2);
    }
}
