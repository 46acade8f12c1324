use crate::bike::{BikeQuery, BikeSpec};
use crate::catalog::{lookup, StaticTable};
use crate::geometry::{ExternalData, GeometrySource};
use crate::rule_evaluator::evaluate;
use crate::verdict::CompatibilityVerdict;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Decide compatibility for a bike.
///
/// Structured geometry, when available, goes through the rule evaluator;
/// otherwise the static table answers. Never fails: missing data ends up as
/// an `Unknown` verdict.
pub fn resolve(query: &BikeQuery, external_spec: Option<&BikeSpec>) -> CompatibilityVerdict {
    resolve_with_table(query, external_spec, StaticTable::reference())
}

pub fn resolve_with_table(
    query: &BikeQuery,
    external_spec: Option<&BikeSpec>,
    table: &StaticTable,
) -> CompatibilityVerdict {
    match external_spec {
        Some(spec) => evaluate(spec),
        None => lookup(query, table),
    }
}

/// Resolve a bike, consulting the external source first when one is given.
///
/// A failed fetch is logged and treated as "no data"; it is never retried
/// and never surfaces to the caller.
pub async fn analyze(
    query: &BikeQuery,
    source: Option<&dyn GeometrySource>,
    table: &StaticTable,
) -> CompatibilityVerdict {
    let span = info_span!("analysis", id = %Uuid::new_v4());
    async move {
        let verdict = match source {
            None => resolve_with_table(query, None, table),
            Some(source) => match source.fetch(query).await {
                Ok(ExternalData::Geometry(spec)) => resolve_with_table(query, Some(&spec), table),
                Ok(ExternalData::Verdict(verdict)) => verdict,
                Err(e) => {
                    warn!(error = %e, "geometry data unavailable, using static table");
                    resolve_with_table(query, None, table)
                }
            },
        };

        info!(
            brand = %query.brand,
            model = %query.model,
            status = %verdict.status(),
            kits = verdict.kits().len(),
            source = verdict.source().as_str(),
            "compatibility resolved"
        );
        verdict
    }
    .instrument(span)
    .await
}
