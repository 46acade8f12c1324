//! External geometry data source
//!
//! Best-effort lookup of frame geometry by brand/model against an HTTP
//! endpoint. The endpoint answers either with a geometry record, which goes
//! through the rule evaluator, or with a ready-made verdict. Every failure
//! here is `DataUnavailable`; callers fall back to the static table.

use crate::bike::{BikeQuery, BikeSpec, GeometryRecord};
use crate::config::Config;
use crate::error::{CompatError, Result};
use crate::kits::KitName;
use crate::messages;
use crate::verdict::{CompatibilityVerdict, VerdictSource, VerdictStatus};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// What the external source knows about a bike.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalData {
    Geometry(BikeSpec),
    Verdict(CompatibilityVerdict),
}

#[async_trait]
pub trait GeometrySource: Send + Sync {
    async fn fetch(&self, query: &BikeQuery) -> Result<ExternalData>;
}

/// Verdict-shaped answer of the compatibility endpoint.
#[derive(Debug, Deserialize)]
struct RemoteVerdict {
    status: VerdictStatus,
    #[serde(default)]
    kits: Vec<String>,
    #[serde(default, alias = "note")]
    notes: Option<String>,
}

/// Classify a JSON body as a verdict or a geometry record.
pub fn parse_payload(value: serde_json::Value) -> Result<ExternalData> {
    let Some(object) = value.as_object() else {
        return Err(CompatError::DataUnavailable(
            "geometry response is not a JSON object".to_string(),
        ));
    };

    if object.contains_key("status") {
        let remote: RemoteVerdict = serde_json::from_value(value)
            .map_err(|e| CompatError::DataUnavailable(format!("malformed verdict: {}", e)))?;
        return remote_verdict(remote).map(ExternalData::Verdict);
    }

    let record: GeometryRecord = serde_json::from_value(value)
        .map_err(|e| CompatError::DataUnavailable(format!("malformed geometry record: {}", e)))?;
    if record.is_empty() {
        return Err(CompatError::DataUnavailable(
            "geometry record carries no frame data".to_string(),
        ));
    }
    Ok(ExternalData::Geometry(record.into()))
}

fn remote_verdict(remote: RemoteVerdict) -> Result<CompatibilityVerdict> {
    let kits: Vec<KitName> = remote
        .kits
        .iter()
        .filter_map(|name| match name.parse::<KitName>() {
            Ok(kit) => Some(kit),
            Err(e) => {
                warn!(kit = %name, "dropping kit from remote verdict: {}", e);
                None
            }
        })
        .collect();

    if remote.status == VerdictStatus::Compatible && kits.is_empty() {
        return Err(CompatError::DataUnavailable(
            "compatible verdict without any known kit".to_string(),
        ));
    }

    let note = remote
        .notes
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| {
            match remote.status {
                VerdictStatus::Compatible => messages::FRAME_LENGTH,
                VerdictStatus::Incompatible => messages::NON_STANDARD_GEOMETRY,
                VerdictStatus::Unknown => messages::MISSING_DATA,
            }
            .to_string()
        });

    Ok(CompatibilityVerdict::new(
        remote.status,
        kits,
        note,
        VerdictSource::RemoteService,
    ))
}

/// HTTP client for the geometry endpoint.
#[derive(Clone)]
pub struct GeometryClient {
    client: reqwest::Client,
    endpoint: String,
}

impl GeometryClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// `None` when fetching is disabled or no endpoint is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        config
            .geometry_endpoint()
            .map(|endpoint| Self::new(endpoint, config.geometry_timeout))
            .transpose()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GeometrySource for GeometryClient {
    async fn fetch(&self, query: &BikeQuery) -> Result<ExternalData> {
        debug!(
            endpoint = %self.endpoint,
            brand = %query.brand,
            model = %query.model,
            "fetching geometry"
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("brand", query.brand.as_str()), ("model", query.model.as_str())])
            .send()
            .await
            .map_err(|e| CompatError::DataUnavailable(format!("geometry request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompatError::DataUnavailable(format!(
                "geometry service returned {}",
                status
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CompatError::DataUnavailable(format!("unreadable geometry body: {}", e)))?;
        parse_payload(body)
    }
}
