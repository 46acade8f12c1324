//! Bike identification and frame geometry
//!
//! `BikeQuery` is what the shopper typed; `BikeSpec` is the structured frame
//! and fork data the rule evaluator works on.

use crate::error::{CompatError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MAX_BRAND_LEN: usize = 50;
pub const MAX_MODEL_LEN: usize = 100;

lazy_static! {
    static ref VALID_NAME: Regex = Regex::new(r"^[a-zA-Z0-9\s\-\.]+$").expect("valid name pattern");
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BikeQuery {
    pub brand: String,
    pub model: String,
}

impl BikeQuery {
    pub fn new(brand: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            model: model.into(),
        }
    }

    /// Split free text into brand and model.
    ///
    /// The first whitespace-separated token is the brand, the remaining
    /// tokens joined with single spaces are the model. Never fails: blank
    /// input gives an empty brand, and callers reject it before parsing.
    pub fn parse(text: &str) -> Self {
        let mut tokens = text.split_whitespace();
        let brand = tokens.next().unwrap_or_default().to_string();
        let model = tokens.collect::<Vec<_>>().join(" ");
        Self { brand, model }
    }

    /// "Brand Model", without a trailing space when the model is empty.
    pub fn label(&self) -> String {
        if self.model.is_empty() {
            self.brand.clone()
        } else {
            format!("{} {}", self.brand, self.model)
        }
    }

    pub fn brand_key(&self) -> String {
        self.brand.trim().to_lowercase()
    }

    pub fn model_key(&self) -> String {
        self.model.trim().to_lowercase()
    }

    /// Checks applied to API parameters before any lookup.
    pub fn validate(&self) -> Result<()> {
        let brand = self.brand.trim();
        let model = self.model.trim();

        if brand.is_empty() {
            return Err(CompatError::Validation("Brand is required".to_string()));
        }
        if model.is_empty() {
            return Err(CompatError::Validation("Model is required".to_string()));
        }
        if brand.chars().count() > MAX_BRAND_LEN {
            return Err(CompatError::Validation(format!(
                "Brand name too long (max {} characters)",
                MAX_BRAND_LEN
            )));
        }
        if model.chars().count() > MAX_MODEL_LEN {
            return Err(CompatError::Validation(format!(
                "Model name too long (max {} characters)",
                MAX_MODEL_LEN
            )));
        }
        if !VALID_NAME.is_match(brand) {
            return Err(CompatError::Validation(
                "Brand contains invalid characters".to_string(),
            ));
        }
        if !VALID_NAME.is_match(model) {
            return Err(CompatError::Validation(
                "Model contains invalid characters".to_string(),
            ));
        }
        Ok(())
    }
}

/// Front wheel attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxleType {
    QuickRelease,
    ThruAxle,
    #[default]
    Unknown,
}

impl AxleType {
    /// Map a free-form axle label from geometry data.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "qr" | "quick-release" | "quick_release" | "quick release" | "quickrelease" => {
                AxleType::QuickRelease
            }
            "ta" | "thru-axle" | "thru_axle" | "thru axle" | "thruaxle" => AxleType::ThruAxle,
            _ => AxleType::Unknown,
        }
    }
}

/// Structured frame/fork data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "GeometryRecord")]
pub struct BikeSpec {
    pub front_axle: AxleType,
    pub fork_spacing_mm: Option<f64>,
    pub down_tube_length_mm: Option<f64>,
    pub seat_tube_length_mm: Option<f64>,
    pub has_bottle_mount: Option<bool>,
    pub brake_type: Option<String>,
}

impl BikeSpec {
    pub fn new(front_axle: AxleType, fork_spacing_mm: Option<f64>) -> Self {
        Self {
            front_axle,
            fork_spacing_mm,
            ..Default::default()
        }
    }

    pub fn with_down_tube(mut self, length_mm: f64) -> Self {
        self.down_tube_length_mm = Some(length_mm);
        self
    }

    pub fn with_seat_tube(mut self, length_mm: f64) -> Self {
        self.seat_tube_length_mm = Some(length_mm);
        self
    }

    pub fn with_bottle_mount(mut self, present: bool) -> Self {
        self.has_bottle_mount = Some(present);
        self
    }

    pub fn with_brake_type(mut self, brake: impl Into<String>) -> Self {
        self.brake_type = Some(brake.into());
        self
    }
}

/// Geometry record as served by the external data source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeometryRecord {
    #[serde(default, alias = "front_axle")]
    pub wheel_axle_front: Option<String>,
    #[serde(default)]
    pub fork_spacing_mm: Option<f64>,
    #[serde(default)]
    pub down_tube_length_mm: Option<f64>,
    #[serde(default)]
    pub seat_tube_length_mm: Option<f64>,
    #[serde(default)]
    pub has_bottle_mount: Option<bool>,
    #[serde(default)]
    pub brake_type: Option<String>,
}

impl GeometryRecord {
    /// True when none of the decision fields are present.
    pub fn is_empty(&self) -> bool {
        self.wheel_axle_front.is_none()
            && self.fork_spacing_mm.is_none()
            && self.down_tube_length_mm.is_none()
            && self.seat_tube_length_mm.is_none()
    }
}

impl From<GeometryRecord> for BikeSpec {
    fn from(record: GeometryRecord) -> Self {
        Self {
            front_axle: record
                .wheel_axle_front
                .as_deref()
                .map(AxleType::from_label)
                .unwrap_or_default(),
            fork_spacing_mm: record.fork_spacing_mm,
            down_tube_length_mm: record.down_tube_length_mm,
            seat_tube_length_mm: record.seat_tube_length_mm,
            has_bottle_mount: record.has_bottle_mount,
            brake_type: record.brake_type.filter(|b| !b.trim().is_empty()),
        }
    }
}
