//! Kit catalogue
//!
//! The closed set of electrification kits, ordered by capability tier.
//! Cosmopolit fits the widest range of frames; Urban and Explorer need room
//! for the frame-mounted battery.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum down-tube or seat-tube length (mm) for the frame-battery kits.
pub const FRAME_BATTERY_MIN_LENGTH_MM: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KitName {
    Cosmopolit,
    Urban,
    Explorer,
}

impl KitName {
    /// All kits in ascending tier order.
    pub const ALL: [KitName; 3] = [KitName::Cosmopolit, KitName::Urban, KitName::Explorer];

    pub fn as_str(&self) -> &'static str {
        match self {
            KitName::Cosmopolit => "Cosmopolit",
            KitName::Urban => "Urban",
            KitName::Explorer => "Explorer",
        }
    }

    /// URL-friendly name, e.g. `cosmopolit`.
    pub fn slug(&self) -> String {
        self.as_str().to_lowercase().replace(' ', "-")
    }

    /// Product reference used by the storefront, e.g. `kit-cosmopolit`.
    pub fn product_ref(&self) -> String {
        format!("kit-{}", self.slug())
    }

    pub fn needs_frame_battery_room(&self) -> bool {
        !matches!(self, KitName::Cosmopolit)
    }
}

impl fmt::Display for KitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KitName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cosmopolit" => Ok(KitName::Cosmopolit),
            "urban" => Ok(KitName::Urban),
            "explorer" => Ok(KitName::Explorer),
            other => Err(format!("unknown kit '{}'", other)),
        }
    }
}

/// Sort kits by tier and drop duplicates.
pub fn normalize_kits<I: IntoIterator<Item = KitName>>(kits: I) -> Vec<KitName> {
    use itertools::Itertools;
    kits.into_iter().sorted().dedup().collect()
}
