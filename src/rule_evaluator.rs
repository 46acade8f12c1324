//! Rule Evaluator - Kit compatibility from frame and fork geometry
//!
//! Rules are checked in order and the first match decides:
//! 1. Thru-axle front wheel: incompatible
//! 2. Fork spacing other than 100 mm: incompatible
//! 3. Unknown axle or missing fork spacing: unknown
//! 4. Otherwise compatible with Cosmopolit, plus Urban and Explorer when the
//!    down tube or seat tube offers room for the battery

use crate::bike::{AxleType, BikeSpec};
use crate::kits::{KitName, FRAME_BATTERY_MIN_LENGTH_MM};
use crate::messages;
use crate::verdict::{CompatibilityVerdict, VerdictSource};
use tracing::debug;

/// The only fork spacing the kits' front hub fits.
pub const STANDARD_FORK_SPACING_MM: f64 = 100.0;

pub fn evaluate(spec: &BikeSpec) -> CompatibilityVerdict {
    if spec.front_axle == AxleType::ThruAxle {
        debug!("rule: thru-axle front wheel");
        return CompatibilityVerdict::incompatible(messages::THRU_AXLE, VerdictSource::RuleEngine);
    }

    if let Some(spacing) = spec.fork_spacing_mm {
        if spacing != STANDARD_FORK_SPACING_MM {
            debug!(spacing, "rule: non-standard fork spacing");
            return CompatibilityVerdict::incompatible(
                messages::fork_spacing(spacing),
                VerdictSource::RuleEngine,
            );
        }
    }

    if spec.front_axle == AxleType::Unknown || spec.fork_spacing_mm.is_none() {
        debug!("rule: missing axle or fork data");
        return CompatibilityVerdict::unknown(messages::MISSING_DATA, VerdictSource::RuleEngine);
    }

    let kits: Vec<KitName> = if has_frame_battery_room(spec) {
        KitName::ALL.to_vec()
    } else {
        KitName::ALL
            .into_iter()
            .filter(|k| !k.needs_frame_battery_room())
            .collect()
    };

    let note = compatible_note(spec, kits.len() == KitName::ALL.len());
    CompatibilityVerdict::compatible(kits, note, VerdictSource::RuleEngine)
}

fn has_frame_battery_room(spec: &BikeSpec) -> bool {
    [spec.down_tube_length_mm, spec.seat_tube_length_mm]
        .into_iter()
        .flatten()
        .any(|length| length >= FRAME_BATTERY_MIN_LENGTH_MM)
}

fn compatible_note(spec: &BikeSpec, all_kits: bool) -> String {
    let mut notes = vec![if all_kits {
        messages::ALL_KITS.to_string()
    } else {
        messages::BASE_KIT_ONLY.to_string()
    }];

    if spec.has_bottle_mount == Some(true) {
        notes.push(messages::BOTTLE_MOUNT.to_string());
    }
    if let Some(brake) = &spec.brake_type {
        notes.push(messages::brake_type(brake));
    }

    notes.join(" ")
}
