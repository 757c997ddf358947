//! Core types for the parking pipeline

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::plate::Plate;

/// Vehicle type for a parking session.
///
/// The recognition pipeline does not classify vehicles; sessions default to
/// `Car` and an employee corrects the type when needed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    #[default]
    Car,
    Moto,
}

impl VehicleType {
    pub fn label(&self) -> &'static str {
        match self {
            VehicleType::Car => "car",
            VehicleType::Moto => "moto",
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Camera angle tag attached to each photo of an entry burst.
///
/// The declaration order is the listing order: a burst starts with the
/// right-side shot, which is the only angle allowed to resolve a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum PhotoAngle {
    EntryRight,
    EntryLeft,
    EntryRear,
    /// Not selectable for photo ingestion; exits are registered through
    /// the exit operation, not a photo upload.
    #[value(skip)]
    Exit,
}

impl PhotoAngle {
    /// The first angle of a burst, the only one that may create a session.
    pub fn is_first_angle(&self) -> bool {
        matches!(self, PhotoAngle::EntryRight)
    }

    pub fn is_entry(&self) -> bool {
        matches!(
            self,
            PhotoAngle::EntryRight | PhotoAngle::EntryLeft | PhotoAngle::EntryRear
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            PhotoAngle::EntryRight => "entry_right",
            PhotoAngle::EntryLeft => "entry_left",
            PhotoAngle::EntryRear => "entry_rear",
            PhotoAngle::Exit => "exit",
        }
    }
}

impl std::fmt::Display for PhotoAngle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one bounded recognition search over a photo.
///
/// Transient: never persisted. A failed search is a regular value with
/// `needs_correction` set, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub success: bool,
    pub plate: Option<Plate>,
    /// Engine confidence scaled to [0, 1].
    pub confidence: f32,
    /// Last non-empty raw text the engine produced.
    pub raw_text: String,
    pub needs_correction: bool,
    pub message: String,
}

impl RecognitionResult {
    pub fn detected(plate: Plate, confidence: f32, raw_text: String) -> Self {
        Self {
            success: true,
            plate: Some(plate),
            confidence: confidence.clamp(0.0, 1.0),
            raw_text,
            needs_correction: false,
            message: "Plate detected".to_string(),
        }
    }

    pub fn not_detected(raw_text: String) -> Self {
        let message = if raw_text.is_empty() {
            "No plate detected".to_string()
        } else {
            format!("No plate detected. Text found: {}", raw_text)
        };
        Self {
            success: false,
            plate: None,
            confidence: 0.0,
            raw_text,
            needs_correction: true,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_ordering_matches_burst_order() {
        assert!(PhotoAngle::EntryRight < PhotoAngle::EntryLeft);
        assert!(PhotoAngle::EntryLeft < PhotoAngle::EntryRear);
        assert!(PhotoAngle::EntryRear < PhotoAngle::Exit);
    }

    #[test]
    fn test_only_right_is_first_angle() {
        assert!(PhotoAngle::EntryRight.is_first_angle());
        assert!(!PhotoAngle::EntryLeft.is_first_angle());
        assert!(!PhotoAngle::EntryRear.is_first_angle());
        assert!(!PhotoAngle::Exit.is_first_angle());
    }

    #[test]
    fn test_exit_is_not_a_selectable_angle() {
        let variants = <PhotoAngle as clap::ValueEnum>::value_variants();
        assert!(variants.contains(&PhotoAngle::EntryRight));
        assert!(variants.contains(&PhotoAngle::EntryLeft));
        assert!(variants.contains(&PhotoAngle::EntryRear));
        assert!(!variants.contains(&PhotoAngle::Exit));
    }

    #[test]
    fn test_detected_clamps_confidence() {
        let plate = Plate::parse("ABC123").unwrap();
        let result = RecognitionResult::detected(plate, 1.4, "ABC123".to_string());
        assert_eq!(result.confidence, 1.0);
        assert!(!result.needs_correction);
    }

    #[test]
    fn test_not_detected_carries_raw_text() {
        let result = RecognitionResult::not_detected("GARBLED".to_string());
        assert!(!result.success);
        assert!(result.needs_correction);
        assert!(result.message.contains("GARBLED"));
    }
}
