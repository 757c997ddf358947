//! Bounded multi-attempt plate recognition search
//!
//! The search space is the lazy cross-product of candidate buffers (crops
//! first, full frame last) and segmentation strategies in priority order —
//! at most 4 × 3 = 12 attempts. It short-circuits on the first recognized
//! substring that also passes the canonical plate grammar, and checks a
//! deadline before every attempt so a slow engine cannot block the caller
//! past its time box.

use std::time::Instant;

use parqueo_types::{plate, Plate, RecognitionResult};

use crate::engine::{OcrEngine, SegmentationMode};
use crate::preprocess::Candidate;

/// One (buffer, strategy) descriptor of the search plan.
#[derive(Debug, Clone, Copy)]
pub struct Attempt<'a> {
    pub candidate: &'a Candidate,
    pub mode: SegmentationMode,
}

/// The prioritized, lazily-evaluated attempt sequence.
pub fn search_plan(candidates: &[Candidate]) -> impl Iterator<Item = Attempt<'_>> {
    candidates.iter().flat_map(|candidate| {
        SegmentationMode::PRIORITY
            .iter()
            .map(move |&mode| Attempt { candidate, mode })
    })
}

/// Run the bounded search. Returns a success as soon as one attempt yields
/// a canonical plate; otherwise a failure carrying the last non-empty raw
/// text seen, flagged for manual correction. Attempts remaining when
/// `deadline` passes are abandoned.
pub fn recognize_plate(
    engine: &dyn OcrEngine,
    candidates: &[Candidate],
    deadline: Option<Instant>,
) -> RecognitionResult {
    let mut last_text = String::new();

    for attempt in search_plan(candidates) {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            log::warn!("recognition deadline reached, abandoning remaining attempts");
            break;
        }

        let observation = match engine.recognize(&attempt.candidate.png, attempt.mode) {
            Ok(obs) => obs,
            Err(err) => {
                log::warn!(
                    "OCR attempt failed ({} / {}): {}",
                    attempt.candidate.label,
                    attempt.mode.label(),
                    err
                );
                continue;
            }
        };

        let text = observation.text.trim();
        log::debug!(
            "OCR attempt {} / {}: {:?} (conf {:.1})",
            attempt.candidate.label,
            attempt.mode.label(),
            text,
            observation.confidence
        );
        if !text.is_empty() {
            last_text = text.to_string();
        }

        let Some(extracted) = plate::extract_candidate(text) else {
            continue;
        };
        // The grammar gate is authoritative; a match that fails it is
        // discarded and the search goes on.
        let Ok(valid) = Plate::parse(&extracted) else {
            continue;
        };

        return RecognitionResult::detected(valid, observation.confidence / 100.0, text.to_string());
    }

    RecognitionResult::not_detected(last_text)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::time::Duration;

    use parqueo_types::Result;

    use super::*;
    use crate::engine::OcrObservation;

    /// Engine that replays scripted observations and records every call.
    struct ScriptedEngine {
        script: HashMap<(String, SegmentationMode), OcrObservation>,
        calls: RefCell<Vec<(String, SegmentationMode)>>,
    }

    impl ScriptedEngine {
        fn new() -> Self {
            Self {
                script: HashMap::new(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn on(mut self, label: &str, mode: SegmentationMode, text: &str, conf: f32) -> Self {
            self.script.insert(
                (label.to_string(), mode),
                OcrObservation {
                    text: text.to_string(),
                    confidence: conf,
                },
            );
            self
        }

        fn calls(&self) -> Vec<(String, SegmentationMode)> {
            self.calls.borrow().clone()
        }
    }

    impl OcrEngine for ScriptedEngine {
        fn recognize(&self, image_png: &[u8], mode: SegmentationMode) -> Result<OcrObservation> {
            let label = String::from_utf8_lossy(image_png).to_string();
            self.calls.borrow_mut().push((label.clone(), mode));
            Ok(self
                .script
                .get(&(label, mode))
                .cloned()
                .unwrap_or_default())
        }
    }

    fn buffer(label: &str) -> Candidate {
        // Tests encode the label as the buffer content so the scripted
        // engine can tell candidates apart.
        Candidate {
            label: label.to_string(),
            png: label.as_bytes().to_vec(),
        }
    }

    fn burst_buffers() -> Vec<Candidate> {
        vec![buffer("crop1"), buffer("crop2"), buffer("crop3"), buffer("full")]
    }

    #[test]
    fn test_crop_hit_short_circuits_before_full_frame() {
        let engine = ScriptedEngine::new().on(
            "crop1",
            SegmentationMode::SingleLine,
            "ABC-123",
            87.0,
        );
        let result = recognize_plate(&engine, &burst_buffers(), None);

        assert!(result.success);
        assert_eq!(result.plate.as_ref().unwrap().as_str(), "ABC123");
        assert!((result.confidence - 0.87).abs() < 0.001);
        assert!(!result.needs_correction);

        let calls = engine.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls.iter().all(|(label, _)| label != "full"));
    }

    #[test]
    fn test_strategies_exhaust_in_priority_order_per_buffer() {
        let engine = ScriptedEngine::new().on(
            "crop2",
            SegmentationMode::UniformBlock,
            "xyz 987",
            60.0,
        );
        let result = recognize_plate(&engine, &burst_buffers(), None);

        assert!(result.success);
        assert_eq!(result.plate.as_ref().unwrap().as_str(), "XYZ987");

        let calls = engine.calls();
        assert_eq!(
            calls,
            vec![
                ("crop1".to_string(), SegmentationMode::SingleLine),
                ("crop1".to_string(), SegmentationMode::UniformBlock),
                ("crop1".to_string(), SegmentationMode::SparseText),
                ("crop2".to_string(), SegmentationMode::SingleLine),
                ("crop2".to_string(), SegmentationMode::UniformBlock),
            ]
        );
    }

    #[test]
    fn test_non_canonical_match_does_not_stop_the_search() {
        // crop1 yields text with no plate-shaped substring; the search
        // keeps going and lands on the full frame.
        let engine = ScriptedEngine::new()
            .on("crop1", SegmentationMode::SingleLine, "AB 12", 90.0)
            .on("full", SegmentationMode::SingleLine, "DEF456", 70.0);
        let result = recognize_plate(&engine, &burst_buffers(), None);

        assert!(result.success);
        assert_eq!(result.plate.as_ref().unwrap().as_str(), "DEF456");
    }

    #[test]
    fn test_exhausted_search_reports_last_raw_text() {
        let engine = ScriptedEngine::new()
            .on("crop1", SegmentationMode::SingleLine, "NOISE", 40.0)
            .on("crop3", SegmentationMode::SparseText, "ALMOST 12", 30.0);
        let result = recognize_plate(&engine, &burst_buffers(), None);

        assert!(!result.success);
        assert!(result.needs_correction);
        assert_eq!(result.plate, None);
        assert_eq!(result.raw_text, "ALMOST 12");
        assert_eq!(engine.calls().len(), 12);
    }

    #[test]
    fn test_expired_deadline_skips_all_attempts() {
        let engine = ScriptedEngine::new().on(
            "crop1",
            SegmentationMode::SingleLine,
            "ABC123",
            90.0,
        );
        let deadline = Instant::now() - Duration::from_millis(1);
        let result = recognize_plate(&engine, &burst_buffers(), Some(deadline));

        assert!(!result.success);
        assert!(result.needs_correction);
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn test_confidence_is_scaled_and_clamped() {
        let engine = ScriptedEngine::new().on(
            "crop1",
            SegmentationMode::SingleLine,
            "ABC123",
            250.0,
        );
        let result = recognize_plate(&engine, &burst_buffers(), None);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_search_plan_is_bounded_at_twelve_attempts() {
        let buffers = burst_buffers();
        assert_eq!(search_plan(&buffers).count(), 12);
    }
}
