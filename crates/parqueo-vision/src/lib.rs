//! Plate recognition pipeline: preprocessing, OCR backends, and the
//! bounded multi-attempt search.
//!
//! No single crop or segmentation mode is reliable on small, skewed plate
//! text, so recognition is an ordered brute-force search over candidate
//! buffers × segmentation strategies (≤ 12 attempts) that stops at the
//! first canonical hit.

pub mod engine;
pub mod preprocess;
pub mod recognize;

pub use engine::{OcrEngine, OcrObservation, SegmentationMode, TesseractCli};
pub use preprocess::{candidate_buffers, Candidate};
pub use recognize::recognize_plate;
