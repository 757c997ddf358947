//! OCR engine abstraction and the tesseract CLI backend

use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

use parqueo_types::{Error, Result};

/// Character set the engine is restricted to: plates plus the separators
/// OCR tends to hallucinate between letter and digit groups.
pub const CHAR_WHITELIST: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789- ";

/// Recognition-engine configuration controlling how an image is partitioned
/// into text regions, in fixed priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentationMode {
    /// Treat the buffer as a single text line (psm 7).
    SingleLine,
    /// Assume a uniform block of text (psm 6).
    UniformBlock,
    /// Find sparse text in no particular order (psm 11).
    SparseText,
}

impl SegmentationMode {
    /// All strategies, in the order the search tries them.
    pub const PRIORITY: [SegmentationMode; 3] = [
        SegmentationMode::SingleLine,
        SegmentationMode::UniformBlock,
        SegmentationMode::SparseText,
    ];

    /// Tesseract page-segmentation mode number.
    pub fn psm(&self) -> u32 {
        match self {
            SegmentationMode::SingleLine => 7,
            SegmentationMode::UniformBlock => 6,
            SegmentationMode::SparseText => 11,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SegmentationMode::SingleLine => "single_line",
            SegmentationMode::UniformBlock => "uniform_block",
            SegmentationMode::SparseText => "sparse_text",
        }
    }
}

/// One engine reading: raw text plus the engine's native 0–100 score.
#[derive(Debug, Clone, Default)]
pub struct OcrObservation {
    pub text: String,
    pub confidence: f32,
}

/// A text recognition backend. One call is one attempt of the bounded
/// search; failures are per-attempt and never abort the whole search.
pub trait OcrEngine {
    fn recognize(&self, image_png: &[u8], mode: SegmentationMode) -> Result<OcrObservation>;
}

/// Backend that shells out to the tesseract CLI in TSV mode.
///
/// The command is configurable (e.g. a wrapper script or an absolute
/// path); extra arguments survive `shell_words` splitting.
pub struct TesseractCli {
    command: String,
}

impl TesseractCli {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

/// Distinguishes concurrent recognitions within one process; the pid
/// alone only separates processes.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

impl TesseractCli {
    fn temp_input_path(mode: SegmentationMode) -> PathBuf {
        std::env::temp_dir().join(format!(
            "parqueo_ocr_{}_{}_{}.png",
            std::process::id(),
            mode.psm(),
            TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ))
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image_png: &[u8], mode: SegmentationMode) -> Result<OcrObservation> {
        let mut parts = shell_words::split(&self.command)
            .map_err(|e| Error::Validation(format!("invalid OCR command: {}", e)))?;
        if parts.is_empty() {
            return Err(Error::Validation("empty OCR command".to_string()));
        }

        let input_path = Self::temp_input_path(mode);
        std::fs::write(&input_path, image_png)?;

        let program = parts.remove(0);
        let mut cmd = Command::new(&program);
        cmd.args(&parts);
        cmd.arg(&input_path);
        cmd.arg("stdout");
        cmd.arg("--psm").arg(mode.psm().to_string());
        cmd.arg("-c")
            .arg(format!("tessedit_char_whitelist={}", CHAR_WHITELIST));
        cmd.arg("tsv");

        let output = cmd.output();
        let _ = std::fs::remove_file(&input_path);
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Infrastructure(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(parse_tsv(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parse tesseract TSV output. Word rows carry a confidence in the `conf`
/// column and the text in the last column; `conf` is -1 on structural rows.
/// The observation's confidence is the mean word confidence.
fn parse_tsv(tsv: &str) -> OcrObservation {
    let mut words: Vec<String> = Vec::new();
    let mut confidences: Vec<f32> = Vec::new();

    for line in tsv.lines().skip(1) {
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 12 {
            continue;
        }
        let conf: f32 = match cols[10].parse() {
            Ok(c) => c,
            Err(_) => continue,
        };
        if conf < 0.0 {
            continue;
        }
        let text = cols[11].trim();
        if text.is_empty() {
            continue;
        }
        words.push(text.to_string());
        confidences.push(conf);
    }

    let confidence = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f32>() / confidences.len() as f32
    };

    OcrObservation {
        text: words.join(" "),
        confidence,
    }
}
