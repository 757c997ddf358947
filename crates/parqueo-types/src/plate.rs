//! License plate normalization and validation
//!
//! Canonical grammar: exactly 3 letters followed by exactly 3 digits
//! (e.g. "ABC123"). This is the authoritative gate for everything the
//! recognition engine or an employee types in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A validated license plate in canonical form (AAA999).
///
/// Construction goes through [`Plate::parse`], so holding a `Plate`
/// guarantees the canonical grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Plate(String);

impl Plate {
    /// Normalize and validate a raw plate string.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = normalize(raw);
        if is_canonical(&normalized) {
            Ok(Plate(normalized))
        } else {
            Err(Error::Validation(format!(
                "invalid plate format: {:?} (expected AAA999)",
                raw
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Plate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Plate {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Plate::parse(&value)
    }
}

impl From<Plate> for String {
    fn from(plate: Plate) -> Self {
        plate.0
    }
}

/// Uppercase and strip whitespace and hyphen separators. Idempotent.
pub fn normalize(raw: &str) -> String {
    raw.to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Check the canonical grammar: 3 ASCII letters then 3 ASCII digits.
pub fn is_canonical(plate: &str) -> bool {
    let chars: Vec<char> = plate.chars().collect();
    chars.len() == 6
        && chars[..3].iter().all(|c| c.is_ascii_uppercase())
        && chars[3..].iter().all(|c| c.is_ascii_digit())
}

/// Extract the first plate-shaped substring from raw recognized text:
/// 3 letters, an optional space/hyphen separator run, 3 digits
/// (case-insensitive). Returns the candidate with separators removed,
/// original case preserved.
pub fn extract_candidate(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    for start in 0..chars.len() {
        if let Some(candidate) = match_at(&chars[start..]) {
            return Some(candidate);
        }
    }
    None
}

fn match_at(chars: &[char]) -> Option<String> {
    let mut i = 0;
    let mut out = String::with_capacity(6);
    for _ in 0..3 {
        let c = *chars.get(i)?;
        if !c.is_ascii_alphabetic() {
            return None;
        }
        out.push(c);
        i += 1;
    }
    while let Some(&c) = chars.get(i) {
        if c == ' ' || c == '-' {
            i += 1;
        } else {
            break;
        }
    }
    for _ in 0..3 {
        let c = *chars.get(i)?;
        if !c.is_ascii_digit() {
            return None;
        }
        out.push(c);
        i += 1;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_separators() {
        assert_eq!(normalize("abc - 123"), "ABC123");
        assert_eq!(normalize(" ABC\t123 "), "ABC123");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["abc-123", "ABC123", "a b c 1 2 3", "##!?", ""] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_canonical_grammar() {
        assert!(is_canonical("ABC123"));
        assert!(!is_canonical("AB123"));
        assert!(!is_canonical("ABCD123"));
        assert!(!is_canonical("ABC12X"));
        assert!(!is_canonical("abc123"));
        assert!(!is_canonical("ABC-123"));
    }

    #[test]
    fn test_parse_normalizes() {
        let plate = Plate::parse("abc - 123").unwrap();
        assert_eq!(plate.as_str(), "ABC123");
    }

    #[test]
    fn test_parse_rejects_bad_grammar() {
        assert!(Plate::parse("1ABC23").is_err());
        assert!(Plate::parse("").is_err());
        assert!(Plate::parse("ABC12").is_err());
    }

    #[test]
    fn test_extract_from_noisy_text() {
        assert_eq!(extract_candidate("foo ABC 123 bar").as_deref(), Some("ABC123"));
        assert_eq!(extract_candidate("xyz-987").as_deref(), Some("xyz987"));
        assert_eq!(extract_candidate("no plate here 12").as_deref(), None);
    }

    #[test]
    fn test_extract_skips_partial_prefix() {
        // The leading X cannot start a match; the scan resumes at A.
        assert_eq!(extract_candidate("XABC123").as_deref(), Some("ABC123"));
    }

    #[test]
    fn test_extract_takes_first_three_digits() {
        assert_eq!(extract_candidate("ABC1234").as_deref(), Some("ABC123"));
    }
}
