//! Year-scoped sequential dispute numbers (`DSP-<year>-<seq>`).

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use tradepost_core::{DomainError, DomainResult};

const PREFIX: &str = "DSP";

/// Human-facing dispute case number.
///
/// Format `DSP-<year>-<sequence>`; the sequence is zero-padded to 4 digits
/// but has no hard ceiling (`DSP-2026-10000` is valid). Unique and strictly
/// increasing within its year; allocation is serialized by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisputeNumber(String);

impl DisputeNumber {
    /// Build the number for `sequence` within `year`.
    pub fn new(year: i32, sequence: u32) -> Self {
        Self(format!("{PREFIX}-{year}-{sequence:04}"))
    }

    /// First number of a year.
    pub fn first(year: i32) -> Self {
        Self::new(year, 1)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The year component.
    pub fn year(&self) -> i32 {
        // Parse cannot fail for a constructed number.
        self.parts().map(|(year, _)| year).unwrap_or_default()
    }

    /// The numeric suffix.
    pub fn sequence(&self) -> u32 {
        self.parts().map(|(_, seq)| seq).unwrap_or_default()
    }

    fn parts(&self) -> Option<(i32, u32)> {
        let rest = self.0.strip_prefix(PREFIX)?.strip_prefix('-')?;
        let (year, seq) = rest.split_once('-')?;
        Some((year.parse().ok()?, seq.parse().ok()?))
    }
}

impl core::fmt::Display for DisputeNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DisputeNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        let candidate = Self(s.to_string());
        if candidate.parts().is_none() {
            return Err(DomainError::invalid_id(format!(
                "DisputeNumber: malformed '{s}'"
            )));
        }
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_four_digit_padding() {
        assert_eq!(DisputeNumber::new(2026, 1).as_str(), "DSP-2026-0001");
        assert_eq!(DisputeNumber::new(2026, 42).as_str(), "DSP-2026-0042");
        assert_eq!(DisputeNumber::first(2026).as_str(), "DSP-2026-0001");
    }

    #[test]
    fn no_hard_ceiling_past_9999() {
        let n = DisputeNumber::new(2026, 10_000);
        assert_eq!(n.as_str(), "DSP-2026-10000");
        assert_eq!(n.sequence(), 10_000);
    }

    #[test]
    fn parses_year_and_sequence_back_out() {
        let n: DisputeNumber = "DSP-2025-0137".parse().unwrap();
        assert_eq!(n.year(), 2025);
        assert_eq!(n.sequence(), 137);
    }

    #[test]
    fn rejects_malformed_numbers() {
        for bad in ["", "DSP-2026", "INV-2026-0001", "DSP-abcd-0001", "DSP-2026-xyz"] {
            assert!(
                bad.parse::<DisputeNumber>().is_err(),
                "'{bad}' should not parse"
            );
        }
    }

    #[test]
    fn sequences_within_a_year_sort_lexicographically_up_to_9999() {
        let a = DisputeNumber::new(2026, 7);
        let b = DisputeNumber::new(2026, 123);
        assert!(a.as_str() < b.as_str());
    }
}
