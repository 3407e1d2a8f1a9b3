use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Integer identifier of a user row
pub type UserId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("range low bound {low} is greater than high bound {high}")]
    Inverted { low: UserId, high: UserId },
    #[error("expected a range like LOW..=HIGH, got '{0}'")]
    Malformed(String),
    #[error("invalid bound '{0}': not an unsigned integer")]
    InvalidBound(String),
}

/// Inclusive range of user IDs `[low, high]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawIdRange")]
pub struct IdRange {
    low: UserId,
    high: UserId,
}

#[derive(Deserialize)]
struct RawIdRange {
    low: UserId,
    high: UserId,
}

impl TryFrom<RawIdRange> for IdRange {
    type Error = RangeError;

    fn try_from(raw: RawIdRange) -> Result<Self, Self::Error> {
        IdRange::new(raw.low, raw.high)
    }
}

impl IdRange {
    pub fn new(low: UserId, high: UserId) -> Result<Self, RangeError> {
        if low > high {
            return Err(RangeError::Inverted { low, high });
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> UserId {
        self.low
    }

    pub fn high(&self) -> UserId {
        self.high
    }

    /// Number of IDs in the range. Saturates at `u64::MAX` for the full domain.
    pub fn len(&self) -> u64 {
        (self.high - self.low).saturating_add(1)
    }

    /// Always false: an `IdRange` holds at least one ID.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.low <= id && id <= self.high
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<UserId> {
        self.low..=self.high
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.low, self.high)
    }
}

impl FromStr for IdRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (low, high) = s
            .trim()
            .split_once("..=")
            .ok_or_else(|| RangeError::Malformed(s.to_string()))?;

        let parse = |bound: &str| {
            let bound = bound.trim().replace('_', "");
            bound
                .parse::<UserId>()
                .map_err(|_| RangeError::InvalidBound(bound.clone()))
        };

        IdRange::new(parse(low)?, parse(high)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_range() {
        let range: IdRange = "11_878_102..=21_878_101".parse().unwrap();
        assert_eq!(range.low(), 11_878_102);
        assert_eq!(range.high(), 21_878_101);
        assert_eq!(range.len(), 10_000_000);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            "1..10".parse::<IdRange>(),
            Err(RangeError::Malformed("1..10".to_string()))
        );
        assert!(matches!(
            "a..=10".parse::<IdRange>(),
            Err(RangeError::InvalidBound(_))
        ));
        assert_eq!(
            "10..=1".parse::<IdRange>(),
            Err(RangeError::Inverted { low: 10, high: 1 })
        );
        // No expression evaluation, only plain integers
        assert!("1+1..=10".parse::<IdRange>().is_err());
    }

    #[test]
    fn test_single_id_range() {
        let range = IdRange::new(7, 7).unwrap();
        assert_eq!(range.len(), 1);
        assert!(range.contains(7));
        assert!(!range.contains(8));
    }

    #[test]
    fn test_deserialize_validates_bounds() {
        let ok: IdRange = serde_json::from_str(r#"{"low":1,"high":10}"#).unwrap();
        assert_eq!(ok, IdRange::new(1, 10).unwrap());

        let bad = serde_json::from_str::<IdRange>(r#"{"low":10,"high":1}"#);
        assert!(bad.is_err());
    }

    proptest! {
        #[test]
        fn prop_display_parses_back(low in 0u64..1_000_000, span in 0u64..1_000_000) {
            let range = IdRange::new(low, low + span).unwrap();
            let parsed: IdRange = range.to_string().parse().unwrap();
            prop_assert_eq!(parsed, range);
            prop_assert_eq!(parsed.len(), span + 1);
        }
    }
}
