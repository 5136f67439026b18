//! Validated percentage threshold.
//!
//! # Examples
//!
//! ```
//! use health_core::config::Percent;
//!
//! let max = Percent::new(20).unwrap();
//! assert!(max.is_respected(2, 10));
//! assert!(!max.is_respected(3, 10));
//! assert!(Percent::new(101).is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::PolicyError;

/// A percentage in `0..=100`. Out-of-range input is rejected, never clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u8")]
pub struct Percent(pub(crate) u8);

impl Percent {
    pub const ZERO: Percent = Percent(0);
    pub const HUNDRED: Percent = Percent(100);

    pub fn new(value: u8) -> Result<Self, PolicyError> {
        Self::try_from(u32::from(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// `100 * unhealthy / total <= self`, evaluated without rounding.
    ///
    /// An empty set always respects the threshold.
    pub fn is_respected(self, unhealthy: u64, total: u64) -> bool {
        if total == 0 {
            return true;
        }
        u128::from(unhealthy) * 100 <= u128::from(self.0) * u128::from(total)
    }
}

/// Integer percentage used in descriptions (truncated).
pub fn percent_of(part: u64, total: u64) -> u64 {
    if total == 0 {
        0
    } else {
        part.saturating_mul(100) / total
    }
}

impl TryFrom<u32> for Percent {
    type Error = PolicyError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .map(Percent)
            .ok_or(PolicyError::PercentOutOfRange { value })
    }
}

impl From<Percent> for u8 {
    fn from(p: Percent) -> Self {
        p.0
    }
}

impl FromStr for Percent {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().trim_end_matches('%');
        let value: u32 = token
            .parse()
            .map_err(|_| PolicyError::InvalidPercentToken {
                token: s.to_string(),
            })?;
        Percent::try_from(value)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_plain_and_suffixed_tokens() {
        assert_eq!("20".parse::<Percent>().unwrap().value(), 20);
        assert_eq!(" 35% ".parse::<Percent>().unwrap().value(), 35);
    }

    #[test]
    fn parse_rejects_garbage_and_out_of_range() {
        assert!(matches!(
            "abc".parse::<Percent>(),
            Err(PolicyError::InvalidPercentToken { .. })
        ));
        assert!(matches!(
            "150".parse::<Percent>(),
            Err(PolicyError::PercentOutOfRange { value: 150 })
        ));
        assert!("-1".parse::<Percent>().is_err());
    }

    #[test]
    fn boundary_is_inclusive() {
        let max = Percent::new(20).unwrap();
        assert!(max.is_respected(2, 10));
        assert!(!max.is_respected(3, 10));
        assert!(Percent::ZERO.is_respected(0, 5));
        assert!(!Percent::ZERO.is_respected(1, 1000));
        assert!(Percent::HUNDRED.is_respected(7, 7));
    }

    #[test]
    fn serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<Percent>("101").is_err());
        assert_eq!(serde_json::from_str::<Percent>("40").unwrap().value(), 40);
        assert_eq!(serde_json::to_string(&Percent::new(7).unwrap()).unwrap(), "7");
    }
}
