use serde::{Deserialize, Serialize};

use super::HealthState;

/// Bit-flag filter over health states.
///
/// `DEFAULT` matches everything; `NONE` matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HealthStateFilter(u32);

impl HealthStateFilter {
    pub const DEFAULT: Self = Self(0);
    pub const NONE: Self = Self(0x1);
    pub const OK: Self = Self(0x2);
    pub const WARNING: Self = Self(0x4);
    pub const ERROR: Self = Self(0x8);
    pub const ALL: Self = Self(0xFFFF);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn matches(self, state: HealthState) -> bool {
        if self == Self::DEFAULT || self == Self::ALL {
            return true;
        }
        let bit = match state {
            HealthState::Ok => Self::OK.0,
            HealthState::Warning => Self::WARNING.0,
            HealthState::Error => Self::ERROR.0,
            HealthState::Unknown | HealthState::Invalid => return false,
        };
        self.0 & bit != 0
    }
}

impl std::ops::BitOr for HealthStateFilter {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_combine() {
        let f = HealthStateFilter::WARNING | HealthStateFilter::ERROR;
        assert!(f.matches(HealthState::Error));
        assert!(f.matches(HealthState::Warning));
        assert!(!f.matches(HealthState::Ok));
        assert!(!HealthStateFilter::NONE.matches(HealthState::Error));
        assert!(HealthStateFilter::DEFAULT.matches(HealthState::Ok));
        assert!(!HealthStateFilter::OK.matches(HealthState::Unknown));
    }
}
