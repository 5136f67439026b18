use std::fmt;

use serde::{Deserialize, Serialize};

/// Aggregated or reported health of an entity.
///
/// Rollups only ever compare `Ok`, `Warning` and `Error`. `Unknown` marks an
/// entity that exists but has no usable data yet; `Invalid` is never produced
/// by the engine and only exists so malformed input can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Invalid,
    Ok,
    Warning,
    Error,
    Unknown,
}

impl HealthState {
    /// Rollup severity. `None` for states that never take part in "worst of".
    pub fn severity(self) -> Option<u8> {
        match self {
            Self::Ok => Some(0),
            Self::Warning => Some(1),
            Self::Error => Some(2),
            Self::Invalid | Self::Unknown => None,
        }
    }

    /// True when `self` is strictly more severe than `other`.
    ///
    /// Anything beats `Unknown`/`Invalid`; they never beat anything.
    pub fn is_worse_than(self, other: HealthState) -> bool {
        match (self.severity(), other.severity()) {
            (Some(a), Some(b)) => a > b,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// The worse of two states.
    pub fn worst(self, other: HealthState) -> HealthState {
        if other.is_worse_than(self) {
            other
        } else {
            self
        }
    }

    /// Warning and Error. Unknown is "no data", not unhealthy.
    pub fn is_unhealthy(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }

    /// Apply the `consider_warning_as_error` policy.
    pub fn promote(self, consider_warning_as_error: bool) -> HealthState {
        match self {
            Self::Warning if consider_warning_as_error => Self::Error,
            other => other,
        }
    }

    /// Whether a reporter may submit this state.
    pub fn is_reportable(self) -> bool {
        matches!(self, Self::Ok | Self::Warning | Self::Error)
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Invalid => "Invalid",
            Self::Ok => "Ok",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(HealthState::Error.is_worse_than(HealthState::Warning));
        assert!(HealthState::Warning.is_worse_than(HealthState::Ok));
        assert!(!HealthState::Ok.is_worse_than(HealthState::Ok));
    }

    #[test]
    fn unknown_never_wins_a_rollup() {
        assert!(!HealthState::Unknown.is_worse_than(HealthState::Ok));
        assert!(HealthState::Ok.is_worse_than(HealthState::Unknown));
        assert_eq!(HealthState::Unknown.worst(HealthState::Ok), HealthState::Ok);
        assert_eq!(HealthState::Error.worst(HealthState::Unknown), HealthState::Error);
    }

    #[test]
    fn promote_only_touches_warning() {
        assert_eq!(HealthState::Warning.promote(true), HealthState::Error);
        assert_eq!(HealthState::Warning.promote(false), HealthState::Warning);
        assert_eq!(HealthState::Ok.promote(true), HealthState::Ok);
    }
}
