//! Baseline captured before a cluster upgrade, used by the delta checks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Percent;
use crate::errors::PolicyError;

/// Unhealthy and total node counts at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawUnhealthyState")]
pub struct UnhealthyState {
    error_count: u32,
    total_count: u32,
}

#[derive(Deserialize)]
struct RawUnhealthyState {
    error_count: u32,
    total_count: u32,
}

impl TryFrom<RawUnhealthyState> for UnhealthyState {
    type Error = PolicyError;

    fn try_from(raw: RawUnhealthyState) -> Result<Self, Self::Error> {
        UnhealthyState::new(raw.error_count, raw.total_count)
    }
}

impl UnhealthyState {
    /// Fails when `error_count > total_count`.
    pub fn new(error_count: u32, total_count: u32) -> Result<Self, PolicyError> {
        if error_count > total_count {
            return Err(PolicyError::InconsistentBaseline {
                error_count,
                total_count,
            });
        }
        Ok(Self {
            error_count,
            total_count,
        })
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    /// Count one evaluated node.
    pub fn record(&mut self, is_error: bool) {
        self.total_count += 1;
        if is_error {
            self.error_count += 1;
        }
    }
}

/// Unhealthy-node baseline for the whole cluster and for each upgrade domain.
///
/// A default (empty) snapshot is not valid and disables delta checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterUpgradeStateSnapshot {
    global_unhealthy_state: UnhealthyState,
    upgrade_domain_unhealthy_states: BTreeMap<String, UnhealthyState>,
    #[serde(default)]
    valid: bool,
}

impl ClusterUpgradeStateSnapshot {
    pub fn new(
        global_unhealthy_state: UnhealthyState,
        upgrade_domain_unhealthy_states: BTreeMap<String, UnhealthyState>,
    ) -> Self {
        Self {
            global_unhealthy_state,
            upgrade_domain_unhealthy_states,
            valid: true,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn global_unhealthy_state(&self) -> UnhealthyState {
        self.global_unhealthy_state
    }

    pub fn upgrade_domain_unhealthy_states(&self) -> &BTreeMap<String, UnhealthyState> {
        &self.upgrade_domain_unhealthy_states
    }

    pub fn try_get_upgrade_domain_entry(&self, upgrade_domain: &str) -> Option<UnhealthyState> {
        self.upgrade_domain_unhealthy_states.get(upgrade_domain).copied()
    }

    /// Compare the current global counts against the baseline.
    pub fn is_global_delta_respected(&self, error_count: u64, total_count: u64, max_delta: Percent) -> bool {
        Self::is_delta_respected(
            u64::from(self.global_unhealthy_state.error_count),
            u64::from(self.global_unhealthy_state.total_count),
            error_count,
            total_count,
            max_delta,
        )
    }

    /// `current% - baseline% <= max_delta`, each percentage computed on its own
    /// total, evaluated exactly by cross-multiplying. An empty baseline counts as 0%.
    pub fn is_delta_respected(
        baseline_error_count: u64,
        baseline_total_count: u64,
        error_count: u64,
        total_count: u64,
        max_delta: Percent,
    ) -> bool {
        if total_count == 0 {
            return true;
        }
        let (be, bt) = (i128::from(baseline_error_count), i128::from(baseline_total_count));
        let (e, t) = (i128::from(error_count), i128::from(total_count));
        let max = i128::from(max_delta.value());
        if bt == 0 {
            return 100 * e <= max * t;
        }
        // (100e/t - 100be/bt) <= max  <=>  100(e*bt - be*t) <= max*t*bt
        100 * (e * bt - be * t) <= max * t * bt
    }
}
