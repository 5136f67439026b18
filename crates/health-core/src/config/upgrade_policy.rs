use serde::{Deserialize, Serialize};

use super::{defaults, Percent};

/// Delta thresholds used while a cluster upgrade is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterUpgradeHealthPolicy {
    /// Allowed growth of the global unhealthy-node percentage. Default: 10.
    pub max_percent_delta_unhealthy_nodes: Percent,
    /// Allowed growth inside a single upgrade domain. Default: 15.
    pub max_percent_upgrade_domain_delta_unhealthy_nodes: Percent,
}

impl ClusterUpgradeHealthPolicy {
    pub fn new(global: Percent, per_upgrade_domain: Percent) -> Self {
        Self {
            max_percent_delta_unhealthy_nodes: global,
            max_percent_upgrade_domain_delta_unhealthy_nodes: per_upgrade_domain,
        }
    }
}

impl Default for ClusterUpgradeHealthPolicy {
    fn default() -> Self {
        Self {
            max_percent_delta_unhealthy_nodes: Percent(defaults::DEFAULT_MAX_PERCENT_DELTA_UNHEALTHY_NODES),
            max_percent_upgrade_domain_delta_unhealthy_nodes: Percent(
                defaults::DEFAULT_MAX_PERCENT_UPGRADE_DOMAIN_DELTA_UNHEALTHY_NODES,
            ),
        }
    }
}
