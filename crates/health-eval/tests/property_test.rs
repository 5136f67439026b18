use std::sync::Arc;

use health_core::config::{HealthConfig, Percent};
use health_core::models::{ClusterHealthQuery, EntityId, EvaluationKind, GetHealthQuery, HealthState};
use health_core::traits::IHealthQuery;
use health_eval::HealthEngine;
use proptest::prelude::*;
use test_fixtures::{pid, ClusterBuilder};

fn arb_state() -> impl Strategy<Value = HealthState> {
    prop_oneof![
        Just(HealthState::Ok),
        Just(HealthState::Warning),
        Just(HealthState::Error),
    ]
}

fn nodes(states: &[HealthState]) -> ClusterBuilder {
    states
        .iter()
        .enumerate()
        .fold(ClusterBuilder::new(), |builder, (i, state)| {
            builder.node(&format!("N{i:03}"), &format!("UD{}", i % 3), *state)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ok_exactly_when_nothing_is_blamed(
        states in prop::collection::vec(arb_state(), 0..25),
        max in 0u8..=100,
        warning_as_error in any::<bool>(),
    ) {
        let mut config = HealthConfig::default();
        config.cluster_policy.max_percent_unhealthy_nodes = Percent::new(max).unwrap();
        config.cluster_policy.consider_warning_as_error = warning_as_error;
        let engine = HealthEngine::with_store(Arc::new(nodes(&states).build()), config).unwrap();

        let health = engine.get_cluster_health(&ClusterHealthQuery::default()).unwrap();
        prop_assert_eq!(
            health.aggregated_health_state == HealthState::Ok,
            health.unhealthy_evaluations.is_empty()
        );
        for evaluation in &health.unhealthy_evaluations {
            prop_assert_eq!(evaluation.aggregated_health_state(), health.aggregated_health_state);
        }
    }

    #[test]
    fn node_group_fails_only_above_threshold(
        errors in 0u64..20,
        healthy in 0u64..20,
        max in 0u8..=100,
    ) {
        let total = errors + healthy;
        let states: Vec<HealthState> = (0..total)
            .map(|i| if i < errors { HealthState::Error } else { HealthState::Ok })
            .collect();
        let mut config = HealthConfig::default();
        config.cluster_policy.max_percent_unhealthy_nodes = Percent::new(max).unwrap();
        let engine = HealthEngine::with_store(Arc::new(nodes(&states).build()), config).unwrap();

        let health = engine.get_cluster_health(&ClusterHealthQuery::default()).unwrap();
        let exceeded = total > 0 && errors * 100 > u64::from(max) * total;
        let expected = if exceeded { HealthState::Error } else { HealthState::Ok };
        prop_assert_eq!(health.aggregated_health_state, expected);
        if exceeded {
            prop_assert_eq!(health.unhealthy_evaluations[0].kind(), EvaluationKind::Nodes);
            prop_assert_eq!(health.unhealthy_evaluations[0].total_count(), Some(total));
        }
    }

    #[test]
    fn trimming_keeps_total_count(replicas in 1i64..30, cap in 1usize..6) {
        let mut builder = ClusterBuilder::new()
            .application("fabric:/App", "AppType", HealthState::Ok)
            .service("fabric:/App", "fabric:/App/Svc", "SvcType", HealthState::Ok)
            .partition("fabric:/App/Svc", pid(1), HealthState::Ok);
        for r in 1..=replicas {
            builder = builder.replica(pid(1), r, "N1", HealthState::Error);
        }
        let mut config = HealthConfig::default();
        config.evaluation.max_child_evaluations = cap;
        let engine = HealthEngine::with_store(Arc::new(builder.build()), config).unwrap();

        let health = engine.get_health(&GetHealthQuery::new(EntityId::partition(pid(1)))).unwrap();
        let evaluation = &health.unhealthy_evaluations[0];
        prop_assert_eq!(evaluation.kind(), EvaluationKind::Replicas);
        prop_assert_eq!(evaluation.total_count(), Some(replicas as u64));
        prop_assert_eq!(evaluation.unhealthy_evaluations().len(), cap.min(replicas as usize));
    }
}
