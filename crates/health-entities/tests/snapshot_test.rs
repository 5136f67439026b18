use chrono::Utc;
use health_core::models::{EntityId, EntityKind, HealthState};
use test_fixtures::{pid, store_from_scenario, ClusterBuilder};

#[test]
fn snapshot_links_the_scenario_hierarchy() {
    let store = store_from_scenario("partition_quorum_loss.json", Utc::now());
    let snapshot = store.snapshot(Utc::now());
    assert_eq!(snapshot.len(), 5);

    let partition = snapshot.get(&EntityId::partition(pid(10))).unwrap();
    let states: Vec<HealthState> = snapshot
        .children_of_kind(partition, EntityKind::Replica)
        .map(|r| r.events[0].state)
        .collect();
    assert_eq!(states, vec![HealthState::Ok, HealthState::Error, HealthState::Error]);

    let service = snapshot.parent(partition).unwrap();
    assert_eq!(service.id, EntityId::service("fabric:/Store/Catalog"));
    assert_eq!(service.service_type_name(), Some("CatalogType"));
}

#[test]
fn snapshot_is_isolated_from_later_writes() {
    let builder = ClusterBuilder::new().node("N1", "UD0", HealthState::Ok);
    let before = builder.snapshot();
    let builder = builder.node("N2", "UD1", HealthState::Ok);
    assert_eq!(before.entities_of_kind(EntityKind::Node).count(), 1);
    assert_eq!(builder.snapshot().entities_of_kind(EntityKind::Node).count(), 2);
}

#[test]
fn node_attributes_survive_later_reports_without_them() {
    let builder = ClusterBuilder::new()
        .node("N1", "UD3", HealthState::Ok)
        .user_report(EntityId::node("N1"), "Watchdog", "Disk", HealthState::Warning);
    let snapshot = builder.snapshot();
    let node = snapshot.get(&EntityId::node("N1")).unwrap();
    assert_eq!(node.upgrade_domain(), Some("UD3"));
    assert_eq!(node.events.len(), 2);
}
