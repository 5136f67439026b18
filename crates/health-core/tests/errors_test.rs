use health_core::errors::*;
use health_core::models::{EntityId, EntityKind, EvaluationKind};

#[test]
fn sub_errors_convert_into_health_error() {
    let err: HealthError = PolicyError::PercentOutOfRange { value: 120 }.into();
    assert!(matches!(err, HealthError::PolicyError(_)));

    let err: HealthError = ReportError::EmptySourceId.into();
    assert!(matches!(err, HealthError::ReportError(_)));

    let err: HealthError = EvaluationError::EmptyTotalCount {
        kind: EvaluationKind::Nodes,
    }
    .into();
    assert!(matches!(err, HealthError::EvaluationError(_)));

    let json_err = serde_json::from_str::<EntityId>("not json").unwrap_err();
    let err: HealthError = json_err.into();
    assert!(matches!(err, HealthError::SerializationError(_)));
}

#[test]
fn messages_carry_context() {
    let err = HealthError::EntityNotFound {
        entity: EntityId::node("N7"),
    };
    assert!(err.to_string().contains("N7"));

    let err = HealthError::ApplicationTypeNotFound {
        applications: vec!["fabric:/A".into(), "fabric:/B".into()],
    };
    let msg = err.to_string();
    assert!(msg.contains("2 application(s)"), "{msg}");
    assert!(msg.contains("fabric:/A"));
    assert!(msg.contains("fabric:/B"));

    let err = HealthError::UpgradeDomainNotInBaseline {
        upgrade_domain: "UD3".into(),
    };
    assert!(err.to_string().contains("UD3"));

    let err = EvaluationError::UnsupportedEntityKind {
        kind: EntityKind::Cluster,
    };
    assert!(err.to_string().contains("Cluster"));

    let err = ReportError::StaleSequenceNumber {
        received: 5,
        current: 9,
    };
    let msg = err.to_string();
    assert!(msg.contains('5') && msg.contains('9'), "{msg}");
}
