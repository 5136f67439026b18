/// Health engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix shared by every system reporter.
pub const SYSTEM_SOURCE_PREFIX: &str = "System.";

/// Failover manager.
pub const FM_SOURCE: &str = "System.FM";
/// Failover manager master.
pub const FMM_SOURCE: &str = "System.FMM";
/// Cluster manager.
pub const CM_SOURCE: &str = "System.CM";
/// Reconfiguration agent.
pub const RA_SOURCE: &str = "System.RA";
/// Hosting subsystem.
pub const HOSTING_SOURCE: &str = "System.Hosting";
/// Source of events generated by the engine itself.
pub const HM_SOURCE: &str = "System.HM";

/// Property of the authority report for most entity kinds.
pub const STATE_PROPERTY: &str = "State";
/// Property of the authority report for deployed entities.
pub const ACTIVATION_PROPERTY: &str = "Activation";
/// Property of the generated event raised when the authority report is missing.
pub const AUTHORITY_REPORT_PROPERTY: &str = "AuthorityReport";
/// Property of the generated event raised when an entity has too many reports.
pub const HEALTH_REPORT_COUNT_PROPERTY: &str = "HealthReportCount";

/// Name of the system application.
pub const SYSTEM_APPLICATION_NAME: &str = "fabric:/System";
/// Name of the application that owns services created without one.
pub const AD_HOC_APPLICATION_NAME: &str = "fabric:";

/// Maximum length of a health event description, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 4096;
