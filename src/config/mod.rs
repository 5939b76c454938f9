pub mod settings;

pub use settings::{AuditConfig, BehaviorConfig, Config, ConfigError, DelegateConfig};
