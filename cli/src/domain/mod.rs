//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod identity;

pub use config::{AgentConfig, CertificateTarget, validate_config};
pub use error::{ConfigError, IdentityError, StateError, SyncError};
pub use identity::{
    IdentityDrift, IdentityRecord, IdentityStatus, ResetOutcome, ResetPlan, StartupDecision,
    apply_reset, classify, decide_startup,
};
