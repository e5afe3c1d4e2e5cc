//! Application layer: port trait definitions, the shared agent state and
//! use-case orchestration.
//!
//! This module depends only on `crate::domain`, never on `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod ports;
pub mod services;
pub mod state;

pub use ports::{
    IdentityStore, Migration, Registration, ResetConfirmer, SyncClient, SyncReport,
};
pub use state::AgentState;
