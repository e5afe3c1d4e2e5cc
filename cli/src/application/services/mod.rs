//! Application services: use-case orchestration.
//!
//! Each service accepts port trait bounds instead of concrete infra types.

pub mod identity_startup;
pub mod runtime;
pub mod sync_cycle;
