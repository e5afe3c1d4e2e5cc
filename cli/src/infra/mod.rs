//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: the identity state file,
//! config loading, the CertWatch HTTP client, and signal handling.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod api;
pub mod config;
pub mod signal;
pub mod state;
