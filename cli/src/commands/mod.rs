//! Command implementations

pub mod start;
pub mod state;
pub mod validate;
pub mod version;
