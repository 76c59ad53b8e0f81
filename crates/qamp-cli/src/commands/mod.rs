//! CLI command implementations.

pub mod common;
pub mod schedule;
pub mod search;
