//! Shared fixtures and helpers for tests across the workspace.

pub mod deployment;
pub mod fixtures;
pub mod logging;
