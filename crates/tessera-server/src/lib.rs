//! # Tessera Server Library
//!
//! Dependency wiring and startup utilities for the `tessera-server` binary.

pub mod di;
pub mod startup;
