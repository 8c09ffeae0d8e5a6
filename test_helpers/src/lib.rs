//! Test helpers shared across crates.
//!
//! This crate provides manifest text builders, a temporary on-disk deployment
//! layout and wrappers around `figment::Jail` for settings tests.

pub mod figment;
pub mod manifests;
pub mod workspace;
