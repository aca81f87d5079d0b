//! Tessera Harness: concrete heuristics, strategies, and worlds for the
//! search driver, plus the runner that wires them together.
//!
//! The harness does NOT implement search logic; it delegates to
//! `tessera_search`. Worlds provide tasks only; the runner owns configuration.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod contract;
pub mod heuristics;
pub mod policy;
pub mod runner;
pub mod strategies;
pub mod worlds;
