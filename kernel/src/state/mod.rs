//! Canonical states and applicable-operator enumeration.

pub mod registry;
pub mod successor_generator;

pub use registry::{State, StateId, StateRegistry};
pub use successor_generator::SuccessorGenerator;
