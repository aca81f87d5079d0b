//! World implementations for the harness runner.

pub mod counter;
pub mod gripper;
pub mod weighted_graph;
