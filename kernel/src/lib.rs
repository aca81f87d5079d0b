//! Tessera Kernel: the planning substrate the search layer runs on.
//!
//! # API Surface
//!
//! - [`task::PlanningTask`] -- finite-domain task (variables, operators, initial state, goal)
//! - [`state::StateRegistry`] -- canonical state storage with stable [`state::StateId`]s
//! - [`state::SuccessorGenerator`] -- applicable-operator enumeration
//!
//! # Module Dependency Direction
//!
//! `task` ← `state`
//!
//! One-way only. `state` depends on `task`; `task` depends on nothing internal.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod state;
pub mod task;
