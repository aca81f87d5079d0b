//! Conjunction-generation strategies.

pub mod goal_pairs;

pub use goal_pairs::GoalPairsStrategy;
