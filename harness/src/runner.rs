//! Harness runner: builds a search from a world and a policy and runs it to
//! completion.
//!
//! # Pipeline
//!
//! ```text
//! world.build_task() → heuristics (relaxed plan [+ goal count])
//!   → open list (policy.open_list) → strategy (policy.strategy)
//!   → LazySearch::new()                       (build_search)
//!   → search() → RunReport                    (run_lazy_search)
//! ```
//!
//! # Report directory
//!
//! ```text
//! <dir>/
//!   run_report.json   pretty JSON of RunReport::to_json_value()
//!   plan.txt          operator names, one per line (solved runs only)
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use tessera_kernel::task::{Cost, PlanningTask, TaskError};
use tessera_search::evaluator::Evaluator;
use tessera_search::heuristic::{HeuristicId, HeuristicSet};
use tessera_search::lazy_search::{LazySearch, SearchStatus};
use tessera_search::open_list;
use tessera_search::policy::LazySearchOptions;
use tessera_search::strategy::{ConjunctionGenerationStrategy, NoConjunctions};
use tessera_search::SearchError;

use crate::contract::PlanningWorld;
use crate::heuristics::{GoalCountHeuristic, RelaxedPlanHeuristic};
use crate::policy::{OpenListKind, RunPolicy, StrategyKind};
use crate::strategies::GoalPairsStrategy;

const REPORT_FILENAME: &str = "run_report.json";
const PLAN_FILENAME: &str = "plan.txt";

/// Error during a harness run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The world produced a malformed task.
    #[error("world {world_id}: {source}")]
    Task {
        world_id: String,
        #[source]
        source: TaskError,
    },
    /// The search rejected its options or aborted.
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("report serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub world_id: String,
    pub status: SearchStatus,
    /// Operator names of the plan, when solved.
    pub plan: Option<Vec<String>>,
    pub plan_cost: Option<Cost>,
    pub plan_digest: Option<String>,
    pub expansion_digest: String,
    pub statistics: serde_json::Value,
    pub policy: serde_json::Value,
}

impl RunReport {
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.status == SearchStatus::Solved
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let status = match self.status {
            SearchStatus::InProgress => "in_progress",
            SearchStatus::Solved => "solved",
            SearchStatus::Failed => "failed",
        };
        serde_json::json!({
            "expansion_digest": self.expansion_digest,
            "plan": self.plan,
            "plan_cost": self.plan_cost,
            "plan_digest": self.plan_digest,
            "policy": self.policy,
            "statistics": self.statistics,
            "status": status,
            "world_id": self.world_id,
        })
    }

    /// Write the report (and the plan, if any) into `dir`, creating it.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Io`] or [`RunError::Json`].
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, RunError> {
        std::fs::create_dir_all(dir).map_err(|source| RunError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let report_path = dir.join(REPORT_FILENAME);
        let bytes = serde_json::to_vec_pretty(&self.to_json_value())?;
        write_file(&report_path, &bytes)?;
        if let Some(plan) = &self.plan {
            let mut text = plan.join("\n");
            text.push('\n');
            write_file(&dir.join(PLAN_FILENAME), text.as_bytes())?;
        }
        Ok(report_path)
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), RunError> {
    std::fs::write(path, bytes).map_err(|source| RunError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read back the JSON written by [`RunReport::write_to_dir`].
///
/// # Errors
///
/// Returns [`RunError::Io`] if the file is missing, [`RunError::Json`] if it
/// does not parse.
pub fn read_report(dir: &Path) -> Result<serde_json::Value, RunError> {
    let path = dir.join(REPORT_FILENAME);
    let bytes = std::fs::read(&path).map_err(|source| RunError::Io { path, source })?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Build the search driver `policy` describes for `task`.
///
/// # Errors
///
/// Returns [`RunError::Search`] if the derived driver options are rejected.
pub fn build_search<'t>(task: &'t PlanningTask, policy: &RunPolicy) -> Result<LazySearch<'t>, RunError> {
    let mut heuristics = HeuristicSet::new(Box::new(RelaxedPlanHeuristic::new(task)));
    let mut heuristic_ids = vec![HeuristicId::CONJUNCTIONS];
    if policy.alternate_goal_count {
        heuristic_ids.push(heuristics.push(Box::new(GoalCountHeuristic::new(task))));
    }
    let preferred = if policy.use_preferred {
        vec![HeuristicId::CONJUNCTIONS]
    } else {
        Vec::new()
    };

    let open_list = match policy.open_list {
        OpenListKind::Greedy => open_list::greedy(
            heuristic_ids.iter().map(|&id| Evaluator::Heuristic(id)).collect(),
            &preferred,
            policy.boost,
        ),
        OpenListKind::WeightedAStar { weight } => {
            open_list::weighted_astar(&heuristic_ids, weight, &preferred, policy.boost)
        }
    };
    let strategy: Box<dyn ConjunctionGenerationStrategy> = match policy.strategy {
        StrategyKind::None => Box::new(NoConjunctions),
        StrategyKind::GoalPairs { max_conjunctions } => {
            Box::new(GoalPairsStrategy::new(task, max_conjunctions))
        }
    };
    let options = LazySearchOptions {
        preferred_heuristics: preferred,
        ..policy.search.clone()
    };

    Ok(LazySearch::new(task, heuristics, open_list, strategy, options)?)
}

/// Run lazy search on `world` under `policy`.
///
/// # Errors
///
/// Returns [`RunError::Task`] for a malformed world and [`RunError::Search`]
/// for rejected options or an aborted search. Exhausting the search space is
/// a `Failed` report, not an error.
pub fn run_lazy_search(world: &dyn PlanningWorld, policy: &RunPolicy) -> Result<RunReport, RunError> {
    let world_id = world.world_id();
    let task = world.build_task().map_err(|source| RunError::Task {
        world_id: world_id.clone(),
        source,
    })?;

    let mut search = build_search(&task, policy)?;
    let status = search.search()?;
    let statistics = search.statistics_json();
    info!(world = %world_id, ?status, %statistics, "run finished");

    let plan = search.plan();
    Ok(RunReport {
        plan: plan.map(|p| p.operator_names(&task).into_iter().map(String::from).collect()),
        plan_cost: plan.map(|p| p.real_cost),
        plan_digest: plan.map(|p| p.digest(&task)),
        expansion_digest: search.expansion_digest(),
        statistics,
        policy: policy.to_json_value(),
        status,
        world_id,
    })
}
