//! Binary that runs `Gripper(3)` through the lazy search pipeline with
//! randomized successor order and prints deterministic output lines for
//! cross-process verification.
//!
//! Usage: `search_fixture`
//!
//! Output: key=value lines (see source for format).

use tessera_harness::policy::RunPolicy;
use tessera_harness::runner::run_lazy_search;
use tessera_harness::worlds::gripper::Gripper;
use tessera_search::policy::LazySearchOptions;

/// Seed shared with the in-process determinism tests.
const FIXTURE_SEED: u64 = 0x7e55_e2a0;

fn main() {
    let policy = RunPolicy {
        search: LazySearchOptions {
            randomize_successors: true,
            random_seed: FIXTURE_SEED,
            ..LazySearchOptions::default()
        },
        ..RunPolicy::default()
    };
    let report = run_lazy_search(&Gripper::new(3), &policy).expect("search run failed");

    let status = report.to_json_value()["status"]
        .as_str()
        .expect("missing status")
        .to_string();
    let expanded = report.statistics["expanded"]
        .as_u64()
        .expect("missing expanded");
    let conjunctions = report.statistics["conjunctions"]
        .as_u64()
        .expect("missing conjunctions");

    println!("world_id={}", report.world_id);
    println!("status={status}");
    println!(
        "plan_cost={}",
        report.plan_cost.expect("fixture world is solvable")
    );
    println!(
        "plan_digest={}",
        report.plan_digest.as_deref().expect("missing plan digest")
    );
    println!("expansion_digest={}", report.expansion_digest);
    println!("expanded={expanded}");
    println!("conjunctions={conjunctions}");
}
