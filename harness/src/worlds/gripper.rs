//! `Gripper`: a robot with two grippers carries balls from room A to room B.
//!
//! Variables: `robby` (room), one per gripper (free/busy), one per ball
//! (room A, room B, or held by a gripper). Operators are numbered picks
//! first, then drops, then moves.

use tessera_kernel::task::{Fact, Operator, PlanningTask, TaskError, Variable};

use crate::contract::PlanningWorld;

const ROOMS: [&str; 2] = ["rooma", "roomb"];
const GRIPPERS: [&str; 2] = ["left", "right"];

const ROBBY: usize = 0;
const FREE: u32 = 0;
const BUSY: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gripper {
    pub balls: u32,
}

impl Gripper {
    #[must_use]
    pub const fn new(balls: u32) -> Self {
        Self { balls }
    }

    const fn gripper_var(gripper: usize) -> usize {
        1 + gripper
    }

    const fn ball_var(ball: u32) -> usize {
        1 + GRIPPERS.len() + ball as usize
    }

    /// Ball value meaning "held by `gripper`".
    #[allow(clippy::cast_possible_truncation)]
    const fn held(gripper: usize) -> u32 {
        (ROOMS.len() + gripper) as u32
    }
}

impl PlanningWorld for Gripper {
    fn world_id(&self) -> String {
        format!("gripper_{}", self.balls)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn build_task(&self) -> Result<PlanningTask, TaskError> {
        let mut variables = vec![Variable::new("robby", ROOMS.len() as u32)];
        variables.extend(GRIPPERS.iter().map(|g| Variable::new(*g, 2)));
        variables.extend(
            (0..self.balls).map(|b| Variable::new(format!("ball{b}"), (ROOMS.len() + GRIPPERS.len()) as u32)),
        );

        let mut picks = Vec::new();
        let mut drops = Vec::new();
        for ball in 0..self.balls {
            let ball_var = Self::ball_var(ball);
            for (room_index, room) in ROOMS.iter().enumerate() {
                let room_value = room_index as u32;
                for (gripper, gripper_name) in GRIPPERS.iter().enumerate() {
                    let gripper_var = Self::gripper_var(gripper);
                    picks.push(Operator::new(
                        format!("pick-ball{ball}-{room}-{gripper_name}"),
                        vec![
                            Fact::new(ROBBY, room_value),
                            Fact::new(ball_var, room_value),
                            Fact::new(gripper_var, FREE),
                        ],
                        vec![
                            Fact::new(ball_var, Self::held(gripper)),
                            Fact::new(gripper_var, BUSY),
                        ],
                        1,
                    ));
                    drops.push(Operator::new(
                        format!("drop-ball{ball}-{room}-{gripper_name}"),
                        vec![
                            Fact::new(ROBBY, room_value),
                            Fact::new(ball_var, Self::held(gripper)),
                        ],
                        vec![
                            Fact::new(ball_var, room_value),
                            Fact::new(gripper_var, FREE),
                        ],
                        1,
                    ));
                }
            }
        }
        let mut operators = picks;
        operators.append(&mut drops);
        for (from, from_name) in ROOMS.iter().enumerate() {
            for (to, to_name) in ROOMS.iter().enumerate() {
                if from != to {
                    operators.push(Operator::new(
                        format!("move-{from_name}-{to_name}"),
                        vec![Fact::new(ROBBY, from as u32)],
                        vec![Fact::new(ROBBY, to as u32)],
                        1,
                    ));
                }
            }
        }

        let mut initial = vec![0; 1 + GRIPPERS.len()];
        initial.extend((0..self.balls).map(|_| 0));
        let goal = (0..self.balls).map(|b| Fact::new(Self::ball_var(b), 1)).collect();
        PlanningTask::new(variables, operators, initial, goal)
    }
}
