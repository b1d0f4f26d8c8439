mod highlevel;
mod lowlevel;

pub(crate) use highlevel::{
    Conflict, Constraints, EdgeConstraint, HighLevelOpenNode, VertexConstraint,
};
pub(crate) use lowlevel::{Action, LowLevelOpenNode, PlanResult, State};

use std::collections::HashSet;
use tracing::error;

use crate::map::Map;

/// A grid cell. Ordering is lexicographic on `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

/// Joint plan for all agents together with the goal index each agent was
/// assigned out of the pool.
#[derive(Debug, Clone)]
pub struct Solution {
    pub(crate) plans: Vec<PlanResult>,
    pub(crate) tasks: Vec<usize>,
}

impl Solution {
    pub fn cost(&self) -> i32 {
        self.plans.iter().map(|plan| plan.cost).sum()
    }

    pub fn makespan(&self) -> i32 {
        self.plans.iter().map(|plan| plan.cost).max().unwrap_or(0)
    }

    pub fn verify(&self, map: &Map, starts: &[Location]) -> bool {
        if self.plans.len() != starts.len() || self.tasks.len() != starts.len() {
            error!("incomplete solution");
            return false;
        }

        for (agent, plan) in self.plans.iter().enumerate() {
            let first = plan.states.first().map(|(state, _)| state.position);
            let last = plan.states.last().map(|(state, _)| state.position);
            if first != Some(starts[agent]) || last != Some(map.goal(self.tasks[agent])) {
                error!(
                    "start and goal failed for agent {agent}: path start {first:?} path end {last:?}, but agent start {:?} assigned goal {:?}",
                    starts[agent],
                    map.goal(self.tasks[agent])
                );
                return false;
            }

            if plan.actions.len() + 1 != plan.states.len() {
                error!(
                    "agent {agent} has {} actions for {} states",
                    plan.actions.len(),
                    plan.states.len()
                );
                return false;
            }

            for window in plan.states.windows(2) {
                if let [(from, _), (to, _)] = window {
                    if !Self::are_neighbors(from.position, to.position) {
                        error!("move step failed for agent {agent}: {from:?} -> {to:?}");
                        return false;
                    }
                }
            }
        }

        let max_length = self.plans.iter().map(|plan| plan.states.len()).max().unwrap_or(0);

        for time_step in 0..max_length {
            let mut seen_positions = HashSet::new();
            let mut seen_edges = HashSet::new();

            for plan in &self.plans {
                let pos = plan
                    .states
                    .get(time_step)
                    .unwrap_or_else(|| plan.states.last().unwrap())
                    .0
                    .position;
                if !map.is_passable(pos) {
                    error!("impossible move onto {pos:?}");
                    return false;
                }

                if !seen_positions.insert(pos) {
                    error!("vertex conflict at {pos:?} time {time_step}");
                    return false;
                }

                if time_step >= 1 && time_step < plan.states.len() {
                    let prev_pos = plan.states[time_step - 1].0.position;
                    if prev_pos != pos {
                        let edge = (prev_pos, pos);
                        let reverse_edge = (pos, prev_pos);

                        if !seen_edges.insert(edge) || seen_edges.contains(&reverse_edge) {
                            error!("edge conflict between {edge:?} and {reverse_edge:?}");
                            return false;
                        }
                    }
                }
            }
        }

        true
    }

    fn are_neighbors(pos1: Location, pos2: Location) -> bool {
        (pos1.x - pos2.x).abs() + (pos1.y - pos2.y).abs() <= 1
    }
}
