use std::collections::BTreeSet;
use std::time::Instant;

use tracing::debug;

use super::Solver;
use crate::assignment::NextBestAssignment;
use crate::common::{HighLevelOpenNode, Location, Solution};
use crate::map::Map;
use crate::stat::Stats;

/// Matrix entry for a group-eligible pair whose goal is unreachable from
/// the agent's start. Such assignments sort after every fully reachable
/// one and are discarded when root planning fails on them.
const UNREACHABLE_COST: i64 = i32::MAX as i64;

/// Conflict-based search over the constraint tree, interleaved with lazy
/// task assignment draws so that the first returned solution is optimal
/// over the assignment choice and the routing choice jointly.
pub struct CbsTa {
    map: Map,
    starts: Vec<Location>,
    assignment: NextBestAssignment,
    max_task_assignments: usize,
    max_high_level_expanded: usize,
    stats: Stats,
}

impl CbsTa {
    pub fn new(
        map: Map,
        starts: Vec<Location>,
        max_task_assignments: usize,
        group_size: usize,
    ) -> Self {
        let mut assignment = NextBestAssignment::new(starts.len(), map.num_goals());
        for (agent, &start) in starts.iter().enumerate() {
            let group_start = (agent / group_size) * group_size;
            let group_end = group_start.saturating_add(group_size).min(map.num_goals());
            for task in group_start..group_end {
                let cost = map
                    .heuristic(task, start)
                    .map_or(UNREACHABLE_COST, i64::from);
                assignment.set_cost(agent, task, cost);
            }
        }

        CbsTa {
            map,
            starts,
            assignment,
            max_task_assignments,
            max_high_level_expanded: usize::MAX,
            stats: Stats::default(),
        }
    }

    /// Caps the number of high level expansions. The constraint tree of an
    /// unsolvable assignment grows forever (every added constraint can be
    /// waited out), so unbounded runs only terminate on solvable inputs.
    pub fn set_expansion_limit(&mut self, limit: usize) {
        self.max_high_level_expanded = limit;
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    fn next_task_assignment(&mut self) -> Option<Vec<usize>> {
        if self.stats.num_task_assignments >= self.max_task_assignments {
            debug!(
                "refusing task assignment draw, budget of {:?} spent",
                self.max_task_assignments
            );
            self.stats.budget_exhausted = true;
            return None;
        }

        let (tasks, cost) = self.assignment.next_solution()?;
        self.stats.num_task_assignments += 1;
        debug!("task assignment {:?}: cost {cost:?} tasks {tasks:?}", self.stats.num_task_assignments);
        Some(tasks)
    }

    /// Root node for the next assignment that is plannable agent by agent.
    /// Draws containing an unreachable pairing are discarded and charged
    /// against the budget, matching the draw-counting of the enumerator.
    fn new_root(&mut self, node_id: u64) -> Option<HighLevelOpenNode> {
        loop {
            let tasks = self.next_task_assignment()?;
            match HighLevelOpenNode::new(&self.map, &self.starts, &tasks, node_id, &mut self.stats)
            {
                Some(root) => return Some(root),
                None => debug!("discarding unplannable assignment {tasks:?}"),
            }
        }
    }
}

impl Solver for CbsTa {
    fn solve(&mut self) -> Option<Solution> {
        let total_solve_start_time = Instant::now();
        let mut open = BTreeSet::new();
        let mut next_node_id: u64 = 0;

        if let Some(root) = self.new_root(next_node_id) {
            next_node_id += 1;
            open.insert(root);
        }

        while let Some(current) = open.pop_first() {
            if self.stats.high_level_expand_nodes >= self.max_high_level_expanded {
                debug!("high level expansion limit reached");
                return None;
            }
            self.stats.high_level_expand_nodes += 1;

            // Every popped root admits the next assignment into the open
            // list. Roots arrive in non-decreasing cost order, so the open
            // list always holds a root for every assignment at least as
            // cheap as its current minimum.
            if current.is_root {
                if let Some(root) = self.new_root(next_node_id) {
                    next_node_id += 1;
                    open.insert(root);
                }
            }

            match current.first_conflict() {
                None => {
                    self.stats.time_us = total_solve_start_time.elapsed().as_micros() as u64;
                    self.stats.costs = current.cost;
                    self.stats.makespan = current
                        .solution
                        .iter()
                        .map(|plan| plan.cost)
                        .max()
                        .unwrap_or(0);
                    self.stats.print();

                    let solution = Solution {
                        plans: current.solution,
                        tasks: current.tasks,
                    };
                    debug_assert!(solution.verify(&self.map, &self.starts));
                    return Some(solution);
                }
                Some(conflict) => {
                    debug!("resolving conflict {conflict:?}");
                    for resolve_first in [true, false] {
                        if let Some(child) = current.update_constraint(
                            &conflict,
                            resolve_first,
                            &self.map,
                            &self.starts,
                            next_node_id,
                            &mut self.stats,
                        ) {
                            next_node_id += 1;
                            open.insert(child);
                        }
                    }
                }
            }
        }

        None
    }
}
