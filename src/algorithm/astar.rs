use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, instrument, trace};

use super::construct_plan;
use crate::common::{Action, Constraints, Location, LowLevelOpenNode, PlanResult};
use crate::map::Map;
use crate::stat::Stats;

/// Time-expanded A* for one agent towards the pool goal `task`, subject to
/// that agent's vertex and edge constraints. Returns `None` when the goal
/// cannot be reached; the caller prunes the branch.
#[instrument(skip_all, name="a_star", fields(start = format!("{:?}", start), task = task), level = "debug")]
pub(crate) fn a_star_search(
    map: &Map,
    start: Location,
    task: usize,
    constraints: &Constraints,
    stats: &mut Stats,
) -> Option<PlanResult> {
    let goal = map.goal(task);
    let last_goal_constraint = constraints.last_goal_constraint(goal);
    let constraint_horizon = constraints.horizon();
    debug!("constraints: {constraints:?}, goal {goal:?}, horizon {constraint_horizon:?}");

    let mut open_list = BTreeSet::new();
    let mut closed_list = HashSet::new();
    let mut trace_map = HashMap::new();

    let start_h_cost = map.heuristic(task, start)?;
    open_list.insert(LowLevelOpenNode {
        position: start,
        f_cost: start_h_cost,
        g_cost: 0,
        time_step: 0,
    });

    while let Some(current) = open_list.pop_first() {
        trace!("expand node: {current:?}");
        let beyond_horizon = current.time_step > constraint_horizon;

        stats.low_level_expand_nodes += 1;

        closed_list.insert((current.position, current.time_step));

        if current.position == goal && current.g_cost > last_goal_constraint {
            // Under a consistent heuristic the popped f equals the optimal
            // cost, which is the fmin bound reported upwards.
            return Some(construct_plan(
                &trace_map,
                current.position,
                current.g_cost,
                current.f_cost,
            ));
        }

        // Unit costs: g is exactly the arrival time of the next move.
        let tentative_g_cost = current.g_cost + 1;

        // Past the last constraint the time coordinate is frozen, demoting
        // the search to a plain spatial A* with dedup on cells. g keeps
        // counting real time, so constraint checks and the goal-time test
        // are unaffected.
        let tentative_time_step = if beyond_horizon {
            current.time_step
        } else {
            current.time_step + 1
        };

        for action in Action::ALL {
            if beyond_horizon && action == Action::Wait {
                continue;
            }

            let neighbor = action.apply(current.position);
            if !map.is_passable(neighbor) {
                continue;
            }

            if closed_list.contains(&(neighbor, tentative_time_step)) {
                continue;
            }

            if !constraints.is_move_valid(current.position, neighbor, tentative_g_cost) {
                continue;
            }

            let Some(h_cost) = map.heuristic(task, neighbor) else {
                continue;
            };

            // A node already in the open list keeps its first discovery.
            if open_list.insert(LowLevelOpenNode {
                position: neighbor,
                f_cost: tentative_g_cost + h_cost,
                g_cost: tentative_g_cost,
                time_step: tentative_time_step,
            }) {
                trace_map.insert(
                    (neighbor, tentative_g_cost),
                    (current.position, current.g_cost, action),
                );
            }
        }
        trace!("open list {open_list:?}");
    }

    debug!("cannot find solution");
    None
}
