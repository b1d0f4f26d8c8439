mod astar;

pub(crate) use astar::a_star_search;

use std::collections::HashMap;

use crate::common::{Action, Location, PlanResult, State};

type Trace = HashMap<(Location, i32), (Location, i32, Action)>;

fn construct_plan(trace: &Trace, goal: Location, cost: i32, fmin: i32) -> PlanResult {
    let mut states = vec![(
        State {
            time: cost,
            position: goal,
        },
        cost,
    )];
    let mut actions = Vec::new();

    let mut current = (goal, cost);
    while let Some(&(position, g_cost, action)) = trace.get(&current) {
        states.push((
            State {
                time: g_cost,
                position,
            },
            g_cost,
        ));
        actions.push((action, 1));
        current = (position, g_cost);
    }
    states.reverse();
    actions.reverse();

    PlanResult {
        states,
        actions,
        cost,
        fmin,
    }
}
