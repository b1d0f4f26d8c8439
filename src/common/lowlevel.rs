use std::cmp::Ordering;

use super::Location;

/// Node of the time-expanded search graph: a cell occupied at a time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct State {
    pub(crate) time: i32,
    pub(crate) position: Location,
}

impl State {
    pub(crate) fn equal_except_time(&self, other: &State) -> bool {
        self.position == other.position
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Action {
    Up,
    Down,
    Left,
    Right,
    Wait,
}

impl Action {
    // Expansion order pins the tie-break among equal-g discoveries.
    pub(crate) const ALL: [Action; 5] = [
        Action::Wait,
        Action::Left,
        Action::Right,
        Action::Up,
        Action::Down,
    ];

    pub(crate) fn apply(&self, position: Location) -> Location {
        match self {
            Action::Up => Location {
                x: position.x,
                y: position.y + 1,
            },
            Action::Down => Location {
                x: position.x,
                y: position.y - 1,
            },
            Action::Left => Location {
                x: position.x - 1,
                y: position.y,
            },
            Action::Right => Location {
                x: position.x + 1,
                y: position.y,
            },
            Action::Wait => position,
        }
    }
}

/// Single-agent route: states paired with their accumulated cost, the
/// actions between them, the total cost and the lower bound `fmin`
/// observed when the goal was expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlanResult {
    pub(crate) states: Vec<(State, i32)>,
    pub(crate) actions: Vec<(Action, i32)>,
    pub(crate) cost: i32,
    pub(crate) fmin: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LowLevelOpenNode {
    pub(crate) position: Location,
    pub(crate) f_cost: i32,
    pub(crate) g_cost: i32,
    pub(crate) time_step: i32,
}

impl Ord for LowLevelOpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_cost
            .cmp(&other.f_cost)
            // Higher g cost (deeper node) has higher priority.
            .then_with(|| other.g_cost.cmp(&self.g_cost))
            .then_with(|| self.position.cmp(&other.position))
            .then_with(|| self.time_step.cmp(&other.time_step))
    }
}

impl PartialOrd for LowLevelOpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
