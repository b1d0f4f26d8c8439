use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use super::{Location, PlanResult, State};
use crate::algorithm::a_star_search;
use crate::map::Map;
use crate::stat::Stats;

/// Forbids one agent from occupying a cell at one time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct VertexConstraint {
    pub(crate) time: i32,
    pub(crate) location: Location,
}

/// Forbids one agent from leaving `from` at `time` towards `to`
/// (arriving there at `time + 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct EdgeConstraint {
    pub(crate) time: i32,
    pub(crate) from: Location,
    pub(crate) to: Location,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Constraints {
    vertex: HashSet<VertexConstraint>,
    edge: HashSet<EdgeConstraint>,
}

impl Constraints {
    pub(crate) fn from_vertex(constraint: VertexConstraint) -> Self {
        Constraints {
            vertex: HashSet::from([constraint]),
            edge: HashSet::new(),
        }
    }

    pub(crate) fn from_edge(constraint: EdgeConstraint) -> Self {
        Constraints {
            vertex: HashSet::new(),
            edge: HashSet::from([constraint]),
        }
    }

    pub(crate) fn add(&mut self, other: &Constraints) {
        self.vertex.extend(other.vertex.iter().copied());
        self.edge.extend(other.edge.iter().copied());
    }

    pub(crate) fn overlap(&self, other: &Constraints) -> bool {
        self.vertex.intersection(&other.vertex).next().is_some()
            || self.edge.intersection(&other.edge).next().is_some()
    }

    /// Legality of the move arriving at `to` at `to_time`: the target cell
    /// must not be vertex-constrained then, and the traversed edge must not
    /// be forbidden.
    pub(crate) fn is_move_valid(&self, from: Location, to: Location, to_time: i32) -> bool {
        !self.vertex.contains(&VertexConstraint {
            time: to_time,
            location: to,
        }) && !self.edge.contains(&EdgeConstraint {
            time: to_time - 1,
            from,
            to,
        })
    }

    /// Latest time the goal cell is vertex-constrained, or -1. An agent may
    /// only finish strictly after this time, otherwise parking at the goal
    /// would violate a later constraint.
    pub(crate) fn last_goal_constraint(&self, goal: Location) -> i32 {
        self.vertex
            .iter()
            .filter(|constraint| constraint.location == goal)
            .map(|constraint| constraint.time)
            .fold(-1, i32::max)
    }

    /// Largest arrival time any constraint can still affect. Beyond it the
    /// time-expanded search collapses to plain spatial search.
    pub(crate) fn horizon(&self) -> i32 {
        self.vertex
            .iter()
            .map(|constraint| constraint.time)
            .chain(self.edge.iter().map(|constraint| constraint.time + 1))
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Conflict {
    Vertex {
        time: i32,
        agent_1: usize,
        agent_2: usize,
        location: Location,
    },
    Edge {
        time: i32,
        agent_1: usize,
        agent_2: usize,
        from: Location,
        to: Location,
    },
}

/// Constraint tree node: one joint plan under per-agent constraint sets,
/// for one task assignment.
#[derive(Debug, Clone)]
pub(crate) struct HighLevelOpenNode {
    pub(crate) id: u64,
    pub(crate) tasks: Vec<usize>,
    pub(crate) constraints: Vec<Constraints>,
    pub(crate) solution: Vec<PlanResult>,
    pub(crate) cost: i32,
    pub(crate) lb: i32,
    pub(crate) is_root: bool,
}

impl PartialEq for HighLevelOpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.id == other.id
    }
}

impl Eq for HighLevelOpenNode {}

impl Ord for HighLevelOpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Cheapest first; FIFO among equal costs via the monotonic id.
        self.cost.cmp(&other.cost).then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for HighLevelOpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn state_at(plan: &PlanResult, time: i32) -> State {
    let index = (time as usize).min(plan.states.len() - 1);
    plan.states[index].0
}

impl HighLevelOpenNode {
    /// Root node for a fresh assignment: every agent planned under an empty
    /// constraint set. `None` when some agent cannot reach its goal at all.
    pub(crate) fn new(
        map: &Map,
        starts: &[Location],
        tasks: &[usize],
        node_id: u64,
        stats: &mut Stats,
    ) -> Option<Self> {
        let constraints = vec![Constraints::default(); starts.len()];
        let mut solution = Vec::with_capacity(starts.len());
        let mut cost = 0;
        let mut lb = 0;

        for (agent, &start) in starts.iter().enumerate() {
            let plan = a_star_search(map, start, tasks[agent], &constraints[agent], stats)?;
            cost += plan.cost;
            lb += plan.fmin;
            solution.push(plan);
        }

        Some(HighLevelOpenNode {
            id: node_id,
            tasks: tasks.to_vec(),
            constraints,
            solution,
            cost,
            lb,
            is_root: true,
        })
    }

    /// Earliest conflict in the joint plan: smallest time, vertex conflicts
    /// before edge conflicts, smaller agent pair first.
    pub(crate) fn first_conflict(&self) -> Option<Conflict> {
        let max_t = self
            .solution
            .iter()
            .map(|plan| plan.states.len() as i32 - 1)
            .max()
            .unwrap_or(0);

        for time in 0..max_t {
            for i in 0..self.solution.len() {
                let state_1 = state_at(&self.solution[i], time);
                for j in (i + 1)..self.solution.len() {
                    let state_2 = state_at(&self.solution[j], time);
                    if state_1.equal_except_time(&state_2) {
                        return Some(Conflict::Vertex {
                            time,
                            agent_1: i,
                            agent_2: j,
                            location: state_1.position,
                        });
                    }
                }
            }

            for i in 0..self.solution.len() {
                let state_1a = state_at(&self.solution[i], time);
                let state_1b = state_at(&self.solution[i], time + 1);
                for j in (i + 1)..self.solution.len() {
                    let state_2a = state_at(&self.solution[j], time);
                    let state_2b = state_at(&self.solution[j], time + 1);
                    if state_1a.equal_except_time(&state_2b)
                        && state_1b.equal_except_time(&state_2a)
                    {
                        return Some(Conflict::Edge {
                            time,
                            agent_1: i,
                            agent_2: j,
                            from: state_1a.position,
                            to: state_1b.position,
                        });
                    }
                }
            }
        }

        None
    }

    /// Child node resolving `conflict` against one of its two agents. The
    /// touched agent gets one additional constraint and is re-planned; the
    /// rest of the joint plan is kept.
    pub(crate) fn update_constraint(
        &self,
        conflict: &Conflict,
        resolve_first: bool,
        map: &Map,
        starts: &[Location],
        node_id: u64,
        stats: &mut Stats,
    ) -> Option<HighLevelOpenNode> {
        let (agent, addition) = match *conflict {
            Conflict::Vertex {
                time,
                agent_1,
                agent_2,
                location,
            } => {
                let agent = if resolve_first { agent_1 } else { agent_2 };
                (
                    agent,
                    Constraints::from_vertex(VertexConstraint { time, location }),
                )
            }
            Conflict::Edge {
                time,
                agent_1,
                agent_2,
                from,
                to,
            } => {
                if resolve_first {
                    (agent_1, Constraints::from_edge(EdgeConstraint { time, from, to }))
                } else {
                    (
                        agent_2,
                        Constraints::from_edge(EdgeConstraint {
                            time,
                            from: to,
                            to: from,
                        }),
                    )
                }
            }
        };

        let mut new_constraints = self.constraints.clone();
        debug_assert!(!new_constraints[agent].overlap(&addition));
        new_constraints[agent].add(&addition);

        let new_plan = a_star_search(
            map,
            starts[agent],
            self.tasks[agent],
            &new_constraints[agent],
            stats,
        )?;

        debug!(
            "update agent {agent:?} with path cost {:?} for conflict {conflict:?}, new f min {:?}",
            new_plan.cost, new_plan.fmin
        );

        let mut new_solution = self.solution.clone();
        let new_cost = self.cost - new_solution[agent].cost + new_plan.cost;
        let new_lb = self.lb - new_solution[agent].fmin + new_plan.fmin;
        new_solution[agent] = new_plan;

        Some(HighLevelOpenNode {
            id: node_id,
            tasks: self.tasks.clone(),
            constraints: new_constraints,
            solution: new_solution,
            cost: new_cost,
            lb: new_lb,
            is_root: false,
        })
    }
}
