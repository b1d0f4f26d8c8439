use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use super::min_cost_assignment;

/// One subproblem of the Murty partition: the best assignment that forces
/// every pair in `included` and avoids every pair in `excluded`.
///
/// The derived ordering (cost first, then the canonical `BTreeSet`
/// serializations of the constraint sets) pins a deterministic draw order
/// among equal-cost subproblems.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct AssignmentNode {
    cost: i64,
    included: BTreeSet<(usize, usize)>,
    excluded: BTreeSet<(usize, usize)>,
    assignment: Vec<usize>,
}

/// Lazy enumeration of assignments in non-decreasing cost order via Murty's
/// partitioning over the one-shot solver. Each call to `next_solution`
/// returns a fresh assignment exactly once; `None` signals exhaustion.
#[derive(Debug, Clone)]
pub(crate) struct NextBestAssignment {
    num_agents: usize,
    num_tasks: usize,
    cost: Vec<Vec<Option<i64>>>,
    open: BTreeSet<AssignmentNode>,
    seeded: bool,
}

impl NextBestAssignment {
    pub(crate) fn new(num_agents: usize, num_tasks: usize) -> Self {
        NextBestAssignment {
            num_agents,
            num_tasks,
            cost: vec![vec![None; num_tasks]; num_agents],
            open: BTreeSet::new(),
            seeded: false,
        }
    }

    /// Marks `(agent, task)` eligible. Pairs never set stay out of every
    /// enumerated assignment.
    pub(crate) fn set_cost(&mut self, agent: usize, task: usize, cost: i64) {
        self.cost[agent][task] = Some(cost);
    }

    fn solve_constrained(
        &self,
        included: &BTreeSet<(usize, usize)>,
        excluded: &BTreeSet<(usize, usize)>,
    ) -> Option<(Vec<usize>, i64)> {
        let mut masked = self.cost.clone();
        for &(agent, task) in excluded {
            masked[agent][task] = None;
        }
        for &(agent, task) in included {
            for other in 0..self.num_tasks {
                if other != task {
                    masked[agent][other] = None;
                }
            }
        }
        min_cost_assignment(&masked, self.num_tasks)
    }

    pub(crate) fn next_solution(&mut self) -> Option<(Vec<usize>, i64)> {
        if !self.seeded {
            self.seeded = true;
            if let Some((assignment, cost)) = self.solve_constrained(&BTreeSet::new(), &BTreeSet::new())
            {
                self.open.insert(AssignmentNode {
                    cost,
                    included: BTreeSet::new(),
                    excluded: BTreeSet::new(),
                    assignment,
                });
            }
        }

        let node = self.open.pop_first()?;
        debug!("next assignment: cost {:?} tasks {:?}", node.cost, node.assignment);

        // Partition the remaining solution space around the returned
        // assignment: child k forbids its k-th free edge and pins every
        // earlier one.
        let pinned: HashSet<usize> = node.included.iter().map(|&(agent, _)| agent).collect();
        let free: Vec<usize> = (0..self.num_agents)
            .filter(|agent| !pinned.contains(agent))
            .collect();

        for k in 0..free.len() {
            let mut excluded = node.excluded.clone();
            excluded.insert((free[k], node.assignment[free[k]]));
            let mut included = node.included.clone();
            for &agent in &free[..k] {
                included.insert((agent, node.assignment[agent]));
            }

            if let Some((assignment, cost)) = self.solve_constrained(&included, &excluded) {
                self.open.insert(AssignmentNode {
                    cost,
                    included,
                    excluded,
                    assignment,
                });
            }
        }

        Some((node.assignment, node.cost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_by_two_enumeration() {
        let mut enumerator = NextBestAssignment::new(2, 2);
        enumerator.set_cost(0, 0, 1);
        enumerator.set_cost(0, 1, 2);
        enumerator.set_cost(1, 0, 2);
        enumerator.set_cost(1, 1, 1);

        assert_eq!(enumerator.next_solution(), Some((vec![0, 1], 2)));
        assert_eq!(enumerator.next_solution(), Some((vec![1, 0], 4)));
        assert_eq!(enumerator.next_solution(), None);
    }

    #[test]
    fn test_three_by_three_order_and_uniqueness() {
        let mut enumerator = NextBestAssignment::new(3, 3);
        for (agent, row) in [[1, 2, 3], [2, 4, 6], [3, 6, 9]].iter().enumerate() {
            for (task, &cost) in row.iter().enumerate() {
                enumerator.set_cost(agent, task, cost);
            }
        }

        let mut seen = Vec::new();
        let mut costs = Vec::new();
        while let Some((assignment, cost)) = enumerator.next_solution() {
            assert!(!seen.contains(&assignment), "assignment returned twice");
            seen.push(assignment);
            costs.push(cost);
        }

        assert_eq!(seen.len(), 6);
        assert_eq!(costs, vec![10, 11, 11, 13, 13, 14]);
    }

    #[test]
    fn test_rectangular_enumeration() {
        let mut enumerator = NextBestAssignment::new(2, 3);
        for agent in 0..2 {
            for task in 0..3 {
                enumerator.set_cost(agent, task, (agent as i64 + 1) * (task as i64 + 1));
            }
        }

        let mut count = 0;
        let mut previous = i64::MIN;
        while let Some((_, cost)) = enumerator.next_solution() {
            assert!(cost >= previous);
            previous = cost;
            count += 1;
        }

        // 3 choices for the first agent times 2 for the second.
        assert_eq!(count, 6);
    }

    #[test]
    fn test_ineligible_pairs_never_enumerated() {
        let mut enumerator = NextBestAssignment::new(2, 2);
        enumerator.set_cost(0, 0, 1);
        enumerator.set_cost(1, 0, 1);
        enumerator.set_cost(1, 1, 5);

        // Agent 0 is only eligible for task 0, so the crossing assignment
        // is the single solution.
        assert_eq!(enumerator.next_solution(), Some((vec![0, 1], 6)));
        assert_eq!(enumerator.next_solution(), None);
    }

    #[test]
    fn test_infeasible_matrix() {
        let mut enumerator = NextBestAssignment::new(2, 2);
        enumerator.set_cost(0, 0, 1);
        enumerator.set_cost(1, 0, 1);

        assert_eq!(enumerator.next_solution(), None);
    }
}
