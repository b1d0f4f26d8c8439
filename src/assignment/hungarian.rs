const INF: i64 = i64::MAX / 8;

/// Minimum-cost bipartite assignment over a dense agent x task matrix,
/// solved with shortest augmenting paths over reduced costs
/// (Jonker-Volgenant style, O(agents^2 * tasks)).
///
/// `None` entries are ineligible pairs. Returns the task index per agent
/// and the total cost, or `None` when no full assignment of the agents
/// exists. Deterministic: plain index scans everywhere, smallest index
/// wins ties.
pub(crate) fn min_cost_assignment(
    cost: &[Vec<Option<i64>>],
    num_tasks: usize,
) -> Option<(Vec<usize>, i64)> {
    let num_agents = cost.len();
    if num_agents == 0 {
        return Some((Vec::new(), 0));
    }
    if num_agents > num_tasks {
        return None;
    }

    let mut agent_potential = vec![0i64; num_agents];
    let mut task_potential = vec![0i64; num_tasks + 1];
    // matched[j] = agent currently assigned to task j; slot num_tasks is
    // the virtual column holding the agent being inserted.
    let mut matched = vec![usize::MAX; num_tasks + 1];
    let mut way = vec![0usize; num_tasks];

    for agent in 0..num_agents {
        matched[num_tasks] = agent;
        let mut j0 = num_tasks;
        let mut minv = vec![INF; num_tasks];
        let mut used = vec![false; num_tasks + 1];

        loop {
            used[j0] = true;
            let i0 = matched[j0];
            let mut delta = INF;
            let mut j1 = num_tasks;

            for j in 0..num_tasks {
                if used[j] {
                    continue;
                }
                let reduced = match cost[i0][j] {
                    Some(c) => c - agent_potential[i0] - task_potential[j],
                    None => INF,
                };
                if reduced < minv[j] {
                    minv[j] = reduced;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            if delta >= INF / 2 {
                // Only ineligible edges left on every alternating path.
                return None;
            }

            for j in 0..=num_tasks {
                if used[j] {
                    agent_potential[matched[j]] += delta;
                    task_potential[j] -= delta;
                } else if j < num_tasks {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if matched[j0] == usize::MAX {
                break;
            }
        }

        // Augment: shift the matching backwards along the found path.
        while j0 != num_tasks {
            let j1 = way[j0];
            matched[j0] = matched[j1];
            j0 = j1;
        }
    }

    let mut assignment = vec![usize::MAX; num_agents];
    let mut total = 0;
    for (task, &agent) in matched.iter().enumerate().take(num_tasks) {
        if agent != usize::MAX {
            assignment[agent] = task;
            total += cost[agent][task]?;
        }
    }
    debug_assert!(assignment.iter().all(|&task| task != usize::MAX));

    Some((assignment, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[i64]]) -> Vec<Vec<Option<i64>>> {
        rows.iter()
            .map(|row| row.iter().map(|&c| Some(c)).collect())
            .collect()
    }

    #[test]
    fn test_diagonal_cheapest() {
        let cost = matrix(&[&[1, 10], &[10, 1]]);
        let (assignment, total) = min_cost_assignment(&cost, 2).unwrap();
        assert_eq!(assignment, vec![0, 1]);
        assert_eq!(total, 2);
    }

    #[test]
    fn test_crossing_cheapest() {
        let cost = matrix(&[&[5, 1], &[1, 5]]);
        let (assignment, total) = min_cost_assignment(&cost, 2).unwrap();
        assert_eq!(assignment, vec![1, 0]);
        assert_eq!(total, 2);
    }

    #[test]
    fn test_rectangular_pool() {
        let cost = matrix(&[&[5, 1, 9], &[5, 9, 1]]);
        let (assignment, total) = min_cost_assignment(&cost, 3).unwrap();
        assert_eq!(assignment, vec![1, 2]);
        assert_eq!(total, 2);
    }

    #[test]
    fn test_ineligible_entry_forces_detour() {
        let cost = vec![
            vec![None, Some(3)],
            vec![Some(2), Some(100)],
        ];
        let (assignment, total) = min_cost_assignment(&cost, 2).unwrap();
        assert_eq!(assignment, vec![1, 0]);
        assert_eq!(total, 5);
    }

    #[test]
    fn test_infeasible_row() {
        let cost = vec![vec![None, None], vec![Some(1), Some(1)]];
        assert!(min_cost_assignment(&cost, 2).is_none());
    }

    #[test]
    fn test_infeasible_column_contention() {
        // Both agents are only eligible for task 0.
        let cost = vec![vec![Some(1), None], vec![Some(1), None]];
        assert!(min_cost_assignment(&cost, 2).is_none());
    }

    #[test]
    fn test_more_agents_than_tasks() {
        let cost = matrix(&[&[1], &[1]]);
        assert!(min_cost_assignment(&cost, 1).is_none());
    }

    #[test]
    fn test_empty() {
        assert_eq!(min_cost_assignment(&[], 3), Some((Vec::new(), 0)));
    }

    #[test]
    fn test_three_by_three() {
        let cost = matrix(&[&[4, 1, 3], &[2, 0, 5], &[3, 2, 2]]);
        let (assignment, total) = min_cost_assignment(&cost, 3).unwrap();
        assert_eq!(assignment, vec![1, 0, 2]);
        assert_eq!(total, 5);
    }
}
