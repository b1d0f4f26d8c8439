use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::BufReader;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::common::{Location, Solution};
use crate::map::Map;
use crate::stat::Stats;

#[derive(Debug, Serialize, Deserialize)]
pub struct MapYaml {
    pub dimensions: [i32; 2],
    #[serde(default)]
    pub obstacles: Vec<[i32; 2]>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AgentYaml {
    pub start: [i32; 2],
    pub goal: [i32; 2],
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InputYaml {
    pub map: MapYaml,
    pub agents: Vec<AgentYaml>,
}

impl InputYaml {
    pub fn from_file(path: &str) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Validates the instance and builds the obstacle map with one
    /// heuristic table per pooled goal. The goal list of the agents is the
    /// assignment pool, in declaration order.
    pub fn to_instance(&self) -> Result<(Map, Vec<Location>)> {
        let [dimx, dimy] = self.map.dimensions;
        if dimx <= 0 || dimy <= 0 {
            bail!("map dimensions must be positive, got {dimx}x{dimy}");
        }

        let in_bounds = |cell: &[i32; 2]| cell[0] >= 0 && cell[0] < dimx && cell[1] >= 0 && cell[1] < dimy;

        let mut obstacles = Vec::new();
        for cell in &self.map.obstacles {
            if !in_bounds(cell) {
                bail!("obstacle {cell:?} is out of range");
            }
            obstacles.push(Location {
                x: cell[0],
                y: cell[1],
            });
        }
        let obstacle_set: HashSet<Location> = obstacles.iter().copied().collect();

        let mut starts = Vec::new();
        let mut goals = Vec::new();
        let mut seen_starts = HashSet::new();
        for (index, agent) in self.agents.iter().enumerate() {
            if !in_bounds(&agent.start) || !in_bounds(&agent.goal) {
                bail!("agent {index} has out-of-range coordinates");
            }
            let start = Location {
                x: agent.start[0],
                y: agent.start[1],
            };
            let goal = Location {
                x: agent.goal[0],
                y: agent.goal[1],
            };
            if obstacle_set.contains(&start) {
                bail!("agent {index} starts inside an obstacle at {start:?}");
            }
            if obstacle_set.contains(&goal) {
                bail!("agent {index} has its goal inside an obstacle at {goal:?}");
            }
            if !seen_starts.insert(start) {
                bail!("duplicate agent start at {start:?}");
            }
            starts.push(start);
            goals.push(goal);
        }

        Ok((Map::new(dimx, dimy, &obstacles, goals), starts))
    }
}

pub(crate) fn format_solution(solution: &Solution, stats: &Stats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "statistics:");
    let _ = writeln!(out, "  cost: {}", stats.costs);
    let _ = writeln!(out, "  makespan: {}", stats.makespan);
    let _ = writeln!(out, "  runtime: {}", stats.time_us as f64 / 1e6);
    let _ = writeln!(out, "  highLevelExpanded: {}", stats.high_level_expand_nodes);
    let _ = writeln!(out, "  lowLevelExpanded: {}", stats.low_level_expand_nodes);
    let _ = writeln!(out, "  numTaskAssignments: {}", stats.num_task_assignments);
    let _ = writeln!(out, "schedule:");
    for (agent, plan) in solution.plans.iter().enumerate() {
        let _ = writeln!(out, "  agent{agent}:");
        for (state, _) in &plan.states {
            let _ = writeln!(out, "    - x: {}", state.position.x);
            let _ = writeln!(out, "      y: {}", state.position.y);
            let _ = writeln!(out, "      t: {}", state.time);
        }
    }
    out
}

pub(crate) fn write_solution(path: &str, solution: &Solution, stats: &Stats) -> Result<()> {
    fs::write(path, format_solution(solution, stats))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "
map:
  dimensions: [3, 3]
  obstacles:
    - [1, 1]
agents:
  - start: [0, 0]
    goal: [2, 2]
  - start: [2, 0]
    goal: [0, 2]
";

    #[test]
    fn test_read_input() {
        let input = InputYaml::from_yaml_str(INPUT).unwrap();
        let (map, starts) = input.to_instance().unwrap();

        assert_eq!(map.dimx, 3);
        assert_eq!(map.dimy, 3);
        assert!(!map.is_passable(Location { x: 1, y: 1 }));
        assert_eq!(starts.len(), 2);
        assert_eq!(starts[0], Location { x: 0, y: 0 });
        assert_eq!(map.num_goals(), 2);
        assert_eq!(map.goal(1), Location { x: 0, y: 2 });
    }

    #[test]
    fn test_missing_obstacles_key_defaults_empty() {
        let input = InputYaml::from_yaml_str(
            "
map:
  dimensions: [2, 2]
agents:
  - start: [0, 0]
    goal: [1, 1]
",
        )
        .unwrap();
        assert!(input.to_instance().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_obstacle() {
        let input = InputYaml::from_yaml_str(
            "
map:
  dimensions: [2, 2]
  obstacles:
    - [2, 0]
agents:
  - start: [0, 0]
    goal: [1, 1]
",
        )
        .unwrap();
        assert!(input.to_instance().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_agent() {
        let input = InputYaml::from_yaml_str(
            "
map:
  dimensions: [2, 2]
agents:
  - start: [0, 0]
    goal: [1, 2]
",
        )
        .unwrap();
        assert!(input.to_instance().is_err());
    }

    #[test]
    fn test_rejects_duplicate_starts() {
        let input = InputYaml::from_yaml_str(
            "
map:
  dimensions: [2, 2]
agents:
  - start: [0, 0]
    goal: [1, 1]
  - start: [0, 0]
    goal: [1, 0]
",
        )
        .unwrap();
        assert!(input.to_instance().is_err());
    }

    #[test]
    fn test_rejects_goal_inside_obstacle() {
        let input = InputYaml::from_yaml_str(
            "
map:
  dimensions: [2, 2]
  obstacles:
    - [1, 1]
agents:
  - start: [0, 0]
    goal: [1, 1]
",
        )
        .unwrap();
        assert!(input.to_instance().is_err());
    }

    #[test]
    fn test_format_solution() {
        use crate::solver::{CbsTa, Solver};

        let input = InputYaml::from_yaml_str(
            "
map:
  dimensions: [3, 3]
agents:
  - start: [0, 0]
    goal: [2, 2]
",
        )
        .unwrap();
        let (map, starts) = input.to_instance().unwrap();
        let mut solver = CbsTa::new(map, starts, 1_000_000_000, 1_000_000_000);
        let solution = solver.solve().unwrap();

        let formatted = format_solution(&solution, solver.stats());

        assert!(formatted.contains("statistics:"));
        assert!(formatted.contains("  cost: 4"));
        assert!(formatted.contains("  makespan: 4"));
        assert!(formatted.contains("  numTaskAssignments: 1"));
        assert!(formatted.contains("  agent0:"));
        assert!(formatted.contains("      t: 4"));
    }
}
