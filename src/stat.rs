use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub costs: i32,
    pub makespan: i32,
    pub time_us: u64,
    pub high_level_expand_nodes: usize,
    pub low_level_expand_nodes: usize,
    pub num_task_assignments: usize,
    /// Set when a draw from the assignment enumerator was refused because
    /// the task assignment budget was already spent; distinguishes a
    /// budget-exceeded failure from a plain infeasible instance.
    pub budget_exhausted: bool,
}

impl Stats {
    pub(crate) fn print(&self) {
        info!(
            "Cost {:?} Makespan {:?} Time(microseconds) {:?} High level expand nodes number: {:?} Low level expand nodes number {:?} Task assignments {:?}",
            self.costs,
            self.makespan,
            self.time_us,
            self.high_level_expand_nodes,
            self.low_level_expand_nodes,
            self.num_task_assignments
        );
    }
}
