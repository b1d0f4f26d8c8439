use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "cbs-ta",
    about = "Conflict-Based Search with optimal task assignment on grids.",
    version = "0.1"
)]
pub struct Cli {
    #[arg(long, short, help = "Path to the input YAML instance")]
    pub input: String,

    #[arg(long, short, help = "Path to the output YAML schedule")]
    pub output: String,

    #[arg(
        long = "maxTaskAssignments",
        default_value_t = 1_000_000_000,
        help = "Maximum number of task assignments to try"
    )]
    pub max_task_assignments: usize,

    #[arg(
        long = "groupSize",
        default_value_t = 1_000_000_000,
        help = "Number of agents per group; agents may only take goals of their own group"
    )]
    pub group_size: usize,
}
