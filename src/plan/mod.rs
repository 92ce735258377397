mod graph;
mod scheduler;

pub use graph::DependencyGraph;
pub use scheduler::ExecutionPlan;
