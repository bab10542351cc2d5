pub mod kmeans;
pub mod partitioned_solver;
