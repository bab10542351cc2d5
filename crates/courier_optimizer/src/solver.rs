pub mod construction;
pub mod evaluator;
pub mod ls;
pub mod solution;
#[allow(clippy::module_inception)]
pub mod solver;
pub mod solver_params;
