pub mod error;
pub mod json;
pub mod partition;
pub mod problem;
pub mod solver;
mod utils;

#[cfg(test)]
pub(crate) mod test_utils;
