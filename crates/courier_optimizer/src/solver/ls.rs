pub mod local_search;
pub mod operator;
pub mod swap;
pub mod two_opt;
