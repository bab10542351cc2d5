pub mod courier;
pub mod delivery_problem;
pub mod job;
pub mod kmh;
pub mod location;
pub mod stop;
pub mod time_window;
pub mod travel;
