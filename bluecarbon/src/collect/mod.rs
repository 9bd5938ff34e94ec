pub mod earth_engine;
pub mod global_variables;
pub mod platform;
