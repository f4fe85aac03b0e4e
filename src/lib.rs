pub mod config;
pub mod control_system;
pub mod global_variables;
pub mod intersection;
pub mod monitoring;
pub mod shared_data;
