pub mod beam;
pub mod config;
pub mod edges;
