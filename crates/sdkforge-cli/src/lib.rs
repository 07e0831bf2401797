pub mod generator;
pub mod orchestrator;
pub mod watch;
