//! The orchestrator state machine and its virtual-time scheduler.

pub mod orchestrator;
pub mod scheduler;
pub mod views;
