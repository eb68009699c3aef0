//! MicroRush terminal host.
//!
//! Reads commands from a line-oriented input, drives the orchestrator in
//! real time and prints the HUD to the output.

pub mod config;
pub mod console;
pub mod driver;
pub mod error;
pub mod input;
