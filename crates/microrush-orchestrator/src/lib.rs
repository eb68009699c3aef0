//! MicroRush — game orchestrator.
//!
//! Responsible for the session (lives, score, round timer), the difficulty
//! curve, microgame selection, and the round state machine that mediates
//! between the HUD and whichever microgame is currently running.

pub mod application;
pub mod domain;
