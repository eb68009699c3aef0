//! MicroRush Core — shared abstractions.
//!
//! This crate defines the traits and types that the orchestrator, the
//! microgame catalog and hosts all depend on: the plug-in contract, the
//! surfaces a host renders through, and the injected sources of time and
//! randomness. It contains no orchestration logic.

pub mod clock;
pub mod error;
pub mod event;
pub mod microgame;
pub mod rng;
pub mod surface;
